// Copyright (c) 2026 Meridian Contributors. MIT License.
// See LICENSE for details.

//! # Mirror Gateway
//!
//! Read access to the mirror index, the REST surface that trails consensus.
//! The orchestrator only consumes this: [`MirrorGateway`] is one `get`, and
//! everything else here builds the paths that go into it. Supplying an HTTP
//! client (and any API-key header it needs) is the deployment's business.
//!
//! Paths follow the mirror's own conventions, notably the dashed
//! transaction-id rendering (`payer-seconds-nanos`) instead of the wire
//! form with `@`.

use async_trait::async_trait;
use serde_json::Value;

use crate::client::ids::{AccountId, ScheduleId, TokenId};
use crate::config::MIRROR_API_VERSION;
use crate::error::OrchestrationError;
use crate::transaction::lifecycle::TransactionId;

/// A mirror REST endpoint. `path` is relative to the implementation's base
/// URL; implementations own authentication and transport concerns.
#[async_trait]
pub trait MirrorGateway: Send + Sync {
    async fn get(&self, path: &str) -> Result<Value, OrchestrationError>;
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

/// `payer-seconds-nanos`, the rendering mirror URLs use for transaction ids.
pub fn mirror_transaction_id(id: &TransactionId) -> String {
    format!(
        "{}-{}-{:09}",
        id.payer(),
        id.valid_start().seconds(),
        id.valid_start().nanos()
    )
}

pub fn transaction_path(id: &TransactionId) -> String {
    format!("{MIRROR_API_VERSION}/transactions/{}", mirror_transaction_id(id))
}

pub fn transactions_for_account_path(account: AccountId, limit: usize) -> String {
    format!("{MIRROR_API_VERSION}/transactions?account.id={account}&limit={limit}&order=desc")
}

pub fn account_path(account: AccountId) -> String {
    format!("{MIRROR_API_VERSION}/accounts/{account}")
}

/// Accounts holding a balance of `token`, largest first.
pub fn token_holders_path(token: TokenId, limit: usize) -> String {
    format!("{MIRROR_API_VERSION}/tokens/{token}/balances?limit={limit}&order=desc")
}

pub fn unit_path(token: TokenId, serial: i64) -> String {
    format!("{MIRROR_API_VERSION}/tokens/{token}/nfts/{serial}")
}

pub fn schedule_path(schedule: ScheduleId) -> String {
    format!("{MIRROR_API_VERSION}/schedules/{schedule}")
}

// ---------------------------------------------------------------------------
// Typed reader
// ---------------------------------------------------------------------------

/// Convenience wrapper pairing a gateway with the path helpers.
pub struct MirrorReader<G> {
    gateway: G,
}

impl<G: MirrorGateway> MirrorReader<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    pub async fn transaction(&self, id: &TransactionId) -> Result<Value, OrchestrationError> {
        self.gateway.get(&transaction_path(id)).await
    }

    pub async fn transactions_for_account(
        &self,
        account: AccountId,
        limit: usize,
    ) -> Result<Value, OrchestrationError> {
        self.gateway
            .get(&transactions_for_account_path(account, limit))
            .await
    }

    pub async fn account(&self, account: AccountId) -> Result<Value, OrchestrationError> {
        self.gateway.get(&account_path(account)).await
    }

    pub async fn token_holders(
        &self,
        token: TokenId,
        limit: usize,
    ) -> Result<Value, OrchestrationError> {
        self.gateway.get(&token_holders_path(token, limit)).await
    }

    pub async fn unit(&self, token: TokenId, serial: i64) -> Result<Value, OrchestrationError> {
        self.gateway.get(&unit_path(token, serial)).await
    }

    pub async fn schedule(&self, schedule: ScheduleId) -> Result<Value, OrchestrationError> {
        self.gateway.get(&schedule_path(schedule)).await
    }
}
