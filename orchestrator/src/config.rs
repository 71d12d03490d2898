// Copyright (c) 2026 Meridian Contributors. MIT License.
// See LICENSE for details.

//! # Orchestrator Configuration & Constants
//!
//! Every magic number in the orchestrator lives here. If you are hardcoding
//! a constant somewhere else, you are doing it wrong and you owe the team
//! coffee.
//!
//! The operator identity is loaded from the environment on purpose. Private
//! keys in config files end up in git history; private keys in env vars end
//! up in shell history, which at least rotates.

use std::time::Duration;

use thiserror::Error;

use crate::client::ids::AccountId;
use crate::keys::keypair::{KeyError, SigningKeypair};

// ---------------------------------------------------------------------------
// Denomination
// ---------------------------------------------------------------------------

/// Grains per mark. The mark is the network's native unit; the grain is the
/// smallest indivisible piece of one. All balances and transfer amounts move
/// through the wire in grains, and only displays ever see marks.
pub const GRAINS_PER_MARK: u64 = 100_000_000;

/// Decimal places of the native unit. Eight, same as Bitcoin. We are not
/// reinventing this wheel.
pub const MARK_DECIMALS: u8 = 8;

// ---------------------------------------------------------------------------
// Ledger Addressing
// ---------------------------------------------------------------------------

/// Realm that freshly created entities land in. Multi-realm deployments are
/// a future problem; everything today lives in realm zero.
pub const DEFAULT_REALM: u64 = 0;

/// The consensus node the orchestrator submits to when the caller does not
/// pick one.
pub const DEFAULT_NODE_ACCOUNT: AccountId = AccountId::new(DEFAULT_REALM, 3);

/// The consensus node pinned for offline signing flows. A transaction frozen
/// for out-of-band signature collection must name one specific node up front,
/// because the node account is part of the signed bytes. Changing this value
/// invalidates every signature gathered against the old one.
pub const OFFLINE_SIGNING_NODE: AccountId = AccountId::new(DEFAULT_REALM, 6);

// ---------------------------------------------------------------------------
// Transaction Parameters
// ---------------------------------------------------------------------------

/// How long a frozen transaction stays valid after its start timestamp.
/// Two minutes gives offline co-signers a realistic window without leaving
/// stale transactions replayable for long.
pub const TRANSACTION_VALID_DURATION: Duration = Duration::from_secs(120);

/// Default fee ceiling in grains when the caller does not set one.
/// Two marks covers every operation the orchestrator issues today with room
/// to spare; the network only charges what the operation actually costs.
pub const DEFAULT_MAX_FEE_GRAINS: u64 = 2 * GRAINS_PER_MARK;

/// Memo ceiling enforced by the network, in bytes. The orchestrator does not
/// pre-validate this locally; the ledger rejects oversized memos itself.
pub const MAX_MEMO_BYTES: usize = 100;

// ---------------------------------------------------------------------------
// Mirror Endpoints
// ---------------------------------------------------------------------------

/// REST API version prefix shared by every mirror deployment.
pub const MIRROR_API_VERSION: &str = "api/v1";

/// Mirror base URL for mainnet.
pub const MAINNET_MIRROR_URL: &str = "https://mainnet.mirror.meridian.network";

/// Mirror base URL for testnet.
pub const TESTNET_MIRROR_URL: &str = "https://testnet.mirror.meridian.network";

// ---------------------------------------------------------------------------
// Environment Variables
// ---------------------------------------------------------------------------

/// Operator account id, `realm.num` form.
pub const ENV_OPERATOR_ID: &str = "MERIDIAN_OPERATOR_ID";

/// Operator Ed25519 secret key, hex encoded.
pub const ENV_OPERATOR_KEY: &str = "MERIDIAN_OPERATOR_KEY";

/// Network selector: `mainnet` or `testnet`. Defaults to testnet, because
/// defaulting to mainnet is how people lose money at 2am.
pub const ENV_NETWORK: &str = "MERIDIAN_NETWORK";

/// Optional mirror URL override for custom deployments.
pub const ENV_MIRROR_URL: &str = "MERIDIAN_MIRROR_URL";

// ---------------------------------------------------------------------------
// Network Profile
// ---------------------------------------------------------------------------

/// Which ledger deployment the orchestrator talks to. The profile decides
/// the mirror endpoint; consensus node addresses are the transport's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkProfile {
    /// The real deal. Mistakes here cost real money.
    Mainnet,
    /// Where we break things on purpose and call it "testing."
    Testnet,
    /// A self-hosted deployment with its own mirror.
    Custom { mirror_url: String },
}

impl NetworkProfile {
    /// Base URL of the mirror REST API for this profile, without a trailing
    /// slash and without the API version segment.
    pub fn mirror_base_url(&self) -> &str {
        match self {
            NetworkProfile::Mainnet => MAINNET_MIRROR_URL,
            NetworkProfile::Testnet => TESTNET_MIRROR_URL,
            NetworkProfile::Custom { mirror_url } => mirror_url,
        }
    }

    /// Friendly name, mainly for logging.
    pub fn name(&self) -> &'static str {
        match self {
            NetworkProfile::Mainnet => "mainnet",
            NetworkProfile::Testnet => "testnet",
            NetworkProfile::Custom { .. } => "custom",
        }
    }

    /// Resolves the profile from the environment. `MERIDIAN_MIRROR_URL`
    /// wins over `MERIDIAN_NETWORK` when both are set, since an explicit
    /// URL is the stronger statement of intent.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(url) = get(ENV_MIRROR_URL) {
            return Ok(NetworkProfile::Custom { mirror_url: url });
        }
        match get(ENV_NETWORK).as_deref() {
            None | Some("testnet") => Ok(NetworkProfile::Testnet),
            Some("mainnet") => Ok(NetworkProfile::Mainnet),
            Some(other) => Err(ConfigError::UnknownNetwork(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Operator
// ---------------------------------------------------------------------------

/// The account that pays for and signs everything the orchestrator submits
/// on its own authority. Debug output never shows the secret key; the
/// keypair type redacts itself.
#[derive(Debug, Clone)]
pub struct OperatorConfig {
    pub account: AccountId,
    pub keypair: SigningKeypair,
}

impl OperatorConfig {
    /// Loads the operator from `MERIDIAN_OPERATOR_ID` and
    /// `MERIDIAN_OPERATOR_KEY`. Both must be present; a half-configured
    /// operator is worse than none.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let id = get(ENV_OPERATOR_ID).ok_or(ConfigError::MissingVar(ENV_OPERATOR_ID))?;
        let key = get(ENV_OPERATOR_KEY).ok_or(ConfigError::MissingVar(ENV_OPERATOR_KEY))?;
        let account = id
            .parse::<AccountId>()
            .map_err(|e| ConfigError::InvalidOperatorId(e.to_string()))?;
        let keypair = SigningKeypair::from_hex(key.trim())?;
        Ok(OperatorConfig { account, keypair })
    }
}

/// Things that can go wrong while assembling configuration. All of them are
/// operator mistakes, found before the first network call.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is absent.
    #[error("environment variable {0} is not set")]
    MissingVar(&'static str),

    /// The operator account id did not parse as `realm.num`.
    #[error("invalid operator account id: {0}")]
    InvalidOperatorId(String),

    /// The operator key was not a valid hex-encoded Ed25519 secret.
    #[error("invalid operator key: {0}")]
    InvalidOperatorKey(#[from] KeyError),

    /// `MERIDIAN_NETWORK` named a deployment we do not know.
    #[error("unknown network profile: {0}")]
    UnknownNetwork(String),
}
