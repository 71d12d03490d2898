// Copyright (c) 2026 Meridian Contributors. MIT License.
// See LICENSE for details.

//! # File Service
//!
//! Byte storage on the ledger: create, append, rewrite, delete, read back.
//! Every mutation is authorized by the file's key list, and rewrites may
//! rotate that list in the same breath. Deletion is a tombstone, not an
//! erasure; the id stays known and later mutations are refused.
//!
//! Fees vary with file size more than with any other operation, so every
//! mutating call takes an optional fee ceiling that overrides the default
//! for that one transaction.

use std::sync::Arc;

use crate::client::{FileId, FileInfo, LedgerClient, LedgerStatus};
use crate::error::OrchestrationError;
use crate::keys::{KeyList, SigningKeypair};
use crate::transaction::{OperationPayload, SignaturePolicy, Transaction, TransactionEngine};
use crate::units::Marks;

/// File operations against a ledger client.
#[derive(Clone)]
pub struct FilesService {
    engine: TransactionEngine,
}

impl FilesService {
    pub fn new(client: Arc<dyn LedgerClient>) -> Self {
        Self {
            engine: TransactionEngine::new(client),
        }
    }

    /// The engine this service submits through.
    pub fn engine(&self) -> &TransactionEngine {
        &self.engine
    }

    /// Creates a file guarded by `key` and returns its id.
    pub async fn create(
        &self,
        key: &SigningKeypair,
        contents: Vec<u8>,
        memo: Option<&str>,
        max_fee: Option<Marks>,
    ) -> Result<FileId, OrchestrationError> {
        let payload = OperationPayload::FileCreate {
            contents,
            keys: KeyList::single(key.public_key()),
            memo: memo.unwrap_or_default().to_string(),
        };
        let mut transaction = self.base(payload, max_fee)?;
        transaction.freeze()?;
        transaction.sign(&self.engine.client().operator().keypair)?;
        transaction.sign(key)?;

        let details = self.engine.execute(transaction).await?;
        let file = details.receipt.file_id.ok_or_else(|| {
            OrchestrationError::Transport("file receipt carried no file id".to_string())
        })?;
        tracing::info!(file = %file, "file created");
        Ok(file)
    }

    /// Appends bytes to an existing file.
    pub async fn append(
        &self,
        file: FileId,
        key: &SigningKeypair,
        contents: Vec<u8>,
        max_fee: Option<Marks>,
    ) -> Result<LedgerStatus, OrchestrationError> {
        let payload = OperationPayload::FileAppend { file, contents };
        let mut transaction = self.base(payload, max_fee)?;
        transaction.freeze()?;
        transaction.sign(&self.engine.client().operator().keypair)?;
        transaction.sign(key)?;
        self.engine.execute_for_status(transaction).await
    }

    /// Rewrites a file's contents, optionally rotating its keys and memo.
    ///
    /// A rotation demands signatures from both the current key and the
    /// incoming one, so a file can never be handed to a key nobody proved
    /// they hold.
    pub async fn update(
        &self,
        file: FileId,
        contents: Vec<u8>,
        sign_key: &SigningKeypair,
        new_key: Option<&SigningKeypair>,
        memo: Option<&str>,
        max_fee: Option<Marks>,
    ) -> Result<LedgerStatus, OrchestrationError> {
        let policy = match new_key {
            Some(incoming) => SignaturePolicy::CurrentAndNew {
                current: sign_key.public_key(),
                new: incoming.public_key(),
            },
            None => SignaturePolicy::Single(sign_key.public_key()),
        };
        let payload = OperationPayload::FileUpdate {
            file,
            contents,
            new_keys: new_key.map(|keypair| KeyList::single(keypair.public_key())),
            memo: memo.map(str::to_string),
        };
        let mut transaction = self.base(payload, max_fee)?.with_policy(policy)?;
        transaction.freeze()?;
        transaction.sign(&self.engine.client().operator().keypair)?;
        transaction.sign(sign_key)?;
        if let Some(incoming) = new_key {
            transaction.sign(incoming)?;
        }
        self.engine.execute_for_status(transaction).await
    }

    /// Tombstones a file. Reads of its contents fail from then on.
    pub async fn delete(
        &self,
        file: FileId,
        key: &SigningKeypair,
        max_fee: Option<Marks>,
    ) -> Result<LedgerStatus, OrchestrationError> {
        let payload = OperationPayload::FileDelete { file };
        let mut transaction = self.base(payload, max_fee)?;
        transaction.freeze()?;
        transaction.sign(&self.engine.client().operator().keypair)?;
        transaction.sign(key)?;
        self.engine.execute_for_status(transaction).await
    }

    /// The file's current bytes.
    pub async fn contents(&self, file: FileId) -> Result<Vec<u8>, OrchestrationError> {
        self.engine.client().file_contents(file).await
    }

    /// Size, keys, memo, and deletion state.
    pub async fn info(&self, file: FileId) -> Result<FileInfo, OrchestrationError> {
        self.engine.client().file_info(file).await
    }

    fn base(
        &self,
        payload: OperationPayload,
        max_fee: Option<Marks>,
    ) -> Result<Transaction, OrchestrationError> {
        let mut transaction =
            Transaction::new(payload).with_payer(self.engine.operator_account())?;
        if let Some(ceiling) = max_fee {
            transaction = transaction.with_max_fee(ceiling)?;
        }
        Ok(transaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::InMemoryLedger;

    #[tokio::test]
    async fn test_file_round_trip() {
        let ledger = InMemoryLedger::start();
        let service = FilesService::new(ledger.clone());
        let operator = ledger.operator().clone();

        let file = service
            .create(
                &operator.keypair,
                b"journal v1".to_vec(),
                Some("daybook"),
                Some(Marks::from_marks(1)),
            )
            .await
            .unwrap();
        assert_eq!(service.contents(file).await.unwrap(), b"journal v1");

        let appended = service
            .append(file, &operator.keypair, b" + addendum".to_vec(), None)
            .await
            .unwrap();
        assert_eq!(appended, LedgerStatus::Success);
        assert_eq!(
            service.contents(file).await.unwrap(),
            b"journal v1 + addendum"
        );

        let info = service.info(file).await.unwrap();
        assert_eq!(info.size, b"journal v1 + addendum".len() as u64);
        assert_eq!(info.memo, "daybook");
        assert!(!info.deleted);
    }

    #[tokio::test]
    async fn test_update_rotates_the_guarding_keys() {
        let ledger = InMemoryLedger::start();
        let service = FilesService::new(ledger.clone());
        let operator = ledger.operator().clone();
        let successor = SigningKeypair::generate();

        let file = service
            .create(&operator.keypair, b"charter".to_vec(), None, None)
            .await
            .unwrap();

        let rotated = service
            .update(
                file,
                b"charter, amended".to_vec(),
                &operator.keypair,
                Some(&successor),
                Some("v2"),
                None,
            )
            .await
            .unwrap();
        assert_eq!(rotated, LedgerStatus::Success);

        let info = service.info(file).await.unwrap();
        assert_eq!(info.keys.keys(), &[successor.public_key()]);
        assert_eq!(info.memo, "v2");

        // The retired key can no longer mutate the file.
        let stale = service
            .append(file, &operator.keypair, b"!".to_vec(), None)
            .await
            .unwrap();
        assert_eq!(stale, LedgerStatus::InvalidSignature);

        let fresh = service
            .append(file, &successor, b"!".to_vec(), None)
            .await
            .unwrap();
        assert_eq!(fresh, LedgerStatus::Success);
    }

    #[tokio::test]
    async fn test_delete_leaves_a_tombstone() {
        let ledger = InMemoryLedger::start();
        let service = FilesService::new(ledger.clone());
        let operator = ledger.operator().clone();

        let file = service
            .create(&operator.keypair, b"ephemeral".to_vec(), None, None)
            .await
            .unwrap();
        assert_eq!(
            service.delete(file, &operator.keypair, None).await.unwrap(),
            LedgerStatus::Success
        );

        let err = service.contents(file).await.unwrap_err();
        assert_eq!(err.status(), Some(LedgerStatus::InvalidFile));
        assert!(service.info(file).await.unwrap().deleted);

        let late = service
            .append(file, &operator.keypair, b"?".to_vec(), None)
            .await
            .unwrap();
        assert_eq!(late, LedgerStatus::InvalidFile);
    }
}
