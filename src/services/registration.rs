//! Registration Service
//!
//! Write side of the registry. A draft is validated and split, the payload
//! is pinned, then the contract transaction is submitted with the handle
//! and category codes.
//!
//! The two writes are not atomic. When the transaction fails after a
//! successful upload the payload is left unreferenced in the content store.
//!
//! The owner's fee withdrawal goes through the same sender resolution.

use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

use crate::chain::{
    Address, ChainError, ContractClient, ContractTransaction, ContractWrite, TxHash, Wei,
};
use crate::profile::{
    prepare_registration, validate_draft, MappingError, RegistrationDraft, ValidationError,
};
use crate::registry::EnumRegistry;
use crate::storage::{ContentHandle, ContentStore, StoreError};

/// Errors from registration or profile updates
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistrationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Chain(#[from] ChainError),
}

impl RegistrationError {
    /// Whether the caller's input was at fault
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            RegistrationError::Validation(_)
                | RegistrationError::Mapping(_)
                | RegistrationError::Chain(ChainError::MissingSender)
        )
    }
}

/// Result of a submitted write
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationReceipt {
    pub cid: ContentHandle,
    pub tx_hash: TxHash,
}

#[derive(Debug, Clone, Copy)]
enum WriteKind {
    Register,
    Update,
}

/// Submits registrations and profile updates
pub struct RegistrationService {
    contract: Arc<dyn ContractClient>,
    store: Arc<dyn ContentStore>,
    registry: Arc<EnumRegistry>,
    registration_fee: Wei,
    default_sender: Option<Address>,
}

impl RegistrationService {
    pub fn new(
        contract: Arc<dyn ContractClient>,
        store: Arc<dyn ContentStore>,
        registry: Arc<EnumRegistry>,
        registration_fee: Wei,
        default_sender: Option<Address>,
    ) -> Self {
        Self {
            contract,
            store,
            registry,
            registration_fee,
            default_sender,
        }
    }

    pub fn registration_fee(&self) -> Wei {
        self.registration_fee
    }

    /// Register a new user, attaching the registration fee
    pub async fn register(
        &self,
        draft: &RegistrationDraft,
        from: Option<Address>,
    ) -> Result<RegistrationReceipt, RegistrationError> {
        self.submit(WriteKind::Register, draft, from).await
    }

    /// Replace an existing user's profile with a newly pinned payload
    pub async fn update_profile(
        &self,
        draft: &RegistrationDraft,
        from: Option<Address>,
    ) -> Result<RegistrationReceipt, RegistrationError> {
        self.submit(WriteKind::Update, draft, from).await
    }

    /// Move collected fees to the contract owner; only the owner may send it
    pub async fn withdraw_fees(&self, from: Option<Address>) -> Result<TxHash, RegistrationError> {
        let from = self.sender(from)?;
        let call = ContractWrite::WithdrawFees;
        let function = call.name();

        let tx_hash = self
            .contract
            .transact(ContractTransaction {
                from,
                call,
                value: 0,
            })
            .await?;

        info!(tx = %tx_hash, from = %from, "{} submitted", function);
        Ok(tx_hash)
    }

    fn sender(&self, from: Option<Address>) -> Result<Address, ChainError> {
        from.or(self.default_sender).ok_or(ChainError::MissingSender)
    }

    async fn submit(
        &self,
        kind: WriteKind,
        draft: &RegistrationDraft,
        from: Option<Address>,
    ) -> Result<RegistrationReceipt, RegistrationError> {
        let from = self.sender(from)?;

        validate_draft(&self.registry, draft)?;
        let prepared = prepare_registration(&self.registry, draft)?;

        let payload = serde_json::to_value(&prepared.payload)
            .map_err(|e| StoreError::Upload(e.to_string()))?;
        let cid = self.store.put(&payload).await?;
        info!(cid = %cid, from = %from, "profile payload stored");

        let args = prepared.into_args(&cid);
        let (call, value) = match kind {
            WriteKind::Register => (ContractWrite::RegisterUser(args), self.registration_fee),
            WriteKind::Update => (ContractWrite::UpdateProfile(args), 0),
        };
        let function = call.name();

        let tx_hash = self
            .contract
            .transact(ContractTransaction { from, call, value })
            .await
            .map_err(|e| {
                error!(cid = %cid, "{} failed after upload: {}", function, e);
                e
            })?;

        info!(tx = %tx_hash, from = %from, "{} submitted", function);
        Ok(RegistrationReceipt { cid, tx_hash })
    }
}
