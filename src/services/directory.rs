//! User Directory Service
//!
//! Read side of the registry: fetches on-chain records, pulls each
//! record's payload from the content store, and joins them into
//! [`UserView`]s.
//!
//! Batch lookups run every per-address fetch concurrently and wait for all
//! of them. Addresses without a record are dropped; any other failure
//! fails the batch.

use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::chain::{Address, ChainError, ContractCall, ContractClient, Wei};
use crate::profile::{decode_record, MappingError, UserView};
use crate::registry::{Domain, EnumRegistry, RegistryError};
use crate::storage::{ContentHandle, ContentStore, StoreError};

/// Errors from directory reads
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DirectoryError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Mapping(#[from] MappingError),
}

/// Start index and page size for paginated contract reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub start: u64,
    pub count: u64,
}

impl Default for Page {
    fn default() -> Self {
        Self { start: 0, count: 10 }
    }
}

/// Contract owner and registration fee
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractInfo {
    pub owner: Address,
    /// Decimal wei
    pub registration_fee: String,
}

/// Read access to registered users
pub struct UserDirectory {
    contract: Arc<dyn ContractClient>,
    store: Arc<dyn ContentStore>,
    registry: Arc<EnumRegistry>,
}

impl UserDirectory {
    pub fn new(
        contract: Arc<dyn ContractClient>,
        store: Arc<dyn ContentStore>,
        registry: Arc<EnumRegistry>,
    ) -> Self {
        Self {
            contract,
            store,
            registry,
        }
    }

    /// Look up one user; `Ok(None)` when the address has no record
    pub async fn user_by_address(
        &self,
        address: Address,
    ) -> Result<Option<UserView>, DirectoryError> {
        let call = ContractCall::GetUserProfile(address);
        let name = call.name();
        let record = self.contract.call(call).await?.into_profile(name)?;

        if !record.exists {
            debug!(address = %address, "no on-chain record");
            return Ok(None);
        }

        let handle = ContentHandle::from_digest(record.ipfs_hash);
        let payload = self.store.get(&handle).await?;
        let view = decode_record(&self.registry, address, &record, payload)?;
        Ok(Some(view))
    }

    /// Resolve many addresses concurrently, dropping those without a record
    pub async fn lookup_many(
        &self,
        addresses: Vec<Address>,
    ) -> Result<Vec<UserView>, DirectoryError> {
        let total = addresses.len();
        let results = join_all(
            addresses
                .into_iter()
                .map(|address| self.user_by_address(address)),
        )
        .await;

        let mut views = Vec::with_capacity(total);
        for result in results {
            match result {
                Ok(Some(view)) => views.push(view),
                Ok(None) => {}
                Err(e) => {
                    warn!("Batch user lookup failed: {}", e);
                    return Err(e);
                }
            }
        }

        debug!(requested = total, found = views.len(), "batch lookup complete");
        Ok(views)
    }

    async fn addresses(&self, call: ContractCall) -> Result<Vec<Address>, DirectoryError> {
        let name = call.name();
        Ok(self.contract.call(call).await?.into_addresses(name)?)
    }

    /// Registered users in registration order
    pub async fn registered_users(&self, page: Page) -> Result<Vec<UserView>, DirectoryError> {
        let addresses = self
            .addresses(ContractCall::GetRegisteredUsers {
                start: page.start,
                count: page.count,
            })
            .await?;
        self.lookup_many(addresses).await
    }

    /// Users in a location, all of them or one page
    pub async fn users_by_location(
        &self,
        location_key: &str,
        page: Option<Page>,
    ) -> Result<Vec<UserView>, DirectoryError> {
        let location = self.registry.code_of(Domain::Location, location_key)?;
        let call = match page {
            Some(page) => ContractCall::GetUsersByLocationPaginated {
                location,
                start: page.start,
                count: page.count,
            },
            None => ContractCall::GetUsersByLocation(location),
        };
        let addresses = self.addresses(call).await?;
        self.lookup_many(addresses).await
    }

    /// Users with a skill as primary or secondary, all of them or one page
    pub async fn users_by_skill(
        &self,
        skill_key: &str,
        page: Option<Page>,
    ) -> Result<Vec<UserView>, DirectoryError> {
        let skill = self.registry.code_of(Domain::Skill, skill_key)?;
        let call = match page {
            Some(page) => ContractCall::GetUsersBySkillPaginated {
                skill,
                start: page.start,
                count: page.count,
            },
            None => ContractCall::GetUsersBySkill(skill),
        };
        let addresses = self.addresses(call).await?;
        self.lookup_many(addresses).await
    }

    async fn count(&self, call: ContractCall) -> Result<u128, DirectoryError> {
        let name = call.name();
        Ok(self.contract.call(call).await?.into_uint(name)?)
    }

    pub async fn total_users(&self) -> Result<u128, DirectoryError> {
        self.count(ContractCall::GetTotalUsers).await
    }

    /// Number of users registered in a location
    pub async fn total_users_by_location(&self, location_key: &str) -> Result<u128, DirectoryError> {
        let location = self.registry.code_of(Domain::Location, location_key)?;
        self.count(ContractCall::GetTotalUsersByLocation(location)).await
    }

    /// Number of users holding a skill as primary or secondary
    pub async fn total_users_by_skill(&self, skill_key: &str) -> Result<u128, DirectoryError> {
        let skill = self.registry.code_of(Domain::Skill, skill_key)?;
        self.count(ContractCall::GetTotalUsersBySkill(skill)).await
    }

    pub async fn contract_info(&self) -> Result<ContractInfo, DirectoryError> {
        let owner_call = ContractCall::Owner;
        let fee_call = ContractCall::RegistrationFee;
        let (owner_name, fee_name) = (owner_call.name(), fee_call.name());

        let (owner, fee) = tokio::try_join!(
            self.contract.call(owner_call),
            self.contract.call(fee_call)
        )?;
        let fee: Wei = fee.into_uint(fee_name)?;

        Ok(ContractInfo {
            owner: owner.into_address(owner_name)?,
            registration_fee: fee.to_string(),
        })
    }
}
