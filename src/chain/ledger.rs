//! In-process registry contract
//!
//! Mirrors the deployed contract closely enough to run the gateway without a
//! node: one record per address, the registration fee is enforced, and
//! users are indexed by location and by both skills in registration order.

use sha3::{Digest, Keccak256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{
    Address, CallOutput, ChainError, ContractCall, ContractClient, ContractTransaction,
    ContractWrite, OnchainRecord, TxHash, Wei,
};

#[derive(Default)]
struct LedgerState {
    profiles: HashMap<Address, OnchainRecord>,
    registered: Vec<Address>,
    by_location: HashMap<u8, Vec<Address>>,
    by_skill: HashMap<u8, Vec<Address>>,
    collected_fees: Wei,
    nonce: u64,
}

impl LedgerState {
    fn index(&mut self, addr: Address, record: &OnchainRecord) {
        self.by_location.entry(record.location).or_default().push(addr);
        self.by_skill.entry(record.primary_skill).or_default().push(addr);
        if record.secondary_skill != record.primary_skill {
            self.by_skill.entry(record.secondary_skill).or_default().push(addr);
        }
    }

    fn unindex(&mut self, addr: &Address) {
        for list in self.by_location.values_mut().chain(self.by_skill.values_mut()) {
            list.retain(|a| a != addr);
        }
    }

    fn next_tx_hash(&mut self, from: &Address) -> TxHash {
        self.nonce += 1;
        let mut hasher = Keccak256::new();
        hasher.update(from.as_bytes());
        hasher.update(self.nonce.to_be_bytes());
        format!("0x{}", hex::encode(hasher.finalize()))
    }
}

/// Slice `list[start..start + count]`, clamped to the list
fn page(list: &[Address], start: u64, count: u64) -> Vec<Address> {
    let len = list.len() as u64;
    let start = start.min(len);
    let end = start.saturating_add(count).min(len);
    list[start as usize..end as usize].to_vec()
}

/// Local stand-in for the registry contract
pub struct LocalLedger {
    owner: Address,
    registration_fee: Wei,
    state: RwLock<LedgerState>,
    calls: AtomicUsize,
}

impl LocalLedger {
    pub fn new(owner: Address, registration_fee: Wei) -> Self {
        Self {
            owner,
            registration_fee,
            state: RwLock::new(LedgerState::default()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of view calls served so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// Total fees held by the contract
    pub async fn collected_fees(&self) -> Wei {
        self.state.read().await.collected_fees
    }

    /// List an address in `getRegisteredUsers` without a stored profile
    ///
    /// Models a contract whose user list and profile map have drifted apart.
    pub async fn insert_dangling(&self, addr: Address) {
        self.state.write().await.registered.push(addr);
    }
}

#[async_trait::async_trait]
impl ContractClient for LocalLedger {
    async fn call(&self, call: ContractCall) -> Result<CallOutput, ChainError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let state = self.state.read().await;

        let output = match call {
            ContractCall::GetUserProfile(addr) => {
                CallOutput::Profile(state.profiles.get(&addr).cloned().unwrap_or_default())
            }
            ContractCall::GetRegisteredUsers { start, count } => {
                CallOutput::Addresses(page(&state.registered, start, count))
            }
            ContractCall::GetTotalUsers => CallOutput::Uint(state.registered.len() as u128),
            ContractCall::GetTotalUsersByLocation(code) => CallOutput::Uint(
                state.by_location.get(&code).map_or(0, |l| l.len()) as u128,
            ),
            ContractCall::GetUsersByLocation(code) => CallOutput::Addresses(
                state.by_location.get(&code).cloned().unwrap_or_default(),
            ),
            ContractCall::GetUsersByLocationPaginated {
                location,
                start,
                count,
            } => CallOutput::Addresses(
                state
                    .by_location
                    .get(&location)
                    .map(|l| page(l, start, count))
                    .unwrap_or_default(),
            ),
            ContractCall::GetTotalUsersBySkill(code) => {
                CallOutput::Uint(state.by_skill.get(&code).map_or(0, |l| l.len()) as u128)
            }
            ContractCall::GetUsersBySkill(code) => {
                CallOutput::Addresses(state.by_skill.get(&code).cloned().unwrap_or_default())
            }
            ContractCall::GetUsersBySkillPaginated { skill, start, count } => CallOutput::Addresses(
                state
                    .by_skill
                    .get(&skill)
                    .map(|l| page(l, start, count))
                    .unwrap_or_default(),
            ),
            ContractCall::Owner => CallOutput::Address(self.owner),
            ContractCall::RegistrationFee => CallOutput::Uint(self.registration_fee),
        };

        Ok(output)
    }

    async fn transact(&self, tx: ContractTransaction) -> Result<TxHash, ChainError> {
        let mut state = self.state.write().await;
        debug!(function = tx.call.name(), from = %tx.from, "local ledger transaction");

        match tx.call {
            ContractWrite::RegisterUser(args) => {
                if state.profiles.contains_key(&tx.from) {
                    return Err(ChainError::Reverted("User already registered".to_string()));
                }
                if tx.value < self.registration_fee {
                    return Err(ChainError::Reverted("Insufficient registration fee".to_string()));
                }
                let record = args.to_record();
                state.index(tx.from, &record);
                state.profiles.insert(tx.from, record);
                state.registered.push(tx.from);
                state.collected_fees += tx.value;
                info!(user = %tx.from, ipfs_hash = %hex::encode(args.ipfs_hash), "UserRegistered");
            }
            ContractWrite::UpdateProfile(args) => {
                if !state.profiles.contains_key(&tx.from) {
                    return Err(ChainError::Reverted("User not registered".to_string()));
                }
                let record = args.to_record();
                state.unindex(&tx.from);
                state.index(tx.from, &record);
                state.profiles.insert(tx.from, record);
                info!(user = %tx.from, ipfs_hash = %hex::encode(args.ipfs_hash), "ProfileUpdated");
            }
            ContractWrite::WithdrawFees => {
                if tx.from != self.owner {
                    return Err(ChainError::Reverted("Only owner can withdraw".to_string()));
                }
                let amount = std::mem::take(&mut state.collected_fees);
                info!(owner = %tx.from, amount, "FeesWithdrawn");
            }
        }

        Ok(state.next_tx_hash(&tx.from))
    }
}
