//! On-chain Record Client
//!
//! The registry contract is reached through [`ContractClient`]. Every
//! supported contract function is a variant of [`ContractCall`] (views) or
//! [`ContractWrite`] (state-changing), each carrying its typed arguments,
//! so an unsupported function name cannot be expressed.
//!
//! Two implementations exist:
//!
//! - [`JsonRpcContractClient`]: `eth_call` / `eth_sendTransaction` against
//!   an EVM JSON-RPC node
//! - [`LocalLedger`]: in-process contract semantics for dev mode and tests
//!
//! Nothing here retries. A reverted call or failed transaction is surfaced
//! to the caller as-is.

pub mod abi;
pub mod address;
pub mod ledger;
pub mod rpc;

pub use address::Address;
pub use ledger::LocalLedger;
pub use rpc::{JsonRpcConfig, JsonRpcContractClient};

use serde::{Deserialize, Serialize};

/// Amount in the chain's smallest native unit
pub type Wei = u128;

/// 0.05 EDU
pub const DEFAULT_REGISTRATION_FEE_WEI: Wei = 50_000_000_000_000_000;

/// Errors from the contract call layer
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChainError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("RPC transport error: {0}")]
    Transport(String),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Execution reverted: {0}")]
    Reverted(String),

    #[error("Failed to decode contract response: {0}")]
    Decode(String),

    #[error("Unexpected output for {call}: expected {expected}")]
    UnexpectedOutput {
        call: &'static str,
        expected: &'static str,
    },

    #[error("No sender account configured for transactions")]
    MissingSender,
}

/// Stored registry record, keyed by account address
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnchainRecord {
    /// sha2-256 digest of the payload's CIDv0
    pub ipfs_hash: [u8; 32],
    pub location: u8,
    pub primary_skill: u8,
    pub secondary_skill: u8,
    pub status: u8,
    pub language: u8,
    pub years_of_experience: u8,
    pub exists: bool,
}

/// Arguments of `registerUser` / `updateProfile`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserArgs {
    pub ipfs_hash: [u8; 32],
    pub location: u8,
    pub primary_skill: u8,
    pub secondary_skill: u8,
    pub status: u8,
    pub language: u8,
    pub years_of_experience: u8,
}

impl RegisterUserArgs {
    fn tokens(&self) -> Vec<abi::Token> {
        use abi::Token;
        vec![
            Token::Bytes32(self.ipfs_hash),
            Token::Uint(self.location.into()),
            Token::Uint(self.primary_skill.into()),
            Token::Uint(self.secondary_skill.into()),
            Token::Uint(self.status.into()),
            Token::Uint(self.language.into()),
            Token::Uint(self.years_of_experience.into()),
        ]
    }

    /// Record the contract stores for these arguments
    pub fn to_record(&self) -> OnchainRecord {
        OnchainRecord {
            ipfs_hash: self.ipfs_hash,
            location: self.location,
            primary_skill: self.primary_skill,
            secondary_skill: self.secondary_skill,
            status: self.status,
            language: self.language,
            years_of_experience: self.years_of_experience,
            exists: true,
        }
    }
}

/// Contract view functions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractCall {
    GetUserProfile(Address),
    GetRegisteredUsers { start: u64, count: u64 },
    GetTotalUsers,
    GetTotalUsersByLocation(u8),
    GetUsersByLocation(u8),
    GetUsersByLocationPaginated { location: u8, start: u64, count: u64 },
    GetTotalUsersBySkill(u8),
    GetUsersBySkill(u8),
    GetUsersBySkillPaginated { skill: u8, start: u64, count: u64 },
    Owner,
    RegistrationFee,
}

/// Shape of a view function's return value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Profile,
    Addresses,
    Uint,
    Address,
}

impl ContractCall {
    pub fn name(&self) -> &'static str {
        match self {
            ContractCall::GetUserProfile(_) => "getUserProfile",
            ContractCall::GetRegisteredUsers { .. } => "getRegisteredUsers",
            ContractCall::GetTotalUsers => "getTotalUsers",
            ContractCall::GetTotalUsersByLocation(_) => "getTotalUsersByLocation",
            ContractCall::GetUsersByLocation(_) => "getUsersByLocation",
            ContractCall::GetUsersByLocationPaginated { .. } => "getUsersByLocationPaginated",
            ContractCall::GetTotalUsersBySkill(_) => "getTotalUsersBySkill",
            ContractCall::GetUsersBySkill(_) => "getUsersBySkill",
            ContractCall::GetUsersBySkillPaginated { .. } => "getUsersBySkillPaginated",
            ContractCall::Owner => "owner",
            ContractCall::RegistrationFee => "REGISTRATION_FEE",
        }
    }

    pub fn signature(&self) -> &'static str {
        match self {
            ContractCall::GetUserProfile(_) => "getUserProfile(address)",
            ContractCall::GetRegisteredUsers { .. } => "getRegisteredUsers(uint256,uint256)",
            ContractCall::GetTotalUsers => "getTotalUsers()",
            ContractCall::GetTotalUsersByLocation(_) => "getTotalUsersByLocation(uint8)",
            ContractCall::GetUsersByLocation(_) => "getUsersByLocation(uint8)",
            ContractCall::GetUsersByLocationPaginated { .. } => {
                "getUsersByLocationPaginated(uint8,uint256,uint256)"
            }
            ContractCall::GetTotalUsersBySkill(_) => "getTotalUsersBySkill(uint8)",
            ContractCall::GetUsersBySkill(_) => "getUsersBySkill(uint8)",
            ContractCall::GetUsersBySkillPaginated { .. } => {
                "getUsersBySkillPaginated(uint8,uint256,uint256)"
            }
            ContractCall::Owner => "owner()",
            ContractCall::RegistrationFee => "REGISTRATION_FEE()",
        }
    }

    pub fn output_kind(&self) -> OutputKind {
        match self {
            ContractCall::GetUserProfile(_) => OutputKind::Profile,
            ContractCall::GetRegisteredUsers { .. }
            | ContractCall::GetUsersByLocation(_)
            | ContractCall::GetUsersByLocationPaginated { .. }
            | ContractCall::GetUsersBySkill(_)
            | ContractCall::GetUsersBySkillPaginated { .. } => OutputKind::Addresses,
            ContractCall::GetTotalUsers
            | ContractCall::GetTotalUsersByLocation(_)
            | ContractCall::GetTotalUsersBySkill(_)
            | ContractCall::RegistrationFee => OutputKind::Uint,
            ContractCall::Owner => OutputKind::Address,
        }
    }

    /// ABI-encoded calldata
    pub fn calldata(&self) -> Vec<u8> {
        use abi::Token;
        let tokens = match self {
            ContractCall::GetUserProfile(addr) => vec![Token::Address(*addr)],
            ContractCall::GetRegisteredUsers { start, count } => {
                vec![Token::Uint((*start).into()), Token::Uint((*count).into())]
            }
            ContractCall::GetTotalUsers | ContractCall::Owner | ContractCall::RegistrationFee => {
                vec![]
            }
            ContractCall::GetTotalUsersByLocation(code)
            | ContractCall::GetUsersByLocation(code)
            | ContractCall::GetTotalUsersBySkill(code)
            | ContractCall::GetUsersBySkill(code) => vec![Token::Uint((*code).into())],
            ContractCall::GetUsersByLocationPaginated {
                location: code,
                start,
                count,
            }
            | ContractCall::GetUsersBySkillPaginated {
                skill: code,
                start,
                count,
            } => vec![
                Token::Uint((*code).into()),
                Token::Uint((*start).into()),
                Token::Uint((*count).into()),
            ],
        };
        abi::encode_call(self.signature(), &tokens)
    }
}

/// Contract state-changing functions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractWrite {
    RegisterUser(RegisterUserArgs),
    UpdateProfile(RegisterUserArgs),
    WithdrawFees,
}

impl ContractWrite {
    pub fn name(&self) -> &'static str {
        match self {
            ContractWrite::RegisterUser(_) => "registerUser",
            ContractWrite::UpdateProfile(_) => "updateProfile",
            ContractWrite::WithdrawFees => "withdrawFees",
        }
    }

    pub fn signature(&self) -> &'static str {
        match self {
            ContractWrite::RegisterUser(_) => {
                "registerUser(bytes32,uint8,uint8,uint8,uint8,uint8,uint8)"
            }
            ContractWrite::UpdateProfile(_) => {
                "updateProfile(bytes32,uint8,uint8,uint8,uint8,uint8,uint8)"
            }
            ContractWrite::WithdrawFees => "withdrawFees()",
        }
    }

    pub fn calldata(&self) -> Vec<u8> {
        let tokens = match self {
            ContractWrite::RegisterUser(args) | ContractWrite::UpdateProfile(args) => args.tokens(),
            ContractWrite::WithdrawFees => vec![],
        };
        abi::encode_call(self.signature(), &tokens)
    }
}

/// A write plus the account and payment attached to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractTransaction {
    pub from: Address,
    pub call: ContractWrite,
    pub value: Wei,
}

/// Decoded return value of a view function
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutput {
    Profile(OnchainRecord),
    Addresses(Vec<Address>),
    Uint(u128),
    Address(Address),
}

impl CallOutput {
    fn mismatch(call: &'static str, expected: &'static str) -> ChainError {
        ChainError::UnexpectedOutput { call, expected }
    }

    pub fn into_profile(self, call: &'static str) -> Result<OnchainRecord, ChainError> {
        match self {
            CallOutput::Profile(record) => Ok(record),
            _ => Err(Self::mismatch(call, "profile")),
        }
    }

    pub fn into_addresses(self, call: &'static str) -> Result<Vec<Address>, ChainError> {
        match self {
            CallOutput::Addresses(list) => Ok(list),
            _ => Err(Self::mismatch(call, "address[]")),
        }
    }

    pub fn into_uint(self, call: &'static str) -> Result<u128, ChainError> {
        match self {
            CallOutput::Uint(value) => Ok(value),
            _ => Err(Self::mismatch(call, "uint256")),
        }
    }

    pub fn into_address(self, call: &'static str) -> Result<Address, ChainError> {
        match self {
            CallOutput::Address(addr) => Ok(addr),
            _ => Err(Self::mismatch(call, "address")),
        }
    }
}

/// Transaction hash as returned by the node (`0x` + 64 hex)
pub type TxHash = String;

/// Access to the registry contract
#[async_trait::async_trait]
pub trait ContractClient: Send + Sync {
    /// Execute a view function
    async fn call(&self, call: ContractCall) -> Result<CallOutput, ChainError>;

    /// Submit a state-changing transaction
    async fn transact(&self, tx: ContractTransaction) -> Result<TxHash, ChainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_args() -> RegisterUserArgs {
        RegisterUserArgs {
            ipfs_hash: [0xab; 32],
            location: 1,
            primary_skill: 2,
            secondary_skill: 3,
            status: 0,
            language: 4,
            years_of_experience: 5,
        }
    }

    #[test]
    fn test_calldata_starts_with_selector() {
        let call = ContractCall::GetUserProfile(Address::ZERO);
        let data = call.calldata();
        assert_eq!(&data[..4], &abi::selector("getUserProfile(address)"));
        assert_eq!(data.len(), 4 + 32);

        let owner = ContractCall::Owner.calldata();
        assert_eq!(hex::encode(owner), "8da5cb5b");
    }

    #[test]
    fn test_paginated_calldata_has_three_words() {
        let call = ContractCall::GetUsersBySkillPaginated {
            skill: 2,
            start: 10,
            count: 5,
        };
        let data = call.calldata();
        assert_eq!(data.len(), 4 + 3 * 32);
        assert_eq!(data[4 + 31], 2);
        assert_eq!(data[4 + 63], 10);
        assert_eq!(data[4 + 95], 5);
    }

    #[test]
    fn test_write_selectors_match_deployed_contract() {
        let args = sample_args();
        let register = ContractWrite::RegisterUser(args.clone()).calldata();
        let update = ContractWrite::UpdateProfile(args).calldata();
        let withdraw = ContractWrite::WithdrawFees.calldata();

        assert_eq!(hex::encode(&register[..4]), "896e42ad");
        assert_eq!(hex::encode(&update[..4]), "e1e01490");
        assert_eq!(hex::encode(withdraw), "476343ee");
    }

    #[test]
    fn test_read_selectors_match_deployed_contract() {
        let profile = ContractCall::GetUserProfile(Address::ZERO).calldata();
        assert_eq!(hex::encode(&profile[..4]), "987ee156");
        let by_location = ContractCall::GetTotalUsersByLocation(1).calldata();
        assert_eq!(hex::encode(&by_location[..4]), "d10a5bb8");
    }

    #[test]
    fn test_register_calldata_layout() {
        let write = ContractWrite::RegisterUser(sample_args());
        let data = write.calldata();
        // selector + bytes32 + six uint8 words, all static
        assert_eq!(data.len(), 4 + 7 * 32);
        assert!(data[4..4 + 32].iter().all(|b| *b == 0xab));
        assert_eq!(data[4 + 5 * 32 + 31], 4);
        assert_eq!(data[4 + 6 * 32 + 31], 5);
    }

    #[test]
    fn test_output_kinds() {
        assert_eq!(ContractCall::Owner.output_kind(), OutputKind::Address);
        assert_eq!(ContractCall::RegistrationFee.output_kind(), OutputKind::Uint);
        assert_eq!(
            ContractCall::GetRegisteredUsers { start: 0, count: 10 }.output_kind(),
            OutputKind::Addresses
        );
    }

    #[test]
    fn test_output_mismatch_is_reported() {
        let err = CallOutput::Uint(1).into_addresses("owner").unwrap_err();
        assert_eq!(
            err,
            ChainError::UnexpectedOutput {
                call: "owner",
                expected: "address[]"
            }
        );
    }

    #[test]
    fn test_args_to_record() {
        let record = sample_args().to_record();
        assert!(record.exists);
        assert_eq!(record.ipfs_hash, [0xab; 32]);
        assert_eq!(record.years_of_experience, 5);
    }
}
