//! Services layer
//!
//! Orchestration between the enum registry, the contract client and the
//! content store.
//!
//! - **UserDirectory**: record lookups joined with off-chain payloads
//! - **RegistrationService**: validate, pin, then submit the transaction

pub mod directory;
pub mod registration;

pub use directory::{ContractInfo, DirectoryError, Page, UserDirectory};
pub use registration::{RegistrationError, RegistrationReceipt, RegistrationService};
