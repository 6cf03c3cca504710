//! Profile Mapping
//!
//! A registration draft is validated, then split: free-text fields become
//! an off-chain JSON payload, categorical fields become small integer
//! codes for the contract. The reverse direction joins a record's codes
//! with its fetched payload into a [`UserView`].

pub mod mapper;
pub mod model;
pub mod validation;

pub use mapper::{decode_record, prepare_registration, CategoryCodes, PreparedRegistration};
pub use model::{ExperienceInput, OffchainPayload, RegistrationDraft, UserView};
pub use validation::{validate_draft, FieldError, ValidationError};

use crate::registry::RegistryError;

/// Errors from forward or reverse mapping
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MappingError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Invalid years of experience: {0}")]
    InvalidExperience(String),

    #[error("Invalid profile payload: {0}")]
    InvalidPayload(String),
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::{ExperienceInput, RegistrationDraft};

    pub(crate) fn valid_draft() -> RegistrationDraft {
        RegistrationDraft {
            full_name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            location: "india".into(),
            language: "en".into(),
            telegram_username: "@ada_l".into(),
            professional_status: "freelancer".into(),
            linkedin_url: Some(String::new()),
            twitter_url: None,
            portfolio_link: Some("https://ada.dev".into()),
            years_of_experience: Some(ExperienceInput::Text("4".into())),
            primary_skills: "blockchain".into(),
            secondary_skills: "technical_writing".into(),
        }
    }
}
