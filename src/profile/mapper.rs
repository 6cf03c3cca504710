//! Forward and reverse mapping between drafts and on-chain records
//!
//! Forward: a draft is split into the off-chain payload and the category
//! codes the contract stores. Reverse: an on-chain record plus its payload
//! is joined back into a [`UserView`].
//!
//! Unknown keys and unknown codes are errors. Nothing defaults to code 0.

use super::model::{OffchainPayload, RegistrationDraft, UserView};
use super::MappingError;
use crate::chain::{Address, OnchainRecord, RegisterUserArgs};
use crate::registry::{Domain, EnumRegistry};
use crate::storage::ContentHandle;

/// Category codes and experience as stored on-chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryCodes {
    pub location: u8,
    pub primary_skill: u8,
    pub secondary_skill: u8,
    pub status: u8,
    pub language: u8,
    pub years_of_experience: u8,
}

/// A draft split into its off-chain and on-chain halves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRegistration {
    pub payload: OffchainPayload,
    pub codes: CategoryCodes,
}

impl PreparedRegistration {
    /// Contract arguments once the payload has been stored
    pub fn into_args(self, handle: &ContentHandle) -> RegisterUserArgs {
        RegisterUserArgs {
            ipfs_hash: handle.digest(),
            location: self.codes.location,
            primary_skill: self.codes.primary_skill,
            secondary_skill: self.codes.secondary_skill,
            status: self.codes.status,
            language: self.codes.language,
            years_of_experience: self.codes.years_of_experience,
        }
    }
}

/// Split a validated draft
///
/// Free-text fields go into the payload exactly as submitted, empty links
/// included.
pub fn prepare_registration(
    registry: &EnumRegistry,
    draft: &RegistrationDraft,
) -> Result<PreparedRegistration, MappingError> {
    let years_of_experience = match &draft.years_of_experience {
        Some(input) => input
            .years()
            .map_err(|message| MappingError::InvalidExperience(message.to_string()))?
            .unwrap_or(0),
        None => 0,
    };

    let codes = CategoryCodes {
        location: registry.resolve_location(&draft.location)?,
        primary_skill: registry.code_of(Domain::Skill, &draft.primary_skills)?,
        secondary_skill: registry.code_of(Domain::Skill, &draft.secondary_skills)?,
        status: registry.code_of(Domain::ProfessionalStatus, &draft.professional_status)?,
        language: registry.code_of(Domain::Language, &draft.language)?,
        years_of_experience,
    };

    let payload = OffchainPayload {
        full_name: draft.full_name.clone(),
        email: draft.email.clone(),
        telegram_username: draft.telegram_username.clone(),
        linkedin_url: draft.linkedin_url.clone(),
        twitter_url: draft.twitter_url.clone(),
        portfolio_link: draft.portfolio_link.clone(),
    };

    Ok(PreparedRegistration { payload, codes })
}

/// Join an existing on-chain record with its off-chain payload
///
/// Any code without a registry entry fails the whole record.
pub fn decode_record(
    registry: &EnumRegistry,
    address: Address,
    record: &OnchainRecord,
    payload: serde_json::Value,
) -> Result<UserView, MappingError> {
    let payload: OffchainPayload = serde_json::from_value(payload)
        .map_err(|e| MappingError::InvalidPayload(e.to_string()))?;

    let status = registry.key_of(Domain::ProfessionalStatus, record.status)?;

    Ok(UserView {
        address,
        location: registry.key_of(Domain::Location, record.location)?.to_string(),
        primary_skill: registry.key_of(Domain::Skill, record.primary_skill)?.to_string(),
        secondary_skill: registry
            .key_of(Domain::Skill, record.secondary_skill)?
            .to_string(),
        status: status.to_string(),
        language: registry.key_of(Domain::Language, record.language)?.to_string(),
        years_of_experience: record.years_of_experience,
        exists: record.exists,
        professional_status: status.to_string(),
        full_name: payload.full_name,
        email: payload.email,
        telegram_username: payload.telegram_username,
        linkedin_url: payload.linkedin_url,
        twitter_url: payload.twitter_url,
        portfolio_link: payload.portfolio_link,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::fixtures::valid_draft;
    use crate::registry::RegistryError;
    use serde_json::json;
    use std::str::FromStr;

    fn handle() -> ContentHandle {
        ContentHandle::parse("QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG").unwrap()
    }

    #[test]
    fn test_prepare_splits_fields() {
        let registry = EnumRegistry::new().unwrap();
        let prepared = prepare_registration(&registry, &valid_draft()).unwrap();

        assert_eq!(prepared.codes.location, 1);
        assert_eq!(prepared.codes.primary_skill, 2);
        assert_eq!(prepared.codes.secondary_skill, 8);
        assert_eq!(prepared.codes.status, 2);
        assert_eq!(prepared.codes.language, 0);
        assert_eq!(prepared.codes.years_of_experience, 4);

        let payload = serde_json::to_value(&prepared.payload).unwrap();
        assert_eq!(
            payload,
            json!({
                "fullName": "Ada Lovelace",
                "email": "ada@example.com",
                "telegramUsername": "@ada_l",
                "linkedinUrl": "",
                "portfolioLink": "https://ada.dev"
            })
        );
    }

    #[test]
    fn test_prepare_forwards_text_untouched() {
        let registry = EnumRegistry::new().unwrap();
        let draft = RegistrationDraft {
            full_name: "  Ada Lovelace ".into(),
            twitter_url: Some(String::new()),
            ..valid_draft()
        };
        let payload = prepare_registration(&registry, &draft).unwrap().payload;
        assert_eq!(payload.full_name, "  Ada Lovelace ");
        assert_eq!(payload.linkedin_url.as_deref(), Some(""));
        assert_eq!(payload.twitter_url.as_deref(), Some(""));
    }

    #[test]
    fn test_prepare_defaults_missing_experience() {
        let registry = EnumRegistry::new().unwrap();
        let draft = RegistrationDraft {
            years_of_experience: None,
            ..valid_draft()
        };
        let prepared = prepare_registration(&registry, &draft).unwrap();
        assert_eq!(prepared.codes.years_of_experience, 0);
    }

    #[test]
    fn test_unknown_key_is_an_error_not_zero() {
        let registry = EnumRegistry::new().unwrap();
        let draft = RegistrationDraft {
            language: "klingon".into(),
            ..valid_draft()
        };
        let err = prepare_registration(&registry, &draft).unwrap_err();
        assert!(matches!(
            err,
            MappingError::Registry(RegistryError::UnknownKey {
                domain: Domain::Language,
                ..
            })
        ));
    }

    #[test]
    fn test_into_args_carries_handle() {
        let registry = EnumRegistry::new().unwrap();
        let args = prepare_registration(&registry, &valid_draft())
            .unwrap()
            .into_args(&handle());
        assert_eq!(args.ipfs_hash, handle().digest());
        assert_eq!(args.status, 2);
    }

    #[test]
    fn test_forward_then_reverse_reproduces_categories() {
        let registry = EnumRegistry::new().unwrap();
        let address = Address::from_str("0x52908400098527886E0F7030069857D2E4169EE7").unwrap();

        for (location, primary, secondary, status, language) in [
            ("india", "blockchain", "technical_writing", "freelancer", "en"),
            ("other", "community_manager", "full_stack_development", "job_seeker", "pl"),
            ("united_states", "ui_ux_design", "ui_ux_design", "student", "hi"),
        ] {
            let draft = RegistrationDraft {
                location: location.into(),
                primary_skills: primary.into(),
                secondary_skills: secondary.into(),
                professional_status: status.into(),
                language: language.into(),
                ..valid_draft()
            };
            let prepared = prepare_registration(&registry, &draft).unwrap();
            let payload = serde_json::to_value(&prepared.payload).unwrap();
            let record = prepared.into_args(&handle()).to_record();

            let view = decode_record(&registry, address, &record, payload).unwrap();
            assert_eq!(view.location, location);
            assert_eq!(view.primary_skill, primary);
            assert_eq!(view.secondary_skill, secondary);
            assert_eq!(view.status, status);
            assert_eq!(view.professional_status, status);
            assert_eq!(view.language, language);
            assert_eq!(view.full_name, "Ada Lovelace");
            assert_eq!(view.address, address);
        }
    }

    #[test]
    fn test_decode_rejects_unknown_code() {
        let registry = EnumRegistry::new().unwrap();
        let record = OnchainRecord {
            ipfs_hash: handle().digest(),
            location: 0,
            primary_skill: 1,
            secondary_skill: 1,
            status: 0,
            language: 0,
            years_of_experience: 0,
            exists: true,
        };
        let payload = json!({"fullName": "A B", "email": "a@b.co", "telegramUsername": "abcde"});
        let err = decode_record(&registry, Address::ZERO, &record, payload).unwrap_err();
        assert!(matches!(
            err,
            MappingError::Registry(RegistryError::UnknownCode {
                domain: Domain::Location,
                code: 0
            })
        ));
    }

    #[test]
    fn test_decode_rejects_malformed_payload() {
        let registry = EnumRegistry::new().unwrap();
        let record = OnchainRecord {
            location: 1,
            primary_skill: 1,
            secondary_skill: 1,
            exists: true,
            ..Default::default()
        };
        let err = decode_record(&registry, Address::ZERO, &record, json!(["nope"])).unwrap_err();
        assert!(matches!(err, MappingError::InvalidPayload(_)));
    }
}
