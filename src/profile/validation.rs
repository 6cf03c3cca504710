//! Registration form rules
//!
//! Every rule runs; failures are collected so the client can show all of
//! them at once.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

use super::model::RegistrationDraft;
use crate::registry::{Domain, EnumRegistry};
use crate::waitlist::is_valid_email;

/// One failed rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// All failed rules for a draft
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", join_errors(.errors))]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

fn telegram_regex() -> &'static Regex {
    static TELEGRAM: OnceLock<Regex> = OnceLock::new();
    TELEGRAM.get_or_init(|| {
        Regex::new(r"^@?[a-zA-Z0-9_]{5,}$")
            .unwrap_or_else(|_| unreachable!("telegram pattern is a valid regex"))
    })
}

fn is_absolute_url(value: &str) -> bool {
    reqwest::Url::parse(value).is_ok()
}

/// Check a draft against the form rules
pub fn validate_draft(
    registry: &EnumRegistry,
    draft: &RegistrationDraft,
) -> Result<(), ValidationError> {
    let mut errors = Vec::new();
    let mut fail = |field: &'static str, message: &str| {
        errors.push(FieldError {
            field,
            message: message.to_string(),
        })
    };

    let name_len = draft.full_name.chars().count();
    if name_len < 2 {
        fail("fullName", "Full name must be at least 2 characters long");
    } else if name_len > 50 {
        fail("fullName", "Full name must be less than 50 characters long");
    }

    if !is_valid_email(&draft.email) {
        fail("email", "Please enter a valid email address");
    }

    let location_len = draft.location.chars().count();
    if location_len < 2 {
        fail("location", "Please enter your country");
    } else if location_len > 50 {
        fail("location", "Location must be less than 50 characters long");
    } else if registry.resolve_location(&draft.location).is_err() {
        fail("location", "Please enter your country");
    }

    if registry.code_of(Domain::Language, &draft.language).is_err() {
        fail("language", "Please select a language");
    }

    let telegram = draft.telegram_username.as_str();
    if telegram.chars().count() < 5 {
        fail("telegramUsername", "Please enter your Telegram username");
    } else if !telegram_regex().is_match(telegram) {
        fail("telegramUsername", "Please enter a valid Telegram username");
    }

    if registry
        .code_of(Domain::ProfessionalStatus, &draft.professional_status)
        .is_err()
    {
        fail("professionalStatus", "Please select your professional status");
    }

    let links = [
        ("linkedinUrl", &draft.linkedin_url, "Please enter a valid LinkedIn URL"),
        ("twitterUrl", &draft.twitter_url, "Please enter a valid Twitter URL"),
        ("portfolioLink", &draft.portfolio_link, "Please enter a valid portfolio URL"),
    ];
    for (field, value, message) in links {
        if let Some(url) = value.as_deref() {
            if !url.is_empty() && !is_absolute_url(url) {
                fail(field, message);
            }
        }
    }

    if let Some(years) = &draft.years_of_experience {
        if let Err(message) = years.years() {
            fail("yearsOfExperience", message);
        }
    }

    if registry.code_of(Domain::Skill, &draft.primary_skills).is_err() {
        fail("primarySkills", "Please select your primary skill");
    }
    if registry.code_of(Domain::Skill, &draft.secondary_skills).is_err() {
        fail("secondarySkills", "Please select your secondary skill");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { errors })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::fixtures::valid_draft;
    use crate::profile::model::ExperienceInput;

    fn fields(err: ValidationError) -> Vec<&'static str> {
        err.errors.into_iter().map(|e| e.field).collect()
    }

    #[test]
    fn test_valid_draft_passes() {
        let registry = EnumRegistry::new().unwrap();
        assert!(validate_draft(&registry, &valid_draft()).is_ok());
    }

    #[test]
    fn test_free_text_location_passes() {
        let registry = EnumRegistry::new().unwrap();
        let draft = RegistrationDraft {
            location: "Kolkata, India".into(),
            ..valid_draft()
        };
        assert!(validate_draft(&registry, &draft).is_ok());
    }

    #[test]
    fn test_collects_every_failure() {
        let registry = EnumRegistry::new().unwrap();
        let draft = RegistrationDraft {
            full_name: "A".into(),
            email: "not-an-email".into(),
            telegram_username: "ab".into(),
            twitter_url: Some("twitter dot com".into()),
            years_of_experience: Some(ExperienceInput::Number(-3.0)),
            primary_skills: "juggling".into(),
            ..valid_draft()
        };

        let err = validate_draft(&registry, &draft).unwrap_err();
        assert_eq!(
            fields(err.clone()),
            vec![
                "fullName",
                "email",
                "telegramUsername",
                "twitterUrl",
                "yearsOfExperience",
                "primarySkills"
            ]
        );
        assert!(err
            .to_string()
            .starts_with("fullName: Full name must be at least 2 characters long; "));
    }

    #[test]
    fn test_telegram_pattern() {
        let registry = EnumRegistry::new().unwrap();
        let draft = RegistrationDraft {
            telegram_username: "@bad-handle".into(),
            ..valid_draft()
        };
        let err = validate_draft(&registry, &draft).unwrap_err();
        assert_eq!(err.errors[0].message, "Please enter a valid Telegram username");
    }

    #[test]
    fn test_values_are_checked_as_submitted() {
        let registry = EnumRegistry::new().unwrap();
        let draft = RegistrationDraft {
            email: " ada@example.com".into(),
            ..valid_draft()
        };
        let err = validate_draft(&registry, &draft).unwrap_err();
        assert_eq!(fields(err), vec!["email"]);

        // padding counts toward the length, as submitted
        let draft = RegistrationDraft {
            full_name: " A".into(),
            ..valid_draft()
        };
        assert!(validate_draft(&registry, &draft).is_ok());
    }

    #[test]
    fn test_empty_draft_reports_required_fields() {
        let registry = EnumRegistry::new().unwrap();
        let err = validate_draft(&registry, &RegistrationDraft::default()).unwrap_err();
        let fields = fields(err);
        for field in [
            "fullName",
            "email",
            "location",
            "language",
            "telegramUsername",
            "professionalStatus",
            "primarySkills",
            "secondarySkills",
        ] {
            assert!(fields.contains(&field), "missing {}", field);
        }
    }
}
