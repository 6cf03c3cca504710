//! Draft, payload and view types

use serde::{Deserialize, Serialize};

use crate::chain::Address;

/// Years of experience as submitted by a form: a JSON number or a numeric string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExperienceInput {
    Number(f64),
    Text(String),
}

impl ExperienceInput {
    /// Parse into a whole number of years in `0..=50`
    ///
    /// An empty string counts as absent.
    pub fn years(&self) -> Result<Option<u8>, &'static str> {
        let value = match self {
            ExperienceInput::Number(n) => *n,
            ExperienceInput::Text(s) if s.trim().is_empty() => return Ok(None),
            ExperienceInput::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| "Please enter a valid number of years")?,
        };

        if !value.is_finite() {
            return Err("Please enter a valid number of years");
        }
        if value < 0.0 {
            return Err("Years of experience cannot be negative");
        }
        if value > 50.0 || value.fract() != 0.0 {
            return Err("Please enter a valid number of years");
        }
        // Whole number in 0..=50
        Ok(Some(value as u8))
    }
}

/// Registration form contents as submitted by the client
///
/// Every field defaults so that missing fields surface as validation
/// errors rather than a body parse failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrationDraft {
    pub full_name: String,
    pub email: String,
    /// Country key, label, or free text ending in a country ("Pune, India")
    pub location: String,
    pub language: String,
    pub telegram_username: String,
    pub professional_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portfolio_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years_of_experience: Option<ExperienceInput>,
    #[serde(alias = "primarySkill")]
    pub primary_skills: String,
    #[serde(alias = "secondarySkill")]
    pub secondary_skills: String,
}

/// Free-text profile fields stored off-chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffchainPayload {
    pub full_name: String,
    pub email: String,
    pub telegram_username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portfolio_link: Option<String>,
}

/// On-chain record joined with its off-chain payload
///
/// Categorical fields carry registry keys, so a view can be fed back
/// through the forward mapper unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub address: Address,
    pub location: String,
    pub primary_skill: String,
    pub secondary_skill: String,
    pub status: String,
    pub language: String,
    pub years_of_experience: u8,
    pub exists: bool,
    pub professional_status: String,
    pub full_name: String,
    pub email: String,
    pub telegram_username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portfolio_link: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_experience_accepts_number_and_string() {
        let n: ExperienceInput = serde_json::from_value(json!(7)).unwrap();
        let s: ExperienceInput = serde_json::from_value(json!(" 12 ")).unwrap();
        assert_eq!(n.years(), Ok(Some(7)));
        assert_eq!(s.years(), Ok(Some(12)));
        assert_eq!(ExperienceInput::Text(String::new()).years(), Ok(None));
    }

    #[test]
    fn test_experience_bounds() {
        assert_eq!(
            ExperienceInput::Number(-1.0).years(),
            Err("Years of experience cannot be negative")
        );
        assert_eq!(
            ExperienceInput::Number(51.0).years(),
            Err("Please enter a valid number of years")
        );
        assert_eq!(
            ExperienceInput::Text("ten".into()).years(),
            Err("Please enter a valid number of years")
        );
        assert_eq!(ExperienceInput::Number(50.0).years(), Ok(Some(50)));
    }

    #[test]
    fn test_draft_accepts_missing_fields_and_aliases() {
        let draft: RegistrationDraft = serde_json::from_value(json!({
            "fullName": "Ada",
            "primarySkill": "blockchain"
        }))
        .unwrap();
        assert_eq!(draft.full_name, "Ada");
        assert_eq!(draft.primary_skills, "blockchain");
        assert!(draft.email.is_empty());
        assert!(draft.years_of_experience.is_none());
    }

    #[test]
    fn test_view_omits_absent_links() {
        let view = UserView {
            address: Address::ZERO,
            location: "india".into(),
            primary_skill: "blockchain".into(),
            secondary_skill: "data_science".into(),
            status: "student".into(),
            language: "en".into(),
            years_of_experience: 2,
            exists: true,
            professional_status: "student".into(),
            full_name: "Ada".into(),
            email: "ada@example.com".into(),
            telegram_username: "@ada_l".into(),
            linkedin_url: None,
            twitter_url: Some("https://x.com/ada".into()),
            portfolio_link: None,
        };
        let value = serde_json::to_value(&view).unwrap();
        assert!(value.get("linkedinUrl").is_none());
        assert_eq!(value["twitterUrl"], "https://x.com/ada");
        assert_eq!(value["primarySkill"], "blockchain");
        assert_eq!(value["yearsOfExperience"], 2);
    }
}
