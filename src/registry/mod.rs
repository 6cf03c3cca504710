//! Enum Registry
//!
//! Bidirectional mapping between the human-readable category keys used by
//! the registration form and the small integer codes the registry contract
//! stores. Four domains are known: location, skill, professional status and
//! language.
//!
//! Codes are dense and positional. Location and skill count from 1, status
//! and language from 0, because that is how records were first written
//! on-chain. Lookups never default: an unknown key or code is an error the
//! caller has to handle, never a silent code 0.

pub mod tables;

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Categorical domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Domain {
    Location,
    Skill,
    ProfessionalStatus,
    Language,
}

impl Domain {
    pub const ALL: [Domain; 4] = [
        Domain::Location,
        Domain::Skill,
        Domain::ProfessionalStatus,
        Domain::Language,
    ];

    /// Code assigned to the first entry of the domain
    pub fn offset(self) -> u8 {
        match self {
            Domain::Location | Domain::Skill => 1,
            Domain::ProfessionalStatus | Domain::Language => 0,
        }
    }

    fn table(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Domain::Location => tables::LOCATIONS,
            Domain::Skill => tables::SKILLS,
            Domain::ProfessionalStatus => tables::PROFESSIONAL_STATUSES,
            Domain::Language => tables::LANGUAGES,
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Domain::Location => "location",
            Domain::Skill => "skill",
            Domain::ProfessionalStatus => "professional status",
            Domain::Language => "language",
        };
        f.write_str(name)
    }
}

/// Registry lookup errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error("Invalid {domain} name: {key}")]
    UnknownKey { domain: Domain, key: String },

    #[error("Unknown {domain} code: {code}")]
    UnknownCode { domain: Domain, code: u8 },

    #[error("{domain} table has {len} entries, more than a u8 code can address")]
    DomainTooLarge { domain: Domain, len: usize },

    #[error("Duplicate {domain} key: {key}")]
    DuplicateKey { domain: Domain, key: &'static str },
}

/// One option of a domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EnumEntry {
    pub code: u8,
    pub key: &'static str,
    pub label: &'static str,
}

/// Ordered entries of one domain plus a key index
#[derive(Debug, Clone)]
pub struct EnumDomain {
    domain: Domain,
    entries: Vec<EnumEntry>,
    by_key: HashMap<&'static str, usize>,
    by_label: HashMap<String, usize>,
}

impl EnumDomain {
    fn build(domain: Domain) -> Result<Self, RegistryError> {
        let table = domain.table();
        let offset = usize::from(domain.offset());
        if table.len() + offset > usize::from(u8::MAX) + 1 {
            return Err(RegistryError::DomainTooLarge {
                domain,
                len: table.len(),
            });
        }

        let mut entries = Vec::with_capacity(table.len());
        let mut by_key = HashMap::with_capacity(table.len());
        let mut by_label = HashMap::with_capacity(table.len());

        for (index, &(key, label)) in table.iter().enumerate() {
            // Bounded by the length check above
            let code = (index + offset) as u8;
            if by_key.insert(key, index).is_some() {
                return Err(RegistryError::DuplicateKey { domain, key });
            }
            by_label.insert(label.to_lowercase(), index);
            entries.push(EnumEntry { code, key, label });
        }

        Ok(Self {
            domain,
            entries,
            by_key,
            by_label,
        })
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn entries(&self) -> &[EnumEntry] {
        &self.entries
    }

    /// Find the entry for a key or label
    ///
    /// Input is normalised first, so `"Data Science"`, `"data-science"` and
    /// `"data_science"` all resolve to the same entry.
    pub fn lookup(&self, input: &str) -> Option<&EnumEntry> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }
        self.by_key
            .get(trimmed)
            .or_else(|| self.by_key.get(normalize_key(trimmed).as_str()))
            .or_else(|| self.by_label.get(&trimmed.to_lowercase()))
            .map(|&index| &self.entries[index])
    }

    pub fn code_of(&self, key: &str) -> Result<u8, RegistryError> {
        self.lookup(key)
            .map(|entry| entry.code)
            .ok_or_else(|| RegistryError::UnknownKey {
                domain: self.domain,
                key: key.to_string(),
            })
    }

    pub fn entry(&self, code: u8) -> Option<&EnumEntry> {
        let index = code.checked_sub(self.domain.offset())?;
        self.entries.get(usize::from(index))
    }

    pub fn key_of(&self, code: u8) -> Result<&'static str, RegistryError> {
        self.entry(code)
            .map(|entry| entry.key)
            .ok_or(RegistryError::UnknownCode {
                domain: self.domain,
                code,
            })
    }
}

/// All four domains, built once at startup and shared read-only
#[derive(Debug, Clone)]
pub struct EnumRegistry {
    location: EnumDomain,
    skill: EnumDomain,
    status: EnumDomain,
    language: EnumDomain,
}

impl EnumRegistry {
    pub fn new() -> Result<Self, RegistryError> {
        Ok(Self {
            location: EnumDomain::build(Domain::Location)?,
            skill: EnumDomain::build(Domain::Skill)?,
            status: EnumDomain::build(Domain::ProfessionalStatus)?,
            language: EnumDomain::build(Domain::Language)?,
        })
    }

    pub fn domain(&self, domain: Domain) -> &EnumDomain {
        match domain {
            Domain::Location => &self.location,
            Domain::Skill => &self.skill,
            Domain::ProfessionalStatus => &self.status,
            Domain::Language => &self.language,
        }
    }

    pub fn code_of(&self, domain: Domain, key: &str) -> Result<u8, RegistryError> {
        self.domain(domain).code_of(key)
    }

    pub fn key_of(&self, domain: Domain, code: u8) -> Result<&'static str, RegistryError> {
        self.domain(domain).key_of(code)
    }

    /// Resolve a free-text location such as `"Kolkata, India"`
    ///
    /// Tries the whole string first, then the last comma-separated part.
    pub fn resolve_location(&self, text: &str) -> Result<u8, RegistryError> {
        let domain = &self.location;
        if let Some(entry) = domain.lookup(text) {
            return Ok(entry.code);
        }
        text.rsplit(',')
            .next()
            .and_then(|country| domain.lookup(country))
            .map(|entry| entry.code)
            .ok_or_else(|| RegistryError::UnknownKey {
                domain: Domain::Location,
                key: text.to_string(),
            })
    }
}

/// Lowercase, trim, and fold spaces, hyphens and slashes into underscores
pub fn normalize_key(input: &str) -> String {
    let mut key = String::with_capacity(input.len());
    let mut pending_sep = false;
    for c in input.trim().chars() {
        if c.is_whitespace() || c == '-' || c == '/' || c == '_' {
            pending_sep = !key.is_empty();
        } else {
            if pending_sep {
                key.push('_');
                pending_sep = false;
            }
            key.extend(c.to_lowercase());
        }
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn registry() -> EnumRegistry {
        EnumRegistry::new().unwrap()
    }

    #[test]
    fn test_round_trip_every_domain() {
        let registry = registry();
        for domain in Domain::ALL {
            for entry in registry.domain(domain).entries() {
                let code = registry.code_of(domain, entry.key).unwrap();
                assert_eq!(registry.key_of(domain, code).unwrap(), entry.key);
            }
        }
    }

    #[test]
    fn test_codes_are_dense_and_distinct() {
        let registry = registry();
        for domain in Domain::ALL {
            let entries = registry.domain(domain).entries();
            let codes: HashSet<u8> = entries.iter().map(|e| e.code).collect();
            assert_eq!(codes.len(), entries.len(), "duplicate code in {}", domain);

            for (i, entry) in entries.iter().enumerate() {
                assert_eq!(usize::from(entry.code), i + usize::from(domain.offset()));
            }
        }
    }

    #[test]
    fn test_offsets_match_onchain_encoding() {
        let registry = registry();
        assert_eq!(registry.code_of(Domain::Skill, "full_stack_development").unwrap(), 1);
        assert_eq!(registry.code_of(Domain::Location, "india").unwrap(), 1);
        assert_eq!(registry.code_of(Domain::ProfessionalStatus, "student").unwrap(), 0);
        assert_eq!(registry.code_of(Domain::Language, "en").unwrap(), 0);
        assert_eq!(registry.code_of(Domain::Language, "pl").unwrap(), 24);
    }

    #[test]
    fn test_unknown_key_is_an_error_not_zero() {
        let registry = registry();
        let err = registry.code_of(Domain::Language, "klingon").unwrap_err();
        assert_eq!(
            err,
            RegistryError::UnknownKey {
                domain: Domain::Language,
                key: "klingon".to_string()
            }
        );
        assert!(registry.code_of(Domain::Skill, "").is_err());
    }

    #[test]
    fn test_code_below_offset_is_unknown() {
        let registry = registry();
        assert!(matches!(
            registry.key_of(Domain::Skill, 0),
            Err(RegistryError::UnknownCode { code: 0, .. })
        ));
        assert!(registry.key_of(Domain::ProfessionalStatus, 4).is_err());
        assert_eq!(registry.key_of(Domain::ProfessionalStatus, 3).unwrap(), "job_seeker");
    }

    #[test]
    fn test_lookup_accepts_labels_and_loose_keys() {
        let registry = registry();
        let code = registry.code_of(Domain::Skill, "data_science").unwrap();
        assert_eq!(registry.code_of(Domain::Skill, "Data Science").unwrap(), code);
        assert_eq!(registry.code_of(Domain::Skill, " data-science ").unwrap(), code);
        assert_eq!(registry.code_of(Domain::Skill, "UI/UX Design").unwrap(), 3);
        assert_eq!(registry.code_of(Domain::Language, "Spanish").unwrap(), 2);
    }

    #[test]
    fn test_resolve_free_text_location() {
        let registry = registry();
        let india = registry.code_of(Domain::Location, "india").unwrap();
        assert_eq!(registry.resolve_location("Kolkata, India").unwrap(), india);
        assert_eq!(registry.resolve_location("India").unwrap(), india);
        assert_eq!(
            registry.resolve_location("Austin, United States").unwrap(),
            registry.code_of(Domain::Location, "united_states").unwrap()
        );
        assert!(registry.resolve_location("Atlantis").is_err());
    }

    #[test]
    fn test_labels_resolve_to_codes() {
        let registry = registry();
        assert_eq!(registry.code_of(Domain::Language, "English").unwrap(), 0);
        assert_eq!(registry.code_of(Domain::Skill, "Community Manager").unwrap(), 14);
        assert_eq!(registry.key_of(Domain::Skill, 14).unwrap(), "community_manager");
        assert!(registry.key_of(Domain::Skill, 15).is_err());
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("  Full Stack  Development "), "full_stack_development");
        assert_eq!(normalize_key("UI/UX Design"), "ui_ux_design");
        assert_eq!(normalize_key("job-seeker"), "job_seeker");
        assert_eq!(normalize_key(""), "");
    }
}
