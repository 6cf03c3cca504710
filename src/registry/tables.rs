//! Category tables written to the registry contract.
//!
//! Append only. Codes are positional, so reordering or removing an entry
//! changes the meaning of every record already on-chain.

/// Primary and secondary skills (1-based on-chain)
pub const SKILLS: &[(&str, &str)] = &[
    // Tech
    ("full_stack_development", "Full Stack Development"),
    ("blockchain", "Blockchain"),
    ("ui_ux_design", "UI/UX Design"),
    ("data_science", "Data Science"),
    ("cybersecurity", "Cybersecurity"),
    ("game_development", "Game Development"),
    ("artificial_intelligence", "Artificial Intelligence"),
    ("technical_writing", "Technical Writing"),
    // Non-tech
    ("content_creation", "Content Creation"),
    ("digital_marketing", "Digital Marketing"),
    ("graphic_design", "Graphic Design"),
    ("social_media_management", "Social Media Management"),
    ("video_editing", "Video Editing"),
    ("community_manager", "Community Manager"),
];

/// Professional status (0-based on-chain)
pub const PROFESSIONAL_STATUSES: &[(&str, &str)] = &[
    ("student", "Student"),
    ("employed", "Employed"),
    ("freelancer", "Freelancer"),
    ("job_seeker", "Job Seeker"),
];

/// Preferred language, ISO 639-1 keys (0-based on-chain)
pub const LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("zh", "Chinese"),
    ("es", "Spanish"),
    ("hi", "Hindi"),
    ("ar", "Arabic"),
    ("bn", "Bengali"),
    ("pt", "Portuguese"),
    ("ru", "Russian"),
    ("ja", "Japanese"),
    ("pa", "Punjabi"),
    ("de", "German"),
    ("jv", "Javanese"),
    ("te", "Telugu"),
    ("mr", "Marathi"),
    ("ta", "Tamil"),
    ("fr", "French"),
    ("tr", "Turkish"),
    ("vi", "Vietnamese"),
    ("ko", "Korean"),
    ("ur", "Urdu"),
    ("gu", "Gujarati"),
    ("it", "Italian"),
    ("th", "Thai"),
    ("fa", "Persian"),
    ("pl", "Polish"),
];

/// Country of residence (1-based on-chain)
pub const LOCATIONS: &[(&str, &str)] = &[
    ("india", "India"),
    ("united_states", "United States"),
    ("united_kingdom", "United Kingdom"),
    ("canada", "Canada"),
    ("germany", "Germany"),
    ("france", "France"),
    ("nigeria", "Nigeria"),
    ("kenya", "Kenya"),
    ("south_africa", "South Africa"),
    ("brazil", "Brazil"),
    ("argentina", "Argentina"),
    ("mexico", "Mexico"),
    ("indonesia", "Indonesia"),
    ("vietnam", "Vietnam"),
    ("philippines", "Philippines"),
    ("pakistan", "Pakistan"),
    ("bangladesh", "Bangladesh"),
    ("china", "China"),
    ("japan", "Japan"),
    ("south_korea", "South Korea"),
    ("singapore", "Singapore"),
    ("australia", "Australia"),
    ("turkey", "Turkey"),
    ("united_arab_emirates", "United Arab Emirates"),
    ("spain", "Spain"),
    ("italy", "Italy"),
    ("netherlands", "Netherlands"),
    ("poland", "Poland"),
    ("ukraine", "Ukraine"),
    ("russia", "Russia"),
    ("egypt", "Egypt"),
    ("ghana", "Ghana"),
    ("thailand", "Thailand"),
    ("malaysia", "Malaysia"),
    ("portugal", "Portugal"),
    ("sri_lanka", "Sri Lanka"),
    ("nepal", "Nepal"),
    ("other", "Other"),
];
