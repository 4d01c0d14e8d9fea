//! Rule Registry - Platform Contracts
//!
//! One immutable rule set per platform, keyed by a closed enum.
//! Unknown platform ids resolve to the Facebook rules for caption checks.

use log::{debug, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use crate::hashing::compute_fingerprint;
use crate::ENGINE_VERSION;

pub const BUNDLED_RULES_VERSION: &str = "1.0.0";

/// Platform used when a caption targets an id outside the supported set.
pub const FALLBACK_PLATFORM: Platform = Platform::Facebook;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    Facebook,
    Twitter,
    Linkedin,
    Youtube,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::Instagram,
        Platform::Facebook,
        Platform::Twitter,
        Platform::Linkedin,
        Platform::Youtube,
    ];

    /// Case-sensitive match against the lowercase ids.
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "instagram" => Some(Self::Instagram),
            "facebook" => Some(Self::Facebook),
            "twitter" => Some(Self::Twitter),
            "linkedin" => Some(Self::Linkedin),
            "youtube" => Some(Self::Youtube),
            _ => None,
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            Self::Instagram => "instagram",
            Self::Facebook => "facebook",
            Self::Twitter => "twitter",
            Self::Linkedin => "linkedin",
            Self::Youtube => "youtube",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Instagram => "Instagram",
            Self::Facebook => "Facebook",
            Self::Twitter => "Twitter",
            Self::Linkedin => "LinkedIn",
            Self::Youtube => "YouTube",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Platform {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_id(s).ok_or_else(|| RuleError::UnknownPlatform(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UrlPolicy {
    /// Links render as clickable
    Allowed,
    /// Links show as plain text
    Disallowed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaLimits {
    pub images: usize,
    pub videos: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlatformRuleSet {
    pub max_characters: usize,
    /// `None` means unbounded
    #[serde(default)]
    pub max_hashtags: Option<usize>,
    pub hashtag_recommendation: usize,
    pub url_policy: UrlPolicy,
    pub emoji_limit: usize,
    pub media_limits: MediaLimits,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_title_characters: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tags_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tags_chars: Option<usize>,
    #[serde(default)]
    pub static_warnings: Vec<String>,
}

impl PlatformRuleSet {
    /// Bundled defaults for a platform.
    pub fn bundled(platform: Platform) -> Self {
        match platform {
            Platform::Instagram => Self {
                max_characters: 2200,
                max_hashtags: Some(30),
                hashtag_recommendation: 11,
                url_policy: UrlPolicy::Disallowed,
                emoji_limit: 30,
                media_limits: MediaLimits { images: 10, videos: 10 },
                max_title_characters: None,
                max_tags_count: None,
                max_tags_chars: None,
                static_warnings: vec![
                    "Instagram captions are truncated after 125 characters in the feed".to_string(),
                ],
            },
            Platform::Facebook => Self {
                max_characters: 63206,
                max_hashtags: None,
                hashtag_recommendation: 3,
                url_policy: UrlPolicy::Allowed,
                emoji_limit: 50,
                media_limits: MediaLimits { images: 10, videos: 1 },
                max_title_characters: None,
                max_tags_count: None,
                max_tags_chars: None,
                static_warnings: vec![],
            },
            Platform::Twitter => Self {
                max_characters: 280,
                max_hashtags: None,
                hashtag_recommendation: 2,
                url_policy: UrlPolicy::Allowed,
                emoji_limit: 10,
                media_limits: MediaLimits { images: 4, videos: 1 },
                max_title_characters: None,
                max_tags_count: None,
                max_tags_chars: None,
                static_warnings: vec![],
            },
            Platform::Linkedin => Self {
                max_characters: 3000,
                max_hashtags: None,
                hashtag_recommendation: 5,
                url_policy: UrlPolicy::Allowed,
                emoji_limit: 5,
                media_limits: MediaLimits { images: 9, videos: 1 },
                max_title_characters: None,
                max_tags_count: None,
                max_tags_chars: None,
                static_warnings: vec![
                    "LinkedIn shows only the first 210 characters before \"see more\"".to_string(),
                ],
            },
            Platform::Youtube => Self {
                max_characters: 5000,
                max_hashtags: Some(15),
                hashtag_recommendation: 3,
                url_policy: UrlPolicy::Allowed,
                emoji_limit: 20,
                media_limits: MediaLimits { images: 1, videos: 1 },
                max_title_characters: Some(100),
                max_tags_count: Some(30),
                max_tags_chars: Some(500),
                static_warnings: vec![
                    "YouTube shows only the first 3 hashtags above the video title".to_string(),
                ],
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("Failed to read rules file {}: {1}", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Invalid rules document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid version '{0}': {1}")]
    InvalidVersion(String, #[source] semver::Error),

    #[error("Rules version {0} requires engine >= {1}, current is {2}")]
    EngineVersionMismatch(String, String, String),

    #[error("Unknown platform: {0}")]
    UnknownPlatform(String),
}

/// On-disk overlay for the bundled rule table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesDocument {
    pub rules_version: String,
    #[serde(default = "default_engine_min_version")]
    pub engine_min_version: String,
    /// Keyed by platform id; omitted platforms keep their bundled rules
    #[serde(default)]
    pub platforms: BTreeMap<String, PlatformRuleSet>,
}

fn default_engine_min_version() -> String {
    crate::MIN_ENGINE_VERSION.to_string()
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
struct PlatformTable {
    instagram: PlatformRuleSet,
    facebook: PlatformRuleSet,
    twitter: PlatformRuleSet,
    linkedin: PlatformRuleSet,
    youtube: PlatformRuleSet,
}

impl PlatformTable {
    fn slot(&mut self, platform: Platform) -> &mut PlatformRuleSet {
        match platform {
            Platform::Instagram => &mut self.instagram,
            Platform::Facebook => &mut self.facebook,
            Platform::Twitter => &mut self.twitter,
            Platform::Linkedin => &mut self.linkedin,
            Platform::Youtube => &mut self.youtube,
        }
    }
}

/// Read-only rule table. Rule sets cannot be changed once the registry is built.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RuleRegistry {
    rules_version: String,
    platforms: PlatformTable,
}

static BUILTIN: Lazy<RuleRegistry> = Lazy::new(|| {
    debug!("Building bundled rule registry v{}", BUNDLED_RULES_VERSION);
    RuleRegistry::bundled()
});

/// The bundled registry, built once per process.
pub fn builtin() -> &'static RuleRegistry {
    &BUILTIN
}

impl RuleRegistry {
    pub fn bundled() -> Self {
        Self {
            rules_version: BUNDLED_RULES_VERSION.to_string(),
            platforms: PlatformTable {
                instagram: PlatformRuleSet::bundled(Platform::Instagram),
                facebook: PlatformRuleSet::bundled(Platform::Facebook),
                twitter: PlatformRuleSet::bundled(Platform::Twitter),
                linkedin: PlatformRuleSet::bundled(Platform::Linkedin),
                youtube: PlatformRuleSet::bundled(Platform::Youtube),
            },
        }
    }

    /// Bundled defaults with the document's platforms laid over them.
    pub fn from_document(document: RulesDocument) -> Result<Self, RuleError> {
        check_engine_version(&document)?;

        let mut registry = Self::bundled();
        registry.rules_version = document.rules_version;
        for (id, rules) in document.platforms {
            let platform: Platform = id.parse()?;
            debug!("Overriding {} rules from rules document", platform);
            *registry.platforms.slot(platform) = rules;
        }
        Ok(registry)
    }

    pub fn from_json_str(json: &str) -> Result<Self, RuleError> {
        let document: RulesDocument = serde_json::from_str(json)?;
        Self::from_document(document)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, RuleError> {
        let content =
            fs::read_to_string(path).map_err(|e| RuleError::Io(path.to_path_buf(), e))?;
        Self::from_json_str(&content).map_err(|e| {
            warn!("Rejected rules file {}: {}", path.display(), e);
            e
        })
    }

    pub fn rules_version(&self) -> &str {
        &self.rules_version
    }

    /// Total over the platform enum.
    pub fn get(&self, platform: Platform) -> &PlatformRuleSet {
        match platform {
            Platform::Instagram => &self.platforms.instagram,
            Platform::Facebook => &self.platforms.facebook,
            Platform::Twitter => &self.platforms.twitter,
            Platform::Linkedin => &self.platforms.linkedin,
            Platform::Youtube => &self.platforms.youtube,
        }
    }

    /// Rule set for a raw platform id, falling back to Facebook.
    pub fn lookup(&self, platform: &str) -> &PlatformRuleSet {
        self.get(resolve_or_fallback(platform))
    }

    /// SHA-256 of the registry's canonical JSON
    pub fn fingerprint(&self) -> Result<String, serde_json::Error> {
        compute_fingerprint(self)
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::bundled()
    }
}

pub fn resolve_or_fallback(platform: &str) -> Platform {
    Platform::from_id(platform).unwrap_or(FALLBACK_PLATFORM)
}

fn check_engine_version(document: &RulesDocument) -> Result<(), RuleError> {
    let engine_ver = semver::Version::parse(ENGINE_VERSION)
        .map_err(|e| RuleError::InvalidVersion(ENGINE_VERSION.to_string(), e))?;
    let min_ver = semver::Version::parse(&document.engine_min_version)
        .map_err(|e| RuleError::InvalidVersion(document.engine_min_version.clone(), e))?;

    if engine_ver < min_ver {
        return Err(RuleError::EngineVersionMismatch(
            document.rules_version.clone(),
            document.engine_min_version.clone(),
            ENGINE_VERSION.to_string(),
        ));
    }
    Ok(())
}
