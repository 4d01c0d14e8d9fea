//! Submission Gate - Single Entry Point for Scheduling
//!
//! A draft is schedulable only if every targeted platform passes caption,
//! media, selection and metadata checks.

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::caption::CaptionValidator;
use crate::hashing::validation_key;
use crate::media::{MediaAsset, MediaValidator};
use crate::metadata::validate_video_metadata_with;
use crate::rules::{self, RuleRegistry};
use crate::validation::{CaptionValidationResult, MediaValidationResult, MetadataValidationResult};

#[derive(Debug, Error)]
pub enum GateError {
    #[error("No target platforms selected")]
    NoPlatforms,

    #[error("Post blocked: {0}")]
    Blocked(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// What the composer submits for scheduling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostDraft {
    pub platforms: Vec<String>,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub media: Vec<MediaAsset>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlatformReport {
    platform: String,
    is_valid: bool,
    caption: CaptionValidationResult,
    media: Vec<MediaValidationResult>,
    selection: MediaValidationResult,
    metadata: MetadataValidationResult,
}

impl PlatformReport {
    fn new(
        platform: String,
        caption: CaptionValidationResult,
        media: Vec<MediaValidationResult>,
        selection: MediaValidationResult,
        metadata: MetadataValidationResult,
    ) -> Self {
        let is_valid = caption.is_valid()
            && media.iter().all(|m| m.is_valid())
            && selection.is_valid()
            && metadata.is_valid();
        Self { platform, is_valid, caption, media, selection, metadata }
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn caption(&self) -> &CaptionValidationResult {
        &self.caption
    }

    pub fn media(&self) -> &[MediaValidationResult] {
        &self.media
    }

    pub fn selection(&self) -> &MediaValidationResult {
        &self.selection
    }

    pub fn metadata(&self) -> &MetadataValidationResult {
        &self.metadata
    }

    /// Every blocking message, in check order
    pub fn errors(&self) -> impl Iterator<Item = &String> {
        self.caption
            .errors()
            .iter()
            .chain(self.media.iter().flat_map(|m| m.errors()))
            .chain(self.selection.errors())
            .chain(self.metadata.errors())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GateReport {
    pub id: String,
    pub checked_at: DateTime<Utc>,
    pub rules_version: String,
    pub draft_hash: String,
    pub platforms: Vec<PlatformReport>,
    pub schedulable: bool,
}

/// Runs every validator for every platform a draft targets.
pub struct ComplianceGate<'r> {
    registry: &'r RuleRegistry,
    caption: CaptionValidator<'r>,
    media: MediaValidator<'r>,
}

impl<'r> ComplianceGate<'r> {
    pub fn new(registry: &'r RuleRegistry) -> Self {
        Self {
            registry,
            caption: CaptionValidator::new(registry),
            media: MediaValidator::new(registry),
        }
    }

    pub fn registry(&self) -> &RuleRegistry {
        self.registry
    }

    /// Check one platform. Unknown ids follow each validator's fallback.
    pub fn check_platform(&self, draft: &PostDraft, platform: &str) -> PlatformReport {
        let caption = self.caption.validate(&draft.caption, platform);
        let media = draft
            .media
            .iter()
            .map(|asset| self.media.validate(Some(asset), Some(platform)))
            .collect();
        let selection = self.media.validate_selection(&draft.media, Some(platform));
        let metadata = validate_video_metadata_with(
            self.registry,
            draft.title.as_deref().unwrap_or_default(),
            &draft.tags,
            platform,
        );
        PlatformReport::new(platform.to_string(), caption, media, selection, metadata)
    }

    /// Evaluate a draft. Duplicate platform ids are checked once.
    pub fn evaluate(&self, draft: &PostDraft) -> Result<GateReport, GateError> {
        if draft.platforms.is_empty() {
            return Err(GateError::NoPlatforms);
        }

        let mut seen: Vec<&str> = vec![];
        let mut platforms = vec![];
        for platform in &draft.platforms {
            if seen.contains(&platform.as_str()) {
                continue;
            }
            seen.push(platform);
            platforms.push(self.check_platform(draft, platform));
        }

        let rules_fingerprint = self.registry.fingerprint()?;
        let draft_hash = validation_key("*", draft, &rules_fingerprint)?;
        let schedulable = platforms.iter().all(|p| p.is_valid());

        debug!(
            "Evaluated draft {} across {} platform(s): schedulable={}",
            draft_hash,
            platforms.len(),
            schedulable
        );

        Ok(GateReport {
            id: Uuid::new_v4().to_string(),
            checked_at: Utc::now(),
            rules_version: self.registry.rules_version().to_string(),
            draft_hash,
            platforms,
            schedulable,
        })
    }

    /// Evaluate and refuse drafts with any blocking error.
    pub fn ensure_schedulable(&self, draft: &PostDraft) -> Result<GateReport, GateError> {
        let report = self.evaluate(draft)?;
        if !report.schedulable {
            let messages: Vec<_> = report
                .platforms
                .iter()
                .flat_map(|p| p.errors().map(move |e| format!("{}: {}", p.platform(), e)))
                .collect();
            return Err(GateError::Blocked(messages.join("; ")));
        }
        Ok(report)
    }
}

impl Default for ComplianceGate<'static> {
    fn default() -> Self {
        Self::new(rules::builtin())
    }
}
