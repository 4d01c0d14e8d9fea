//! PostGate Core - Platform Content Compliance Engine
//!
//! Decides whether a caption and its attachments may be scheduled on a
//! given social platform.
//!
//! # Guarantees
//! 1. Validators are pure: same input, same result
//! 2. `is_valid` is exactly "no errors"
//! 3. Warnings never block
//! 4. Missing or unknown input degrades to a permissive default, never a panic

pub mod rules;
pub mod validation;
pub mod caption;
pub mod media;
pub mod metadata;
pub mod hashing;
pub mod gate;

pub use rules::{Platform, PlatformRuleSet, RuleRegistry, RuleError, UrlPolicy, MediaLimits};
pub use validation::{
    CaptionValidationResult, ComplianceResult, Finding, MediaValidationResult,
    MetadataValidationResult, Severity,
};
pub use caption::{validate_caption, CaptionValidator};
pub use media::{validate_media, validate_media_selection, MediaAsset, MediaKind, MediaValidator};
pub use metadata::validate_video_metadata;
pub use hashing::{canonical_json, compute_fingerprint, validation_key};
pub use gate::{ComplianceGate, GateError, GateReport, PostDraft};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const MIN_ENGINE_VERSION: &str = "1.0.0";
