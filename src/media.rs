//! Media Validator
//!
//! Per-asset checks (duration, aspect ratio, YouTube quality, file size) and
//! the attachment-count check for a whole selection. Missing input never
//! blocks; each rule skips itself when the field it needs is absent.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::rules::{self, Platform, RuleRegistry};
use crate::validation::{Finding, MediaValidationResult};

pub const ASPECT_TOLERANCE: f64 = 0.05;

const MB: u64 = 1024 * 1024;

const INSTAGRAM_RATIOS: [f64; 3] = [1.0, 0.8, 1.91];
const YOUTUBE_RATIOS: [f64; 2] = [16.0 / 9.0, 9.0 / 16.0];
const TWITTER_RATIO_RANGE: (f64, f64) = (0.5, 2.5);

const YOUTUBE_MIN_HEIGHT: u32 = 720;
const YOUTUBE_THUMBNAIL_MAX_MB: u64 = 2;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_audio: Option<bool>,
}

/// Metadata for one attachment, as reported by the upload layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MediaAsset {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Display label such as "16:9"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    /// Seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MediaMetadata>,
}

impl MediaAsset {
    pub fn new(kind: MediaKind) -> Self {
        Self {
            kind,
            width: None,
            height: None,
            aspect_ratio: None,
            duration: None,
            size: None,
            metadata: None,
        }
    }

    pub fn image() -> Self {
        Self::new(MediaKind::Image)
    }

    pub fn video() -> Self {
        Self::new(MediaKind::Video)
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn with_size(mut self, bytes: u64) -> Self {
        self.size = Some(bytes);
        self
    }

    pub fn with_audio(mut self, has_audio: bool) -> Self {
        self.metadata = Some(MediaMetadata { is_audio: Some(has_audio) });
        self
    }

    /// width / height, when both are known and height is non-zero
    pub fn ratio(&self) -> Option<f64> {
        match (self.width, self.height) {
            (Some(w), Some(h)) if h > 0 => Some(w as f64 / h as f64),
            _ => None,
        }
    }

    fn ratio_label(&self, ratio: f64) -> String {
        self.aspect_ratio
            .clone()
            .unwrap_or_else(|| format!("{:.2}", ratio))
    }
}

pub trait MediaRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn check(&self, asset: &MediaAsset, platform: Platform) -> Vec<Finding>;
}

fn max_duration_secs(platform: Platform) -> Option<f64> {
    match platform {
        Platform::Instagram => Some(60.0),
        Platform::Twitter => Some(140.0),
        Platform::Facebook | Platform::Linkedin | Platform::Youtube => None,
    }
}

fn max_image_mb(platform: Platform) -> u64 {
    match platform {
        Platform::Twitter => 5,
        Platform::Instagram | Platform::Facebook | Platform::Linkedin | Platform::Youtube => 8,
    }
}

fn max_video_mb(platform: Platform) -> u64 {
    match platform {
        Platform::Youtube => 1024,
        Platform::Instagram => 100,
        Platform::Facebook | Platform::Twitter | Platform::Linkedin => 512,
    }
}

fn within_tolerance(ratio: f64, targets: &[f64]) -> bool {
    targets.iter().any(|t| (ratio - t).abs() <= ASPECT_TOLERANCE)
}

// --- Concrete Rules ---

pub struct DurationRule;

impl MediaRule for DurationRule {
    fn name(&self) -> &'static str { "duration" }

    fn check(&self, asset: &MediaAsset, platform: Platform) -> Vec<Finding> {
        if asset.kind != MediaKind::Video {
            return vec![];
        }
        match (asset.duration, max_duration_secs(platform)) {
            (Some(actual), Some(max)) if actual > max => vec![Finding::error(
                self.name(),
                format!(
                    "Video is {}s long; {} allows at most {}s",
                    actual, platform, max
                ),
            )],
            _ => vec![],
        }
    }
}

pub struct AspectRatioRule;

impl MediaRule for AspectRatioRule {
    fn name(&self) -> &'static str { "aspect_ratio" }

    fn check(&self, asset: &MediaAsset, platform: Platform) -> Vec<Finding> {
        let Some(ratio) = asset.ratio() else {
            return vec![];
        };

        let message = match platform {
            Platform::Instagram if !within_tolerance(ratio, &INSTAGRAM_RATIOS) => format!(
                "Aspect ratio {} may be cropped on Instagram; use 1:1, 4:5 or 1.91:1",
                asset.ratio_label(ratio)
            ),
            Platform::Twitter
                if ratio < TWITTER_RATIO_RANGE.0 || ratio > TWITTER_RATIO_RANGE.1 =>
            {
                format!(
                    "Aspect ratio {} is outside Twitter's supported range (1:2 to 2.5:1)",
                    asset.ratio_label(ratio)
                )
            }
            Platform::Youtube if !within_tolerance(ratio, &YOUTUBE_RATIOS) => format!(
                "Aspect ratio {} will be letterboxed on YouTube; use 16:9 or 9:16",
                asset.ratio_label(ratio)
            ),
            _ => return vec![],
        };
        vec![Finding::warning(self.name(), message)]
    }
}

/// YouTube-only resolution and audio hints.
pub struct YoutubeQualityRule;

impl MediaRule for YoutubeQualityRule {
    fn name(&self) -> &'static str { "youtube_quality" }

    fn check(&self, asset: &MediaAsset, platform: Platform) -> Vec<Finding> {
        if platform != Platform::Youtube {
            return vec![];
        }

        let mut findings = vec![];
        if let Some(height) = asset.height {
            if height < YOUTUBE_MIN_HEIGHT {
                findings.push(Finding::warning(
                    self.name(),
                    format!(
                        "Resolution {}p is below 720p; YouTube will not offer HD playback",
                        height
                    ),
                ));
            }
        }
        let has_audio = asset.metadata.as_ref().and_then(|m| m.is_audio);
        if has_audio == Some(false) {
            findings.push(Finding::warning(
                self.name(),
                "No audio track detected in this video",
            ));
        }
        findings
    }
}

pub struct FileSizeRule;

impl MediaRule for FileSizeRule {
    fn name(&self) -> &'static str { "file_size" }

    fn check(&self, asset: &MediaAsset, platform: Platform) -> Vec<Finding> {
        let Some(size) = asset.size else {
            return vec![];
        };
        let size_mb = size as f64 / MB as f64;

        let mut findings = vec![];
        match asset.kind {
            MediaKind::Image => {
                let max = max_image_mb(platform);
                if size > max * MB {
                    findings.push(Finding::warning(
                        self.name(),
                        format!(
                            "Image is {:.1}MB; {} recommends images under {}MB",
                            size_mb, platform, max
                        ),
                    ));
                }
                if platform == Platform::Youtube && size > YOUTUBE_THUMBNAIL_MAX_MB * MB {
                    findings.push(Finding::warning(
                        self.name(),
                        format!(
                            "Custom thumbnail is {:.1}MB; YouTube thumbnails must be under {}MB",
                            size_mb, YOUTUBE_THUMBNAIL_MAX_MB
                        ),
                    ));
                }
            }
            MediaKind::Video => {
                let max = max_video_mb(platform);
                if size > max * MB {
                    findings.push(Finding::error(
                        self.name(),
                        format!(
                            "Video is {:.1}MB; {} allows at most {}MB",
                            size_mb, platform, max
                        ),
                    ));
                }
            }
        }
        findings
    }
}

/// Per-asset rules plus the selection-count check.
pub struct MediaValidator<'r> {
    registry: &'r RuleRegistry,
    rules: Vec<Box<dyn MediaRule>>,
}

impl<'r> MediaValidator<'r> {
    pub fn new(registry: &'r RuleRegistry) -> Self {
        Self {
            registry,
            rules: vec![
                Box::new(DurationRule),
                Box::new(AspectRatioRule),
                Box::new(YoutubeQualityRule),
                Box::new(FileSizeRule),
            ],
        }
    }

    pub fn validate(
        &self,
        media: Option<&MediaAsset>,
        platform: Option<&str>,
    ) -> MediaValidationResult {
        let (Some(asset), Some(platform)) = (media, platform.and_then(Platform::from_id)) else {
            return MediaValidationResult::permissive();
        };
        MediaValidationResult::from_findings(
            self.rules.iter().flat_map(|rule| rule.check(asset, platform)),
        )
    }

    /// Enforces the platform's per-post image and video counts.
    pub fn validate_selection(
        &self,
        assets: &[MediaAsset],
        platform: Option<&str>,
    ) -> MediaValidationResult {
        let Some(platform) = platform.and_then(Platform::from_id) else {
            return MediaValidationResult::permissive();
        };
        let limits = self.registry.get(platform).media_limits;
        let images = assets.iter().filter(|a| a.kind == MediaKind::Image).count();
        let videos = assets.len() - images;

        let mut findings = vec![];
        if images > limits.images {
            findings.push(Finding::error(
                "media_count",
                format!(
                    "{} allows at most {} images per post ({} attached)",
                    platform, limits.images, images
                ),
            ));
        }
        if videos > limits.videos {
            findings.push(Finding::error(
                "media_count",
                format!(
                    "{} allows at most {} videos per post ({} attached)",
                    platform, limits.videos, videos
                ),
            ));
        }
        MediaValidationResult::from_findings(findings)
    }
}

static BUILTIN_VALIDATOR: Lazy<MediaValidator<'static>> =
    Lazy::new(|| MediaValidator::new(rules::builtin()));

/// Validate one asset against the bundled rules.
pub fn validate_media(media: Option<&MediaAsset>, platform: Option<&str>) -> MediaValidationResult {
    BUILTIN_VALIDATOR.validate(media, platform)
}

/// Validate attachment counts against the bundled rules.
pub fn validate_media_selection(
    assets: &[MediaAsset],
    platform: Option<&str>,
) -> MediaValidationResult {
    BUILTIN_VALIDATOR.validate_selection(assets, platform)
}
