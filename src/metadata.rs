//! Video Metadata Validator
//!
//! Title and tag limits. Only rule sets that carry the title/tag fields
//! (YouTube in the bundled table) are checked.

use crate::caption::text_length;
use crate::rules::{self, Platform, RuleRegistry};
use crate::validation::{Finding, MetadataValidationResult};

/// Tags are submitted comma-joined, so separators count toward the limit.
pub fn tags_length(tags: &[String]) -> usize {
    text_length(&tags.join(","))
}

pub fn validate_video_metadata_with(
    registry: &RuleRegistry,
    title: &str,
    tags: &[String],
    platform: &str,
) -> MetadataValidationResult {
    let Some(platform) = Platform::from_id(platform) else {
        return MetadataValidationResult::permissive();
    };
    let rules = registry.get(platform);
    let mut findings = vec![];

    if let Some(max) = rules.max_title_characters {
        let length = text_length(title);
        if title.trim().is_empty() {
            findings.push(Finding::error("title", format!("{} videos require a title", platform)));
        } else if length > max {
            findings.push(Finding::error(
                "title",
                format!(
                    "Title is {} characters; {} allows at most {}",
                    length, platform, max
                ),
            ));
        }
    }

    if let Some(max) = rules.max_tags_count {
        if tags.len() > max {
            findings.push(Finding::error(
                "tags",
                format!("{} tags used; {} allows at most {}", tags.len(), platform, max),
            ));
        }
    }

    if let Some(max) = rules.max_tags_chars {
        let length = tags_length(tags);
        if length > max {
            findings.push(Finding::error(
                "tags",
                format!(
                    "Tags total {} characters; {} allows at most {}",
                    length, platform, max
                ),
            ));
        }
    }

    MetadataValidationResult::from_findings(findings)
}

/// Validate a video title and tags against the bundled rules.
pub fn validate_video_metadata(
    title: &str,
    tags: &[String],
    platform: &str,
) -> MetadataValidationResult {
    validate_video_metadata_with(rules::builtin(), title, tags, platform)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_reasonable_youtube_metadata_passes() {
        let result = validate_video_metadata("Launch walkthrough", &tags(&["rust", "demo"]), "youtube");
        assert!(result.is_valid());
        assert!(result.warnings().is_empty());
    }

    #[test]
    fn test_youtube_requires_title() {
        let result = validate_video_metadata("   ", &[], "youtube");
        assert!(!result.is_valid());
        assert!(result.errors()[0].contains("require a title"));
    }

    #[test]
    fn test_youtube_title_limit() {
        let at_limit = "t".repeat(100);
        assert!(validate_video_metadata(&at_limit, &[], "youtube").is_valid());
        let over = "t".repeat(101);
        let result = validate_video_metadata(&over, &[], "youtube");
        assert_eq!(result.errors(), ["Title is 101 characters; YouTube allows at most 100"]);
    }

    #[test]
    fn test_youtube_tag_limits() {
        let many: Vec<String> = (0..31).map(|i| format!("t{}", i)).collect();
        let result = validate_video_metadata("ok", &many, "youtube");
        assert_eq!(result.errors().len(), 1);
        assert!(result.errors()[0].contains("31 tags used"));

        let long = vec!["x".repeat(300), "y".repeat(200)];
        // 300 + 1 separator + 200
        assert_eq!(tags_length(&long), 501);
        let result = validate_video_metadata("ok", &long, "youtube");
        assert!(result.errors()[0].contains("Tags total 501 characters"));
    }

    #[test]
    fn test_platforms_without_metadata_limits_are_skipped() {
        let many: Vec<String> = (0..100).map(|i| format!("t{}", i)).collect();
        for platform in ["instagram", "facebook", "twitter", "linkedin", "mastodon"] {
            assert!(validate_video_metadata("", &many, platform).is_valid());
        }
    }
}
