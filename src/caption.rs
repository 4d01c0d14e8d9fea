//! Caption Validator
//!
//! A caption is scanned once, then each rule inspects the scan against the
//! resolved platform rules. Findings accumulate in rule order.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::rules::{self, Platform, PlatformRuleSet, RuleRegistry, UrlPolicy};
use crate::validation::{CaptionValidationResult, Finding};

/// Every link costs this many characters on Twitter, whatever its real length.
pub const TWITTER_URL_LENGTH: usize = 23;

/// LinkedIn adds a tone warning above this many emoji.
pub const LINKEDIN_EMOJI_THRESHOLD: usize = 5;

static HASHTAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#[A-Za-z0-9_]+").expect("hashtag pattern compiles"));

static URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://\S+").expect("url pattern compiles"));

/// Length as the browser counts it (UTF-16 code units).
pub fn text_length(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Approximate emoji test: Latin-1 (c) and (r), the U+2000..U+3300 symbol
/// sweep, and the two supplementary blocks behind the D83C/D83D surrogates.
/// Skin-tone modifiers and ZWJ sequences are not collapsed.
pub fn is_emoji(c: char) -> bool {
    matches!(c as u32, 0x00A9 | 0x00AE | 0x2000..=0x3300 | 0x1F000..=0x1F7FF)
}

/// Everything the caption rules need, computed in one pass.
#[derive(Debug, Clone)]
pub struct CaptionScan<'c> {
    pub platform: Platform,
    pub char_count: usize,
    pub hashtag_count: usize,
    pub urls: Vec<&'c str>,
    pub emoji_count: usize,
}

impl<'c> CaptionScan<'c> {
    pub fn new(caption: &'c str, platform: Platform) -> Self {
        Self {
            platform,
            char_count: text_length(caption),
            hashtag_count: HASHTAG_PATTERN.find_iter(caption).count(),
            urls: URL_PATTERN.find_iter(caption).map(|m| m.as_str()).collect(),
            emoji_count: caption.chars().filter(|c| is_emoji(*c)).count(),
        }
    }

    /// Length with every URL replaced by a fixed 23-character link.
    pub fn twitter_count(&self) -> usize {
        let url_units: usize = self.urls.iter().map(|u| text_length(u)).sum();
        self.char_count + self.urls.len() * TWITTER_URL_LENGTH - url_units
    }

    /// The count reported back to the caller.
    pub fn platform_count(&self) -> usize {
        match self.platform {
            Platform::Twitter => self.twitter_count(),
            Platform::Instagram | Platform::Facebook | Platform::Linkedin | Platform::Youtube => {
                self.char_count
            }
        }
    }
}

pub trait CaptionRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn check(&self, scan: &CaptionScan<'_>, rules: &PlatformRuleSet) -> Vec<Finding>;
}

// --- Concrete Rules ---

pub struct CharacterLimitRule;

impl CaptionRule for CharacterLimitRule {
    fn name(&self) -> &'static str { "character_limit" }

    fn check(&self, scan: &CaptionScan<'_>, rules: &PlatformRuleSet) -> Vec<Finding> {
        if scan.char_count <= rules.max_characters {
            return vec![];
        }
        vec![Finding::error(
            self.name(),
            format!(
                "Caption exceeds {}'s {} character limit ({} characters)",
                scan.platform, rules.max_characters, scan.char_count
            ),
        )]
    }
}

pub struct HashtagRule;

impl CaptionRule for HashtagRule {
    fn name(&self) -> &'static str { "hashtags" }

    fn check(&self, scan: &CaptionScan<'_>, rules: &PlatformRuleSet) -> Vec<Finding> {
        let count = scan.hashtag_count;
        match rules.max_hashtags {
            Some(max) if count > max => vec![Finding::error(
                self.name(),
                format!(
                    "Too many hashtags: {} used, {} allows at most {}",
                    count, scan.platform, max
                ),
            )],
            _ if count > rules.hashtag_recommendation => vec![Finding::warning(
                self.name(),
                format!(
                    "{} hashtags used; {} recommends {} or fewer",
                    count, scan.platform, rules.hashtag_recommendation
                ),
            )],
            _ => vec![],
        }
    }
}

pub struct LinkPolicyRule;

impl CaptionRule for LinkPolicyRule {
    fn name(&self) -> &'static str { "link_policy" }

    fn check(&self, scan: &CaptionScan<'_>, rules: &PlatformRuleSet) -> Vec<Finding> {
        if scan.urls.is_empty() || rules.url_policy == UrlPolicy::Allowed {
            return vec![];
        }
        vec![Finding::warning(
            self.name(),
            format!(
                "Links are not clickable in {} captions; consider a link in bio",
                scan.platform
            ),
        )]
    }
}

/// Twitter shortens every link, so the limit applies to the shortened text.
pub struct TwitterLinkLengthRule;

impl CaptionRule for TwitterLinkLengthRule {
    fn name(&self) -> &'static str { "twitter_link_length" }

    fn check(&self, scan: &CaptionScan<'_>, rules: &PlatformRuleSet) -> Vec<Finding> {
        if scan.platform != Platform::Twitter {
            return vec![];
        }
        let count = scan.twitter_count();
        if count <= rules.max_characters {
            return vec![];
        }
        vec![Finding::error(
            self.name(),
            format!(
                "Tweet is {} characters with links counted as {}; the limit is {}",
                count, TWITTER_URL_LENGTH, rules.max_characters
            ),
        )]
    }
}

pub struct EmojiRule;

impl CaptionRule for EmojiRule {
    fn name(&self) -> &'static str { "emoji" }

    fn check(&self, scan: &CaptionScan<'_>, rules: &PlatformRuleSet) -> Vec<Finding> {
        let mut findings = vec![];
        if scan.emoji_count > rules.emoji_limit {
            findings.push(Finding::warning(
                self.name(),
                format!(
                    "{} emojis used; {} recommends at most {}",
                    scan.emoji_count, scan.platform, rules.emoji_limit
                ),
            ));
        }
        if scan.platform == Platform::Linkedin && scan.emoji_count > LINKEDIN_EMOJI_THRESHOLD {
            findings.push(Finding::warning(
                self.name(),
                "Consider using fewer than 5 emojis to keep a professional tone on LinkedIn",
            ));
        }
        findings
    }
}

pub struct PlatformNoticeRule;

impl CaptionRule for PlatformNoticeRule {
    fn name(&self) -> &'static str { "platform_notice" }

    fn check(&self, _scan: &CaptionScan<'_>, rules: &PlatformRuleSet) -> Vec<Finding> {
        rules
            .static_warnings
            .iter()
            .map(|w| Finding::warning(self.name(), w.as_str()))
            .collect()
    }
}

/// Runs the caption rules in order against one registry.
pub struct CaptionValidator<'r> {
    registry: &'r RuleRegistry,
    rules: Vec<Box<dyn CaptionRule>>,
}

impl<'r> CaptionValidator<'r> {
    pub fn new(registry: &'r RuleRegistry) -> Self {
        Self {
            registry,
            rules: vec![
                Box::new(CharacterLimitRule),
                Box::new(HashtagRule),
                Box::new(LinkPolicyRule),
                Box::new(TwitterLinkLengthRule),
                Box::new(EmojiRule),
                Box::new(PlatformNoticeRule),
            ],
        }
    }

    pub fn validate(&self, caption: &str, platform: &str) -> CaptionValidationResult {
        let resolved = rules::resolve_or_fallback(platform);
        let platform_rules = self.registry.get(resolved);
        let scan = CaptionScan::new(caption, resolved);

        let findings = self
            .rules
            .iter()
            .flat_map(|rule| rule.check(&scan, platform_rules));

        CaptionValidationResult::from_findings(
            findings,
            scan.platform_count(),
            platform_rules.max_characters,
        )
    }
}

static BUILTIN_VALIDATOR: Lazy<CaptionValidator<'static>> =
    Lazy::new(|| CaptionValidator::new(rules::builtin()));

/// Validate a caption against the bundled rules.
pub fn validate_caption(caption: &str, platform: &str) -> CaptionValidationResult {
    BUILTIN_VALIDATOR.validate(caption, platform)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has(messages: &[String], needle: &str) -> bool {
        messages.iter().any(|m| m.contains(needle))
    }

    #[test]
    fn test_empty_caption_is_valid() {
        let result = validate_caption("", "twitter");
        assert!(result.is_valid());
        assert_eq!(result.char_count(), 0);
        assert_eq!(result.max_characters(), 280);
    }

    #[test]
    fn test_length_error_names_platform_and_limit() {
        let caption = "a".repeat(281);
        let result = validate_caption(&caption, "twitter");
        assert!(!result.is_valid());
        assert!(has(result.errors(), "Twitter's 280 character limit"));
    }

    #[test]
    fn test_length_at_limit_passes() {
        let caption = "a".repeat(3000);
        let result = validate_caption(&caption, "linkedin");
        assert!(result.errors().is_empty());
    }

    #[test]
    fn test_length_counts_utf16_units() {
        // U+1F600 is one char but two UTF-16 units
        assert_eq!(text_length("\u{1F600}"), 2);
        assert_eq!(text_length("héllo"), 5);
    }

    #[test]
    fn test_twitter_url_costs_23() {
        let caption = format!("check this http://example.com/{}", "x".repeat(60));
        let scan = CaptionScan::new(&caption, Platform::Twitter);
        assert_eq!(scan.urls.len(), 1);
        assert_eq!(scan.twitter_count(), "check this ".len() + TWITTER_URL_LENGTH);

        let result = validate_caption(&caption, "twitter");
        assert_eq!(result.char_count(), 34);
    }

    #[test]
    fn test_short_url_also_costs_23() {
        let result = validate_caption("see https://t.co", "twitter");
        assert_eq!(result.char_count(), 4 + 23);
    }

    #[test]
    fn test_long_links_fit_after_shortening() {
        let caption = format!("{} https://example.com/{}", "a".repeat(200), "p".repeat(200));
        let result = validate_caption(&caption, "twitter");
        assert_eq!(result.errors().len(), 1);
        assert!(has(result.errors(), "character limit"));
        assert_eq!(result.char_count(), 201 + 23);
    }

    #[test]
    fn test_twitter_specific_error_when_shortened_text_too_long() {
        let caption = format!("{} https://a.io", "a".repeat(270));
        let result = validate_caption(&caption, "twitter");
        // raw 283 and shortened 294 both exceed 280
        assert_eq!(result.errors().len(), 2);
        assert!(has(result.errors(), "links counted as 23"));
    }

    #[test]
    fn test_twitter_error_even_when_raw_length_passes() {
        let caption = format!("{} http://a.b", "a".repeat(265));
        let result = validate_caption(&caption, "twitter");
        assert_eq!(result.errors().len(), 1);
        assert!(has(result.errors(), "links counted as 23"));
        assert_eq!(result.char_count(), 266 + 23);
    }

    #[test]
    fn test_other_platforms_report_raw_length() {
        let caption = format!("check this http://example.com/{}", "x".repeat(60));
        let result = validate_caption(&caption, "facebook");
        assert_eq!(result.char_count(), text_length(&caption));
    }

    #[test]
    fn test_hashtag_over_maximum_blocks() {
        let caption: String = (0..31).map(|i| format!("#tag{} ", i)).collect();
        let result = validate_caption(&caption, "instagram");
        assert!(!result.is_valid());
        assert!(has(result.errors(), "Too many hashtags: 31"));
        assert!(!has(result.warnings(), "recommends 11"));
    }

    #[test]
    fn test_hashtag_over_recommendation_warns() {
        let result = validate_caption("#a #b #c", "twitter");
        assert!(result.is_valid());
        assert!(has(result.warnings(), "3 hashtags used; Twitter recommends 2"));
    }

    #[test]
    fn test_unbounded_hashtags_never_block() {
        let caption: String = (0..100).map(|i| format!("#t{} ", i)).collect();
        let result = validate_caption(&caption, "facebook");
        assert!(result.is_valid());
        assert!(has(result.warnings(), "100 hashtags used"));
    }

    #[test]
    fn test_hashtag_pattern_ignores_bare_hash() {
        let scan = CaptionScan::new("# #! #ok #Mixed_Case1", Platform::Facebook);
        assert_eq!(scan.hashtag_count, 2);
    }

    #[test]
    fn test_links_not_clickable_on_instagram() {
        let result = validate_caption("shop https://example.com", "instagram");
        assert!(has(result.warnings(), "not clickable"));
        let result = validate_caption("shop https://example.com", "linkedin");
        assert!(!has(result.warnings(), "not clickable"));
    }

    #[test]
    fn test_linkedin_emoji_warnings_are_additive() {
        let result = validate_caption(
            "Launch day \u{1F600}\u{1F601}\u{1F602}\u{1F603}\u{1F604}\u{1F605}",
            "linkedin",
        );
        assert!(result.is_valid());
        assert!(has(result.warnings(), "6 emojis used; LinkedIn recommends at most 5"));
        assert!(has(result.warnings(), "fewer than 5 emojis"));
    }

    #[test]
    fn test_emoji_under_limit_is_quiet() {
        let result = validate_caption("\u{1F600}\u{2764}", "twitter");
        assert!(!has(result.warnings(), "emojis"));
    }

    #[test]
    fn test_emoji_sweep_is_approximate() {
        assert!(is_emoji('\u{00A9}'));
        assert!(is_emoji('\u{2764}'));
        assert!(is_emoji('\u{1F680}'));
        // general punctuation falls inside the sweep
        assert!(is_emoji('\u{2014}'));
        // third supplementary block is outside it
        assert!(!is_emoji('\u{1F914}'));
        assert!(!is_emoji('a'));
    }

    #[test]
    fn test_static_warnings_come_last_in_order() {
        let result = validate_caption("#a #b #c #d #e #f #g #h #i #j #k #l", "instagram");
        let warnings = result.warnings();
        assert_eq!(
            warnings.last().map(String::as_str),
            Some("Instagram captions are truncated after 125 characters in the feed")
        );
        assert!(warnings[0].contains("hashtags"));
    }

    #[test]
    fn test_unknown_platform_uses_facebook_rules() {
        let result = validate_caption("hello", "mastodon");
        assert_eq!(result.max_characters(), 63206);
        assert_eq!(result, validate_caption("hello", "facebook"));
    }

    #[test]
    fn test_validation_is_idempotent() {
        let caption = "Big news \u{1F680} #launch https://example.com";
        for platform in ["instagram", "facebook", "twitter", "linkedin", "youtube", "x"] {
            assert_eq!(
                validate_caption(caption, platform),
                validate_caption(caption, platform)
            );
        }
    }

    #[test]
    fn test_custom_registry_is_honoured() {
        let json = r#"{
            "rulesVersion": "2.0.0",
            "platforms": {
                "twitter": {
                    "maxCharacters": 10,
                    "hashtagRecommendation": 2,
                    "urlPolicy": "allowed",
                    "emojiLimit": 10,
                    "mediaLimits": {"images": 4, "videos": 1}
                }
            }
        }"#;
        let registry = RuleRegistry::from_json_str(json).unwrap();
        let validator = CaptionValidator::new(&registry);
        let result = validator.validate("eleven char", "twitter");
        assert!(!result.is_valid());
        assert_eq!(result.max_characters(), 10);
    }
}
