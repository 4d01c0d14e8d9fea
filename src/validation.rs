//! Validation Results - Findings and Severity
//!
//! Rules produce findings. Results are built only from findings, so
//! `is_valid` always equals "no blocking errors".

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Blocks scheduling
    Error,
    /// Advisory only
    Warning,
}

/// A single observation emitted by a rule.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Finding {
    pub rule: &'static str,
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    pub fn error(rule: &'static str, message: impl Into<String>) -> Self {
        Self { rule, severity: Severity::Error, message: message.into() }
    }

    pub fn warning(rule: &'static str, message: impl Into<String>) -> Self {
        Self { rule, severity: Severity::Warning, message: message.into() }
    }

    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Splits findings into (errors, warnings), preserving emission order.
fn partition(findings: impl IntoIterator<Item = Finding>) -> (Vec<String>, Vec<String>) {
    let mut errors = vec![];
    let mut warnings = vec![];
    for finding in findings {
        match finding.severity {
            Severity::Error => errors.push(finding.message),
            Severity::Warning => warnings.push(finding.message),
        }
    }
    (errors, warnings)
}

/// Outcome of media, selection and metadata checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceResult {
    is_valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
}

pub type MediaValidationResult = ComplianceResult;
pub type MetadataValidationResult = ComplianceResult;

impl ComplianceResult {
    /// The no-op result returned for absent or unrecognized input.
    pub fn permissive() -> Self {
        Self::from_findings(vec![])
    }

    pub fn from_findings(findings: impl IntoIterator<Item = Finding>) -> Self {
        let (errors, warnings) = partition(findings);
        Self { is_valid: errors.is_empty(), errors, warnings }
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

impl Default for ComplianceResult {
    fn default() -> Self {
        Self::permissive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionValidationResult {
    is_valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
    char_count: usize,
    max_characters: usize,
}

impl CaptionValidationResult {
    pub fn from_findings(
        findings: impl IntoIterator<Item = Finding>,
        char_count: usize,
        max_characters: usize,
    ) -> Self {
        let (errors, warnings) = partition(findings);
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
            char_count,
            max_characters,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Platform-adjusted length (Twitter counts every link as 23).
    pub fn char_count(&self) -> usize {
        self.char_count
    }

    pub fn max_characters(&self) -> usize {
        self.max_characters
    }
}
