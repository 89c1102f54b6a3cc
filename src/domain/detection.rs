use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::{DomainError, DomainResult, Operation};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }

    /// Label for an optional severity; absence renders as "unknown".
    pub fn label_or_unknown(severity: Option<Severity>) -> &'static str {
        severity.map(|s| s.label()).unwrap_or("unknown")
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classifier output for one image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    pub pest_name: String,
    /// Percentage in [0, 100].
    pub confidence: f64,
    pub description: String,
    pub severity: Severity,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl DetectionResult {
    /// Rejects payloads that decoded but break the result invariants.
    pub fn validate(self) -> DomainResult<Self> {
        if !self.confidence.is_finite() || !(0.0..=100.0).contains(&self.confidence) {
            return Err(DomainError::request(
                Operation::Detect,
                format!("confidence out of range: {}", self.confidence),
            ));
        }
        Ok(self)
    }

    /// Confidence with one decimal, e.g. "92.3%".
    pub fn confidence_label(&self) -> String {
        format!("{:.1}%", self.confidence)
    }
}
