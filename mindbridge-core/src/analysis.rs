use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Placeholder emotional state written by the lexicon fallback.
pub const FALLBACK_EMOTIONAL_STATE: &str = "Basic analysis mode (AI unavailable)";

/// `source_model` value of analyses produced by the lexicon fallback.
pub const FALLBACK_MODEL_ID: &str = "simple-fallback";

/// Who said a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => f.write_str("user"),
            MessageRole::Assistant => f.write_str("assistant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }
}

/// Clinical risk tier. Ordered `Low < Medium < High < Critical`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Critical,
        RiskLevel::High,
        RiskLevel::Medium,
        RiskLevel::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Critical => "Critical",
        }
    }

    /// One-line clinical reading of the tier, used in clinician reports.
    pub fn interpretation(&self) -> &'static str {
        match self {
            RiskLevel::Critical => {
                "CRITICAL: Immediate psychiatric intervention required. Patient may be at risk of self-harm."
            }
            RiskLevel::High => {
                "HIGH: Significant mental health concerns detected. Professional evaluation recommended within 1 week."
            }
            RiskLevel::Medium => {
                "MEDIUM: Moderate mental health indicators present. Monitoring and support recommended."
            }
            RiskLevel::Low => {
                "LOW: Minimal mental health risk indicators detected. Continue routine care."
            }
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRiskLevel(pub String);

impl fmt::Display for UnknownRiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown risk level: {}", self.0)
    }
}

impl std::error::Error for UnknownRiskLevel {}

impl FromStr for RiskLevel {
    type Err = UnknownRiskLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            "critical" => Ok(RiskLevel::Critical),
            _ => Err(UnknownRiskLevel(s.to_string())),
        }
    }
}

/// Which strategy produced an analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AnalysisSource {
    Remote(String),
    Fallback,
}

impl AnalysisSource {
    pub fn is_fallback(&self) -> bool {
        matches!(self, AnalysisSource::Fallback)
    }

    pub fn model_id(&self) -> &str {
        match self {
            AnalysisSource::Remote(model) => model,
            AnalysisSource::Fallback => FALLBACK_MODEL_ID,
        }
    }
}

impl fmt::Display for AnalysisSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.model_id())
    }
}

impl From<String> for AnalysisSource {
    fn from(value: String) -> Self {
        if value == FALLBACK_MODEL_ID {
            AnalysisSource::Fallback
        } else {
            AnalysisSource::Remote(value)
        }
    }
}

impl From<AnalysisSource> for String {
    fn from(value: AnalysisSource) -> Self {
        value.model_id().to_string()
    }
}

/// Normalized sentiment and risk analysis of one utterance or one
/// conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub sentiment_score: f64,
    pub is_sarcastic: bool,
    pub true_emotion: Option<String>,
    pub depression_indicators: u32,
    pub anxiety_indicators: u32,
    pub crisis_indicators: u32,
    pub risk_level: RiskLevel,
    pub emotional_state: Option<String>,
    pub key_concerns: Vec<String>,
    pub confidence: f64,
    pub analysis_timestamp: DateTime<FixedOffset>,
    pub source_model: AnalysisSource,
}

/// Loosely-shaped analysis as reported by a classifier. Every field may be
/// missing; [`RawAnalysis::into_result`] is the only place defaults are
/// applied.
///
/// Models are not strict about JSON types: counts may arrive as floats
/// (`3.0`) and concern lists may contain `null`s, so both are accepted here
/// and normalized later.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawAnalysis {
    pub sentiment_score: Option<f64>,
    pub is_sarcastic: Option<bool>,
    pub true_emotion: Option<String>,
    pub depression_indicators: Option<f64>,
    pub anxiety_indicators: Option<f64>,
    pub crisis_indicators: Option<f64>,
    pub risk_level: Option<String>,
    pub emotional_state: Option<String>,
    pub key_concerns: Option<Vec<Option<String>>>,
    pub confidence: Option<f64>,
}

impl RawAnalysis {
    pub fn into_result(
        self,
        source_model: AnalysisSource,
        analysis_timestamp: DateTime<FixedOffset>,
    ) -> AnalysisResult {
        let risk_level = self
            .risk_level
            .as_deref()
            .and_then(|level| level.parse().ok())
            .unwrap_or_default();

        AnalysisResult {
            sentiment_score: clamp_finite(self.sentiment_score.unwrap_or(0.0), -1.0, 1.0),
            is_sarcastic: self.is_sarcastic.unwrap_or(false),
            true_emotion: self.true_emotion.filter(|s| !s.trim().is_empty()),
            depression_indicators: indicator_count(self.depression_indicators),
            anxiety_indicators: indicator_count(self.anxiety_indicators),
            crisis_indicators: indicator_count(self.crisis_indicators),
            risk_level,
            emotional_state: self.emotional_state.filter(|s| !s.trim().is_empty()),
            key_concerns: self
                .key_concerns
                .unwrap_or_default()
                .into_iter()
                .flatten()
                .filter(|concern| !concern.trim().is_empty())
                .collect(),
            confidence: clamp_finite(self.confidence.unwrap_or(0.0), 0.0, 1.0),
            analysis_timestamp,
            source_model,
        }
    }
}

fn clamp_finite(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(min, max) }
}

/// Rounds a reported count to the nearest non-negative integer.
fn indicator_count(value: Option<f64>) -> u32 {
    // `as` saturates at both ends and maps NaN to 0.
    value.map(|v| v.round().max(0.0) as u32).unwrap_or(0)
}

impl AnalysisResult {
    pub fn is_fallback(&self) -> bool {
        self.source_model.is_fallback()
    }

    /// Emotional state worth showing to a clinician; the fallback
    /// placeholder is not.
    pub fn reportable_emotional_state(&self) -> Option<&str> {
        self.emotional_state
            .as_deref()
            .filter(|state| !state.is_empty() && *state != FALLBACK_EMOTIONAL_STATE)
    }
}
