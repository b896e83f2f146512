//! Sentiment analysis with a remote classifier and a lexicon fallback.
//!
//! The strategy is chosen once, when the analyzer is built. Remote failures
//! of any kind degrade to the lexicon strategy; they are logged but never
//! returned to the caller. The only trace a caller sees is
//! [`AnalysisResult::source_model`].

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::analysis::{
    AnalysisResult, AnalysisSource, FALLBACK_EMOTIONAL_STATE, Message, RawAnalysis, RiskLevel,
};
use crate::classifier::{
    GenerationSettings, OpenRouterClassifier, SentimentClassifier, build_analysis_prompt,
    extract_json_object,
};
use crate::clock::malaysia_now;
use crate::error::ClassifierError;
use crate::lexicon::{NEGATIVE_WORDS, POSITIVE_WORDS};

pub const DEFAULT_MODEL: &str = "google/gemini-2.0-flash-001";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_TEMPERATURE: f64 = 0.3;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u64 = 1024;

/// Credentials of this length or shorter are treated as absent.
const MIN_API_KEY_LEN: usize = 10;

/// Fallback results are only moderately trustworthy.
const FALLBACK_CONFIDENCE: f64 = 0.5;

/// Settings that decide which strategy backs a [`SentimentAnalyzer`].
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
    pub temperature: f64,
    pub max_output_tokens: u64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }
}

impl AnalyzerConfig {
    /// The credential, if it is usable for remote analysis.
    pub fn usable_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| key.len() > MIN_API_KEY_LEN)
    }
}

/// Remote-backed strategy: a classifier plus the time budget per call.
pub struct RemoteStrategy {
    classifier: Arc<dyn SentimentClassifier>,
    timeout: Duration,
}

pub enum SentimentStrategy {
    Remote(RemoteStrategy),
    Fallback,
}

pub struct SentimentAnalyzer {
    strategy: SentimentStrategy,
}

impl SentimentAnalyzer {
    /// Resolves the strategy from configuration. A missing or too-short
    /// credential selects the lexicon fallback for the analyzer's lifetime.
    pub fn from_config(config: &AnalyzerConfig) -> Self {
        match config.usable_api_key() {
            Some(api_key) => {
                let settings = GenerationSettings {
                    model: config.model.clone(),
                    temperature: config.temperature,
                    max_output_tokens: config.max_output_tokens,
                };
                info!(model = %config.model, "Remote sentiment analysis enabled");
                Self::with_classifier(
                    Arc::new(OpenRouterClassifier::new(api_key, &settings)),
                    config.timeout,
                )
            }
            None => {
                warn!("No usable API key configured; using lexicon sentiment analysis");
                Self::fallback()
            }
        }
    }

    pub fn with_classifier(classifier: Arc<dyn SentimentClassifier>, timeout: Duration) -> Self {
        Self {
            strategy: SentimentStrategy::Remote(RemoteStrategy {
                classifier,
                timeout,
            }),
        }
    }

    pub fn fallback() -> Self {
        Self {
            strategy: SentimentStrategy::Fallback,
        }
    }

    pub fn uses_fallback(&self) -> bool {
        matches!(self.strategy, SentimentStrategy::Fallback)
    }

    pub async fn analyze(&self, text: &str, history: &[Message]) -> AnalysisResult {
        let SentimentStrategy::Remote(remote) = &self.strategy else {
            return lexicon_analysis(text);
        };

        match remote_analysis(remote, text, history).await {
            Ok(analysis) => {
                info!(
                    risk_level = %analysis.risk_level,
                    source_model = %analysis.source_model,
                    "Remote analysis complete"
                );
                analysis
            }
            Err(e) => {
                warn!(error = %e, "Remote analysis failed, falling back to lexicon analysis");
                lexicon_analysis(text)
            }
        }
    }
}

async fn remote_analysis(
    remote: &RemoteStrategy,
    text: &str,
    history: &[Message],
) -> Result<AnalysisResult, ClassifierError> {
    let prompt = build_analysis_prompt(text, history);

    let response = tokio::time::timeout(remote.timeout, remote.classifier.classify(&prompt))
        .await
        .map_err(|_| ClassifierError::Timeout(remote.timeout))??;

    parse_classifier_response(&response, remote.classifier.model_id())
}

/// Parses a classifier reply into a normalized analysis.
pub fn parse_classifier_response(
    response: &str,
    model_id: &str,
) -> Result<AnalysisResult, ClassifierError> {
    let json = extract_json_object(response).ok_or(ClassifierError::MissingJson)?;
    let raw: RawAnalysis = serde_json::from_str(json)?;
    Ok(raw.into_result(
        AnalysisSource::Remote(model_id.to_string()),
        malaysia_now(),
    ))
}

/// Keyword-count sentiment scoring, used when no remote classifier is
/// available or it failed.
///
/// Depression and anxiety indicators are both the negative-word count.
pub fn lexicon_analysis(text: &str) -> AnalysisResult {
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = lowered.split_whitespace().collect();

    let (positive, negative) = tokens
        .iter()
        .map(|token| token.trim_matches(|c| matches!(c, '.' | ',' | '!' | '?')))
        .fold((0u32, 0u32), |(pos, neg), token| {
            (
                pos + u32::from(POSITIVE_WORDS.contains_token(token)),
                neg + u32::from(NEGATIVE_WORDS.contains_token(token)),
            )
        });

    let sentiment_score = if tokens.is_empty() {
        0.0
    } else {
        ((f64::from(positive) - f64::from(negative)) / tokens.len() as f64 * 2.0).clamp(-1.0, 1.0)
    };

    let risk_level = if negative > 2 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    RawAnalysis {
        sentiment_score: Some(sentiment_score),
        is_sarcastic: Some(false),
        true_emotion: Some("unknown".to_string()),
        depression_indicators: Some(f64::from(negative)),
        anxiety_indicators: Some(f64::from(negative)),
        crisis_indicators: Some(0.0),
        risk_level: Some(risk_level.to_string()),
        emotional_state: Some(FALLBACK_EMOTIONAL_STATE.to_string()),
        key_concerns: Some(Vec::new()),
        confidence: Some(FALLBACK_CONFIDENCE),
    }
    .into_result(AnalysisSource::Fallback, malaysia_now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CannedClassifier {
        reply: String,
        calls: AtomicUsize,
    }

    impl CannedClassifier {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SentimentClassifier for CannedClassifier {
        fn model_id(&self) -> &str {
            "test-model"
        }

        async fn classify(&self, _prompt: &str) -> Result<String, ClassifierError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    struct FailingClassifier;

    #[async_trait]
    impl SentimentClassifier for FailingClassifier {
        fn model_id(&self) -> &str {
            "failing-model"
        }

        async fn classify(&self, _prompt: &str) -> Result<String, ClassifierError> {
            Err(ClassifierError::Request("503 Service Unavailable".into()))
        }
    }

    struct SlowClassifier;

    #[async_trait]
    impl SentimentClassifier for SlowClassifier {
        fn model_id(&self) -> &str {
            "slow-model"
        }

        async fn classify(&self, _prompt: &str) -> Result<String, ClassifierError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("{}".into())
        }
    }

    const SARCASTIC_REPLY: &str = r#"Here is my analysis:
```json
{
  "sentiment_score": -0.6,
  "is_sarcastic": true,
  "true_emotion": "despair",
  "depression_indicators": 4,
  "anxiety_indicators": 2,
  "crisis_indicators": 0,
  "risk_level": "High",
  "emotional_state": "masking distress behind humour",
  "key_concerns": ["isolation", "sleep loss"],
  "confidence": 0.82
}
```"#;

    #[test]
    fn empty_text_scores_zero() {
        let analysis = lexicon_analysis("");
        assert_eq!(analysis.sentiment_score, 0.0);
        assert_eq!(analysis.risk_level, RiskLevel::Low);
        assert!(analysis.is_fallback());
    }

    #[test]
    fn positive_text_scores_above_zero() {
        let analysis = lexicon_analysis("I feel happy and great today");
        assert!(analysis.sentiment_score > 0.0);
        assert_eq!(analysis.risk_level, RiskLevel::Low);
        assert_eq!(analysis.depression_indicators, 0);
    }

    #[test]
    fn trailing_punctuation_is_ignored() {
        let analysis = lexicon_analysis("Sad, tired! worried?");
        assert_eq!(analysis.depression_indicators, 3);
        assert_eq!(analysis.anxiety_indicators, 3);
        assert_eq!(analysis.risk_level, RiskLevel::Medium);
        assert_eq!(analysis.sentiment_score, -1.0);
    }

    #[test]
    fn score_stays_within_bounds() {
        for text in [
            "good",
            "bad",
            "good good good bad",
            "sad sad sad sad sad sad",
            "    ",
            "the weather is neither here nor there",
        ] {
            let score = lexicon_analysis(text).sentiment_score;
            assert!((-1.0..=1.0).contains(&score), "{text:?} scored {score}");
        }
    }

    #[test]
    fn fallback_fields_are_fixed() {
        let analysis = lexicon_analysis("just a regular day");
        assert_eq!(analysis.confidence, 0.5);
        assert!(!analysis.is_sarcastic);
        assert_eq!(analysis.true_emotion.as_deref(), Some("unknown"));
        assert_eq!(analysis.crisis_indicators, 0);
        assert_eq!(
            analysis.emotional_state.as_deref(),
            Some(FALLBACK_EMOTIONAL_STATE)
        );
        assert_eq!(analysis.source_model.to_string(), "simple-fallback");
    }

    #[test]
    fn short_or_missing_key_selects_fallback() {
        let missing = AnalyzerConfig::default();
        assert!(SentimentAnalyzer::from_config(&missing).uses_fallback());

        let short = AnalyzerConfig {
            api_key: Some("abc123".into()),
            ..Default::default()
        };
        assert!(SentimentAnalyzer::from_config(&short).uses_fallback());
    }

    #[tokio::test]
    async fn remote_reply_wrapped_in_fences_is_parsed() {
        let classifier = Arc::new(CannedClassifier::new(SARCASTIC_REPLY));
        let analyzer = SentimentAnalyzer::with_classifier(classifier.clone(), DEFAULT_TIMEOUT);

        let analysis = analyzer.analyze("oh I'm totally fine lol", &[]).await;

        assert_eq!(classifier.calls.load(Ordering::SeqCst), 1);
        assert_eq!(analysis.risk_level, RiskLevel::High);
        assert!(analysis.is_sarcastic);
        assert_eq!(analysis.true_emotion.as_deref(), Some("despair"));
        assert_eq!(analysis.key_concerns, vec!["isolation", "sleep loss"]);
        assert_eq!(
            analysis.source_model,
            AnalysisSource::Remote("test-model".into())
        );
    }

    #[test]
    fn loosely_typed_reply_keeps_remote_analysis() {
        let reply = r#"{"depression_indicators": 3.0, "anxiety_indicators": 1, "crisis_indicators": 0.0,
            "risk_level": "High", "key_concerns": ["isolation", null]}"#;

        let analysis = parse_classifier_response(reply, "test-model").unwrap();

        assert!(!analysis.is_fallback());
        assert_eq!(analysis.depression_indicators, 3);
        assert_eq!(analysis.risk_level, RiskLevel::High);
        assert_eq!(analysis.key_concerns, vec!["isolation"]);
    }

    #[tokio::test]
    async fn request_failure_falls_back() {
        let analyzer =
            SentimentAnalyzer::with_classifier(Arc::new(FailingClassifier), DEFAULT_TIMEOUT);
        let analysis = analyzer.analyze("I feel happy", &[]).await;

        assert!(analysis.is_fallback());
        assert!(analysis.sentiment_score > 0.0);
    }

    #[tokio::test]
    async fn garbage_reply_falls_back() {
        let analyzer = SentimentAnalyzer::with_classifier(
            Arc::new(CannedClassifier::new("I'd rather not say.")),
            DEFAULT_TIMEOUT,
        );
        assert!(analyzer.analyze("hello", &[]).await.is_fallback());

        let analyzer = SentimentAnalyzer::with_classifier(
            Arc::new(CannedClassifier::new("{ not json at all }")),
            DEFAULT_TIMEOUT,
        );
        assert!(analyzer.analyze("hello", &[]).await.is_fallback());
    }

    #[tokio::test]
    async fn slow_classifier_times_out_into_fallback() {
        let analyzer =
            SentimentAnalyzer::with_classifier(Arc::new(SlowClassifier), Duration::from_millis(20));
        let analysis = analyzer.analyze("sad and tired", &[]).await;

        assert!(analysis.is_fallback());
        assert_eq!(analysis.depression_indicators, 2);
    }
}
