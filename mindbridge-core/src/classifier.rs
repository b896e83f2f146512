//! Remote text classifier used by the sentiment analyzer.

use async_trait::async_trait;
use rig::{agent::Agent, client::CompletionClient, completion::Prompt, providers::openrouter};
use tracing::debug;

use crate::analysis::Message;
use crate::error::ClassifierError;

/// Number of prior conversation turns sent along with a message.
pub const CONTEXT_TURNS: usize = 5;

const CLASSIFIER_PREAMBLE: &str = "You are a clinical mental health AI analyzer. You answer with a single JSON object and nothing else.";

/// Anything that can turn an instruction prompt into raw model text.
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    /// Identifier recorded as `source_model` on successful analyses.
    fn model_id(&self) -> &str;

    async fn classify(&self, prompt: &str) -> Result<String, ClassifierError>;
}

/// Generation settings for the remote classifier.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f64,
    pub max_output_tokens: u64,
}

/// LLM classifier reached through OpenRouter.
pub struct OpenRouterClassifier {
    agent: Agent<openrouter::CompletionModel>,
    model: String,
}

impl OpenRouterClassifier {
    pub fn new(api_key: &str, settings: &GenerationSettings) -> Self {
        let client = openrouter::Client::new(api_key);
        let agent = client
            .agent(&settings.model)
            .preamble(CLASSIFIER_PREAMBLE)
            .temperature(settings.temperature)
            .max_tokens(settings.max_output_tokens)
            .build();

        Self {
            agent,
            model: settings.model.clone(),
        }
    }
}

#[async_trait]
impl SentimentClassifier for OpenRouterClassifier {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn classify(&self, prompt: &str) -> Result<String, ClassifierError> {
        debug!(model = %self.model, prompt_len = prompt.len(), "Calling remote classifier");
        self.agent
            .prompt(prompt)
            .await
            .map_err(|e| ClassifierError::Request(e.to_string()))
    }
}

/// Builds the instruction sent to the classifier: the current message plus
/// at most the last [`CONTEXT_TURNS`] turns of conversation.
pub fn build_analysis_prompt(text: &str, history: &[Message]) -> String {
    let start = history.len().saturating_sub(CONTEXT_TURNS);
    let context = history[start..]
        .iter()
        .map(|m| format!("{}: {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n");

    let context_block = if context.is_empty() {
        String::new()
    } else {
        format!("Previous conversation context:\n{context}\n")
    };

    format!(
        r#"You are a clinical mental health AI analyzer. Analyze this patient message for mental health indicators.

{context_block}
Current patient message: "{text}"

Analyze and return ONLY valid JSON (no markdown, no explanation):
{{
    "sentiment_score": <float between -1.0 (very negative) and 1.0 (very positive)>,
    "is_sarcastic": <true or false>,
    "true_emotion": "<actual emotion if sarcastic, or 'none' if not>",
    "depression_indicators": <integer count 0-10>,
    "anxiety_indicators": <integer count 0-10>,
    "crisis_indicators": <integer count 0-5>,
    "risk_level": "<Critical or High or Medium or Low>",
    "emotional_state": "<brief 5-10 word description>",
    "key_concerns": ["<concern1>", "<concern2>"],
    "confidence": <float between 0.0 and 1.0>
}}

CRITICAL: Detect sarcasm ("I'm fine" when struggling), minimization, hidden emotions, and consider conversation context."#
    )
}

/// Pulls the outermost `{ ... }` out of a model reply that may be wrapped in
/// prose or markdown code fences.
pub fn extract_json_object(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    (end > start).then(|| &response[start..=end])
}
