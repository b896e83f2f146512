use tracing::info;

use crate::analysis::{AnalysisResult, Message};
use crate::recommendations::{RecommendationSet, recommend};
use crate::safety::apply_crisis_override;
use crate::sentiment::{AnalyzerConfig, SentimentAnalyzer};

/// Sentiment analysis followed by the crisis override, plus recommendations.
pub struct MentalHealthAnalyzer {
    sentiment: SentimentAnalyzer,
}

impl MentalHealthAnalyzer {
    pub fn new(sentiment: SentimentAnalyzer) -> Self {
        Self { sentiment }
    }

    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self::new(SentimentAnalyzer::from_config(config))
    }

    pub fn uses_fallback(&self) -> bool {
        self.sentiment.uses_fallback()
    }

    /// Analyzes `text` with `history` as context. Crisis language in `text`
    /// always ends in a Critical result.
    pub async fn analyze_text(&self, text: &str, history: &[Message]) -> AnalysisResult {
        let analysis = self.sentiment.analyze(text, history).await;
        let analysis = apply_crisis_override(analysis, text);

        info!(
            risk_level = %analysis.risk_level,
            source_model = %analysis.source_model,
            sentiment_score = analysis.sentiment_score,
            "Text analyzed"
        );
        analysis
    }

    /// Analyzes every user message of a conversation as one text. Returns
    /// `None` when the patient has not said anything yet.
    pub async fn analyze_conversation(&self, messages: &[Message]) -> Option<AnalysisResult> {
        let combined = messages
            .iter()
            .filter(|m| m.is_user())
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>();
        if combined.is_empty() {
            return None;
        }

        Some(self.analyze_text(&combined.join(" "), messages).await)
    }

    pub fn recommend(&self, analysis: &AnalysisResult) -> RecommendationSet {
        recommend(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::RiskLevel;
    use crate::safety::CRISIS_SENTINEL;

    #[tokio::test]
    async fn conversation_without_user_messages_is_not_analyzed() {
        let analyzer = MentalHealthAnalyzer::new(SentimentAnalyzer::fallback());
        let messages = vec![Message::assistant("How are you feeling today?")];

        assert!(analyzer.analyze_conversation(&messages).await.is_none());
    }

    #[tokio::test]
    async fn conversation_joins_user_messages() {
        let analyzer = MentalHealthAnalyzer::new(SentimentAnalyzer::fallback());
        let messages = vec![
            Message::assistant("How are you feeling today?"),
            Message::user("I am happy"),
            Message::assistant("Glad to hear it."),
            Message::user("and calm"),
        ];

        let analysis = analyzer.analyze_conversation(&messages).await.unwrap();
        assert_eq!(analysis.risk_level, RiskLevel::Low);
        assert!(analysis.sentiment_score > 0.0);
    }

    #[tokio::test]
    async fn repeated_crisis_analysis_keeps_a_single_sentinel() {
        let analyzer = MentalHealthAnalyzer::new(SentimentAnalyzer::fallback());
        let messages = vec![
            Message::user("I want to end it all"),
            Message::user("there is no reason to live"),
        ];

        let first = analyzer.analyze_conversation(&messages).await.unwrap();
        let second = analyzer.analyze_conversation(&messages).await.unwrap();
        for analysis in [&first, &second] {
            assert_eq!(analysis.risk_level, RiskLevel::Critical);
            assert_eq!(
                analysis
                    .key_concerns
                    .iter()
                    .filter(|c| *c == CRISIS_SENTINEL)
                    .count(),
                1
            );
        }
        assert_eq!(first.crisis_indicators, second.crisis_indicators);
    }
}
