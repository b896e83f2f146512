use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisResult, RiskLevel};

/// Below this confidence clinicians are nudged toward a manual assessment.
const LOW_CONFIDENCE_THRESHOLD: f64 = 0.6;

/// How many key concerns are summarized in the notes.
const SUMMARIZED_CONCERNS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationSet {
    pub immediate_action: String,
    pub recommendations: Vec<String>,
    pub follow_up: String,
    pub additional_notes: Vec<String>,
}

/// Fixed clinical guidance for one risk tier.
#[derive(Debug)]
pub struct RiskTier {
    pub immediate_action: &'static str,
    pub recommendations: &'static [&'static str],
    pub follow_up: &'static str,
}

const CRITICAL_TIER: RiskTier = RiskTier {
    immediate_action: "🚨 EMERGENCY - IMMEDIATE INTERVENTION REQUIRED",
    recommendations: &[
        "Contact emergency services (999) immediately if imminent danger",
        "Activate crisis response team NOW",
        "Do NOT leave patient alone",
        "Immediate psychiatric evaluation required within 1 hour",
        "Implement safety planning protocol",
        "Contact patient's emergency contact immediately",
    ],
    follow_up: "Continuous monitoring - within 1 hour",
};

const HIGH_TIER: RiskTier = RiskTier {
    immediate_action: "⚠️ URGENT - Mental health referral needed within 24-48 hours",
    recommendations: &[
        "Schedule urgent psychiatrist consultation within 48 hours",
        "Consider immediate counseling/therapy referral",
        "Review and adjust current medications if applicable",
        "Implement daily check-ins (phone or in-person)",
        "Provide crisis hotline numbers: Befrienders 03-76272929",
        "Assess support system availability",
    ],
    follow_up: "Within 24-48 hours, then every 2-3 days",
};

const MEDIUM_TIER: RiskTier = RiskTier {
    immediate_action: "📋 Schedule follow-up appointment within 1-2 weeks",
    recommendations: &[
        "Consider counseling or therapy referral",
        "Discuss lifestyle modifications (sleep, exercise, diet)",
        "Introduce stress management techniques",
        "Evaluate sleep patterns and quality",
        "Weekly check-ins via phone or video chat",
    ],
    follow_up: "Within 1-2 weeks",
};

const LOW_TIER: RiskTier = RiskTier {
    immediate_action: "✅ Continue supportive care and monitoring",
    recommendations: &[
        "Maintain regular check-ups",
        "Encourage healthy lifestyle habits",
        "Provide mental health education resources",
        "Keep communication channels open",
        "Preventive mental wellness strategies",
    ],
    follow_up: "Regular scheduled visits",
};

pub fn tier(risk_level: RiskLevel) -> &'static RiskTier {
    match risk_level {
        RiskLevel::Critical => &CRITICAL_TIER,
        RiskLevel::High => &HIGH_TIER,
        RiskLevel::Medium => &MEDIUM_TIER,
        RiskLevel::Low => &LOW_TIER,
    }
}

/// Clinical guidance for an analysis: the tier block for its risk level,
/// preceded by notes on sarcasm, low confidence, key concerns and emotional
/// state (in that order, each only when it applies).
pub fn recommend(analysis: &AnalysisResult) -> RecommendationSet {
    let mut additional_notes = Vec::new();

    if analysis.is_sarcastic {
        let true_emotion = analysis.true_emotion.as_deref().unwrap_or("unknown");
        additional_notes.push(format!(
            "⚠️ Sarcasm/Masking Detected: Patient may be hiding true feelings. True emotion: {true_emotion}"
        ));
    }

    if analysis.confidence > 0.0 && analysis.confidence < LOW_CONFIDENCE_THRESHOLD {
        additional_notes.push(format!(
            "ℹ️ AI Confidence: {} - Consider additional clinical assessment",
            format_percent(analysis.confidence)
        ));
    }

    if !analysis.key_concerns.is_empty() {
        let concerns = analysis
            .key_concerns
            .iter()
            .take(SUMMARIZED_CONCERNS)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        additional_notes.push(format!("🎯 Primary concerns: {concerns}"));
    }

    if let Some(state) = analysis.reportable_emotional_state() {
        additional_notes.push(format!("Emotional state: {state}"));
    }

    let tier = tier(analysis.risk_level);
    RecommendationSet {
        immediate_action: tier.immediate_action.to_string(),
        recommendations: tier.recommendations.iter().map(|r| r.to_string()).collect(),
        follow_up: tier.follow_up.to_string(),
        additional_notes,
    }
}

/// `0.5` -> `"50%"`.
pub fn format_percent(fraction: f64) -> String {
    format!("{:.0}%", fraction * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisSource, FALLBACK_EMOTIONAL_STATE, RawAnalysis};
    use crate::clock::malaysia_now;

    fn analysis(risk_level: RiskLevel) -> AnalysisResult {
        RawAnalysis {
            risk_level: Some(risk_level.to_string()),
            confidence: Some(0.9),
            ..Default::default()
        }
        .into_result(AnalysisSource::Remote("test".into()), malaysia_now())
    }

    #[test]
    fn tiers_map_to_fixed_text() {
        let cases = [
            (
                RiskLevel::Critical,
                "🚨 EMERGENCY - IMMEDIATE INTERVENTION REQUIRED",
                "Continuous monitoring - within 1 hour",
            ),
            (
                RiskLevel::High,
                "⚠️ URGENT - Mental health referral needed within 24-48 hours",
                "Within 24-48 hours, then every 2-3 days",
            ),
            (
                RiskLevel::Medium,
                "📋 Schedule follow-up appointment within 1-2 weeks",
                "Within 1-2 weeks",
            ),
            (
                RiskLevel::Low,
                "✅ Continue supportive care and monitoring",
                "Regular scheduled visits",
            ),
        ];

        for (level, immediate_action, follow_up) in cases {
            let set = recommend(&analysis(level));
            assert_eq!(set.immediate_action, immediate_action);
            assert_eq!(set.follow_up, follow_up);
            assert!(set.additional_notes.is_empty());
        }
    }

    #[test]
    fn high_tier_lists_hotline() {
        let set = recommend(&analysis(RiskLevel::High));
        assert_eq!(set.recommendations.len(), 6);
        assert!(
            set.recommendations
                .contains(&"Provide crisis hotline numbers: Befrienders 03-76272929".to_string())
        );
    }

    #[test]
    fn notes_follow_fixed_order() {
        let mut input = analysis(RiskLevel::Medium);
        input.is_sarcastic = true;
        input.true_emotion = Some("frustration".into());
        input.confidence = 0.45;
        input.key_concerns = vec!["a".into(), "b".into(), "c".into(), "d".into()];
        input.emotional_state = Some("quietly overwhelmed".into());

        let set = recommend(&input);
        assert_eq!(
            set.additional_notes,
            vec![
                "⚠️ Sarcasm/Masking Detected: Patient may be hiding true feelings. True emotion: frustration",
                "ℹ️ AI Confidence: 45% - Consider additional clinical assessment",
                "🎯 Primary concerns: a, b, c",
                "Emotional state: quietly overwhelmed",
            ]
        );
    }

    #[test]
    fn fallback_placeholder_state_and_zero_confidence_add_no_notes() {
        let mut input = analysis(RiskLevel::Low);
        input.confidence = 0.0;
        input.emotional_state = Some(FALLBACK_EMOTIONAL_STATE.into());

        assert!(recommend(&input).additional_notes.is_empty());
    }

    #[test]
    fn recommendations_depend_only_on_level_and_annotations() {
        let mut a = analysis(RiskLevel::High);
        let mut b = analysis(RiskLevel::High);
        a.sentiment_score = -0.9;
        b.sentiment_score = 0.4;
        a.depression_indicators = 7;

        assert_eq!(recommend(&a), recommend(&b));
    }

    #[test]
    fn percent_rounds_to_whole_number() {
        assert_eq!(format_percent(0.5), "50%");
        assert_eq!(format_percent(0.826), "83%");
    }
}
