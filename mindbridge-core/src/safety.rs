use tracing::warn;

use crate::analysis::{AnalysisResult, RiskLevel};
use crate::lexicon::CRISIS_PHRASES;

/// Concern placed first on every analysis whose text contains crisis
/// language.
pub const CRISIS_SENTINEL: &str = "CRISIS KEYWORDS DETECTED — IMMEDIATE INTERVENTION REQUIRED";

/// Escalates an analysis to [`RiskLevel::Critical`] when `raw_text` contains
/// any crisis phrase, whatever the sentiment strategy concluded.
///
/// Applying the override again to its own output changes nothing: the
/// sentinel concern is kept at the front and never duplicated.
pub fn apply_crisis_override(mut analysis: AnalysisResult, raw_text: &str) -> AnalysisResult {
    let crisis_count = u32::try_from(CRISIS_PHRASES.count_in(raw_text)).unwrap_or(u32::MAX);
    if crisis_count == 0 {
        return analysis;
    }

    warn!(
        crisis_count,
        previous_risk_level = %analysis.risk_level,
        "Crisis language detected, escalating to Critical"
    );

    analysis.risk_level = RiskLevel::Critical;
    analysis.crisis_indicators = analysis.crisis_indicators.max(crisis_count);
    analysis.key_concerns.retain(|concern| concern != CRISIS_SENTINEL);
    analysis.key_concerns.insert(0, CRISIS_SENTINEL.to_string());

    analysis
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisSource, RawAnalysis};
    use crate::clock::malaysia_now;

    fn analysis_with(risk_level: RiskLevel, crisis_indicators: u32) -> AnalysisResult {
        RawAnalysis {
            risk_level: Some(risk_level.to_string()),
            crisis_indicators: Some(f64::from(crisis_indicators)),
            key_concerns: Some(vec![Some("isolation".to_string())]),
            ..Default::default()
        }
        .into_result(AnalysisSource::Remote("test".into()), malaysia_now())
    }

    #[test]
    fn crisis_phrase_forces_critical_from_any_level() {
        for level in RiskLevel::ALL {
            let result = apply_crisis_override(analysis_with(level, 0), "I want to kill myself");
            assert_eq!(result.risk_level, RiskLevel::Critical);
            assert!(result.crisis_indicators >= 1);
            assert_eq!(result.key_concerns[0], CRISIS_SENTINEL);
            assert_eq!(result.key_concerns[1], "isolation");
        }
    }

    #[test]
    fn existing_crisis_count_is_kept_when_larger() {
        let result = apply_crisis_override(analysis_with(RiskLevel::High, 4), "suicidal");
        assert_eq!(result.crisis_indicators, 4);
    }

    #[test]
    fn keyword_count_raises_lower_crisis_count() {
        // "want to die" and "die"
        let result = apply_crisis_override(analysis_with(RiskLevel::Low, 0), "I want to die");
        assert_eq!(result.crisis_indicators, 2);
    }

    #[test]
    fn text_without_crisis_language_is_untouched() {
        let before = analysis_with(RiskLevel::Medium, 0);
        let after = apply_crisis_override(before.clone(), "rough week at work");
        assert_eq!(after, before);
    }

    #[test]
    fn override_is_idempotent() {
        let text = "no reason to live, I just want to end it all";
        let once = apply_crisis_override(analysis_with(RiskLevel::Low, 0), text);
        let twice = apply_crisis_override(once.clone(), text);

        assert_eq!(twice.risk_level, once.risk_level);
        assert_eq!(twice.crisis_indicators, once.crisis_indicators);
        assert_eq!(twice.key_concerns, once.key_concerns);
        assert_eq!(
            twice
                .key_concerns
                .iter()
                .filter(|c| *c == CRISIS_SENTINEL)
                .count(),
            1
        );
    }

    #[test]
    fn misplaced_sentinel_moves_to_front() {
        let mut analysis = analysis_with(RiskLevel::High, 0);
        analysis.key_concerns.push(CRISIS_SENTINEL.to_string());

        let result = apply_crisis_override(analysis, "better off dead");
        assert_eq!(result.key_concerns, vec![CRISIS_SENTINEL, "isolation"]);
    }
}
