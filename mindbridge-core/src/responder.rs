//! Supportive chat replies chosen from the analysis of the patient's latest
//! message.

use rand::Rng;
use rand::seq::IndexedRandom;

use crate::analysis::{AnalysisResult, RiskLevel};

/// Opening assistant message of a fresh conversation.
pub const GREETING: &str = "Hi there 💙 I'm so glad you're here. This is your space to share whatever's on your mind, at your own pace. There's no pressure - just know that I'm here to listen and support you. How are you feeling today?";

const CRISIS_REPLY: &str = "I hear you, and I'm really concerned about what you're going through right now. Your life matters, and you deserve support and care. 💙

I know things might feel overwhelming, but please know that you don't have to face this alone. There are people who want to help:

🆘 **If you're in immediate danger:**
• Emergency services: **999** (available 24/7)
• Go to your nearest hospital emergency department

💚 **Someone to talk to right now:**
• **Befrienders Malaysia: 03-7627 2929** (24/7, free, confidential)
• You can also reach out to a trusted friend or family member

I care about your wellbeing, and I want you to get the support you deserve. Will you reach out to one of these resources? You're worth it.";

const HIGH_RISK_OPENERS: [&str; 3] = [
    "Thank you for trusting me with what you're feeling. I can hear that you're really struggling right now, and that takes courage to share.",
    "I'm really glad you're here and talking about this. What you're experiencing sounds incredibly difficult.",
    "Your feelings are completely valid, and I want you to know that you're not alone in this.",
];

const HIGH_RISK_BODY: &str = "💜 **What might help right now:**
• Talking to a mental health professional can make a real difference - they're trained to help with exactly what you're going through
• The Befrienders helpline (03-7627 2929) offers 24/7 support if you need someone to talk to
• Small acts of self-care - a warm shower, your favorite comfort food, or calling someone you trust
• Remember: these heavy feelings won't last forever, even though they feel overwhelming right now

Would you like to talk more about what's been weighing on you? I'm here to listen, without judgment. 💙";

const MEDIUM_LOW_MOOD_REPLY: &str = "I can hear that things feel heavy right now. It's completely okay to not be okay - we all have these moments, and reaching out like you're doing takes real strength. 💙

**Some gentle suggestions that might help:**
• Take a few slow, deep breaths (in through your nose, out through your mouth)
• Step outside for some fresh air, even just for a few minutes
• Talk to someone who makes you feel safe and understood
• Do something small that usually brings you comfort - maybe a cup of tea, your favorite music, or a cozy blanket

Remember, you don't have to tackle everything at once. Just this moment, just this breath.

What do you think would feel helpful right now? I'm here to listen. 🌸";

const MEDIUM_REPLY: &str = "Thank you for opening up and sharing this with me. I'm here to listen and support you through whatever you're experiencing, at your own pace. 💜

**Things that might be helpful to explore:**
• Acknowledge what you're feeling, without judging yourself for it - all feelings are valid
• Think about times you've felt this way before and what helped then
• Consider talking with a friend, family member, or counselor you trust
• Remember that difficult feelings are visitors - they don't stay forever

Is there anything specific that's been on your mind that you'd like to talk through together?";

const LOW_POSITIVE_REPLY: &str = "It's wonderful to hear you're doing okay! 💚 Taking time to check in on your mental health shows real self-awareness and care for yourself.

**Ways to keep nurturing your wellbeing:**
• Move your body in ways that feel good - dancing, walking, stretching
• Stay connected with people who lift you up
• Try mindfulness, meditation, or just quiet moments to yourself
• Make time for things that bring you joy

Even on good days, it's great to talk things through. Is there anything on your mind you'd like to explore? 🌟";

const LOW_REPLY: &str = "Thank you for being here and sharing with me. Whatever you're feeling right now is okay - there's no pressure, no judgment, just a safe space to talk. 💙

**Sometimes it helps to:**
• Put words to what's sitting in your heart or mind
• Explore what you're feeling and where it might be coming from
• Think about small, gentle steps that might bring some ease
• Remember that it's perfectly okay to have mixed feelings or uncertain days

What would feel most supportive for you to talk about right now? I'm here, and I'm listening. 🌸";

/// Sentiment below which a Medium-risk reply leans toward grounding advice.
const MEDIUM_LOW_MOOD_BELOW: f64 = -0.2;

/// Sentiment above which a Low-risk reply is affirming.
const LOW_POSITIVE_ABOVE: f64 = 0.1;

pub fn supportive_reply(analysis: &AnalysisResult) -> String {
    supportive_reply_with(analysis, &mut rand::rng())
}

/// [`supportive_reply`] drawing the High-risk opener from `rng`.
pub fn supportive_reply_with<R: Rng + ?Sized>(analysis: &AnalysisResult, rng: &mut R) -> String {
    match analysis.risk_level {
        RiskLevel::Critical => CRISIS_REPLY.to_string(),
        RiskLevel::High => {
            let opener = HIGH_RISK_OPENERS
                .choose(rng)
                .copied()
                .unwrap_or(HIGH_RISK_OPENERS[0]);
            format!("{opener}\n\n{HIGH_RISK_BODY}")
        }
        RiskLevel::Medium if analysis.sentiment_score < MEDIUM_LOW_MOOD_BELOW => {
            MEDIUM_LOW_MOOD_REPLY.to_string()
        }
        RiskLevel::Medium => MEDIUM_REPLY.to_string(),
        RiskLevel::Low if analysis.sentiment_score > LOW_POSITIVE_ABOVE => {
            LOW_POSITIVE_REPLY.to_string()
        }
        RiskLevel::Low => LOW_REPLY.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisSource, RawAnalysis};
    use crate::clock::malaysia_now;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn analysis(risk_level: RiskLevel, sentiment_score: f64) -> AnalysisResult {
        RawAnalysis {
            risk_level: Some(risk_level.to_string()),
            sentiment_score: Some(sentiment_score),
            ..Default::default()
        }
        .into_result(AnalysisSource::Fallback, malaysia_now())
    }

    #[test]
    fn critical_reply_lists_emergency_contacts() {
        let reply = supportive_reply(&analysis(RiskLevel::Critical, 0.5));
        assert!(reply.contains("999"));
        assert!(reply.contains("Befrienders Malaysia: 03-7627 2929"));
    }

    #[test]
    fn high_reply_uses_one_of_the_openers() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10 {
            let reply = supportive_reply_with(&analysis(RiskLevel::High, -0.6), &mut rng);
            assert!(HIGH_RISK_OPENERS.iter().any(|o| reply.starts_with(o)));
            assert!(reply.ends_with(HIGH_RISK_BODY));
        }
    }

    #[test]
    fn medium_reply_depends_on_sentiment() {
        assert_eq!(
            supportive_reply(&analysis(RiskLevel::Medium, -0.5)),
            MEDIUM_LOW_MOOD_REPLY
        );
        assert_eq!(
            supportive_reply(&analysis(RiskLevel::Medium, -0.2)),
            MEDIUM_REPLY
        );
    }

    #[test]
    fn low_reply_depends_on_sentiment() {
        assert_eq!(
            supportive_reply(&analysis(RiskLevel::Low, 0.4)),
            LOW_POSITIVE_REPLY
        );
        assert_eq!(supportive_reply(&analysis(RiskLevel::Low, 0.1)), LOW_REPLY);
    }
}
