//! Fixed word and phrase lists, and the substring matcher that scores text
//! against them.
//!
//! Matching is case-insensitive and deliberately not word-boundary aware:
//! `"die"` matches inside `"diet"`, and multi-word phrases match verbatim.

/// A named, fixed list of lowercase terms.
#[derive(Debug, Clone, Copy)]
pub struct Lexicon {
    name: &'static str,
    terms: &'static [&'static str],
}

impl Lexicon {
    pub const fn new(name: &'static str, terms: &'static [&'static str]) -> Self {
        Self { name, terms }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of distinct terms that occur anywhere in `text`.
    pub fn count_in(&self, text: &str) -> usize {
        let lowered = text.to_lowercase();
        self.terms
            .iter()
            .filter(|term| lowered.contains(*term))
            .count()
    }

    /// True when at least one term occurs in `text`.
    pub fn matches_any(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.terms.iter().any(|term| lowered.contains(*term))
    }

    /// Exact membership test for a single, already-normalized token.
    pub fn contains_token(&self, token: &str) -> bool {
        self.terms.contains(&token)
    }
}

pub const POSITIVE_WORDS: Lexicon = Lexicon::new(
    "positive",
    &[
        "good", "great", "excellent", "amazing", "wonderful", "fantastic", "happy", "joy", "love",
        "like", "enjoy", "pleased", "satisfied", "hope", "optimistic", "confident", "grateful",
        "thankful", "blessed", "better", "improving", "positive", "calm", "relaxed",
    ],
);

pub const NEGATIVE_WORDS: Lexicon = Lexicon::new(
    "negative",
    &[
        "bad", "terrible", "awful", "horrible", "sad", "angry", "hate", "dislike", "upset",
        "frustrated", "disappointed", "worried", "anxious", "anxiety", "depressed", "depression",
        "lonely", "hopeless", "worthless", "stress", "stressed", "overwhelmed", "exhausted",
        "nervous", "scared", "fear", "panic", "crying", "tired",
    ],
);

pub const DEPRESSION_TERMS: Lexicon =
    Lexicon::new("depression", &["sad", "depressed", "down", "hopeless"]);

pub const ANXIETY_TERMS: Lexicon =
    Lexicon::new("anxiety", &["anxious", "worried", "nervous", "panic"]);

pub const CRISIS_PHRASES: Lexicon = Lexicon::new(
    "crisis",
    &[
        "suicide",
        "suicidal",
        "kill myself",
        "end it all",
        "die",
        "dying",
        "death wish",
        "no reason to live",
        "better off dead",
        "harm myself",
        "hurt myself",
        "end my life",
        "want to die",
        "cant go on",
    ],
);

pub const SLEEP_TERMS: Lexicon = Lexicon::new("sleep", &["sleep", "tired", "fatigue", "insomnia"]);

pub const WORK_STRESS_TERMS: Lexicon =
    Lexicon::new("work_stress", &["work", "job", "career", "stress"]);

pub const RELATIONSHIP_TERMS: Lexicon =
    Lexicon::new("relationship", &["family", "relationship", "partner"]);
