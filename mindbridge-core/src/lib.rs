//! # MindBridge core
//!
//! Sentiment and risk analysis of patient chat messages, with the clinical
//! output built on top of it.
//!
//! An analysis runs in two stages. A [`SentimentAnalyzer`] scores the text,
//! either through a remote LLM classifier or, when no credential is
//! configured or the remote call fails, through a fixed lexicon. The crisis
//! override then escalates any text containing crisis language to
//! [`RiskLevel::Critical`], whatever the first stage concluded.
//!
//! ```rust,no_run
//! use mindbridge_core::{AnalyzerConfig, MentalHealthAnalyzer};
//!
//! # async fn example() {
//! let analyzer = MentalHealthAnalyzer::from_config(&AnalyzerConfig::default());
//! let analysis = analyzer.analyze_text("I feel happy and great today", &[]).await;
//! let recommendations = analyzer.recommend(&analysis);
//! println!("{}: {}", analysis.risk_level, recommendations.immediate_action);
//! # }
//! ```
//!
//! Analyses are recorded as [`Session`]s in a [`PatientStore`], from which
//! patient and clinical reports and cohort analytics are derived.

pub mod analysis;
pub mod analytics;
pub mod classifier;
pub mod clock;
pub mod error;
pub mod lexicon;
pub mod patients;
pub mod pipeline;
pub mod recommendations;
pub mod report;
pub mod responder;
pub mod safety;
pub mod sentiment;

pub use analysis::{AnalysisResult, AnalysisSource, Message, MessageRole, RiskLevel};
pub use analytics::{CohortSummary, OverviewFilter, PatientOverview, patient_overviews};
pub use classifier::{OpenRouterClassifier, SentimentClassifier};
pub use error::{ClassifierError, MindBridgeError, Result};
pub use patients::{InMemoryPatientStore, PatientRecord, PatientStore, Session};
pub use pipeline::MentalHealthAnalyzer;
pub use recommendations::{RecommendationSet, recommend};
pub use report::{format_clinical_report, format_patient_report};
pub use responder::supportive_reply;
pub use safety::{CRISIS_SENTINEL, apply_crisis_override};
pub use sentiment::{AnalyzerConfig, SentimentAnalyzer};
