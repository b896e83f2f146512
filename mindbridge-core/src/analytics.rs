//! Clinician-facing views over the whole patient population.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analysis::RiskLevel;
use crate::patients::PatientRecord;

/// Risk label of a patient who has no chat sessions yet.
pub const NOT_ASSESSED: &str = "Not Assessed";

/// Filter value that disables the risk or gender filter.
const ANY: &str = "All";

/// One row of the doctor's patient list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientOverview {
    pub ic_number: String,
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub last_visit: String,
    /// Risk level of the latest session, or [`NOT_ASSESSED`].
    pub mental_health_risk: String,
    pub chat_sessions: usize,
}

impl PatientOverview {
    pub fn from_record(ic_number: &str, record: &PatientRecord) -> Self {
        let mental_health_risk = record
            .latest_session()
            .map(|session| session.analysis.risk_level.to_string())
            .unwrap_or_else(|| NOT_ASSESSED.to_string());

        Self {
            ic_number: ic_number.to_string(),
            name: record.name.clone(),
            age: record.age,
            gender: record.gender.clone(),
            last_visit: record.last_visit.clone(),
            mental_health_risk,
            chat_sessions: record.chat_sessions.len(),
        }
    }
}

/// Patient list filters. Absent fields (or `"All"`) match everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OverviewFilter {
    pub risk_level: Option<String>,
    pub gender: Option<String>,
    pub min_sessions: Option<usize>,
}

impl OverviewFilter {
    pub fn matches(&self, overview: &PatientOverview) -> bool {
        label_matches(self.risk_level.as_deref(), &overview.mental_health_risk)
            && label_matches(self.gender.as_deref(), &overview.gender)
            && overview.chat_sessions >= self.min_sessions.unwrap_or(0)
    }
}

fn label_matches(wanted: Option<&str>, actual: &str) -> bool {
    match wanted.map(str::trim) {
        None | Some("") => true,
        Some(wanted) if wanted.eq_ignore_ascii_case(ANY) => true,
        Some(wanted) => wanted.eq_ignore_ascii_case(actual),
    }
}

pub fn patient_overviews<'a, I>(patients: I, filter: &OverviewFilter) -> Vec<PatientOverview>
where
    I: IntoIterator<Item = (&'a str, &'a PatientRecord)>,
{
    patients
        .into_iter()
        .map(|(ic_number, record)| PatientOverview::from_record(ic_number, record))
        .filter(|overview| filter.matches(overview))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskCounts {
    #[serde(rename = "Critical")]
    pub critical: usize,
    #[serde(rename = "High")]
    pub high: usize,
    #[serde(rename = "Medium")]
    pub medium: usize,
    #[serde(rename = "Low")]
    pub low: usize,
    #[serde(rename = "Not Assessed")]
    pub not_assessed: usize,
}

impl RiskCounts {
    fn record(&mut self, risk_level: RiskLevel) {
        match risk_level {
            RiskLevel::Critical => self.critical += 1,
            RiskLevel::High => self.high += 1,
            RiskLevel::Medium => self.medium += 1,
            RiskLevel::Low => self.low += 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorStats {
    pub mean: f64,
    pub max: u32,
}

/// Mean sentiment of the sessions held on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySentiment {
    pub date: NaiveDate,
    pub mean_sentiment: f64,
    pub sessions: usize,
}

/// Aggregate statistics over every stored session.
///
/// Sessions are counted under their own risk level; patients without any
/// session are counted as not assessed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CohortSummary {
    pub total_patients: usize,
    pub total_sessions: usize,
    pub risk_counts: RiskCounts,
    pub high_risk: usize,
    pub mean_sentiment: f64,
    pub min_sentiment: f64,
    pub max_sentiment: f64,
    pub depression: IndicatorStats,
    pub anxiety: IndicatorStats,
    /// Sentiment trend, oldest day first.
    pub daily_sentiment: Vec<DailySentiment>,
}

impl CohortSummary {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a PatientRecord>,
    {
        let mut summary = CohortSummary::default();
        let mut sentiments = Vec::new();
        let mut depression = Vec::new();
        let mut anxiety = Vec::new();
        let mut by_day: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();

        for record in records {
            summary.total_patients += 1;
            if record.chat_sessions.is_empty() {
                summary.risk_counts.not_assessed += 1;
                continue;
            }
            for session in &record.chat_sessions {
                let analysis = &session.analysis;
                summary.risk_counts.record(analysis.risk_level);
                sentiments.push(analysis.sentiment_score);
                depression.push(analysis.depression_indicators);
                anxiety.push(analysis.anxiety_indicators);

                let day = by_day.entry(session.timestamp.date_naive()).or_default();
                day.0 += analysis.sentiment_score;
                day.1 += 1;
            }
        }

        summary.total_sessions = sentiments.len();
        summary.high_risk = summary.risk_counts.critical + summary.risk_counts.high;

        if !sentiments.is_empty() {
            summary.mean_sentiment = sentiments.iter().sum::<f64>() / sentiments.len() as f64;
            summary.min_sentiment = sentiments.iter().copied().fold(f64::INFINITY, f64::min);
            summary.max_sentiment = sentiments
                .iter()
                .copied()
                .fold(f64::NEG_INFINITY, f64::max);
        }
        summary.depression = indicator_stats(&depression);
        summary.anxiety = indicator_stats(&anxiety);
        summary.daily_sentiment = by_day
            .into_iter()
            .map(|(date, (total, sessions))| DailySentiment {
                date,
                mean_sentiment: total / sessions as f64,
                sessions,
            })
            .collect();

        summary
    }
}

fn indicator_stats(values: &[u32]) -> IndicatorStats {
    if values.is_empty() {
        return IndicatorStats::default();
    }
    let total: u64 = values.iter().map(|v| u64::from(*v)).sum();
    IndicatorStats {
        mean: total as f64 / values.len() as f64,
        max: values.iter().copied().max().unwrap_or(0),
    }
}
