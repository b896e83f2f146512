use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::analysis::{AnalysisResult, Message};
use crate::error::{MindBridgeError, Result};

/// One chat session recorded against a patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub timestamp: DateTime<FixedOffset>,
    pub messages: Vec<Message>,
    pub analysis: AnalysisResult,
    pub doctor_notes: Option<String>,
}

impl Session {
    pub fn new(
        timestamp: DateTime<FixedOffset>,
        messages: Vec<Message>,
        analysis: AnalysisResult,
    ) -> Self {
        Self {
            timestamp,
            messages,
            analysis,
            doctor_notes: None,
        }
    }

    pub fn user_messages(&self) -> impl Iterator<Item = &str> {
        self.messages
            .iter()
            .filter(|m| m.is_user())
            .map(|m| m.content.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalHistoryEntry {
    pub date: String,
    pub diagnosis: String,
    pub doctor: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentalHealthEntry {
    pub date: String,
    pub condition: String,
    pub severity: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientRecord {
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub phone: String,
    pub email: String,
    pub medical_history: Vec<MedicalHistoryEntry>,
    pub medications: Vec<Medication>,
    pub allergies: Vec<String>,
    pub last_visit: String,
    pub mental_health_history: Vec<MentalHealthEntry>,
    #[serde(default)]
    pub chat_sessions: Vec<Session>,
}

impl PatientRecord {
    pub fn latest_session(&self) -> Option<&Session> {
        self.chat_sessions.last()
    }
}

/// Storage for patient records and their chat sessions.
///
/// Session indices are 0-based positions in `chat_sessions`.
#[async_trait]
pub trait PatientStore: Send + Sync {
    async fn get(&self, ic_number: &str) -> Result<Option<PatientRecord>>;

    /// All patients, ordered by IC number.
    async fn list(&self) -> Result<Vec<(String, PatientRecord)>>;

    /// Appends a session and returns its index.
    async fn append_session(&self, ic_number: &str, session: Session) -> Result<usize>;

    async fn update_doctor_notes(&self, ic_number: &str, index: usize, notes: String)
    -> Result<()>;
}

/// In-memory implementation of PatientStore
pub struct InMemoryPatientStore {
    patients: Arc<DashMap<String, PatientRecord>>,
}

impl InMemoryPatientStore {
    pub fn new() -> Self {
        Self {
            patients: Arc::new(DashMap::new()),
        }
    }

    /// Store seeded with the demo EMR records.
    pub fn with_demo_patients() -> Self {
        let store = Self::new();
        for (ic_number, record) in demo_patients() {
            store.insert(ic_number, record);
        }
        store
    }

    pub fn insert(&self, ic_number: impl Into<String>, record: PatientRecord) {
        self.patients.insert(ic_number.into(), record);
    }
}

impl Default for InMemoryPatientStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PatientStore for InMemoryPatientStore {
    async fn get(&self, ic_number: &str) -> Result<Option<PatientRecord>> {
        Ok(self.patients.get(ic_number).map(|entry| entry.clone()))
    }

    async fn list(&self) -> Result<Vec<(String, PatientRecord)>> {
        let mut patients: Vec<_> = self
            .patients
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        patients.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(patients)
    }

    async fn append_session(&self, ic_number: &str, session: Session) -> Result<usize> {
        let mut record = self
            .patients
            .get_mut(ic_number)
            .ok_or_else(|| MindBridgeError::PatientNotFound(ic_number.to_string()))?;
        record.chat_sessions.push(session);
        Ok(record.chat_sessions.len() - 1)
    }

    async fn update_doctor_notes(
        &self,
        ic_number: &str,
        index: usize,
        notes: String,
    ) -> Result<()> {
        let mut record = self
            .patients
            .get_mut(ic_number)
            .ok_or_else(|| MindBridgeError::PatientNotFound(ic_number.to_string()))?;
        let session = record.chat_sessions.get_mut(index).ok_or_else(|| {
            MindBridgeError::SessionNotFound {
                ic_number: ic_number.to_string(),
                index,
            }
        })?;
        session.doctor_notes = Some(notes);
        Ok(())
    }
}

fn history(date: &str, diagnosis: &str, doctor: &str) -> MedicalHistoryEntry {
    MedicalHistoryEntry {
        date: date.into(),
        diagnosis: diagnosis.into(),
        doctor: doctor.into(),
    }
}

fn medication(name: &str, dosage: &str, frequency: &str) -> Medication {
    Medication {
        name: name.into(),
        dosage: dosage.into(),
        frequency: frequency.into(),
    }
}

fn mental_health(date: &str, condition: &str, severity: &str) -> MentalHealthEntry {
    MentalHealthEntry {
        date: date.into(),
        condition: condition.into(),
        severity: severity.into(),
    }
}

/// The three demo patients of the mock EMR.
pub fn demo_patients() -> Vec<(String, PatientRecord)> {
    vec![
        (
            "123456789012".into(),
            PatientRecord {
                name: "Ahmad bin Ali".into(),
                age: 35,
                gender: "Male".into(),
                phone: "012-3456789".into(),
                email: "ahmad.ali@email.com".into(),
                medical_history: vec![
                    history("2024-01-15", "Hypertension", "Dr. Lim"),
                    history("2023-08-22", "Type 2 Diabetes", "Dr. Wong"),
                    history("2023-03-10", "Anxiety Disorder", "Dr. Rahman"),
                ],
                medications: vec![
                    medication("Amlodipine", "5mg", "Once daily"),
                    medication("Metformin", "500mg", "Twice daily"),
                    medication("Lorazepam", "0.5mg", "As needed"),
                ],
                allergies: vec!["Penicillin".into(), "Shellfish".into()],
                last_visit: "2024-01-15".into(),
                mental_health_history: vec![mental_health(
                    "2023-03-10",
                    "Anxiety Disorder",
                    "Moderate",
                )],
                chat_sessions: Vec::new(),
            },
        ),
        (
            "987654321098".into(),
            PatientRecord {
                name: "Siti Nurhaliza".into(),
                age: 28,
                gender: "Female".into(),
                phone: "013-9876543".into(),
                email: "siti.nur@email.com".into(),
                medical_history: vec![
                    history("2024-02-20", "Migraine", "Dr. Tan"),
                    history("2023-11-05", "Depression", "Dr. Ahmad"),
                ],
                medications: vec![
                    medication("Sumatriptan", "50mg", "As needed"),
                    medication("Sertraline", "50mg", "Once daily"),
                ],
                allergies: vec!["Aspirin".into()],
                last_visit: "2024-02-20".into(),
                mental_health_history: vec![mental_health(
                    "2023-11-05",
                    "Major Depression",
                    "Moderate to Severe",
                )],
                chat_sessions: Vec::new(),
            },
        ),
        (
            "456789123456".into(),
            PatientRecord {
                name: "Raj Kumar".into(),
                age: 42,
                gender: "Male".into(),
                phone: "014-5678901".into(),
                email: "raj.kumar@email.com".into(),
                medical_history: vec![
                    history("2024-03-01", "Chronic Back Pain", "Dr. Lee"),
                    history("2023-12-15", "Insomnia", "Dr. Chong"),
                ],
                medications: vec![
                    medication("Ibuprofen", "400mg", "Three times daily"),
                    medication("Zolpidem", "10mg", "Before bedtime"),
                ],
                allergies: vec!["None known".into()],
                last_visit: "2024-03-01".into(),
                mental_health_history: vec![mental_health(
                    "2023-12-15",
                    "Sleep Disorder",
                    "Mild",
                )],
                chat_sessions: Vec::new(),
            },
        ),
    ]
}
