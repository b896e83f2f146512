use chrono::{DateTime, FixedOffset};
use mindbridge_core::patients::{MedicalHistoryEntry, Medication, MentalHealthEntry};
use mindbridge_core::{
    AnalysisResult, Message, PatientRecord, RecommendationSet, Session, recommend,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct PatientLoginRequest {
    pub ic_number: String,
    #[serde(default)]
    pub consent: bool,
}

/// A patient's EMR record without the chat transcripts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientProfile {
    pub ic_number: String,
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub phone: String,
    pub email: String,
    pub last_visit: String,
    pub medical_history: Vec<MedicalHistoryEntry>,
    pub medications: Vec<Medication>,
    pub allergies: Vec<String>,
    pub mental_health_history: Vec<MentalHealthEntry>,
    pub chat_sessions: usize,
}

impl PatientProfile {
    pub fn from_record(ic_number: &str, record: PatientRecord) -> Self {
        Self {
            ic_number: ic_number.to_string(),
            chat_sessions: record.chat_sessions.len(),
            name: record.name,
            age: record.age,
            gender: record.gender,
            phone: record.phone,
            email: record.email,
            last_visit: record.last_visit,
            medical_history: record.medical_history,
            medications: record.medications,
            allergies: record.allergies,
            mental_health_history: record.mental_health_history,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Conversation so far. A fresh conversation starts from the greeting.
    #[serde(default)]
    pub history: Vec<Message>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    pub analysis: AnalysisResult,
    pub recommendations: RecommendationSet,
    /// 1-based number of the stored session.
    pub session_index: usize,
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationSummaryRequest {
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationSummaryResponse {
    pub analysis: Option<AnalysisResult>,
    pub recommendations: Option<RecommendationSet>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionView {
    pub session_number: usize,
    pub timestamp: DateTime<FixedOffset>,
    pub messages: Vec<Message>,
    pub analysis: AnalysisResult,
    pub recommendations: RecommendationSet,
    pub doctor_notes: Option<String>,
}

impl SessionView {
    pub fn new(session_number: usize, session: Session) -> Self {
        Self {
            session_number,
            recommendations: recommend(&session.analysis),
            timestamp: session.timestamp,
            messages: session.messages,
            analysis: session.analysis,
            doctor_notes: session.doctor_notes,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DoctorLoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DoctorLoginResponse {
    pub username: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DoctorNotesRequest {
    pub notes: String,
}
