use mindbridge_core::clock::malaysia_now;
use mindbridge_core::responder::GREETING;
use mindbridge_core::{
    AnalysisResult, MentalHealthAnalyzer, Message, MindBridgeError, PatientStore,
    RecommendationSet, Session, supportive_reply,
};
use thiserror::Error;
use tracing::info;

use crate::auth::ValidationError;

#[derive(Debug, Error)]
pub enum ChatTurnError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] MindBridgeError),
}

/// Outcome of one patient message.
#[derive(Debug)]
pub struct ChatTurn {
    pub reply: String,
    pub analysis: AnalysisResult,
    pub recommendations: RecommendationSet,
    /// 0-based index of the stored session.
    pub session_index: usize,
    pub messages: Vec<Message>,
}

/// Runs one chat turn: the message is analyzed with the whole conversation
/// as context, a supportive reply is appended, and the conversation is
/// stored as a new session.
pub async fn run_chat_turn(
    store: &dyn PatientStore,
    analyzer: &MentalHealthAnalyzer,
    ic_number: &str,
    message: &str,
    history: Vec<Message>,
) -> Result<ChatTurn, ChatTurnError> {
    if message.trim().is_empty() {
        return Err(ValidationError::EmptyMessage.into());
    }
    if store.get(ic_number).await?.is_none() {
        return Err(MindBridgeError::PatientNotFound(ic_number.to_string()).into());
    }

    let mut messages = if history.is_empty() {
        vec![Message::assistant(GREETING)]
    } else {
        history
    };
    messages.push(Message::user(message));

    let analysis = analyzer.analyze_text(message, &messages).await;
    let reply = supportive_reply(&analysis);
    messages.push(Message::assistant(reply.clone()));

    let session = Session::new(malaysia_now(), messages.clone(), analysis.clone());
    let session_index = store.append_session(ic_number, session).await?;

    info!(
        ic_number = %ic_number,
        risk_level = %analysis.risk_level,
        source_model = %analysis.source_model,
        session_index,
        "Chat turn stored"
    );

    Ok(ChatTurn {
        recommendations: analyzer.recommend(&analysis),
        reply,
        analysis,
        session_index,
        messages,
    })
}
