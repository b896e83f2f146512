pub mod auth;
pub mod config;
pub mod models;
pub mod service;
pub mod workflow;

pub use config::{LogFormat, ServiceConfig};
pub use models::*;
pub use service::{AppState, build_router, create_app};
pub use workflow::{ChatTurn, ChatTurnError, run_chat_turn};
