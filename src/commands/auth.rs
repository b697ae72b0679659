//! Photographer sign-in commands

use weddingwall_core::services::parse_callback_fragment;
use weddingwall_core::{AppError, CommandError, UserProfile};

use crate::AppState;

/// Where the one-time session id comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginSource {
    SessionId(String),
    /// Redirect URL or fragment containing `session_id=...`
    Callback(String),
}

impl LoginSource {
    pub fn session_id(&self) -> Result<String, CommandError> {
        match self {
            LoginSource::SessionId(id) => Ok(id.trim().to_string()),
            LoginSource::Callback(url) => parse_callback_fragment(url).ok_or_else(|| {
                CommandError::from(AppError::General(
                    "callback URL has no session_id".to_string(),
                ))
            }),
        }
    }
}

pub async fn login(state: &AppState, source: LoginSource) -> Result<UserProfile, CommandError> {
    let session_id = source.session_id()?;
    let core = &state.core;
    core.sessions
        .exchange(&core.client, &session_id)
        .await
        .map_err(CommandError::from)
}

/// Signed-in user, confirmed by the backend.
pub async fn whoami(state: &AppState) -> Result<UserProfile, CommandError> {
    let core = &state.core;
    core.sessions
        .verify(&core.client)
        .await
        .map_err(CommandError::from)
}

pub async fn logout(state: &AppState) -> Result<(), CommandError> {
    let core = &state.core;
    core.sessions
        .logout(&core.client)
        .await
        .map_err(CommandError::from)
}
