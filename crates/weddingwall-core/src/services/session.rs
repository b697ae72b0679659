//! Photographer session handling
//!
//! The identity provider redirects back with `#session_id=...`. That id is
//! exchanged once for a durable session token, which is stored locally and
//! attached to every dashboard call.

use serde::Serialize;
use std::collections::HashMap;

use crate::events::{EventSinkExt, SharedEventSink, SESSION_CHANGED};
use crate::models::UserProfile;
use crate::services::cache::SharedCacheStore;
use crate::services::client::ShowcaseClient;
use crate::utils::error::{AppError, AppResult};

pub const SESSION_TOKEN_KEY: &str = "weddingwall.session_token";
pub const USER_KEY: &str = "weddingwall.user";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionChanged<'a> {
    signed_in: bool,
    user: Option<&'a UserProfile>,
}

/// Extract the one-time session id from a callback URL or its fragment.
pub fn parse_callback_fragment(input: &str) -> Option<String> {
    let fragment = match input.split_once('#') {
        Some((_, fragment)) => fragment,
        None => input,
    };

    let params: HashMap<String, String> = serde_urlencoded::from_str(fragment).ok()?;
    params
        .get("session_id")
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
}

pub struct SessionManager {
    store: SharedCacheStore,
    events: SharedEventSink,
}

impl SessionManager {
    pub fn new(store: SharedCacheStore, events: SharedEventSink) -> Self {
        Self { store, events }
    }

    pub fn token(&self) -> AppResult<Option<String>> {
        self.store.get(SESSION_TOKEN_KEY)
    }

    /// Profile saved at sign-in. An unreadable entry counts as absent.
    pub fn stored_user(&self) -> AppResult<Option<UserProfile>> {
        let Some(raw) = self.store.get(USER_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                tracing::warn!("Ignoring unreadable stored user: {}", e);
                Ok(None)
            }
        }
    }

    /// Exchange a session id, persist the session and attach it to `client`.
    pub async fn exchange(&self, client: &ShowcaseClient, session_id: &str) -> AppResult<UserProfile> {
        let session_id = session_id.trim();
        if session_id.is_empty() {
            return Err(AppError::Unauthorized);
        }

        let exchange = client.exchange_session(session_id).await?;

        self.store.set(SESSION_TOKEN_KEY, &exchange.session_token)?;
        self.store.set(USER_KEY, &serde_json::to_string(&exchange.user)?)?;
        client.set_token(Some(exchange.session_token));

        tracing::info!(user_id = %exchange.user.user_id, "Signed in");
        self.publish(Some(&exchange.user));
        Ok(exchange.user)
    }

    /// Re-attach a stored session to `client` without contacting the backend.
    pub fn restore(&self, client: &ShowcaseClient) -> AppResult<Option<UserProfile>> {
        let Some(token) = self.token()? else {
            return Ok(None);
        };
        client.set_token(Some(token));
        self.stored_user()
    }

    /// Ask the backend who the stored session belongs to.
    ///
    /// A rejected session is removed locally.
    pub async fn verify(&self, client: &ShowcaseClient) -> AppResult<UserProfile> {
        if !client.has_token() {
            self.restore(client)?;
        }
        if !client.has_token() {
            return Err(AppError::Unauthorized);
        }

        match client.current_user().await {
            Ok(user) => {
                self.store.set(USER_KEY, &serde_json::to_string(&user)?)?;
                Ok(user)
            }
            Err(AppError::Unauthorized) => {
                tracing::info!("Stored session rejected, clearing it");
                self.clear(client)?;
                Err(AppError::Unauthorized)
            }
            Err(e) => Err(e),
        }
    }

    /// Sign out. The local session is cleared even if the backend call fails.
    pub async fn logout(&self, client: &ShowcaseClient) -> AppResult<()> {
        if !client.has_token() {
            self.restore(client)?;
        }
        if client.has_token() {
            if let Err(e) = client.logout().await {
                tracing::warn!("Backend logout failed: {}", e);
            }
        }
        self.clear(client)
    }

    fn clear(&self, client: &ShowcaseClient) -> AppResult<()> {
        client.set_token(None);
        self.store.remove(SESSION_TOKEN_KEY)?;
        self.store.remove(USER_KEY)?;
        self.publish(None);
        Ok(())
    }

    fn publish(&self, user: Option<&UserProfile>) {
        self.events.emit_typed(
            SESSION_CHANGED,
            &SessionChanged {
                signed_in: user.is_some(),
                user,
            },
        );
    }
}
