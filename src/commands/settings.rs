//! Settings commands
//!
//! Client configuration lives in `client.json`; site settings live on the
//! backend and need a signed-in photographer to change.

use weddingwall_core::events::{EventSinkExt, SETTINGS_CHANGED};
use weddingwall_core::models::ResolvedSettings;
use weddingwall_core::{AppResult, ClientConfig, CommandError, ConfigManager, SiteSettings};

use crate::AppState;

fn config_manager(state: &AppState) -> Result<ConfigManager, CommandError> {
    Ok(ConfigManager::new(state.paths().as_ref())?)
}

/// Stored client configuration (without the per-run overrides).
pub fn get_client_config(state: &AppState) -> Result<ClientConfig, CommandError> {
    Ok(config_manager(state)?.load()?)
}

/// Save the client configuration. Applies from the next start.
pub fn save_client_config(state: &AppState, config: ClientConfig) -> Result<(), CommandError> {
    config_manager(state)?.save(&config)?;
    state.core.events().emit_typed(SETTINGS_CHANGED, &config);
    Ok(())
}

pub fn reset_client_config(state: &AppState) -> Result<ClientConfig, CommandError> {
    let config = config_manager(state)?.reset()?;
    state.core.events().emit_typed(SETTINGS_CHANGED, &config);
    Ok(config)
}

/// Site settings with display defaults filled in.
pub async fn get_site_settings(state: &AppState) -> Result<ResolvedSettings, CommandError> {
    let settings = state.core.client.get_settings().await?;
    Ok(settings.resolved())
}

/// Apply `field=value` pairs to a settings value. An empty value clears the field.
pub fn apply_fields(settings: &mut SiteSettings, fields: &[(String, String)]) -> AppResult<()> {
    for (field, value) in fields {
        settings.set_field(field, value)?;
    }
    settings.validate()
}

/// Change some site settings, keeping the others as stored.
pub async fn update_site_settings(
    state: &AppState,
    fields: &[(String, String)],
) -> Result<ResolvedSettings, CommandError> {
    let client = &state.core.client;
    let mut settings = client.get_settings().await?;
    apply_fields(&mut settings, fields)?;
    client.save_settings(&settings).await?;

    let resolved = settings.resolved();
    state.core.events().emit_typed(SETTINGS_CHANGED, &resolved);
    Ok(resolved)
}
