//! CLI bootstrap - the composition root.
//!
//! The only place where the HTTP adapter and the playback engine are wired
//! together. Handlers receive a [`CliContext`] and talk to the ports.

use std::sync::Arc;

use novelvox_core::{NovelSourcePort, PlayerSettings, SpeechClientPort, validate_settings};
use novelvox_http::{ApiClientConfig, DefaultNovelApiClient};
use novelvox_player::PlayerConfig;

use crate::error::CliError;

/// Fully composed context for CLI commands.
pub struct CliContext {
    /// Novel catalog.
    pub source: Arc<dyn NovelSourcePort>,
    /// Speech synthesis, backed by the same client as the catalog.
    pub speech: Arc<dyn SpeechClientPort>,
    /// Effective reader settings.
    pub settings: PlayerSettings,
}

impl CliContext {
    /// Playback engine configuration derived from the settings.
    pub fn player_config(&self) -> PlayerConfig {
        PlayerConfig::from_settings(&self.settings)
    }
}

/// Validate `settings` and build the backend client.
pub fn bootstrap(settings: PlayerSettings) -> Result<CliContext, CliError> {
    validate_settings(&settings)?;

    let config = ApiClientConfig::new().with_base_url(settings.effective_api_base_url());
    let client = Arc::new(
        DefaultNovelApiClient::new(&config).map_err(|e| CliError::Config(e.to_string()))?,
    );
    tracing::debug!(base_url = config.base_url(), "Backend client ready");

    Ok(CliContext {
        source: Arc::clone(&client) as Arc<dyn NovelSourcePort>,
        speech: client,
        settings,
    })
}
