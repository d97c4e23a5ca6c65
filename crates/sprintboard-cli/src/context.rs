use std::sync::Arc;

use sprintboard_core::EngineConfig;
use sprintboard_domain::RequestContext;
use sprintboard_engine::{LoggingNotifier, SprintEngine};
use sprintboard_persistence::JsonFileStore;
use uuid::Uuid;

pub struct CliContext {
    pub engine: SprintEngine<JsonFileStore>,
    actor: Option<Uuid>,
    locale: Option<String>,
}

impl CliContext {
    pub fn open(file_path: &str, actor: Option<Uuid>, locale: Option<String>) -> Self {
        let config = EngineConfig::load();
        tracing::debug!(
            "Opening {} ({}h days, {}d weeks)",
            file_path,
            config.hours_per_day,
            config.days_per_week
        );
        let engine = SprintEngine::new(
            JsonFileStore::new(file_path),
            Arc::new(LoggingNotifier),
            config,
        );
        Self {
            engine,
            actor,
            locale,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        self.engine.config()
    }

    /// Request context for a mutating operation; requires an actor.
    pub fn request(&self) -> anyhow::Result<RequestContext> {
        let actor = self
            .actor
            .ok_or_else(|| anyhow::anyhow!("--actor is required for this operation"))?;
        let request = self.engine.request(actor);
        Ok(match &self.locale {
            Some(locale) => request.with_locale(locale.clone()),
            None => request,
        })
    }
}
