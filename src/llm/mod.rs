//! Text-generation providers behind one capability trait.
//!
//! Two adapters (DashScope, OpenRouter) implement [`ModelService`]; the
//! [`FailoverService`] composes a primary and a backup adapter. Which adapter
//! fills which slot is decided by configuration.

mod dashscope;
mod failover;
mod openrouter;
mod provider;
mod types;

use std::sync::Arc;

pub use dashscope::{
    transcript_prompt, DashScopeProvider, DASHSCOPE_API_KEY_ENV, DASHSCOPE_DEFAULT_MODEL,
    DASHSCOPE_ENDPOINT,
};
pub use failover::FailoverService;
pub use openrouter::{
    OpenRouterProvider, OPENROUTER_API_KEY_ENV, OPENROUTER_DEFAULT_MODEL, OPENROUTER_ENDPOINT,
};
pub use provider::{ModelService, ProviderError, ProviderSettings, DEFAULT_PROVIDER_TIMEOUT};
pub use types::{
    ChatMessage, GenerationOptions, InvalidOptions, Role, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE,
    DEFAULT_TOP_P,
};

use crate::config::{Config, ProviderKind};

fn strict_adapter(
    kind: ProviderKind,
    settings: ProviderSettings,
) -> Result<Arc<dyn ModelService>, ProviderError> {
    let adapter: Arc<dyn ModelService> = match kind {
        ProviderKind::Dashscope => Arc::new(DashScopeProvider::new(settings)?),
        ProviderKind::Openrouter => Arc::new(OpenRouterProvider::new(settings)?),
    };
    Ok(adapter)
}

fn deferred_adapter(kind: ProviderKind, settings: ProviderSettings) -> Arc<dyn ModelService> {
    let adapter: Arc<dyn ModelService> = match kind {
        ProviderKind::Dashscope => Arc::new(DashScopeProvider::deferred(settings)),
        ProviderKind::Openrouter => Arc::new(OpenRouterProvider::deferred(settings)),
    };
    adapter
}

/// Build the process-wide failover model service from configuration.
///
/// The backup is always built deferred. A primary without credentials is
/// logged and built deferred as well, so requests fall through to the backup.
pub fn build_model_service(config: &Config) -> FailoverService {
    let primary_kind = config.llm.primary;
    let mut backup_kind = config.llm.backup;
    if backup_kind == primary_kind {
        log::warn!(
            "Backup provider equals primary ({:?}); using {:?} as backup",
            primary_kind,
            primary_kind.other()
        );
        backup_kind = primary_kind.other();
    }

    let primary_settings = config.provider_settings(primary_kind);
    let primary = match strict_adapter(primary_kind, primary_settings.clone()) {
        Ok(adapter) => adapter,
        Err(e) => {
            log::error!("Primary provider unavailable: {}", e);
            deferred_adapter(primary_kind, primary_settings)
        }
    };
    let backup = deferred_adapter(backup_kind, config.provider_settings(backup_kind));

    log::info!(
        "Model service ready: primary={} backup={}",
        primary.name(),
        backup.name()
    );
    FailoverService::new(primary, backup)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_model_service_uses_configured_slots() {
        let mut config = Config::default();
        config.keys.dashscope = Some("sk-test".to_string());
        let service = build_model_service(&config);
        assert_eq!(service.primary().name(), "dashscope");
        assert_eq!(service.backup().name(), "openrouter");
    }

    #[test]
    fn test_build_model_service_without_keys_still_builds() {
        let config = Config::default();
        let service = build_model_service(&config);
        assert_eq!(service.primary().name(), "dashscope");
    }

    #[test]
    fn test_build_model_service_fixes_identical_slots() {
        let mut config = Config::default();
        config.llm.primary = ProviderKind::Openrouter;
        config.llm.backup = ProviderKind::Openrouter;
        let service = build_model_service(&config);
        assert_eq!(service.primary().name(), "openrouter");
        assert_eq!(service.backup().name(), "dashscope");
    }
}
