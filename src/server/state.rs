//! Shared application state injected into every handler.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::knowledge::{DatasetStore, KnowledgeBase};
use crate::llm::{build_model_service, ModelService};
use crate::video::VideoService;

/// Services built once at startup. Everything behind the `Arc`s is read-only.
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<dyn ModelService>,
    pub video: Arc<VideoService>,
    pub knowledge: Arc<KnowledgeBase>,
    pub datasets: Arc<DatasetStore>,
    pub static_dir: Arc<PathBuf>,
}

impl AppState {
    /// Build every service from configuration. Never fails: missing
    /// credentials or data files degrade the affected endpoints instead.
    pub fn from_config(config: &Config) -> Self {
        let model: Arc<dyn ModelService> = Arc::new(build_model_service(config));
        Self {
            model,
            video: Arc::new(VideoService::from_config(config)),
            knowledge: Arc::new(KnowledgeBase::load(&config.server.knowledge_dir)),
            datasets: Arc::new(DatasetStore::new(
                config.server.knowledge_dir.clone(),
                config.server.battle_cache_dir.clone(),
            )),
            static_dir: Arc::new(config.server.static_dir.clone()),
        }
    }
}
