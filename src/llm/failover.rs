//! Primary/backup provider failover.

use std::sync::Arc;

use async_trait::async_trait;

use super::provider::{ModelService, ProviderError};
use super::types::{ChatMessage, GenerationOptions};

/// Composes a primary and a backup model service.
///
/// Every call tries the primary first. On any error the same call is issued
/// once to the backup; if that fails too, both errors are returned in
/// [`ProviderError::Exhausted`]. Nothing is remembered between calls.
#[derive(Clone)]
pub struct FailoverService {
    primary: Arc<dyn ModelService>,
    backup: Arc<dyn ModelService>,
}

impl FailoverService {
    pub fn new(primary: Arc<dyn ModelService>, backup: Arc<dyn ModelService>) -> Self {
        Self { primary, backup }
    }

    pub fn primary(&self) -> &dyn ModelService {
        self.primary.as_ref()
    }

    pub fn backup(&self) -> &dyn ModelService {
        self.backup.as_ref()
    }

    fn exhausted(&self, primary: ProviderError, backup: ProviderError) -> ProviderError {
        log::error!(
            "Backup provider {} failed after primary {} failed: {}",
            self.backup.name(),
            self.primary.name(),
            backup
        );
        ProviderError::Exhausted {
            primary: Box::new(primary),
            backup: Box::new(backup),
        }
    }
}

#[async_trait]
impl ModelService for FailoverService {
    fn name(&self) -> &str {
        "failover"
    }

    async fn generate_text(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, ProviderError> {
        match self.primary.generate_text(prompt, options).await {
            Ok(text) => Ok(text),
            Err(primary_err) => {
                log::warn!(
                    "Primary provider {} failed, switching to backup {}: {}",
                    self.primary.name(),
                    self.backup.name(),
                    primary_err
                );
                self.backup
                    .generate_text(prompt, options)
                    .await
                    .map_err(|backup_err| self.exhausted(primary_err, backup_err))
            }
        }
    }

    async fn chat_completion(
        &self,
        messages: &[ChatMessage],
        options: &GenerationOptions,
    ) -> Result<String, ProviderError> {
        match self.primary.chat_completion(messages, options).await {
            Ok(text) => Ok(text),
            Err(primary_err) => {
                log::warn!(
                    "Primary provider {} failed, switching to backup {}: {}",
                    self.primary.name(),
                    self.backup.name(),
                    primary_err
                );
                self.backup
                    .chat_completion(messages, options)
                    .await
                    .map_err(|backup_err| self.exhausted(primary_err, backup_err))
            }
        }
    }
}
