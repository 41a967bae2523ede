//! Application core: configuration plus the backend collaborators.
//!
//! `AppCore` is long-lived; the surfaces it hands out are not. Each call to
//! [`AppCore::handle_validator`] or [`AppCore::block_list`] mounts a fresh
//! surface whose state dies with it.

use crate::workflows::block_list::BlockList;
use crate::workflows::handle::HandleValidator;
use kite_core::effects::{
    BlockEffects, HandleAvailabilityEffects, PhysicalTimeEffects, RealTimeHandler,
};
use kite_core::{ClientConfig, Result};
use std::sync::Arc;

/// Shared client dependencies.
#[derive(Clone)]
pub struct AppCore {
    config: ClientConfig,
    availability: Arc<dyn HandleAvailabilityEffects>,
    blocks: Arc<dyn BlockEffects>,
    time: Arc<dyn PhysicalTimeEffects>,
}

impl AppCore {
    /// Build a core with the real clock. Fails if `config` does not validate.
    pub fn new(
        config: ClientConfig,
        availability: Arc<dyn HandleAvailabilityEffects>,
        blocks: Arc<dyn BlockEffects>,
    ) -> Result<Self> {
        Self::with_time(config, availability, blocks, Arc::new(RealTimeHandler::new()))
    }

    /// Build a core with an explicit time source.
    pub fn with_time(
        config: ClientConfig,
        availability: Arc<dyn HandleAvailabilityEffects>,
        blocks: Arc<dyn BlockEffects>,
        time: Arc<dyn PhysicalTimeEffects>,
    ) -> Result<Self> {
        config.validate()?;
        tracing::debug!(
            debounce_ms = config.handle.debounce_ms,
            apply_policy = ?config.block_list.apply_policy,
            "app core initialized"
        );
        Ok(Self {
            config,
            availability,
            blocks,
            time,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Mount a handle validator.
    pub fn handle_validator(&self) -> HandleValidator {
        HandleValidator::new(
            Arc::clone(&self.availability),
            Arc::clone(&self.time),
            self.config.handle.clone(),
        )
    }

    /// Mount a block list (empty until [`BlockList::refresh`]).
    pub fn block_list(&self) -> BlockList {
        BlockList::new(Arc::clone(&self.blocks), self.config.block_list.apply_policy)
    }
}

impl std::fmt::Debug for AppCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppCore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
