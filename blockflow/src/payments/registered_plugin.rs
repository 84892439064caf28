//! Reports the payments plugin to the registered plugins pipeline.

use super::constants::{PAYMENTS_PLUGIN_NAME, REGISTERED_PLUGIN_BLOCK};
use super::models::RegisteredPluginModel;
use crate::blocks::PipelineBlock;
use crate::context::PipelineExecutionContext;
use crate::errors::BlockError;
use async_trait::async_trait;

/// Adds this plugin to the list of registered plugins, once.
#[derive(Debug, Clone)]
pub struct RegisteredPluginBlock {
    plugin_name: String,
}

impl Default for RegisteredPluginBlock {
    fn default() -> Self {
        Self::new(PAYMENTS_PLUGIN_NAME)
    }
}

impl RegisteredPluginBlock {
    /// Creates a block registering `plugin_name`.
    #[must_use]
    pub fn new(plugin_name: impl Into<String>) -> Self {
        Self {
            plugin_name: plugin_name.into(),
        }
    }
}

#[async_trait]
impl PipelineBlock<Vec<RegisteredPluginModel>> for RegisteredPluginBlock {
    fn name(&self) -> &str {
        REGISTERED_PLUGIN_BLOCK
    }

    async fn run(
        &self,
        mut plugins: Vec<RegisteredPluginModel>,
        _ctx: &mut PipelineExecutionContext,
    ) -> Result<Vec<RegisteredPluginModel>, BlockError> {
        if !plugins.iter().any(|p| p.name == self.plugin_name) {
            plugins.push(RegisteredPluginModel::new(&self.plugin_name, REGISTERED_PLUGIN_BLOCK));
        }
        Ok(plugins)
    }
}
