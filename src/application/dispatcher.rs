use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::application::registry::{Capability, CapabilityRegistry};
use crate::application::services::Workspace;
use crate::domain::DomainError;

/// Text payload returned for every tool call, successful or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub text: String,
    pub is_error: bool,
}

impl ToolOutput {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn failure(err: &DomainError) -> Self {
        Self {
            text: format!("Error: {err}"),
            is_error: true,
        }
    }
}

/// Resolves tool names against the registry and turns every outcome into text.
pub struct Dispatcher {
    registry: CapabilityRegistry,
    workspace: Workspace,
}

impl Dispatcher {
    pub fn new(registry: CapabilityRegistry, workspace: Workspace) -> Self {
        Self {
            registry,
            workspace,
        }
    }

    pub fn capabilities(&self) -> impl Iterator<Item = &Capability> {
        self.registry.iter()
    }

    pub fn dispatch(&self, name: &str, arguments: Option<Map<String, Value>>) -> ToolOutput {
        debug!(target: "fusion::dispatch", tool = name, "dispatching tool call");

        match self.try_dispatch(name, arguments) {
            Ok(text) => ToolOutput::success(text),
            Err(err) => {
                warn!(target: "fusion::dispatch", tool = name, error = %err, "tool call failed");
                ToolOutput::failure(&err)
            }
        }
    }

    fn try_dispatch(
        &self,
        name: &str,
        arguments: Option<Map<String, Value>>,
    ) -> Result<String, DomainError> {
        let capability = self
            .registry
            .get(name)
            .ok_or_else(|| DomainError::UnknownCapability(name.to_string()))?;
        let arguments = Value::Object(arguments.unwrap_or_default());
        capability.invoke(&self.workspace, arguments)
    }
}
