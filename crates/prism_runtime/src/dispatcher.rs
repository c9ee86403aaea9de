//! Opcode routing.
//!
//! The [`Dispatcher`] is the only surface a host talks to: it enumerates the
//! registered extensions' metadata and routes `invoke(opcode, args, ctx)` to the
//! extension owning the opcode. Opcodes are unique across all extensions.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::args::BlockArgs;
use crate::context::ExecutionContext;
use crate::error::{PrismError, Result};
use crate::extensions::Extension;
use crate::registry::{BlockDescriptor, ExtensionInfo};

#[derive(Default)]
pub struct Dispatcher {
    extensions: Vec<Box<dyn Extension>>,
    /// opcode -> index into `extensions`
    routes: HashMap<String, usize>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field(
                "extensions",
                &self.extensions.iter().map(|e| &e.info().id).collect::<Vec<_>>(),
            )
            .field("opcodes", &self.routes.len())
            .finish()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an extension and all of its invokable blocks
    ///
    /// # Errors
    ///
    /// Returns [`PrismError::Config`] if the extension id or one of its opcodes
    /// is already registered. Nothing is registered in that case.
    pub fn register(&mut self, extension: Box<dyn Extension>) -> Result<()> {
        let info = extension.info();
        if self.extensions.iter().any(|e| e.info().id == info.id) {
            return Err(PrismError::Config(format!(
                "Extension \"{}\" is already registered",
                info.id
            )));
        }

        let index = self.extensions.len();
        let mut routes = HashMap::new();
        for opcode in info.opcodes() {
            if self.routes.contains_key(opcode) || routes.contains_key(opcode) {
                return Err(PrismError::Config(format!(
                    "Opcode \"{opcode}\" of extension \"{}\" is already registered",
                    info.id
                )));
            }
            routes.insert(opcode.to_string(), index);
        }

        info!(extension = %info.id, blocks = routes.len(), "Registered extension");
        self.routes.extend(routes);
        self.extensions.push(extension);
        Ok(())
    }

    /// Metadata of every registered extension, in registration order
    pub fn extensions(&self) -> impl Iterator<Item = &ExtensionInfo> {
        self.extensions.iter().map(|e| e.info())
    }

    pub fn extension(&self, id: &str) -> Option<&ExtensionInfo> {
        self.extensions().find(|info| info.id == id)
    }

    pub fn has(&self, opcode: &str) -> bool {
        self.routes.contains_key(opcode)
    }

    pub fn descriptor(&self, opcode: &str) -> Option<&BlockDescriptor> {
        let index = *self.routes.get(opcode)?;
        self.extensions[index].info().block(opcode)
    }

    /// Runs one block.
    ///
    /// Block failures never surface here; they are already folded into the
    /// block's result value. `null` stands for "no value" (commands).
    ///
    /// # Errors
    ///
    /// Returns [`PrismError::UnknownOpcode`] if no registered extension owns `opcode`
    #[instrument(skip(self, args, ctx))]
    pub async fn invoke(&self, opcode: &str, args: &BlockArgs, ctx: &ExecutionContext) -> Result<Value> {
        let index = *self
            .routes
            .get(opcode)
            .ok_or_else(|| PrismError::UnknownOpcode(opcode.to_string()))?;

        debug!(extension = %self.extensions[index].info().id, "Routing block");
        self.extensions[index].invoke(opcode, args, ctx).await
    }

    /// Waits for background work (e.g. costume loads) of every extension
    pub async fn settle(&self) {
        for extension in &self.extensions {
            extension.settle().await;
        }
    }
}
