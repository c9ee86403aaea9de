//! Block extensions.
//!
//! An extension owns a static [`ExtensionInfo`] and the handlers for every
//! invokable block it declares. Handlers never fail towards the host: argument,
//! permission and network failures all map to the block's neutral result.

mod prism;
mod runtime;

pub use prism::{PRISM_EXTENSION_ID, PrismExtension, PrismServices, prism_info};
pub use runtime::{RUNTIME_EXTENSION_ID, RuntimeExtension, RuntimeServices, runtime_info};

use async_trait::async_trait;
use serde_json::Value;

use crate::args::BlockArgs;
use crate::context::ExecutionContext;
use crate::error::Result;
use crate::registry::ExtensionInfo;

/// A set of blocks and their handlers
#[async_trait(?Send)]
pub trait Extension {
    /// Extension-level metadata and block descriptors
    fn info(&self) -> &ExtensionInfo;

    /// Runs the block `opcode`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PrismError::UnknownOpcode`] if this extension does not own `opcode`
    async fn invoke(&self, opcode: &str, args: &BlockArgs, ctx: &ExecutionContext) -> Result<Value>;

    /// Waits for fire-and-forget work started by earlier invocations
    async fn settle(&self) {}
}
