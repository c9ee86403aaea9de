//! # Prism Runtime
//!
//! Block extensions for a Scratch-like VM, expressed as a capability-mediated
//! effect dispatcher.
//!
//! Two extensions are provided:
//!
//! - **`jgPrism`** ([`PrismExtension`]): audio transport, JavaScript evaluation,
//!   data URIs, mouse scroll sampling, base64, character codes and raw DEFLATE.
//! - **`jgRuntime`** ([`RuntimeExtension`]): costume loading and deletion, stage
//!   size, frame rate, turbo mode and clone queries.
//!
//! Handlers never touch ambient state. Everything they act on is a host
//! capability injected at construction ([`AudioDevice`], [`Evaluator`],
//! [`UserPrompt`], [`Fetcher`], [`Renderer`], [`AssetStore`], [`StageSettings`])
//! or reached through the per-invocation [`ExecutionContext`] ([`Target`]).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use prism_config::relay::RelayConfig;
//! use prism_runtime::memory::{MemoryTarget, RecordingPrompt, StaticFetcher, StaticRenderer};
//! use prism_runtime::{
//!     BlockArgs, DenoEvaluator, Dispatcher, ExecutionContext, HeadlessAudio, PrismExtension,
//!     PrismServices, ScrollAccumulator,
//! };
//!
//! # async fn example() -> prism_runtime::Result<()> {
//! let mut dispatcher = Dispatcher::new();
//! dispatcher.register(Box::new(PrismExtension::new(PrismServices {
//!     audio: Arc::new(HeadlessAudio::new()),
//!     evaluator: Box::new(DenoEvaluator::new()),
//!     prompt: Arc::new(RecordingPrompt::new(true)),
//!     fetcher: Arc::new(StaticFetcher::new()),
//!     renderer: Arc::new(StaticRenderer::default()),
//!     relay: RelayConfig::default(),
//!     scroll: ScrollAccumulator::new(),
//! })))?;
//!
//! let ctx = ExecutionContext::new(Arc::new(MemoryTarget::new("sprite1")));
//! let encoded = dispatcher
//!     .invoke("base64Encode", &BlockArgs::new().with("TEXT", "abc"), &ctx)
//!     .await?;
//! assert_eq!(encoded, "YWJj");
//! # Ok(())
//! # }
//! ```
//!
//! ## Failure model
//!
//! Invalid arguments fall back to per-block defaults, a denied permission
//! yields the block's neutral result, network and host failures yield an empty
//! placeholder plus a `tracing` diagnostic. The only error a host sees is
//! [`PrismError::UnknownOpcode`].

pub mod args;
pub mod audio;
pub mod codec;
mod context;
mod dispatcher;
mod error;
pub mod evaluator;
pub mod extensions;
pub mod fetch;
pub mod gate;
pub mod host;
pub mod memory;
pub mod registry;
pub mod scroll;
pub mod snapshot;

#[cfg(test)]
mod tests;

pub use args::BlockArgs;
pub use audio::{AudioDevice, HeadlessAudio};
pub use context::ExecutionContext;
pub use dispatcher::Dispatcher;
pub use error::{PrismError, Result};
pub use evaluator::{DenoEvaluator, Evaluator};
pub use extensions::{Extension, PrismExtension, PrismServices, RuntimeExtension, RuntimeServices};
pub use fetch::{Fetcher, HttpFetcher};
pub use gate::{CapabilityGate, UserPrompt};
pub use host::{AssetStore, StageSettings, Target};
pub use registry::{BlockDescriptor, ExtensionInfo};
pub use scroll::{ScrollAccumulator, ScrollDelta};
pub use snapshot::Renderer;
