use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use prism_config::Config;
use prism_runtime::memory::{MemoryAssetStore, MemoryStage, MemoryTarget, StaticRenderer};
use prism_runtime::{
    DenoEvaluator, Dispatcher, ExecutionContext, HeadlessAudio, HttpFetcher, PrismExtension,
    PrismServices, RuntimeExtension, RuntimeServices, ScrollAccumulator, UserPrompt,
};
use tokio::task::JoinHandle;
use tracing::log::debug;

/// A stage with a single sprite, no audio output and no renderer.
///
/// There is no input device either: nothing feeds the scroll accumulator, so the
/// `currentMouseScroll*` reporters always read 0. Only its reset timer runs.
pub(crate) struct HeadlessHost {
    pub(crate) dispatcher: Dispatcher,
    pub(crate) ctx: ExecutionContext,
    scroll_timer: JoinHandle<()>,
}

impl HeadlessHost {
    /// Builds both extensions on top of in-memory host services.
    ///
    /// Must be called from within a tokio runtime.
    pub(crate) fn new(cfg: &Config, prompt: Arc<dyn UserPrompt>) -> Result<Self> {
        let fetcher = Arc::new(HttpFetcher::new(&cfg.fetch)?);
        let scroll = ScrollAccumulator::new();
        let scroll_timer =
            scroll.spawn_reset_timer(Duration::from_millis(cfg.scroll.reset_interval_ms));

        let mut dispatcher = Dispatcher::new();
        dispatcher.register(Box::new(PrismExtension::new(PrismServices {
            audio: Arc::new(HeadlessAudio::new()),
            evaluator: Box::new(DenoEvaluator::new()),
            prompt,
            fetcher: fetcher.clone(),
            renderer: Arc::new(StaticRenderer::default()),
            relay: cfg.relay.clone(),
            scroll,
        })))?;
        dispatcher.register(Box::new(RuntimeExtension::new(RuntimeServices {
            fetcher,
            assets: Arc::new(MemoryAssetStore::new()),
            stage: Arc::new(MemoryStage::new(&cfg.stage)),
        })))?;

        debug!("Headless host ready for {}", cfg.name);
        Ok(Self {
            dispatcher,
            ctx: ExecutionContext::new(Arc::new(MemoryTarget::new("sprite1"))),
            scroll_timer,
        })
    }
}

impl Drop for HeadlessHost {
    fn drop(&mut self) {
        self.scroll_timer.abort();
    }
}
