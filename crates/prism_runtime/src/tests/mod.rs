mod dispatcher;
mod evaluation;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use prism_config::relay::RelayConfig;
use serde_json::Value;

use crate::evaluator::Evaluator;
use crate::host::{Asset, AssetType, Costume, DataFormat};
use crate::memory::{
    MemoryAssetStore, MemoryStage, MemoryTarget, RecordingPrompt, StaticFetcher, StaticRenderer,
};
use crate::{
    BlockArgs, Dispatcher, ExecutionContext, HeadlessAudio, PrismError, PrismExtension,
    PrismServices, RuntimeExtension, RuntimeServices, ScrollAccumulator,
};

const FRAME: &str = "data:image/png;base64,RlJBTUU=";

/// Evaluator answering from a fixed table and recording every source it ran
#[derive(Clone, Default)]
struct ScriptedEvaluator {
    answers: HashMap<String, Result<Value, String>>,
    runs: Arc<Mutex<Vec<String>>>,
}

impl ScriptedEvaluator {
    fn answer(mut self, source: &str, result: Result<Value, String>) -> Self {
        self.answers.insert(source.to_string(), result);
        self
    }

    fn runs(&self) -> Vec<String> {
        self.runs.lock().unwrap().clone()
    }
}

impl Evaluator for ScriptedEvaluator {
    fn execute(&self, source: &str) -> crate::Result<()> {
        self.evaluate(source).map(|_| ())
    }

    fn evaluate(&self, source: &str) -> crate::Result<Value> {
        self.runs.lock().unwrap().push(source.to_string());
        self.answers
            .get(source)
            .cloned()
            .unwrap_or_else(|| Err(format!("ReferenceError: {source} is not defined")))
            .map_err(PrismError::Evaluation)
    }
}

struct Fixture {
    dispatcher: Dispatcher,
    ctx: ExecutionContext,
    target: MemoryTarget,
    audio: HeadlessAudio,
    prompt: Arc<RecordingPrompt>,
    fetcher: StaticFetcher,
    stage: MemoryStage,
    assets: MemoryAssetStore,
    scroll: ScrollAccumulator,
    evaluator: ScriptedEvaluator,
}

struct FixtureBuilder {
    granted: bool,
    fetcher: StaticFetcher,
    evaluator: ScriptedEvaluator,
    target: MemoryTarget,
    relay: RelayConfig,
}

impl FixtureBuilder {
    fn new() -> Self {
        Self {
            granted: true,
            fetcher: StaticFetcher::new(),
            evaluator: ScriptedEvaluator::default(),
            target: MemoryTarget::new("sprite1").with_costumes(vec![
                svg_costume("costume1", "<svg>1</svg>"),
                svg_costume("costume2", "<svg>2</svg>"),
            ]),
            relay: RelayConfig::default(),
        }
    }

    fn granted(mut self, granted: bool) -> Self {
        self.granted = granted;
        self
    }

    fn fetcher(mut self, fetcher: StaticFetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    fn evaluator(mut self, evaluator: ScriptedEvaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    fn target(mut self, target: MemoryTarget) -> Self {
        self.target = target;
        self
    }

    fn build(self) -> Fixture {
        let audio = HeadlessAudio::new();
        let prompt = Arc::new(RecordingPrompt::new(self.granted));
        let stage = MemoryStage::default();
        let assets = MemoryAssetStore::new();
        let scroll = ScrollAccumulator::new();

        let mut dispatcher = Dispatcher::new();
        dispatcher
            .register(Box::new(PrismExtension::new(PrismServices {
                audio: Arc::new(audio.clone()),
                evaluator: Box::new(self.evaluator.clone()),
                prompt: prompt.clone(),
                fetcher: Arc::new(self.fetcher.clone()),
                renderer: Arc::new(StaticRenderer::new(FRAME)),
                relay: self.relay,
                scroll: scroll.clone(),
            })))
            .unwrap();
        dispatcher
            .register(Box::new(RuntimeExtension::new(RuntimeServices {
                fetcher: Arc::new(self.fetcher.clone()),
                assets: Arc::new(assets.clone()),
                stage: Arc::new(stage.clone()),
            })))
            .unwrap();

        Fixture {
            dispatcher,
            ctx: ExecutionContext::new(Arc::new(self.target.clone())),
            target: self.target,
            audio,
            prompt,
            fetcher: self.fetcher,
            stage,
            assets,
            scroll,
            evaluator: self.evaluator,
        }
    }
}

impl Fixture {
    fn new() -> Self {
        FixtureBuilder::new().build()
    }

    async fn run(&self, opcode: &str, args: BlockArgs) -> Value {
        self.dispatcher
            .invoke(opcode, &args, &self.ctx)
            .await
            .unwrap_or_else(|e| panic!("{opcode} failed: {e}"))
    }
}

fn svg_costume(name: &str, svg: &str) -> Costume {
    Costume::new(
        name,
        Asset {
            asset_id: format!("{name}-id"),
            asset_type: AssetType::ImageVector,
            data_format: DataFormat::Svg,
            data: Arc::from(svg.as_bytes()),
        },
    )
}
