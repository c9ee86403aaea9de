use std::sync::Arc;

use async_trait::async_trait;
use prism_config::relay::RelayConfig;
use serde_json::Value;
use tracing::{debug, error, instrument, warn};

use super::Extension;
use crate::args::{BlockArgs, format_number, number_value};
use crate::audio::{AudioDevice, percent_to_unit, unit_to_percent};
use crate::codec;
use crate::context::ExecutionContext;
use crate::error::{PrismError, Result};
use crate::evaluator::{Evaluator, loosely_true, unwrap_json};
use crate::fetch::Fetcher;
use crate::gate::{CapabilityGate, UserPrompt};
use crate::registry::{BlockDescriptor, ExtensionInfo};
use crate::scroll::ScrollAccumulator;
use crate::snapshot::{Renderer, capture};

pub const PRISM_EXTENSION_ID: &str = "jgPrism";

const DEFAULT_AUDIO_URL: &str =
    "https://synthesis-service.scratch.mit.edu/synth?locale=en-US&gender=female&text=hello";

/// Host capabilities the Prism blocks act on
pub struct PrismServices {
    pub audio: Arc<dyn AudioDevice>,
    pub evaluator: Box<dyn Evaluator>,
    pub prompt: Arc<dyn UserPrompt>,
    pub fetcher: Arc<dyn Fetcher>,
    pub renderer: Arc<dyn Renderer>,
    pub relay: RelayConfig,
    pub scroll: ScrollAccumulator,
}

/// Audio, JavaScript, data URI, scroll and codec blocks
pub struct PrismExtension {
    info: ExtensionInfo,
    audio: Arc<dyn AudioDevice>,
    evaluator: Box<dyn Evaluator>,
    gate: CapabilityGate,
    prompt: Arc<dyn UserPrompt>,
    fetcher: Arc<dyn Fetcher>,
    renderer: Arc<dyn Renderer>,
    relay: RelayConfig,
    scroll: ScrollAccumulator,
}

impl std::fmt::Debug for PrismExtension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrismExtension")
            .field("gate", &self.gate)
            .field("relay", &self.relay)
            .field("scroll", &self.scroll.sample())
            .finish_non_exhaustive()
    }
}

impl PrismExtension {
    pub fn new(services: PrismServices) -> Self {
        Self {
            info: prism_info(),
            audio: services.audio,
            evaluator: services.evaluator,
            gate: CapabilityGate::new(services.prompt.clone()),
            prompt: services.prompt,
            fetcher: services.fetcher,
            renderer: services.renderer,
            relay: services.relay,
            scroll: services.scroll,
        }
    }

    fn play_audio_from_url(&self, args: &BlockArgs) {
        let source = self.relay.rewrite(&args.string("URL"));
        self.audio.pause();
        self.audio.set_source(&source);
        self.audio.set_current_time(0.0);
        self.audio.play();
    }

    fn evaluate(&self, args: &BlockArgs) {
        if !self.gate.ensure_granted() {
            return;
        }
        if let Err(e) = self.evaluator.execute(&args.string("JAVASCRIPT")) {
            let description = error_description(e);
            error!(error = %description, "Evaluation failed");
            self.prompt.alert(&description);
        }
    }

    fn evaluate_value(&self, args: &BlockArgs) -> Value {
        if !self.gate.ensure_granted() {
            return Value::from("");
        }
        match self.evaluator.evaluate(&args.string("JAVASCRIPT")) {
            Ok(value) => unwrap_json(value),
            Err(e) => {
                let description = error_description(e);
                error!(error = %description, "Evaluation failed");
                Value::String(description)
            }
        }
    }

    fn evaluate_predicate(&self, args: &BlockArgs) -> bool {
        if !self.gate.ensure_granted() {
            return false;
        }
        match self.evaluator.evaluate(&args.string("JAVASCRIPT")) {
            Ok(value) => loosely_true(&value),
            Err(e) => {
                error!(error = %e, "Evaluation failed");
                false
            }
        }
    }

    fn data_uri_of_costume(args: &BlockArgs, ctx: &ExecutionContext) -> String {
        let Some(index) = args.number("INDEX") else {
            return String::new();
        };
        if index < 1.0 || index.fract() != 0.0 || !index.is_finite() {
            return String::new();
        }

        let position = index as usize - 1;
        ctx.target()
            .costume(position)
            .map(|costume| costume.asset.encode_data_uri())
            .unwrap_or_default()
    }

    async fn data_uri_from_image_url(&self, args: &BlockArgs) -> String {
        let url = self.relay.rewrite(&args.string("URL"));
        match self.fetcher.fetch(&url).await {
            Ok(blob) => blob.data_uri(),
            Err(e) => {
                warn!(error = %e, url = %url, "Could not build data uri from image url");
                String::new()
            }
        }
    }
}

/// Text shown to the project for a failed evaluation
fn error_description(e: PrismError) -> String {
    match e {
        PrismError::Evaluation(description) => description,
        other => other.to_string(),
    }
}

#[async_trait(?Send)]
impl Extension for PrismExtension {
    fn info(&self) -> &ExtensionInfo {
        &self.info
    }

    #[instrument(name = "prism", skip(self, args, ctx), fields(target_id = %ctx.target().id()))]
    async fn invoke(&self, opcode: &str, args: &BlockArgs, ctx: &ExecutionContext) -> Result<Value> {
        let value = match opcode {
            // audio
            "playAudioFromUrl" => {
                self.play_audio_from_url(args);
                Value::Null
            }
            "setAudioToLooping" => {
                self.audio.set_looping(true);
                Value::Null
            }
            "setAudioToNotLooping" => {
                self.audio.set_looping(false);
                Value::Null
            }
            "pauseAudio" => {
                self.audio.pause();
                Value::Null
            }
            "playAudio" => {
                self.audio.play();
                Value::Null
            }
            "setAudioPlaybackSpeed" => {
                self.audio
                    .set_playback_rate(percent_to_unit(args.number_or("SPEED", 100.0)));
                Value::Null
            }
            "getAudioPlaybackSpeed" => number_value(unit_to_percent(self.audio.playback_rate())),
            "setAudioPosition" => {
                self.audio.set_current_time(args.number_or("POSITION", 0.0));
                Value::Null
            }
            "getAudioPosition" => number_value(self.audio.current_time()),
            "setAudioVolume" => {
                self.audio
                    .set_volume(percent_to_unit(args.number_or("VOLUME", 100.0)));
                Value::Null
            }
            "getAudioVolume" => number_value(unit_to_percent(self.audio.volume())),

            // javascript
            "evaluate" => {
                self.evaluate(args);
                Value::Null
            }
            "evaluate2" => self.evaluate_value(args),
            "evaluate3" => Value::Bool(self.evaluate_predicate(args)),

            // data uris
            "screenshotStage" => Value::String(capture(self.renderer.as_ref()).await),
            "dataUriOfCostume" => Value::String(Self::data_uri_of_costume(args, ctx)),
            "dataUriFromImageUrl" => Value::String(self.data_uri_from_image_url(args).await),

            // mouse
            "currentMouseScrollX" => number_value(self.scroll.sample().x),
            "currentMouseScroll" => number_value(self.scroll.sample().y),
            "currentMouseScrollZ" => number_value(self.scroll.sample().z),

            // codecs
            "base64Encode" => Value::String(codec::base64_encode(&args.string("TEXT"))),
            "base64Decode" => Value::String(
                codec::base64_decode(&args.string("TEXT")).unwrap_or_else(|e| {
                    debug!(error = %e, "Decoding invalid base64 as empty text");
                    String::new()
                }),
            ),
            "fromCharacterCodeString" => {
                Value::String(codec::from_char_code(args.number_or("TEXT", 0.0)))
            }
            "toCharacterCodeString" => codec::to_char_code(&args.string("TEXT"))
                .map_or(Value::Null, Value::from),
            "lib_deflate_deflateArray" => Value::String(codec::deflate_array(&args.string("ARRAY"))),
            "lib_deflate_inflateArray" => Value::String(codec::inflate_array(&args.string("ARRAY"))),

            other => return Err(PrismError::UnknownOpcode(other.to_string())),
        };

        debug!(opcode, result = %preview(&value), "Block finished");
        Ok(value)
    }
}

fn preview(value: &Value) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.as_f64().map_or_else(|| n.to_string(), format_number),
        other => other.to_string(),
    };
    if text.chars().count() > 64 {
        format!("{}...", text.chars().take(64).collect::<String>())
    } else {
        text
    }
}

/// Block metadata of the Prism extension
pub fn prism_info() -> ExtensionInfo {
    ExtensionInfo {
        id: PRISM_EXTENSION_ID.into(),
        name: "Prism".into(),
        color1: "#BC7FFF".into(),
        color2: "#AD66FF".into(),
        blocks: vec![
            BlockDescriptor::label("Audio"),
            BlockDescriptor::command("playAudioFromUrl", "play audio from [URL]")
                .string_arg("URL", DEFAULT_AUDIO_URL),
            BlockDescriptor::command("setAudioToLooping", "set audio to loop"),
            BlockDescriptor::command("setAudioToNotLooping", "set audio to not loop"),
            BlockDescriptor::command("pauseAudio", "pause audio"),
            BlockDescriptor::command("playAudio", "resume audio"),
            BlockDescriptor::command("setAudioPlaybackSpeed", "set audio speed to [SPEED]%")
                .number_arg("SPEED", 100),
            BlockDescriptor::reporter("getAudioPlaybackSpeed", "audio speed").disable_monitor(false),
            BlockDescriptor::command("setAudioPosition", "set audio position to [POSITION] seconds")
                .number_arg("POSITION", 5),
            BlockDescriptor::reporter("getAudioPosition", "audio position").disable_monitor(false),
            BlockDescriptor::command("setAudioVolume", "set audio volume to [VOLUME]%")
                .number_arg("VOLUME", 100),
            BlockDescriptor::reporter("getAudioVolume", "audio volume").disable_monitor(false),
            BlockDescriptor::label("JavaScript"),
            BlockDescriptor::command("evaluate", "eval [JAVASCRIPT]")
                .string_arg("JAVASCRIPT", "console.log('Hello!')"),
            BlockDescriptor::reporter("evaluate2", "eval [JAVASCRIPT]")
                .disable_monitor(true)
                .string_arg("JAVASCRIPT", "Math.random()"),
            BlockDescriptor::hat("evaluate3", "eval [JAVASCRIPT]")
                .string_arg("JAVASCRIPT", "Math.round(Math.random()) == 1"),
            BlockDescriptor::label("Data URIs"),
            BlockDescriptor::reporter("screenshotStage", "screenshot the stage").disable_monitor(true),
            BlockDescriptor::reporter("dataUriOfCostume", "data uri of costume #[INDEX]")
                .disable_monitor(true)
                .number_arg("INDEX", "1"),
            BlockDescriptor::reporter("dataUriFromImageUrl", "data uri of image at url: [URL]")
                .disable_monitor(true)
                .string_arg("URL", "url"),
            BlockDescriptor::label("More Mouse Inputs"),
            BlockDescriptor::reporter("currentMouseScrollX", "mouse scroll x").disable_monitor(false),
            BlockDescriptor::reporter("currentMouseScroll", "mouse scroll y").disable_monitor(false),
            BlockDescriptor::reporter("currentMouseScrollZ", "mouse scroll z").disable_monitor(false),
            BlockDescriptor::label("Base64"),
            BlockDescriptor::reporter("base64Encode", "base64 encode [TEXT]")
                .disable_monitor(true)
                .string_arg("TEXT", "abc"),
            BlockDescriptor::reporter("base64Decode", "base64 decode [TEXT]")
                .disable_monitor(true)
                .string_arg("TEXT", "YWJj"),
            BlockDescriptor::label("String Character Codes"),
            BlockDescriptor::reporter("fromCharacterCodeString", "character from character code [TEXT]")
                .disable_monitor(true)
                .number_arg("TEXT", 97),
            BlockDescriptor::reporter("toCharacterCodeString", "character code of [TEXT]")
                .disable_monitor(true)
                .string_arg("TEXT", "a"),
            BlockDescriptor::label("JS Deflate implementation"),
            BlockDescriptor::reporter("lib_deflate_deflateArray", "deflate [ARRAY]")
                .disable_monitor(true)
                .string_arg("ARRAY", "[]"),
            BlockDescriptor::reporter("lib_deflate_inflateArray", "inflate [ARRAY]")
                .disable_monitor(true)
                .string_arg("ARRAY", "[]"),
        ],
    }
}
