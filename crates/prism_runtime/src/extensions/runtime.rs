use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use super::Extension;
use crate::args::{BlockArgs, number_value};
use crate::context::ExecutionContext;
use crate::error::{PrismError, Result};
use crate::fetch::Fetcher;
use crate::host::{AssetStore, Costume, DataFormat, StageSettings, Target};
use crate::registry::{BlockDescriptor, ExtensionInfo};

pub const RUNTIME_EXTENSION_ID: &str = "jgRuntime";

const DEFAULT_COSTUME_URL: &str =
    "https://penguinmod.github.io/PenguinMod-Gui/static/assets/9525874be2b1d66bd448bf53400011a9.svg";

/// Host capabilities the Runtime blocks act on
#[derive(Clone)]
pub struct RuntimeServices {
    pub fetcher: Arc<dyn Fetcher>,
    pub assets: Arc<dyn AssetStore>,
    pub stage: Arc<dyn StageSettings>,
}

/// Costume and stage configuration blocks
pub struct RuntimeExtension {
    info: ExtensionInfo,
    services: RuntimeServices,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl std::fmt::Debug for RuntimeExtension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeExtension")
            .field("id", &self.info.id)
            .finish_non_exhaustive()
    }
}

impl RuntimeExtension {
    pub fn new(services: RuntimeServices) -> Self {
        Self {
            info: runtime_info(),
            services,
            pending: Mutex::new(vec![]),
        }
    }

    /// Starts loading a costume in the background and returns immediately
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned
    fn add_costume_url(&self, args: &BlockArgs, ctx: &ExecutionContext) {
        let name = args.string("name");
        let url = args.string("URL");
        let fetcher = self.services.fetcher.clone();
        let assets = self.services.assets.clone();
        let target = ctx.target().clone();

        let handle = tokio::spawn(async move {
            if let Err(e) = load_costume(fetcher, assets, target, &name, &url).await {
                error!(error = %e, url = %url, "Failed to Load Costume");
            }
        });

        let mut pending = self.pending.lock().unwrap();
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }

    fn delete_costume(args: &BlockArgs, ctx: &ExecutionContext) {
        let index = args.number("COSTUME").unwrap_or(1.0).trunc() - 1.0;
        if index.is_nan() || index < 0.0 {
            debug!(index, "Ignoring costume deletion below index 1");
            return;
        }

        let index = index as usize;
        ctx.target().delete_costume(index);
    }

    fn set_stage_size(&self, args: &BlockArgs) {
        let width = positive_or_one(args.number_or("WIDTH", 480.0));
        let height = positive_or_one(args.number_or("HEIGHT", 360.0));
        info!(width, height, "Setting stage size");
        self.services.stage.set_stage_size(width, height);
    }

    fn set_max_frame_rate(&self, args: &BlockArgs) {
        let framerate = positive_or_one(args.number_or("FRAMERATE", 1.0));
        self.services.stage.set_framerate(framerate);
    }
}

async fn load_costume(
    fetcher: Arc<dyn Fetcher>,
    assets: Arc<dyn AssetStore>,
    target: Arc<dyn Target>,
    name: &str,
    url: &str,
) -> Result<()> {
    let blob = fetcher.fetch(url).await?;
    let mime = blob.mime_or_default().to_string();
    let (asset_type, data_format) =
        DataFormat::for_image_mime(&mime).ok_or(PrismError::UnsupportedMime(mime))?;

    let asset = assets.create_asset(asset_type, data_format, blob.bytes);
    let costume = Costume::new(name, asset);
    debug!(target_id = %target.id(), md5ext = %costume.md5ext, "Loaded costume");
    target.add_costume(costume);
    Ok(())
}

fn positive_or_one(value: f64) -> f64 {
    if value > 0.0 { value } else { 1.0 }
}

#[async_trait(?Send)]
impl Extension for RuntimeExtension {
    fn info(&self) -> &ExtensionInfo {
        &self.info
    }

    #[instrument(name = "runtime", skip(self, args, ctx), fields(target_id = %ctx.target().id()))]
    async fn invoke(&self, opcode: &str, args: &BlockArgs, ctx: &ExecutionContext) -> Result<Value> {
        let stage = &self.services.stage;
        Ok(match opcode {
            "addCostumeUrl" => {
                self.add_costume_url(args, ctx);
                Value::Null
            }
            "deleteCostume" => {
                Self::delete_costume(args, ctx);
                Value::Null
            }
            "setStageSize" => {
                self.set_stage_size(args);
                Value::Null
            }
            "setMaxFrameRate" => {
                self.set_max_frame_rate(args);
                Value::Null
            }
            "turboModeEnabled" => Value::Bool(stage.turbo_mode()),
            "amountOfClones" => Value::from(stage.clone_count()),
            "getStageWidth" => number_value(stage.stage_width()),
            "getStageHeight" => number_value(stage.stage_height()),
            "getMaxFrameRate" => number_value(stage.framerate()),
            "getIsClone" => Value::Bool(!ctx.target().is_original()),
            other => return Err(PrismError::UnknownOpcode(other.to_string())),
        })
    }

    async fn settle(&self) {
        let handles = std::mem::take(&mut *self.pending.lock().unwrap());
        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "Costume load task failed");
            }
        }
    }
}

/// Block metadata of the Runtime extension
pub fn runtime_info() -> ExtensionInfo {
    ExtensionInfo {
        id: RUNTIME_EXTENSION_ID.into(),
        name: "Runtime".into(),
        color1: "#777777".into(),
        color2: "#555555".into(),
        blocks: vec![
            BlockDescriptor::command("addCostumeUrl", "add costume [name] from [URL]")
                .string_arg("URL", DEFAULT_COSTUME_URL)
                .string_arg("name", "blue flag"),
            BlockDescriptor::command("deleteCostume", "delete costume at index [COSTUME]")
                .number_arg("COSTUME", 1),
            BlockDescriptor::command("setStageSize", "set stage width: [WIDTH] height: [HEIGHT]")
                .number_arg("WIDTH", 480)
                .number_arg("HEIGHT", 360),
            BlockDescriptor::boolean("turboModeEnabled", "turbo mode enabled?").disable_monitor(false),
            BlockDescriptor::reporter("amountOfClones", "clone count").disable_monitor(false),
            BlockDescriptor::reporter("getStageWidth", "stage width").disable_monitor(false),
            BlockDescriptor::reporter("getStageHeight", "stage height").disable_monitor(false),
            BlockDescriptor::command("setMaxFrameRate", "set max framerate to: [FRAMERATE]")
                .number_arg("FRAMERATE", 30),
            BlockDescriptor::reporter("getMaxFrameRate", "max framerate").disable_monitor(false),
            BlockDescriptor::boolean("getIsClone", "is clone?").disable_monitor(true),
        ],
    }
}
