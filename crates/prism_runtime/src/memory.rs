//! In-memory host implementations.
//!
//! These back the headless CLI host and the tests: a sprite with a costume
//! list, an asset store, stage settings, a renderer answering with a fixed
//! frame, a prompt with a preset answer and a fetcher serving canned responses.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use prism_config::stage::StageConfig;
use tracing::debug;

use crate::error::{PrismError, Result};
use crate::fetch::{FetchedBlob, Fetcher};
use crate::gate::UserPrompt;
use crate::host::{Asset, AssetStore, AssetType, Costume, DataFormat, StageSettings, Target};
use crate::snapshot::{Renderer, SnapshotCallback};

/// 1x1 transparent PNG
pub const BLANK_FRAME: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

#[derive(Debug)]
struct SpriteState {
    costumes: Vec<Costume>,
    current: usize,
}

/// A sprite (or clone) holding its costumes in memory
#[derive(Debug, Clone)]
pub struct MemoryTarget {
    id: String,
    original: bool,
    state: Arc<RwLock<SpriteState>>,
}

impl MemoryTarget {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            original: true,
            state: Arc::new(RwLock::new(SpriteState {
                costumes: vec![],
                current: 0,
            })),
        }
    }

    /// # Panics
    ///
    /// Panics if the internal lock is poisoned
    #[must_use]
    pub fn with_costumes(self, costumes: Vec<Costume>) -> Self {
        self.state.write().unwrap().costumes = costumes;
        self
    }

    /// A clone sharing nothing but the costume list contents
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned
    pub fn make_clone(&self, id: &str) -> Self {
        let state = self.state.read().unwrap();
        Self {
            id: id.to_string(),
            original: false,
            state: Arc::new(RwLock::new(SpriteState {
                costumes: state.costumes.clone(),
                current: state.current,
            })),
        }
    }

    /// # Panics
    ///
    /// Panics if the internal lock is poisoned
    pub fn costume_names(&self) -> Vec<String> {
        self.state
            .read()
            .unwrap()
            .costumes
            .iter()
            .map(|c| c.name.clone())
            .collect()
    }

    /// # Panics
    ///
    /// Panics if the internal lock is poisoned
    pub fn current_costume(&self) -> usize {
        self.state.read().unwrap().current
    }

    /// # Panics
    ///
    /// Panics if the internal lock is poisoned
    pub fn set_current_costume(&self, index: usize) {
        let mut state = self.state.write().unwrap();
        if index < state.costumes.len() {
            state.current = index;
        }
    }
}

impl Target for MemoryTarget {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn is_original(&self) -> bool {
        self.original
    }

    fn costume_count(&self) -> usize {
        self.state.read().unwrap().costumes.len()
    }

    fn costume(&self, index: usize) -> Option<Costume> {
        self.state.read().unwrap().costumes.get(index).cloned()
    }

    fn add_costume(&self, costume: Costume) {
        debug!(target_id = %self.id, costume = %costume.name, "Adding costume");
        self.state.write().unwrap().costumes.push(costume);
    }

    fn delete_costume(&self, index: usize) {
        let mut state = self.state.write().unwrap();
        let count = state.costumes.len();
        if count == 1 || index >= count {
            debug!(target_id = %self.id, index, count, "Refusing to delete costume");
            return;
        }

        state.costumes.remove(index);
        if index < state.current || (index == state.current && index == count - 1) {
            state.current -= 1;
        }
    }
}

/// Asset store keeping every created asset
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetStore {
    assets: Arc<RwLock<Vec<Asset>>>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Panics
    ///
    /// Panics if the internal lock is poisoned
    pub fn assets(&self) -> Vec<Asset> {
        self.assets.read().unwrap().clone()
    }
}

impl AssetStore for MemoryAssetStore {
    fn create_asset(&self, asset_type: AssetType, data_format: DataFormat, data: Vec<u8>) -> Asset {
        let asset = Asset {
            asset_id: uuid::Uuid::new_v4().simple().to_string(),
            asset_type,
            data_format,
            data: Arc::from(data),
        };
        self.assets.write().unwrap().push(asset.clone());
        asset
    }
}

#[derive(Debug)]
struct StageState {
    width: f64,
    height: f64,
    framerate: f64,
    turbo: bool,
    clones: usize,
}

/// Stage settings held in memory
#[derive(Debug, Clone)]
pub struct MemoryStage {
    state: Arc<RwLock<StageState>>,
}

impl MemoryStage {
    pub fn new(cfg: &StageConfig) -> Self {
        Self {
            state: Arc::new(RwLock::new(StageState {
                width: cfg.width,
                height: cfg.height,
                framerate: cfg.framerate,
                turbo: cfg.turbo,
                clones: 0,
            })),
        }
    }

    /// # Panics
    ///
    /// Panics if the internal lock is poisoned
    pub fn set_clone_count(&self, clones: usize) {
        self.state.write().unwrap().clones = clones;
    }
}

impl Default for MemoryStage {
    fn default() -> Self {
        Self::new(&StageConfig::default())
    }
}

impl StageSettings for MemoryStage {
    fn set_stage_size(&self, width: f64, height: f64) {
        let mut state = self.state.write().unwrap();
        state.width = width;
        state.height = height;
    }

    fn stage_width(&self) -> f64 {
        self.state.read().unwrap().width
    }

    fn stage_height(&self) -> f64 {
        self.state.read().unwrap().height
    }

    fn set_framerate(&self, framerate: f64) {
        self.state.write().unwrap().framerate = framerate;
    }

    fn framerate(&self) -> f64 {
        self.state.read().unwrap().framerate
    }

    fn turbo_mode(&self) -> bool {
        self.state.read().unwrap().turbo
    }

    fn clone_count(&self) -> usize {
        self.state.read().unwrap().clones
    }
}

/// Renderer answering every snapshot request immediately with the same frame
#[derive(Debug, Clone)]
pub struct StaticRenderer {
    frame: String,
}

impl StaticRenderer {
    pub fn new(frame: &str) -> Self {
        Self {
            frame: frame.to_string(),
        }
    }
}

impl Default for StaticRenderer {
    fn default() -> Self {
        Self::new(BLANK_FRAME)
    }
}

impl Renderer for StaticRenderer {
    fn request_snapshot(&self, callback: SnapshotCallback) {
        callback(self.frame.clone());
    }
}

/// Prompt with a preset answer, recording what it was asked
#[derive(Debug, Default)]
pub struct RecordingPrompt {
    answer: RwLock<bool>,
    questions: RwLock<Vec<String>>,
    alerts: RwLock<Vec<String>>,
    confirms: AtomicUsize,
}

impl RecordingPrompt {
    pub fn new(answer: bool) -> Self {
        Self {
            answer: RwLock::new(answer),
            ..Self::default()
        }
    }

    /// # Panics
    ///
    /// Panics if the internal lock is poisoned
    pub fn set_answer(&self, answer: bool) {
        *self.answer.write().unwrap() = answer;
    }

    pub fn confirm_count(&self) -> usize {
        self.confirms.load(Ordering::SeqCst)
    }

    /// # Panics
    ///
    /// Panics if the internal lock is poisoned
    pub fn questions(&self) -> Vec<String> {
        self.questions.read().unwrap().clone()
    }

    /// # Panics
    ///
    /// Panics if the internal lock is poisoned
    pub fn alerts(&self) -> Vec<String> {
        self.alerts.read().unwrap().clone()
    }
}

impl UserPrompt for RecordingPrompt {
    fn confirm(&self, message: &str) -> bool {
        self.confirms.fetch_add(1, Ordering::SeqCst);
        self.questions.write().unwrap().push(message.to_string());
        *self.answer.read().unwrap()
    }

    fn alert(&self, message: &str) {
        self.alerts.write().unwrap().push(message.to_string());
    }
}

/// Fetcher serving canned responses; unknown URLs fail like an unreachable host
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    responses: Arc<RwLock<HashMap<String, FetchedBlob>>>,
    requests: Arc<RwLock<Vec<String>>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Panics
    ///
    /// Panics if the internal lock is poisoned
    #[must_use]
    pub fn with_response(self, url: &str, bytes: &[u8], mime: Option<&str>) -> Self {
        self.responses
            .write()
            .unwrap()
            .insert(url.to_string(), FetchedBlob::new(bytes.to_vec(), mime));
        self
    }

    /// Every URL requested so far, in order
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned
    pub fn requests(&self) -> Vec<String> {
        self.requests.read().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedBlob> {
        self.requests.write().unwrap().push(url.to_string());
        self.responses
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| PrismError::Fetch(format!("No route to {url}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn costume(name: &str) -> Costume {
        Costume::new(
            name,
            Asset {
                asset_id: name.into(),
                asset_type: AssetType::ImageVector,
                data_format: DataFormat::Svg,
                data: Arc::from(&b"<svg/>"[..]),
            },
        )
    }

    fn sprite(names: &[&str]) -> MemoryTarget {
        MemoryTarget::new("sprite1").with_costumes(names.iter().map(|n| costume(n)).collect())
    }

    #[test]
    fn test_delete_only_costume_is_refused() {
        let target = sprite(&["a"]);
        target.delete_costume(0);
        assert_eq!(target.costume_names(), vec!["a"]);
    }

    #[test]
    fn test_delete_out_of_range_is_ignored() {
        let target = sprite(&["a", "b"]);
        target.delete_costume(5);
        assert_eq!(target.costume_count(), 2);
    }

    #[test]
    fn test_delete_current_last_costume_moves_back() {
        let target = sprite(&["a", "b", "c"]);
        target.set_current_costume(2);
        target.delete_costume(2);
        assert_eq!(target.costume_names(), vec!["a", "b"]);
        assert_eq!(target.current_costume(), 1);
    }

    #[test]
    fn test_delete_before_current_shifts_current() {
        let target = sprite(&["a", "b", "c"]);
        target.set_current_costume(2);
        target.delete_costume(0);
        assert_eq!(target.costume_names(), vec!["b", "c"]);
        assert_eq!(target.current_costume(), 1);
    }

    #[test]
    fn test_clone_is_not_original() {
        let target = sprite(&["a"]);
        let clone = target.make_clone("sprite1-clone");
        assert!(target.is_original());
        assert!(!clone.is_original());
        assert_eq!(clone.costume_count(), 1);
    }

    #[test]
    fn test_asset_store_assigns_ids() {
        let store = MemoryAssetStore::new();
        let a = store.create_asset(AssetType::ImageBitmap, DataFormat::Png, vec![1]);
        let b = store.create_asset(AssetType::ImageBitmap, DataFormat::Png, vec![2]);
        assert_ne!(a.asset_id, b.asset_id);
        assert_eq!(a.asset_id.len(), 32);
        assert_eq!(store.assets().len(), 2);
    }
}
