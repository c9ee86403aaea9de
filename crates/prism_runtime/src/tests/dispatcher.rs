use std::sync::Arc;

use serde_json::json;

use super::Fixture;
use crate::extensions::{PRISM_EXTENSION_ID, RUNTIME_EXTENSION_ID, runtime_info};
use crate::memory::{MemoryAssetStore, MemoryStage, StaticFetcher};
use crate::registry::BlockType;
use crate::{BlockArgs, PrismError, RuntimeExtension, RuntimeServices};

fn runtime_extension() -> RuntimeExtension {
    RuntimeExtension::new(RuntimeServices {
        fetcher: Arc::new(StaticFetcher::new()),
        assets: Arc::new(MemoryAssetStore::new()),
        stage: Arc::new(MemoryStage::default()),
    })
}

#[tokio::test]
async fn test_unknown_opcode_is_an_error() {
    let fx = Fixture::new();
    let err = fx
        .dispatcher
        .invoke("doesNotExist", &BlockArgs::new(), &fx.ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, PrismError::UnknownOpcode(ref op) if op == "doesNotExist"));

    // labels are not invokable
    assert!(!fx.dispatcher.has("Audio"));
}

#[test]
fn test_duplicate_registration_is_rejected() {
    let mut fx = Fixture::new();
    let err = fx
        .dispatcher
        .register(Box::new(runtime_extension()))
        .unwrap_err();
    assert!(matches!(err, PrismError::Config(_)));
    assert_eq!(fx.dispatcher.extensions().count(), 2);
}

#[test]
fn test_extension_metadata() {
    let fx = Fixture::new();
    let ids: Vec<_> = fx.dispatcher.extensions().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec![PRISM_EXTENSION_ID, RUNTIME_EXTENSION_ID]);

    let prism = fx.dispatcher.extension(PRISM_EXTENSION_ID).unwrap();
    assert_eq!(prism.name, "Prism");
    assert_eq!((prism.color1.as_str(), prism.color2.as_str()), ("#BC7FFF", "#AD66FF"));
    let labels: Vec<_> = prism
        .blocks
        .iter()
        .filter(|b| b.block_type == BlockType::Label)
        .map(|b| b.text.as_str())
        .collect();
    assert_eq!(
        labels,
        vec![
            "Audio",
            "JavaScript",
            "Data URIs",
            "More Mouse Inputs",
            "Base64",
            "String Character Codes",
            "JS Deflate implementation"
        ]
    );

    let runtime = json!(runtime_info());
    assert_eq!(runtime["id"], "jgRuntime");
    assert_eq!(runtime["color1"], "#777777");
    assert_eq!(runtime["blocks"][0]["opcode"], "addCostumeUrl");
    assert_eq!(runtime["blocks"][0]["arguments"]["name"]["defaultValue"], "blue flag");
}

#[test]
fn test_descriptors_match_their_placeholders() {
    let fx = Fixture::new();
    for info in fx.dispatcher.extensions() {
        for block in info.blocks.iter().filter(|b| b.is_invokable()) {
            let mut placeholders = block.placeholders();
            placeholders.sort_unstable();
            let mut arguments: Vec<_> = block.arguments.keys().map(String::as_str).collect();
            arguments.sort_unstable();
            assert_eq!(placeholders, arguments, "{}", block.text);
        }
    }
}

#[test]
fn test_descriptor_lookup() {
    let fx = Fixture::new();
    let block = fx.dispatcher.descriptor("evaluate3").unwrap();
    assert_eq!(block.block_type, BlockType::Hat);
    assert_eq!(
        block.arguments["JAVASCRIPT"].default_value,
        json!("Math.round(Math.random()) == 1")
    );
    assert!(fx.dispatcher.descriptor("nope").is_none());
}

#[tokio::test]
async fn test_every_block_runs_with_its_defaults() {
    let fx = Fixture::new();
    let blocks: Vec<_> = fx
        .dispatcher
        .extensions()
        .flat_map(|info| info.blocks.iter().filter(|b| b.is_invokable()).cloned())
        .collect();
    assert_eq!(blocks.len(), 36);

    for block in blocks {
        let opcode = block.opcode.as_deref().unwrap();
        let result = fx.dispatcher.invoke(opcode, &block.default_args(), &fx.ctx).await;
        assert!(result.is_ok(), "{opcode}: {result:?}");
    }
    fx.dispatcher.settle().await;
}
