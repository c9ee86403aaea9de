//! Block metadata.
//!
//! Descriptors serialize to the extension-info shape block hosts consume
//! (`opcode`, `blockType`, `text`, `arguments: { NAME: { type, defaultValue } }`),
//! so a host can enumerate and render blocks without compile-time knowledge of them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockType {
    #[serde(rename = "command")]
    Command,
    #[serde(rename = "reporter")]
    Reporter,
    #[serde(rename = "Boolean")]
    Boolean,
    #[serde(rename = "hat")]
    Hat,
    /// Section heading, not invokable
    #[serde(rename = "label")]
    Label,
}

impl BlockType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Command => "command",
            BlockType::Reporter => "reporter",
            BlockType::Boolean => "Boolean",
            BlockType::Hat => "hat",
            BlockType::Label => "label",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgumentType {
    String,
    Number,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgumentInfo {
    #[serde(rename = "type")]
    pub kind: ArgumentType,
    pub default_value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opcode: Option<String>,
    pub block_type: BlockType,
    /// Template text, `[NAME]` marks an argument slot
    pub text: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub arguments: IndexMap<String, ArgumentInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_monitor: Option<bool>,
}

impl BlockDescriptor {
    fn new(opcode: &str, block_type: BlockType, text: &str) -> Self {
        Self {
            opcode: Some(opcode.to_string()),
            block_type,
            text: text.to_string(),
            arguments: IndexMap::new(),
            disable_monitor: None,
        }
    }

    pub fn command(opcode: &str, text: &str) -> Self {
        Self::new(opcode, BlockType::Command, text)
    }

    pub fn reporter(opcode: &str, text: &str) -> Self {
        Self::new(opcode, BlockType::Reporter, text)
    }

    pub fn boolean(opcode: &str, text: &str) -> Self {
        Self::new(opcode, BlockType::Boolean, text)
    }

    pub fn hat(opcode: &str, text: &str) -> Self {
        Self::new(opcode, BlockType::Hat, text)
    }

    pub fn label(text: &str) -> Self {
        Self {
            opcode: None,
            block_type: BlockType::Label,
            text: text.to_string(),
            arguments: IndexMap::new(),
            disable_monitor: None,
        }
    }

    #[must_use]
    pub fn string_arg(mut self, name: &str, default: impl Into<Value>) -> Self {
        self.arguments.insert(
            name.to_string(),
            ArgumentInfo {
                kind: ArgumentType::String,
                default_value: default.into(),
            },
        );
        self
    }

    #[must_use]
    pub fn number_arg(mut self, name: &str, default: impl Into<Value>) -> Self {
        self.arguments.insert(
            name.to_string(),
            ArgumentInfo {
                kind: ArgumentType::Number,
                default_value: default.into(),
            },
        );
        self
    }

    #[must_use]
    pub fn disable_monitor(mut self, disable: bool) -> Self {
        self.disable_monitor = Some(disable);
        self
    }

    pub fn is_invokable(&self) -> bool {
        self.opcode.is_some() && self.block_type != BlockType::Label
    }

    /// Argument names referenced by `[NAME]` slots of the text, in order
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names = vec![];
        let mut rest = self.text.as_str();
        while let Some(start) = rest.find('[') {
            let after = &rest[start + 1..];
            let Some(end) = after.find(']') else {
                break;
            };
            names.push(&after[..end]);
            rest = &after[end + 1..];
        }
        names
    }

    /// Argument record holding every declared default
    pub fn default_args(&self) -> crate::BlockArgs {
        let mut args = crate::BlockArgs::new();
        for (name, info) in &self.arguments {
            args.insert(name, info.default_value.clone());
        }
        args
    }
}

/// Extension-level metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionInfo {
    pub id: String,
    pub name: String,
    pub color1: String,
    pub color2: String,
    pub blocks: Vec<BlockDescriptor>,
}

impl ExtensionInfo {
    pub fn block(&self, opcode: &str) -> Option<&BlockDescriptor> {
        self.blocks
            .iter()
            .find(|b| b.opcode.as_deref() == Some(opcode))
    }

    /// Opcodes of all invokable blocks, in declaration order
    pub fn opcodes(&self) -> impl Iterator<Item = &str> {
        self.blocks
            .iter()
            .filter(|b| b.is_invokable())
            .filter_map(|b| b.opcode.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_descriptor_serializes_to_extension_shape() {
        let block = BlockDescriptor::command("setStageSize", "set stage width: [WIDTH] height: [HEIGHT]")
            .number_arg("WIDTH", 480)
            .number_arg("HEIGHT", 360);

        assert_eq!(
            json!(block),
            json!({
                "opcode": "setStageSize",
                "blockType": "command",
                "text": "set stage width: [WIDTH] height: [HEIGHT]",
                "arguments": {
                    "WIDTH": { "type": "number", "defaultValue": 480 },
                    "HEIGHT": { "type": "number", "defaultValue": 360 }
                }
            })
        );
    }

    #[test]
    fn test_label_has_no_opcode() {
        let label = BlockDescriptor::label("Audio");
        assert!(!label.is_invokable());
        assert_eq!(json!(label), json!({ "blockType": "label", "text": "Audio" }));
    }

    #[test]
    fn test_boolean_block_type_casing() {
        let block = BlockDescriptor::boolean("getIsClone", "is clone?").disable_monitor(true);
        let value = json!(block);
        assert_eq!(value["blockType"], "Boolean");
        assert_eq!(value["disableMonitor"], true);
    }

    #[test]
    fn test_placeholders() {
        let block = BlockDescriptor::command("addCostumeUrl", "add costume [name] from [URL]");
        assert_eq!(block.placeholders(), vec!["name", "URL"]);

        let unterminated = BlockDescriptor::reporter("x", "broken [ARG");
        assert!(unterminated.placeholders().is_empty());
    }

    #[test]
    fn test_default_args() {
        let block = BlockDescriptor::reporter("base64Encode", "base64 encode [TEXT]")
            .string_arg("TEXT", "abc");
        assert_eq!(block.default_args().string("TEXT"), "abc");
    }
}
