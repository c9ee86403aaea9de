use anyhow::Result;
use clap::Parser;
use prism_runtime::registry::{BlockDescriptor, BlockType};
use prism_runtime::{Dispatcher, ExtensionInfo};
use tabled::{
    builder::Builder,
    settings::{Color, Style, object::Rows},
};
use tracing::log::info;

use crate::utils::styles::{fmt_accent, fmt_bold, fmt_dimmed};

#[derive(Debug, Clone, Parser)]
pub struct BlocksCmd {
    /// Only list the blocks of this extension (e.g. `jgPrism`)
    #[arg(long, short = 'e')]
    pub extension: Option<String>,

    /// Print the extension metadata as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl BlocksCmd {
    pub(crate) fn handle(&self, dispatcher: &Dispatcher) -> Result<()> {
        let extensions: Vec<&ExtensionInfo> = dispatcher
            .extensions()
            .filter(|info| self.extension.as_ref().is_none_or(|id| &info.id == id))
            .collect();

        if let Some(id) = &self.extension
            && extensions.is_empty()
        {
            anyhow::bail!("Unknown extension \"{id}\"");
        }

        if self.json {
            println!("{}", serde_json::to_string_pretty(&extensions)?);
            return Ok(());
        }

        for info in extensions {
            info!(
                "{} {}",
                fmt_bold(&info.name),
                fmt_dimmed(&format!("({}, {} / {})", info.id, info.color1, info.color2))
            );
            println!("{}\n", render_table(&info.blocks));
        }

        Ok(())
    }
}

fn render_table(blocks: &[BlockDescriptor]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Opcode", "Type", "Text", "Arguments"]);

    for block in blocks {
        let Some(opcode) = &block.opcode else {
            // section label
            builder.push_record([String::new(), String::new(), fmt_bold(&block.text), String::new()]);
            continue;
        };

        let arguments = block
            .arguments
            .iter()
            .map(|(name, arg)| format!("{name}={}", arg.default_value))
            .collect::<Vec<_>>()
            .join(", ");
        let kind = match block.block_type {
            BlockType::Label => String::new(),
            other => other.as_str().to_string(),
        };
        builder.push_record([fmt_accent(opcode), kind, block.text.clone(), fmt_dimmed(&arguments)]);
    }

    builder
        .build()
        .with(Style::rounded())
        .modify(Rows::first(), Color::BOLD)
        .to_string()
}
