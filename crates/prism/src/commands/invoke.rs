use anyhow::Result;
use clap::Parser;
use prism_runtime::BlockArgs;
use serde_json::Value;
use tracing::log::info;

use crate::host::HeadlessHost;
use crate::utils::styles::{fmt_bold, fmt_success};

#[derive(Debug, Clone, Parser)]
pub struct InvokeCmd {
    /// Opcode of the block to run
    pub opcode: String,

    /// Block argument as NAME=VALUE, VALUE is read as JSON when it parses and as text otherwise.
    /// Arguments not given use the block's default value.
    #[arg(long = "arg", short = 'a', value_parser = parse_arg)]
    pub args: Vec<(String, Value)>,
}

impl InvokeCmd {
    pub(crate) async fn handle(&self, host: &HeadlessHost) -> Result<Value> {
        let Some(block) = host.dispatcher.descriptor(&self.opcode) else {
            anyhow::bail!("Unknown opcode \"{}\", see `prism blocks`", self.opcode);
        };

        let mut args = block.default_args();
        for (name, value) in &self.args {
            if !block.arguments.contains_key(name) {
                anyhow::bail!("Block \"{}\" has no argument {name}", self.opcode);
            }
            args.insert(name, value.clone());
        }

        run(host, &self.opcode, &args).await
    }
}

/// Runs one block, waits for its background work and prints the result
pub(crate) async fn run(host: &HeadlessHost, opcode: &str, args: &BlockArgs) -> Result<Value> {
    let result = host.dispatcher.invoke(opcode, args, &host.ctx).await?;
    host.dispatcher.settle().await;

    if result.is_null() {
        info!("{}", fmt_success(&format!("{} done", fmt_bold(opcode))));
    } else {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    Ok(result)
}

fn parse_arg(raw: &str) -> Result<(String, Value), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got \"{raw}\""))?;
    if name.is_empty() {
        return Err(format!("missing argument name in \"{raw}\""));
    }

    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((name.to_string(), value))
}
