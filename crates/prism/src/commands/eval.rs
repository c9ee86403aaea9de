use anyhow::Result;
use clap::Parser;
use prism_runtime::BlockArgs;
use serde_json::Value;

use crate::commands::invoke::run;
use crate::host::HeadlessHost;

#[derive(Debug, Clone, Parser)]
pub struct EvalCmd {
    /// JavaScript to evaluate
    pub code: String,
}

impl EvalCmd {
    pub(crate) async fn handle(&self, host: &HeadlessHost) -> Result<Value> {
        let args = BlockArgs::new().with("JAVASCRIPT", self.code.as_str());
        run(host, "evaluate2", &args).await
    }
}
