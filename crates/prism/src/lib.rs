pub mod commands;
mod host;
pub(crate) mod utils;

use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use prism_config::Config;

use crate::{
    commands::{blocks::BlocksCmd, eval::EvalCmd, init::InitCmd, invoke::InvokeCmd},
    host::HeadlessHost,
    utils::{
        logger::{init_cli_logger, level_for},
        prompts::TerminalPrompt,
    },
};

#[derive(Parser)]
#[command(name = "prism")]
#[command(version)]
#[command(about = "Prism - run jgPrism and jgRuntime blocks")]
#[command(
    long_about = "Prism runs the blocks of the jgPrism and jgRuntime extensions against a headless host: \
a stage with a single sprite, an audio device without output and a real network fetcher."
)]
#[command(after_help = "EXAMPLES:\n  \
    prism init\n  \
    prism blocks --extension jgRuntime\n  \
    prism invoke base64Encode --arg TEXT=hello\n  \
    prism eval --yes \"[1, 2, 3].map(x => x * 2)\"\n\
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path, defaults to ./prism.json
    #[arg(long, short = 'c', global = true, default_value_t = Config::default_path())]
    pub config: Utf8PathBuf,

    /// Allow unsafe code without asking
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// No logging except for errors
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Verbose logging (-v) or trace logging (-vv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

impl Cli {
    #[allow(clippy::missing_errors_doc)]
    pub async fn handle(&self) -> anyhow::Result<()> {
        let cfg = Config::load_or_default(&self.config);
        let logger = cfg.as_ref().map(|c| c.logger.clone()).unwrap_or_default();
        init_cli_logger(level_for(self.verbose, self.quiet, &logger), &logger);

        if let Commands::Init(cmd) = &self.command {
            cmd.handle(&self.config)?;
            return Ok(());
        }

        let cfg = cfg?;
        let prompt = Arc::new(TerminalPrompt {
            assume_yes: self.yes,
        });
        let host = HeadlessHost::new(&cfg, prompt)?;

        match &self.command {
            Commands::Blocks(cmd) => cmd.handle(&host.dispatcher)?,
            Commands::Invoke(cmd) => {
                cmd.handle(&host).await?;
            }
            Commands::Eval(cmd) => {
                cmd.handle(&host).await?;
            }
            Commands::Init(_) => {}
        }

        Ok(())
    }
}

#[derive(Debug, Subcommand)]
#[command(styles=utils::styles::get_styles())]
pub enum Commands {
    /// List the available blocks
    #[command(long_about = "Lists every block of the registered extensions with its argument defaults.")]
    Blocks(BlocksCmd),

    /// Run one block
    #[command(
        long_about = "Runs one block against the headless host and prints its result as JSON. \
Commands print nothing but a confirmation."
    )]
    Invoke(InvokeCmd),

    /// Evaluate JavaScript with the value-returning eval block
    #[command(long_about = "Evaluates JavaScript in a sandboxed V8 isolate, asking for permission first.")]
    Eval(EvalCmd),

    /// Initialize configuration file
    #[command(long_about = "Initialize prism.json configuration file.")]
    Init(InitCmd),
}
