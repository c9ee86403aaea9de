use anyhow::Result;
use camino::Utf8PathBuf;
use clap::Parser;
use prism_config::Config;
use tracing::log::info;

use crate::utils::styles::{fmt_bold, fmt_dimmed, fmt_success};

#[derive(Debug, Clone, Parser)]
pub struct InitCmd {
    /// Overwrite an existing configuration file
    #[arg(long)]
    pub force: bool,
}

impl InitCmd {
    pub(crate) fn handle(&self, path: &Utf8PathBuf) -> Result<Config> {
        if path.exists() && !self.force {
            anyhow::bail!("Config file already exists: {path} (use --force to overwrite)");
        }

        let cfg = Config::default().with_path(path);
        cfg.save()?;

        info!(
            "{}",
            fmt_success(&format!(
                "Wrote {name} config to {path}",
                name = fmt_bold(&cfg.name),
                path = fmt_dimmed(cfg.path().as_str()),
            ))
        );

        Ok(cfg)
    }
}
