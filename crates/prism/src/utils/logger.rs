use std::io::Write;

use prism_config::logger::{LoggerConfig, LoggerFormat};
use serde_json::json;

const WHITELISTED_CRATES: &[&str] = &["prism", "prism_runtime", "prism_config"];

pub(crate) fn default_env_filter(level: &str) -> String {
    let mut filters: Vec<String> = WHITELISTED_CRATES
        .iter()
        .map(|crate_name| format!("{crate_name}={level}"))
        .collect();

    // everything else only reports warnings
    filters.insert(0, "warn".to_string());

    filters.join(",")
}

/// Level requested on the command line, falling back on the configured one
pub(crate) fn level_for(verbose: u8, quiet: bool, cfg: &LoggerConfig) -> &'static str {
    if quiet || !cfg.enabled {
        "warn"
    } else if verbose == 0 {
        cfg.level.as_str()
    } else if verbose == 1 {
        "debug"
    } else {
        "trace"
    }
}

/// One log record as a JSON line
fn json_line(level: tracing::log::Level, target: &str, message: &str) -> String {
    json!({ "level": level.as_str(), "target": target, "message": message }).to_string()
}

pub(crate) fn init_cli_logger(level: &str, cfg: &LoggerConfig) {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_env_filter(level)),
    );
    if !cfg.colors || cfg.format == LoggerFormat::Json {
        builder.write_style(env_logger::WriteStyle::Never);
    }

    match cfg.format {
        LoggerFormat::Json => {
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "{}",
                    json_line(record.level(), record.target(), &record.args().to_string())
                )
            });
        }
        // At info and above only warnings and errors carry a level tag
        LoggerFormat::Compact if ["info", "warn", "error"].contains(&level) => {
            builder.format(|buf, record| {
                if record.level() == tracing::log::Level::Info {
                    writeln!(buf, "{}", record.args())
                } else {
                    let log_style = buf.default_level_style(record.level());
                    writeln!(
                        buf,
                        "{log_style}[{}]{log_style:#} {}",
                        record.level(),
                        record.args()
                    )
                }
            });
        }
        LoggerFormat::Compact | LoggerFormat::Pretty => {}
    }

    if let Err(e) = builder.try_init() {
        eprintln!("prism: Failed initializing env_logger: {e:?}");
    }
}
