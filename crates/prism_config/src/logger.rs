use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggerConfig {
    #[serde(default = "crate::defaults::default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub level: LogLevel,
    #[serde(default)]
    pub format: LoggerFormat,
    #[serde(default = "crate::defaults::default_true")]
    pub colors: bool,
}

/// Line layout of CLI log output
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum LoggerFormat {
    /// Bare messages at info, level tags on warnings and errors
    #[serde(rename = "compact")]
    #[default]
    Compact,
    /// Timestamp, level and module on every line
    #[serde(rename = "pretty")]
    Pretty,
    /// One JSON object per line
    #[serde(rename = "json")]
    Json,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: LogLevel::Info,
            format: LoggerFormat::Compact,
            colors: true,
        }
    }
}

/// Define an enumeration for log levels
/// Ordered from lowest to highest severity: Trace < Debug < Info < Warn < Error
#[derive(Debug, Default, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// The "trace" level.
    #[serde(rename = "trace", alias = "TRACE")]
    Trace,
    /// The "debug" level.
    #[serde(rename = "debug", alias = "DEBUG")]
    Debug,
    /// The "info" level.
    #[serde(rename = "info", alias = "INFO")]
    #[default]
    Info,
    /// The "warn" level.
    #[serde(rename = "warn", alias = "WARN")]
    Warn,
    /// The "error" level.
    #[serde(rename = "error", alias = "ERROR")]
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_aliases() {
        let level: LogLevel = serde_json::from_str("\"DEBUG\"").unwrap();
        assert_eq!(level, LogLevel::Debug);
        assert_eq!(level.as_str(), "debug");
        assert!(LogLevel::Trace < LogLevel::Error);
    }

    #[test]
    fn test_logger_format() {
        let cfg: LoggerConfig = serde_json::from_str(r#"{ "format": "json" }"#).unwrap();
        assert_eq!(cfg.format, LoggerFormat::Json);
        assert!(cfg.enabled);

        let cfg: LoggerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.format, LoggerFormat::Compact);
        assert!(serde_json::from_str::<LoggerConfig>(r#"{ "format": "xml" }"#).is_err());
    }
}
