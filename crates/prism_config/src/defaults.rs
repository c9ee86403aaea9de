// Various default functions to be used by serde

use url::Url;

pub(crate) fn default_true() -> bool {
    true
}

pub(crate) fn default_name() -> String {
    "prism".into()
}

pub(crate) fn default_relay_url() -> Url {
    Url::parse("https://api.allorigins.win/raw").expect("default relay url is valid")
}

pub(crate) fn default_relay_param() -> String {
    "url".into()
}

pub(crate) fn default_stage_width() -> f64 {
    480.0
}

pub(crate) fn default_stage_height() -> f64 {
    360.0
}

pub(crate) fn default_framerate() -> f64 {
    30.0
}

pub(crate) fn default_reset_interval_ms() -> u64 {
    65
}

pub(crate) fn default_user_agent() -> String {
    format!("prism/{}", env!("CARGO_PKG_VERSION"))
}
