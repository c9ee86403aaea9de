use prism_runtime::UserPrompt;
use tracing::log::{error, warn};

use crate::utils::styles::fmt_error;

/// Terminal dialogs for the headless host
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct TerminalPrompt {
    /// Answer every confirmation with "yes" without asking
    pub(crate) assume_yes: bool,
}

impl UserPrompt for TerminalPrompt {
    fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        match inquire::Confirm::new(message).with_default(false).prompt() {
            Ok(answer) => answer,
            Err(e) => {
                warn!("Could not ask for confirmation, treating as denied: {e}");
                false
            }
        }
    }

    fn alert(&self, message: &str) {
        error!("{}", fmt_error(message));
    }
}
