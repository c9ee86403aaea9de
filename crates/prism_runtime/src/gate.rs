use std::sync::{Arc, OnceLock};

use tracing::{info, warn};

pub const UNSAFE_CODE_PROMPT: &str = "Allow this project to run custom unsafe code?";

/// User-facing dialogs provided by the host
pub trait UserPrompt: Send + Sync {
    /// Asks a yes/no question, blocking until the user answers
    fn confirm(&self, message: &str) -> bool;

    /// Shows a message to the user
    fn alert(&self, message: &str);
}

/// One-way permission latch for unsafe capabilities.
///
/// The first check asks the user; the answer, yes or no, is kept for the
/// lifetime of the gate and the user is never asked again.
pub struct CapabilityGate {
    prompt: Arc<dyn UserPrompt>,
    message: String,
    granted: OnceLock<bool>,
}

impl std::fmt::Debug for CapabilityGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityGate")
            .field("message", &self.message)
            .field("granted", &self.granted.get())
            .finish()
    }
}

impl CapabilityGate {
    pub fn new(prompt: Arc<dyn UserPrompt>) -> Self {
        Self::with_message(prompt, UNSAFE_CODE_PROMPT)
    }

    pub fn with_message(prompt: Arc<dyn UserPrompt>, message: &str) -> Self {
        Self {
            prompt,
            message: message.to_string(),
            granted: OnceLock::new(),
        }
    }

    /// Returns whether the capability may be used, prompting on first use
    pub fn ensure_granted(&self) -> bool {
        *self.granted.get_or_init(|| {
            let granted = self.prompt.confirm(&self.message);
            if granted {
                info!("Unsafe code execution granted by user");
            } else {
                warn!("Unsafe code execution denied by user");
            }
            granted
        })
    }

    /// The latched answer, `None` while the user has not been asked yet
    pub fn decision(&self) -> Option<bool> {
        self.granted.get().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::RecordingPrompt;

    #[test]
    fn test_approval_sticks() {
        let prompt = Arc::new(RecordingPrompt::new(true));
        let gate = CapabilityGate::new(prompt.clone());

        assert_eq!(gate.decision(), None);
        assert!(gate.ensure_granted());
        assert!(gate.ensure_granted());
        assert_eq!(gate.decision(), Some(true));
        assert_eq!(prompt.confirm_count(), 1);
    }

    #[test]
    fn test_denial_sticks() {
        let prompt = Arc::new(RecordingPrompt::new(false));
        let gate = CapabilityGate::new(prompt.clone());

        assert!(!gate.ensure_granted());
        prompt.set_answer(true);
        assert!(!gate.ensure_granted());
        assert_eq!(prompt.confirm_count(), 1);
        assert_eq!(prompt.questions(), vec![UNSAFE_CODE_PROMPT.to_string()]);
    }
}
