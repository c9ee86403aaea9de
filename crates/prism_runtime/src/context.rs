use std::sync::Arc;

use crate::host::Target;

/// Per-invocation record handed to every block handler
#[derive(Clone)]
pub struct ExecutionContext {
    target: Arc<dyn Target>,
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("target", &self.target.id())
            .finish()
    }
}

impl ExecutionContext {
    pub fn new(target: Arc<dyn Target>) -> Self {
        Self { target }
    }

    /// The sprite or stage the block runs against
    pub fn target(&self) -> &Arc<dyn Target> {
        &self.target
    }
}
