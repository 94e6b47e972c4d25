//! Commands queued from the UI to the backend worker.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendCommand {
    /// Poll now instead of waiting for the next scheduled cycle.
    Retry,
    Shutdown,
}

impl BackendCommand {
    pub fn name(self) -> &'static str {
        match self {
            BackendCommand::Retry => "retry",
            BackendCommand::Shutdown => "shutdown",
        }
    }
}
