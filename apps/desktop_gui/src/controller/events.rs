//! Backend-to-UI events and error modeling for the dashboard window.

use dashboard_core::DashboardView;

pub enum UiEvent {
    Info(String),
    View(Box<DashboardView>),
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    /// Backend unreachable or timed out.
    Transport,
    /// Backend answered with a non-success status.
    Server,
    /// Backend answered with something that is not the expected JSON.
    Data,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Sync,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_ascii_lowercase();
        let category = if lower.contains("responded with http") {
            UiErrorCategory::Server
        } else if lower.contains("unexpected body")
            || lower.contains("decode")
            || lower.contains("invalid type")
            || lower.contains("malformed")
        {
            UiErrorCategory::Data
        } else if lower.contains("timed out")
            || lower.contains("timeout")
            || lower.contains("connection")
            || lower.contains("connect")
            || lower.contains("dns")
            || lower.contains("request to")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// One-line guidance shown under the raw message.
    pub fn hint(&self) -> &'static str {
        match (self.context, self.category) {
            (UiErrorContext::BackendStartup, _) => {
                "The dashboard worker could not start; check the configuration and relaunch."
            }
            (_, UiErrorCategory::Transport) => {
                "Backend unreachable; check DASHBOARD_API_URL and the network."
            }
            (_, UiErrorCategory::Server) => "The backend is up but failed to answer.",
            (_, UiErrorCategory::Data) => "The backend sent data the dashboard cannot read.",
            (_, UiErrorCategory::Unknown) => "Retrying on the next poll.",
        }
    }
}
