use shared::protocol::Resource;
use thiserror::Error;

/// Failure of a single backend fetch. Any of these fails the whole poll
/// cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("request to {resource} failed: {message}")]
    Transport { resource: Resource, message: String },
    #[error("{resource} responded with HTTP {status}")]
    Status { resource: Resource, status: u16 },
    #[error("{resource} returned an unexpected body: {message}")]
    Decode { resource: Resource, message: String },
}

impl SyncError {
    pub fn resource(&self) -> Resource {
        match self {
            SyncError::Transport { resource, .. }
            | SyncError::Status { resource, .. }
            | SyncError::Decode { resource, .. } => *resource,
        }
    }

    pub(crate) fn from_reqwest(resource: Resource, err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return SyncError::Status {
                resource,
                status: status.as_u16(),
            };
        }
        if err.is_decode() {
            return SyncError::Decode {
                resource,
                message: err.to_string(),
            };
        }
        SyncError::Transport {
            resource,
            message: err.to_string(),
        }
    }
}
