use summary_storage::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unknown tool: {0}")]
    UnknownOperation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ToolError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) | Self::Store(StoreError::InvalidArgument(_)) => {
                "invalid_argument"
            }
            Self::UnknownOperation(_) => "unknown_operation",
            Self::Store(StoreError::NothingToSave) => "nothing_to_save",
            Self::Store(StoreError::Io(_) | StoreError::HomeDirUnavailable) => "io_failure",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn kinds_cover_the_taxonomy() {
        assert_eq!(
            ToolError::InvalidArgument("x".into()).kind(),
            "invalid_argument"
        );
        assert_eq!(
            ToolError::from(StoreError::InvalidArgument("x".into())).kind(),
            "invalid_argument"
        );
        assert_eq!(
            ToolError::UnknownOperation("x".into()).kind(),
            "unknown_operation"
        );
        assert_eq!(
            ToolError::from(StoreError::NothingToSave).kind(),
            "nothing_to_save"
        );
        let io_err = StoreError::Io(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        assert_eq!(ToolError::from(io_err).kind(), "io_failure");
        assert_eq!(
            ToolError::from(StoreError::HomeDirUnavailable).kind(),
            "io_failure"
        );
    }

    #[test]
    fn store_messages_pass_through() {
        let err = ToolError::from(StoreError::NothingToSave);
        assert_eq!(err.to_string(), "nothing to save: no summaries recorded");
    }
}
