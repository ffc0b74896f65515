use thiserror::Error;

/// Everything that can go wrong between collecting field data and saving the file.
#[derive(Debug, Error)]
pub enum DocgenError {
    #[error("failed to serialize template fields: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("file handler request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("file handler responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("file handler rejected the credentials")]
    Unauthorized,

    #[error("failed to build archive: {0}")]
    Archive(String),

    #[error("failed to save download: {0}")]
    Download(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<zip::result::ZipError> for DocgenError {
    fn from(error: zip::result::ZipError) -> Self {
        DocgenError::Archive(error.to_string())
    }
}

impl From<config::ConfigError> for DocgenError {
    fn from(error: config::ConfigError) -> Self {
        DocgenError::Config(error.to_string())
    }
}

pub type DocgenResult<T> = Result<T, DocgenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_mentions_code() {
        let err = DocgenError::Status { status: 502, body: "bad gateway".to_string() };
        assert_eq!(err.to_string(), "file handler responded with status 502: bad gateway");
    }

    #[test]
    fn test_io_error_becomes_download_error() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: DocgenError = io.into();
        assert!(matches!(err, DocgenError::Download(_)));
    }
}
