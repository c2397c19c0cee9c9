use thiserror::Error;

/// Shown on a failed result when the failure carried no usable message.
pub const GENERIC_FAILURE: &str = "Error processing file.";

/// Shown when the service rejects a file without a `detail` body.
pub const GENERIC_REJECTION: &str = "Failed to analyze file";

/// Problems with the user's selection. Surfaced before any request is made and
/// never stored on a processing result.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is already uploaded")]
    Duplicate(String),

    #[error("{name}: File size exceeds {limit_mb}MB limit.")]
    TooLarge { name: String, limit_mb: u64 },

    #[error("{name}: Unsupported file format. Please upload {allowed}")]
    UnsupportedFormat { name: String, allowed: String },

    #[error("Please select files to analyze.")]
    NoFilesSelected,

    #[error("An analysis is already running.")]
    BatchInProgress,
}

/// Per-file failures while talking to the detection service. Attached to the
/// owning result; never aborts sibling requests.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Could not read {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{detail}")]
    Rejected { status: u16, detail: String },

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Invalid service URL: {0}")]
    InvalidUrl(String),

    #[error("Analysis cancelled")]
    Cancelled,
}

impl TransportError {
    /// Human-readable message for a result card.
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            GENERIC_FAILURE.to_string()
        } else {
            message
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_match_banner_wording() {
        let err = ValidationError::TooLarge {
            name: "big.dcm".into(),
            limit_mb: 50,
        };
        assert_eq!(err.to_string(), "big.dcm: File size exceeds 50MB limit.");

        let err = ValidationError::UnsupportedFormat {
            name: "scan.png".into(),
            allowed: ".dcm, .rvg".into(),
        };
        assert_eq!(
            err.to_string(),
            "scan.png: Unsupported file format. Please upload .dcm, .rvg"
        );
    }

    #[test]
    fn empty_rejection_detail_falls_back_to_generic_message() {
        let err = TransportError::Rejected {
            status: 500,
            detail: "  ".into(),
        };
        assert_eq!(err.user_message(), GENERIC_FAILURE);

        let err = TransportError::Rejected {
            status: 400,
            detail: "Invalid file type.".into(),
        };
        assert_eq!(err.user_message(), "Invalid file type.");
    }
}
