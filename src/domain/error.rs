//! Domain error types.

/// Top-level error type for demandboard.
#[derive(Debug, thiserror::Error)]
pub enum DemandError {
    #[error("invalid input: truth has {truth_len} values, pred has {pred_len}")]
    InvalidInput { truth_len: usize, pred_len: usize },

    #[error("bin width must be a positive number, got {width}")]
    InvalidBinWidth { width: f64 },

    #[error("unknown item {item_id}")]
    UnknownItem { item_id: u32 },

    #[error("failed to read {file}: {reason}")]
    DataRead { file: String, reason: String },

    #[error("parse error in {file} at line {line}: {reason}")]
    DataParse {
        file: String,
        line: u64,
        reason: String,
    },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&DemandError> for std::process::ExitCode {
    fn from(err: &DemandError) -> Self {
        let code: u8 = match err {
            DemandError::Io(_) => 1,
            DemandError::ConfigParse { .. }
            | DemandError::ConfigMissing { .. }
            | DemandError::ConfigInvalid { .. } => 2,
            DemandError::DataRead { .. } | DemandError::DataParse { .. } => 3,
            DemandError::InvalidInput { .. } | DemandError::InvalidBinWidth { .. } => 4,
            DemandError::UnknownItem { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_message_names_both_lengths() {
        let err = DemandError::InvalidInput {
            truth_len: 3,
            pred_len: 2,
        };
        assert_eq!(
            err.to_string(),
            "invalid input: truth has 3 values, pred has 2"
        );
    }

    #[test]
    fn data_parse_message_includes_location() {
        let err = DemandError::DataParse {
            file: "result.csv".into(),
            line: 7,
            reason: "invalid float literal".into(),
        };
        assert_eq!(
            err.to_string(),
            "parse error in result.csv at line 7: invalid float literal"
        );
    }

    #[test]
    fn io_errors_convert_transparently() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: DemandError = io.into();
        assert_eq!(err.to_string(), "gone");
    }

    fn exit_report(err: &DemandError) -> String {
        format!("{:?}", std::process::ExitCode::from(err))
    }

    #[test]
    fn exit_codes_by_failure_class() {
        let code = |n: u8| format!("{:?}", std::process::ExitCode::from(n));

        let io = DemandError::Io(std::io::Error::other("broken pipe"));
        assert_eq!(exit_report(&io), code(1));

        let config = DemandError::ConfigMissing {
            section: "data".into(),
            key: "dir".into(),
        };
        assert_eq!(exit_report(&config), code(2));

        let data = DemandError::DataRead {
            file: "items.csv".into(),
            reason: "gone".into(),
        };
        assert_eq!(exit_report(&data), code(3));

        let input = DemandError::InvalidInput {
            truth_len: 1,
            pred_len: 2,
        };
        assert_eq!(exit_report(&input), code(4));
        assert_eq!(exit_report(&DemandError::InvalidBinWidth { width: 0.0 }), code(4));

        let unknown = DemandError::UnknownItem { item_id: 9 };
        assert_eq!(exit_report(&unknown), code(5));
        assert_ne!(exit_report(&unknown), code(0));
    }
}
