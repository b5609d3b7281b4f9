use crate::utils::output::OutputStyle;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Sync error: {0}")]
    Sync(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("{0} not found")]
    NotFound(String),
}

/// Result type alias for consistent error handling across the application
pub type AppResult<T> = Result<T, AppError>;

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

pub enum FlowResult {
    NotFound {
        item_type: String,
        search_term: String,
    },
    EmptyList {
        item_type: String,
    },
    Cancelled(String),
    Success(String),
}

pub fn report_error(err: &AppError) {
    match err {
        AppError::Validation(msg) => {
            eprintln!("✏️  {}", OutputStyle::warning(msg));
        }
        AppError::Network(msg) => {
            eprintln!("🌐 {}", OutputStyle::error(&format!("Network: {}", msg)));
        }
        AppError::Sync(msg) => {
            eprintln!("⚠️  {}", OutputStyle::warning(&format!("Sync: {}", msg)));
        }
        AppError::NotFound(what) => {
            eprintln!("⚠️  {}", OutputStyle::warning(&format!("{} not found", what)));
        }
        AppError::Persistence(msg) | AppError::Config(msg) | AppError::Io(msg) => {
            eprintln!("❌ {}", OutputStyle::error(msg));
        }
    }
}

pub fn handle_flow(flow: FlowResult) {
    match flow {
        FlowResult::NotFound {
            item_type,
            search_term,
        } => {
            let msg = format!("{} '{}' not found", item_type, search_term);
            println!("⚠️  {}", OutputStyle::warning(&msg));
        }
        FlowResult::EmptyList { item_type } => {
            let msg = format!("No {} found", item_type);
            println!("{}", OutputStyle::muted(&msg));
        }
        FlowResult::Cancelled(msg) => {
            println!("⏹️  {}", OutputStyle::muted(&msg));
        }
        FlowResult::Success(msg) => {
            println!("✅ {}", OutputStyle::success(&msg));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_kind() {
        let err = AppError::Validation("title must not be empty".to_string());
        assert_eq!(err.to_string(), "Validation error: title must not be empty");

        let err = AppError::NotFound("Prompt 'abc'".to_string());
        assert_eq!(err.to_string(), "Prompt 'abc' not found");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: AppError = io.into();
        assert!(matches!(err, AppError::Io(msg) if msg.contains("denied")));
    }
}
