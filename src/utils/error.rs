use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Backend returned {status}: {message}")]
    BackendError { status: u16, message: String },

    #[error("Places provider returned status {status}")]
    PlacesError { status: String },

    #[error("Geocoding failed: {message}")]
    GeocodeError { message: String },

    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Processing error: {message}")]
    ProcessingError { message: String },
}

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Upstream,
    Configuration,
    Input,
    Storage,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// 命令列的結束碼；Low 視為警告
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl AppError {
    pub fn backend(status: u16, message: impl Into<String>) -> Self {
        AppError::BackendError {
            status,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::ValidationError {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        AppError::NotFound {
            resource: resource.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::HttpError(_) => ErrorCategory::Network,
            AppError::BackendError { .. }
            | AppError::PlacesError { .. }
            | AppError::GeocodeError { .. } => ErrorCategory::Upstream,
            AppError::ConfigValidationError { .. }
            | AppError::InvalidConfigValueError { .. }
            | AppError::MissingConfigError { .. } => ErrorCategory::Configuration,
            AppError::ValidationError { .. } | AppError::NotFound { .. } => ErrorCategory::Input,
            AppError::IoError(_) | AppError::CsvError(_) => ErrorCategory::Storage,
            AppError::SerializationError(_) | AppError::ProcessingError { .. } => {
                ErrorCategory::Internal
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Low,
            ErrorCategory::Network | ErrorCategory::Upstream => ErrorSeverity::Medium,
            ErrorCategory::Storage | ErrorCategory::Internal => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    /// 給維運人員的處理建議
    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check network connectivity to the backend and places provider",
            ErrorCategory::Upstream => "Inspect the upstream response; the service may be degraded or the key revoked",
            ErrorCategory::Configuration => "Review the TOML configuration file and required environment variables",
            ErrorCategory::Input => "Correct the submitted data and try again",
            ErrorCategory::Storage => "Verify the output path exists and is writable",
            ErrorCategory::Internal => "Re-run with --verbose and report the log output",
        }
    }

    /// 顯示給使用者的訊息 (西班牙文)
    pub fn user_friendly_message(&self) -> String {
        match self {
            AppError::BackendError { message, .. } => message.clone(),
            AppError::GeocodeError { message } => message.clone(),
            AppError::ValidationError { message } => message.clone(),
            AppError::NotFound { .. } => "No encontramos lo que buscabas.".to_string(),
            AppError::HttpError(_) => "No pudimos conectar con el servidor de datos.".to_string(),
            AppError::PlacesError { status } => {
                format!("El proveedor de mapas respondió con estado {}.", status)
            }
            other => other.to_string(),
        }
    }
}
