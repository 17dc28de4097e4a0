use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid domain: {0}")]
    InvalidDomainFormat(String),

    #[error("A custom domain is already registered for this tenant")]
    DomainAlreadyRegistered,

    #[error("Domain provider rejected the request: {0}")]
    ProviderRejected(String),

    #[error("Domain provider unreachable: {0}")]
    ProviderTransport(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Not found")]
    NotFound,
}

impl AppError {
    /// Transport failures are expected to recover on the next poll tick;
    /// everything else needs user or operator action.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::ProviderTransport(_))
    }
}

#[derive(Clone, Copy, Debug)]
pub enum ErrorCode {
    InvalidDomainFormat,
    DomainAlreadyRegistered,
    ProviderRejected,
    ProviderUnavailable,
    PersistenceError,
    NotFound,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidDomainFormat => "INVALID_DOMAIN_FORMAT",
            ErrorCode::DomainAlreadyRegistered => "DOMAIN_ALREADY_REGISTERED",
            ErrorCode::ProviderRejected => "PROVIDER_REJECTED",
            ErrorCode::ProviderUnavailable => "PROVIDER_UNAVAILABLE",
            ErrorCode::PersistenceError => "PERSISTENCE_ERROR",
            ErrorCode::NotFound => "NOT_FOUND",
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
