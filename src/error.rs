use uuid::Uuid;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Validation error: {0}")]
    InvalidPayload(#[from] validator::ValidationErrors),

    #[error("Scheduling conflict: participants {busy:?} are unavailable")]
    Conflict { busy: Vec<Uuid> },

    #[error("Illegal state transition: {from} -> {to}")]
    IllegalTransition { from: String, to: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Uniqueness violation: {0}")]
    Uniqueness(String),

    #[error("Operation lost a race with a concurrent update")]
    ConcurrentUpdate,

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            other => Error::Database(other),
        }
    }
}
