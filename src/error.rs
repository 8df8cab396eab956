use thiserror::Error;

/// Errors surfaced by the inventory stores, the sales dashboard and the exporters
///
/// The aggregation pipeline itself never fails; these variants cover the
/// caller-level conditions around it (no data loaded, bad selections) and the
/// I/O and validation paths of the car, user and favorites stores.
#[derive(Debug, Error)]
pub enum Error {
    /// The sales snapshot was empty before any filter was applied
    #[error("No sales data available. Please check your database.")]
    NoSalesData,

    /// A filter or top-N selection could not be parsed
    #[error("invalid {field} selection: {value}")]
    InvalidSelection { field: &'static str, value: String },

    /// Input rejected by a validation rule; the message is user-facing
    #[error("{0}")]
    Validation(String),

    /// A record addressed by id or name does not exist
    #[error("{0}")]
    NotFound(String),

    /// Missing or wrong credentials
    #[error("{0}")]
    Unauthorized(String),

    #[error("password hashing failed")]
    PasswordHash,

    #[error("export failed: {0}")]
    Export(String),

    #[error("chart rendering failed: {0}")]
    Chart(String),

    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store data error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
