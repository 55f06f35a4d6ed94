use thiserror::Error;

#[derive(Error, Debug)]
pub enum CardwiseError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Feed error: {0}")]
    Feed(String),

    #[error("Unknown card: {0}")]
    UnknownCard(String),

    #[error("Unknown filter: {0}")]
    UnknownFilter(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, CardwiseError>;
