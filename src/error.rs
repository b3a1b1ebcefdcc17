use elasticsearch::{http::transport::BuildError, Error as ElasticError};
use serde_json::error::Error as SerializeJsonError;
use thiserror::Error as ThisError;
use url::ParseError as UrlParseError;

#[derive(ThisError, Debug)]
pub enum Error {
    #[error("Scan Error: `{reason}` (scroll id: `{scroll_id}`)")]
    ScanError { scroll_id: String, reason: String },
    #[error("Elastic Error: `{0:?}`")]
    ElasticError(#[from] ElasticError),
    #[error("Transport Build Error: `{0:?}`")]
    TransportBuildError(#[from] BuildError),
    #[error("Url Parse Error: `{0:?}`")]
    UrlParseError(#[from] UrlParseError),
    #[error("Serialize Json Error: `{0:?}`")]
    SerializeJsonError(#[from] SerializeJsonError),
    #[error("Invalid Query: `{0}`")]
    InvalidQuery(String),
}

impl Error {
    pub(crate) fn shards_failed(scroll_id: &str, failed: u32, total: u32) -> Self {
        Error::ScanError {
            scroll_id: scroll_id.to_owned(),
            reason: format!(
                "Scroll request has failed on {} shards out of {}.",
                failed, total
            ),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
