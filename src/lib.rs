pub mod client;
pub mod error;
pub mod options;
pub mod response;
pub mod scan;

pub use client::{connect, SearchClient, SearchRequest};
pub use error::{Error, Result};
pub use options::ScanOptions;
pub use response::{Hit, HitsTotal, HitsWrapper, ScrollResponse, Shards};
pub use scan::{scan, ScanStream};
