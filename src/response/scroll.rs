use serde::{Deserialize, Serialize};

use crate::response::common::{Hit, HitsWrapper, Shards};

/// Body of both the initial scrolled search and every `_search/scroll` page.
#[derive(Debug, Serialize, Deserialize)]
pub struct ScrollResponse<T> {
    #[serde(rename = "_scroll_id")]
    pub scroll_id: Option<String>,
    pub took: Option<u64>,
    #[serde(default)]
    pub timed_out: bool,
    #[serde(rename = "_shards")]
    pub shards: Shards,
    pub hits: HitsWrapper<T>,
}

impl<T> ScrollResponse<T> {
    pub fn into_parts(self) -> (Option<String>, Shards, Vec<Hit<T>>) {
        (self.scroll_id, self.shards, self.hits.hits)
    }
}
