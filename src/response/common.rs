use serde::{Deserialize, Serialize};

use serde_json::Value;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Shards {
    pub total: u32,
    pub skipped: Option<u32>,
    #[serde(default)]
    pub successful: u32,
    #[serde(default)]
    pub failed: u32,
}

impl Shards {
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HitsWrapper<T> {
    pub total: Option<HitsTotal>,
    pub max_score: Option<f32>,
    #[serde(default = "Vec::new")]
    pub hits: Vec<Hit<T>>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct HitsTotal {
    pub value: usize,
    pub relation: String,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Hit<T> {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_type", default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_score")]
    pub score: Option<f32>,
    #[serde(rename = "_source")]
    pub source: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<Vec<Value>>,
}
