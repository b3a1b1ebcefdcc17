use elasticsearch::{
    http::{
        headers::HeaderMap,
        request::JsonBody,
        transport::{SingleNodeConnectionPool, TransportBuilder},
        Method,
    },
    ClearScrollParts, Elasticsearch, ScrollParts,
};
use futures::future::{BoxFuture, FutureExt};
use log::debug;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use url::Url;

use crate::{
    error::Result,
    options::ScanOptions,
    response::ScrollResponse,
};

use std::time::Duration;

/// The initial scrolled search of a scan.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchRequest {
    pub index: Vec<String>,
    pub body: Value,
    pub scroll: String,
    pub size: u32,
    pub request_timeout: Option<Duration>,
    pub params: Vec<(String, String)>,
}

impl SearchRequest {
    pub fn new(body: Value, opts: &ScanOptions) -> Self {
        Self {
            index: opts.index.clone(),
            body,
            scroll: opts.scroll.clone(),
            size: opts.size,
            request_timeout: opts.request_timeout,
            params: opts.params.clone(),
        }
    }

    pub fn path(&self) -> String {
        if self.index.is_empty() {
            "/_search".to_owned()
        } else {
            format!("/{}/_search", self.index.join(","))
        }
    }

    pub fn query_string(&self) -> Vec<(String, String)> {
        let mut qs = Vec::with_capacity(self.params.len() + 2);
        qs.push(("scroll".to_owned(), self.scroll.clone()));
        qs.push(("size".to_owned(), self.size.to_string()));
        qs.extend(self.params.iter().cloned());
        qs
    }
}

/// The three endpoints a scan talks to.
///
/// Returned futures own everything they need, so a scan can hold them across
/// polls and detach a pending cleanup when it is dropped.
pub trait SearchClient: Clone + Send + Sync + 'static {
    fn search<T>(&self, request: SearchRequest) -> BoxFuture<'static, Result<ScrollResponse<T>>>
    where
        T: DeserializeOwned + Send + 'static;

    fn scroll<T>(
        &self,
        scroll_id: String,
        scroll: String,
        request_timeout: Option<Duration>,
    ) -> BoxFuture<'static, Result<ScrollResponse<T>>>
    where
        T: DeserializeOwned + Send + 'static;

    /// Must resolve to `Ok(())` when the server answers 404, the context is
    /// already gone in that case.
    fn clear_scroll(&self, scroll_ids: Vec<String>) -> BoxFuture<'static, Result<()>>;
}

/// Single node client with the proxy disabled.
pub fn connect(url: &str) -> Result<Elasticsearch> {
    let url = Url::parse(url)?;
    let transport = TransportBuilder::new(SingleNodeConnectionPool::new(url))
        .disable_proxy()
        .build()?;

    Ok(Elasticsearch::new(transport))
}

impl SearchClient for Elasticsearch {
    fn search<T>(&self, request: SearchRequest) -> BoxFuture<'static, Result<ScrollResponse<T>>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let client = self.clone();

        async move {
            // raw transport, the typed builder cannot forward arbitrary parameters
            let path = request.path();
            let query_string = request.query_string();

            Ok(client
                .send(
                    Method::Post,
                    &path,
                    HeaderMap::new(),
                    Some(&query_string),
                    Some(JsonBody::new(request.body)),
                    request.request_timeout,
                )
                .await
                .and_then(|resp| resp.error_for_status_code())?
                .json::<ScrollResponse<T>>()
                .await?)
        }
        .boxed()
    }

    fn scroll<T>(
        &self,
        scroll_id: String,
        scroll: String,
        request_timeout: Option<Duration>,
    ) -> BoxFuture<'static, Result<ScrollResponse<T>>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let client = self.clone();

        async move {
            let mut req = client.scroll(ScrollParts::None).body(json!({
                "scroll": scroll,
                "scroll_id": scroll_id
            }));
            if let Some(timeout) = request_timeout {
                req = req.request_timeout(timeout);
            }

            Ok(req
                .send()
                .await
                .and_then(|resp| resp.error_for_status_code())?
                .json::<ScrollResponse<T>>()
                .await?)
        }
        .boxed()
    }

    fn clear_scroll(&self, scroll_ids: Vec<String>) -> BoxFuture<'static, Result<()>> {
        let client = self.clone();

        async move {
            let resp = client
                .clear_scroll(ClearScrollParts::None)
                .body(json!({ "scroll_id": scroll_ids }))
                .send()
                .await?;

            if resp.status_code().as_u16() == 404 {
                debug!("scroll already gone: {:?}", scroll_ids);
                return Ok(());
            }

            resp.error_for_status_code()?;
            Ok(())
        }
        .boxed()
    }
}
