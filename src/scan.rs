use futures::{
    future::{BoxFuture, FutureExt},
    stream::{FusedStream, Stream},
};
use log::{debug, warn};
use pin_project::{pin_project, pinned_drop};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{
    client::{SearchClient, SearchRequest},
    error::{Error, Result},
    options::ScanOptions,
    response::{Hit, ScrollResponse, Shards},
};

use std::{
    mem,
    pin::Pin,
    task::{Context, Poll},
    vec,
};

/// Every hit matching `query`, page after page, as a stream.
///
/// Unless `preserve_order` is set, the query is sorted by `_doc` so the
/// server can scroll without scoring. The scroll context is cleared once the
/// stream ends, fails, or is dropped, unless `clear_scroll` is disabled.
///
/// ```no_run
/// # async fn run() -> elastic_scan::Result<()> {
/// use futures::StreamExt;
/// use serde_json::{json, Value};
///
/// let client = elastic_scan::connect("http://localhost:9200")?;
/// let mut hits = elastic_scan::scan::<_, Value>(
///     client,
///     Some(json!({ "query": { "match": { "title": "rust" } } })),
///     elastic_scan::ScanOptions::new().index("books"),
/// );
///
/// while let Some(hit) = hits.next().await {
///     println!("{:?}", hit?.source);
/// }
/// # Ok(())
/// # }
/// ```
pub fn scan<C, T>(client: C, query: Option<Value>, opts: ScanOptions) -> ScanStream<C, T>
where
    C: SearchClient,
    T: DeserializeOwned + Send + 'static,
{
    ScanStream::new(client, query, opts)
}

fn prepare_query(query: Option<Value>, preserve_order: bool) -> Result<Value> {
    let mut query = match query {
        None | Some(Value::Null) => Value::Object(Map::new()),
        Some(q @ Value::Object(_)) => q,
        Some(other) => {
            return Err(Error::InvalidQuery(format!(
                "expected a json object, got: {}",
                other
            )))
        }
    };

    if !preserve_order {
        if let Value::Object(ref mut map) = query {
            map.insert("sort".to_owned(), Value::from("_doc"));
        }
    }

    Ok(query)
}

enum State<T> {
    Start(Option<Value>),
    Fetch(BoxFuture<'static, Result<ScrollResponse<T>>>),
    Emit {
        hits: vec::IntoIter<Hit<T>>,
        shards: Shards,
        next_id: Option<String>,
        last_page: bool,
    },
    Clear(BoxFuture<'static, Result<()>>, Option<Error>),
    Fail(Error),
    Done,
}

#[pin_project(PinnedDrop)]
pub struct ScanStream<C: SearchClient, T: DeserializeOwned + Send + 'static> {
    client: C,
    opts: ScanOptions,
    scroll_id: Option<String>,
    state: State<T>,
}

impl<C, T> ScanStream<C, T>
where
    C: SearchClient,
    T: DeserializeOwned + Send + 'static,
{
    pub fn new(client: C, query: Option<Value>, opts: ScanOptions) -> Self {
        Self {
            client,
            opts,
            scroll_id: None,
            state: State::Start(query),
        }
    }

    /// Scroll id currently held, cleared on exit.
    pub fn scroll_id(&self) -> Option<&str> {
        self.scroll_id.as_deref()
    }
}

impl<C, T> Stream for ScanStream<C, T>
where
    C: SearchClient,
    T: DeserializeOwned + Send + 'static,
{
    type Item = Result<Hit<T>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context) -> Poll<Option<Self::Item>> {
        let this = self.project();

        loop {
            match mem::replace(this.state, State::Done) {
                State::Start(query) => {
                    match prepare_query(query, this.opts.preserve_order) {
                        Ok(body) => {
                            let req = SearchRequest::new(body, this.opts);
                            *this.state = State::Fetch(this.client.search(req));
                        }
                        Err(err) => return Poll::Ready(Some(Err(err))),
                    }
                }
                State::Fetch(mut fut) => match fut.poll_unpin(cx) {
                    Poll::Pending => {
                        *this.state = State::Fetch(fut);
                        return Poll::Pending;
                    }
                    Poll::Ready(Err(err)) => {
                        *this.state = finish(this.client, this.opts, this.scroll_id, Some(err));
                    }
                    Poll::Ready(Ok(resp)) => {
                        let (next_id, shards, hits) = resp.into_parts();
                        let next_id = next_id.filter(|id| !id.is_empty());

                        if this.scroll_id.is_none() {
                            // initial search
                            match next_id {
                                Some(ref id) => {
                                    debug!("scroll opened: {}", id);
                                    *this.scroll_id = Some(id.clone());
                                }
                                None => return Poll::Ready(None),
                            }
                        }

                        *this.state = State::Emit {
                            last_page: next_id.is_none() || hits.is_empty(),
                            hits: hits.into_iter(),
                            shards,
                            next_id,
                        };
                    }
                },
                State::Emit {
                    mut hits,
                    shards,
                    next_id,
                    last_page,
                } => {
                    if let Some(hit) = hits.next() {
                        *this.state = State::Emit {
                            hits,
                            shards,
                            next_id,
                            last_page,
                        };
                        return Poll::Ready(Some(Ok(hit)));
                    }

                    if shards.has_failures() {
                        warn!(
                            "Scroll request has failed on {} shards out of {}.",
                            shards.failed, shards.total
                        );
                        if this.opts.raise_on_error {
                            let err = Error::shards_failed(
                                this.scroll_id.as_deref().unwrap_or_default(),
                                shards.failed,
                                shards.total,
                            );
                            *this.state =
                                finish(this.client, this.opts, this.scroll_id, Some(err));
                            continue;
                        }
                    }

                    // the last id seen stays held for cleanup when the final page carries none
                    if let Some(id) = next_id {
                        *this.scroll_id = Some(id);
                    }

                    let next = match this.scroll_id.as_ref() {
                        Some(id) if !last_page => Some(id.clone()),
                        _ => None,
                    };
                    *this.state = match next {
                        Some(id) => State::Fetch(this.client.scroll(
                            id,
                            this.opts.scroll.clone(),
                            this.opts.request_timeout,
                        )),
                        None => finish(this.client, this.opts, this.scroll_id, None),
                    };
                }
                State::Clear(mut fut, outcome) => match fut.poll_unpin(cx) {
                    Poll::Pending => {
                        *this.state = State::Clear(fut, outcome);
                        return Poll::Pending;
                    }
                    Poll::Ready(res) => {
                        if let Err(err) = res {
                            warn!("failed to clear scroll: {}", err);
                        }
                        return Poll::Ready(outcome.map(Err));
                    }
                },
                State::Fail(err) => return Poll::Ready(Some(Err(err))),
                State::Done => return Poll::Ready(None),
            }
        }
    }
}

impl<C, T> FusedStream for ScanStream<C, T>
where
    C: SearchClient,
    T: DeserializeOwned + Send + 'static,
{
    fn is_terminated(&self) -> bool {
        matches!(self.state, State::Done)
    }
}

/// Next state once the scan is over, with `outcome` yielded last.
fn finish<C: SearchClient, T>(
    client: &C,
    opts: &ScanOptions,
    scroll_id: &mut Option<String>,
    outcome: Option<Error>,
) -> State<T> {
    match scroll_id.take() {
        Some(id) if opts.clear_scroll => {
            debug!("clearing scroll: {}", id);
            State::Clear(client.clear_scroll(vec![id]), outcome)
        }
        _ => outcome.map_or(State::Done, State::Fail),
    }
}

#[pinned_drop]
impl<C, T> PinnedDrop for ScanStream<C, T>
where
    C: SearchClient,
    T: DeserializeOwned + Send + 'static,
{
    fn drop(self: Pin<&mut Self>) {
        let this = self.project();

        let pending = match mem::replace(this.state, State::Done) {
            State::Clear(fut, _) => Some(fut),
            _ => match this.scroll_id.take() {
                Some(id) if this.opts.clear_scroll => {
                    debug!("scan dropped early, clearing scroll: {}", id);
                    Some(this.client.clear_scroll(vec![id]))
                }
                _ => None,
            },
        };

        if let Some(fut) = pending {
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    handle.spawn(async move {
                        if let Err(err) = fut.await {
                            warn!("failed to clear scroll: {}", err);
                        }
                    });
                }
                Err(_) => warn!("no runtime to clear scroll on drop, leaving it to expire"),
            }
        }
    }
}
