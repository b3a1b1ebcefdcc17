use std::time::Duration;

pub const DEFAULT_SCROLL: &str = "5m";
pub const DEFAULT_SIZE: u32 = 1000;

/// Settings of a single scan session.
///
/// `scroll` is the keep-alive of the server-side search context, `size` the
/// per-shard batch size. `index` and `params` only affect the initial search;
/// every `params` pair is forwarded verbatim as a query-string parameter.
#[derive(Clone, Debug)]
pub struct ScanOptions {
    pub scroll: String,
    pub raise_on_error: bool,
    pub preserve_order: bool,
    pub size: u32,
    pub request_timeout: Option<Duration>,
    pub clear_scroll: bool,
    pub index: Vec<String>,
    pub params: Vec<(String, String)>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            scroll: DEFAULT_SCROLL.to_owned(),
            raise_on_error: true,
            preserve_order: false,
            size: DEFAULT_SIZE,
            request_timeout: None,
            clear_scroll: true,
            index: Vec::new(),
            params: Vec::new(),
        }
    }
}

impl ScanOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scroll(mut self, scroll: impl Into<String>) -> Self {
        self.scroll = scroll.into();
        self
    }

    pub fn raise_on_error(mut self, raise_on_error: bool) -> Self {
        self.raise_on_error = raise_on_error;
        self
    }

    /// Keep score or explicit sort order. Disables scan mode, which makes
    /// deep scrolls noticeably more expensive on the server.
    pub fn preserve_order(mut self, preserve_order: bool) -> Self {
        self.preserve_order = preserve_order;
        self
    }

    pub fn size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn clear_scroll(mut self, clear_scroll: bool) -> Self {
        self.clear_scroll = clear_scroll;
        self
    }

    pub fn index(mut self, index: impl Into<String>) -> Self {
        self.index.push(index.into());
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }
}
