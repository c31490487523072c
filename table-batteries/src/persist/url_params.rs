//! Query-string backing store.

use std::sync::{Arc, RwLock};

use url::Url;
use url::form_urlencoded;

/// How a write to the URL is recorded in history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HistoryMode {
    /// Overwrite the current history entry.
    #[default]
    Replace,
    /// Record the previous URL as a new history entry.
    Push,
}

#[derive(Debug)]
struct UrlInner {
    current: Url,
    /// Previous URLs, oldest first.
    history: Vec<Url>,
    mode: HistoryMode,
}

/// A shared, location-like URL whose query string holds table state.
///
/// Cheap to clone; clones share the same URL, so several tables on one page
/// can persist into it side by side. Only the parameters a write names are
/// touched; unrelated parameters keep their value and position.
///
/// # Example
///
/// ```
/// use table_batteries::persist::UrlParams;
///
/// let params = UrlParams::parse("https://console.example/credentials?tab=all").unwrap();
/// params.set("creds:pageNumber", Some("3"));
/// assert_eq!(params.get("tab").as_deref(), Some("all"));
/// assert_eq!(params.get("creds:pageNumber").as_deref(), Some("3"));
/// ```
#[derive(Debug, Clone)]
pub struct UrlParams {
    inner: Arc<RwLock<UrlInner>>,
}

impl UrlParams {
    /// Wrap a URL, replacing history on writes.
    pub fn new(url: Url) -> Self {
        Self::with_history_mode(url, HistoryMode::Replace)
    }

    /// Wrap a URL with an explicit history mode.
    pub fn with_history_mode(url: Url, mode: HistoryMode) -> Self {
        Self {
            inner: Arc::new(RwLock::new(UrlInner {
                current: url,
                history: Vec::new(),
                mode,
            })),
        }
    }

    /// Parse a URL string.
    pub fn parse(input: &str) -> Result<Self, url::ParseError> {
        Ok(Self::new(Url::parse(input)?))
    }

    /// Snapshot of the current URL.
    pub fn url(&self) -> Url {
        self.read(|inner| inner.current.clone())
    }

    /// Previous URLs recorded by pushing writes, oldest first.
    pub fn history(&self) -> Vec<Url> {
        self.read(|inner| inner.history.clone())
    }

    /// Change how subsequent writes are recorded.
    pub fn set_history_mode(&self, mode: HistoryMode) {
        self.write(|inner| inner.mode = mode);
    }

    /// Navigate to a different URL, e.g. a bookmarked one.
    pub fn navigate(&self, url: Url) {
        self.write(|inner| {
            let previous = std::mem::replace(&mut inner.current, url);
            inner.history.push(previous);
        });
    }

    /// Decoded value of a query parameter.
    pub fn get(&self, name: &str) -> Option<String> {
        self.read(|inner| {
            inner
                .current
                .query_pairs()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.into_owned())
        })
    }

    /// Set (`Some`) or remove (`None`) a single parameter.
    pub fn set(&self, name: &str, value: Option<&str>) {
        self.set_many(&[(name.to_string(), value.map(str::to_string))]);
    }

    /// Remove a parameter.
    pub fn remove(&self, name: &str) {
        self.set(name, None);
    }

    /// Apply several parameter updates as one history step.
    ///
    /// Existing parameters are updated in place; new ones are appended.
    pub fn set_many(&self, updates: &[(String, Option<String>)]) {
        self.write(|inner| {
            let mut pairs: Vec<(String, String)> = inner
                .current
                .query_pairs()
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();

            for (name, value) in updates {
                match value {
                    Some(value) => {
                        if let Some(existing) = pairs.iter_mut().find(|(k, _)| k == name) {
                            existing.1 = value.clone();
                        } else {
                            pairs.push((name.clone(), value.clone()));
                        }
                    }
                    None => pairs.retain(|(k, _)| k != name),
                }
            }

            let mut next = inner.current.clone();
            if pairs.is_empty() {
                next.set_query(None);
            } else {
                let query = form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(pairs.iter())
                    .finish();
                next.set_query(Some(&query));
            }

            if next == inner.current {
                return;
            }
            log::trace!("url params -> {}", next);
            let previous = std::mem::replace(&mut inner.current, next);
            if inner.mode == HistoryMode::Push {
                inner.history.push(previous);
            }
        });
    }

    fn read<R>(&self, f: impl FnOnce(&UrlInner) -> R) -> R {
        match self.inner.read() {
            Ok(guard) => f(&guard),
            Err(poisoned) => f(&poisoned.into_inner()),
        }
    }

    fn write(&self, f: impl FnOnce(&mut UrlInner)) {
        match self.inner.write() {
            Ok(mut guard) => f(&mut guard),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}
