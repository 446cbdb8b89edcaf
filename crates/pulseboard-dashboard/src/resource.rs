//! Polled resource slots
//!
//! A [`PolledResource`] pairs one remote collection with the fetch that refreshes it.
//! Each poll replaces the held value wholesale on success and keeps the previous value
//! on failure, recording a resource-scoped error instead of propagating it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::RwLock;
use pulseboard_client::ClientResult;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

/// Boxed fetch closure producing a fresh value for one resource
pub type Fetcher<T> = Arc<dyn Fn() -> BoxFuture<'static, ClientResult<T>> + Send + Sync>;

/// Current state of one polled resource
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceState<T> {
    /// Last successfully fetched value
    pub data: T,

    /// Error from the most recent fetch, cleared on the next success
    pub error: Option<String>,

    /// Whether a fetch is in flight
    pub loading: bool,

    /// When the last successful fetch completed
    pub last_success: Option<DateTime<Utc>>,

    /// When the request behind `data` was issued
    pub issued_at: Option<DateTime<Utc>>,

    /// Successful fetches
    pub successes: u64,

    /// Failed fetches
    pub failures: u64,

    in_flight: usize,
}

impl<T: Default> Default for ResourceState<T> {
    fn default() -> Self {
        Self {
            data: T::default(),
            error: None,
            loading: false,
            last_success: None,
            issued_at: None,
            successes: 0,
            failures: 0,
            in_flight: 0,
        }
    }
}

impl<T> ResourceState<T> {
    /// Whether at least one fetch has succeeded
    #[must_use]
    pub const fn has_data(&self) -> bool {
        self.last_success.is_some()
    }
}

/// Something the polling coordinator refreshes once per cycle
#[async_trait]
pub trait PollTarget: Send + Sync {
    /// Resource name used in logs and metrics
    fn name(&self) -> &str;

    /// Run one fetch; returns whether it succeeded
    async fn poll(&self) -> bool;
}

/// One remote collection and the fetch that refreshes it
pub struct PolledResource<T> {
    name: String,
    state: Arc<RwLock<ResourceState<T>>>,
    fetcher: Fetcher<T>,
}

impl<T> fmt::Debug for PolledResource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolledResource")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<T> PolledResource<T>
where
    T: Default + Clone + Send + Sync + 'static,
{
    /// Create a resource from a fetch function
    pub fn new<F, Fut>(name: impl Into<String>, fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ClientResult<T>> + Send + 'static,
    {
        let fetcher: Fetcher<T> = Arc::new(move || fetch().boxed());
        Self {
            name: name.into(),
            state: Arc::new(RwLock::new(ResourceState::default())),
            fetcher,
        }
    }

    /// Resource name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read side of this resource
    #[must_use]
    pub fn handle(&self) -> ResourceHandle<T> {
        ResourceHandle {
            name: self.name.clone(),
            state: self.state.clone(),
        }
    }

    /// Fetch once and merge the outcome into the held state
    ///
    /// Never fails: a fetch error keeps the previous value and is recorded on the
    /// resource. A response issued before the one already held is superseded and
    /// dropped when it lands.
    pub async fn refresh(&self) -> bool {
        let issued_at = Utc::now();
        {
            let mut state = self.state.write();
            state.in_flight += 1;
            state.loading = true;
        }

        let result = (self.fetcher)().await;

        let mut state = self.state.write();
        state.in_flight = state.in_flight.saturating_sub(1);
        state.loading = state.in_flight > 0;

        match result {
            Ok(_) if state.issued_at.is_some_and(|held| issued_at < held) => {
                drop(state);
                debug!(resource = %self.name, "Superseded response dropped");
                true
            }
            Ok(data) => {
                state.data = data;
                state.error = None;
                state.last_success = Some(Utc::now());
                state.issued_at = Some(issued_at);
                state.successes += 1;
                drop(state);

                ::metrics::counter!("pulseboard_fetch_total", "resource" => self.name.clone())
                    .increment(1);
                debug!(resource = %self.name, "Resource refreshed");
                true
            }
            Err(e) => {
                state.error = Some(e.to_string());
                state.failures += 1;
                drop(state);

                ::metrics::counter!("pulseboard_fetch_failures_total", "resource" => self.name.clone())
                    .increment(1);
                warn!(resource = %self.name, error = %e, "Resource fetch failed, keeping previous data");
                false
            }
        }
    }
}

#[async_trait]
impl<T> PollTarget for PolledResource<T>
where
    T: Default + Clone + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn poll(&self) -> bool {
        self.refresh().await
    }
}

/// Shared read access to a polled resource
pub struct ResourceHandle<T> {
    name: String,
    state: Arc<RwLock<ResourceState<T>>>,
}

impl<T> Clone for ResourceHandle<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            state: self.state.clone(),
        }
    }
}

impl<T> fmt::Debug for ResourceHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceHandle")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<T: Clone> ResourceHandle<T> {
    /// Resource name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Copy of the full state
    #[must_use]
    pub fn snapshot(&self) -> ResourceState<T> {
        self.state.read().clone()
    }

    /// Copy of the held value
    #[must_use]
    pub fn data(&self) -> T {
        self.state.read().data.clone()
    }

    /// Inspect the held value without cloning it
    pub fn with_data<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.state.read().data)
    }

    /// Error from the most recent fetch
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.state.read().error.clone()
    }

    /// Whether a fetch is in flight
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.read().loading
    }

    /// Issue time of the request behind the held value
    #[must_use]
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.state.read().issued_at
    }

    /// Flag an error raised outside a poll, such as a rejected mutation
    ///
    /// The held value is untouched; the next successful fetch clears the flag.
    pub fn record_error(&self, message: impl Into<String>) {
        self.state.write().error = Some(message.into());
    }
}
