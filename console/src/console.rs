use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use station_cache::{CacheConfig, QueryCache};
use station_client::GraphqlClient;
use tokio::task::JoinHandle;

use crate::confirm::{AutoConfirm, Confirm, ConfirmPrompt};
use crate::navigation::{Navigator, Route};
use crate::notifications::NotificationCenter;

/// Longest pause between garbage-collection sweeps.
const MAX_GC_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Base URL for project links.
    pub dashboard_url: String,
    /// Delay between a successful create and the redirect.
    pub redirect_delay: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dashboard_url: "https://railway.app".to_string(),
            redirect_delay: Duration::from_secs(3),
        }
    }
}

impl Settings {
    pub fn project_url(&self, project_id: &str) -> String {
        format!(
            "{}/project/{project_id}",
            self.dashboard_url.trim_end_matches('/')
        )
    }
}

struct Inner {
    client: GraphqlClient,
    cache: QueryCache,
    notifications: NotificationCenter,
    navigator: Navigator,
    confirm: Arc<dyn Confirm>,
    settings: Settings,
    gc_task: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(task) = self
            .gc_task
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            task.abort();
        }
    }
}

/// Application context shared by every view: transport, cache,
/// notifications, navigation and confirmation.
///
/// Cheap to clone; clones share everything.
#[derive(Clone)]
pub struct Console {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console")
            .field("endpoint", &self.inner.client.endpoint().as_str())
            .field("route", &self.inner.navigator.current())
            .finish_non_exhaustive()
    }
}

impl Console {
    pub fn builder(client: GraphqlClient) -> ConsoleBuilder {
        ConsoleBuilder {
            client,
            cache_config: CacheConfig::default(),
            confirm: None,
            settings: Settings::default(),
            initial_route: Route::Projects,
        }
    }

    pub fn client(&self) -> &GraphqlClient {
        &self.inner.client
    }

    pub fn cache(&self) -> &QueryCache {
        &self.inner.cache
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.inner.notifications
    }

    pub fn navigator(&self) -> &Navigator {
        &self.inner.navigator
    }

    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub async fn confirm(&self, prompt: &ConfirmPrompt) -> bool {
        self.inner.confirm.confirm(prompt).await
    }

    /// Start background maintenance (cache garbage collection). Idempotent.
    pub fn start(&self) {
        let mut task = self
            .inner
            .gc_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if task.is_none() {
            let every = self.inner.cache.config().gc_time.min(MAX_GC_INTERVAL);
            *task = Some(self.inner.cache.spawn_gc(every));
            tracing::debug!(?every, "console started");
        }
    }

    /// Stop background maintenance. In-flight fetches still complete.
    pub fn shutdown(&self) {
        if let Some(task) = self
            .inner
            .gc_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            task.abort();
            tracing::debug!("console stopped");
        }
    }
}

pub struct ConsoleBuilder {
    client: GraphqlClient,
    cache_config: CacheConfig,
    confirm: Option<Arc<dyn Confirm>>,
    settings: Settings,
    initial_route: Route,
}

impl ConsoleBuilder {
    pub fn cache_config(mut self, config: CacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    pub fn confirm(mut self, confirm: impl Confirm + 'static) -> Self {
        self.confirm = Some(Arc::new(confirm));
        self
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn initial_route(mut self, route: Route) -> Self {
        self.initial_route = route;
        self
    }

    /// Without an explicit [`Confirm`], destructive actions are declined.
    pub fn build(self) -> Console {
        Console {
            inner: Arc::new(Inner {
                client: self.client,
                cache: QueryCache::with_config(self.cache_config),
                notifications: NotificationCenter::new(),
                navigator: Navigator::new(self.initial_route),
                confirm: self.confirm.unwrap_or_else(|| Arc::new(AutoConfirm(false))),
                settings: self.settings,
                gc_task: Mutex::new(None),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn console() -> Console {
        let client = GraphqlClient::new("http://127.0.0.1:9/graphql", "token")
            .unwrap_or_else(|e| panic!("client: {e}"));
        Console::builder(client).build()
    }

    #[test]
    fn project_url_joins_dashboard_base() {
        let settings = Settings {
            dashboard_url: "https://railway.app/".to_string(),
            ..Settings::default()
        };
        assert_eq!(settings.project_url("p1"), "https://railway.app/project/p1");
    }

    #[tokio::test]
    async fn unconfigured_confirmation_declines() {
        let console = console();
        assert!(!console.confirm(&ConfirmPrompt::delete_project("api")).await);
    }

    #[tokio::test]
    async fn start_and_shutdown_are_idempotent() {
        let console = console();
        console.start();
        console.start();
        console.shutdown();
        console.shutdown();
    }
}
