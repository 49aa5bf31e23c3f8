use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Console locations. `Display` renders the path the web console used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Projects,
    NewProject,
    Services { project_id: Option<String> },
    NewService,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Projects => f.write_str("/projects"),
            Self::NewProject => f.write_str("/projects/new"),
            Self::Services { project_id: None } => f.write_str("/services"),
            Self::Services {
                project_id: Some(id),
            } => write!(f, "/services?projectId={id}"),
            Self::NewService => f.write_str("/services/new"),
        }
    }
}

impl FromStr for Route {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (path, query) = s.split_once('?').unwrap_or((s, ""));
        let project_id = query
            .split('&')
            .filter_map(|pair| pair.strip_prefix("projectId="))
            .find(|id| !id.is_empty())
            .map(str::to_string);

        match path.trim_end_matches('/') {
            "" | "/projects" => Ok(Self::Projects),
            "/projects/new" => Ok(Self::NewProject),
            "/services" => Ok(Self::Services { project_id }),
            "/services/new" => Ok(Self::NewService),
            other => Err(format!("unknown route `{other}`")),
        }
    }
}

/// Current location plus a change feed for front ends.
#[derive(Debug, Clone)]
pub struct Navigator {
    tx: Arc<watch::Sender<Route>>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::Projects)
    }
}

impl Navigator {
    pub fn new(initial: Route) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn current(&self) -> Route {
        self.tx.borrow().clone()
    }

    pub fn navigate(&self, route: Route) {
        tracing::debug!(%route, "navigating");
        self.tx.send_replace(route);
    }

    /// Navigate once `delay` has passed. Must be called within a tokio
    /// runtime.
    pub fn navigate_after(&self, route: Route, delay: Duration) -> JoinHandle<()> {
        let navigator = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            navigator.navigate(route);
        })
    }

    /// Receiver whose `changed()` resolves on the next navigation.
    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.tx.subscribe()
    }
}
