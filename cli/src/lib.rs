//! `station`: list, create and delete projects and services from a
//! terminal, or run the passthrough server.
//!
//! Every command drives the same views a graphical console would: it
//! mounts a view against a fresh [`Console`], waits for its data, and prints
//! the rendered model. Create commands follow the deferred redirect and
//! then print the destination view.

mod projects_cmd;
mod serve_cmd;
mod services_cmd;
mod terminal;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use station_cache::CacheConfig;
use station_client::{GraphqlClient, LoaderClient};
use station_common::{ConfigLoader, StationConfig};
use station_console::{AutoConfirm, Console, Route, Settings};
use station_protocol::operations::{ListProjectsData, ReadProjectData};
use tokio::sync::watch;

pub use projects_cmd::{CreateProjectArgs, DeleteProjectArgs, ProjectsCli, ProjectsSubcommand};
pub use serve_cmd::ServeArgs;
pub use services_cmd::{
    CreateServiceArgs, DeleteServiceArgs, ListServicesArgs, ServicesCli, ServicesSubcommand,
};
pub use terminal::TerminalConfirm;

/// Extra wait on top of the redirect delay before giving up on it.
const REDIRECT_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Parser)]
#[command(name = "station", version, about = "Manage projects and services of an infrastructure account")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Config file to read instead of `$STATION_HOME/config.toml`.
    #[arg(long = "config", global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Go through a station-server at this URL; its loaders seed the views
    /// and it holds the credential.
    #[arg(long = "server", global = true, value_name = "URL")]
    pub server: Option<String>,

    /// GraphQL endpoint to call directly.
    #[arg(long = "endpoint", global = true, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Answer yes to every confirmation prompt.
    #[arg(long = "yes", short = 'y', global = true)]
    pub yes: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List, create and delete projects.
    Projects(ProjectsCli),
    /// List, create and delete the services of a project.
    Services(ServicesCli),
    /// Run the HTTP passthrough server.
    Serve(ServeArgs),
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli.global)?;
    match cli.command {
        Command::Projects(cmd) => cmd.run(&cli.global, &config).await,
        Command::Services(cmd) => cmd.run(&cli.global, &config).await,
        Command::Serve(args) => serve_cmd::run(args, &config).await,
    }
}

fn load_config(global: &GlobalArgs) -> anyhow::Result<StationConfig> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &global.config {
        loader = loader.with_config_file(path);
    }
    let mut config = loader.load().context("loading configuration")?;
    if let Some(endpoint) = &global.endpoint {
        config.endpoint = endpoint.clone();
    }
    Ok(config)
}

// ─────────────────────────────────────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────────────────────────────────────

/// A started [`Console`] plus, with `--server`, the loader of that server.
pub(crate) struct Session {
    pub(crate) console: Console,
    loader: Option<LoaderClient>,
}

impl Session {
    pub(crate) fn connect(
        global: &GlobalArgs,
        config: &StationConfig,
        route: Route,
    ) -> anyhow::Result<Self> {
        let (client, loader) = match &global.server {
            Some(server) => {
                let loader = LoaderClient::new(server)?;
                let client = GraphqlClient::builder()
                    .endpoint(loader.graphql_endpoint()?.as_str())
                    .maybe_token(config.token.clone())
                    .build()?;
                (client, Some(loader))
            }
            None => (
                GraphqlClient::new(config.endpoint.as_str(), config.require_token()?)?,
                None,
            ),
        };
        tracing::debug!(endpoint = %client.endpoint(), "connecting");

        let builder = Console::builder(client)
            .cache_config(CacheConfig {
                stale_time: config.stale_time(),
                gc_time: config.gc_time(),
            })
            .settings(Settings {
                dashboard_url: config.dashboard_url.clone(),
                redirect_delay: config.redirect_delay(),
            })
            .initial_route(route);
        let console = if global.yes {
            builder.confirm(AutoConfirm(true)).build()
        } else {
            builder.confirm(TerminalConfirm).build()
        };
        console.start();

        Ok(Self { console, loader })
    }

    /// Server-computed project list, when talking to a server.
    pub(crate) async fn initial_projects(&self) -> Option<ListProjectsData> {
        let loader = self.loader.as_ref()?;
        loader
            .projects()
            .await
            .inspect_err(|e| tracing::warn!("projects loader failed, fetching instead: {e}"))
            .ok()
    }

    pub(crate) async fn initial_project(&self, id: &str) -> Option<ReadProjectData> {
        let loader = self.loader.as_ref()?;
        loader
            .project(id)
            .await
            .inspect_err(|e| tracing::warn!(project = id, "project loader failed: {e}"))
            .ok()
    }

    /// Wait for the deferred navigation scheduled by a create command.
    pub(crate) async fn follow_redirect(
        &self,
        routes: &mut watch::Receiver<Route>,
    ) -> anyhow::Result<Route> {
        let wait = self.console.settings().redirect_delay + REDIRECT_GRACE;
        tokio::time::timeout(wait, routes.changed())
            .await
            .context("no redirect after create")?
            .context("navigator closed")?;
        let route = routes.borrow_and_update().clone();
        tracing::debug!(%route, "redirected");
        Ok(route)
    }

    /// Print the view a route points at.
    pub(crate) async fn render(&self, route: &Route) -> anyhow::Result<()> {
        match route {
            Route::Projects | Route::NewProject => projects_cmd::render_list(self).await,
            Route::Services { project_id } => {
                services_cmd::render_list(self, project_id.clone()).await
            }
            Route::NewService => services_cmd::render_list(self, None).await,
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.console.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn global_flags_are_accepted_after_the_subcommand() {
        let cli = Cli::try_parse_from([
            "station",
            "projects",
            "delete",
            "p1",
            "--yes",
            "--endpoint",
            "http://localhost:4000/graphql",
        ])
        .unwrap_or_else(|e| panic!("{e}"));

        assert!(cli.global.yes);
        assert_eq!(
            cli.global.endpoint.as_deref(),
            Some("http://localhost:4000/graphql")
        );
        let Command::Projects(ProjectsCli {
            command: ProjectsSubcommand::Delete(args),
        }) = cli.command
        else {
            panic!("expected projects delete");
        };
        assert_eq!(args.id, "p1");
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
