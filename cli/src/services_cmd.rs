//! `station services list|create|delete`.

use anyhow::bail;
use clap::{Parser, Subcommand};
use station_common::StationConfig;
use station_console::views::{CreateServiceView, ServiceListView};
use station_console::{DeleteOutcome, Route};

use crate::{GlobalArgs, Session, terminal};

#[derive(Debug, Parser)]
pub struct ServicesCli {
    #[command(subcommand)]
    pub command: ServicesSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum ServicesSubcommand {
    /// List the services of a project; without `--project`, list the
    /// projects to pick from.
    List(ListServicesArgs),
    /// Create a service, then show the project's services.
    Create(CreateServiceArgs),
    /// Delete a service of a project.
    Delete(DeleteServiceArgs),
}

#[derive(Debug, Parser)]
pub struct ListServicesArgs {
    /// Project id.
    #[arg(long = "project", short = 'p')]
    pub project: Option<String>,
}

#[derive(Debug, Parser)]
pub struct CreateServiceArgs {
    /// Project id.
    #[arg(long = "project", short = 'p')]
    pub project: Option<String>,

    /// Service name.
    #[arg(long = "name", short = 'n')]
    pub name: Option<String>,

    /// Source: repo, docker or empty.
    #[arg(long = "type", short = 't', default_value = "empty")]
    pub kind: String,

    /// Environment id; every environment when omitted.
    #[arg(long = "environment", short = 'e')]
    pub environment: Option<String>,

    /// Repository URL for `--type repo`.
    #[arg(long = "repo")]
    pub repo: Option<String>,

    /// Branch for `--type repo`.
    #[arg(long = "branch")]
    pub branch: Option<String>,

    /// Image for `--type docker`.
    #[arg(long = "image")]
    pub image: Option<String>,
}

#[derive(Debug, Parser)]
pub struct DeleteServiceArgs {
    /// Project the service belongs to.
    #[arg(long = "project", short = 'p')]
    pub project: String,

    /// Service id.
    pub id: String,
}

impl ServicesCli {
    pub async fn run(self, global: &GlobalArgs, config: &StationConfig) -> anyhow::Result<()> {
        match self.command {
            ServicesSubcommand::List(args) => {
                let route = Route::Services {
                    project_id: args.project.clone(),
                };
                let session = Session::connect(global, config, route)?;
                render_list(&session, args.project).await
            }
            ServicesSubcommand::Create(args) => {
                let session = Session::connect(global, config, Route::NewService)?;
                cmd_create(&session, args).await
            }
            ServicesSubcommand::Delete(args) => {
                let route = Route::Services {
                    project_id: Some(args.project.clone()),
                };
                let session = Session::connect(global, config, route)?;
                cmd_delete(&session, args).await
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Command implementations
// ─────────────────────────────────────────────────────────────────────────────

async fn mount_list(
    session: &Session,
    project_id: Option<String>,
) -> anyhow::Result<ServiceListView> {
    let initial_projects = session.initial_projects().await;
    let initial_project = match &project_id {
        Some(id) => session.initial_project(id).await,
        None => None,
    };
    Ok(ServiceListView::mount(
        &session.console,
        project_id,
        initial_projects,
        initial_project,
    )?)
}

pub(crate) async fn render_list(session: &Session, project_id: Option<String>) -> anyhow::Result<()> {
    let mut view = mount_list(session, project_id).await?;
    let model = view.settled().await?;
    terminal::print_services(&model);
    terminal::flush_notifications(&session.console);
    if let Some(error) = model.error {
        bail!(error);
    }
    Ok(())
}

async fn cmd_create(session: &Session, args: CreateServiceArgs) -> anyhow::Result<()> {
    let initial = session.initial_projects().await;
    let mut view = CreateServiceView::mount(&session.console, initial)?;

    if let Some(project) = &args.project {
        view.select_project(project)?;
        let environments = view.environments_settled().await?;
        if let Some(environment) = &args.environment
            && !environments.iter().any(|option| option.value == *environment)
        {
            bail!("project {project} has no environment {environment}");
        }
    }

    {
        let mut form = view.form().lock();
        form.set_field("name", args.name.unwrap_or_default())?;
        form.set_field("type", args.kind)?;
        form.set_field("environmentId", args.environment.unwrap_or_default())?;
        if let Some(repo) = args.repo {
            form.set_field("repoUrl", repo)?;
        }
        if let Some(branch) = args.branch {
            form.set_field("repoBranch", branch)?;
        }
        if let Some(image) = args.image {
            form.set_field("dockerImage", image)?;
        }
    }

    let mut routes = session.console.navigator().subscribe();
    match view.submit().await {
        Ok(service) => {
            terminal::flush_notifications(&session.console);
            println!("{}", service.id);
        }
        Err(error) => {
            terminal::report_submit_error(view.form(), &error);
            terminal::flush_notifications(&session.console);
            return Err(error.into());
        }
    }

    let route = session.follow_redirect(&mut routes).await?;
    session.render(&route).await
}

async fn cmd_delete(session: &Session, args: DeleteServiceArgs) -> anyhow::Result<()> {
    let mut view = mount_list(session, Some(args.project)).await?;
    view.settled().await?;

    let outcome = view.delete(&args.id).await;
    terminal::flush_notifications(&session.console);
    match outcome {
        DeleteOutcome::Deleted => {
            let model = view.settled().await?;
            terminal::print_services(&model);
            Ok(())
        }
        DeleteOutcome::Cancelled => {
            eprintln!("Cancelled.");
            Ok(())
        }
        DeleteOutcome::Failed { message } => bail!(message),
    }
}
