//! `station projects list|create|delete`.

use anyhow::bail;
use clap::{Parser, Subcommand};
use station_common::StationConfig;
use station_console::views::{CreateProjectView, ProjectListView};
use station_console::{DeleteOutcome, Route};

use crate::{GlobalArgs, Session, terminal};

#[derive(Debug, Parser)]
pub struct ProjectsCli {
    #[command(subcommand)]
    pub command: ProjectsSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum ProjectsSubcommand {
    /// List every project of the account.
    List,
    /// Create a project, then show the updated list.
    Create(CreateProjectArgs),
    /// Delete a project and everything in it.
    Delete(DeleteProjectArgs),
}

#[derive(Debug, Parser)]
pub struct CreateProjectArgs {
    /// Project name.
    #[arg(long = "name", short = 'n')]
    pub name: Option<String>,

    #[arg(long = "description", short = 'd')]
    pub description: Option<String>,

    /// Environment the project starts with: production, staging or
    /// development.
    #[arg(long = "environment", short = 'e', default_value = "production")]
    pub environment: String,

    /// Hide the project from people outside the team.
    #[arg(long = "private")]
    pub private: bool,
}

#[derive(Debug, Parser)]
pub struct DeleteProjectArgs {
    /// Project id.
    pub id: String,
}

impl ProjectsCli {
    pub async fn run(self, global: &GlobalArgs, config: &StationConfig) -> anyhow::Result<()> {
        match self.command {
            ProjectsSubcommand::List => {
                let session = Session::connect(global, config, Route::Projects)?;
                render_list(&session).await
            }
            ProjectsSubcommand::Create(args) => {
                let session = Session::connect(global, config, Route::NewProject)?;
                cmd_create(&session, args).await
            }
            ProjectsSubcommand::Delete(args) => {
                let session = Session::connect(global, config, Route::Projects)?;
                cmd_delete(&session, &args.id).await
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Command implementations
// ─────────────────────────────────────────────────────────────────────────────

pub(crate) async fn render_list(session: &Session) -> anyhow::Result<()> {
    let initial = session.initial_projects().await;
    let mut view = ProjectListView::mount(&session.console, initial)?;
    let model = view.settled().await?;
    terminal::print_projects(&model);
    terminal::flush_notifications(&session.console);
    if let Some(error) = model.error {
        bail!(error);
    }
    Ok(())
}

async fn cmd_create(session: &Session, args: CreateProjectArgs) -> anyhow::Result<()> {
    let view = CreateProjectView::new(&session.console);
    {
        let mut form = view.form().lock();
        form.set_field("name", args.name.unwrap_or_default())?;
        form.set_field("description", args.description.unwrap_or_default())?;
        form.set_field("environment", args.environment)?;
        form.set_field("private", args.private)?;
    }

    let mut routes = session.console.navigator().subscribe();
    match view.submit().await {
        Ok(project) => {
            terminal::flush_notifications(&session.console);
            println!("{}", project.id);
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

async fn cmd_delete(session: &Session, id: &str) -> anyhow::Result<()> {
    let initial = session.initial_projects().await;
    let mut view = ProjectListView::mount(&session.console, initial)?;
    // Settle first so the prompt can show the project's name.
    view.settled().await?;

    let outcome = view.delete(id).await;
    terminal::flush_notifications(&session.console);
    match outcome {
        DeleteOutcome::Deleted => {
            let model = view.settled().await?;
            terminal::print_projects(&model);
            Ok(())
        }
        DeleteOutcome::Cancelled => {
            eprintln!("Cancelled.");
            Ok(())
        }
        DeleteOutcome::Failed { message } => bail!(message),
    }
}
