use async_trait::async_trait;
use owo_colors::OwoColorize;
use station_console::views::{
    EmptyState, ListContent, ProjectListModel, SelectorModel, ServiceListContent,
    ServiceListModel,
};
use station_console::{Confirm, ConfirmPrompt, Console, ConsoleError, Level, Route};
use station_form::{FormHandle, SubmitRejected};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Asks on stderr and reads the answer from stdin. Anything but `y`/`yes`
/// declines.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalConfirm;

#[async_trait]
impl Confirm for TerminalConfirm {
    async fn confirm(&self, prompt: &ConfirmPrompt) -> bool {
        eprintln!("{}", prompt.title.bold());
        eprintln!("{}", prompt.message);
        eprint!(
            "{} / {} [y/N] ",
            prompt.confirm_label.red(),
            prompt.cancel_label
        );

        let mut answer = String::new();
        match BufReader::new(tokio::io::stdin()).read_line(&mut answer).await {
            Ok(_) => is_yes(&answer),
            Err(e) => {
                tracing::warn!("reading confirmation failed: {e}");
                false
            }
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Print and clear pending notifications.
pub(crate) fn flush_notifications(console: &Console) {
    for notification in console.notifications().drain() {
        match notification.level {
            Level::Success => eprintln!("{} {}", "✔".green(), notification.message),
            Level::Error => eprintln!("{} {}", "✘".red(), notification.message.red()),
            Level::Info => eprintln!("{} {}", "•".blue(), notification.message),
        }
    }
}

/// Field and form errors left on `form` by a failed submit.
pub(crate) fn report_submit_error(form: &FormHandle, error: &ConsoleError) {
    let form = form.lock();
    if let ConsoleError::Rejected(SubmitRejected::Invalid { fields }) = error {
        for field in fields {
            if let Some(reason) = form.error(field) {
                eprintln!("  {}: {}", field.bold(), reason.red());
            }
        }
    }
    for message in form.form_errors() {
        eprintln!("{} {}", "✘".red(), message.red());
    }
}

/// The command that opens `route`.
pub(crate) fn command_for(route: &Route) -> String {
    match route {
        Route::Projects => "station projects list".to_string(),
        Route::NewProject => "station projects create --name <NAME>".to_string(),
        Route::Services { project_id: Some(id) } => format!("station services list --project {id}"),
        Route::Services { project_id: None } => "station services list --project <ID>".to_string(),
        Route::NewService => "station services create --project <ID> --name <NAME>".to_string(),
    }
}

fn print_empty(empty: &EmptyState) {
    if let Some(title) = empty.title {
        println!("{}", title.bold());
    }
    println!("{}", empty.description.dimmed());
    println!("{} {}: {}", "→".cyan(), empty.action_label, command_for(&empty.action));
}

fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }
    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    println!("{}", line(headers.to_vec()).bold());
    for row in rows {
        println!("{}", line(row.iter().map(String::as_str).collect()));
    }
}

fn print_error(error: Option<&String>) {
    if let Some(error) = error {
        eprintln!("{} {}", "✘".red(), error.red());
    }
}

pub(crate) fn print_projects(model: &ProjectListModel) {
    println!("{}", model.title.bold());
    match &model.content {
        ListContent::Loading => println!("{}", "Loading…".dimmed()),
        ListContent::Empty(empty) => print_empty(empty),
        ListContent::Items(rows) => {
            let rows: Vec<Vec<String>> = rows
                .iter()
                .map(|row| {
                    vec![
                        row.name.clone(),
                        row.visibility.label().to_string(),
                        row.team.clone(),
                        row.subscription.clone().unwrap_or_default(),
                        row.created_at.clone().unwrap_or_default(),
                        row.id.clone(),
                        row.link.clone(),
                    ]
                })
                .collect();
            print_table(
                &["NAME", "VISIBILITY", "TEAM", "PLAN", "CREATED", "ID", "LINK"],
                &rows,
            );
        }
    }
    print_error(model.error.as_ref());
}

fn print_selector(selector: &SelectorModel) {
    match selector {
        SelectorModel::Loading => println!("{}", "Loading…".dimmed()),
        SelectorModel::Options { selected, options } => {
            for option in options {
                let marker = if selected.as_deref() == Some(option.value.as_str()) {
                    "*"
                } else {
                    " "
                };
                println!("{marker} {} {}", option.label, option.value.dimmed());
            }
        }
        SelectorModel::CreateProject { label, route } => {
            println!("{} {label}: {}", "→".cyan(), command_for(route));
        }
    }
}

pub(crate) fn print_services(model: &ServiceListModel) {
    println!("{}", model.title.bold());
    match &model.content {
        ServiceListContent::NoSelection { prompt } => {
            println!("{}", prompt.dimmed());
            print_selector(&model.selector);
        }
        ServiceListContent::Loading => println!("{}", "Loading…".dimmed()),
        ServiceListContent::Empty(empty) => print_empty(empty),
        ServiceListContent::Cards(cards) => {
            let rows: Vec<Vec<String>> = cards
                .iter()
                .map(|card| vec![card.label.clone(), card.id.clone(), card.link.clone()])
                .collect();
            print_table(&["NAME", "ID", "LINK"], &rows);
        }
    }
    print_error(model.error.as_ref());
}
