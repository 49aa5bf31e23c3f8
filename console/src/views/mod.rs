//! Render models and actions for each console screen.
//!
//! Views hold cache observers for the keys they display, so invalidations
//! refetch them while they are mounted.

mod create_project;
mod create_service;
mod projects;
mod selector;
mod services;

use chrono::{DateTime, Local, Utc};
use station_cache::Snapshot;

pub use create_project::{CreateProjectView, ENVIRONMENTS};
pub use create_service::{CreateServiceView, SERVICE_TYPES, ServiceTypeOption};
pub use projects::{ProjectListModel, ProjectListView, ProjectRow, Visibility};
pub use selector::{ProjectSelector, SelectOption, SelectorModel};
pub use services::{ServiceCard, ServiceListContent, ServiceListModel, ServiceListView};

use crate::Route;

/// Placeholder shown instead of an empty list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyState {
    pub title: Option<&'static str>,
    pub description: &'static str,
    pub action_label: &'static str,
    pub action: Route,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListContent<T> {
    /// First fetch still running.
    Loading,
    Empty(EmptyState),
    Items(Vec<T>),
}

/// Render `at` in the local timezone, month first like the web console.
pub fn local_timestamp(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local)
        .format("%-m/%-d/%Y, %-I:%M:%S %p")
        .to_string()
}

fn error_text<T>(snapshot: &Snapshot<T>) -> Option<String> {
    snapshot.error.as_ref().map(|error| error.to_string())
}
