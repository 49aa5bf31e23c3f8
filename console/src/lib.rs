//! View and mutation glue for the infrastructure console.
//!
//! A [`Console`] is created once per application and handed to every view.
//! Views read through its [`QueryCache`](station_cache::QueryCache), run
//! mutations through its client, and report back through notifications and
//! navigation. Front ends (the `station` CLI, a terminal UI) render the
//! models the views produce.

mod confirm;
mod console;
mod error;
pub mod keys;
mod mutation;
mod navigation;
mod notifications;
mod queries;
pub mod views;

pub use confirm::{AutoConfirm, Confirm, ConfirmPrompt};
pub use console::{Console, ConsoleBuilder, Settings};
pub use error::ConsoleError;
pub use mutation::DeleteOutcome;
pub use navigation::{Navigator, Route};
pub use notifications::{Level, Notification, NotificationCenter};
