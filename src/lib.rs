//! A personal expense tracker that keeps a local mirror of a remote expense collection and keeps
//! the rendered list and chart consistent with it.

pub mod aggregate;
mod api;
pub mod args;
pub mod cache;
pub mod commands;
mod config;
mod error;
pub mod filter;
pub mod model;
pub mod render;
mod utils;
pub mod view;

#[cfg(test)]
mod test;

pub use api::{remote, Mode, Remote, TestRemote, TestRemoteState, TEST_MODE_VAR};
pub use config::Config;
pub use error::{Error, Failure, FailureKind, IntoOutcome, Outcome, Result};
pub use render::TerminalRenderer;
pub use view::{EditForm, Renderer, Tracker};
