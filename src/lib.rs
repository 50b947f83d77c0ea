#[macro_use]
extern crate tracing;

pub mod auth;
pub mod clubs;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod events;
pub mod extract;
pub mod messages;
pub mod polls;
pub mod startup;

pub use config::Config;
pub use error::ClubError;
pub use startup::{AppState, build_router};
