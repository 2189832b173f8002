//! Concrete [`tournament_core::ports::provider::ProviderPort`] adapter over
//! the Challonge v1 REST API (spec.md §4.1, §7), grounded on the teacher's
//! `db_postgres` crate: a thin struct over a pooled/reusable client, one
//! `#[instrument]`'d method per port operation, and a boundary that
//! translates the backend's error vocabulary (HTTP status codes here,
//! Postgres error kinds there) into [`tournament_core::errors::ProviderError`].

mod client;
mod config;
mod wire;

pub use client::ChallongeProvider;
pub use config::ChallongeConfig;
