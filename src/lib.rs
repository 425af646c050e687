//! `lintrack` turns the result of a periodic repository scan into a single,
//! durable tracking issue, creating, refreshing or closing it as the scan
//! outcome changes between runs.

pub mod cli;
pub mod config;
pub mod error;
pub mod github;
pub mod reconcile;
pub mod ui;

pub use error::ReconcileError;
