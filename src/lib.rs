//! Echo Bot — keyword reply classifier behind a channel endpoint.

pub mod activity;
pub mod adapter;
pub mod bot;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod connector;
pub mod error;
pub mod server;
