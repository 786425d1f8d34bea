#![warn(missing_docs)]
//! PermitMinder finds newly reported permit discharge exceedances in daily
//! snapshots and alerts the subscribers who monitor the affected permits.

pub mod cmd;
pub mod config;
pub mod engine;
pub mod http_client;
pub mod mailer;
pub mod models;
pub mod persistence;
pub mod producer;
pub mod test_helpers;
