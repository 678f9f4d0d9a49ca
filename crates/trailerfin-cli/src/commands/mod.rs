pub mod clear;
pub mod config;
pub mod monitor;
pub mod prompts;
pub mod purge;
pub mod scan;
pub mod scan_ui;
pub mod schedule;
pub mod setup;
pub mod status;
pub mod table;
