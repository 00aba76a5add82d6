// ABOUTME: Library crate for simple-tracker exposing the ticket wizard for the CLI and tests

#![allow(missing_docs)]

pub mod api;
pub mod audit;
pub mod clock;
pub mod config;
pub mod models;
pub mod notifications;
pub mod runtime;
pub mod storage;
pub mod wizard;
