#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub(crate) mod api;
pub mod app;
pub mod classifier;
pub(crate) mod clients;
pub mod config;
pub mod language;
pub mod observability;
pub mod pipeline;
pub mod util;
