pub mod commands;
pub mod config;
pub mod css;
pub mod defaults;
pub mod error;
pub mod factory;
pub mod identity;
pub mod migrate;
pub mod model;
pub mod output;
pub mod registry;
pub mod store;
pub mod telemetry;
pub mod version;
