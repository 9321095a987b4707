// tests/integration/main.rs
#[path = "../common/mod.rs"]
mod common;

mod azure_client;
mod config_registry;
mod pipeline;
