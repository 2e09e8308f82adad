pub mod config;
pub mod observability;
pub mod server;

pub use config::AppConfig;
pub use server::{AppServices, GrantryServer, ServerBuilder, build_router, build_services};
