pub mod alert;
pub mod auth;
pub mod config;
pub mod demo_analyst;
pub mod error;
pub mod export;
pub mod gemini;
pub mod http_client;
pub mod logging;
pub mod normalize;
pub mod orchestrator;
pub mod provider;
pub mod report;
pub mod risk;
pub mod state;
pub mod store;
pub mod view;
