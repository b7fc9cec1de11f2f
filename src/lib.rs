pub mod api_client;
pub mod config;
pub mod services;
pub mod session;
pub mod table_display;
pub mod ui;
pub mod utils;
