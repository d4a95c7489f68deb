pub mod app;
pub mod chart;
pub mod client;
pub mod config;
pub mod controller;
pub mod dates;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod pages;
pub mod range;
pub mod series;
pub mod state;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use controller::SummaryController;
pub use pages::PageSessions;
pub use state::AppState;
