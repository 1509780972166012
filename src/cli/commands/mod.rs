//! CLI command implementations.

mod config;
mod convert;
mod doctor;
mod history;
mod search;
mod serve;
mod url;

pub use config::run_config;
pub use convert::run_convert;
pub use doctor::run_doctor;
pub use history::run_history;
pub use search::run_search;
pub use serve::run_serve;
pub use url::run_url;
