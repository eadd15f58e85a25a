//! Configuration and CLI handling

pub mod cli;
pub mod drops;
pub mod settings;

pub use cli::Cli;
pub use drops::{load_drops_file, DropPoint};
pub use settings::Settings;
