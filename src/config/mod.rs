//! Configuration management
//!
//! - **persistent**: catalog overrides saved as JSON in the user config dir

pub mod persistent;

pub use persistent::Config;
