pub mod agent;
pub mod chat;
pub mod main;
pub mod system;
pub mod utils;

pub use main::Config;
