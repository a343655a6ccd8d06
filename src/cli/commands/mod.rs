pub mod config;
pub mod lease;
pub mod logs;
pub mod sheltered;
