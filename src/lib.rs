pub mod api;
pub mod cli;
pub mod config;
pub mod indexer;
pub mod search;
pub mod source;
pub mod state;
pub mod utils;
