pub mod config;
pub mod search_data;
pub mod utils;
