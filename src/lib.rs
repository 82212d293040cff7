pub mod config;
pub mod error;
pub mod keycount;
pub mod output;
pub mod parser;
pub mod stats;
pub mod trends;
