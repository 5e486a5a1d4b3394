//! Command handlers -- one module per subcommand

pub mod config;
pub mod context;
pub mod scan;
