pub mod args;
pub mod cli;
pub mod dashboard;
pub mod ingest;
pub mod store;
pub mod terminal;
