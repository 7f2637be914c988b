use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Ingest retail sales CSVs and explore them as an aggregated dashboard.
#[derive(Parser, Debug)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a new sales store in the local directory
    Init,

    /// Upload a sales CSV file into the store
    ///
    /// The file needs a header row with at least the columns
    ///
    ///     date,product,region,units_sold,revenue
    ///     2024-06-01,Widget A,East,10,100
    ///     2024-06-02,Widget B,West,5,50
    ///
    /// Extra columns are stored verbatim. A preview is shown first and
    /// nothing is persisted until the upload is confirmed.
    #[clap(verbatim_doc_comment)]
    Upload {
        /// Path to the sales CSV file
        file: PathBuf,
    },

    /// Print all stored sales records
    View,

    /// Show aggregated sales, filtered by region and product
    Dashboard,
}

pub fn parse() -> Args {
    Args::parse()
}
