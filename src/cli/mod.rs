//! CLI module for the Risk Copilot API
//!
//! Provides subcommands for running the service:
//! - `serve`: run the HTTP API server
//! - `ingest`: build a policy index snapshot from a document directory

pub mod ingest;
pub mod serve;

use clap::{Parser, Subcommand};

/// Risk Copilot API - Grounded Q&A over risk and compliance policy documents
#[derive(Parser)]
#[command(name = "risk-copilot-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the API server
    Serve,

    /// Build a policy index snapshot from a directory of documents
    Ingest(ingest::IngestArgs),
}
