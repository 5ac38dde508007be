use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "duet")]
#[command(
    about = "Answer questions with a retriever and a responder taking turns",
    long_about = None
)]
pub struct Cli {
    /// Export spans to this OTLP collector, e.g. http://localhost:4317
    #[arg(long, global = true)]
    pub otlp_endpoint: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the pipeline once for a query
    Ask {
        query: String,

        /// Maximum role invocations (0 means the default of 4)
        #[arg(short, long)]
        max_turns: Option<u32>,

        /// TOML file of [[tips]] tables
        #[arg(short, long)]
        tips: Option<PathBuf>,

        /// Use scripted models instead of Azure AI
        #[arg(long)]
        offline: bool,

        /// Request streamed model responses
        #[arg(long)]
        stream: bool,
    },

    /// Run the pipeline interactively, one query per line
    Console {
        #[arg(short, long)]
        max_turns: Option<u32>,

        #[arg(short, long)]
        tips: Option<PathBuf>,

        #[arg(long)]
        offline: bool,

        #[arg(long)]
        stream: bool,
    },

    /// Print the tip store, or the tips retrieved for a query
    Tips {
        query: Option<String>,

        #[arg(short, long)]
        tips: Option<PathBuf>,
    },
}
