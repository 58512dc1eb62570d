use clap::{Parser, Subcommand, ValueHint};
use std::path::PathBuf;

#[derive(Parser)]
#[command(about, version, name = "vivo")]
/// VIVO ingest and query command line tool
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Load an RDF file through the admin upload form
    ///
    /// Going through the web interface keeps reasoning and search
    /// indexing in the loop, unlike writing to the triple store directly.
    Add {
        /// File to load
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Serialization format token the upload form understands
        #[arg(long, default_value = "N3")]
        format: String,
        /// Load into this named graph instead of the main store
        #[arg(long, value_hint = ValueHint::Url)]
        graph: Option<String>,
    },
    /// Remove the statements of an RDF file from the store
    Remove {
        /// File holding the statements to remove
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Serialization format token the upload form understands
        #[arg(long, default_value = "N3")]
        format: String,
    },
    /// Ask the instance to recompute its inferences
    ///
    /// The instance recomputes in the background; this command does not
    /// wait for completion.
    Recompute,
    /// Ask the instance to rebuild its search index
    Rebuild,
    /// Merge two individuals, keeping the primary label of the first
    Merge {
        /// URI of the individual to keep
        #[arg(long, value_hint = ValueHint::Url)]
        uri1: String,
        /// URI of the individual to fold into the first
        #[arg(long, value_hint = ValueHint::Url)]
        uri2: String,
    },
    /// Run a SELECT query and save the results as CSV
    Query {
        /// SPARQL query text
        #[arg(short, long)]
        query: String,
        /// File the CSV rows are written to
        #[arg(short, long, default_value = "results.csv", value_hint = ValueHint::FilePath)]
        out: PathBuf,
    },
}
