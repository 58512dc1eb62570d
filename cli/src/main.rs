#![allow(clippy::print_stderr, reason = "command line tool")]
use crate::cli::{Args, Command};
use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use vivo_client::{admin, ClientConfig, NamespaceRegistry, Session, SparqlClient};

mod cli;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let matches = Args::parse();
    let config = ClientConfig::from_env()
        .context("VIVO_URL, VIVO_USER and VIVO_PASS must be set in the environment")?;
    match matches.command {
        Command::Add {
            file,
            format,
            graph,
        } => {
            let mut session = Session::new(config)?;
            session.login()?;
            match graph {
                Some(graph) => admin::add_rdf_to_named_graph(&session, &file, &graph, &format)
                    .with_context(|| format!("could not add {} to {graph}", file.display()))?,
                None => admin::add_rdf(&session, &file, &format)
                    .with_context(|| format!("could not add {}", file.display()))?,
            }
            eprintln!("Added {} to {}.", file.display(), session.base_url());
            session.logout()?;
        }
        Command::Remove { file, format } => {
            let mut session = Session::new(config)?;
            session.login()?;
            admin::remove_rdf(&session, &file, &format)
                .with_context(|| format!("could not remove {}", file.display()))?;
            eprintln!("Removed {} from {}.", file.display(), session.base_url());
            session.logout()?;
        }
        Command::Recompute => {
            let mut session = Session::new(config)?;
            session.login()?;
            admin::recompute_inferences(&session)
                .context("the recompute request was not acknowledged")?;
            eprintln!("Recompute of inferences started. See the VIVO log for details.");
            session.logout()?;
        }
        Command::Rebuild => {
            let mut session = Session::new(config)?;
            session.login()?;
            admin::rebuild_index(&session)
                .context("the index rebuild request was not acknowledged")?;
            eprintln!("Search index rebuild started. See the VIVO log for details.");
            session.logout()?;
        }
        Command::Merge { uri1, uri2 } => {
            let mut session = Session::new(config)?;
            session.login()?;
            admin::merge_individuals(&session, &uri1, &uri2)
                .with_context(|| format!("could not merge {uri2} into {uri1}"))?;
            eprintln!("Merged {uri2} into {uri1}.");
            session.logout()?;
        }
        Command::Query { query, out } => {
            let mut client = SparqlClient::new(
                Session::new(config)?,
                Arc::new(NamespaceRegistry::vivo_defaults()),
            );
            client.login()?;
            client
                .results_csv(&query, &out)
                .with_context(|| format!("could not write results to {}", out.display()))?;
            eprintln!("Wrote results to {}.", out.display());
            client.logout()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_cmd::Command as CliCommand;
    use predicates::prelude::*;

    #[test]
    fn clap_debug() {
        use clap::CommandFactory;

        Args::command().debug_assert();
    }

    #[test]
    fn cli_help() {
        CliCommand::cargo_bin("vivo")
            .unwrap()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("VIVO ingest and query"));
    }

    #[test]
    fn query_defaults_to_results_csv() {
        let args = Args::try_parse_from(["vivo", "query", "--query", "SELECT ?s WHERE {}"])
            .unwrap();
        match args.command {
            Command::Query { out, .. } => {
                assert_eq!(out, std::path::PathBuf::from("results.csv"));
            }
            _ => panic!("expected the query subcommand"),
        }
    }
}
