//! Client toolkit for [VIVO](https://vivoweb.org/) / Vitro instances.
//!
//! Talks to a running instance through its administrative web endpoints
//! and built-in SPARQL query interface: authenticating, submitting and
//! removing RDF documents, running templated queries, and post-processing
//! results into graphs or tabular output. Everything is synchronous
//! blocking I/O; a hung remote call blocks the caller.
//!
//! The crate is organized around a few small pieces:
//!
//! - [`namespaces::NamespaceRegistry`] - the write-once prefix table
//! - [`template`] - placeholder substitution for query templates
//! - [`graph::LocalGraph`] - a local graph bound to the registry and a
//!   [`graph::QueryEngine`] capability
//! - [`sparql::SparqlClient`] - templated queries against the remote
//!   query interface
//! - [`project`] - SELECT rows into ordered records and CSV
//! - [`session::Session`] / [`admin`] - the authenticated web session and
//!   the admin form submissions built on it
//!
//! # Example
//!
//! ```ignore
//! use vivo_client::{Bindings, SparqlClient};
//!
//! let mut client = SparqlClient::from_env()?;
//! client.login()?;
//! let bindings = Bindings::from([(
//!     "subject".to_owned(),
//!     "<http://vivo.school.edu/individual/place-1>".to_owned(),
//! )]);
//! client.set_templated_query("DESCRIBE ?subject", &bindings);
//! let graph = client.results_graph()?;
//! client.logout()?;
//! ```

pub mod admin;
pub mod error;
pub mod graph;
pub mod namespaces;
pub mod project;
pub mod session;
pub mod sparql;
pub mod template;

pub use crate::error::ClientError;
pub use crate::graph::{EngineError, LocalGraph, QueryEngine};
pub use crate::namespaces::{DuplicatePrefixError, NamespaceRegistry, PrefixStyle};
pub use crate::project::{project, select_fields, write_csv, Record};
pub use crate::session::{ClientConfig, Session};
pub use crate::sparql::{ResultShape, SelectResults, SparqlClient};
pub use crate::template::{substitute, substitute_with_prefixes, Bindings};

/// Re-exported RDF data model types.
pub mod model {
    pub use oxrdf::{
        BlankNode, Graph, Literal, NamedNode, NamedNodeRef, Subject, Term, Triple, TripleRef,
        Variable,
    };
    pub use oxrdfio::RdfFormat;
    pub use sparesults::QuerySolution;
}
