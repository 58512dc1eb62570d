//! Error taxonomy for remote VIVO operations and local post-processing.
//!
//! Every remote or transport failure is raised immediately to the caller;
//! nothing in this crate retries, recovers or suppresses. Multi-step flows
//! (login, upload, logout) have no partial-failure semantics: a failure
//! leaves the session in whatever state the last successful step produced,
//! and the caller decides whether to log out on the failure path.

use oxrdf::IriParseError;
use oxrdfio::RdfParseError;
use sparesults::QueryResultsParseError;
use std::io;

/// An error raised by the VIVO client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The VIVO web interface rejected the login, or an action was
    /// answered with a redirect back to the login form.
    #[error("login to the VIVO web interface was rejected")]
    Authentication,
    /// The query endpoint answered HTTP 400.
    #[error("the endpoint rejected the query as malformed")]
    MalformedQuery,
    /// The query endpoint answered HTTP 404.
    #[error("the SPARQL query endpoint was not found")]
    EndpointNotFound,
    /// The query endpoint answered HTTP 500. Carries the response body
    /// for diagnostics.
    #[error("the endpoint failed internally: {0}")]
    EndpointInternal(String),
    /// Any other non-success response from a remote action.
    #[error("remote action failed with HTTP {status}: {body}")]
    Remote {
        /// HTTP status code of the response.
        status: u16,
        /// Response body text, possibly empty.
        body: String,
    },
    /// `execute` was called before any query was set.
    #[error("no query has been set")]
    NoQuery,
    /// A graph result was requested for a row-producing query.
    #[error("the current query does not produce a graph")]
    NotAGraph,
    /// A required environment variable is missing.
    #[error("missing environment variable {0}")]
    Config(&'static str),
    /// Transport-level failure.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    /// An RDF response or file payload could not be parsed.
    #[error(transparent)]
    RdfParse(#[from] RdfParseError),
    /// A SPARQL results document could not be parsed.
    #[error(transparent)]
    ResultsParse(#[from] QueryResultsParseError),
    /// A registered namespace IRI is not a valid IRI.
    #[error(transparent)]
    InvalidIri(#[from] IriParseError),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}
