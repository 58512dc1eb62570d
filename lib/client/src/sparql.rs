//! Remote SPARQL queries against the built-in VIVO query interface.
//!
//! The `admin/sparqlquery` endpoint requires the expected result encodings
//! to be declared up front, through the `resultFormat` (row-shaped results)
//! and `rdfResultFormat` (graph-shaped results) parameters, and it does not
//! honor the web session's cookie jar, so the captured login cookies are
//! attached as an explicit `Cookie` header on every query request.
//!
//! Because the endpoint cannot be asked what kind of query it is about to
//! run, [`SparqlClient::set_query`] classifies the query text client-side
//! by substring sniffing; see [`ResultShape`].

use crate::error::ClientError;
use crate::namespaces::NamespaceRegistry;
use crate::session::Session;
use crate::template::{substitute_with_prefixes, Bindings};
use oxrdf::{Graph, Triple, Variable};
use oxrdfio::{RdfFormat, RdfParser};
use sparesults::{
    QueryResultsFormat, QueryResultsParser, QuerySolution, ReaderQueryResultsParserOutput,
};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Path of the built-in SPARQL query interface, relative to the base URL.
pub const QUERY_PATH: &str = "admin/sparqlquery";

const ROW_FORMAT_PARAM: &str = "resultFormat";
const GRAPH_FORMAT_PARAM: &str = "rdfResultFormat";
/// Row-shaped results are requested as SPARQL results JSON. The instance
/// serves them with an `application/javascript` content type, which is why
/// the body is parsed by declared format instead of by content type.
const ROW_FORMAT: &str = "RS_JSON";
/// Graph-shaped results are requested as N3.
const GRAPH_FORMAT: &str = "N3";
/// The vendor-specific tabular mode used by [`SparqlClient::results_csv`].
const CSV_FORMAT: &str = "vitro:csv";

/// The result shape a query was classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultShape {
    /// SELECT: an ordered sequence of variable bindings.
    Rows,
    /// CONSTRUCT or DESCRIBE: an RDF graph.
    Graph,
}

/// Classifies query text by case-insensitive substring search.
///
/// `construct` and `describe` win over `select` when both appear; text
/// containing none of the three yields `None`, leaving any previously
/// declared shape in effect.
fn sniff_result_shape(query: &str) -> Option<ResultShape> {
    let lower = query.to_lowercase();
    if lower.contains("construct") || lower.contains("describe") {
        Some(ResultShape::Graph)
    } else if lower.contains("select") {
        Some(ResultShape::Rows)
    } else {
        None
    }
}

/// Maps a query endpoint response onto the error taxonomy.
fn classify(status: u16, body: String) -> Result<String, ClientError> {
    match status {
        400 => Err(ClientError::MalformedQuery),
        404 => Err(ClientError::EndpointNotFound),
        500 => Err(ClientError::EndpointInternal(body)),
        200..=299 => Ok(body),
        _ => Err(ClientError::Remote { status, body }),
    }
}

/// Parses an N3 response body into a freshly allocated graph.
///
/// The data subset the endpoint emits is Turtle, so the Turtle parser
/// covers it.
fn parse_graph_body(body: &str) -> Result<Graph, ClientError> {
    let mut graph = Graph::new();
    for quad in RdfParser::from_format(RdfFormat::Turtle).for_reader(body.as_bytes()) {
        let quad = quad?;
        graph.insert(&Triple::new(quad.subject, quad.predicate, quad.object));
    }
    Ok(graph)
}

/// SELECT results: the declared variables and the rows, in response order.
#[derive(Debug, Default)]
pub struct SelectResults {
    /// Variables named in the query's SELECT clause, in declaration order.
    pub variables: Vec<Variable>,
    /// One solution per result row.
    pub rows: Vec<QuerySolution>,
}

fn parse_rows_body(body: &str) -> Result<SelectResults, ClientError> {
    let parser = QueryResultsParser::from_format(QueryResultsFormat::Json);
    match parser.for_reader(body.as_bytes())? {
        ReaderQueryResultsParserOutput::Solutions(solutions) => {
            let variables = solutions.variables().to_vec();
            let rows = solutions.collect::<Result<Vec<_>, _>>()?;
            Ok(SelectResults { variables, rows })
        }
        ReaderQueryResultsParserOutput::Boolean(value) => {
            // ASK answers have no row form; surface them as empty results.
            warn!("boolean result {value} has no rows");
            Ok(SelectResults::default())
        }
    }
}

fn copy_csv<W: Write>(body: &str, writer: W) -> Result<(), ClientError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body.as_bytes());
    let mut out = csv::Writer::from_writer(writer);
    for record in reader.records() {
        out.write_record(&record?)?;
    }
    out.flush()?;
    Ok(())
}

/// A client for the built-in SPARQL query interface.
///
/// Composes the authenticated [`Session`] capability with per-query state:
/// the current query text and the result shape it was sniffed into. One
/// client supports one caller; concurrent use needs independent
/// client/session pairs.
pub struct SparqlClient {
    session: Session,
    namespaces: Arc<NamespaceRegistry>,
    query: Option<String>,
    shape: ResultShape,
}

impl SparqlClient {
    /// Builds a client over an existing (possibly not yet logged in)
    /// session. The fresh client starts in the row-oriented shape, the
    /// endpoint's own default.
    pub fn new(session: Session, namespaces: Arc<NamespaceRegistry>) -> Self {
        Self {
            session,
            namespaces,
            query: None,
            shape: ResultShape::Rows,
        }
    }

    /// Builds a client from the `VIVO_URL`/`VIVO_USER`/`VIVO_PASS`
    /// environment, with the default namespace table.
    pub fn from_env() -> Result<Self, ClientError> {
        Ok(Self::new(
            Session::from_env()?,
            Arc::new(NamespaceRegistry::vivo_defaults()),
        ))
    }

    /// The underlying session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Logs in to the web interface.
    pub fn login(&mut self) -> Result<(), ClientError> {
        self.session.login()
    }

    /// Ends the web session.
    pub fn logout(&mut self) -> Result<(), ClientError> {
        self.session.logout()
    }

    /// The shape the current query was classified into.
    pub fn shape(&self) -> ResultShape {
        self.shape
    }

    /// Sets the query to execute, sniffing its result shape from the text.
    pub fn set_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        if let Some(shape) = sniff_result_shape(&query) {
            self.shape = shape;
        }
        self.query = Some(query);
    }

    /// Applies template substitution, prepends the registry's prefix
    /// block, and sets the resulting query.
    ///
    /// Unlike local queries through [`crate::graph::LocalGraph`], remote
    /// queries need the prefix declarations inline: the instance knows
    /// nothing about this client's registry.
    pub fn set_templated_query(&mut self, template: &str, bindings: &Bindings) {
        self.set_query(substitute_with_prefixes(template, bindings, &self.namespaces));
    }

    /// Executes the current query, returning the raw response body and
    /// the declared result shape.
    ///
    /// Transport failures map onto the error taxonomy: HTTP 400 is
    /// [`ClientError::MalformedQuery`], 404 [`ClientError::EndpointNotFound`],
    /// 500 [`ClientError::EndpointInternal`] with the response body, any
    /// other non-success [`ClientError::Remote`].
    pub fn execute(&self) -> Result<(String, ResultShape), ClientError> {
        let query = self.query.as_deref().ok_or(ClientError::NoQuery)?;
        debug!("executing remote query:\n{query}");
        let response = self.session.post_form(
            QUERY_PATH,
            &[
                ("query", query),
                (ROW_FORMAT_PARAM, ROW_FORMAT),
                (GRAPH_FORMAT_PARAM, GRAPH_FORMAT),
            ],
        )?;
        let status = response.status().as_u16();
        let body = classify(status, response.text()?)?;
        Ok((body, self.shape))
    }

    /// Executes the current query and parses the response into a new
    /// graph. Valid only after a CONSTRUCT or DESCRIBE query; otherwise
    /// fails with [`ClientError::NotAGraph`].
    pub fn results_graph(&self) -> Result<Graph, ClientError> {
        if self.shape != ResultShape::Graph {
            return Err(ClientError::NotAGraph);
        }
        let (body, _) = self.execute()?;
        parse_graph_body(&body)
    }

    /// Executes the current query and parses the response as SPARQL
    /// results JSON. Intended for SELECT queries; a graph-shaped body
    /// fails to parse.
    pub fn results_rows(&self) -> Result<SelectResults, ClientError> {
        let (body, _) = self.execute()?;
        parse_rows_body(&body)
    }

    /// Runs `query` in the vendor-specific CSV result mode and writes the
    /// rows to `destination`.
    ///
    /// The CSV format is requested per call; the client's sniffed shape
    /// and current query are left untouched, so later queries are
    /// unaffected by this convenience path.
    pub fn results_csv(
        &self,
        query: &str,
        destination: impl AsRef<Path>,
    ) -> Result<(), ClientError> {
        debug!("executing remote query in CSV mode:\n{query}");
        let response = self.session.post_form(
            QUERY_PATH,
            &[
                ("query", query),
                (ROW_FORMAT_PARAM, CSV_FORMAT),
                (GRAPH_FORMAT_PARAM, GRAPH_FORMAT),
            ],
        )?;
        let status = response.status().as_u16();
        let body = classify(status, response.text()?)?;
        copy_csv(&body, File::create(destination)?)
    }
}
