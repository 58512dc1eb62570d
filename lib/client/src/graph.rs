//! A locally managed RDF graph bound to the namespace registry.
//!
//! [`LocalGraph`] composes three things: an [`oxrdf::Graph`] holding the
//! triples, the shared [`NamespaceRegistry`] used for parsing and
//! serialization, and a [`QueryEngine`] capability that evaluates SPARQL
//! against the graph. The engine is an external collaborator; this crate
//! does not evaluate SPARQL itself.

use crate::error::ClientError;
use crate::namespaces::NamespaceRegistry;
use crate::template::{substitute, Bindings};
use oxrdf::{Graph, Triple};
use oxrdfio::{RdfFormat, RdfParser, RdfSerializer};
use sparesults::QuerySolution;
use std::io::Write;
use std::sync::Arc;
use tracing::debug;

/// Error reported by the underlying SPARQL evaluator.
///
/// Malformed query text is not detected locally; it surfaces here once the
/// engine rejects it.
#[derive(Debug, thiserror::Error)]
#[error("query evaluation failed: {0}")]
pub struct EngineError(Box<dyn std::error::Error + Send + Sync>);

impl EngineError {
    /// Wraps an engine-specific error.
    pub fn new(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self(error.into())
    }
}

/// SPARQL evaluation capability over an in-memory graph.
///
/// Implementations are supplied by the caller; the facade only forwards
/// prepared query text and never retries or interprets engine failures.
pub trait QueryEngine {
    /// Evaluates a SELECT query against `graph`, returning the engine's
    /// rows unmodified, in engine-determined order.
    fn select(&self, graph: &Graph, query: &str) -> Result<Vec<QuerySolution>, EngineError>;

    /// Evaluates a CONSTRUCT or DESCRIBE query against `graph`. `None`
    /// means the engine reported an empty or absent result graph.
    fn construct(&self, graph: &Graph, query: &str) -> Result<Option<Vec<Triple>>, EngineError>;
}

/// An RDF graph permanently bound to a namespace registry and a query
/// engine at construction.
///
/// `select` returns the engine's rows as-is; `construct` always allocates
/// a fresh, independently owned graph carrying the same namespace bindings,
/// so CONSTRUCT results compose with other graphs without aliasing. The
/// source graph is never mutated by either operation.
#[derive(Clone)]
pub struct LocalGraph {
    graph: Graph,
    namespaces: Arc<NamespaceRegistry>,
    engine: Arc<dyn QueryEngine>,
}

impl LocalGraph {
    /// Creates an empty graph bound to `namespaces` and `engine`.
    pub fn new(namespaces: Arc<NamespaceRegistry>, engine: Arc<dyn QueryEngine>) -> Self {
        Self {
            graph: Graph::new(),
            namespaces,
            engine,
        }
    }

    /// Wraps an existing graph, binding it to `namespaces` and `engine`.
    pub fn from_graph(
        graph: Graph,
        namespaces: Arc<NamespaceRegistry>,
        engine: Arc<dyn QueryEngine>,
    ) -> Self {
        Self {
            graph,
            namespaces,
            engine,
        }
    }

    /// The underlying triples.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// The registry this graph was bound to at construction.
    pub fn namespaces(&self) -> &NamespaceRegistry {
        &self.namespaces
    }

    /// Number of triples in the graph.
    pub fn len(&self) -> usize {
        self.graph.len()
    }

    /// Whether the graph holds no triples.
    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// Adds a single triple.
    pub fn insert(&mut self, triple: &Triple) -> bool {
        self.graph.insert(triple)
    }

    /// Parses a Turtle document into the graph.
    pub fn load_turtle(&mut self, data: &str) -> Result<(), ClientError> {
        self.load_from_reader(RdfFormat::Turtle, data.as_bytes())
    }

    /// Parses an RDF document in `format` into the graph. Graph names in
    /// quad formats are dropped.
    pub fn load_from_reader(
        &mut self,
        format: RdfFormat,
        reader: impl std::io::Read,
    ) -> Result<(), ClientError> {
        for quad in RdfParser::from_format(format).for_reader(reader) {
            let quad = quad?;
            self.graph
                .insert(&Triple::new(quad.subject, quad.predicate, quad.object));
        }
        Ok(())
    }

    /// Serializes the graph to `writer` with the registry's prefixes bound.
    pub fn dump_to_writer<W: Write>(
        &self,
        format: RdfFormat,
        writer: W,
    ) -> Result<W, ClientError> {
        let mut serializer = RdfSerializer::from_format(format);
        for (prefix, iri) in self.namespaces.iter_all() {
            serializer = serializer.with_prefix(prefix, iri)?;
        }
        let mut serializer = serializer.for_writer(writer);
        for triple in &self.graph {
            serializer.serialize_triple(triple)?;
        }
        Ok(serializer.finish()?)
    }

    /// Applies template substitution to `query` and evaluates it as a
    /// SELECT against this graph.
    ///
    /// No prefix block is injected: the engine is assumed to resolve
    /// prefixes through the bound registry. Rows come back in whatever
    /// order the engine produces them.
    pub fn select(
        &self,
        query: &str,
        bindings: &Bindings,
    ) -> Result<Vec<QuerySolution>, EngineError> {
        let prepared = substitute(query, bindings);
        debug!("prepared select query:\n{prepared}");
        self.engine.select(&self.graph, &prepared)
    }

    /// Applies template substitution to `query`, evaluates it as a
    /// CONSTRUCT, and merges the result into a freshly allocated graph
    /// carrying this graph's namespace bindings.
    ///
    /// Returns `None` when the engine reports no result graph. This graph
    /// is never mutated.
    pub fn construct(
        &self,
        query: &str,
        bindings: &Bindings,
    ) -> Result<Option<LocalGraph>, EngineError> {
        let prepared = substitute(query, bindings);
        debug!("prepared construct query:\n{prepared}");
        let Some(triples) = self.engine.construct(&self.graph, &prepared)? else {
            return Ok(None);
        };
        let mut out = LocalGraph::new(
            Arc::clone(&self.namespaces),
            Arc::clone(&self.engine),
        );
        for triple in &triples {
            out.graph.insert(triple);
        }
        Ok(Some(out))
    }
}
