//! Prefix registry for the namespaces used across a VIVO installation.
//!
//! The registry is built once at startup, either empty or from
//! [`NamespaceRegistry::vivo_defaults`], and passed explicitly to the
//! components that need it. It is never mutated after initialization.

use std::fmt;

/// A prefix is already bound to a different IRI.
#[derive(Debug, thiserror::Error)]
#[error("prefix '{prefix}' is already registered with a different IRI")]
pub struct DuplicatePrefixError {
    /// The conflicting prefix, lowercased.
    pub prefix: String,
}

/// How prefix declarations are rendered by [`NamespaceRegistry::render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixStyle {
    /// `prefix p: <iri>` lines, ready to prepend to a SPARQL query.
    Sparql,
    /// `@prefix p: <iri> .` lines for Turtle documents.
    Turtle,
    /// `p: iri` lines for human-facing listings. Reserved entries
    /// (the RDF/RDFS/OWL/XSD built-ins) are skipped to reduce noise.
    Display,
}

#[derive(Debug, Clone)]
struct NamespaceEntry {
    prefix: String,
    iri: String,
    reserved: bool,
}

/// An ordered, write-once table of `prefix -> IRI` bindings.
///
/// Prefixes are case-normalized to lowercase and unique; an IRI cannot be
/// changed once its prefix is registered. Registration order is preserved
/// by [`NamespaceRegistry::iter_all`] and [`NamespaceRegistry::render`].
#[derive(Debug, Clone, Default)]
pub struct NamespaceRegistry {
    entries: Vec<NamespaceEntry>,
}

impl NamespaceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The fixed namespace table of a VIVO installation: the local data and
    /// ontology namespaces plus the common external vocabularies, with the
    /// RDF/RDFS/OWL/XSD built-ins flagged as reserved.
    pub fn vivo_defaults() -> Self {
        let mut registry = Self::new();
        for (prefix, iri) in [
            ("bu", "http://vivo.brown.edu/individual/"),
            ("blocal", "http://vivo.brown.edu/ontology/vivo-brown/"),
            ("bibo", "http://purl.org/ontology/bibo/"),
            ("dcterms", "http://purl.org/dc/terms/"),
            ("foaf", "http://xmlns.com/foaf/0.1/"),
            ("skos", "http://www.w3.org/2004/02/skos/core#"),
            ("vivo", "http://vivoweb.org/ontology/core#"),
            (
                "vitropublic",
                "http://vitro.mannlib.cornell.edu/ns/vitro/public#",
            ),
            ("vitro", "http://vitro.mannlib.cornell.edu/ns/vitro/0.7#"),
        ] {
            // The fixed table holds no duplicates.
            registry.register(prefix, iri).unwrap();
        }
        for (prefix, iri) in [
            ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
            ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
            ("owl", "http://www.w3.org/2002/07/owl#"),
            ("xsd", "http://www.w3.org/2001/XMLSchema#"),
        ] {
            registry.register_reserved(prefix, iri).unwrap();
        }
        registry
    }

    /// Binds `prefix` to `iri`.
    ///
    /// The prefix is lowercased before insertion. Registering an identical
    /// `(prefix, iri)` pair again is a no-op; registering an existing prefix
    /// with a different IRI fails with [`DuplicatePrefixError`].
    pub fn register(&mut self, prefix: &str, iri: &str) -> Result<(), DuplicatePrefixError> {
        self.insert(prefix, iri, false)
    }

    fn register_reserved(&mut self, prefix: &str, iri: &str) -> Result<(), DuplicatePrefixError> {
        self.insert(prefix, iri, true)
    }

    fn insert(
        &mut self,
        prefix: &str,
        iri: &str,
        reserved: bool,
    ) -> Result<(), DuplicatePrefixError> {
        let prefix = prefix.to_lowercase();
        if let Some(existing) = self.entries.iter().find(|e| e.prefix == prefix) {
            if existing.iri == iri {
                return Ok(());
            }
            return Err(DuplicatePrefixError { prefix });
        }
        self.entries.push(NamespaceEntry {
            prefix,
            iri: iri.to_owned(),
            reserved,
        });
        Ok(())
    }

    /// Looks up the IRI bound to `prefix` (case-insensitively).
    pub fn iri(&self, prefix: &str) -> Option<&str> {
        let prefix = prefix.to_lowercase();
        self.entries
            .iter()
            .find(|e| e.prefix == prefix)
            .map(|e| e.iri.as_str())
    }

    /// All `(prefix, iri)` pairs in registration order.
    pub fn iter_all(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries
            .iter()
            .map(|e| (e.prefix.as_str(), e.iri.as_str()))
    }

    /// Number of registered entries, reserved ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders the prefix declarations as a newline-joined block.
    pub fn render(&self, style: PrefixStyle) -> String {
        let mut lines = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            match style {
                PrefixStyle::Sparql => {
                    lines.push(format!("prefix {}: <{}>", entry.prefix, entry.iri));
                }
                PrefixStyle::Turtle => {
                    lines.push(format!("@prefix {}: <{}> .", entry.prefix, entry.iri));
                }
                PrefixStyle::Display => {
                    if !entry.reserved {
                        lines.push(format!("{}: {}", entry.prefix, entry.iri));
                    }
                }
            }
        }
        lines.join("\n")
    }
}

impl fmt::Display for NamespaceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(PrefixStyle::Display))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_is_case_insensitive() {
        let mut registry = NamespaceRegistry::new();
        registry.register("FOAF", "http://xmlns.com/foaf/0.1/").unwrap();
        assert_eq!(registry.iri("foaf"), Some("http://xmlns.com/foaf/0.1/"));
        assert_eq!(registry.iri("FoAf"), Some("http://xmlns.com/foaf/0.1/"));
    }

    #[test]
    fn duplicate_prefix_with_different_iri_is_rejected() {
        let mut registry = NamespaceRegistry::new();
        registry.register("bu", "http://example.org/a/").unwrap();
        // Same pair again is fine.
        registry.register("bu", "http://example.org/a/").unwrap();
        let err = registry.register("bu", "http://example.org/b/").unwrap_err();
        assert_eq!(err.prefix, "bu");
        assert_eq!(registry.iri("bu"), Some("http://example.org/a/"));
    }

    #[test]
    fn iter_all_preserves_registration_order_and_restarts() {
        let mut registry = NamespaceRegistry::new();
        registry.register("b", "http://example.org/b/").unwrap();
        registry.register("a", "http://example.org/a/").unwrap();
        let first: Vec<_> = registry.iter_all().map(|(p, _)| p.to_owned()).collect();
        let second: Vec<_> = registry.iter_all().map(|(p, _)| p.to_owned()).collect();
        assert_eq!(first, ["b", "a"]);
        assert_eq!(first, second);
    }

    #[test]
    fn render_sparql_has_one_line_per_entry() {
        let registry = NamespaceRegistry::vivo_defaults();
        let block = registry.render(PrefixStyle::Sparql);
        assert_eq!(block.lines().count(), registry.len());
        for (prefix, iri) in registry.iter_all() {
            let line = format!("prefix {prefix}: <{iri}>");
            assert_eq!(
                block.lines().filter(|l| *l == line).count(),
                1,
                "expected exactly one declaration for {prefix}"
            );
        }
    }

    #[test]
    fn render_turtle_lines_are_terminated() {
        let registry = NamespaceRegistry::vivo_defaults();
        let block = registry.render(PrefixStyle::Turtle);
        assert!(block.lines().all(|l| l.starts_with("@prefix ") && l.ends_with(" .")));
    }

    #[test]
    fn render_display_skips_reserved_entries() {
        let registry = NamespaceRegistry::vivo_defaults();
        let block = registry.render(PrefixStyle::Display);
        assert!(block.contains("vivo: http://vivoweb.org/ontology/core#"));
        assert!(block.contains("foaf: http://xmlns.com/foaf/0.1/"));
        for reserved in ["rdf:", "rdfs:", "owl:", "xsd:"] {
            assert!(
                !block.lines().any(|l| l.starts_with(reserved)),
                "reserved prefix {reserved} should not be listed"
            );
        }
    }
}
