//! Parameter substitution for SPARQL query templates.
//!
//! A template is ordinary query text containing placeholders of the form
//! `?name`, where `name` is one or more ASCII lowercase letters terminated
//! by a non-word character or the end of the text. Any token whose name
//! contains an uppercase letter, a digit or an underscore after the marker
//! (`?firstName`, `?var1`, `?first_name`) is never a placeholder, so the
//! SPARQL variables callers actually write are left alone as long as they
//! are not plain lowercase words.
//!
//! Substitution is a pure, single-pass text transform: placeholders missing
//! from the binding set are left untouched, inserted values are never
//! re-scanned, and no SPARQL parsing or validation happens here. Malformed
//! output only surfaces once the text reaches a query engine.

use crate::namespaces::{NamespaceRegistry, PrefixStyle};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Placeholder name to replacement text, typically an IRI wrapped in angle
/// brackets or a prefixed name. Supplied per call, never persisted.
pub type Bindings = HashMap<String, String>;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\?([a-z]+)\b").unwrap());

/// Replaces every placeholder whose name appears in `bindings`.
///
/// ```
/// use vivo_client::template::{substitute, Bindings};
///
/// let bindings = Bindings::from([(
///     "subject".to_owned(),
///     "<http://example.org/individual/place-1>".to_owned(),
/// )]);
/// assert_eq!(
///     substitute("DESCRIBE ?subject", &bindings),
///     "DESCRIBE <http://example.org/individual/place-1>"
/// );
/// // Missing bindings leave the placeholder text unchanged.
/// assert_eq!(substitute("DESCRIBE ?subject", &Bindings::new()), "DESCRIBE ?subject");
/// ```
pub fn substitute(raw: &str, bindings: &Bindings) -> String {
    PLACEHOLDER
        .replace_all(raw, |caps: &Captures<'_>| {
            let name = &caps[1];
            match bindings.get(name) {
                Some(value) => value.clone(),
                None => caps[0].to_owned(),
            }
        })
        .into_owned()
}

/// Like [`substitute`], with the registry's SPARQL prefix block prepended
/// to the substituted text.
pub fn substitute_with_prefixes(
    raw: &str,
    bindings: &Bindings,
    namespaces: &NamespaceRegistry,
) -> String {
    let substituted = substitute(raw, bindings);
    let prefixes = namespaces.render(PrefixStyle::Sparql);
    if prefixes.is_empty() {
        substituted
    } else {
        format!("{prefixes}\n{substituted}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespaces::NamespaceRegistry;

    fn bind(pairs: &[(&str, &str)]) -> Bindings {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn substitutes_bound_placeholders() {
        let query = substitute(
            "SELECT ?name WHERE { ?subject foaf:firstName ?name }",
            &bind(&[("subject", "bu:jcarberry")]),
        );
        assert_eq!(query, "SELECT ?name WHERE { bu:jcarberry foaf:firstName ?name }");
    }

    #[test]
    fn missing_bindings_round_trip() {
        let raw = "SELECT ?s ?p WHERE { ?s ?p ?o }";
        assert_eq!(substitute(raw, &Bindings::new()), raw);
    }

    #[test]
    fn second_application_with_empty_bindings_is_identity() {
        let once = substitute("DESCRIBE ?subject ?other", &bind(&[("subject", "<urn:x>")]));
        let twice = substitute(&once, &Bindings::new());
        assert_eq!(once, twice);
    }

    #[test]
    fn mixed_case_and_numbered_variables_are_not_placeholders() {
        let raw = "SELECT ?firstName ?var1 ?first_name WHERE { ?x ?y ?z }";
        let substituted = substitute(
            raw,
            &bind(&[("first", "BOOM"), ("var", "BOOM"), ("firstname", "BOOM")]),
        );
        assert_eq!(substituted, raw);
    }

    #[test]
    fn inserted_values_are_not_rescanned() {
        // A binding value containing the marker survives verbatim.
        let substituted = substitute("FILTER (?a = ?b)", &bind(&[("a", "?b"), ("b", "1")]));
        assert_eq!(substituted, "FILTER (?b = 1)");
    }

    #[test]
    fn prefix_block_is_prepended() {
        let mut registry = NamespaceRegistry::new();
        registry.register("foaf", "http://xmlns.com/foaf/0.1/").unwrap();
        let query = substitute_with_prefixes(
            "SELECT ?name WHERE { ?s foaf:name ?name }",
            &Bindings::new(),
            &registry,
        );
        assert_eq!(
            query,
            "prefix foaf: <http://xmlns.com/foaf/0.1/>\nSELECT ?name WHERE { ?s foaf:name ?name }"
        );
    }

    #[test]
    fn describe_with_iri_binding_is_exact() {
        let bindings = bind(&[("subject", "<http://example.org/individual/place-1>")]);
        assert_eq!(
            substitute("DESCRIBE ?subject", &bindings),
            "DESCRIBE <http://example.org/individual/place-1>"
        );
    }
}
