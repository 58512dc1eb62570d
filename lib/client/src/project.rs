//! Projection of SELECT result rows into ordered, named records.
//!
//! A query's field order is extracted once from its `SELECT` clause; each
//! row is then zipped into a record following that order, for display or
//! CSV export. No semantic interpretation of terms happens here.

use crate::error::ClientError;
use oxrdf::Term;
use regex::Regex;
use sparesults::QuerySolution;
use std::io::Write;
use std::sync::LazyLock;

static SELECT_FIELDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)SELECT\s+(?:DISTINCT\s+)?(.*?)\s*WHERE").unwrap());

/// One result row as `(field, term)` pairs in field order. Unbound fields
/// carry `None`.
pub type Record = Vec<(String, Option<Term>)>;

/// Extracts the field names of a query's `SELECT [DISTINCT]` clause, in
/// declaration order.
///
/// `SELECT *` and queries without a recognizable clause yield an empty
/// list.
pub fn select_fields(query: &str) -> Vec<String> {
    let Some(clause) = SELECT_FIELDS
        .captures(query)
        .and_then(|caps| caps.get(1))
    else {
        return Vec::new();
    };
    clause
        .as_str()
        .split_whitespace()
        .filter_map(|token| token.strip_prefix('?'))
        .map(|name| {
            name.trim_end_matches(|c: char| !c.is_alphanumeric() && c != '_')
                .to_owned()
        })
        .collect()
}

/// Zips each row into a record following `field_order`, preserving row
/// order and dropping terms not named in the order.
pub fn project(rows: &[QuerySolution], field_order: &[String]) -> Vec<Record> {
    rows.iter()
        .map(|row| {
            field_order
                .iter()
                .map(|field| (field.clone(), row.get(field.as_str()).cloned()))
                .collect()
        })
        .collect()
}

/// The displayable text of a projected term: the IRI itself, the literal
/// value without quoting, or the empty string for unbound fields.
pub fn term_text(term: Option<&Term>) -> String {
    match term {
        Some(Term::NamedNode(node)) => node.as_str().to_owned(),
        Some(Term::BlankNode(node)) => node.to_string(),
        Some(Term::Literal(literal)) => literal.value().to_owned(),
        None => String::new(),
    }
}

/// Writes `records` as CSV with a header row of the field names.
pub fn write_csv<W: Write>(
    fields: &[String],
    records: &[Record],
    writer: W,
) -> Result<(), ClientError> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(fields)?;
    for record in records {
        out.write_record(record.iter().map(|(_, term)| term_text(term.as_ref())))?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::{Literal, NamedNode, Variable};
    use std::sync::Arc;

    fn solution(variables: &[&str], terms: Vec<Option<Term>>) -> QuerySolution {
        let variables: Arc<[Variable]> = variables
            .iter()
            .map(|name| Variable::new(*name).unwrap())
            .collect();
        QuerySolution::from((variables, terms))
    }

    #[test]
    fn fields_come_back_in_declaration_order() {
        assert_eq!(
            select_fields("SELECT DISTINCT ?label ?type ?rank WHERE { ?s ?p ?o }"),
            ["label", "type", "rank"]
        );
        assert_eq!(
            select_fields("select ?s\n?p\nwhere { ?s ?p ?o }"),
            ["s", "p"]
        );
    }

    #[test]
    fn star_and_unrecognized_queries_yield_no_fields() {
        assert!(select_fields("SELECT * WHERE { ?s ?p ?o }").is_empty());
        assert!(select_fields("ASK { ?s ?p ?o }").is_empty());
    }

    #[test]
    fn expression_aliases_are_trimmed() {
        assert_eq!(
            select_fields("SELECT (COUNT(*) as ?count) WHERE { ?s ?p ?o }"),
            ["count"]
        );
    }

    #[test]
    fn projection_follows_field_order_and_drops_the_rest() {
        let row = solution(
            &["label", "uri", "extra"],
            vec![
                Some(Literal::from("Carberry, Josiah").into()),
                Some(NamedNode::new("http://example.org/jcarberry").unwrap().into()),
                Some(Literal::from("dropped").into()),
            ],
        );
        let fields = vec!["uri".to_owned(), "label".to_owned()];
        let records = project(&[row], &fields);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0][0].0, "uri");
        assert_eq!(
            term_text(records[0][0].1.as_ref()),
            "http://example.org/jcarberry"
        );
        assert_eq!(records[0][1].0, "label");
        assert_eq!(term_text(records[0][1].1.as_ref()), "Carberry, Josiah");
        assert!(!records[0].iter().any(|(field, _)| field == "extra"));
    }

    #[test]
    fn unbound_fields_project_to_empty_text() {
        let row = solution(&["a"], vec![None]);
        let records = project(&[row], &["a".to_owned(), "missing".to_owned()]);
        assert_eq!(term_text(records[0][0].1.as_ref()), "");
        assert_eq!(term_text(records[0][1].1.as_ref()), "");
    }

    #[test]
    fn csv_output_has_a_header_and_one_line_per_row() {
        let rows = [
            solution(&["label"], vec![Some(Literal::from("Temporary place").into())]),
            solution(&["label"], vec![Some(Literal::from("Temporary talk").into())]),
        ];
        let fields = vec!["label".to_owned()];
        let records = project(&rows, &fields);
        let mut out = Vec::new();
        write_csv(&fields, &records, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "label\nTemporary place\nTemporary talk\n"
        );
    }
}
