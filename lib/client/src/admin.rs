//! Administrative actions against the VIVO web interface.
//!
//! Each action is a single best-effort HTTP round trip over a logged-in
//! [`Session`]: a fixed form submission the instance executes
//! asynchronously. A 200 response means the action was accepted, not that
//! it completed; anything else maps to [`ClientError::Remote`]. Going
//! through the web interface rather than the triple store directly keeps
//! the instance's reasoning and search indexing in the loop.

use crate::error::ClientError;
use crate::session::Session;
use reqwest::blocking::{multipart, Response};
use reqwest::header;
use std::path::Path;
use tracing::info;

/// Path of the RDF upload form, relative to the base URL.
pub const UPLOAD_PATH: &str = "uploadRDF";
/// Path of the ingest tools, relative to the base URL.
pub const INGEST_PATH: &str = "ingest";

/// Serialization format token the upload form assumes when none is given.
pub const DEFAULT_FORMAT: &str = "N3";

/// The named graph VIVO loads manual additions into.
pub const KB2_GRAPH: &str = "http://vitro.mannlib.cornell.edu/default/vitro-kb-2";

const RECOMPUTE_ACK: &str = "Recompute of inferences started";
const REBUILD_ACK: &str = "the search index";

fn add_fields(format: &str) -> Vec<(&'static str, String)> {
    vec![
        ("language", format.to_owned()),
        ("submit", "Load Data".to_owned()),
        ("action", "loadRDFData".to_owned()),
    ]
}

fn remove_fields(format: &str) -> Vec<(&'static str, String)> {
    vec![
        ("mode", "remove".to_owned()),
        ("language", format.to_owned()),
        ("submit", "submit".to_owned()),
    ]
}

fn named_graph_upload_fields(format: &str, graph: &str) -> Vec<(&'static str, String)> {
    vec![
        ("language", format.to_owned()),
        ("submit", "Load Data".to_owned()),
        ("modelName", graph.to_owned()),
        ("docLoc", String::new()),
    ]
}

fn named_graph_fields(
    action: &'static str,
    name: &str,
    submit: &'static str,
) -> Vec<(&'static str, String)> {
    vec![
        ("action", action.to_owned()),
        ("modelName", name.to_owned()),
        ("submit", submit.to_owned()),
        ("modelType", "sdb".to_owned()),
    ]
}

fn ensure_accepted(response: Response) -> Result<(), ClientError> {
    let status = response.status().as_u16();
    if status == 200 {
        Ok(())
    } else {
        Err(ClientError::Remote {
            status,
            body: response.text().unwrap_or_default(),
        })
    }
}

fn post_fields(
    session: &Session,
    path: &str,
    fields: &[(&'static str, String)],
) -> Result<Response, ClientError> {
    let borrowed: Vec<(&str, &str)> = fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
    session.post_form(path, &borrowed)
}

fn upload(
    session: &Session,
    fields: Vec<(&'static str, String)>,
    file_field: &'static str,
    file: &Path,
) -> Result<(), ClientError> {
    let mut form = multipart::Form::new();
    for (name, value) in fields {
        form = form.text(name, value);
    }
    let form = form.file(file_field, file)?;
    ensure_accepted(session.post_multipart(UPLOAD_PATH, form)?)
}

/// Loads an RDF file into the main store through the upload form.
///
/// `format` is the serialization token the form understands
/// ([`DEFAULT_FORMAT`] is `N3`). Reasoning and search indexing are
/// triggered by the instance as the data lands.
pub fn add_rdf(session: &Session, file: &Path, format: &str) -> Result<(), ClientError> {
    info!("adding {} to {}", file.display(), session.base_url());
    upload(session, add_fields(format), "rdfStream", file)
}

/// Removes the statements of an RDF file from the store.
pub fn remove_rdf(session: &Session, file: &Path, format: &str) -> Result<(), ClientError> {
    info!("removing {} from {}", file.display(), session.base_url());
    upload(session, remove_fields(format), "rdfStream", file)
}

/// Loads an RDF file into a specific named graph.
pub fn add_rdf_to_named_graph(
    session: &Session,
    file: &Path,
    graph: &str,
    format: &str,
) -> Result<(), ClientError> {
    info!("adding {} to graph {graph}", file.display());
    upload(session, named_graph_upload_fields(format, graph), "filePath", file)
}

/// Asks the instance to recompute its inferences.
///
/// The instance acknowledges in the response page and recomputes in the
/// background; this call does not wait for completion.
pub fn recompute_inferences(session: &Session) -> Result<(), ClientError> {
    info!("recomputing inferences for {}", session.base_url());
    let response =
        session.post_form("RecomputeInferences", &[("submit", "Recompute Inferences")])?;
    let status = response.status().as_u16();
    let body = response.text().unwrap_or_default();
    if status != 200 || !body.contains(RECOMPUTE_ACK) {
        return Err(ClientError::Remote { status, body });
    }
    Ok(())
}

/// Asks the instance to rebuild its search index.
///
/// Does not wait for the rebuild to finish.
pub fn rebuild_index(session: &Session) -> Result<(), ClientError> {
    info!("rebuilding the search index for {}", session.base_url());
    let response = session.post_form("SearchIndex", &[("rebuild", "Rebuild")])?;
    let status = response.status().as_u16();
    let body = response.text().unwrap_or_default();
    if status != 200 || !body.contains(REBUILD_ACK) {
        return Err(ClientError::Remote { status, body });
    }
    Ok(())
}

/// Merges two individuals through the ingest merge tool, keeping the
/// primary label of `uri1`.
///
/// A redirect back to the login form means the session is not
/// authenticated and fails with [`ClientError::Authentication`].
pub fn merge_individuals(
    session: &Session,
    uri1: &str,
    uri2: &str,
) -> Result<(), ClientError> {
    info!("merging {uri2} into {uri1}");
    let response = session.get(
        INGEST_PATH,
        &[
            ("action", "mergeResources"),
            ("uri1", uri1),
            ("uri2", uri2),
            ("usePrimaryLabelOnly", "Use Primary Label Only"),
            ("submit", "Merge resources"),
        ],
    )?;
    if response.status().is_redirection() {
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");
        if location.contains("authenticate") {
            return Err(ClientError::Authentication);
        }
    }
    ensure_accepted(response)
}

/// Creates an empty named graph.
pub fn create_named_graph(session: &Session, name: &str) -> Result<(), ClientError> {
    info!("creating named graph {name}");
    let fields = named_graph_fields("createModel", name, "Create Model");
    ensure_accepted(post_fields(session, INGEST_PATH, &fields)?)
}

/// Removes a named graph and its statements.
pub fn remove_named_graph(session: &Session, name: &str) -> Result<(), ClientError> {
    info!("removing named graph {name}");
    let fields = named_graph_fields("removeModel", name, "remove");
    ensure_accepted(post_fields(session, INGEST_PATH, &fields)?)
}

/// Clears all statements from a named graph, keeping the graph itself.
pub fn clear_named_graph(session: &Session, name: &str) -> Result<(), ClientError> {
    info!("clearing named graph {name}");
    let fields = named_graph_fields("clearModel", name, "clear statements");
    ensure_accepted(post_fields(session, INGEST_PATH, &fields)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_payload_matches_the_upload_form() {
        assert_eq!(
            add_fields("N3"),
            [
                ("language", "N3".to_owned()),
                ("submit", "Load Data".to_owned()),
                ("action", "loadRDFData".to_owned()),
            ]
        );
    }

    #[test]
    fn remove_payload_matches_the_upload_form() {
        assert_eq!(
            remove_fields("RDF/XML"),
            [
                ("mode", "remove".to_owned()),
                ("language", "RDF/XML".to_owned()),
                ("submit", "submit".to_owned()),
            ]
        );
    }

    #[test]
    fn named_graph_upload_targets_the_model() {
        assert_eq!(
            named_graph_upload_fields("N3", "http://localhost/staged"),
            [
                ("language", "N3".to_owned()),
                ("submit", "Load Data".to_owned()),
                ("modelName", "http://localhost/staged".to_owned()),
                ("docLoc", String::new()),
            ]
        );
    }

    #[test]
    fn named_graph_actions_use_the_sdb_model_type() {
        for (action, submit) in [
            ("createModel", "Create Model"),
            ("removeModel", "remove"),
            ("clearModel", "clear statements"),
        ] {
            let fields = named_graph_fields(action, KB2_GRAPH, submit);
            assert_eq!(fields[0], ("action", action.to_owned()));
            assert_eq!(fields[1], ("modelName", KB2_GRAPH.to_owned()));
            assert_eq!(fields[2], ("submit", submit.to_owned()));
            assert_eq!(fields[3], ("modelType", "sdb".to_owned()));
        }
    }
}
