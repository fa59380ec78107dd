use crate::document::{Document, DocumentKind, Value};
use crate::error::{Error, Result};
use crate::path::is_reserved;
use crate::schema::Schema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Options accepted by [`install`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StripOptions {
    /// Paths cleared from every document of the schema.
    #[serde(default)]
    pub paths: Vec<String>,
}

impl StripOptions {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }
}

/// The `stripPaths` capability bound to one schema.
#[derive(Debug, Clone, Default)]
pub struct PathStripper {
    paths: Vec<String>,
}

/// Install `stripPaths` on a schema. Absent options strip nothing on this
/// level but still recurse into nested documents.
pub fn install(schema: &mut Schema, options: Option<StripOptions>) {
    let paths = options.map(|o| o.paths).unwrap_or_default();
    tracing::debug!(schema = %schema.name(), paths = paths.len(), "installing stripPaths");
    schema
        .methods_mut()
        .set_strip_paths(PathStripper::new(paths));
}

impl PathStripper {
    pub fn new(paths: Vec<String>) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Clear the configured paths on `doc`, then descend into every declared
    /// path holding documents that carry their own stripper.
    pub fn strip<'d>(&self, doc: &'d mut Document) -> &'d mut Document {
        for path in &self.paths {
            if is_reserved(path) {
                continue;
            }
            if doc.unset(path).is_some() {
                tracing::trace!(schema = %doc.schema().name(), path = %path, "stripped path");
            }
        }

        let schema = Arc::clone(doc.schema());
        for path in schema.path_names() {
            if is_reserved(path) {
                continue;
            }
            match doc.get_mut(path) {
                Some(Value::Array(items)) => items.iter_mut().for_each(check_and_strip),
                Some(value) if value.is_present() => check_and_strip(value),
                _ => {}
            }
        }

        doc
    }
}

/// Classify a value as document-like. Every document kind qualifies.
pub fn as_document_like(value: &mut Value) -> Option<&mut Document> {
    match value {
        Value::Document(doc) => match doc.kind() {
            DocumentKind::Embedded | DocumentKind::Document | DocumentKind::Model => {
                Some(doc.as_mut())
            }
        },
        Value::Bson(_) | Value::Object(_) | Value::Array(_) => None,
    }
}

/// Strip a nested value if it is a document whose schema has the capability.
pub fn check_and_strip(candidate: &mut Value) {
    let Some(doc) = as_document_like(candidate) else {
        return;
    };
    let schema = Arc::clone(doc.schema());
    match schema.methods().strip_paths() {
        Some(stripper) => {
            tracing::trace!(schema = %schema.name(), kind = ?doc.kind(), "descending into nested document");
            stripper.strip(doc);
        }
        None => {
            tracing::trace!(schema = %schema.name(), "nested document has no stripPaths; skipping");
        }
    }
}

impl Document {
    /// Run the `stripPaths` method installed on this document's schema and
    /// hand the same document back.
    pub fn strip_paths(&mut self) -> Result<&mut Self> {
        let schema = Arc::clone(self.schema());
        match schema.methods().strip_paths() {
            Some(stripper) => Ok(stripper.strip(self)),
            None => Err(Error::MethodNotInstalled {
                schema: schema.name().to_string(),
                method: "stripPaths",
            }),
        }
    }

    pub fn has_strip_paths(&self) -> bool {
        self.schema().methods().strip_paths().is_some()
    }
}
