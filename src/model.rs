use crate::document::{Document, DocumentKind};
use crate::error::{Error, Result};
use crate::schema::Schema;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A schema compiled under a model name.
#[derive(Debug, Clone)]
pub struct Model {
    name: String,
    schema: Arc<Schema>,
}

impl Model {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Create a top-level document; `_id` and `__v` are filled in when absent.
    pub fn create(&self, raw: bson::Document) -> Result<Document> {
        Document::hydrate(DocumentKind::Model, Arc::clone(&self.schema), raw)
    }

    pub fn create_from_json(&self, value: serde_json::Value) -> Result<Document> {
        let raw = bson::to_document(&value)?;
        self.create(raw)
    }
}

/// Registry of compiled models keyed by name.
#[derive(Debug, Default)]
pub struct Models {
    models: BTreeMap<String, Model>,
}

impl Models {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `schema` as model `name`. Names can only be registered once.
    pub fn model(&mut self, name: impl Into<String>, schema: Arc<Schema>) -> Result<Model> {
        let name = name.into();
        if self.models.contains_key(&name) {
            return Err(Error::OverwriteModel(name));
        }
        tracing::debug!(model = %name, schema = %schema.name(), "compiled model");
        let model = Model {
            name: name.clone(),
            schema,
        };
        self.models.insert(name, model.clone());
        Ok(model)
    }

    pub fn get(&self, name: &str) -> Option<&Model> {
        self.models.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }
}
