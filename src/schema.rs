use crate::path::{self, ID_FIELD};
use crate::strip::PathStripper;
use std::sync::Arc;

/// Type of a declared schema path.
#[derive(Debug, Clone)]
pub enum PathType {
    /// Any single BSON leaf value (string, number, date, ...).
    Scalar,
    /// Array of scalar values.
    Array,
    /// Free-form value; nested objects are kept as plain objects.
    Mixed,
    /// Single nested document with its own schema.
    Embedded(Arc<Schema>),
    /// Array of nested documents sharing one schema.
    DocumentArray(Arc<Schema>),
    /// ObjectId reference to a document of another model.
    Ref { model: String },
    /// Array of ObjectId references to documents of another model.
    RefArray { model: String },
}

impl PathType {
    pub fn embedded(schema: &Arc<Schema>) -> Self {
        PathType::Embedded(Arc::clone(schema))
    }

    pub fn document_array(schema: &Arc<Schema>) -> Self {
        PathType::DocumentArray(Arc::clone(schema))
    }

    pub fn reference(model: impl Into<String>) -> Self {
        PathType::Ref {
            model: model.into(),
        }
    }

    pub fn reference_array(model: impl Into<String>) -> Self {
        PathType::RefArray {
            model: model.into(),
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, PathType::Ref { .. } | PathType::RefArray { .. })
    }
}

/// Instance methods installed on a schema by plugins.
#[derive(Debug, Clone, Default)]
pub struct Methods {
    strip_paths: Option<PathStripper>,
}

impl Methods {
    pub fn strip_paths(&self) -> Option<&PathStripper> {
        self.strip_paths.as_ref()
    }

    pub fn set_strip_paths(&mut self, stripper: PathStripper) {
        self.strip_paths = Some(stripper);
    }
}

/// Describes one document type: its declared paths and installed methods.
///
/// Schemas are configured mutably (paths, plugins) and then shared behind an
/// `Arc`, after which they are read-only.
#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    paths: Vec<(String, PathType)>,
    methods: Methods,
}

impl Schema {
    /// Create a schema with the implicit `_id` path declared.
    pub fn new(name: impl Into<String>) -> Self {
        let mut schema = Self {
            name: name.into(),
            paths: Vec::new(),
            methods: Methods::default(),
        };
        schema.path(ID_FIELD, PathType::Scalar);
        schema
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declare a path, replacing the type of an existing declaration in place.
    pub fn path(&mut self, name: impl Into<String>, ty: PathType) -> &mut Self {
        let name = name.into();
        match self.paths.iter_mut().find(|(p, _)| *p == name) {
            Some(entry) => entry.1 = ty,
            None => self.paths.push((name, ty)),
        }
        self
    }

    pub fn with_path(mut self, name: impl Into<String>, ty: PathType) -> Self {
        self.path(name, ty);
        self
    }

    /// Declared path names in declaration order.
    pub fn path_names(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(|(p, _)| p.as_str())
    }

    pub fn path_type(&self, path: &str) -> Option<&PathType> {
        self.paths.iter().find(|(p, _)| p == path).map(|(_, ty)| ty)
    }

    /// True when `path` is a plain object holding other declared paths
    /// (`profile` when `profile.bio` is declared).
    pub fn is_nested(&self, path: &str) -> bool {
        self.paths
            .iter()
            .any(|(p, _)| path::is_ancestor_path(path, p))
    }

    pub fn methods(&self) -> &Methods {
        &self.methods
    }

    pub fn methods_mut(&mut self) -> &mut Methods {
        &mut self.methods
    }

    /// Run a plugin installer against this schema.
    pub fn plugin<O>(&mut self, installer: impl FnOnce(&mut Schema, O), options: O) -> &mut Self {
        installer(self, options);
        self
    }

    pub fn into_shared(self) -> Arc<Schema> {
        Arc::new(self)
    }
}
