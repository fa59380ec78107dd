use crate::error::{Error, Result};
use crate::path::{self, ID_FIELD, VERSION_KEY};
use crate::schema::{PathType, Schema};
use bson::{Bson, oid::ObjectId};
use indexmap::IndexMap;
use std::sync::Arc;

/// Field storage; keeps insertion order like `bson::Document`.
pub type Fields = IndexMap<String, Value>;

/// How a document came to exist. Every kind is document-like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Nested inside another document, alone or in a document array.
    Embedded,
    /// Standalone instance built straight from a schema.
    Document,
    /// Top-level instance of a compiled model, including populated references.
    Model,
}

/// A value held at a document path.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bson(Bson),
    Object(Fields),
    Array(Vec<Value>),
    Document(Box<Document>),
}

impl Value {
    /// Null and undefined count as absent.
    pub fn is_present(&self) -> bool {
        !matches!(self, Value::Bson(Bson::Null | Bson::Undefined))
    }

    pub fn as_bson(&self) -> Option<&Bson> {
        match self {
            Value::Bson(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_bson().and_then(Bson::as_str)
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Value::Document(d) => Some(d.as_ref()),
            _ => None,
        }
    }

    pub fn as_document_mut(&mut self) -> Option<&mut Document> {
        match self {
            Value::Document(d) => Some(d.as_mut()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn to_bson(&self) -> Bson {
        match self {
            Value::Bson(b) => b.clone(),
            Value::Object(map) => Bson::Document(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_bson()))
                    .collect(),
            ),
            Value::Array(items) => Bson::Array(items.iter().map(Value::to_bson).collect()),
            Value::Document(d) => Bson::Document(d.to_bson()),
        }
    }

    fn child(&self, seg: &str) -> Option<&Value> {
        match self {
            Value::Document(d) => d.fields.get(seg),
            Value::Object(map) => map.get(seg),
            Value::Array(items) => items.get(path::seg_is_index(seg)?),
            Value::Bson(_) => None,
        }
    }

    fn child_mut(&mut self, seg: &str) -> Option<&mut Value> {
        match self {
            Value::Document(d) => d.fields.get_mut(seg),
            Value::Object(map) => map.get_mut(seg),
            Value::Array(items) => items.get_mut(path::seg_is_index(seg)?),
            Value::Bson(_) => None,
        }
    }
}

impl From<Bson> for Value {
    fn from(value: Bson) -> Self {
        match value {
            Bson::Document(d) => Value::Object(
                d.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
            Bson::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            other => Value::Bson(other),
        }
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        Value::Document(Box::new(doc))
    }
}

/// One record conforming to a schema.
#[derive(Debug, Clone)]
pub struct Document {
    kind: DocumentKind,
    schema: Arc<Schema>,
    fields: Fields,
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && Arc::ptr_eq(&self.schema, &other.schema)
            && self.fields == other.fields
    }
}

impl Document {
    /// Build a standalone document, casting `raw` against the schema.
    pub fn new(schema: Arc<Schema>, raw: bson::Document) -> Result<Self> {
        Self::hydrate(DocumentKind::Document, schema, raw)
    }

    pub(crate) fn hydrate(
        kind: DocumentKind,
        schema: Arc<Schema>,
        raw: bson::Document,
    ) -> Result<Self> {
        let mut fields = Fields::new();
        // A generated `_id` goes first, as the server would place it
        if schema.path_type(ID_FIELD).is_some() && !raw.contains_key(ID_FIELD) {
            fields.insert(
                ID_FIELD.to_string(),
                Value::Bson(Bson::ObjectId(ObjectId::new())),
            );
        }
        hydrate_into(&schema, "", raw, &mut fields)?;

        if kind == DocumentKind::Model {
            fields
                .entry(VERSION_KEY.to_string())
                .or_insert(Value::Bson(Bson::Int32(0)));
        }

        Ok(Self {
            kind,
            schema,
            fields,
        })
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn id(&self) -> Option<ObjectId> {
        match self.fields.get(ID_FIELD) {
            Some(Value::Bson(Bson::ObjectId(oid))) => Some(*oid),
            _ => None,
        }
    }

    /// Resolve a dotted path. Missing intermediates resolve to `None`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let segs = path::split(path);
        let (first, rest) = segs.split_first()?;
        let mut cur = self.fields.get(*first)?;
        for seg in rest {
            cur = cur.child(seg)?;
        }
        Some(cur)
    }

    pub fn get_mut(&mut self, path: &str) -> Option<&mut Value> {
        let segs = path::split(path);
        let (first, rest) = segs.split_first()?;
        let mut cur = self.fields.get_mut(*first)?;
        for seg in rest {
            cur = cur.child_mut(seg)?;
        }
        Some(cur)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Assign a value, casting it against the schema that owns the path.
    ///
    /// Paths through an embedded document or a document array element are
    /// handed to that document's own `set`. Missing intermediate objects are
    /// created and arrays grow to fit the index, padded with nulls.
    pub fn set(&mut self, path: &str, value: impl Into<Bson>) -> Result<()> {
        let value = value.into();
        let segs = path::split(path);
        for split_at in 1..segs.len() {
            let prefix = segs[..split_at].join(".");
            let rest = &segs[split_at..];
            match self.schema.path_type(&prefix) {
                Some(PathType::Embedded(child)) => {
                    let child = Arc::clone(child);
                    let nested = self.embedded_at(&prefix, child)?;
                    return nested.set(&rest.join("."), value);
                }
                Some(PathType::DocumentArray(child)) => {
                    let child = Arc::clone(child);
                    return self.set_array_element(&prefix, child, rest, value);
                }
                Some(_) => break,
                None => {}
            }
        }

        let value = match self.schema.path_type(path) {
            Some(ty) => hydrate_value(path, ty, value)?,
            None => Value::from(value),
        };
        set_in(&mut self.fields, &segs, value, path)
    }

    /// The embedded document at `prefix`, created empty when missing.
    fn embedded_at(&mut self, prefix: &str, schema: Arc<Schema>) -> Result<&mut Document> {
        if !matches!(self.get(prefix), Some(Value::Document(_))) {
            let empty = Document::hydrate(DocumentKind::Embedded, schema, bson::Document::new())?;
            set_in(&mut self.fields, &path::split(prefix), Value::from(empty), prefix)?;
        }
        match self.get_mut(prefix) {
            Some(Value::Document(d)) => Ok(d.as_mut()),
            _ => Err(Error::Msg(format!("cannot set through `{}`", prefix))),
        }
    }

    fn set_array_element(
        &mut self,
        prefix: &str,
        schema: Arc<Schema>,
        rest: &[&str],
        value: Bson,
    ) -> Result<()> {
        let elem_path = path::join(prefix, rest[0]);
        let Some(idx) = path::seg_is_index(rest[0]) else {
            return Err(Error::Cast {
                path: elem_path,
                expected: "array index",
            });
        };
        if !matches!(self.get(prefix), Some(Value::Array(_))) {
            set_in(&mut self.fields, &path::split(prefix), Value::Array(Vec::new()), prefix)?;
        }
        let Some(Value::Array(items)) = self.get_mut(prefix) else {
            return Err(Error::Msg(format!("cannot set through `{}`", prefix)));
        };
        let slot = slot_at(items, idx);

        if rest.len() == 1 {
            *slot = hydrate_value(&elem_path, &PathType::Embedded(schema), value)?;
            return Ok(());
        }
        if !matches!(slot, Value::Document(_)) {
            let empty = Document::hydrate(DocumentKind::Embedded, schema, bson::Document::new())?;
            *slot = Value::from(empty);
        }
        match slot {
            Value::Document(d) => d.set(&rest[1..].join("."), value),
            _ => Err(Error::Msg(format!("cannot set through `{}`", elem_path))),
        }
    }

    /// Remove the value at a path, returning it. Array slots are nulled.
    pub fn unset(&mut self, path: &str) -> Option<Value> {
        let segs = path::split(path);
        let (last, parents) = segs.split_last()?;
        if parents.is_empty() {
            return self.fields.shift_remove(*last);
        }
        match self.get_mut(&parents.join("."))? {
            Value::Document(d) => d.fields.shift_remove(*last),
            Value::Object(map) => map.shift_remove(*last),
            Value::Array(items) => {
                let slot = items.get_mut(path::seg_is_index(last)?)?;
                Some(std::mem::replace(slot, Value::Bson(Bson::Null)))
            }
            Value::Bson(_) => None,
        }
    }

    /// Append an embedded document to a document array path.
    pub fn push(&mut self, path: &str, raw: bson::Document) -> Result<&mut Document> {
        let child = match self.schema.path_type(path) {
            Some(PathType::DocumentArray(child)) => Arc::clone(child),
            _ => {
                return Err(Error::Cast {
                    path: path.to_string(),
                    expected: "DocumentArray",
                });
            }
        };
        let item = Document::hydrate(DocumentKind::Embedded, child, raw)?;

        if !matches!(self.get(path), Some(Value::Array(_))) {
            set_in(&mut self.fields, &path::split(path), Value::Array(Vec::new()), path)?;
        }
        let Some(Value::Array(items)) = self.get_mut(path) else {
            return Err(Error::Msg(format!("cannot push onto `{}`", path)));
        };
        items.push(Value::Document(Box::new(item)));
        match items.last_mut() {
            Some(Value::Document(d)) => Ok(d.as_mut()),
            _ => Err(Error::Msg(format!("cannot push onto `{}`", path))),
        }
    }

    /// Replace ObjectIds at a reference path with the matching model documents.
    /// Returns how many references were filled in; unmatched ids stay as ids.
    pub fn populate(&mut self, path: &str, candidates: &[Document]) -> Result<usize> {
        if !self
            .schema
            .path_type(path)
            .is_some_and(PathType::is_reference)
        {
            return Err(Error::Msg(format!(
                "path `{}` is not a reference in schema `{}`",
                path,
                self.schema.name()
            )));
        }

        let populated: usize = match self.get_mut(path) {
            Some(Value::Array(items)) => items
                .iter_mut()
                .map(|item| populate_slot(item, candidates))
                .sum(),
            Some(slot) => populate_slot(slot, candidates),
            None => 0,
        };
        tracing::debug!(path = %path, populated, "populated references");
        Ok(populated)
    }

    pub fn to_bson(&self) -> bson::Document {
        self.fields
            .iter()
            .map(|(k, v)| (k.clone(), v.to_bson()))
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Value {
        Bson::Document(self.to_bson()).into_relaxed_extjson()
    }
}

fn populate_slot(slot: &mut Value, candidates: &[Document]) -> usize {
    let Value::Bson(Bson::ObjectId(id)) = slot else {
        return 0;
    };
    let id = *id;
    match candidates
        .iter()
        .find(|c| c.kind == DocumentKind::Model && c.id() == Some(id))
    {
        Some(found) => {
            *slot = Value::Document(Box::new(found.clone()));
            1
        }
        None => 0,
    }
}

fn hydrate_into(
    schema: &Schema,
    prefix: &str,
    raw: bson::Document,
    out: &mut Fields,
) -> Result<()> {
    for (key, val) in raw {
        let full = path::join(prefix, &key);
        if path::is_reserved(&full) {
            out.insert(key, Value::Bson(val));
            continue;
        }
        match schema.path_type(&full) {
            Some(ty) => {
                let value = hydrate_value(&full, ty, val)?;
                out.insert(key, value);
            }
            None if schema.is_nested(&full) => match val {
                Bson::Document(inner) => {
                    let mut nested = Fields::new();
                    hydrate_into(schema, &full, inner, &mut nested)?;
                    out.insert(key, Value::Object(nested));
                }
                Bson::Null | Bson::Undefined => {}
                _ => {
                    return Err(Error::Cast {
                        path: full,
                        expected: "Object",
                    });
                }
            },
            None => {
                tracing::debug!(schema = %schema.name(), path = %full, "dropping undeclared path");
            }
        }
    }
    Ok(())
}

fn hydrate_value(path: &str, ty: &PathType, val: Bson) -> Result<Value> {
    match (ty, val) {
        (_, empty @ (Bson::Null | Bson::Undefined)) => Ok(Value::Bson(empty)),
        (PathType::Embedded(schema), Bson::Document(d)) => Ok(Value::Document(Box::new(
            Document::hydrate(DocumentKind::Embedded, Arc::clone(schema), d)?,
        ))),
        (PathType::Embedded(_), _) => Err(Error::Cast {
            path: path.to_string(),
            expected: "Embedded",
        }),
        (PathType::DocumentArray(schema), Bson::Array(items)) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Bson::Document(d) => Ok(Value::Document(Box::new(Document::hydrate(
                    DocumentKind::Embedded,
                    Arc::clone(schema),
                    d,
                )?))),
                _ => Err(Error::Cast {
                    path: path::join(path, &i.to_string()),
                    expected: "Embedded",
                }),
            })
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        (PathType::DocumentArray(_), _) => Err(Error::Cast {
            path: path.to_string(),
            expected: "DocumentArray",
        }),
        (PathType::Array | PathType::RefArray { .. }, Bson::Array(items)) => {
            Ok(Value::Array(items.into_iter().map(Value::Bson).collect()))
        }
        // A lone value assigned to an array path becomes a one-element array
        (PathType::Array | PathType::RefArray { .. }, other) => {
            Ok(Value::Array(vec![Value::Bson(other)]))
        }
        (PathType::Mixed, other) => Ok(Value::from(other)),
        (PathType::Scalar | PathType::Ref { .. }, other) => Ok(Value::Bson(other)),
    }
}

fn slot_at(items: &mut Vec<Value>, idx: usize) -> &mut Value {
    if items.len() <= idx {
        items.resize(idx + 1, Value::Bson(Bson::Null));
    }
    &mut items[idx]
}

fn empty_container(next_seg: &str) -> Value {
    if path::seg_is_index(next_seg).is_some() {
        Value::Array(Vec::new())
    } else {
        Value::Object(Fields::new())
    }
}

fn set_in(map: &mut Fields, segs: &[&str], value: Value, full: &str) -> Result<()> {
    let Some((first, rest)) = segs.split_first() else {
        return Ok(());
    };
    if rest.is_empty() {
        map.insert(first.to_string(), value);
        return Ok(());
    }
    let child = map
        .entry(first.to_string())
        .or_insert_with(|| empty_container(rest[0]));
    set_value(child, rest, value, full)
}

fn set_value(cur: &mut Value, segs: &[&str], value: Value, full: &str) -> Result<()> {
    match cur {
        Value::Document(d) => set_in(&mut d.fields, segs, value, full),
        Value::Object(map) => set_in(map, segs, value, full),
        Value::Array(items) => {
            let Some(idx) = path::seg_is_index(segs[0]) else {
                return Err(Error::Cast {
                    path: full.to_string(),
                    expected: "array index",
                });
            };
            let slot = slot_at(items, idx);
            if segs.len() == 1 {
                *slot = value;
                return Ok(());
            }
            if matches!(slot, Value::Bson(Bson::Null)) {
                *slot = empty_container(segs[1]);
            }
            set_value(slot, &segs[1..], value, full)
        }
        Value::Bson(_) => {
            *cur = empty_container(segs[0]);
            set_value(cur, segs, value, full)
        }
    }
}
