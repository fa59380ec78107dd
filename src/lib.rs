pub mod config;
pub mod document;
pub mod error;
pub mod model;
pub mod path;
pub mod schema;
pub mod strip;

pub use document::{Document, DocumentKind, Value};
pub use error::{Error, Result};
pub use model::{Model, Models};
pub use schema::{PathType, Schema};
pub use strip::{PathStripper, StripOptions, check_and_strip, install};
