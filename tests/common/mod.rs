#![allow(dead_code)]

use docstrip::{Model, Models, PathType, Schema, StripOptions, install};
use std::sync::Arc;

pub fn init_tracing() {
    // RUST_LOG=docstrip=trace to see each stripped path
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .compact()
        .try_init();
}

pub fn address_schema() -> Arc<Schema> {
    let mut schema = Schema::new("Address")
        .with_path("street", PathType::Scalar)
        .with_path("city", PathType::Scalar);
    schema.plugin(install, Some(StripOptions::new(["street", "_id", "__v"])));
    schema.into_shared()
}

pub fn post_schema() -> Arc<Schema> {
    let mut schema = Schema::new("Post")
        .with_path("title", PathType::Scalar)
        .with_path("message", PathType::Scalar)
        .with_path("fieldToStrip", PathType::Scalar);
    schema.plugin(install, Some(StripOptions::new(["fieldToStrip"])));
    schema.into_shared()
}

/// Same shape as [`post_schema`] but never configured for stripping.
pub fn plain_post_schema() -> Arc<Schema> {
    Schema::new("PlainPost")
        .with_path("title", PathType::Scalar)
        .with_path("fieldToStrip", PathType::Scalar)
        .into_shared()
}

pub fn user_schema() -> Arc<Schema> {
    let mut schema = Schema::new("User")
        .with_path("username", PathType::Scalar)
        .with_path("createdAt", PathType::Scalar)
        .with_path("posts", PathType::document_array(&post_schema()))
        .with_path("address", PathType::embedded(&address_schema()));
    schema.plugin(install, Some(StripOptions::new(["createdAt"])));
    schema.into_shared()
}

pub fn user_group_schema() -> Arc<Schema> {
    let mut schema =
        Schema::new("UserGroup").with_path("users", PathType::reference_array("User"));
    schema.plugin(install, Some(StripOptions::default()));
    schema.into_shared()
}

pub struct Fixture {
    pub models: Models,
    pub user: Model,
    pub user_group: Model,
}

pub fn fixture() -> Fixture {
    init_tracing();
    let mut models = Models::new();
    let user = models.model("User", user_schema()).unwrap();
    let user_group = models.model("UserGroup", user_group_schema()).unwrap();
    Fixture {
        models,
        user,
        user_group,
    }
}
