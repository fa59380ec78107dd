mod common;
use bson::doc;
use docstrip::config::Config;
use docstrip::{Document, Error, PathType, Schema, Value};
use std::path::PathBuf;

fn temp_config(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "docstrip-{}-{}.toml",
        name,
        std::process::id()
    ));
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn parses_per_schema_paths() {
    let cfg = Config::from_toml_str(
        r#"
        [schemas.User]
        paths = ["createdAt", "password"]

        [schemas.Post]
        "#,
    )
    .unwrap();

    assert_eq!(
        cfg.options_for("User").map(|o| o.paths.clone()),
        Some(vec!["createdAt".to_string(), "password".to_string()])
    );
    // Missing `paths` defaults to empty
    assert_eq!(cfg.options_for("Post").map(|o| o.paths.len()), Some(0));
    assert!(cfg.options_for("Address").is_none());
}

#[test]
fn apply_installs_only_configured_schemas() {
    common::init_tracing();
    let cfg = Config::from_toml_str("[schemas.User]\npaths = [\"password\"]\n").unwrap();

    let mut user = Schema::new("User")
        .with_path("name", PathType::Scalar)
        .with_path("password", PathType::Scalar);
    let mut other = Schema::new("Other");
    assert!(cfg.apply(&mut user));
    assert!(!cfg.apply(&mut other));
    assert!(other.methods().strip_paths().is_none());

    let mut d = Document::new(user.into_shared(), doc! {"name": "n", "password": "p"}).unwrap();
    d.strip_paths().unwrap();
    assert!(d.get("password").is_none());
    assert_eq!(d.get("name").and_then(Value::as_str), Some("n"));
}

#[test]
fn load_from_file() {
    let path = temp_config("load", "[schemas.Address]\npaths = [\"street\"]\n");
    let cfg = Config::load_from(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(
        cfg.options_for("Address").map(|o| o.paths.clone()),
        Some(vec!["street".to_string()])
    );
}

#[test]
fn missing_file_yields_defaults() {
    let path = std::env::temp_dir().join("docstrip-definitely-not-here.toml");
    let cfg = Config::load_from(&path).unwrap();
    assert!(cfg.schemas.is_empty());
}

#[test]
fn parse_errors_name_the_file() {
    let path = temp_config("broken", "[schemas.User]\npaths = \"not-a-list\"\n");
    let err = Config::load_from(&path).unwrap_err();
    std::fs::remove_file(&path).ok();

    match err {
        Error::Msg(msg) => {
            assert!(msg.starts_with("Failed to parse"), "{msg}");
            assert!(msg.contains("docstrip-broken"), "{msg}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
