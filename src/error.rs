use std::result::Result as StdResult;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Bson(#[from] bson::ser::Error),

    #[error("cast to {expected} failed for value at path \"{path}\"")]
    Cast { path: String, expected: &'static str },

    #[error("cannot overwrite model `{0}` once compiled")]
    OverwriteModel(String),

    #[error("schema `{schema}` has no `{method}` method installed")]
    MethodNotInstalled {
        schema: String,
        method: &'static str,
    },

    #[error("{0}")]
    Msg(String),
}

pub type Result<T> = StdResult<T, Error>;
