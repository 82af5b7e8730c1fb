use std::path::PathBuf;

use gitcas_store::ObjectKind;
use gitcas_types::{ObjectId, TypeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("repository not initialized at {0}")]
    NotInitialized(String),

    #[error("expected {expected} object at {id}, found {found}")]
    UnexpectedKind {
        id: ObjectId,
        expected: ObjectKind,
        found: ObjectKind,
    },

    #[error("HEAD is detached; no branch to advance")]
    DetachedHead,

    #[error("cannot read source file {}: {source}", .path.display())]
    Source {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid identity: {0}")]
    Identity(#[from] TypeError),

    #[error("config error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(#[from] gitcas_store::StoreError),

    #[error("ref error: {0}")]
    Ref(#[from] gitcas_refs::RefError),
}

pub type SdkResult<T> = Result<T, SdkError>;
