//! Task loader
//!
//! Walks a directory of TICKscripts, templates and alert handler
//! definitions, parses every script with this crate and pushes the result
//! to a task-management API through a [`TaskClient`].
//!
//! ```text
//! <dir>/
//!     tasks/       *.tick                      one task per file
//!     templates/   *.tick, *.json|yaml|yml     templates and their task vars (optional)
//!     handlers/    *.json|yaml|yml             topic handlers
//! ```

mod client;
mod config;
mod service;

pub use client::{
    ClientCall, ClientError, CreateTaskOptions, MemoryClient, Task, TaskClient, TaskStatus,
    TaskVars, Template, TemplateOptions, TopicHandler, UpdateTaskOptions, Var,
};
pub use config::{LoadConfig, HANDLERS_DIR, TASKS_DIR, TEMPLATES_DIR};
pub use service::{Action, LoadReport, Loaded, LoadService, Resource};

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::ast::VarType;
use crate::parser::ParseError;

/// Errors raised while validating the load directory or loading a file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("dir must be an absolute path, got {}", .0.display())]
    RelativeDir(PathBuf),

    #[error("directory {} must contain subdirectory {subdir}", .dir.display())]
    MissingSubdirectory { dir: PathBuf, subdir: &'static str },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("failed to unmarshal json file {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to unmarshal yaml file {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("bad file extension for {}: must be YAML or JSON", .0.display())]
    UnsupportedExtension(PathBuf),

    /// The script has no `stream`/`batch` source, or has both.
    #[error("{id}: script must read from either stream or batch")]
    InvalidTaskType { id: String },

    #[error("{id}: var {name} is declared as {expected} but given as {found}")]
    VarTypeMismatch {
        id: String,
        name: String,
        expected: VarType,
        found: VarType,
    },

    #[error("{id}: value of var {name} is not a valid {var_type}")]
    InvalidVarValue {
        id: String,
        name: String,
        var_type: VarType,
    },

    #[error(transparent)]
    Client(#[from] ClientError),
}
