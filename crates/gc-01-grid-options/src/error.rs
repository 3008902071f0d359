//! Error types for the grid options subsystem

use thiserror::Error;

/// Errors raised while building or validating a grid configuration.
///
/// Structural errors abort building the widget's configuration; no partially
/// valid document is ever produced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("column group at {path} also binds field `{field}`")]
    GroupWithFieldBinding { path: String, field: String },

    #[error("column group at {path} also binds component `{component}`")]
    GroupWithRendererBinding { path: String, component: String },

    #[error("column group at {path} has no children")]
    EmptyGroup { path: String },

    #[error("invalid column document at {path}: {reason}")]
    InvalidColumnDocument { path: String, reason: String },

    #[error("invalid raw expression: {reason}")]
    InvalidRawExpression { reason: String },
}

impl ConfigurationError {
    pub(crate) fn invalid_document(path: &str, reason: impl Into<String>) -> Self {
        Self::InvalidColumnDocument {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

/// Render a column position as `columnDefs[1].children[0]`.
pub(crate) fn describe_path(path: &[usize]) -> String {
    let mut out = String::from("columnDefs");
    for (depth, index) in path.iter().enumerate() {
        if depth == 0 {
            out.push_str(&format!("[{index}]"));
        } else {
            out.push_str(&format!(".children[{index}]"));
        }
    }
    out
}
