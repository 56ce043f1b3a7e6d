//! Error taxonomy for the pieces of rendering that can fail on bad input
//! (scene files, mesh files, I/O). Numerical anomalies during rendering
//! itself (degenerate triangles, parallel rays, a canvas write that's out of
//! bounds) are programmer bugs or render-time edge cases handled by panics
//! or epsilon guards at the call site, not by this enum.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to read scene spec {path}: {source}")]
    SpecRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse scene spec {path}: {source}")]
    SpecParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid scene spec {path}: {reason}")]
    SpecValidation { path: PathBuf, reason: String },

    #[error("failed to read mesh file {path}: {source}")]
    MeshRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse mesh file {path} at line {line}: {reason}")]
    MeshParse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("invalid mesh file {path}: {reason}")]
    MeshValidation { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
