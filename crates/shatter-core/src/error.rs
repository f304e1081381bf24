//! Error types for fracture and mesh I/O operations.
//!
//! The geometry core itself never fails: degenerate groups, zero-extent
//! sites, and missing UV channels are guarded inline so fracture degrades
//! to "fewer fragments" rather than an error. What remains fallible is the
//! surface around it: file I/O, parsing, and being handed an empty mesh.
//!
//! Each error carries a machine-readable code in the format `SHAT-XXXX`:
//! - `SHAT-1xxx`: I/O errors (file reading, writing, parsing)
//! - `SHAT-2xxx`: Input validation errors
//! - `SHAT-4xxx`: Format errors

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for fracture operations.
pub type ShatterResult<T> = Result<T, ShatterError>;

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// SHAT-1001: Failed to read file
    IoRead = 1001,
    /// SHAT-1002: Failed to write file
    IoWrite = 1002,
    /// SHAT-1003: Failed to parse file format
    ParseError = 1003,
    /// SHAT-2001: Face references invalid vertex index
    InvalidVertexIndex = 2001,
    /// SHAT-2003: Mesh has no vertices or faces
    EmptyMesh = 2003,
    /// SHAT-4001: Unsupported file format
    UnsupportedFormat = 4001,
}

impl ErrorCode {
    /// Returns the error code as a string in the format `SHAT-XXXX`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::IoRead => "SHAT-1001",
            ErrorCode::IoWrite => "SHAT-1002",
            ErrorCode::ParseError => "SHAT-1003",
            ErrorCode::InvalidVertexIndex => "SHAT-2001",
            ErrorCode::EmptyMesh => "SHAT-2003",
            ErrorCode::UnsupportedFormat => "SHAT-4001",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors that can occur around the fracture pipeline.
#[derive(Debug, Error, Diagnostic)]
pub enum ShatterError {
    /// Error reading from a file.
    #[error("failed to read mesh from {path}")]
    #[diagnostic(
        code(shatter::io::read),
        help("Check that the file exists and is readable")
    )]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error writing to a file.
    #[error("failed to write mesh to {path}")]
    #[diagnostic(
        code(shatter::io::write),
        help("Check that the directory exists and is writable")
    )]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing a mesh file.
    #[error("failed to parse mesh from {path}: {details}")]
    #[diagnostic(
        code(shatter::parse::error),
        help("The file may be corrupted or use an unsupported OBJ variant")
    )]
    ParseError { path: PathBuf, details: String },

    /// A face references a vertex index outside the vertex buffer.
    #[error("face {face} references vertex {index} but the mesh has {vertex_count} vertices")]
    #[diagnostic(
        code(shatter::validation::vertex_index),
        help("The index and vertex buffers disagree; re-export the mesh")
    )]
    InvalidVertexIndex {
        face: usize,
        index: u32,
        vertex_count: usize,
    },

    /// Empty mesh (no vertices or faces).
    #[error("mesh is empty: {details}")]
    #[diagnostic(
        code(shatter::validation::empty),
        help("The mesh must have at least one vertex and one face")
    )]
    EmptyMesh { details: String },

    /// Unsupported file format.
    #[error("unsupported mesh format: {extension:?}")]
    #[diagnostic(code(shatter::format::unsupported), help("Supported formats: OBJ"))]
    UnsupportedFormat { extension: Option<String> },
}

impl ShatterError {
    /// The machine-readable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            ShatterError::IoRead { .. } => ErrorCode::IoRead,
            ShatterError::IoWrite { .. } => ErrorCode::IoWrite,
            ShatterError::ParseError { .. } => ErrorCode::ParseError,
            ShatterError::InvalidVertexIndex { .. } => ErrorCode::InvalidVertexIndex,
            ShatterError::EmptyMesh { .. } => ErrorCode::EmptyMesh,
            ShatterError::UnsupportedFormat { .. } => ErrorCode::UnsupportedFormat,
        }
    }

    /// A short recovery hint suitable for CLI display.
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ShatterError::IoRead { .. } => "Check the path and file permissions",
            ShatterError::IoWrite { .. } => "Check the output directory exists and is writable",
            ShatterError::ParseError { .. } => {
                "Re-export the mesh as a triangulated OBJ with UVs"
            }
            ShatterError::InvalidVertexIndex { .. } => {
                "The file's index buffer is corrupt; re-export the mesh"
            }
            ShatterError::EmptyMesh { .. } => "Provide a mesh with at least one triangle",
            ShatterError::UnsupportedFormat { .. } => "Convert the mesh to OBJ first",
        }
    }

    /// Convenience constructor for empty-mesh errors.
    pub fn empty_mesh(details: impl Into<String>) -> Self {
        ShatterError::EmptyMesh {
            details: details.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        let err = ShatterError::empty_mesh("no faces");
        assert_eq!(err.code(), ErrorCode::EmptyMesh);
        assert_eq!(err.code().as_str(), "SHAT-2003");
    }

    #[test]
    fn test_error_display() {
        let err = ShatterError::InvalidVertexIndex {
            face: 3,
            index: 17,
            vertex_count: 8,
        };
        let msg = err.to_string();
        assert!(msg.contains("face 3"));
        assert!(msg.contains("17"));
    }
}
