//! Errors raised while turning OBJ text into vertex buffers.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObjError {
    #[error("Failed to read OBJ data: {0}")]
    Io(#[from] io::Error),

    /// `line` is 1-based.
    #[error("Malformed OBJ line {line}: {reason}")]
    Parse { line: usize, reason: String },

    /// `index` is the 0-based index after conversion from the file.
    #[error("{table} index {index} out of range (len={len})")]
    IndexOutOfRange {
        table: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Face lists differ: {positions} position faces vs {normals} normal faces")]
    FaceCountMismatch { positions: usize, normals: usize },

    #[error("OBJ contained no triangles")]
    Empty,
}

impl ObjError {
    pub(crate) fn parse(line_no: usize, reason: impl Into<String>) -> Self {
        Self::Parse {
            line: line_no + 1,
            reason: reason.into(),
        }
    }
}
