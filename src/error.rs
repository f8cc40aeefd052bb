//! Crate-wide error type

use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything the pipeline can fail with. Invalid inputs (graphs, patterns,
/// colorings, configuration) abort the run with a message; `Internal` means
/// a kernel invariant was violated and indicates a bug rather than bad
/// input.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("cannot parse {path}: {reason}")]
    GraphFormat { path: String, reason: String },

    #[error("unknown pattern descriptor `{0}`")]
    UnknownPattern(String),

    #[error("invalid coloring: {0}")]
    InvalidColoring(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("cannot write execution data: {0}")]
    ExecData(String),

    #[error("internal invariant violated: {0}")]
    Internal(String),
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn io_errors_convert() {
        fn read_missing() -> Result<String> {
            Ok(std::fs::read_to_string("/definitely/not/here")?)
        }
        assert!(matches!(read_missing(), Err(Error::Io(_))));
    }

    #[test]
    fn messages_name_the_failure() {
        let err = Error::GraphFormat {
            path: "g.txt".into(),
            reason: "bad edge line".into(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("g.txt") && rendered.contains("bad edge line"));

        let err = Error::UnknownPattern("clique".into());
        assert!(err.to_string().contains("clique"));
    }
}
