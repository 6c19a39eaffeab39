use std::io;
use std::path::{Path, PathBuf};

use thiserror;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error(transparent)]
    Glob(#[from] glob::GlobError),

    #[error("json encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Whether this error means the requested content does not exist, as opposed to the
    /// registry failing to read content that does.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Io { source, .. } => source.kind() == io::ErrorKind::NotFound,
            Error::Pattern(_) => true,
            Error::Glob(_) | Error::Json(_) => false,
        }
    }
}

#[cfg(test)]
mod test {
    use rstest::*;

    use super::*;

    #[rstest]
    #[case::missing(io::ErrorKind::NotFound, true)]
    #[case::permission(io::ErrorKind::PermissionDenied, false)]
    #[case::other(io::ErrorKind::Other, false)]
    fn io_classification(#[case] kind: io::ErrorKind, #[case] expected: bool) {
        let err = Error::io("/data/images/abc/json", io::Error::new(kind, "boom"));
        assert_eq!(err.is_not_found(), expected);
    }

    #[test]
    fn bad_pattern_is_not_found() {
        let err: Error = glob::Pattern::new("tag_[").unwrap_err().into();
        assert!(err.is_not_found());
    }

    #[test]
    fn io_message_names_path() {
        let err = Error::io(
            "/data/images/abc/json",
            io::Error::new(io::ErrorKind::NotFound, "no such file"),
        );
        assert_eq!(format!("{err}"), "/data/images/abc/json: no such file");
    }
}
