use std::path::PathBuf;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the library
#[derive(Debug)]
pub enum Error {
    IoError(std::io::Error),
    /// The application definition is inconsistent (unknown class, cycle, bad choices, ...)
    Definition(String),
    /// A value has no literal representation
    Representation { type_name: String },
    ManifestError { file: PathBuf, message: String },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::IoError(e) => write!(f, "IO error: {}", e),
            Error::Definition(msg) => write!(f, "Invalid application definition: {}", msg),
            Error::Representation { type_name } => {
                write!(f, "No literal representation for value of type {}", type_name)
            }
            Error::ManifestError { file, message } => {
                write!(f, "Manifest error {}: {}", file.display(), message)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ManifestError {
            file: PathBuf::from("<unknown>"),
            message: format!("JSON error: {}", err),
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::ManifestError {
            file: PathBuf::from("<unknown>"),
            message: format!("YAML error: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_definition_error() {
        let err = Error::Definition("class 'Foo' is not defined".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid application definition: class 'Foo' is not defined"
        );
    }

    #[test]
    fn test_io_error_has_source() {
        use std::error::Error as _;
        let err = Error::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(err.source().is_some());
        assert!(Error::Definition("x".into()).source().is_none());
    }
}
