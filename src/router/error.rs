use std::fmt;

/// Route registration error
///
/// These are programming mistakes discoverable at startup. The `on_*`
/// registration methods panic with this message; `try_on_method` hands it
/// back instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// The path was the empty string
    EmptyPath,
    /// The path does not begin with `/`
    MissingLeadingSlash {
        /// The offending path
        path: String,
    },
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::EmptyPath => write!(f, "Path must not be empty"),
            RouteError::MissingLeadingSlash { path } => {
                write!(f, "Path must begin with '/' in path '{}'", path)
            }
        }
    }
}

impl std::error::Error for RouteError {}

/// Check that `path` is usable as a route path.
pub fn validate_path(path: &str) -> Result<(), RouteError> {
    if path.is_empty() {
        return Err(RouteError::EmptyPath);
    }
    if !path.starts_with('/') {
        return Err(RouteError::MissingLeadingSlash {
            path: path.to_string(),
        });
    }
    Ok(())
}
