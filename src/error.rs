use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors returned by the graph store.
///
/// Absence is never an error here: missing vertices, edges or
/// properties come back as `None` or empty collections from the query
/// surface. This enum covers rejected input and broken persistence.
#[derive(Error, Debug)]
pub enum GraphError {
    /// A property value outside the supported primitive union was
    /// submitted at the dynamic ingestion boundary.
    #[error("invalid property type for '{name}': {found}")]
    InvalidPropertyType { name: String, found: String },

    /// A snapshot file failed structural validation; no partial store
    /// is ever returned.
    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    /// A configuration value is unusable, e.g. a zero shard count.
    #[error("configuration error: {0}")]
    ConfigurationError(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GraphError::InvalidPropertyType {
            name: "tags".to_string(),
            found: "array".to_string(),
        };
        assert_eq!(err.to_string(), "invalid property type for 'tags': array");

        let err = GraphError::CorruptSnapshot("bad magic tag".to_string());
        assert_eq!(err.to_string(), "corrupt snapshot: bad magic tag");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: GraphError = io.into();
        assert!(matches!(err, GraphError::Io(_)));
    }
}
