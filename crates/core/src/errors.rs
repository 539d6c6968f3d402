use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while loading the product catalog.
///
/// These are the only errors allowed to abort assistant construction, and
/// they surface exactly once at startup. Everything downstream of the
/// catalog is converted into a displayable result at the facade boundary.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog source `{path}` is unavailable: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("catalog source `{path}` is missing required column `{column}`")]
    MissingColumn { path: PathBuf, column: &'static str },
    #[error("catalog source `{path}` has a malformed row: {message}")]
    MalformedRow { path: PathBuf, message: String },
}

/// Recoverable conditions produced by the retrieval pipeline. The facade
/// maps each of these to a user-displayable result; none of them may reach
/// the caller as a fault.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RetrievalError {
    #[error("the query contained no usable search terms")]
    NoUsableQuery,
    #[error("no catalog entry matched the query terms")]
    NoMatch,
    #[error("the catalog has no entries to search")]
    EmptyCatalog,
}

#[cfg(test)]
mod tests {
    use super::RetrievalError;

    #[test]
    fn retrieval_errors_render_user_readable_messages() {
        assert_eq!(
            RetrievalError::NoUsableQuery.to_string(),
            "the query contained no usable search terms"
        );
        assert_eq!(RetrievalError::NoMatch.to_string(), "no catalog entry matched the query terms");
        assert_eq!(
            RetrievalError::EmptyCatalog.to_string(),
            "the catalog has no entries to search"
        );
    }
}
