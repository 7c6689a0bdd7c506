//! Mapping from document store failures to domain errors.

use super::Error;
use super::ports::DocumentStoreError;

/// Translate a store failure into the domain taxonomy.
///
/// Connection failures surface as `service_unavailable`; everything else is
/// an internal persistence failure. Services that expect a duplicate key
/// (unique names) match on it before calling this.
pub(crate) fn map_store_error(error: DocumentStoreError) -> Error {
    match error {
        DocumentStoreError::Connection { message } => {
            Error::service_unavailable(format!("document store unavailable: {message}"))
        }
        DocumentStoreError::Query { message } => {
            Error::internal(format!("document store error: {message}"))
        }
        DocumentStoreError::DuplicateKey { collection, id } => {
            Error::internal(format!("unexpected duplicate key {collection}/{id}"))
        }
        DocumentStoreError::InvalidDocument { message } => {
            Error::internal(format!("stored document is invalid: {message}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(DocumentStoreError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(DocumentStoreError::query("syntax"), ErrorCode::InternalError)]
    #[case(DocumentStoreError::duplicate_key("posts", "p1"), ErrorCode::InternalError)]
    #[case(DocumentStoreError::invalid_document("bad"), ErrorCode::InternalError)]
    fn store_errors_map_to_codes(#[case] error: DocumentStoreError, #[case] code: ErrorCode) {
        assert_eq!(map_store_error(error).code(), code);
    }
}
