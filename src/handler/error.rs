// Handler error type
// Every failure in request processing ends up as exactly one of these

use hyper::StatusCode;
use thiserror::Error;

use crate::store::StoreError;
use crate::todo::ValidationError;

/// Tagged request-processing error; the variant decides status and message
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Malformed or missing client input
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// Update/delete against a key that does not exist
    #[error("Todo not found")]
    TodoNotFound,

    /// No route for this method and path
    #[error("Not Found")]
    RouteNotFound,

    /// Anything else; details are logged, never returned
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl HandlerError {
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Invalid(_) => StatusCode::BAD_REQUEST,
            Self::TodoNotFound | Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to return to the caller
    pub fn public_message(&self) -> String {
        match self {
            Self::Store(_) => "Internal Server Error".to_string(),
            other => other.to_string(),
        }
    }

    pub const fn is_unexpected(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            HandlerError::from(ValidationError::TitleRequired).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(HandlerError::TodoNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(HandlerError::RouteNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            HandlerError::from(StoreError::backend("Query", "boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_public_messages() {
        assert_eq!(
            HandlerError::from(ValidationError::NothingToUpdate).public_message(),
            "Nothing to update"
        );
        assert_eq!(HandlerError::TodoNotFound.public_message(), "Todo not found");
        assert_eq!(HandlerError::RouteNotFound.public_message(), "Not Found");
    }

    #[test]
    fn test_store_details_are_not_leaked() {
        let err = HandlerError::from(StoreError::backend("PutItem", "secret-table exploded"));
        assert!(err.is_unexpected());
        assert_eq!(err.public_message(), "Internal Server Error");
        assert!(err.to_string().contains("secret-table"));
    }
}
