use thiserror::Error;

use crate::catalog::jikan::JikanError;

/// Failures a mood selection can end in. None of them are fatal; each maps to
/// a message the user sees in place of a recommendation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecommendationError {
    #[error("Genre ID is required")]
    MissingParameter,
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Rate limited by upstream catalog")]
    RateLimited,
    #[error("Transport failure: {0}")]
    TransportFailure(String),
    #[error("No qualifying anime found")]
    EmptyResult,
}

impl RecommendationError {
    pub fn user_message(&self) -> String {
        match self {
            RecommendationError::MissingParameter => "Genre ID is required".to_string(),
            RecommendationError::InvalidParameter(detail) => detail.clone(),
            RecommendationError::RateLimited => {
                "Too many requests. Please wait a moment and try again.".to_string()
            }
            RecommendationError::TransportFailure(_) => {
                "An error occurred while fetching anime data. Please try again later.".to_string()
            }
            RecommendationError::EmptyResult => {
                "No anime found for this mood. Try a different mood!".to_string()
            }
        }
    }
}

impl From<&JikanError> for RecommendationError {
    fn from(err: &JikanError) -> Self {
        match err {
            JikanError::RateLimited => RecommendationError::RateLimited,
            other => RecommendationError::TransportFailure(other.to_string()),
        }
    }
}

impl From<JikanError> for RecommendationError {
    fn from(err: JikanError) -> Self {
        Self::from(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_is_not_transport_failure() {
        let err: RecommendationError = JikanError::RateLimited.into();
        assert_eq!(err, RecommendationError::RateLimited);

        let err: RecommendationError = JikanError::ApiError("HTTP 503".to_string()).into();
        assert!(matches!(err, RecommendationError::TransportFailure(_)));

        let shared = std::sync::Arc::new(JikanError::RateLimited);
        assert_eq!(RecommendationError::from(&*shared), RecommendationError::RateLimited);
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            RecommendationError::EmptyResult.user_message(),
            "No anime found for this mood. Try a different mood!"
        );
        assert_eq!(
            RecommendationError::TransportFailure("boom".into()).user_message(),
            "An error occurred while fetching anime data. Please try again later."
        );
    }
}
