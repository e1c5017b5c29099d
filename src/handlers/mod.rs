//! API handlers module

pub mod artists;
pub mod artworks;
pub mod favorites;
pub mod health;

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};

use crate::errors::AppError;

/// JSON body extractor that reports malformed or incomplete bodies with
/// the standard error envelope instead of axum's plain-text rejection
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::Validation {
                message: rejection.body_text(),
                field: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::artworks::CreateArtworkRequest;
    use crate::handlers::favorites::CreateFavoriteRequest;
    use axum::body::Body;
    use axum::http::header::CONTENT_TYPE;

    fn json_request(body: &'static str) -> Request {
        Request::builder()
            .method("POST")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_missing_title_maps_to_validation_error() {
        let request = json_request(r#"{"imageUrl":"u"}"#);

        let err = AppJson::<CreateArtworkRequest>::from_request(request, &())
            .await
            .map(|_| ())
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
        assert!(err.to_string().contains("title"));
    }

    #[tokio::test]
    async fn test_missing_favorite_fields_map_to_validation_error() {
        let request = json_request(r#"{"artworkId":"abc"}"#);

        let err = AppJson::<CreateFavoriteRequest>::from_request(request, &())
            .await
            .map(|_| ())
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
        assert!(err.to_string().contains("userEmail"));
    }

    #[tokio::test]
    async fn test_well_formed_body_passes_through() {
        let request = json_request(r#"{"title":"A","imageUrl":"u"}"#);

        let AppJson(parsed) = AppJson::<CreateArtworkRequest>::from_request(request, &())
            .await
            .unwrap();

        assert_eq!(parsed.title, "A");
        assert_eq!(parsed.image_url, "u");
    }
}
