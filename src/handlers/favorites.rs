//! Favorite management handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::models::Favorite;
use crate::db::Repository;
use crate::errors::{AppError, Result};
use crate::handlers::artworks::parse_object_id;
use crate::handlers::AppJson;
use crate::AppState;

/// Request to add a favorite
#[derive(Debug, Deserialize, Validate)]
pub struct CreateFavoriteRequest {
    #[validate(length(min = 1, message = "artworkId is required"))]
    #[serde(rename = "artworkId")]
    pub artwork_id: String,

    #[validate(length(min = 1, message = "userEmail is required"))]
    #[serde(rename = "userEmail")]
    pub user_email: String,
}

/// Response after adding a favorite
#[derive(Serialize)]
pub struct CreateFavoriteResponse {
    pub message: String,
    pub id: String,
}

/// Response after deleting a favorite
#[derive(Serialize)]
pub struct DeleteFavoriteResponse {
    pub message: String,
}

/// Response shape for a single favorite
#[derive(Debug, Serialize)]
pub struct FavoriteResponse {
    pub id: String,
    #[serde(rename = "artworkId")]
    pub artwork_id: String,
    #[serde(rename = "userEmail")]
    pub user_email: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl From<Favorite> for FavoriteResponse {
    fn from(favorite: Favorite) -> Self {
        Self {
            id: favorite.id.map(|id| id.to_hex()).unwrap_or_default(),
            artwork_id: favorite.artwork_id,
            user_email: favorite.user_email,
            created_at: favorite.created_at.to_rfc3339(),
        }
    }
}

/// Add a favorite. At most one favorite may exist per
/// (artworkId, userEmail) pair; duplicates are a conflict.
pub async fn create_favorite(
    State(state): State<AppState>,
    AppJson(request): AppJson<CreateFavoriteRequest>,
) -> Result<(StatusCode, Json<CreateFavoriteResponse>)> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let repo = Repository::new(state.store.clone());

    // Advisory pre-check for a clean message; the unique index is what
    // actually closes the concurrent-insert race.
    if repo
        .find_favorite(&request.artwork_id, &request.user_email)
        .await?
        .is_some()
    {
        return Err(AppError::DuplicateFavorite {
            artwork_id: request.artwork_id,
            user_email: request.user_email,
        });
    }

    let favorite = Favorite {
        id: None,
        artwork_id: request.artwork_id,
        user_email: request.user_email,
        created_at: chrono::Utc::now(),
    };

    let id = repo.insert_favorite(&favorite).await?;

    tracing::info!(
        favorite_id = %id,
        artwork_id = %favorite.artwork_id,
        "Favorite added"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateFavoriteResponse {
            message: "Favorite added successfully!".to_string(),
            id: id.to_hex(),
        }),
    ))
}

/// List all favorites for one user.
///
/// The response is always a JSON array: callers bind this to a list, so
/// a store failure degrades to an empty array instead of an error
/// envelope.
pub async fn list_favorites(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Json<Vec<FavoriteResponse>> {
    let repo = Repository::new(state.store.clone());

    let favorites = match repo.favorites_by_user(&email).await {
        Ok(favorites) => favorites,
        Err(e) => {
            tracing::warn!(error = %e, user_email = %email, "Failed to list favorites");
            Vec::new()
        }
    };

    Json(favorites.into_iter().map(Into::into).collect())
}

/// Delete a favorite by identifier
pub async fn delete_favorite(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteFavoriteResponse>> {
    let favorite_id = parse_object_id(&id)?;
    let repo = Repository::new(state.store.clone());

    if !repo.delete_favorite(favorite_id).await? {
        return Err(AppError::FavoriteNotFound { id });
    }

    Ok(Json(DeleteFavoriteResponse {
        message: "Favorite removed successfully!".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;
    use serde_json::json;

    #[test]
    fn test_request_requires_both_fields_non_empty() {
        let request: CreateFavoriteRequest = serde_json::from_value(json!({
            "artworkId": "",
            "userEmail": "fan@example.com"
        }))
        .unwrap();
        assert!(request.validate().is_err());

        let request: CreateFavoriteRequest = serde_json::from_value(json!({
            "artworkId": "66f0a1b2c3d4e5f6a7b8c9d0",
            "userEmail": "fan@example.com"
        }))
        .unwrap();
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_response_mapping() {
        let id = ObjectId::new();
        let favorite = Favorite {
            id: Some(id),
            artwork_id: "abc".to_string(),
            user_email: "fan@example.com".to_string(),
            created_at: chrono::Utc::now(),
        };

        let response = FavoriteResponse::from(favorite);
        assert_eq!(response.id, id.to_hex());
        assert_eq!(response.artwork_id, "abc");
        // rfc3339 timestamps carry an explicit offset
        assert!(response.created_at.contains('T'));
    }
}
