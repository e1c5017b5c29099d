//! Artwork management handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use mongodb::bson::{self, oid::ObjectId, Document};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::models::Artwork;
use crate::db::Repository;
use crate::errors::{AppError, Result};
use crate::handlers::AppJson;
use crate::AppState;

/// Number of records served by the featured endpoint
const FEATURED_LIMIT: i64 = 6;

/// Query parameters for the public listing
#[derive(Debug, Default, Deserialize)]
pub struct ListArtworksParams {
    /// Case-insensitive substring match against title
    pub search: Option<String>,

    /// Exact match against the owner email
    pub email: Option<String>,
}

/// Request to create a new artwork
#[derive(Debug, Deserialize, Validate)]
pub struct CreateArtworkRequest {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,

    #[validate(length(min = 1, message = "imageUrl is required"))]
    #[serde(rename = "imageUrl")]
    pub image_url: String,

    #[serde(rename = "userEmail", default)]
    pub user_email: Option<String>,

    #[serde(default)]
    pub visibility: Option<String>,

    #[serde(default)]
    pub likes: Option<i64>,

    /// Any additional fields, persisted verbatim
    #[serde(flatten)]
    pub extra: Document,
}

/// Response after creating an artwork
#[derive(Serialize)]
pub struct CreateArtworkResponse {
    pub message: String,
    pub id: String,
}

/// Response after updating an artwork
#[derive(Serialize)]
pub struct UpdateArtworkResponse {
    pub message: String,
    pub modified: bool,
}

/// Response after deleting an artwork
#[derive(Serialize)]
pub struct DeleteArtworkResponse {
    pub message: String,
}

/// Response after liking an artwork
#[derive(Serialize)]
pub struct LikeResponse {
    pub likes: i64,
}

/// Response shape for a single artwork
#[derive(Debug, Serialize)]
pub struct ArtworkResponse {
    pub id: String,
    pub title: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    #[serde(rename = "userEmail", skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    pub likes: i64,
    #[serde(flatten)]
    pub extra: Document,
}

impl From<Artwork> for ArtworkResponse {
    fn from(artwork: Artwork) -> Self {
        Self {
            id: artwork.id.map(|id| id.to_hex()).unwrap_or_default(),
            likes: artwork.likes(),
            title: artwork.title,
            image_url: artwork.image_url,
            user_email: artwork.user_email,
            visibility: artwork.visibility,
            extra: artwork.extra,
        }
    }
}

/// List public artworks with optional title search and owner filter
pub async fn list_artworks(
    State(state): State<AppState>,
    Query(params): Query<ListArtworksParams>,
) -> Result<Json<Vec<ArtworkResponse>>> {
    let repo = Repository::new(state.store.clone());

    let artworks = repo.list_public_artworks(params.email.as_deref()).await?;
    let artworks = visible_artworks(artworks, params.search.as_deref());

    Ok(Json(artworks.into_iter().map(Into::into).collect()))
}

/// Create a new artwork
pub async fn create_artwork(
    State(state): State<AppState>,
    AppJson(request): AppJson<CreateArtworkRequest>,
) -> Result<(StatusCode, Json<CreateArtworkResponse>)> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let artwork = Artwork {
        id: None,
        title: request.title,
        image_url: request.image_url,
        user_email: request.user_email,
        visibility: request.visibility,
        likes: request.likes,
        extra: request.extra,
    };

    let repo = Repository::new(state.store.clone());
    let id = repo.insert_artwork(&artwork).await?;

    tracing::info!(
        artwork_id = %id,
        title = %artwork.title,
        "Artwork created"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateArtworkResponse {
            message: "Artwork added successfully!".to_string(),
            id: id.to_hex(),
        }),
    ))
}

/// The six newest artworks, newest first
pub async fn featured_artworks(
    State(state): State<AppState>,
) -> Result<Json<Vec<ArtworkResponse>>> {
    let repo = Repository::new(state.store.clone());

    let artworks = repo.featured_artworks(FEATURED_LIMIT).await?;

    Ok(Json(artworks.into_iter().map(Into::into).collect()))
}

/// Fetch one artwork by identifier
pub async fn get_artwork(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ArtworkResponse>> {
    let artwork_id = parse_object_id(&id)?;
    let repo = Repository::new(state.store.clone());

    let artwork = repo
        .find_artwork_by_id(artwork_id)
        .await?
        .ok_or(AppError::ArtworkNotFound { id })?;

    Ok(Json(artwork.into()))
}

/// Merge-update an artwork: supplied fields are assigned, the rest
/// stay untouched
pub async fn update_artwork(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(body): AppJson<serde_json::Value>,
) -> Result<Json<UpdateArtworkResponse>> {
    let artwork_id = parse_object_id(&id)?;
    let fields = build_update_document(&body)?;

    let repo = Repository::new(state.store.clone());
    let outcome = repo.update_artwork(artwork_id, fields).await?;

    if !outcome.matched {
        return Err(AppError::ArtworkNotFound { id });
    }

    // A matched record where no field changed value is still a success;
    // the flag keeps the two cases observable for callers.
    let message = if outcome.modified {
        "Artwork updated successfully!"
    } else {
        "No changes applied."
    };

    Ok(Json(UpdateArtworkResponse {
        message: message.to_string(),
        modified: outcome.modified,
    }))
}

/// Delete an artwork by identifier
pub async fn delete_artwork(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteArtworkResponse>> {
    let artwork_id = parse_object_id(&id)?;
    let repo = Repository::new(state.store.clone());

    if !repo.delete_artwork(artwork_id).await? {
        return Err(AppError::ArtworkNotFound { id });
    }

    tracing::info!(artwork_id = %id, "Artwork deleted");

    Ok(Json(DeleteArtworkResponse {
        message: "Artwork deleted successfully!".to_string(),
    }))
}

/// Atomically increment the like counter and return the new count
pub async fn like_artwork(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LikeResponse>> {
    let artwork_id = parse_object_id(&id)?;
    let repo = Repository::new(state.store.clone());

    let likes = repo
        .like_artwork(artwork_id)
        .await?
        .ok_or(AppError::ArtworkNotFound { id })?;

    Ok(Json(LikeResponse { likes }))
}

/// Parse a path identifier, rejecting malformed values before any
/// store call
pub(crate) fn parse_object_id(id: &str) -> Result<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| AppError::InvalidIdentifier {
        value: id.to_string(),
    })
}

/// The listing's result set: public records only, optionally narrowed by
/// the title search. The store query already filters on visibility; the
/// post-filter keeps the endpoint's contract independent of the query.
fn visible_artworks(artworks: Vec<Artwork>, search: Option<&str>) -> Vec<Artwork> {
    let mut artworks = artworks;
    artworks.retain(Artwork::is_public);
    apply_title_search(artworks, search)
}

/// In-process title search: trimmed, lower-cased, substring containment.
/// Applied to the store-filtered public set.
fn apply_title_search(artworks: Vec<Artwork>, search: Option<&str>) -> Vec<Artwork> {
    let needle = match search.map(str::trim).filter(|term| !term.is_empty()) {
        Some(term) => term.to_lowercase(),
        None => return artworks,
    };

    artworks
        .into_iter()
        .filter(|artwork| artwork.title.to_lowercase().contains(&needle))
        .collect()
}

/// Build the `$set` document for a merge-update. The identity field is
/// never assignable; an empty field set is a validation error.
fn build_update_document(body: &serde_json::Value) -> Result<Document> {
    let mut fields = bson::to_document(body).map_err(|_| AppError::Validation {
        message: "update payload must be a JSON object".to_string(),
        field: None,
    })?;

    fields.remove("_id");

    if fields.is_empty() {
        return Err(AppError::Validation {
            message: "no fields to update".to_string(),
            field: None,
        });
    }

    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn artwork(title: &str) -> Artwork {
        Artwork {
            id: Some(ObjectId::new()),
            title: title.to_string(),
            image_url: "u".to_string(),
            user_email: None,
            visibility: Some("Public".to_string()),
            likes: None,
            extra: Document::new(),
        }
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let artworks = vec![artwork("Sunset"), artwork("Moonrise")];
        let found = apply_title_search(artworks, Some("sun"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Sunset");
    }

    #[test]
    fn test_search_term_is_trimmed() {
        let artworks = vec![artwork("Sunset")];
        let found = apply_title_search(artworks, Some("  SUN  "));
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_blank_search_returns_everything() {
        let artworks = vec![artwork("a"), artwork("b")];
        assert_eq!(apply_title_search(artworks.clone(), None).len(), 2);
        assert_eq!(apply_title_search(artworks, Some("   ")).len(), 2);
    }

    #[test]
    fn test_search_with_no_match_is_empty() {
        let artworks = vec![artwork("Sunset")];
        assert!(apply_title_search(artworks, Some("ocean")).is_empty());
    }

    #[test]
    fn test_listing_never_exposes_non_public_records() {
        let mut private = artwork("Hidden Sunset");
        private.visibility = Some("Private".to_string());
        let mut unset = artwork("Unset Sunset");
        unset.visibility = None;
        let artworks = vec![artwork("Sunset"), private, unset];

        let visible = visible_artworks(artworks, None);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title, "Sunset");

        let found = visible_artworks(
            vec![artwork("Sunset"), {
                let mut a = artwork("Sunrise");
                a.visibility = Some("Private".to_string());
                a
            }],
            Some("sun"),
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Sunset");
    }

    #[test]
    fn test_update_document_strips_identity() {
        let fields =
            build_update_document(&json!({ "_id": "abc", "title": "New" })).unwrap();
        assert!(!fields.contains_key("_id"));
        assert_eq!(fields.get_str("title").unwrap(), "New");
    }

    #[test]
    fn test_empty_update_is_rejected() {
        let err = build_update_document(&json!({})).unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));

        let err = build_update_document(&json!({ "_id": "abc" })).unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[test]
    fn test_non_object_update_is_rejected() {
        let err = build_update_document(&json!("just a string")).unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[test]
    fn test_malformed_identifier_is_rejected() {
        let err = parse_object_id("not-an-oid").unwrap_err();
        assert!(matches!(err, AppError::InvalidIdentifier { .. }));

        let id = ObjectId::new();
        assert_eq!(parse_object_id(&id.to_hex()).unwrap(), id);
    }

    #[test]
    fn test_response_defaults() {
        let mut source = artwork("t");
        source.likes = None;
        let id = source.id.unwrap();

        let response = ArtworkResponse::from(source);
        assert_eq!(response.likes, 0);
        assert_eq!(response.id, id.to_hex());
    }

    #[test]
    fn test_create_request_rejects_empty_required_fields() {
        let request: CreateArtworkRequest = serde_json::from_value(json!({
            "title": "",
            "imageUrl": "u"
        }))
        .unwrap();
        assert!(request.validate().is_err());

        let request: CreateArtworkRequest = serde_json::from_value(json!({
            "title": "A",
            "imageUrl": "u",
            "medium": "oil"
        }))
        .unwrap();
        assert!(request.validate().is_ok());
        assert_eq!(request.extra.get_str("medium").unwrap(), "oil");
    }
}
