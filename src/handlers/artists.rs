//! Artist aggregate handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::db::Repository;
use crate::errors::Result;
use crate::AppState;

/// Artist artwork count response
#[derive(Serialize)]
pub struct ArtworkCountResponse {
    pub email: String,
    pub count: u64,
}

/// Count the artworks owned by an artist. Counts private works too:
/// this is the owner-facing number, not the public listing size.
pub async fn artwork_count(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<ArtworkCountResponse>> {
    let repo = Repository::new(state.store.clone());

    let count = repo.count_artworks_by_artist(&email).await?;

    Ok(Json(ArtworkCountResponse { email, count }))
}
