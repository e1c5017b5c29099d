//! Repository pattern for document-store operations
//!
//! Every store round-trip goes through here so error conversion and
//! per-operation metrics live in one place.

use crate::db::models::{Artwork, Favorite, PUBLIC_VISIBILITY};
use crate::db::{Store, ARTWORKS_COLLECTION, FAVORITES_COLLECTION};
use crate::errors::{AppError, Result};
use crate::metrics::record_store_op;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use std::future::Future;
use std::time::Instant;

/// Outcome of a merge-update against an artwork
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// A record with the given identity exists
    pub matched: bool,
    /// At least one field actually changed value
    pub modified: bool,
}

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    store: Store,
}

impl Repository {
    /// Create a new repository over the shared store handle
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Run one store round-trip, recording latency and converting errors
    async fn run<T>(
        &self,
        collection: &'static str,
        op: &'static str,
        fut: impl Future<Output = mongodb::error::Result<T>>,
    ) -> Result<T> {
        let start = Instant::now();
        let result = fut.await;
        record_store_op(collection, op, start.elapsed().as_secs_f64(), result.is_ok());
        result.map_err(Into::into)
    }

    // ========================================================================
    // Health Check
    // ========================================================================

    /// Ping the store
    pub async fn ping(&self) -> Result<()> {
        self.store.ping().await
    }

    // ========================================================================
    // Artwork Operations
    // ========================================================================

    /// List public artworks, optionally restricted to one owner.
    ///
    /// The visibility filter is always applied, so an owner filter can
    /// never expose another user's private work.
    pub async fn list_public_artworks(&self, owner: Option<&str>) -> Result<Vec<Artwork>> {
        let mut filter = doc! { "visibility": PUBLIC_VISIBILITY };
        if let Some(email) = owner {
            filter.insert("userEmail", email);
        }

        let cursor = self
            .run(
                ARTWORKS_COLLECTION,
                "find",
                self.store.artworks.find(filter, None),
            )
            .await?;

        cursor.try_collect().await.map_err(Into::into)
    }

    /// Persist one new artwork and return its assigned identity
    pub async fn insert_artwork(&self, artwork: &Artwork) -> Result<ObjectId> {
        let result = self
            .run(
                ARTWORKS_COLLECTION,
                "insert_one",
                self.store.artworks.insert_one(artwork, None),
            )
            .await?;

        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| AppError::Internal {
                message: "store returned a non-ObjectId identity".to_string(),
            })
    }

    /// The `limit` newest artworks, newest first.
    ///
    /// Recency is descending `_id`: ObjectIds are monotonically increasing
    /// at creation time, there is no timestamp field to sort on.
    pub async fn featured_artworks(&self, limit: i64) -> Result<Vec<Artwork>> {
        let options = FindOptions::builder()
            .sort(doc! { "_id": -1 })
            .limit(limit)
            .build();

        let cursor = self
            .run(
                ARTWORKS_COLLECTION,
                "find",
                self.store.artworks.find(None, options),
            )
            .await?;

        cursor.try_collect().await.map_err(Into::into)
    }

    /// Find one artwork by identity
    pub async fn find_artwork_by_id(&self, id: ObjectId) -> Result<Option<Artwork>> {
        self.run(
            ARTWORKS_COLLECTION,
            "find_one",
            self.store.artworks.find_one(doc! { "_id": id }, None),
        )
        .await
    }

    /// Merge-assign the supplied fields onto an existing artwork.
    /// Fields not supplied are untouched.
    pub async fn update_artwork(&self, id: ObjectId, fields: Document) -> Result<UpdateOutcome> {
        let result = self
            .run(
                ARTWORKS_COLLECTION,
                "update_one",
                self.store
                    .artworks
                    .update_one(doc! { "_id": id }, doc! { "$set": fields }, None),
            )
            .await?;

        Ok(UpdateOutcome {
            matched: result.matched_count > 0,
            modified: result.modified_count > 0,
        })
    }

    /// Delete at most one artwork; true when a record was removed
    pub async fn delete_artwork(&self, id: ObjectId) -> Result<bool> {
        let result = self
            .run(
                ARTWORKS_COLLECTION,
                "delete_one",
                self.store.artworks.delete_one(doc! { "_id": id }, None),
            )
            .await?;

        Ok(result.deleted_count > 0)
    }

    /// Atomically increment the like counter and return the new count.
    ///
    /// Increment and read-back are a single store-level operation, so two
    /// concurrent likes both land and observe distinct counts.
    pub async fn like_artwork(&self, id: ObjectId) -> Result<Option<i64>> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .run(
                ARTWORKS_COLLECTION,
                "find_one_and_update",
                self.store.artworks.find_one_and_update(
                    doc! { "_id": id },
                    doc! { "$inc": { "likes": 1_i64 } },
                    options,
                ),
            )
            .await?;

        Ok(updated.map(|artwork| artwork.likes()))
    }

    // ========================================================================
    // Favorite Operations
    // ========================================================================

    /// Find an existing favorite for the given (artwork, user) pair
    pub async fn find_favorite(
        &self,
        artwork_id: &str,
        user_email: &str,
    ) -> Result<Option<Favorite>> {
        self.run(
            FAVORITES_COLLECTION,
            "find_one",
            self.store.favorites.find_one(
                doc! { "artworkId": artwork_id, "userEmail": user_email },
                None,
            ),
        )
        .await
    }

    /// Insert a favorite; a duplicate (artworkId, userEmail) pair is
    /// rejected by the unique index and surfaces as a conflict.
    pub async fn insert_favorite(&self, favorite: &Favorite) -> Result<ObjectId> {
        let inserted = self
            .run(
                FAVORITES_COLLECTION,
                "insert_one",
                self.store.favorites.insert_one(favorite, None),
            )
            .await;

        match inserted {
            Ok(result) => result
                .inserted_id
                .as_object_id()
                .ok_or_else(|| AppError::Internal {
                    message: "store returned a non-ObjectId identity".to_string(),
                }),
            Err(AppError::Database(err)) if is_duplicate_key(&err) => {
                Err(AppError::DuplicateFavorite {
                    artwork_id: favorite.artwork_id.clone(),
                    user_email: favorite.user_email.clone(),
                })
            }
            Err(err) => Err(err),
        }
    }

    /// All favorites for one user, store order
    pub async fn favorites_by_user(&self, user_email: &str) -> Result<Vec<Favorite>> {
        let cursor = self
            .run(
                FAVORITES_COLLECTION,
                "find",
                self.store
                    .favorites
                    .find(doc! { "userEmail": user_email }, None),
            )
            .await?;

        cursor.try_collect().await.map_err(Into::into)
    }

    /// Delete at most one favorite; true when a record was removed
    pub async fn delete_favorite(&self, id: ObjectId) -> Result<bool> {
        let result = self
            .run(
                FAVORITES_COLLECTION,
                "delete_one",
                self.store.favorites.delete_one(doc! { "_id": id }, None),
            )
            .await?;

        Ok(result.deleted_count > 0)
    }

    // ========================================================================
    // Artist Operations
    // ========================================================================

    /// Count artworks owned by an artist. Visibility is intentionally not
    /// filtered: the count covers private works too.
    pub async fn count_artworks_by_artist(&self, user_email: &str) -> Result<u64> {
        self.run(
            ARTWORKS_COLLECTION,
            "count_documents",
            self.store
                .artworks
                .count_documents(doc! { "userEmail": user_email }, None),
        )
        .await
    }
}

/// The server-side duplicate-key write error (code 11000) raised by the
/// unique favorites index
fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == 11000
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_write_error_is_not_duplicate_key() {
        let err = mongodb::error::Error::from(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "connection reset",
        ));
        assert!(!is_duplicate_key(&err));
    }

    #[test]
    fn test_update_outcome_distinguishes_unchanged() {
        let matched_unchanged = UpdateOutcome {
            matched: true,
            modified: false,
        };
        let missing = UpdateOutcome {
            matched: false,
            modified: false,
        };
        assert_ne!(matched_unchanged, missing);
    }
}
