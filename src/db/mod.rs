//! Database layer for the Artify API
//!
//! Provides:
//! - Document models for both collections
//! - Repository pattern for data access
//! - Client/connection management and startup index creation

pub mod models;
mod repository;

pub use repository::{Repository, UpdateOutcome};

use crate::config::DatabaseConfig;
use crate::errors::{AppError, Result};
use models::{Artwork, Favorite};
use mongodb::bson::doc;
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, IndexModel};
use std::time::Duration;
use tracing::info;

pub const ARTWORKS_COLLECTION: &str = "artworks";
pub const FAVORITES_COLLECTION: &str = "favorites";

/// Shared document-store handle, established once at startup
#[derive(Clone)]
pub struct Store {
    client: Client,
    pub artworks: Collection<Artwork>,
    pub favorites: Collection<Favorite>,
}

impl Store {
    /// Connect to the document store and verify connectivity.
    ///
    /// Callers must not accept traffic before this returns: every handler
    /// assumes the shared client is live.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        info!("Connecting to document store...");

        let mut options = ClientOptions::parse(&config.uri)
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Invalid connection string: {}", e),
            })?;
        options.app_name = Some("artify-api".to_string());
        options.connect_timeout = Some(Duration::from_secs(config.connect_timeout_secs));

        let client = Client::with_options(options).map_err(|e| AppError::DatabaseConnection {
            message: format!("Failed to build client: {}", e),
        })?;

        let database = client.database(&config.name);
        let artworks = database.collection::<Artwork>(ARTWORKS_COLLECTION);
        let favorites = database.collection::<Favorite>(FAVORITES_COLLECTION);

        let store = Self {
            client,
            artworks,
            favorites,
        };

        store.ping().await?;
        info!(database = %config.name, "Document store connection established");

        Ok(store)
    }

    /// Ping the store to check connectivity
    pub async fn ping(&self) -> Result<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Ping failed: {}", e),
            })?;

        Ok(())
    }

    /// Create the indexes the service relies on.
    ///
    /// The compound unique index makes concurrent favorite-adds for the
    /// same (artworkId, userEmail) pair impossible at the store level, so
    /// the application-side duplicate check is advisory only.
    pub async fn ensure_indexes(&self) -> Result<()> {
        let unique_favorite = IndexModel::builder()
            .keys(doc! { "artworkId": 1, "userEmail": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("uniq_artwork_user".to_string())
                    .build(),
            )
            .build();
        self.favorites.create_index(unique_favorite, None).await?;

        let artist_lookup = IndexModel::builder()
            .keys(doc! { "userEmail": 1 })
            .options(IndexOptions::builder().name("artwork_owner".to_string()).build())
            .build();
        self.artworks.create_index(artist_lookup, None).await?;

        info!("Store indexes ensured");
        Ok(())
    }
}
