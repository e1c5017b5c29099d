//! Document models for the `artworks` and `favorites` collections

use chrono::{DateTime, Utc};
use mongodb::bson::{oid::ObjectId, Document};
use serde::{Deserialize, Serialize};

/// Visibility value that gates the public listing
pub const PUBLIC_VISIBILITY: &str = "Public";

/// One visual-art submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artwork {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub title: String,

    #[serde(rename = "imageUrl")]
    pub image_url: String,

    /// Owner email
    #[serde(rename = "userEmail", skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,

    /// "Public" or any other caller-supplied value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,

    /// Like counter, absent means 0
    #[serde(skip_serializing_if = "Option::is_none")]
    pub likes: Option<i64>,

    /// Any additional caller-supplied fields, persisted verbatim
    /// (medium, description, price, ...)
    #[serde(flatten)]
    pub extra: Document,
}

impl Artwork {
    pub fn is_public(&self) -> bool {
        self.visibility.as_deref() == Some(PUBLIC_VISIBILITY)
    }

    pub fn likes(&self) -> i64 {
        self.likes.unwrap_or(0)
    }
}

/// A user-to-artwork bookmark relation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Favorite {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// Artwork identity as an opaque hex string, not a DBRef
    #[serde(rename = "artworkId")]
    pub artwork_id: String,

    #[serde(rename = "userEmail")]
    pub user_email: String,

    #[serde(
        rename = "createdAt",
        with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime"
    )]
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{self, doc};

    #[test]
    fn test_artwork_bson_field_names() {
        let artwork = Artwork {
            id: None,
            title: "Sunset".into(),
            image_url: "https://img.example/sunset.png".into(),
            user_email: Some("artist@example.com".into()),
            visibility: Some(PUBLIC_VISIBILITY.into()),
            likes: None,
            extra: doc! { "medium": "oil on canvas" },
        };

        let document = bson::to_document(&artwork).unwrap();
        assert_eq!(document.get_str("imageUrl").unwrap(), "https://img.example/sunset.png");
        assert_eq!(document.get_str("userEmail").unwrap(), "artist@example.com");
        assert_eq!(document.get_str("medium").unwrap(), "oil on canvas");
        // Absent id and likes must not be written
        assert!(!document.contains_key("_id"));
        assert!(!document.contains_key("likes"));
    }

    #[test]
    fn test_artwork_roundtrip_keeps_extra_fields() {
        let document = doc! {
            "_id": ObjectId::new(),
            "title": "Dunes",
            "imageUrl": "u",
            "visibility": "Private",
            "likes": 3_i64,
            "description": "sand at dusk",
            "price": 120_i32,
        };

        let artwork: Artwork = bson::from_document(document).unwrap();
        assert!(!artwork.is_public());
        assert_eq!(artwork.likes(), 3);
        assert_eq!(artwork.extra.get_str("description").unwrap(), "sand at dusk");
        assert_eq!(artwork.extra.get_i32("price").unwrap(), 120);
    }

    #[test]
    fn test_is_public() {
        let mut artwork = Artwork {
            id: None,
            title: "t".into(),
            image_url: "u".into(),
            user_email: None,
            visibility: Some("Public".into()),
            likes: None,
            extra: Document::new(),
        };
        assert!(artwork.is_public());

        artwork.visibility = Some("public".into());
        assert!(!artwork.is_public(), "visibility match is exact");

        artwork.visibility = None;
        assert!(!artwork.is_public());
    }

    #[test]
    fn test_favorite_bson_field_names() {
        let favorite = Favorite {
            id: None,
            artwork_id: "66f0a1b2c3d4e5f6a7b8c9d0".into(),
            user_email: "fan@example.com".into(),
            created_at: Utc::now(),
        };

        let document = bson::to_document(&favorite).unwrap();
        assert_eq!(document.get_str("artworkId").unwrap(), "66f0a1b2c3d4e5f6a7b8c9d0");
        assert_eq!(document.get_str("userEmail").unwrap(), "fan@example.com");
        // createdAt must be a native BSON datetime, not a string
        assert!(document.get_datetime("createdAt").is_ok());
    }
}
