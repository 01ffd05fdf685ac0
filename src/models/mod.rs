/// Data models for gallery-service
///
/// This module defines structures for:
/// - Image: AI-generated images with engagement signals and derived scores
/// - Tag: unique lowercase labels attached to images
/// - Collection: user-owned groupings of images
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Visibility scope used by gallery filters.
///
/// `All` and `Private` are only meaningful when the requester carries an
/// authenticated identity; the auth layer upstream decides that, this
/// service merely rejects private-inclusive scopes without one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    All,
    Public,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Public => "public",
            Self::Private => "private",
        }
    }

    /// Whether this scope can expose private images.
    pub fn includes_private(&self) -> bool {
        matches!(self, Self::All | Self::Private)
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Trailing time window for gallery filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateRange {
    #[serde(rename = "all")]
    All,
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "7d")]
    SevenDays,
    #[serde(rename = "30d")]
    ThirtyDays,
}

impl DateRange {
    pub fn as_str(&self) -> &str {
        match self {
            Self::All => "all",
            Self::OneDay => "1d",
            Self::SevenDays => "7d",
            Self::ThirtyDays => "30d",
        }
    }

    /// Lower bound of the window relative to `now`, `None` for all time.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::All => None,
            Self::OneDay => Some(now - Duration::days(1)),
            Self::SevenDays => Some(now - Duration::days(7)),
            Self::ThirtyDays => Some(now - Duration::days(30)),
        }
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Engagement event type recorded against an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngagementEvent {
    View,
    Upvote,
    Share,
    Save,
}

impl EngagementEvent {
    pub fn as_str(&self) -> &str {
        match self {
            Self::View => "view",
            Self::Upvote => "upvote",
            Self::Share => "share",
            Self::Save => "save",
        }
    }
}

impl std::fmt::Display for EngagementEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An image row with its raw engagement signals and tag names.
///
/// Scores are derived at read time (see `services::ranking`); the columns
/// here are the ground-truth inputs only.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Image {
    pub id: Uuid,
    pub prompt: String,
    pub image_url: String,
    pub user_id: Uuid,
    pub request_id: String,
    pub is_public: bool,
    pub views: i64,
    pub upvotes: i64,
    pub shares: i64,
    pub saves: i64,
    pub created_at: DateTime<Utc>,
    /// Aggregated tag names (empty when untagged)
    pub tags: Vec<String>,
}

/// Derived ranking scores for one image
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageScores {
    pub engagement_score: f64,
    pub quality_score: f64,
    pub trending_score: f64,
    pub final_ranking_score: f64,
}

/// Image summary returned by the gallery and image endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSummary {
    pub id: Uuid,
    pub prompt: String,
    pub image_url: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub visibility: String,
    pub tags: Vec<String>,
    pub views: i64,
    pub upvotes: i64,
    pub shares: i64,
    pub saves: i64,
    pub engagement_score: f64,
    pub quality_score: f64,
    pub trending_score: f64,
    pub final_ranking_score: f64,
}

impl ImageSummary {
    pub fn from_parts(image: Image, scores: ImageScores) -> Self {
        Self {
            id: image.id,
            prompt: image.prompt,
            image_url: image.image_url,
            user_id: image.user_id,
            created_at: image.created_at,
            visibility: if image.is_public {
                "public".to_string()
            } else {
                "private".to_string()
            },
            tags: image.tags,
            views: image.views,
            upvotes: image.upvotes,
            shares: image.shares,
            saves: image.saves,
            engagement_score: scores.engagement_score,
            quality_score: scores.quality_score,
            trending_score: scores.trending_score,
            final_ranking_score: scores.final_ranking_score,
        }
    }
}

/// Tag row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Collection row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Collection {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_range_cutoff() {
        let now = Utc::now();
        assert_eq!(DateRange::All.cutoff(now), None);
        assert_eq!(DateRange::OneDay.cutoff(now), Some(now - Duration::days(1)));
        assert_eq!(
            DateRange::ThirtyDays.cutoff(now),
            Some(now - Duration::days(30))
        );
    }

    #[test]
    fn test_visibility_private_scope() {
        assert!(Visibility::All.includes_private());
        assert!(Visibility::Private.includes_private());
        assert!(!Visibility::Public.includes_private());
    }

    #[test]
    fn test_summary_visibility_label() {
        let image = Image {
            id: Uuid::new_v4(),
            prompt: "a lighthouse at dusk".into(),
            image_url: "https://cdn.example/img.png".into(),
            user_id: Uuid::new_v4(),
            request_id: "req-1".into(),
            is_public: true,
            views: 10,
            upvotes: 2,
            shares: 1,
            saves: 0,
            created_at: Utc::now(),
            tags: vec!["lighthouse".into()],
        };
        let scores = ImageScores {
            engagement_score: 1.0,
            quality_score: 0.5,
            trending_score: 0.8,
            final_ranking_score: 0.7,
        };
        let summary = ImageSummary::from_parts(image, scores);
        assert_eq!(summary.visibility, "public");
        assert_eq!(summary.tags, vec!["lighthouse".to_string()]);
    }
}
