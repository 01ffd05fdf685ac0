/// Gallery Ranking & Pagination Service
///
/// Produces a filtered, ranked, paginated view of gallery images. Each page
/// request is stateless and side-effect-free: candidates are fetched in one
/// snapshot query, scored and ordered deterministically, then sliced into a
/// fixed-size page. Pages are cached in Redis with a short TTL when Redis is
/// available; cache failures degrade to a direct database read.
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::cmp::Ordering;
use std::time::Instant;
use tracing::{debug, warn};

use crate::config::GalleryConfig;
use crate::db::image_repo;
use crate::error::{AppError, Result};
use crate::metrics::{
    GALLERY_CACHE_EVENTS, GALLERY_CANDIDATE_COUNT, GALLERY_REQUEST_DURATION_SECONDS,
    GALLERY_REQUEST_TOTAL,
};
use crate::models::{DateRange, Image, ImageScores, ImageSummary, Visibility};
use crate::services::ranking;

/// Fixed page size for initial load and every "load more" continuation.
/// Callers treat a short or empty page as end-of-results.
pub const PAGE_SIZE: usize = 12;

/// How many leading pages per filter combination are deleted when an
/// engagement write invalidates the cache. Deeper pages and tag-scoped
/// keys age out through the TTL.
const INVALIDATED_PAGES: i64 = 3;

/// Cache keys for the leading untagged pages of every visibility and
/// date-range combination. Must stay in step with `GalleryFilter::cache_key`.
fn untagged_page_keys(pages: i64) -> Vec<String> {
    let mut keys = Vec::new();
    for visibility in [Visibility::All, Visibility::Public, Visibility::Private] {
        for date_range in [
            DateRange::All,
            DateRange::OneDay,
            DateRange::SevenDays,
            DateRange::ThirtyDays,
        ] {
            let filter = GalleryFilter {
                tag: None,
                date_range,
                visibility,
            };
            for page in 1..=pages {
                keys.push(filter.cache_key(page));
            }
        }
    }
    keys
}

/// Validated gallery filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryFilter {
    pub tag: Option<String>,
    pub date_range: DateRange,
    pub visibility: Visibility,
}

impl GalleryFilter {
    fn cache_key(&self, page: i64) -> String {
        format!(
            "gallery:v1:{}:{}:{}:{}",
            self.visibility.as_str(),
            self.date_range.as_str(),
            self.tag.as_deref().unwrap_or("all"),
            page
        )
    }
}

/// One page of the ranked gallery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryPage {
    pub images: Vec<ImageSummary>,
    pub page: i64,
    pub page_size: usize,
    pub has_more: bool,
}

/// An image paired with its derived scores
#[derive(Debug, Clone)]
pub struct RankedImage {
    pub image: Image,
    pub scores: ImageScores,
}

/// Score every candidate as of `now` and order the set for display.
pub fn rank_images(images: Vec<Image>, now: DateTime<Utc>) -> Vec<RankedImage> {
    let mut ranked: Vec<RankedImage> = images
        .into_iter()
        .map(|image| {
            let scores = ranking::score_image(&image, now);
            RankedImage { image, scores }
        })
        .collect();
    sort_ranked(&mut ranked);
    ranked
}

/// Sort descending by final ranking score, ties broken by creation
/// timestamp descending (newest first) so the order is deterministic.
///
/// NaN scores are treated as equal rather than panicking.
pub fn sort_ranked(ranked: &mut [RankedImage]) {
    ranked.sort_by(|a, b| {
        b.scores
            .final_ranking_score
            .partial_cmp(&a.scores.final_ranking_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.image.created_at.cmp(&a.image.created_at))
    });
}

/// Slice a ranked set into a 1-based page of `page_size` items.
///
/// Returns the page contents and whether more pages follow. A page past
/// the end yields an empty vec with `has_more == false`, never an error.
pub fn paginate(ranked: &[RankedImage], page: i64, page_size: usize) -> (Vec<RankedImage>, bool) {
    let total = ranked.len();
    let page_index = usize::try_from(page.saturating_sub(1)).unwrap_or(0);
    let start = page_index.saturating_mul(page_size).min(total);
    let end = (start + page_size).min(total);
    (ranked[start..end].to_vec(), end < total)
}

/// Gallery service
pub struct GalleryService {
    pool: PgPool,
    redis: Option<ConnectionManager>,
    cache_ttl_secs: u64,
}

impl GalleryService {
    pub fn new(pool: PgPool, redis: Option<ConnectionManager>, config: &GalleryConfig) -> Self {
        Self {
            pool,
            redis,
            cache_ttl_secs: config.cache_ttl_secs,
        }
    }

    /// Serve one ranked gallery page for a validated filter.
    pub async fn get_page(&self, filter: &GalleryFilter, page: i64) -> Result<GalleryPage> {
        if page <= 0 {
            return Err(AppError::InvalidPage(format!(
                "page must be >= 1, got {}",
                page
            )));
        }

        let start = Instant::now();
        let cache_key = filter.cache_key(page);

        if let Some(redis) = &self.redis {
            if let Some(cached) = self.read_cached_page(redis, &cache_key).await {
                GALLERY_CACHE_EVENTS.with_label_values(&["hit"]).inc();
                GALLERY_REQUEST_TOTAL.with_label_values(&["cache"]).inc();
                return Ok(cached);
            }
            GALLERY_CACHE_EVENTS.with_label_values(&["miss"]).inc();
        }

        let now = Utc::now();
        let candidates = image_repo::fetch_gallery_candidates(
            &self.pool,
            filter.tag.as_deref(),
            filter.date_range.cutoff(now),
            filter.visibility,
        )
        .await?;

        GALLERY_CANDIDATE_COUNT
            .with_label_values(&["postgres"])
            .observe(candidates.len() as f64);

        let ranked = rank_images(candidates, now);
        let (page_items, has_more) = paginate(&ranked, page, PAGE_SIZE);

        let response = GalleryPage {
            images: page_items
                .into_iter()
                .map(|r| ImageSummary::from_parts(r.image, r.scores))
                .collect(),
            page,
            page_size: PAGE_SIZE,
            has_more,
        };

        if let Some(redis) = &self.redis {
            if let Err(e) = self.write_cached_page(redis, &cache_key, &response).await {
                warn!("Failed to cache gallery page {}: {}", cache_key, e);
            }
        }

        GALLERY_REQUEST_DURATION_SECONDS
            .with_label_values(&["postgres"])
            .observe(start.elapsed().as_secs_f64());
        GALLERY_REQUEST_TOTAL
            .with_label_values(&["postgres"])
            .inc();

        Ok(response)
    }

    /// Drop cached gallery pages after an engagement write so fresh signals
    /// surface before the TTL expires.
    ///
    /// Granular per-key invalidation would need a SCAN over the tag-scoped
    /// keyspace; instead the leading untagged pages are deleted and the TTL
    /// bounds staleness for everything else. Errors are ignored, the cache
    /// is best-effort.
    pub async fn invalidate_cached_pages(&self) {
        if let Some(redis) = &self.redis {
            let mut conn = redis.clone();
            let keys = untagged_page_keys(INVALIDATED_PAGES);
            let result: redis::RedisResult<()> = conn.del(&keys).await;
            if let Err(e) = result {
                warn!("Gallery cache invalidation failed: {}", e);
                return;
            }
            GALLERY_CACHE_EVENTS
                .with_label_values(&["invalidate"])
                .inc();
        }
    }

    async fn read_cached_page(
        &self,
        redis: &ConnectionManager,
        key: &str,
    ) -> Option<GalleryPage> {
        let mut conn = redis.clone();
        match conn.get::<_, Option<String>>(key).await {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(page) => {
                    debug!("Gallery cache hit: {}", key);
                    Some(page)
                }
                Err(e) => {
                    warn!("Failed to deserialize cached gallery page {}: {}", key, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Redis GET failed for {}: {}", key, e);
                None
            }
        }
    }

    async fn write_cached_page(
        &self,
        redis: &ConnectionManager,
        key: &str,
        page: &GalleryPage,
    ) -> Result<()> {
        let mut conn = redis.clone();
        let json = serde_json::to_string(page)?;
        conn.set_ex::<_, _, ()>(key, json, self.cache_ttl_secs).await?;
        Ok(())
    }
}
