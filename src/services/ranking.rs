/// Gallery Ranking Scorer
///
/// Pure scoring functions that turn raw engagement signals into the four
/// derived scores exposed by the gallery. Everything here is deterministic
/// for a fixed `now`: recomputing from identical inputs yields identical
/// scores, which is what keeps pagination stable across page requests.
use chrono::{DateTime, Utc};

use crate::models::{Image, ImageScores};

/// Relative weight of a single view in the engagement score.
pub const VIEW_WEIGHT: f64 = 1.0;
/// Relative weight of a single upvote in the engagement score.
pub const UPVOTE_WEIGHT: f64 = 5.0;
/// Relative weight of a single save in the engagement score.
pub const SAVE_WEIGHT: f64 = 4.0;
/// Relative weight of a single share in the engagement score.
pub const SHARE_WEIGHT: f64 = 3.0;

/// Exponential decay constant for the trending score, in hours.
/// Engagement loses ~63% of its trending value after 72 hours.
pub const TRENDING_DECAY_HOURS: f64 = 72.0;

/// Fixed combination weights for the final ranking score. Must sum to 1.0.
pub const ENGAGEMENT_WEIGHT: f64 = 0.40;
pub const QUALITY_WEIGHT: f64 = 0.25;
pub const TRENDING_WEIGHT: f64 = 0.35;

/// Portion of the quality score carried by the upvote ratio.
const QUALITY_RATIO_WEIGHT: f64 = 0.6;
/// Quality credit per tag, capped at `QUALITY_TAG_CAP` tags.
const QUALITY_TAG_BONUS: f64 = 0.08;
const QUALITY_TAG_CAP: usize = 5;

/// Weighted sum of raw interaction counts. Unbounded.
pub fn engagement_score(views: i64, upvotes: i64, shares: i64, saves: i64) -> f64 {
    views as f64 * VIEW_WEIGHT
        + upvotes as f64 * UPVOTE_WEIGHT
        + shares as f64 * SHARE_WEIGHT
        + saves as f64 * SAVE_WEIGHT
}

/// Engagement-independent quality proxy in `[0, 1]`.
///
/// Combines the upvote-per-view ratio with a capped bonus for curation
/// effort (tags attached by the owner). Raw volume does not move this
/// score, only the ratio does.
pub fn quality_score(views: i64, upvotes: i64, tag_count: usize) -> f64 {
    let upvote_ratio = (upvotes as f64 / views.max(1) as f64).min(1.0);
    let tag_bonus = tag_count.min(QUALITY_TAG_CAP) as f64 * QUALITY_TAG_BONUS;
    upvote_ratio * QUALITY_RATIO_WEIGHT + tag_bonus
}

/// Engagement normalized by recency: newer images with equal engagement
/// outrank older ones.
pub fn trending_score(engagement: f64, age_hours: f64) -> f64 {
    engagement * (-age_hours.max(0.0) / TRENDING_DECAY_HOURS).exp()
}

/// Combine the three component scores into the final ranking score.
///
/// The unbounded engagement and trending terms are squashed with
/// `ln(1 + x)` so they stay commensurable with the bounded quality score;
/// the squash is monotone, so relative ordering within each component is
/// preserved.
pub fn final_ranking_score(engagement: f64, quality: f64, trending: f64) -> f64 {
    engagement.ln_1p() * ENGAGEMENT_WEIGHT
        + quality * QUALITY_WEIGHT
        + trending.ln_1p() * TRENDING_WEIGHT
}

/// Compute all four scores for an image as of `now`.
pub fn score_image(image: &Image, now: DateTime<Utc>) -> ImageScores {
    let engagement = engagement_score(image.views, image.upvotes, image.shares, image.saves);
    let quality = quality_score(image.views, image.upvotes, image.tags.len());
    let age_hours = (now - image.created_at).num_seconds() as f64 / 3600.0;
    let trending = trending_score(engagement, age_hours);

    ImageScores {
        engagement_score: engagement,
        quality_score: quality,
        trending_score: trending,
        final_ranking_score: final_ranking_score(engagement, quality, trending),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn test_image(views: i64, upvotes: i64, shares: i64, age_hours: i64) -> Image {
        Image {
            id: Uuid::new_v4(),
            prompt: "test prompt".into(),
            image_url: "https://cdn.example/test.png".into(),
            user_id: Uuid::new_v4(),
            request_id: Uuid::new_v4().to_string(),
            is_public: true,
            views,
            upvotes,
            shares,
            saves: 0,
            created_at: Utc::now() - Duration::hours(age_hours),
            tags: vec![],
        }
    }

    #[test]
    fn test_combination_weights_sum_to_one() {
        let sum = ENGAGEMENT_WEIGHT + QUALITY_WEIGHT + TRENDING_WEIGHT;
        assert!((sum - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_engagement_weighting_order() {
        // Upvote > save > share > view, one interaction each
        let upvote = engagement_score(0, 1, 0, 0);
        let save = engagement_score(0, 0, 0, 1);
        let share = engagement_score(0, 0, 1, 0);
        let view = engagement_score(1, 0, 0, 0);
        assert!(upvote > save);
        assert!(save > share);
        assert!(share > view);
    }

    #[test]
    fn test_save_moves_engagement_but_not_quality() {
        let baseline = test_image(100, 10, 5, 2);
        let mut saved = test_image(100, 10, 5, 2);
        saved.saves = 8;
        saved.created_at = baseline.created_at;

        let now = Utc::now();
        let base_scores = score_image(&baseline, now);
        let saved_scores = score_image(&saved, now);

        assert!(saved_scores.engagement_score > base_scores.engagement_score);
        assert_eq!(
            saved_scores.engagement_score - base_scores.engagement_score,
            8.0 * SAVE_WEIGHT
        );
        assert_eq!(saved_scores.quality_score, base_scores.quality_score);
        assert!(saved_scores.final_ranking_score > base_scores.final_ranking_score);
    }

    #[test]
    fn test_trending_decay_monotonicity() {
        // Identical engagement and quality signals: the newer image must
        // rank at least as high as the older one
        let now = Utc::now();
        let newer = score_image(&test_image(100, 10, 5, 2), now);
        let older = score_image(&test_image(100, 10, 5, 48), now);

        assert_eq!(newer.engagement_score, older.engagement_score);
        assert_eq!(newer.quality_score, older.quality_score);
        assert!(newer.trending_score > older.trending_score);
        assert!(newer.final_ranking_score >= older.final_ranking_score);
    }

    #[test]
    fn test_trending_decay_constant() {
        // After exactly one decay constant the trending score is e^-1
        let decayed = trending_score(100.0, TRENDING_DECAY_HOURS);
        assert!((decayed - 100.0 * (-1.0f64).exp()).abs() < 1e-9);
    }

    #[test]
    fn test_trending_negative_age_clamped() {
        // Clock skew must not inflate brand new images past their engagement
        assert_eq!(trending_score(50.0, -3.0), 50.0);
    }

    #[test]
    fn test_quality_bounds() {
        // Ratio capped at 1.0, tag bonus capped at 5 tags
        let max_quality = quality_score(1, 100, 20);
        assert!(max_quality <= 1.0 + 1e-9);
        assert_eq!(quality_score(0, 0, 0), 0.0);
    }

    #[test]
    fn test_quality_ignores_raw_volume() {
        // Same upvote ratio, wildly different volume: same quality
        let small = quality_score(10, 5, 2);
        let large = quality_score(10_000, 5_000, 2);
        assert!((small - large).abs() < 1e-9);
    }

    #[test]
    fn test_score_reproducibility() {
        let now = Utc::now();
        let image = test_image(42, 7, 3, 12);
        let first = score_image(&image, now);
        let second = score_image(&image, now);
        assert_eq!(first, second);
    }
}
