use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{EngagementEvent, Image, Visibility};

/// Columns + tag aggregation shared by every image read query.
const IMAGE_SELECT: &str = r#"
    SELECT i.id, i.prompt, i.image_url, i.user_id, i.request_id, i.is_public,
           i.views, i.upvotes, i.shares, i.saves, i.created_at,
           COALESCE(array_remove(array_agg(t.name ORDER BY t.name), NULL), '{}') AS tags
    FROM images i
    LEFT JOIN image_tags it ON it.image_id = i.id
    LEFT JOIN tags t ON t.id = it.tag_id
"#;

/// Persist a newly generated image. Signals start at zero.
pub async fn create_image(
    pool: &PgPool,
    user_id: Uuid,
    prompt: &str,
    image_url: &str,
    request_id: &str,
    is_public: bool,
) -> Result<Image, sqlx::Error> {
    let image = sqlx::query_as::<_, Image>(
        r#"
        INSERT INTO images (user_id, prompt, image_url, request_id, is_public)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, prompt, image_url, user_id, request_id, is_public,
                  views, upvotes, shares, saves, created_at, '{}'::TEXT[] AS tags
        "#,
    )
    .bind(user_id)
    .bind(prompt)
    .bind(image_url)
    .bind(request_id)
    .bind(is_public)
    .fetch_one(pool)
    .await?;

    Ok(image)
}

/// Find an image by ID with its tags
pub async fn find_image_by_id(
    pool: &PgPool,
    image_id: Uuid,
) -> Result<Option<Image>, sqlx::Error> {
    let query = format!("{} WHERE i.id = $1 GROUP BY i.id", IMAGE_SELECT);
    sqlx::query_as::<_, Image>(&query)
        .bind(image_id)
        .fetch_optional(pool)
        .await
}

/// Find all images owned by a user, newest first
pub async fn find_images_by_user(
    pool: &PgPool,
    user_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<Image>, sqlx::Error> {
    let query = format!(
        "{} WHERE i.user_id = $1 GROUP BY i.id ORDER BY i.created_at DESC LIMIT $2 OFFSET $3",
        IMAGE_SELECT
    );
    sqlx::query_as::<_, Image>(&query)
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

/// Fetch every ranking candidate matching the gallery filter in one
/// snapshot query. Ordering by score happens in the service; the database
/// only narrows the set. The full filtered set is fetched so pagination
/// partitions it exactly; the date-range filter is the bound on its size.
pub async fn fetch_gallery_candidates(
    pool: &PgPool,
    tag: Option<&str>,
    cutoff: Option<DateTime<Utc>>,
    visibility: Visibility,
) -> Result<Vec<Image>, sqlx::Error> {
    let query = format!(
        r#"{}
        WHERE ($1::TEXT IS NULL OR EXISTS (
                SELECT 1
                FROM image_tags itf
                JOIN tags tf ON tf.id = itf.tag_id
                WHERE itf.image_id = i.id AND tf.name = $1
            ))
          AND ($2::TIMESTAMPTZ IS NULL OR i.created_at >= $2)
          AND ($3::TEXT = 'all'
               OR ($3 = 'public' AND i.is_public)
               OR ($3 = 'private' AND NOT i.is_public))
        GROUP BY i.id
        ORDER BY i.created_at DESC
        "#,
        IMAGE_SELECT
    );

    sqlx::query_as::<_, Image>(&query)
        .bind(tag)
        .bind(cutoff)
        .bind(visibility.as_str())
        .fetch_all(pool)
        .await
}

/// Record one engagement event against an image.
///
/// This is the only write path for the view/upvote/share signals; gallery
/// reads never touch them. Returns false when the image does not exist.
pub async fn record_engagement(
    pool: &PgPool,
    image_id: Uuid,
    event: EngagementEvent,
) -> Result<bool, sqlx::Error> {
    let query = match event {
        EngagementEvent::View => "UPDATE images SET views = views + 1 WHERE id = $1",
        EngagementEvent::Upvote => "UPDATE images SET upvotes = upvotes + 1 WHERE id = $1",
        EngagementEvent::Share => "UPDATE images SET shares = shares + 1 WHERE id = $1",
        EngagementEvent::Save => "UPDATE images SET saves = saves + 1 WHERE id = $1",
    };

    let result = sqlx::query(query).bind(image_id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

/// Toggle visibility, owner-scoped. Returns false when the image does not
/// exist or belongs to another user.
pub async fn set_visibility(
    pool: &PgPool,
    image_id: Uuid,
    user_id: Uuid,
    is_public: bool,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE images SET is_public = $3 WHERE id = $1 AND user_id = $2")
        .bind(image_id)
        .bind(user_id)
        .bind(is_public)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
