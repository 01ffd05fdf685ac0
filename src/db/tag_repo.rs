use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::Tag;

/// Canonical tag form: lowercase, trimmed, non-empty.
pub fn normalize_tag_name(name: &str) -> Result<String> {
    let normalized = name.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(AppError::Validation("Tag name cannot be empty".to_string()));
    }
    if normalized.len() > 50 {
        return Err(AppError::Validation(
            "Tag name cannot exceed 50 characters".to_string(),
        ));
    }
    Ok(normalized)
}

/// Fetch or create the tag for a normalized name.
pub async fn get_or_create_tag(pool: &PgPool, name: &str) -> std::result::Result<Tag, sqlx::Error> {
    // DO UPDATE makes RETURNING yield the row on conflict as well
    sqlx::query_as::<_, Tag>(
        r#"
        INSERT INTO tags (name)
        VALUES ($1)
        ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
        RETURNING id, name, created_at
        "#,
    )
    .bind(name)
    .fetch_one(pool)
    .await
}

/// Attach a tag to an image. Returns false when already attached.
pub async fn attach_tag(
    pool: &PgPool,
    image_id: Uuid,
    tag_id: Uuid,
) -> std::result::Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO image_tags (image_id, tag_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(image_id)
    .bind(tag_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Detach a tag (by name) from an image. Returns false when not attached.
pub async fn detach_tag(
    pool: &PgPool,
    image_id: Uuid,
    name: &str,
) -> std::result::Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        DELETE FROM image_tags it
        USING tags t
        WHERE it.tag_id = t.id AND it.image_id = $1 AND t.name = $2
        "#,
    )
    .bind(image_id)
    .bind(name)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// List all known tags alphabetically
pub async fn list_tags(pool: &PgPool) -> std::result::Result<Vec<Tag>, sqlx::Error> {
    sqlx::query_as::<_, Tag>("SELECT id, name, created_at FROM tags ORDER BY name")
        .fetch_all(pool)
        .await
}
