use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Collection, Image};

pub async fn create_collection(
    pool: &PgPool,
    user_id: Uuid,
    name: &str,
    description: Option<&str>,
) -> Result<Collection, sqlx::Error> {
    sqlx::query_as::<_, Collection>(
        r#"
        INSERT INTO collections (user_id, name, description)
        VALUES ($1, $2, $3)
        RETURNING id, user_id, name, description, created_at, updated_at
        "#,
    )
    .bind(user_id)
    .bind(name)
    .bind(description)
    .fetch_one(pool)
    .await
}

pub async fn find_collection_by_id(
    pool: &PgPool,
    collection_id: Uuid,
) -> Result<Option<Collection>, sqlx::Error> {
    sqlx::query_as::<_, Collection>(
        "SELECT id, user_id, name, description, created_at, updated_at FROM collections WHERE id = $1",
    )
    .bind(collection_id)
    .fetch_optional(pool)
    .await
}

pub async fn find_collections_by_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<Collection>, sqlx::Error> {
    sqlx::query_as::<_, Collection>(
        r#"
        SELECT id, user_id, name, description, created_at, updated_at
        FROM collections
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Update name/description, owner-scoped. Returns the updated row or None
/// when the collection does not exist or belongs to another user.
pub async fn update_collection(
    pool: &PgPool,
    collection_id: Uuid,
    user_id: Uuid,
    name: &str,
    description: Option<&str>,
) -> Result<Option<Collection>, sqlx::Error> {
    sqlx::query_as::<_, Collection>(
        r#"
        UPDATE collections
        SET name = $3, description = $4, updated_at = now()
        WHERE id = $1 AND user_id = $2
        RETURNING id, user_id, name, description, created_at, updated_at
        "#,
    )
    .bind(collection_id)
    .bind(user_id)
    .bind(name)
    .bind(description)
    .fetch_optional(pool)
    .await
}

/// Delete a collection, owner-scoped. Membership rows cascade.
pub async fn delete_collection(
    pool: &PgPool,
    collection_id: Uuid,
    user_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM collections WHERE id = $1 AND user_id = $2")
        .bind(collection_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Add an image to a collection. Returns false when already a member.
pub async fn add_image(
    pool: &PgPool,
    collection_id: Uuid,
    image_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO collection_images (collection_id, image_id)
        VALUES ($1, $2)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(collection_id)
    .bind(image_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Remove an image from a collection. Returns false when not a member.
pub async fn remove_image(
    pool: &PgPool,
    collection_id: Uuid,
    image_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM collection_images WHERE collection_id = $1 AND image_id = $2")
            .bind(collection_id)
            .bind(image_id)
            .execute(pool)
            .await?;

    Ok(result.rows_affected() > 0)
}

/// List member images of a collection with their tags, newest first
pub async fn list_images(
    pool: &PgPool,
    collection_id: Uuid,
) -> Result<Vec<Image>, sqlx::Error> {
    sqlx::query_as::<_, Image>(
        r#"
        SELECT i.id, i.prompt, i.image_url, i.user_id, i.request_id, i.is_public,
               i.views, i.upvotes, i.shares, i.saves, i.created_at,
               COALESCE(array_remove(array_agg(t.name ORDER BY t.name), NULL), '{}') AS tags
        FROM collection_images ci
        JOIN images i ON i.id = ci.image_id
        LEFT JOIN image_tags it ON it.image_id = i.id
        LEFT JOIN tags t ON t.id = it.tag_id
        WHERE ci.collection_id = $1
        GROUP BY i.id
        ORDER BY i.created_at DESC
        "#,
    )
    .bind(collection_id)
    .fetch_all(pool)
    .await
}
