use sqlx::PgPool;
use tracing::info;

use crate::error::Result;

/// Ensure gallery tables exist.
///
/// Created lazily at service startup to unblock environments where
/// migrations have not been applied yet (fresh developer machines, CI).
pub async fn ensure_gallery_tables(pool: &PgPool) -> Result<()> {
    info!("Ensuring gallery tables exist");

    for ddl in [
        IMAGES_TABLE,
        IMAGES_CREATED_AT_INDEX,
        IMAGES_USER_INDEX,
        IMAGES_VISIBILITY_INDEX,
        TAGS_TABLE,
        IMAGE_TAGS_TABLE,
        COLLECTIONS_TABLE,
        COLLECTION_IMAGES_TABLE,
    ] {
        sqlx::query(ddl).execute(pool).await?;
    }

    Ok(())
}

const IMAGES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS images (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    prompt TEXT NOT NULL,
    image_url TEXT NOT NULL,
    user_id UUID NOT NULL,
    request_id TEXT NOT NULL UNIQUE,
    is_public BOOLEAN NOT NULL DEFAULT FALSE,
    views BIGINT NOT NULL DEFAULT 0,
    upvotes BIGINT NOT NULL DEFAULT 0,
    shares BIGINT NOT NULL DEFAULT 0,
    saves BIGINT NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

const IMAGES_CREATED_AT_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_images_created_at ON images (created_at DESC)";

const IMAGES_USER_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_images_user_id ON images (user_id)";

const IMAGES_VISIBILITY_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_images_visibility ON images (is_public, created_at DESC)";

const TAGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS tags (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name TEXT NOT NULL UNIQUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

const IMAGE_TAGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS image_tags (
    image_id UUID NOT NULL REFERENCES images(id) ON DELETE CASCADE,
    tag_id UUID NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
    PRIMARY KEY (image_id, tag_id)
)
"#;

const COLLECTIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS collections (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL,
    name TEXT NOT NULL,
    description TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

const COLLECTION_IMAGES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS collection_images (
    collection_id UUID NOT NULL REFERENCES collections(id) ON DELETE CASCADE,
    image_id UUID NOT NULL REFERENCES images(id) ON DELETE CASCADE,
    PRIMARY KEY (collection_id, image_id)
)
"#;
