/// Tag handlers - owner tag attach/detach and the global tag listing
use actix_web::{delete, get, post, web, HttpResponse};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::db::{image_repo, tag_repo};
use crate::error::{AppError, Result};
use crate::middleware::UserId;

async fn check_image_owner(pool: &PgPool, image_id: Uuid, user_id: Uuid) -> Result<()> {
    let image = image_repo::find_image_by_id(pool, image_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Image {} not found", image_id)))?;

    if image.user_id != user_id {
        return Err(AppError::NotAuthorized(
            "Only the image owner can change its tags".to_string(),
        ));
    }

    Ok(())
}

/// POST /api/v1/images/{id}/tags/{name}
///
/// Attaches the tag, creating it on first use.
#[post("/api/v1/images/{id}/tags/{name}")]
pub async fn attach_tag(
    pool: web::Data<PgPool>,
    path: web::Path<(Uuid, String)>,
    user: UserId,
) -> Result<HttpResponse> {
    let (image_id, raw_name) = path.into_inner();
    let name = tag_repo::normalize_tag_name(&raw_name)?;

    check_image_owner(&pool, image_id, user.0).await?;

    let tag = tag_repo::get_or_create_tag(&pool, &name).await?;
    let attached = tag_repo::attach_tag(&pool, image_id, tag.id).await?;

    debug!(image_id = %image_id, tag = %name, attached, "Tag attach");
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "tag": name,
        "attached": attached,
    })))
}

/// DELETE /api/v1/images/{id}/tags/{name}
#[delete("/api/v1/images/{id}/tags/{name}")]
pub async fn detach_tag(
    pool: web::Data<PgPool>,
    path: web::Path<(Uuid, String)>,
    user: UserId,
) -> Result<HttpResponse> {
    let (image_id, raw_name) = path.into_inner();
    let name = tag_repo::normalize_tag_name(&raw_name)?;

    check_image_owner(&pool, image_id, user.0).await?;

    let detached = tag_repo::detach_tag(&pool, image_id, &name).await?;
    if !detached {
        return Err(AppError::NotFound(format!(
            "Tag '{}' is not attached to image {}",
            name, image_id
        )));
    }

    debug!(image_id = %image_id, tag = %name, "Tag detached");
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/v1/tags
#[get("/api/v1/tags")]
pub async fn list_tags(pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let tags = tag_repo::list_tags(&pool).await?;
    Ok(HttpResponse::Ok().json(tags))
}
