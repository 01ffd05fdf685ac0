/// Image handlers - HTTP endpoints for image records and engagement writes
use actix_web::{get, post, put, web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

use crate::db::image_repo;
use crate::error::{AppError, Result};
use crate::metrics::ENGAGEMENT_EVENTS_TOTAL;
use crate::middleware::{MaybeUserId, UserId};
use crate::models::{EngagementEvent, Image, ImageSummary};
use crate::services::ranking;
use crate::services::GalleryService;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateImageRequest {
    #[validate(length(min = 1, max = 1000))]
    pub prompt: String,
    #[validate(url)]
    pub image_url: String,
    /// Generation-pipeline request id; generated when absent
    pub request_id: Option<String>,
    #[serde(default)]
    pub is_public: bool,
}

#[derive(Debug, Deserialize)]
pub struct EngagementRequest {
    /// "view", "upvote", "share" or "save"
    pub event: String,
}

#[derive(Debug, Deserialize)]
pub struct VisibilityRequest {
    /// "public" or "private"
    pub visibility: String,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

fn summarize(image: Image) -> ImageSummary {
    let scores = ranking::score_image(&image, Utc::now());
    ImageSummary::from_parts(image, scores)
}

/// Load an image and verify the caller owns it.
async fn load_owned_image(pool: &PgPool, image_id: Uuid, user_id: Uuid) -> Result<Image> {
    let image = image_repo::find_image_by_id(pool, image_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Image {} not found", image_id)))?;

    if image.user_id != user_id {
        return Err(AppError::NotAuthorized(
            "Only the image owner can modify it".to_string(),
        ));
    }

    Ok(image)
}

/// POST /api/v1/images
///
/// Persist a successfully generated image. The generation call itself
/// happens upstream; this records its result with zeroed signals.
#[post("/api/v1/images")]
pub async fn create_image(
    pool: web::Data<PgPool>,
    user: UserId,
    req: web::Json<CreateImageRequest>,
) -> Result<HttpResponse> {
    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let request_id = req
        .request_id
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let image = image_repo::create_image(
        &pool,
        user.0,
        &req.prompt,
        &req.image_url,
        &request_id,
        req.is_public,
    )
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            AppError::Conflict(format!("request_id {} already recorded", request_id))
        }
        other => other.into(),
    })?;

    debug!(image_id = %image.id, user_id = %user.0, "Image recorded");
    Ok(HttpResponse::Created().json(summarize(image)))
}

/// GET /api/v1/images/{id}
#[get("/api/v1/images/{id}")]
pub async fn get_image(
    pool: web::Data<PgPool>,
    image_id: web::Path<Uuid>,
    user: MaybeUserId,
) -> Result<HttpResponse> {
    let image = image_repo::find_image_by_id(&pool, *image_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Image {} not found", image_id)))?;

    // Private images are visible to their owner only
    if !image.is_public && user.0 != Some(image.user_id) {
        return Err(AppError::NotAuthorized(
            "This image is private".to_string(),
        ));
    }

    Ok(HttpResponse::Ok().json(summarize(image)))
}

/// GET /api/v1/images — the caller's own images
#[get("/api/v1/images")]
pub async fn list_my_images(
    pool: web::Data<PgPool>,
    user: UserId,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse> {
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let offset = query.offset.unwrap_or(0).max(0);

    let images = image_repo::find_images_by_user(&pool, user.0, limit, offset).await?;
    let summaries: Vec<ImageSummary> = images.into_iter().map(summarize).collect();

    Ok(HttpResponse::Ok().json(summaries))
}

/// POST /api/v1/images/{id}/events
///
/// The single write path for engagement signals. Gallery reads never
/// mutate counters; views only move through an explicit view event here.
#[post("/api/v1/images/{id}/events")]
pub async fn record_event(
    pool: web::Data<PgPool>,
    gallery: web::Data<GalleryService>,
    image_id: web::Path<Uuid>,
    body: web::Json<EngagementRequest>,
) -> Result<HttpResponse> {
    let event = parse_event(&body.event)?;

    let recorded = image_repo::record_engagement(&pool, *image_id, event).await?;
    if !recorded {
        return Err(AppError::NotFound(format!("Image {} not found", image_id)));
    }

    // The write moved a ranking input; drop stale cached pages
    gallery.invalidate_cached_pages().await;

    ENGAGEMENT_EVENTS_TOTAL
        .with_label_values(&[event.as_str()])
        .inc();
    debug!(image_id = %image_id, event = %event, "Engagement recorded");

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "event": event.as_str(),
    })))
}

/// PUT /api/v1/images/{id}/visibility — owner visibility toggle
#[put("/api/v1/images/{id}/visibility")]
pub async fn set_visibility(
    pool: web::Data<PgPool>,
    image_id: web::Path<Uuid>,
    user: UserId,
    body: web::Json<VisibilityRequest>,
) -> Result<HttpResponse> {
    let is_public = match body.visibility.as_str() {
        "public" => true,
        "private" => false,
        other => {
            return Err(AppError::InvalidFilter(format!(
                "Invalid visibility: {}. Must be one of: public, private",
                other
            )))
        }
    };

    load_owned_image(&pool, *image_id, user.0).await?;
    image_repo::set_visibility(&pool, *image_id, user.0, is_public).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "id": *image_id,
        "visibility": body.visibility,
    })))
}

/// Parse engagement event string
pub(crate) fn parse_event(s: &str) -> Result<EngagementEvent> {
    match s.to_lowercase().as_str() {
        "view" => Ok(EngagementEvent::View),
        "upvote" => Ok(EngagementEvent::Upvote),
        "share" => Ok(EngagementEvent::Share),
        "save" => Ok(EngagementEvent::Save),
        _ => Err(AppError::InvalidFilter(format!(
            "Invalid event: {}. Must be one of: view, upvote, share, save",
            s
        ))),
    }
}
