/// Collection handlers - owner CRUD and membership changes
use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::db::{collection_repo, image_repo};
use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::models::{Collection, ImageSummary};
use crate::services::ranking;

#[derive(Debug, Deserialize, Validate)]
pub struct CollectionRequest {
    #[validate(length(min = 3, max = 100))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CollectionDetail {
    #[serde(flatten)]
    pub collection: Collection,
    pub images: Vec<ImageSummary>,
}

/// Load a collection and verify the caller owns it.
async fn load_owned_collection(
    pool: &PgPool,
    collection_id: Uuid,
    user_id: Uuid,
) -> Result<Collection> {
    let collection = collection_repo::find_collection_by_id(pool, collection_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Collection {} not found", collection_id)))?;

    if collection.user_id != user_id {
        return Err(AppError::NotAuthorized(
            "Only the collection owner can access it".to_string(),
        ));
    }

    Ok(collection)
}

/// POST /api/v1/collections
#[post("/api/v1/collections")]
pub async fn create_collection(
    pool: web::Data<PgPool>,
    user: UserId,
    req: web::Json<CollectionRequest>,
) -> Result<HttpResponse> {
    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let collection =
        collection_repo::create_collection(&pool, user.0, &req.name, req.description.as_deref())
            .await?;

    Ok(HttpResponse::Created().json(collection))
}

/// GET /api/v1/collections — the caller's collections
#[get("/api/v1/collections")]
pub async fn list_collections(pool: web::Data<PgPool>, user: UserId) -> Result<HttpResponse> {
    let collections = collection_repo::find_collections_by_user(&pool, user.0).await?;
    Ok(HttpResponse::Ok().json(collections))
}

/// GET /api/v1/collections/{id} — collection with member images
#[get("/api/v1/collections/{id}")]
pub async fn get_collection(
    pool: web::Data<PgPool>,
    collection_id: web::Path<Uuid>,
    user: UserId,
) -> Result<HttpResponse> {
    let collection = load_owned_collection(&pool, *collection_id, user.0).await?;

    let now = Utc::now();
    let images = collection_repo::list_images(&pool, collection.id)
        .await?
        .into_iter()
        .map(|image| {
            let scores = ranking::score_image(&image, now);
            ImageSummary::from_parts(image, scores)
        })
        .collect();

    Ok(HttpResponse::Ok().json(CollectionDetail { collection, images }))
}

/// PUT /api/v1/collections/{id}
#[put("/api/v1/collections/{id}")]
pub async fn update_collection(
    pool: web::Data<PgPool>,
    collection_id: web::Path<Uuid>,
    user: UserId,
    req: web::Json<CollectionRequest>,
) -> Result<HttpResponse> {
    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    load_owned_collection(&pool, *collection_id, user.0).await?;

    let updated = collection_repo::update_collection(
        &pool,
        *collection_id,
        user.0,
        &req.name,
        req.description.as_deref(),
    )
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Collection {} not found", collection_id)))?;

    Ok(HttpResponse::Ok().json(updated))
}

/// DELETE /api/v1/collections/{id}
#[delete("/api/v1/collections/{id}")]
pub async fn delete_collection(
    pool: web::Data<PgPool>,
    collection_id: web::Path<Uuid>,
    user: UserId,
) -> Result<HttpResponse> {
    load_owned_collection(&pool, *collection_id, user.0).await?;
    collection_repo::delete_collection(&pool, *collection_id, user.0).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/v1/collections/{id}/images/{image_id}
#[post("/api/v1/collections/{id}/images/{image_id}")]
pub async fn add_image(
    pool: web::Data<PgPool>,
    path: web::Path<(Uuid, Uuid)>,
    user: UserId,
) -> Result<HttpResponse> {
    let (collection_id, image_id) = path.into_inner();

    load_owned_collection(&pool, collection_id, user.0).await?;

    image_repo::find_image_by_id(&pool, image_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Image {} not found", image_id)))?;

    let added = collection_repo::add_image(&pool, collection_id, image_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "added": added })))
}

/// DELETE /api/v1/collections/{id}/images/{image_id}
#[delete("/api/v1/collections/{id}/images/{image_id}")]
pub async fn remove_image(
    pool: web::Data<PgPool>,
    path: web::Path<(Uuid, Uuid)>,
    user: UserId,
) -> Result<HttpResponse> {
    let (collection_id, image_id) = path.into_inner();

    load_owned_collection(&pool, collection_id, user.0).await?;

    let removed = collection_repo::remove_image(&pool, collection_id, image_id).await?;
    if !removed {
        return Err(AppError::NotFound(format!(
            "Image {} is not in collection {}",
            image_id, collection_id
        )));
    }

    Ok(HttpResponse::NoContent().finish())
}
