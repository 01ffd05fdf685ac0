/// HTTP handlers for gallery-service
pub mod collections;
pub mod gallery;
pub mod images;
pub mod tags;

use actix_web::web;

/// Register every API route.
///
/// `list_my_images` must be registered before `get_image` so that the
/// literal `/api/v1/images` path wins over the `{id}` capture.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(gallery::get_gallery)
        .service(images::create_image)
        .service(images::list_my_images)
        .service(images::get_image)
        .service(images::record_event)
        .service(images::set_visibility)
        .service(tags::attach_tag)
        .service(tags::detach_tag)
        .service(tags::list_tags)
        .service(collections::create_collection)
        .service(collections::list_collections)
        .service(collections::get_collection)
        .service(collections::update_collection)
        .service(collections::delete_collection)
        .service(collections::add_image)
        .service(collections::remove_image);
}
