/// Business logic services
pub mod gallery;
pub mod ranking;

pub use gallery::{GalleryFilter, GalleryPage, GalleryService, PAGE_SIZE};
