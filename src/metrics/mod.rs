use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec,
};

lazy_static! {
    /// Duration of gallery page requests by data source (postgres, cache).
    pub static ref GALLERY_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "gallery_request_duration_seconds",
        "Gallery page request duration segmented by data source",
        &["source"]
    )
    .expect("failed to register gallery_request_duration_seconds");

    /// Total gallery page requests served by source.
    pub static ref GALLERY_REQUEST_TOTAL: IntCounterVec = register_int_counter_vec!(
        "gallery_request_total",
        "Total gallery page requests segmented by data source",
        &["source"]
    )
    .expect("failed to register gallery_request_total");

    /// Number of ranking candidates evaluated per request.
    pub static ref GALLERY_CANDIDATE_COUNT: HistogramVec = register_histogram_vec!(
        "gallery_candidate_count",
        "Number of gallery candidates ranked per request segmented by source",
        &["source"]
    )
    .expect("failed to register gallery_candidate_count");

    /// Gallery page cache events (hit/miss).
    pub static ref GALLERY_CACHE_EVENTS: IntCounterVec = register_int_counter_vec!(
        "gallery_cache_events_total",
        "Gallery page cache events segmented by outcome",
        &["event"]
    )
    .expect("failed to register gallery_cache_events_total");

    /// Engagement events recorded by type (view/upvote/share).
    pub static ref ENGAGEMENT_EVENTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "engagement_events_total",
        "Engagement write events segmented by event type",
        &["event"]
    )
    .expect("failed to register engagement_events_total");
}
