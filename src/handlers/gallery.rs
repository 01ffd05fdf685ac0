/// Public gallery endpoint
///
/// Serves the ranked, filtered, paginated gallery. The client issues page=1
/// on initial load or filter change and page=N+1 from its load-more control;
/// a short or empty page tells it to stop paginating.
use actix_web::{get, web, HttpResponse};
use serde::Deserialize;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::middleware::MaybeUserId;
use crate::models::{DateRange, Visibility};
use crate::services::gallery::{GalleryFilter, GalleryService};

/// Query parameters for GET /gallery
#[derive(Debug, Deserialize)]
pub struct GalleryQuery {
    /// Restrict to images carrying this tag
    pub tag: Option<String>,

    /// Trailing window: "all", "1d", "7d", "30d"
    pub date_range: Option<String>,

    /// Scope: "all", "public", "private"
    pub visibility: Option<String>,

    /// 1-based page index
    pub page: Option<i64>,
}

/// GET /api/v1/gallery
#[get("/api/v1/gallery")]
pub async fn get_gallery(
    query: web::Query<GalleryQuery>,
    service: web::Data<GalleryService>,
    user: MaybeUserId,
) -> Result<HttpResponse> {
    let date_range = match query.date_range.as_deref() {
        None => DateRange::All,
        Some(raw) => parse_date_range(raw)?,
    };

    let visibility = resolve_visibility(query.visibility.as_deref(), user.0.is_some())?;
    let page = validate_page(query.page.unwrap_or(1))?;

    let tag = query
        .tag
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase);

    debug!(
        tag = ?tag,
        date_range = %date_range,
        visibility = %visibility,
        page,
        "Gallery request"
    );

    let filter = GalleryFilter {
        tag,
        date_range,
        visibility,
    };

    let response = service.get_page(&filter, page).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Resolve the visibility scope against the caller's identity.
///
/// Anonymous requests that don't name a scope get the public gallery; an
/// explicit private-inclusive scope without an identity is rejected.
fn resolve_visibility(requested: Option<&str>, authenticated: bool) -> Result<Visibility> {
    let visibility = match requested {
        None if !authenticated => Visibility::Public,
        None => Visibility::All,
        Some(raw) => parse_visibility(raw)?,
    };

    if visibility.includes_private() && !authenticated {
        return Err(AppError::NotAuthorized(format!(
            "visibility scope '{}' requires an authenticated identity",
            visibility
        )));
    }

    Ok(visibility)
}

/// Reject non-positive page indices
fn validate_page(page: i64) -> Result<i64> {
    if page <= 0 {
        return Err(AppError::InvalidPage(format!(
            "page must be >= 1, got {}",
            page
        )));
    }
    Ok(page)
}

/// Parse date range string
fn parse_date_range(s: &str) -> Result<DateRange> {
    match s {
        "all" => Ok(DateRange::All),
        "1d" => Ok(DateRange::OneDay),
        "7d" => Ok(DateRange::SevenDays),
        "30d" => Ok(DateRange::ThirtyDays),
        _ => Err(AppError::InvalidFilter(format!(
            "Invalid date_range: {}. Must be one of: all, 1d, 7d, 30d",
            s
        ))),
    }
}

/// Parse visibility string
fn parse_visibility(s: &str) -> Result<Visibility> {
    match s {
        "all" => Ok(Visibility::All),
        "public" => Ok(Visibility::Public),
        "private" => Ok(Visibility::Private),
        _ => Err(AppError::InvalidFilter(format!(
            "Invalid visibility: {}. Must be one of: all, public, private",
            s
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_range() {
        assert!(parse_date_range("all").is_ok());
        assert!(parse_date_range("1d").is_ok());
        assert!(parse_date_range("7d").is_ok());
        assert!(parse_date_range("30d").is_ok());
        assert!(matches!(
            parse_date_range("90d"),
            Err(AppError::InvalidFilter(_))
        ));
    }

    #[test]
    fn test_parse_visibility() {
        assert!(parse_visibility("all").is_ok());
        assert!(parse_visibility("public").is_ok());
        assert!(parse_visibility("private").is_ok());
        assert!(matches!(
            parse_visibility("friends"),
            Err(AppError::InvalidFilter(_))
        ));
    }

    #[test]
    fn test_anonymous_private_scope_rejected() {
        assert!(matches!(
            resolve_visibility(Some("private"), false),
            Err(AppError::NotAuthorized(_))
        ));
        assert!(matches!(
            resolve_visibility(Some("all"), false),
            Err(AppError::NotAuthorized(_))
        ));
    }

    #[test]
    fn test_visibility_defaults_follow_identity() {
        assert_eq!(resolve_visibility(None, false).unwrap(), Visibility::Public);
        assert_eq!(resolve_visibility(None, true).unwrap(), Visibility::All);
        assert_eq!(
            resolve_visibility(Some("public"), false).unwrap(),
            Visibility::Public
        );
        assert_eq!(
            resolve_visibility(Some("private"), true).unwrap(),
            Visibility::Private
        );
    }

    #[test]
    fn test_non_positive_page_rejected() {
        assert!(matches!(validate_page(0), Err(AppError::InvalidPage(_))));
        assert!(matches!(validate_page(-3), Err(AppError::InvalidPage(_))));
        assert_eq!(validate_page(1).unwrap(), 1);
        assert_eq!(validate_page(40).unwrap(), 40);
    }
}
