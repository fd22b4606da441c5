use axum::extract::DefaultBodyLimit;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::http::middleware::session;
use crate::http::routes::{auth, comments, health, likes, password_reset, posts, profile, uploads};
use crate::state::AppState;

pub fn build(state: AppState) -> Router {
    let cors = build_cors(&state);
    // A path-style base means this instance serves the files itself; an
    // absolute URL means a CDN or front proxy does.
    let serve_uploads = (state.config.upload_base_url.starts_with('/')
        && state.config.upload_base_url.len() > 1)
        .then(|| {
            (
                state.config.upload_base_url.clone(),
                state.config.upload_dir.clone(),
            )
        });
    // Body cap sized for a batch of max-size files in one multipart request.
    let upload_body_limit = state.config.max_upload_bytes.saturating_mul(10);
    let protected = Router::new()
        .route("/v1/auth/logout", post(auth::logout))
        .route("/v1/posts", post(posts::create_post))
        .route("/v1/posts/{id}", delete(posts::delete_post))
        .route("/v1/posts/{id}/comments", post(comments::create_comment))
        .route("/v1/posts/{id}/like", post(likes::toggle_like))
        .route("/v1/comments/{id}", delete(comments::delete_comment))
        .route(
            "/v1/uploads",
            post(uploads::upload_files).layer(DefaultBodyLimit::max(upload_body_limit)),
        )
        .route(
            "/v1/profile",
            get(profile::get_profile).put(profile::update_profile),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session::require_user,
        ));

    let mut router = Router::new()
        .route("/health", get(health::health))
        .route("/v1/auth/register", post(auth::register))
        .route("/v1/auth/login", post(auth::login))
        .route(
            "/v1/auth/forgot-password",
            post(password_reset::forgot_password),
        )
        .route(
            "/v1/auth/reset-password",
            post(password_reset::reset_password),
        )
        .route("/v1/feed", get(posts::list_feed))
        .route("/v1/posts/{id}", get(posts::get_post))
        .route("/v1/posts/{id}/comments", get(comments::list_comments))
        .merge(protected)
        .with_state(state);
    if let Some((base, dir)) = serve_uploads {
        router = router.nest_service(&base, ServeDir::new(dir));
    }
    if let Some(cors) = cors {
        router = router.layer(cors);
    }
    router
}

fn build_cors(state: &AppState) -> Option<CorsLayer> {
    let mut origins = Vec::new();
    let mut allow_any = false;
    for origin in state.config.cors_allow_origins.iter() {
        if is_wildcard_origin(origin) {
            allow_any = true;
            break;
        }
        match HeaderValue::from_str(origin.trim()) {
            Ok(value) => origins.push(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "invalid CORS origin ignored");
            }
        }
    }

    let cors = CorsLayer::new().allow_methods([
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ]);

    if !should_enable_cors(allow_any, &origins) {
        return None;
    }

    if allow_any {
        Some(cors.allow_origin(Any).allow_headers(Any))
    } else {
        Some(
            cors.allow_origin(AllowOrigin::list(origins))
                .allow_credentials(true)
                .allow_headers([CONTENT_TYPE]),
        )
    }
}

fn is_wildcard_origin(origin: &str) -> bool {
    origin.trim() == "*"
}

fn should_enable_cors(allow_any: bool, origins: &[HeaderValue]) -> bool {
    allow_any || !origins.is_empty()
}

#[cfg(test)]
mod tests {
    use super::{is_wildcard_origin, should_enable_cors};
    use axum::http::HeaderValue;

    #[test]
    fn wildcard_origin_matches_trimmed_star() {
        assert!(is_wildcard_origin("*"));
        assert!(is_wildcard_origin(" * "));
        assert!(!is_wildcard_origin("https://example.com"));
    }

    #[test]
    fn cors_enablement_requires_origin_or_wildcard() {
        assert!(!should_enable_cors(false, &[]));
        assert!(should_enable_cors(true, &[]));
        assert!(should_enable_cors(
            false,
            &[HeaderValue::from_static("https://example.com")]
        ));
    }
}
