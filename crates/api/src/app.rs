use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use shared::jwt::JwtConfig;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, require_admin, require_mod,
    require_user_auth, security_headers_middleware, trace_id, RateLimiterState,
};
use crate::routes::{
    auth, comments, dashboard, health, invite_codes, movie_sources, movies, notifications, users,
};
use crate::services::{AuthService, CatalogService, DriveClient, GoogleOAuthClient, MovieApiClient};

/// Shared handles built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub jwt: Arc<JwtConfig>,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
    pub movie_api: Arc<MovieApiClient>,
    pub drive: Arc<DriveClient>,
    /// `None` when Google sign-in is not configured.
    pub google_oauth: Option<Arc<GoogleOAuthClient>>,
}

impl AppState {
    pub fn new(config: Config, pool: PgPool) -> anyhow::Result<Self> {
        let jwt = JwtConfig::with_leeway(
            &config.jwt.secret,
            config.jwt.token_expiry_secs,
            config.jwt.leeway_secs,
        )?;

        // A zero limit disables rate limiting.
        let rate_limiter = RateLimiterState::new(config.security.rate_limit_per_minute).map(Arc::new);

        let movie_api = MovieApiClient::new(&config.movie_api)?;
        let drive = DriveClient::new(&config.google)?;
        let google_oauth = if config.google.oauth_enabled() {
            Some(Arc::new(GoogleOAuthClient::new(
                &config.google,
                &config.server,
                &config.jwt.secret,
            )?))
        } else {
            info!("Google sign-in disabled: client credentials not configured");
            None
        };

        Ok(Self {
            pool,
            config: Arc::new(config),
            jwt: Arc::new(jwt),
            rate_limiter,
            movie_api: Arc::new(movie_api),
            drive: Arc::new(drive),
            google_oauth,
        })
    }

    pub fn auth_service(&self) -> AuthService {
        AuthService::new(self.pool.clone(), self.jwt.clone())
    }

    pub fn catalog_service(&self) -> CatalogService {
        CatalogService::new(
            self.pool.clone(),
            self.movie_api.clone(),
            self.drive.clone(),
        )
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        // Development: allow any origin
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Wraps a router in the per-user rate limit and bearer authentication.
/// Auth is added last so it runs first.
fn authenticated(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    router
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user_auth,
        ))
}

pub fn create_app(config: Config, pool: PgPool) -> anyhow::Result<Router> {
    let state = AppState::new(config, pool)?;
    Ok(build_router(state))
}

pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/google", get(auth::google_authorize))
        .route("/api/auth/google/callback", get(auth::google_callback))
        .route("/api/movies", get(movies::list_movies))
        .route("/api/movies/:id", get(movies::get_movie))
        .route("/api/comments/movie/:movie_id", get(comments::list_for_movie))
        .route(
            "/api/invite-codes/validate/:code",
            get(invite_codes::validate_invite_code),
        );

    // Any signed-in account
    let user_routes = Router::new()
        .route("/api/auth/me", get(auth::me))
        .route(
            "/api/users/profile",
            get(users::get_profile).put(users::update_profile),
        )
        .route("/api/users/favorites", get(users::list_favorites))
        .route(
            "/api/users/favorites/:movie_id",
            post(users::add_favorite).delete(users::remove_favorite),
        )
        .route(
            "/api/users/check-favorite/:movie_id",
            get(users::check_favorite),
        )
        .route(
            "/api/users/watch-history",
            get(users::watch_history).delete(users::clear_watch_history),
        )
        .route(
            "/api/users/watch-history/:movie_id",
            post(users::record_watch),
        )
        .route("/api/movies/:id/rate", post(movies::rate_movie))
        .route("/api/comments", post(comments::create_comment))
        .route(
            "/api/comments/:id",
            put(comments::update_comment).delete(comments::delete_comment),
        )
        .route("/api/comments/:id/like", post(comments::like_comment))
        .route("/api/comments/:id/unlike", post(comments::unlike_comment))
        .route(
            "/api/notifications",
            get(notifications::list_notifications).delete(notifications::delete_all),
        )
        .route(
            "/api/notifications/read-all",
            put(notifications::mark_all_read),
        )
        .route("/api/notifications/:id/read", put(notifications::mark_read))
        .route(
            "/api/notifications/:id",
            delete(notifications::delete_notification),
        );

    // Moderators and admins
    let mod_routes = Router::new()
        .route("/api/users/:id/block", put(users::block_user))
        .route("/api/invite-codes", post(invite_codes::create_invite_code))
        .route("/api/invite-codes/my-codes", get(invite_codes::my_invite_codes))
        .route("/api/invite-codes/:id", get(invite_codes::get_invite_code))
        .route("/api/movies", post(movies::create_movie))
        .route("/api/movies/:id", put(movies::update_movie))
        .route("/api/comments/user/:user_id", get(comments::list_for_user))
        .route(
            "/api/notifications",
            post(notifications::create_notification),
        )
        .route(
            "/api/movie-sources/api/search",
            get(movie_sources::search_api),
        )
        .route(
            "/api/movie-sources/api/details/:id",
            get(movie_sources::api_details),
        )
        .route(
            "/api/movie-sources/api/import",
            post(movie_sources::import_from_api),
        )
        .route(
            "/api/movie-sources/drive/list",
            get(movie_sources::list_drive_files),
        )
        .route(
            "/api/movie-sources/drive/file/:file_id",
            get(movie_sources::get_drive_file),
        )
        .route(
            "/api/movie-sources/drive/import",
            post(movie_sources::import_from_drive),
        )
        .route(
            "/api/movie-sources/drive/auth",
            post(movie_sources::set_drive_auth),
        )
        .route("/api/mod/stats", get(dashboard::mod_stats))
        .route("/api/mod/movies", get(dashboard::mod_movies))
        .route("/api/mod/comments", get(dashboard::mod_comments))
        .route("/api/mod/users", get(dashboard::mod_users))
        .route_layer(middleware::from_fn(require_mod));

    // Admins only
    let admin_routes = Router::new()
        .route("/api/users", get(users::list_users))
        .route("/api/users/:id/role", put(users::update_role))
        .route("/api/users/:id", delete(users::delete_user))
        .route("/api/invite-codes", get(invite_codes::list_invite_codes))
        .route(
            "/api/invite-codes/:id",
            delete(invite_codes::delete_invite_code),
        )
        .route("/api/movies/:id", delete(movies::delete_movie))
        .route("/api/movies/fetch/external", get(movies::fetch_external))
        .route("/api/movies/import/external", post(movies::import_external))
        .route("/api/admin/stats", get(dashboard::admin_stats))
        .route("/api/admin/users", get(dashboard::admin_users))
        .route("/api/admin/movies", get(dashboard::admin_movies))
        .route("/api/admin/comments", get(dashboard::admin_comments))
        .route_layer(middleware::from_fn(require_admin));

    Router::new()
        .merge(public_routes)
        .merge(authenticated(user_routes, &state))
        .merge(authenticated(mod_routes, &state))
        .merge(authenticated(admin_routes, &state))
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors_layer(&config.security.cors_origins))
        .with_state(state)
}
