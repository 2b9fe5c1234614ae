pub mod health;

use axum::{
    extract::{FromRequest, FromRequestParts},
    http::{header, HeaderName, HeaderValue},
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::errors::AppError;
use crate::state::AppState;
use crate::{resume, schedule, settings, tasks, wishlist};

/// `axum::Json` with body rejections rendered through `AppError` (400 + envelope).
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Query` with the same treatment for bad query strings.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        // Stateless AI endpoints
        .route(
            "/api/tasks/decompose",
            post(tasks::handlers::handle_decompose),
        )
        .route(
            "/api/schedule/optimize",
            post(schedule::handlers::handle_optimize),
        )
        .route(
            "/api/resume/generate",
            post(resume::handlers::handle_generate),
        )
        .route(
            "/api/wishlist/priority",
            post(wishlist::handlers::handle_priority),
        )
        // Tasks
        .route(
            "/api/tasks",
            get(tasks::handlers::handle_list_tasks).post(tasks::handlers::handle_create_task),
        )
        .route(
            "/api/tasks/:id",
            get(tasks::handlers::handle_get_task).delete(tasks::handlers::handle_delete_task),
        )
        .route(
            "/api/tasks/:id/status",
            patch(tasks::handlers::handle_set_status),
        )
        .route(
            "/api/tasks/:id/subtasks/:subtask_id",
            patch(tasks::handlers::handle_update_subtask),
        )
        // Schedules
        .route(
            "/api/schedules",
            get(schedule::handlers::handle_list_schedules),
        )
        .route(
            "/api/schedules/:date",
            get(schedule::handlers::handle_get_schedule)
                .put(schedule::handlers::handle_put_schedule),
        )
        .route(
            "/api/schedules/:date/generate",
            post(schedule::handlers::handle_generate),
        )
        .route(
            "/api/schedules/:date/blocks/:block_id",
            patch(schedule::handlers::handle_update_block),
        )
        .route(
            "/api/schedules/:date/feedback",
            put(schedule::handlers::handle_feedback),
        )
        // Resume
        .route(
            "/api/resume",
            get(resume::handlers::handle_get_resume)
                .put(resume::handlers::handle_save_resume)
                .delete(resume::handlers::handle_clear_resume),
        )
        // Wishlist
        .route(
            "/api/wishlist",
            get(wishlist::handlers::handle_list_items).post(wishlist::handlers::handle_add_item),
        )
        .route(
            "/api/wishlist/budget",
            get(wishlist::handlers::handle_get_budget).put(wishlist::handlers::handle_set_budget),
        )
        .route(
            "/api/wishlist/:id",
            delete(wishlist::handlers::handle_delete_item),
        )
        .route(
            "/api/wishlist/:id/purchase",
            post(wishlist::handlers::handle_purchase),
        )
        // Settings
        .route(
            "/api/settings",
            get(settings::handlers::handle_get_settings)
                .put(settings::handlers::handle_save_settings),
        );

    Router::new()
        .route("/health", get(health::health_handler))
        .merge(api)
        .with_state(state)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("origin-when-cross-origin"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-xss-protection"),
            HeaderValue::from_static("1; mode=block"),
        ))
}
