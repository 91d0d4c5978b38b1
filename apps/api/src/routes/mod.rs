pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::catalog::{handlers as catalog, shelf};
use crate::notify::handlers as notify;
use crate::quiz::handlers as quiz;
use crate::recommend::handlers as recommend;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Catalog CRUD + import
        .route(
            "/books",
            get(catalog::handle_list_books).post(catalog::handle_add_book),
        )
        .route("/books/import", post(catalog::handle_import_books))
        .route(
            "/books/:id",
            put(catalog::handle_update_book).delete(catalog::handle_delete_book),
        )
        // Per-bracket shelf snapshots
        .route("/recommendations", get(shelf::handle_get_all_shelves))
        .route(
            "/recommendations/:age_group",
            get(shelf::handle_get_shelf).put(shelf::handle_set_shelf),
        )
        // Quiz flow
        .route("/quiz/parent-consent", post(quiz::handle_parent_consent))
        .route("/quiz/users", get(quiz::handle_list_readers))
        .route(
            "/quiz/users/:id",
            get(quiz::handle_get_reader).put(quiz::handle_update_reader),
        )
        .route("/quiz/users/:id/basic-info", put(quiz::handle_basic_info))
        .route(
            "/quiz/users/:id/parent-reading",
            put(quiz::handle_parent_reading),
        )
        .route("/quiz/users/:id/genres", put(quiz::handle_genres))
        .route("/quiz/users/:id/interests", put(quiz::handle_interests))
        .route("/quiz/users/:id/book-series", put(quiz::handle_book_series))
        .route(
            "/quiz/users/:id/book-series/response",
            post(quiz::handle_series_response),
        )
        .route(
            "/quiz/users/:id/recommendations",
            post(quiz::handle_save_recommendations),
        )
        .route("/quiz/complete", post(quiz::handle_complete_quiz))
        // Plan generation + administration
        .route(
            "/recommendation-plan",
            post(recommend::handle_generate_plan),
        )
        .route(
            "/plans",
            get(recommend::handle_list_plans).delete(recommend::handle_delete_all_plans),
        )
        .route(
            "/plans/:id",
            get(recommend::handle_get_plan).delete(recommend::handle_delete_plan),
        )
        // Notifications
        .route(
            "/send-recommendations/email",
            post(notify::handle_send_email),
        )
        .route(
            "/send-recommendations/whatsapp",
            post(notify::handle_send_whatsapp),
        )
        .with_state(state)
}
