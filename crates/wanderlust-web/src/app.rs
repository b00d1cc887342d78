use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower::Layer;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::error::handle_panic;
use crate::handlers::{
    create_handler, delete_handler, edit_form_handler, index_handler, new_form_handler,
    not_found_handler, root_handler, show_handler, update_handler,
};
use crate::method_override::method_override;
use crate::state::AppState;

pub struct App {}

impl App {
    /// The complete application.
    ///
    /// Method overrides have to be applied before routing, so the routes
    /// are served as the fallback of an outer router that only carries the
    /// request tracing.
    pub fn router(state: AppState) -> Router {
        let routes = middleware::from_fn(method_override).layer(Self::routes(state));

        Router::new()
            .fallback_service(routes)
            .layer(TraceLayer::new_for_http())
    }

    /// The listing routes, without method overrides.
    pub fn routes(state: AppState) -> Router {
        Router::new()
            .route("/", get(root_handler))
            .route("/listings", get(index_handler).post(create_handler))
            .route("/listings/new", get(new_form_handler))
            .route(
                "/listings/{id}",
                get(show_handler).put(update_handler).delete(delete_handler),
            )
            .route("/listings/{id}/edit", get(edit_form_handler))
            .fallback(not_found_handler)
            .method_not_allowed_fallback(not_found_handler)
            .layer(CatchPanicLayer::custom(handle_panic))
            .with_state(state)
    }
}
