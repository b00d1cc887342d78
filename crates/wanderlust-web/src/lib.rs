//! HTTP frontend for the Wanderlust listings service.
//!
//! Server-rendered CRUD pages over a [`Repository`](wanderlust_core::Repository).
//! Write paths validate the submitted body before touching storage, and
//! every failure ends in a rendered error page.

pub mod app;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod method_override;
pub mod state;
pub mod views;

pub use app::App;
pub use error::{AppError, ErrorPage};
pub use state::AppState;
