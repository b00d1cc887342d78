use crate::error::AppError;

pub async fn root_handler() -> &'static str {
    "Hi, I am the root route."
}

pub async fn not_found_handler() -> AppError {
    AppError::page_not_found()
}
