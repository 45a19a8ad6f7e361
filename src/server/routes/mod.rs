mod categories;
mod questions;
mod quizzes;

use serde::Serialize;

pub use super::errors::{ApiError, ApiResponse};
pub use categories::category_router;
pub use questions::questions_router;
pub use quizzes::quizzes_router;

#[derive(Serialize)]
struct Success {
    success: bool,
}

impl Success {
    fn new() -> Self {
        Self { success: true }
    }
}
