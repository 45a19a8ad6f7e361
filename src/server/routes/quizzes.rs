use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories::get_category, questions::get_quiz_candidates},
        Question,
    },
    server::{
        app::AppState,
        deserializers::{deserialize_stri64, Stri64},
    },
    telemetry::QUIZ_DRAWS,
};

use super::{ApiError, ApiResponse};

/// Category id meaning "draw from every category".
const ALL_CATEGORIES: i64 = 0;

#[derive(Debug, Deserialize)]
struct QuizCategory {
    #[serde(deserialize_with = "deserialize_stri64")]
    id: i64,
}

#[derive(Debug, Deserialize)]
struct QuizRequest {
    quiz_category: QuizCategory,
    previous_questions: Vec<Stri64>,
}

#[derive(Serialize)]
struct QuizResponse {
    success: bool,
    // absent once the quiz has run out of questions
    #[serde(skip_serializing_if = "Option::is_none")]
    question: Option<Question>,
}

async fn play_quiz(
    State(pool): State<SqlitePool>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResponse<Json<QuizResponse>> {
    let Json(body) = body.map_err(|_| ApiError::BadRequest)?;
    let request: QuizRequest =
        serde_json::from_value(body).map_err(|e| ApiError::Unprocessable(e.to_string()))?;

    let category = match request.quiz_category.id {
        ALL_CATEGORIES => None,
        id => {
            if get_category(&pool, id).await?.is_none() {
                return Err(ApiError::InvalidCategory(id));
            }
            Some(id)
        }
    };
    let previous: Vec<i64> = request.previous_questions.iter().map(|q| q.0).collect();
    let candidates = get_quiz_candidates(&pool, category, &previous).await?;

    let label = request.quiz_category.id.to_string();
    QUIZ_DRAWS.with_label_values(&[label.as_str()]).inc();

    let question = candidates.choose(&mut rand::thread_rng()).cloned();
    if question.is_none() {
        tracing::debug!(category = %label, seen = previous.len(), "Quiz exhausted");
    }
    Ok(Json(QuizResponse {
        success: true,
        question,
    }))
}

pub fn quizzes_router(state: AppState) -> Router {
    Router::new()
        .route("/quizzes", post(play_quiz))
        .with_state(state)
}
