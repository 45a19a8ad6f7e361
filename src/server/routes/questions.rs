use std::collections::BTreeMap;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{
            categories::get_all_categories,
            questions::{self, get_all_questions, search_questions},
        },
        Question,
    },
    server::{
        app::AppState,
        deserializers::deserialize_stri64,
        pagination::{paginate, PageQuery},
    },
    telemetry::{QUESTIONS_CREATED, QUESTIONS_DELETED},
};

use super::{categories::category_map, ApiError, ApiResponse, Success};

const CREATE_FIELDS: [&str; 4] = ["question", "answer", "difficulty", "category"];

#[derive(Debug, Deserialize)]
struct NewQuestion {
    question: String,
    answer: String,
    #[serde(deserialize_with = "deserialize_stri64")]
    difficulty: i64,
    #[serde(deserialize_with = "deserialize_stri64")]
    category: i64,
}

/// `POST /questions` either searches or creates, depending on which keys the body has.
#[derive(Debug)]
enum QuestionsPost {
    Search { search_term: String },
    Create(NewQuestion),
}

impl TryFrom<Value> for QuestionsPost {
    type Error = ApiError;

    fn try_from(body: Value) -> Result<Self, Self::Error> {
        let Value::Object(mut fields) = body else {
            return Err(ApiError::BadRequest);
        };
        if let Some(term) = fields.remove("searchTerm") {
            return match term {
                Value::String(search_term) => Ok(QuestionsPost::Search { search_term }),
                other => Err(ApiError::Unprocessable(format!(
                    "searchTerm should be a string, got {other}"
                ))),
            };
        }
        if CREATE_FIELDS.iter().all(|f| fields.contains_key(*f)) {
            return serde_json::from_value(Value::Object(fields))
                .map(QuestionsPost::Create)
                .map_err(|e| ApiError::Unprocessable(e.to_string()));
        }
        Err(ApiError::BadRequest)
    }
}

#[derive(Serialize)]
pub(super) struct QuestionsPage {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    // every category name, kept under this key for existing clients
    current_category: Vec<String>,
    categories: BTreeMap<i64, String>,
}

#[derive(Serialize)]
struct Created {
    success: bool,
    id: i64,
}

/// Formats one page of `selection`. An empty page or an empty category table is a 404.
pub(super) async fn questions_page(
    pool: &SqlitePool,
    selection: Vec<Question>,
    page: i64,
) -> ApiResponse<Json<QuestionsPage>> {
    let total_questions = selection.len();
    let questions = paginate(selection, page);
    if questions.is_empty() {
        return Err(ApiError::NotFound);
    }
    let categories = get_all_categories(pool).await?;
    if categories.is_empty() {
        return Err(ApiError::NotFound);
    }
    Ok(Json(QuestionsPage {
        success: true,
        questions,
        total_questions,
        current_category: categories.iter().map(|c| c.kind.clone()).collect(),
        categories: category_map(&categories),
    }))
}

async fn list_questions(
    State(pool): State<SqlitePool>,
    page: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResponse<Json<QuestionsPage>> {
    let page = page.map(|Query(q)| q.page()).unwrap_or(1);
    let selection = get_all_questions(&pool).await?;
    questions_page(&pool, selection, page).await
}

async fn delete_question(
    State(pool): State<SqlitePool>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResponse<Json<Success>> {
    let Path(id) = id.map_err(|_| ApiError::NotFound)?;
    if !questions::delete_question(&pool, id).await? {
        return Err(ApiError::NotFound);
    }
    QUESTIONS_DELETED.inc();
    tracing::info!(id, "Deleted question");
    Ok(Json(Success::new()))
}

async fn post_questions(
    State(pool): State<SqlitePool>,
    page: Result<Query<PageQuery>, QueryRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResponse<Response> {
    let Json(body) = body.map_err(|_| ApiError::BadRequest)?;
    match QuestionsPost::try_from(body)? {
        QuestionsPost::Search { search_term } => {
            let page = page.map(|Query(q)| q.page()).unwrap_or(1);
            let selection = search_questions(&pool, &search_term).await?;
            Ok(questions_page(&pool, selection, page).await?.into_response())
        }
        QuestionsPost::Create(new_question) => {
            let id = questions::create_question(
                &pool,
                &new_question.question,
                &new_question.answer,
                new_question.category,
                new_question.difficulty,
            )
            .await?;
            QUESTIONS_CREATED.inc();
            tracing::info!(id, "Created question");
            Ok(Json(Created { success: true, id }).into_response())
        }
    }
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route("/questions", get(list_questions).post(post_questions))
        .route("/questions/{id}", delete(delete_question))
        .with_state(state)
}
