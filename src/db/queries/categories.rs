use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteExecutor, SqlitePool};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
}

pub async fn get_all_categories(pool: &SqlitePool) -> sqlx::Result<Vec<Category>> {
    sqlx::query_as::<_, Category>(
        r#"
        SELECT id, type FROM categories ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn get_category(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<Category>> {
    sqlx::query_as::<_, Category>(
        r#"
        SELECT id, type FROM categories WHERE categories.id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn update_category<'e, E: SqliteExecutor<'e>>(
    executor: E,
    category: &Category,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        UPDATE categories SET type=?1 WHERE categories.id = ?2
        "#,
    )
    .bind(category.kind.as_str())
    .bind(category.id)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn delete_category<'e, E: SqliteExecutor<'e>>(executor: E, id: i64) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        DELETE FROM categories WHERE categories.id = ?1
        "#,
    )
    .bind(id)
    .execute(executor)
    .await?;
    Ok(())
}

/// Makes the categories table match `categories` in one transaction: missing ids are
/// deleted, known ids are renamed and new ids are inserted with the id they carry.
pub async fn import_categories(pool: &SqlitePool, categories: Vec<Category>) -> sqlx::Result<()> {
    let mut tx = pool.begin().await?;
    let existing_ids: HashSet<i64> = sqlx::query_scalar::<_, i64>("SELECT id FROM categories")
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .collect();
    let new_ids: HashSet<i64> = categories.iter().map(|c| c.id).collect();
    for id in existing_ids.difference(&new_ids) {
        delete_category(&mut *tx, *id).await?;
    }
    for category in categories {
        if existing_ids.contains(&category.id) {
            update_category(&mut *tx, &category).await?;
        } else {
            sqlx::query(
                r#"
                INSERT INTO categories (id, type) VALUES (?1, ?2)
                "#,
            )
            .bind(category.id)
            .bind(category.kind.as_str())
            .execute(&mut *tx)
            .await?;
        }
    }
    tx.commit().await?;
    tracing::info!(count = new_ids.len(), "Imported categories");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    async fn create_category(pool: &SqlitePool, kind: &str) -> i64 {
        sqlx::query("INSERT INTO categories (type) VALUES (?1)")
            .bind(kind)
            .execute(pool)
            .await
            .unwrap()
            .last_insert_rowid()
    }

    #[tokio::test]
    async fn categories_are_listed_by_id() {
        let pool = test_pool().await;
        let science = create_category(&pool, "Science").await;
        let art = create_category(&pool, "Art").await;

        let categories = get_all_categories(&pool).await.unwrap();
        assert_eq!(
            categories,
            vec![
                Category {
                    id: science,
                    kind: "Science".to_owned()
                },
                Category {
                    id: art,
                    kind: "Art".to_owned()
                },
            ]
        );
    }

    #[tokio::test]
    async fn missing_category_is_none() {
        let pool = test_pool().await;
        let id = create_category(&pool, "Sports").await;

        assert!(get_category(&pool, id).await.unwrap().is_some());
        assert!(get_category(&pool, id + 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn import_replaces_table_contents() {
        let pool = test_pool().await;
        let kept = create_category(&pool, "Scince").await;
        let dropped = create_category(&pool, "Cooking").await;

        import_categories(
            &pool,
            vec![
                Category {
                    id: kept,
                    kind: "Science".to_owned(),
                },
                Category {
                    id: 10,
                    kind: "Art".to_owned(),
                },
            ],
        )
        .await
        .unwrap();

        assert!(get_category(&pool, dropped).await.unwrap().is_none());
        assert_eq!(get_category(&pool, kept).await.unwrap().unwrap().kind, "Science");
        assert_eq!(get_category(&pool, 10).await.unwrap().unwrap().kind, "Art");
    }

    #[test]
    fn category_serializes_name_as_type() {
        let category = Category {
            id: 1,
            kind: "History".to_owned(),
        };
        let value = serde_json::to_value(&category).unwrap();
        assert_eq!(value, serde_json::json!({"id": 1, "type": "History"}));
    }

    #[tokio::test]
    async fn failed_import_leaves_table_untouched() {
        let pool = test_pool().await;
        create_category(&pool, "Science").await;
        create_category(&pool, "Art").await;
        let before = get_all_categories(&pool).await.unwrap();

        let geography = Category {
            id: 10,
            kind: "Geography".to_owned(),
        };
        let result = import_categories(&pool, vec![geography.clone(), geography]).await;

        assert!(result.is_err());
        assert_eq!(get_all_categories(&pool).await.unwrap(), before);
    }
}
