use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::models::notice::{NewNotice, NoticePatch, NoticeRecord};

const SELECT_NOTICE: &str =
    r#"SELECT id, "type", service, "begin", "end", detail FROM fault_info_log"#;

#[derive(Debug, thiserror::Error)]
#[error("storage error: {0}")]
pub struct StorageError(#[from] sqlx::Error);

pub struct NoticeService;

impl NoticeService {
    /// Insert a notice and return the id the store assigned to it.
    ///
    /// `last_insert_rowid()` is connection-scoped, so both statements run on
    /// the same pooled connection.
    pub async fn insert(pool: &SqlitePool, notice: &NewNotice) -> Result<i64, StorageError> {
        let mut conn = pool.acquire().await?;

        sqlx::query(
            r#"INSERT INTO fault_info_log ("type", service, "begin", "end", detail)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(notice.kind)
        .bind(&notice.service)
        .bind(notice.begin)
        .bind(notice.end)
        .bind(&notice.detail)
        .execute(&mut *conn)
        .await?;

        let id: i64 = sqlx::query_scalar("SELECT last_insert_rowid()")
            .fetch_one(&mut *conn)
            .await?;
        Ok(id)
    }

    pub async fn fetch_by_id(
        pool: &SqlitePool,
        id: i64,
    ) -> Result<Option<NoticeRecord>, StorageError> {
        let row = sqlx::query_as::<_, NoticeRecord>(&format!("{SELECT_NOTICE} WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row)
    }

    pub async fn fetch_all(pool: &SqlitePool) -> Result<Vec<NoticeRecord>, StorageError> {
        let rows = sqlx::query_as::<_, NoticeRecord>(SELECT_NOTICE)
            .fetch_all(pool)
            .await?;
        Ok(rows)
    }

    pub async fn fetch_latest(pool: &SqlitePool) -> Result<Option<NoticeRecord>, StorageError> {
        let row = sqlx::query_as::<_, NoticeRecord>(&format!(
            "{SELECT_NOTICE} ORDER BY id DESC LIMIT 1"
        ))
        .fetch_optional(pool)
        .await?;
        Ok(row)
    }

    /// Write the present fields of `patch` to notice `id`.
    ///
    /// Returns `false` without touching the store when the patch is empty,
    /// and otherwise whether a row was changed.
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        patch: &NoticePatch,
    ) -> Result<bool, StorageError> {
        if patch.is_empty() {
            return Ok(false);
        }

        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE fault_info_log SET ");
        let mut set = qb.separated(", ");
        if let Some(kind) = patch.kind {
            set.push(r#""type" = "#).push_bind_unseparated(kind);
        }
        if let Some(service) = &patch.service {
            set.push("service = ").push_bind_unseparated(service.clone());
        }
        if let Some(begin) = patch.begin {
            set.push(r#""begin" = "#).push_bind_unseparated(begin);
        }
        if let Some(end) = patch.end {
            set.push(r#""end" = "#).push_bind_unseparated(end);
        }
        if let Some(detail) = &patch.detail {
            set.push("detail = ").push_bind_unseparated(detail.clone());
        }
        qb.push(" WHERE id = ").push_bind(id);

        let result = qb.build().execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Hard delete. A missing id is not an error.
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM fault_info_log WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
