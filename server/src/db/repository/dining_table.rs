//! Dining Table Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{DiningTable, DiningTableCreate, DiningTableUpdate, derive_slug};
use crate::utils::time::now_millis;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "dining_table";

#[derive(Clone)]
pub struct DiningTableRepository {
    base: BaseRepository,
}

impl DiningTableRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Paginated listing, optionally filtered by active flag
    pub async fn list(
        &self,
        active: Option<bool>,
        limit: u32,
        offset: u64,
    ) -> RepoResult<(Vec<DiningTable>, u64)> {
        let where_clause = if active.is_some() {
            " WHERE is_active = $active"
        } else {
            ""
        };

        let list_sql = format!(
            "SELECT * FROM dining_table{} ORDER BY number LIMIT $limit START $start",
            where_clause
        );
        let count_sql = format!("SELECT count() FROM dining_table{} GROUP ALL", where_clause);

        let mut query = self
            .base
            .db()
            .query(list_sql)
            .query(count_sql)
            .bind(("limit", limit as i64))
            .bind(("start", offset as i64));
        if let Some(active) = active {
            query = query.bind(("active", active));
        }

        let mut result = query.await?;
        let tables: Vec<DiningTable> = result.take(0)?;
        let total: Option<i64> = result.take((1, "count"))?;
        Ok((tables, total.unwrap_or(0).max(0) as u64))
    }

    /// All active tables (bulk QR generation)
    pub async fn find_all_active(&self) -> RepoResult<Vec<DiningTable>> {
        let tables: Vec<DiningTable> = self
            .base
            .db()
            .query("SELECT * FROM dining_table WHERE is_active = true ORDER BY number")
            .await?
            .take(0)?;
        Ok(tables)
    }

    /// Find table by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<DiningTable>> {
        let thing = parse_record_id(id)?;
        let table: Option<DiningTable> = self.base.db().select(thing).await?;
        Ok(table)
    }

    /// Find an ACTIVE table by its public slug
    ///
    /// 停用和不存在的桌台对调用方不可区分，避免通过 slug 枚举探测。
    pub async fn find_by_slug(&self, slug: &str) -> RepoResult<Option<DiningTable>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM dining_table WHERE qr_slug = $slug AND is_active = true LIMIT 1")
            .bind(("slug", slug.to_string()))
            .await?;
        let tables: Vec<DiningTable> = result.take(0)?;
        Ok(tables.into_iter().next())
    }

    /// Find table by number
    pub async fn find_by_number(&self, number: &str) -> RepoResult<Option<DiningTable>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM dining_table WHERE number = $number LIMIT 1")
            .bind(("number", number.to_string()))
            .await?;
        let tables: Vec<DiningTable> = result.take(0)?;
        Ok(tables.into_iter().next())
    }

    /// Create a new dining table with its derived slug
    pub async fn create(&self, data: DiningTableCreate) -> RepoResult<DiningTable> {
        if self.find_by_number(&data.number).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Table with number '{}' already exists",
                data.number
            )));
        }

        let now = now_millis();
        let table = DiningTable {
            id: None,
            qr_slug: derive_slug(&data.number),
            number: data.number,
            is_active: true,
            capacity: data.capacity.unwrap_or(4).clamp(1, 20),
            location: data.location.unwrap_or_else(|| "Main Dining".to_string()),
            created_at: now,
            updated_at: now,
        };

        let created: Option<DiningTable> = self.base.db().create(TABLE).content(table).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create dining table".to_string()))
    }

    /// Update a dining table
    ///
    /// The slug is intentionally never rewritten — printed QR codes embed it.
    pub async fn update(&self, id: &str, data: DiningTableUpdate) -> RepoResult<DiningTable> {
        let thing = parse_record_id(id)?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound("Table not found".to_string()))?;

        // Check duplicate number if renumbering
        if let Some(ref new_number) = data.number
            && new_number != &existing.number
            && self.find_by_number(new_number).await?.is_some()
        {
            return Err(RepoError::Duplicate(format!(
                "Table with number '{}' already exists",
                new_number
            )));
        }

        let mut patch = serde_json::to_value(&data)
            .map_err(|e| RepoError::Database(format!("Failed to serialize update: {e}")))?;
        if let Some(capacity) = data.capacity {
            patch["capacity"] = serde_json::json!(capacity.clamp(1, 20));
        }
        patch["updated_at"] = serde_json::json!(now_millis());

        self.base
            .db()
            .query("UPDATE $thing MERGE $data")
            .bind(("thing", thing))
            .bind(("data", patch))
            .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound("Table not found".to_string()))
    }

    /// Flip the active flag, returning the updated table
    pub async fn toggle_status(&self, id: &str) -> RepoResult<DiningTable> {
        let table = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound("Table not found".to_string()))?;

        let thing = parse_record_id(id)?;
        self.base
            .db()
            .query("UPDATE $thing SET is_active = $active, updated_at = $now")
            .bind(("thing", thing))
            .bind(("active", !table.is_active))
            .bind(("now", now_millis()))
            .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound("Table not found".to_string()))
    }

    /// Hard delete a dining table
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let thing = parse_record_id(id)?;
        if self.find_by_id(id).await?.is_none() {
            return Err(RepoError::NotFound("Table not found".to_string()));
        }
        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }
}
