//! Menu Category Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{MenuCategory, MenuCategoryCreate, MenuCategoryUpdate};
use crate::utils::time::now_millis;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "menu_category";

#[derive(Clone)]
pub struct CategoryRepository {
    base: BaseRepository,
}

impl CategoryRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all active categories ordered by display_order
    pub async fn find_all_active(&self) -> RepoResult<Vec<MenuCategory>> {
        let categories: Vec<MenuCategory> = self
            .base
            .db()
            .query("SELECT * FROM menu_category WHERE active = true ORDER BY display_order")
            .await?
            .take(0)?;
        Ok(categories)
    }

    /// Find category by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<MenuCategory>> {
        let thing = parse_record_id(id)?;
        let category: Option<MenuCategory> = self.base.db().select(thing).await?;
        Ok(category)
    }

    /// Find category by name
    pub async fn find_by_name(&self, name: &str) -> RepoResult<Option<MenuCategory>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM menu_category WHERE name = $name LIMIT 1")
            .bind(("name", name.to_string()))
            .await?;
        let categories: Vec<MenuCategory> = result.take(0)?;
        Ok(categories.into_iter().next())
    }

    /// Create a new category
    pub async fn create(&self, data: MenuCategoryCreate) -> RepoResult<MenuCategory> {
        // Check duplicate name
        if self.find_by_name(&data.name).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Category '{}' already exists",
                data.name
            )));
        }

        let now = now_millis();
        let category = MenuCategory {
            id: None,
            name: data.name,
            display_order: data.display_order,
            active: true,
            description: data.description,
            image_url: data.image_url,
            created_at: now,
            updated_at: now,
        };

        let created: Option<MenuCategory> =
            self.base.db().create(TABLE).content(category).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create category".to_string()))
    }

    /// Update a category
    pub async fn update(&self, id: &str, data: MenuCategoryUpdate) -> RepoResult<MenuCategory> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound("Category not found".to_string()))?;

        // Check duplicate name if changing
        if let Some(ref new_name) = data.name
            && new_name != &existing.name
            && self.find_by_name(new_name).await?.is_some()
        {
            return Err(RepoError::Duplicate(format!(
                "Category '{}' already exists",
                new_name
            )));
        }

        let thing = parse_record_id(id)?;
        let mut patch = serde_json::to_value(&data)
            .map_err(|e| RepoError::Database(format!("Failed to serialize update: {e}")))?;
        patch["updated_at"] = serde_json::json!(now_millis());

        self.base
            .db()
            .query("UPDATE $thing MERGE $data")
            .bind(("thing", thing))
            .bind(("data", patch))
            .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound("Category not found".to_string()))
    }

    /// Hard delete a category
    ///
    /// Rejected while any menu item still references the category.
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let thing = parse_record_id(id)?;
        if self.find_by_id(id).await?.is_none() {
            return Err(RepoError::NotFound("Category not found".to_string()));
        }

        let mut result = self
            .base
            .db()
            .query("SELECT count() FROM menu_item WHERE category = $cat GROUP ALL")
            .bind(("cat", thing.to_string()))
            .await?;
        let count: Option<i64> = result.take((0, "count"))?;

        if count.unwrap_or(0) > 0 {
            return Err(RepoError::Validation(
                "Cannot delete category with existing items".to_string(),
            ));
        }

        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;

        Ok(true)
    }

    /// Count active categories
    pub async fn count_active(&self) -> RepoResult<i64> {
        let mut result = self
            .base
            .db()
            .query("SELECT count() FROM menu_category WHERE active = true GROUP ALL")
            .await?;
        let count: Option<i64> = result.take((0, "count"))?;
        Ok(count.unwrap_or(0))
    }
}
