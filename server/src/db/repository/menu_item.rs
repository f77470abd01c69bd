//! Menu Item Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{MenuItem, MenuItemCreate, MenuItemUpdate};
use crate::utils::time::now_millis;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "menu_item";

/// Sort options for item listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemSort {
    #[default]
    Name,
    PriceAsc,
    PriceDesc,
    Popularity,
}

impl ItemSort {
    /// Parse the query-string form ("name" | "price-asc" | "price-desc" | "popularity")
    pub fn parse(s: &str) -> Self {
        match s {
            "price-asc" => ItemSort::PriceAsc,
            "price-desc" => ItemSort::PriceDesc,
            "popularity" => ItemSort::Popularity,
            _ => ItemSort::Name,
        }
    }

    fn order_clause(&self) -> &'static str {
        match self {
            ItemSort::Name => " ORDER BY name ASC",
            ItemSort::PriceAsc => " ORDER BY price ASC",
            ItemSort::PriceDesc => " ORDER BY price DESC",
            ItemSort::Popularity => " ORDER BY popularity_score DESC",
        }
    }
}

/// Listing filter for menu items
#[derive(Debug, Clone, Default)]
pub struct MenuItemFilter {
    /// Case-insensitive match against name, description and tags
    pub search: Option<String>,
    /// Category id ("menu_category:xxx")
    pub category: Option<String>,
    /// Any-match tag filter (already lowercased)
    pub tags: Vec<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// When true, only available items are returned
    pub available_only: bool,
    pub sort: ItemSort,
}

#[derive(Clone)]
pub struct MenuItemRepository {
    base: BaseRepository,
}

impl MenuItemRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find item by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<MenuItem>> {
        let thing = parse_record_id(id)?;
        let item: Option<MenuItem> = self.base.db().select(thing).await?;
        Ok(item)
    }

    /// Filtered, sorted, paginated listing with total count
    pub async fn list(
        &self,
        filter: &MenuItemFilter,
        limit: u32,
        offset: u64,
    ) -> RepoResult<(Vec<MenuItem>, u64)> {
        let mut conditions: Vec<&str> = Vec::new();

        if filter.available_only {
            conditions.push("availability = true");
        }
        if filter.category.is_some() {
            conditions.push("category = $category");
        }
        if filter.min_price.is_some() {
            conditions.push("price >= $min_price");
        }
        if filter.max_price.is_some() {
            conditions.push("price <= $max_price");
        }
        if !filter.tags.is_empty() {
            conditions.push("tags CONTAINSANY $tags");
        }
        if filter.search.is_some() {
            conditions.push(
                "(string::lowercase(name) CONTAINS $search \
                 OR string::lowercase(description) CONTAINS $search \
                 OR tags CONTAINSANY [$search])",
            );
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let list_sql = format!(
            "SELECT * FROM menu_item{}{} LIMIT $limit START $start",
            where_clause,
            filter.sort.order_clause()
        );
        let count_sql = format!("SELECT count() FROM menu_item{} GROUP ALL", where_clause);

        let mut query = self
            .base
            .db()
            .query(list_sql)
            .query(count_sql)
            .bind(("limit", limit as i64))
            .bind(("start", offset as i64));

        if let Some(category) = &filter.category {
            query = query.bind(("category", category.clone()));
        }
        if let Some(min_price) = filter.min_price {
            query = query.bind(("min_price", min_price));
        }
        if let Some(max_price) = filter.max_price {
            query = query.bind(("max_price", max_price));
        }
        if !filter.tags.is_empty() {
            query = query.bind(("tags", filter.tags.clone()));
        }
        if let Some(search) = &filter.search {
            query = query.bind(("search", search.to_lowercase()));
        }

        let mut result = query.await?;
        let items: Vec<MenuItem> = result.take(0)?;
        let total: Option<i64> = result.take((1, "count"))?;

        Ok((items, total.unwrap_or(0).max(0) as u64))
    }

    /// Create a new menu item
    ///
    /// The referenced category must exist.
    pub async fn create(&self, data: MenuItemCreate) -> RepoResult<MenuItem> {
        let category_thing = parse_record_id(&data.category)?;
        let category: Option<crate::db::models::MenuCategory> =
            self.base.db().select(category_thing.clone()).await?;
        if category.is_none() {
            return Err(RepoError::NotFound("Category not found".to_string()));
        }

        let now = now_millis();
        let item = MenuItem {
            id: None,
            name: data.name,
            description: data.description,
            price: data.price,
            category: category_thing,
            image_url: data.image_url,
            availability: data.availability.unwrap_or(true),
            tags: lowercase_all(data.tags),
            allergens: lowercase_all(data.allergens),
            preparation_time: data.preparation_time.unwrap_or(15).max(1),
            calories: data.calories,
            is_vegetarian: data.is_vegetarian.unwrap_or(false),
            is_vegan: data.is_vegan.unwrap_or(false),
            is_gluten_free: data.is_gluten_free.unwrap_or(false),
            popularity_score: 0,
            created_at: now,
            updated_at: now,
        };

        let created: Option<MenuItem> = self.base.db().create(TABLE).content(item).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create menu item".to_string()))
    }

    /// Update a menu item
    pub async fn update(&self, id: &str, data: MenuItemUpdate) -> RepoResult<MenuItem> {
        let thing = parse_record_id(id)?;
        if self.find_by_id(id).await?.is_none() {
            return Err(RepoError::NotFound("Menu item not found".to_string()));
        }

        // If re-categorizing, the new category must exist
        if let Some(ref category) = data.category {
            let category_thing = parse_record_id(category)?;
            let found: Option<crate::db::models::MenuCategory> =
                self.base.db().select(category_thing).await?;
            if found.is_none() {
                return Err(RepoError::NotFound("Category not found".to_string()));
            }
        }

        let mut patch = serde_json::to_value(&data)
            .map_err(|e| RepoError::Database(format!("Failed to serialize update: {e}")))?;
        if let Some(tags) = data.tags {
            patch["tags"] = serde_json::json!(lowercase_all(tags));
        }
        if let Some(allergens) = data.allergens {
            patch["allergens"] = serde_json::json!(lowercase_all(allergens));
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
            .ok_or_else(|| RepoError::NotFound("Menu item not found".to_string()))
    }

    /// Hard delete a menu item
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let thing = parse_record_id(id)?;
        if self.find_by_id(id).await?.is_none() {
            return Err(RepoError::NotFound("Menu item not found".to_string()));
        }
        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }

    /// Flip the availability flag, returning the updated item
    pub async fn toggle_availability(&self, id: &str) -> RepoResult<MenuItem> {
        let item = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound("Menu item not found".to_string()))?;

        let thing = parse_record_id(id)?;
        self.base
            .db()
            .query("UPDATE $thing SET availability = $availability, updated_at = $now")
            .bind(("thing", thing))
            .bind(("availability", !item.availability))
            .bind(("now", now_millis()))
            .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound("Menu item not found".to_string()))
    }

    /// Atomic popularity bump (store-side `+=`, no read-modify-write)
    pub async fn increment_popularity(&self, id: &str, quantity: u32) -> RepoResult<()> {
        let thing = parse_record_id(id)?;
        self.base
            .db()
            .query("UPDATE $thing SET popularity_score += $qty, updated_at = $now")
            .bind(("thing", thing))
            .bind(("qty", quantity as i64))
            .bind(("now", now_millis()))
            .await?;
        Ok(())
    }

    /// Count all items
    pub async fn count_all(&self) -> RepoResult<i64> {
        let mut result = self
            .base
            .db()
            .query("SELECT count() FROM menu_item GROUP ALL")
            .await?;
        let count: Option<i64> = result.take((0, "count"))?;
        Ok(count.unwrap_or(0))
    }

    /// Count available items
    pub async fn count_available(&self) -> RepoResult<i64> {
        let mut result = self
            .base
            .db()
            .query("SELECT count() FROM menu_item WHERE availability = true GROUP ALL")
            .await?;
        let count: Option<i64> = result.take((0, "count"))?;
        Ok(count.unwrap_or(0))
    }

    /// Top available items by popularity score
    pub async fn top_popular(&self, limit: u32) -> RepoResult<Vec<MenuItem>> {
        let items: Vec<MenuItem> = self
            .base
            .db()
            .query(
                "SELECT * FROM menu_item WHERE availability = true \
                 ORDER BY popularity_score DESC LIMIT $limit",
            )
            .bind(("limit", limit as i64))
            .await?
            .take(0)?;
        Ok(items)
    }
}

fn lowercase_all(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect()
}
