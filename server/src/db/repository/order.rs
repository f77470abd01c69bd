//! Order Repository
//!
//! 订单账本: 只增不删。订单号来自存储侧原子计数器，
//! 并发下单也不会重号 (count-then-format 的老办法有竞态)。

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{Order, OrderLine, OrderStatus};
use crate::utils::time::now_millis;
use serde::Deserialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "order";

/// Per-status order count (analytics)
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: i64,
}

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Claim the next order number from the atomic counter
    ///
    /// `UPSERT ... +=` is a single store-side statement, so two concurrent
    /// placements can never observe the same value.
    pub async fn next_order_number(&self) -> RepoResult<String> {
        let mut result = self
            .base
            .db()
            .query("UPSERT counter:order_number SET value += 1 RETURN VALUE value")
            .await?;
        let value: Option<i64> = result.take(0)?;
        let value =
            value.ok_or_else(|| RepoError::Database("Order counter unavailable".to_string()))?;
        Ok(format_order_number(value))
    }

    /// Persist a new order
    pub async fn create(&self, order: Order) -> RepoResult<Order> {
        let created: Option<Order> = self.base.db().create(TABLE).content(order).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    /// Find order by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let thing = parse_record_id(id)?;
        let order: Option<Order> = self.base.db().select(thing).await?;
        Ok(order)
    }

    /// Paginated listing for staff, optionally filtered by status and table
    pub async fn list(
        &self,
        status: Option<OrderStatus>,
        table: Option<&str>,
        limit: u32,
        offset: u64,
        descending: bool,
    ) -> RepoResult<(Vec<Order>, u64)> {
        let mut conditions: Vec<&str> = Vec::new();
        if status.is_some() {
            conditions.push("status = $status");
        }
        if table.is_some() {
            conditions.push("dining_table = $table");
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };
        let direction = if descending { "DESC" } else { "ASC" };

        let list_sql = format!(
            "SELECT * FROM order{} ORDER BY created_at {} LIMIT $limit START $start",
            where_clause, direction
        );
        let count_sql = format!("SELECT count() FROM order{} GROUP ALL", where_clause);

        let mut query = self
            .base
            .db()
            .query(list_sql)
            .query(count_sql)
            .bind(("limit", limit as i64))
            .bind(("start", offset as i64));
        if let Some(status) = status {
            query = query.bind(("status", status.as_str()));
        }
        if let Some(table) = table {
            query = query.bind(("table", table.to_string()));
        }

        let mut result = query.await?;
        let orders: Vec<Order> = result.take(0)?;
        let total: Option<i64> = result.take((1, "count"))?;
        Ok((orders, total.unwrap_or(0).max(0) as u64))
    }

    /// Paginated listing of one customer's orders
    pub async fn list_for_customer(
        &self,
        customer: &str,
        status: Option<OrderStatus>,
        limit: u32,
        offset: u64,
    ) -> RepoResult<(Vec<Order>, u64)> {
        let where_clause = if status.is_some() {
            " WHERE customer = $customer AND status = $status"
        } else {
            " WHERE customer = $customer"
        };

        let list_sql = format!(
            "SELECT * FROM order{} ORDER BY created_at DESC LIMIT $limit START $start",
            where_clause
        );
        let count_sql = format!("SELECT count() FROM order{} GROUP ALL", where_clause);

        let mut query = self
            .base
            .db()
            .query(list_sql)
            .query(count_sql)
            .bind(("customer", customer.to_string()))
            .bind(("limit", limit as i64))
            .bind(("start", offset as i64));
        if let Some(status) = status {
            query = query.bind(("status", status.as_str()));
        }

        let mut result = query.await?;
        let orders: Vec<Order> = result.take(0)?;
        let total: Option<i64> = result.take((1, "count"))?;
        Ok((orders, total.unwrap_or(0).max(0) as u64))
    }

    /// Persist a status change (and optional estimated-ready timestamp)
    pub async fn update_status(
        &self,
        id: &str,
        status: OrderStatus,
        estimated_ready_time: Option<i64>,
    ) -> RepoResult<Order> {
        let thing = parse_record_id(id)?;

        match estimated_ready_time {
            Some(eta) => {
                self.base
                    .db()
                    .query(
                        "UPDATE $thing SET status = $status, \
                         estimated_ready_time = $eta, updated_at = $now",
                    )
                    .bind(("thing", thing))
                    .bind(("status", status.as_str()))
                    .bind(("eta", eta))
                    .bind(("now", now_millis()))
                    .await?;
            }
            None => {
                self.base
                    .db()
                    .query("UPDATE $thing SET status = $status, updated_at = $now")
                    .bind(("thing", thing))
                    .bind(("status", status.as_str()))
                    .bind(("now", now_millis()))
                    .await?;
            }
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound("Order not found".to_string()))
    }

    // ── Analytics queries ───────────────────────────────────────────

    /// Count all orders
    pub async fn count_all(&self) -> RepoResult<i64> {
        self.count_where("", None).await
    }

    /// Count orders created at or after the given timestamp
    pub async fn count_since(&self, since: i64) -> RepoResult<i64> {
        self.count_where(" WHERE created_at >= $since", Some(since))
            .await
    }

    /// Count open orders (placed or preparing)
    pub async fn count_pending(&self) -> RepoResult<i64> {
        self.count_where(" WHERE status IN ['placed', 'preparing']", None)
            .await
    }

    async fn count_where(&self, where_clause: &str, since: Option<i64>) -> RepoResult<i64> {
        let sql = format!("SELECT count() FROM order{} GROUP ALL", where_clause);
        let mut query = self.base.db().query(sql);
        if let Some(since) = since {
            query = query.bind(("since", since));
        }
        let mut result = query.await?;
        let count: Option<i64> = result.take((0, "count"))?;
        Ok(count.unwrap_or(0))
    }

    /// Revenue across non-canceled orders, optionally bounded below in time
    pub async fn revenue(&self, since: Option<i64>) -> RepoResult<f64> {
        let sql = match since {
            Some(_) => {
                "SELECT math::sum(total) AS revenue FROM order \
                 WHERE status != 'canceled' AND created_at >= $since GROUP ALL"
            }
            None => {
                "SELECT math::sum(total) AS revenue FROM order \
                 WHERE status != 'canceled' GROUP ALL"
            }
        };
        let mut query = self.base.db().query(sql);
        if let Some(since) = since {
            query = query.bind(("since", since));
        }
        let mut result = query.await?;
        let revenue: Option<f64> = result.take((0, "revenue"))?;
        Ok(revenue.unwrap_or(0.0))
    }

    /// Order counts grouped by status
    pub async fn status_distribution(&self) -> RepoResult<Vec<StatusCount>> {
        let mut result = self
            .base
            .db()
            .query("SELECT status, count() AS count FROM order GROUP BY status")
            .await?;
        let counts: Vec<StatusCount> = result.take(0)?;
        Ok(counts)
    }

    /// All order lines across the ledger (top-item ranking input)
    ///
    /// Line items are embedded documents; aggregation across them happens
    /// in the engine. The ledger rows are trimmed to the items field here.
    pub async fn all_order_lines(&self) -> RepoResult<Vec<OrderLine>> {
        #[derive(Deserialize)]
        struct ItemsOnly {
            #[serde(default)]
            items: Vec<OrderLine>,
        }

        let mut result = self.base.db().query("SELECT items FROM order").await?;
        let rows: Vec<ItemsOnly> = result.take(0)?;
        Ok(rows.into_iter().flat_map(|r| r.items).collect())
    }
}

/// Format helper shared with tests
pub fn format_order_number(seq: i64) -> String {
    format!("ORD-{:06}", seq)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_number_format() {
        assert_eq!(format_order_number(1), "ORD-000001");
        assert_eq!(format_order_number(42), "ORD-000042");
        assert_eq!(format_order_number(1_000_000), "ORD-1000000");
    }
}
