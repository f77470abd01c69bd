//! Ordering Engine
//!
//! 点单核心: 校验购物车、快照价格、算税、领号、落库、
//! 以及状态机驱动的履约流转。
//!
//! # 约束
//!
//! - 行项目价格在下单时快照，菜单改价不影响历史订单
//! - 订单号由存储侧原子计数器保证唯一、单调
//! - 人气计数在订单落库成功之后才累加 (失败的下单不产生副作用)
//! - 状态转换只允许 [`OrderStatus::allowed_next`] 中的组合

pub mod pricing;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::models::{Order, OrderCreate, OrderLine, OrderStatus};
use crate::db::repository::order::StatusCount;
use crate::db::repository::{DiningTableRepository, MenuItemRepository, OrderRepository};
use crate::utils::time::{now_millis, today_start_millis};
use crate::utils::validation::{
    MAX_INSTRUCTIONS_LEN, MAX_LINE_NOTE_LEN, validate_optional_text,
};
use crate::utils::{AppError, AppResult};

/// Read-side order analytics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderAnalytics {
    pub total_orders: i64,
    pub today_orders: i64,
    pub pending_orders: i64,
    pub revenue_today: f64,
    pub revenue_total: f64,
    pub status_distribution: Vec<StatusCount>,
    pub top_items: Vec<TopItem>,
}

/// Top-seller ranking entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopItem {
    pub name: String,
    pub total_quantity: i64,
}

/// How many items the ranking reports
const TOP_ITEMS_LIMIT: usize = 5;

/// The ordering engine
///
/// 无状态: 每个请求构造一份，仓库只是数据库句柄的浅拷贝。
/// 配置 (税率、单量上限) 在启动时注入，核心逻辑不读全局状态。
pub struct OrderingEngine {
    orders: OrderRepository,
    items: MenuItemRepository,
    tables: DiningTableRepository,
    tax_rate: Decimal,
    max_order_items: usize,
}

impl OrderingEngine {
    pub fn new(db: Surreal<Db>, tax_rate: Decimal, max_order_items: usize) -> Self {
        Self {
            orders: OrderRepository::new(db.clone()),
            items: MenuItemRepository::new(db.clone()),
            tables: DiningTableRepository::new(db),
            tax_rate,
            max_order_items,
        }
    }

    /// Validate a cart submission, price it and persist the order
    ///
    /// No order is persisted on any validation failure; the popularity
    /// side effect is applied only after the insert succeeds.
    pub async fn place_order(
        &self,
        request: OrderCreate,
        customer: Option<String>,
    ) -> AppResult<Order> {
        // 1. Resolve the table; missing and inactive are equivalent
        let table = self
            .tables
            .find_by_id(&request.dining_table)
            .await
            .map_err(AppError::from)?;
        let table = match table {
            Some(t) if t.is_active => t,
            _ => return Err(AppError::validation("Invalid or inactive table")),
        };

        // 2. Cart-level validation
        if request.items.is_empty() {
            return Err(AppError::validation("Order must contain at least one item"));
        }
        if request.items.len() > self.max_order_items {
            return Err(AppError::validation(format!(
                "Order cannot contain more than {} items",
                self.max_order_items
            )));
        }
        for line in &request.items {
            if line.quantity < 1 {
                return Err(AppError::validation("Quantity must be at least 1"));
            }
            validate_optional_text(&line.note, "note", MAX_LINE_NOTE_LEN)?;
        }
        validate_optional_text(
            &request.special_instructions,
            "special_instructions",
            MAX_INSTRUCTIONS_LEN,
        )?;

        // 3. Resolve all referenced items concurrently and join
        let lookups = request
            .items
            .iter()
            .map(|line| self.items.find_by_id(&line.menu_item));
        let resolved = futures::future::try_join_all(lookups)
            .await
            .map_err(AppError::from)?;

        // 4. Capture prices and accumulate the subtotal
        let mut subtotal = Decimal::ZERO;
        let mut lines = Vec::with_capacity(request.items.len());
        for (requested, found) in request.items.iter().zip(resolved) {
            let item = found.ok_or_else(|| {
                AppError::not_found(format!(
                    "Menu item with ID {} not found",
                    requested.menu_item
                ))
            })?;
            if !item.availability {
                return Err(AppError::Unavailable(item.name));
            }

            subtotal += pricing::line_total(item.price, requested.quantity);
            lines.push(OrderLine {
                menu_item: item.id.clone().ok_or_else(|| {
                    AppError::internal("Menu item record is missing its id")
                })?,
                name: item.name,
                quantity: requested.quantity,
                note: requested.note.clone().filter(|n| !n.trim().is_empty()),
                price: item.price,
            });
        }

        // 5. Pricing
        let subtotal = pricing::round_money(subtotal);
        let tax = pricing::tax_for(subtotal, self.tax_rate);
        let total = pricing::total_for(subtotal, tax);

        // 6. Identity + persist
        let order_number = self.orders.next_order_number().await.map_err(AppError::from)?;
        let now = now_millis();
        let order = Order {
            id: None,
            order_number,
            dining_table: table
                .id
                .clone()
                .ok_or_else(|| AppError::internal("Table record is missing its id"))?,
            customer: match customer {
                Some(id) => Some(
                    id.parse()
                        .map_err(|_| AppError::validation(format!("Invalid customer ID: {id}")))?,
                ),
                None => None,
            },
            items: lines,
            status: OrderStatus::Placed,
            subtotal,
            tax,
            total,
            payment_status: Default::default(),
            payment_method: request.payment_method.unwrap_or_default(),
            special_instructions: request
                .special_instructions
                .filter(|s| !s.trim().is_empty()),
            estimated_ready_time: None,
            created_at: now,
            updated_at: now,
        };

        let order = self.orders.create(order).await.map_err(AppError::from)?;

        // 7. Side effects only after the commit succeeded. The order stands
        //    even if a counter bump fails; that only costs ranking accuracy.
        for line in &order.items {
            if let Err(e) = self
                .items
                .increment_popularity(&line.menu_item.to_string(), line.quantity)
                .await
            {
                tracing::warn!(
                    item = %line.menu_item,
                    error = %e,
                    "Failed to bump popularity counter"
                );
            }
        }

        tracing::info!(
            order_number = %order.order_number,
            table = %table.number,
            items = order.items.len(),
            total = %order.total,
            "Order placed"
        );

        Ok(order)
    }

    /// Drive the fulfillment state machine
    pub async fn transition(
        &self,
        order_id: &str,
        new_status: OrderStatus,
        estimated_ready_time: Option<i64>,
    ) -> AppResult<Order> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::not_found("Order not found"))?;

        if !order.status.can_transition_to(new_status) {
            return Err(AppError::invalid_transition(
                order.status.to_string(),
                new_status.to_string(),
            ));
        }

        let updated = self
            .orders
            .update_status(order_id, new_status, estimated_ready_time)
            .await
            .map_err(AppError::from)?;

        tracing::info!(
            order_number = %updated.order_number,
            from = %order.status,
            to = %new_status,
            "Order status updated"
        );

        Ok(updated)
    }

    /// Customer-initiated cancellation
    ///
    /// Only the placing customer may cancel, and only while the kitchen
    /// has not finished the order (placed / preparing).
    pub async fn cancel_for_customer(&self, order_id: &str, customer: &str) -> AppResult<Order> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::not_found("Order not found"))?;

        // 非本人订单与不存在一视同仁，避免泄漏他人订单
        let owned = order
            .customer
            .as_ref()
            .is_some_and(|c| c.to_string() == customer);
        if !owned {
            return Err(AppError::not_found("Order not found"));
        }

        if !order.status.is_cancelable() {
            return Err(AppError::validation(
                "Order cannot be canceled at this stage",
            ));
        }

        self.orders
            .update_status(order_id, OrderStatus::Canceled, None)
            .await
            .map_err(AppError::from)
    }

    /// Read-side aggregates over the order ledger
    pub async fn analytics(&self) -> AppResult<OrderAnalytics> {
        let today = today_start_millis();

        let (total_orders, today_orders, pending_orders, revenue_today, revenue_total, dist, lines) =
            tokio::try_join!(
                self.orders.count_all(),
                self.orders.count_since(today),
                self.orders.count_pending(),
                self.orders.revenue(Some(today)),
                self.orders.revenue(None),
                self.orders.status_distribution(),
                self.orders.all_order_lines(),
            )
            .map_err(AppError::from)?;

        Ok(OrderAnalytics {
            total_orders,
            today_orders,
            pending_orders,
            revenue_today,
            revenue_total,
            status_distribution: dist,
            top_items: rank_top_items(&lines, TOP_ITEMS_LIMIT),
        })
    }
}

/// Group order lines by menu item and rank by total ordered quantity
fn rank_top_items(lines: &[OrderLine], limit: usize) -> Vec<TopItem> {
    let mut totals: HashMap<String, (String, i64)> = HashMap::new();
    for line in lines {
        let entry = totals
            .entry(line.menu_item.to_string())
            .or_insert_with(|| (line.name.clone(), 0));
        entry.1 += line.quantity as i64;
    }

    let mut ranked: Vec<TopItem> = totals
        .into_values()
        .map(|(name, total_quantity)| TopItem {
            name,
            total_quantity,
        })
        .collect();
    // 数量相同按名称排序，保证输出稳定
    ranked.sort_by(|a, b| {
        b.total_quantity
            .cmp(&a.total_quantity)
            .then_with(|| a.name.cmp(&b.name))
    });
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use surrealdb::RecordId;

    fn line(id: &str, name: &str, quantity: u32) -> OrderLine {
        OrderLine {
            menu_item: RecordId::from_table_key("menu_item", id),
            name: name.to_string(),
            quantity,
            note: None,
            price: Decimal::ZERO,
        }
    }

    #[test]
    fn test_rank_top_items_groups_and_sorts() {
        let lines = vec![
            line("burger", "Burger", 2),
            line("cola", "Cola", 1),
            line("burger", "Burger", 3),
            line("fries", "Fries", 4),
        ];

        let ranked = rank_top_items(&lines, 5);
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].name, "Burger");
        assert_eq!(ranked[0].total_quantity, 5);
        assert_eq!(ranked[1].name, "Fries");
        assert_eq!(ranked[2].name, "Cola");
    }

    #[test]
    fn test_rank_top_items_limit_and_ties() {
        let lines = vec![line("a", "Apple", 1), line("b", "Banana", 1)];
        let ranked = rank_top_items(&lines, 1);
        assert_eq!(ranked.len(), 1);
        // Tie broken by name for stable output
        assert_eq!(ranked[0].name, "Apple");
    }
}
