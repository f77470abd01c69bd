//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 认证相关接口
//! - [`categories`] - 菜单分类管理接口
//! - [`menu_items`] - 菜品管理接口
//! - [`tables`] - 桌台管理接口 (含扫码解析与二维码生成)
//! - [`orders`] - 订单接口 (下单、履约流转、统计)

pub mod auth;
pub mod categories;
pub mod health;
pub mod menu_items;
pub mod orders;
pub mod tables;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};
