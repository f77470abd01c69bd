//! Database Models
//!
//! SurrealDB 实体模型与 Create/Update 载荷。

pub mod serde_helpers;

pub mod category;
pub mod dining_table;
pub mod menu_item;
pub mod order;
pub mod user;

pub use category::{MenuCategory, MenuCategoryCreate, MenuCategoryUpdate};
pub use dining_table::{DiningTable, DiningTableCreate, DiningTableUpdate, derive_slug};
pub use menu_item::{MenuItem, MenuItemCreate, MenuItemUpdate};
pub use order::{
    Order, OrderCreate, OrderLine, OrderLineCreate, OrderStatus, PaymentMethod, PaymentStatus,
};
pub use user::{User, UserCreate};
