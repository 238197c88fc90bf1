//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod menu_item;
pub mod order;
pub mod user;

// Re-exports for public API convenience
#[allow(unused_imports)]
pub use menu_item::{Entity as MenuItemEntity, Model as MenuItemModel};
#[allow(unused_imports)]
pub use order::{Entity as OrderEntity, Model as OrderModel};
#[allow(unused_imports)]
pub use user::{ActiveModel as UserActiveModel, Entity as UserEntity, Model as UserModel};
