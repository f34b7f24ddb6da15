//! 预导入模块
//!
//! 提供常用类型的快捷导入。

// === SeaORM 实体 ===
pub use super::deals::Entity as Deals;
pub use super::games::Entity as Games;
pub use super::messages::Entity as Messages;
pub use super::platforms::Entity as Platforms;
pub use super::user_games::Entity as UserGames;
pub use super::users::Entity as Users;
pub use super::wishlist_deal_notifications::Entity as WishlistDealNotifications;
pub use super::wishlists::Entity as Wishlists;

// === JSON 数组列 ===
pub use super::json_list::{IdList, StringList};
