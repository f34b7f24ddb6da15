pub mod crud;
pub mod deals_repository;
pub mod games_repository;
pub mod messages_repository;
pub mod notifications_repository;
pub mod platforms_repository;
pub mod user_games_repository;
pub mod users_repository;
pub mod wishlists_repository;

pub use deals_repository::{DealFilter, DealsRepository, SourceStats};
pub use games_repository::{GameFilter, GamesRepository};
pub use messages_repository::MessagesRepository;
pub use notifications_repository::{NotificationsRepository, WishlistDealMatch};
pub use platforms_repository::{PlatformsRepository, DEFAULT_PLATFORMS};
pub use user_games_repository::{LibrarySort, LibraryStats, UserGamesRepository};
pub use users_repository::UsersRepository;
pub use wishlists_repository::WishlistsRepository;
