//! Authentication infrastructure services

pub mod google_oauth;
pub mod jwt_service;
pub mod password_hasher;
pub mod token_blacklist;
pub mod user_repository;

pub use google_oauth::{GoogleOAuthProvider, OAuthProvider, OAuthUserInfo};
pub use jwt_service::JwtService;
pub use password_hasher::PasswordHasher;
pub use token_blacklist::{InMemoryTokenBlacklist, TokenBlacklistService};
pub use user_repository::SqlxUserRepository;
