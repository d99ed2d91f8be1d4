//! Repositories for database access.

pub mod hashtag;
pub mod message;
pub mod trend;
pub mod user;

pub use hashtag::{HashtagRepository, normalize_texts};
pub use message::MessageRepository;
pub use trend::{TrendRepository, TrendWindow};
pub use user::UserRepository;
