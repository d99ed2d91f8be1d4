//! Database entities.

pub mod hashtag;
pub mod message;
pub mod message_hashtag;
pub mod trend_bucket;
pub mod user;

pub use hashtag::Entity as Hashtag;
pub use message::Entity as Message;
pub use message_hashtag::Entity as MessageHashtag;
pub use trend_bucket::Entity as TrendBucket;
pub use user::Entity as User;
