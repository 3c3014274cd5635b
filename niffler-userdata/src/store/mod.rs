//! Identity store: user records plus the friendship edge table.

mod memory;
mod sled_store;

pub use self::memory::MemoryStore;
pub use self::sled_store::SledStore;

use niffler_common::non_api_structs::{FriendshipEdge, FriendshipStatus, UserEntity, UserId};
use niffler_common::{CurrencyValues, UsersQuery};

use crate::error::Result;

/// Persistence collaborator of [`crate::service::UserDataService`].
///
/// Edges are directed and keyed by `(from, to)`; at most one status exists per
/// ordered pair.
pub trait IdentityStore: Send + Sync {
    /// Creates a user with a freshly assigned id. Fails with `Conflict` if the
    /// username is taken.
    fn create(&self, username: &str, currency: CurrencyValues) -> Result<UserEntity>;

    fn find_by_username(&self, username: &str) -> Result<Option<UserEntity>>;

    fn find_by_id(&self, id: UserId) -> Result<Option<UserEntity>>;

    /// Every user except `username`. `query` is interpreted by the store only.
    fn find_all_except(&self, username: &str, query: Option<&UsersQuery>) -> Result<Vec<UserEntity>>;

    /// Replaces the mutable state of an existing user and returns what was stored.
    fn save(&self, user: UserEntity) -> Result<UserEntity>;

    fn friendship(&self, from: UserId, to: UserId) -> Result<Option<FriendshipStatus>>;

    fn set_friendship(&self, from: UserId, to: UserId, status: FriendshipStatus) -> Result<()>;

    fn remove_friendship(&self, from: UserId, to: UserId) -> Result<()>;

    fn friendships_from(&self, from: UserId) -> Result<Vec<FriendshipEdge>>;

    fn friendships_to(&self, to: UserId) -> Result<Vec<FriendshipEdge>>;
}

/// Applies the search and paging hint the way both stores agree on:
/// case-insensitive substring match on username, then `page * size` offset.
pub(crate) fn apply_query(users: Vec<UserEntity>, query: Option<&UsersQuery>) -> Vec<UserEntity> {
    let Some(query) = query else {
        return users;
    };
    let needle = query.search.as_deref().map(str::to_lowercase);
    let matching = users.into_iter().filter(|user| match &needle {
        Some(needle) => user.username.to_lowercase().contains(needle.as_str()),
        None => true,
    });
    match query.size {
        Some(size) => matching
            .skip(query.page.unwrap_or(0).saturating_mul(size))
            .take(size)
            .collect(),
        None => matching.collect(),
    }
}
