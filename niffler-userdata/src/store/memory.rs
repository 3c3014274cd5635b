use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use niffler_common::non_api_structs::{FriendshipEdge, FriendshipStatus, UserEntity, UserId};
use niffler_common::{CurrencyValues, UsersQuery};

use crate::error::{Error, Result};
use crate::store::{apply_query, IdentityStore};

#[derive(Default)]
struct Inner {
    // Insertion order is the listing order.
    users: Vec<UserEntity>,
    friendships: BTreeMap<(UserId, UserId), FriendshipStatus>,
}

/// In-process identity store. Used by tests and by `--in-memory` runs.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store already holding `users`, ids included.
    pub fn with_users(users: impl IntoIterator<Item = UserEntity>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                users: users.into_iter().collect(),
                friendships: BTreeMap::new(),
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| Error::storage("memory store lock poisoned"))
    }
}

impl IdentityStore for MemoryStore {
    fn create(&self, username: &str, currency: CurrencyValues) -> Result<UserEntity> {
        let mut inner = self.lock()?;
        if inner.users.iter().any(|u| u.username == username) {
            return Err(Error::Conflict(format!("Username already taken: {}", username)));
        }
        let user = UserEntity::new(UserId::new(), username, currency);
        inner.users.push(user.clone());
        Ok(user)
    }

    fn find_by_username(&self, username: &str) -> Result<Option<UserEntity>> {
        Ok(self.lock()?.users.iter().find(|u| u.username == username).cloned())
    }

    fn find_by_id(&self, id: UserId) -> Result<Option<UserEntity>> {
        Ok(self.lock()?.users.iter().find(|u| u.id == id).cloned())
    }

    fn find_all_except(&self, username: &str, query: Option<&UsersQuery>) -> Result<Vec<UserEntity>> {
        let others = self
            .lock()?
            .users
            .iter()
            .filter(|u| u.username != username)
            .cloned()
            .collect();
        Ok(apply_query(others, query))
    }

    fn save(&self, user: UserEntity) -> Result<UserEntity> {
        let mut inner = self.lock()?;
        let stored = inner
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| Error::user_not_found(&user.username))?;
        *stored = UserEntity {
            username: stored.username.clone(),
            ..user
        };
        Ok(stored.clone())
    }

    fn friendship(&self, from: UserId, to: UserId) -> Result<Option<FriendshipStatus>> {
        Ok(self.lock()?.friendships.get(&(from, to)).copied())
    }

    fn set_friendship(&self, from: UserId, to: UserId, status: FriendshipStatus) -> Result<()> {
        self.lock()?.friendships.insert((from, to), status);
        Ok(())
    }

    fn remove_friendship(&self, from: UserId, to: UserId) -> Result<()> {
        self.lock()?.friendships.remove(&(from, to));
        Ok(())
    }

    fn friendships_from(&self, from: UserId) -> Result<Vec<FriendshipEdge>> {
        Ok(self
            .lock()?
            .friendships
            .iter()
            .filter(|((f, _), _)| *f == from)
            .map(|(&(from, to), &status)| FriendshipEdge { from, to, status })
            .collect())
    }

    fn friendships_to(&self, to: UserId) -> Result<Vec<FriendshipEdge>> {
        Ok(self
            .lock()?
            .friendships
            .iter()
            .filter(|((_, t), _)| *t == to)
            .map(|(&(from, to), &status)| FriendshipEdge { from, to, status })
            .collect())
    }
}
