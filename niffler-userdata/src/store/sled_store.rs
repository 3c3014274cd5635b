use std::path::Path;

use niffler_common::non_api_structs::{FriendshipEdge, FriendshipStatus, UserEntity, UserId};
use niffler_common::{CurrencyValues, UsersQuery};
use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::{Db, IVec, Transactional, Tree};
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::store::{apply_query, IdentityStore};

/// Identity store persisted in sled.
///
/// Trees:
/// - `users`: username -> JSON [`UserEntity`]
/// - `user_ids`: id bytes -> username
/// - `friendships`: from ++ to -> JSON [`FriendshipStatus`]
/// - `invitations`: to ++ from -> same value, the reverse index of `friendships`
#[derive(Clone)]
pub struct SledStore {
    db: Db,
    users: Tree,
    user_ids: Tree,
    friendships: Tree,
    invitations: Tree,
}

impl SledStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        debug!("opening sled store at {}", path.as_ref().display());
        Self::from_db(sled::open(path)?)
    }

    pub fn temporary() -> Result<Self> {
        Self::from_db(sled::Config::new().temporary(true).open()?)
    }

    fn from_db(db: Db) -> Result<Self> {
        Ok(Self {
            users: db.open_tree("users")?,
            user_ids: db.open_tree("user_ids")?,
            friendships: db.open_tree("friendships")?,
            invitations: db.open_tree("invitations")?,
            db,
        })
    }

    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }

    fn username_of(&self, id: UserId) -> Result<Option<String>> {
        Ok(self
            .user_ids
            .get(id.0.as_bytes())?
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }

    fn write_edge(&self, from: UserId, to: UserId, status: Option<FriendshipStatus>) -> Result<()> {
        let forward = edge_key(from, to);
        let reverse = edge_key(to, from);
        let value = status.map(|s| serde_json::to_vec(&s)).transpose()?;
        (&self.friendships, &self.invitations)
            .transaction(|(friendships, invitations)| {
                match &value {
                    Some(value) => {
                        friendships.insert(&forward[..], value.as_slice())?;
                        invitations.insert(&reverse[..], value.as_slice())?;
                    }
                    None => {
                        friendships.remove(&forward[..])?;
                        invitations.remove(&reverse[..])?;
                    }
                }
                Ok::<_, ConflictableTransactionError<()>>(())
            })
            .map_err(|e| Error::storage(format!("friendship write failed: {:?}", e)))
    }

    fn scan_edges(tree: &Tree, owner: UserId, owner_is_source: bool) -> Result<Vec<FriendshipEdge>> {
        tree.scan_prefix(owner.0.as_bytes())
            .map(|entry| -> Result<FriendshipEdge> {
                let (key, value) = entry?;
                let other = other_end(&key)?;
                let status = serde_json::from_slice(&value)?;
                Ok(if owner_is_source {
                    FriendshipEdge { from: owner, to: other, status }
                } else {
                    FriendshipEdge { from: other, to: owner, status }
                })
            })
            .collect()
    }
}

fn edge_key(first: UserId, second: UserId) -> [u8; 32] {
    let mut key = [0u8; 32];
    key[..16].copy_from_slice(first.0.as_bytes());
    key[16..].copy_from_slice(second.0.as_bytes());
    key
}

fn other_end(key: &IVec) -> Result<UserId> {
    if key.len() != 32 {
        return Err(Error::storage(format!("malformed friendship key of {} bytes", key.len())));
    }
    Uuid::from_slice(&key[16..])
        .map(UserId)
        .map_err(|e| Error::storage(e.to_string()))
}

fn trimmed(field: Option<String>) -> Option<String> {
    field.map(|value| value.trim().to_string())
}

impl IdentityStore for SledStore {
    fn create(&self, username: &str, currency: CurrencyValues) -> Result<UserEntity> {
        let user = UserEntity::new(UserId::new(), username, currency);
        let record = serde_json::to_vec(&user)?;
        let written = (&self.users, &self.user_ids).transaction(|(users, user_ids)| {
            if users.get(username.as_bytes())?.is_some() {
                return Err(ConflictableTransactionError::Abort(()));
            }
            users.insert(username.as_bytes(), record.as_slice())?;
            user_ids.insert(&user.id.0.as_bytes()[..], username.as_bytes())?;
            Ok(())
        });
        match written {
            Ok(()) => Ok(user),
            Err(TransactionError::Abort(())) => {
                Err(Error::Conflict(format!("Username already taken: {}", username)))
            }
            Err(TransactionError::Storage(e)) => Err(e.into()),
        }
    }

    fn find_by_username(&self, username: &str) -> Result<Option<UserEntity>> {
        Ok(self
            .users
            .get(username)?
            .map(|bytes| serde_json::from_slice(&bytes))
            .transpose()?)
    }

    fn find_by_id(&self, id: UserId) -> Result<Option<UserEntity>> {
        match self.username_of(id)? {
            Some(username) => self.find_by_username(&username),
            None => Ok(None),
        }
    }

    fn find_all_except(&self, username: &str, query: Option<&UsersQuery>) -> Result<Vec<UserEntity>> {
        let mut others = Vec::new();
        for entry in self.users.iter() {
            let (key, value) = entry?;
            if &key[..] == username.as_bytes() {
                continue;
            }
            others.push(serde_json::from_slice(&value)?);
        }
        Ok(apply_query(others, query))
    }

    fn save(&self, user: UserEntity) -> Result<UserEntity> {
        let username = self
            .username_of(user.id)?
            .ok_or_else(|| Error::user_not_found(&user.username))?;
        let stored = UserEntity {
            username,
            firstname: trimmed(user.firstname),
            surname: trimmed(user.surname),
            ..user
        };
        self.users
            .insert(stored.username.as_bytes(), serde_json::to_vec(&stored)?)?;
        Ok(stored)
    }

    fn friendship(&self, from: UserId, to: UserId) -> Result<Option<FriendshipStatus>> {
        Ok(self
            .friendships
            .get(edge_key(from, to))?
            .map(|bytes| serde_json::from_slice(&bytes))
            .transpose()?)
    }

    fn set_friendship(&self, from: UserId, to: UserId, status: FriendshipStatus) -> Result<()> {
        self.write_edge(from, to, Some(status))
    }

    fn remove_friendship(&self, from: UserId, to: UserId) -> Result<()> {
        self.write_edge(from, to, None)
    }

    fn friendships_from(&self, from: UserId) -> Result<Vec<FriendshipEdge>> {
        Self::scan_edges(&self.friendships, from, true)
    }

    fn friendships_to(&self, to: UserId) -> Result<Vec<FriendshipEdge>> {
        Self::scan_edges(&self.invitations, to, false)
    }
}
