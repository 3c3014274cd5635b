use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::CurrencyValues;

#[derive(Eq, PartialEq, Ord, PartialOrd, Hash, Clone, Copy, Debug, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

/// Stored user record. Relationship edges are kept apart, keyed by `(from, to)`.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct UserEntity {
    pub id: UserId,
    pub username: String,
    pub firstname: Option<String>,
    pub surname: Option<String>,
    pub currency: CurrencyValues,
    pub photo: Option<String>,
}

impl UserEntity {
    pub fn new(id: UserId, username: impl Into<String>, currency: CurrencyValues) -> Self {
        Self {
            id,
            username: username.into(),
            firstname: None,
            surname: None,
            currency,
            photo: None,
        }
    }
}

#[derive(Eq, PartialEq, Hash, Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FriendshipStatus {
    Pending,
    Accepted,
}

/// Directed edge `from -> to`. A pending edge is an invitation sent by `from`.
#[derive(Eq, PartialEq, Hash, Clone, Copy, Debug, Serialize, Deserialize)]
pub struct FriendshipEdge {
    pub from: UserId,
    pub to: UserId,
    pub status: FriendshipStatus,
}
