//! User data service: profile updates and the per-viewer friendship view.

use std::collections::HashMap;
use std::sync::Arc;

use niffler_common::non_api_structs::{FriendshipStatus, UserEntity, UserId};
use niffler_common::{CurrencyValues, FriendState, UserJson, UsersQuery};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::store::IdentityStore;

/// What an update does to the stored photo.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum PhotoUpdate {
    #[default]
    Unchanged,
    Set(String),
    Cleared,
}

impl PhotoUpdate {
    /// Transport mapping: a missing photo and the empty string both clear it.
    pub fn from_wire(photo: Option<String>) -> Self {
        match photo {
            Some(photo) if !photo.is_empty() => Self::Set(photo),
            _ => Self::Cleared,
        }
    }

    fn apply(self, current: Option<String>) -> Option<String> {
        match self {
            Self::Unchanged => current,
            Self::Set(photo) if photo.is_empty() => None,
            Self::Set(photo) => Some(photo),
            Self::Cleared => None,
        }
    }
}

/// Self-update of a user's profile, keyed by the immutable username.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ProfileUpdate {
    pub username: String,
    pub firstname: Option<String>,
    pub surname: Option<String>,
    pub currency: Option<CurrencyValues>,
    pub photo: PhotoUpdate,
}

impl From<UserJson> for ProfileUpdate {
    fn from(json: UserJson) -> Self {
        Self {
            username: json.username,
            firstname: json.firstname,
            surname: json.surname,
            currency: json.currency,
            photo: PhotoUpdate::from_wire(json.photo),
        }
    }
}

/// State of `other` as seen by the viewer, given the viewer's edge to `other`
/// and `other`'s edge to the viewer. The viewer's accepted edge wins.
pub fn friend_state(
    outgoing: Option<FriendshipStatus>,
    incoming: Option<FriendshipStatus>,
) -> Option<FriendState> {
    match (outgoing, incoming) {
        (Some(FriendshipStatus::Accepted), _) => Some(FriendState::Friend),
        (Some(FriendshipStatus::Pending), _) => Some(FriendState::InviteSent),
        (None, Some(FriendshipStatus::Pending)) => Some(FriendState::InviteReceived),
        (None, Some(FriendshipStatus::Accepted)) | (None, None) => None,
    }
}

/// Edges of one user indexed by the user at the other end.
struct Relationships {
    outgoing: HashMap<UserId, FriendshipStatus>,
    incoming: HashMap<UserId, FriendshipStatus>,
}

impl Relationships {
    fn none() -> Self {
        Self {
            outgoing: HashMap::new(),
            incoming: HashMap::new(),
        }
    }

    fn state_of(&self, other: UserId) -> Option<FriendState> {
        friend_state(
            self.outgoing.get(&other).copied(),
            self.incoming.get(&other).copied(),
        )
    }
}

pub struct UserDataService {
    store: Arc<dyn IdentityStore>,
}

impl UserDataService {
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Self { store }
    }

    pub fn register(&self, username: &str) -> Result<UserJson> {
        let user = self.store.create(username, CurrencyValues::default())?;
        info!(username, id = %user.id.0, "user registered");
        Ok(UserJson::from_entity(&user))
    }

    pub fn get_required_user(&self, username: &str) -> Result<UserEntity> {
        self.store
            .find_by_username(username)?
            .ok_or_else(|| Error::user_not_found(username))
    }

    pub fn current_user(&self, username: &str) -> Result<UserJson> {
        Ok(UserJson::from_entity(&self.get_required_user(username)?))
    }

    /// Overwrites the profile fields of an existing user with one `save`.
    pub fn update(&self, update: ProfileUpdate) -> Result<UserJson> {
        let mut user = self.get_required_user(&update.username)?;
        user.firstname = update.firstname;
        user.surname = update.surname;
        if let Some(currency) = update.currency {
            user.currency = currency;
        }
        user.photo = update.photo.apply(user.photo);

        let saved = self.store.save(user)?;
        info!(username = %saved.username, "user profile updated");
        Ok(UserJson::from_entity(&saved))
    }

    /// Everyone but the viewer, each tagged with its relationship to the viewer.
    ///
    /// An unknown viewer is not an error: nobody is related to them.
    /// The candidate list and the edge reads are separate store calls, not one snapshot.
    pub fn all_users(&self, viewer: &str, query: Option<&UsersQuery>) -> Result<Vec<UserJson>> {
        let candidates = self.store.find_all_except(viewer, query)?;
        let relationships = match self.store.find_by_username(viewer)? {
            Some(viewer) => self.relationships(viewer.id)?,
            None => Relationships::none(),
        };
        debug!(viewer, count = candidates.len(), "listing users");
        Ok(candidates
            .iter()
            .filter(|candidate| candidate.username != viewer)
            .map(|candidate| {
                UserJson::from_entity(candidate).with_state(relationships.state_of(candidate.id))
            })
            .collect())
    }

    /// Accepted friends, plus sent invitations when `include_pending` is set.
    pub fn friends(&self, username: &str, include_pending: bool) -> Result<Vec<UserJson>> {
        let user = self.get_required_user(username)?;
        let relationships = self.relationships(user.id)?;
        let edges = self.store.friendships_from(user.id)?;
        self.tagged(edges.iter().map(|edge| edge.to), &relationships, |state| {
            state == FriendState::Friend || (include_pending && state == FriendState::InviteSent)
        })
    }

    /// Users whose invitation to `username` is still pending, whatever
    /// `username` itself has sent them.
    pub fn invitations(&self, username: &str) -> Result<Vec<UserJson>> {
        let user = self.get_required_user(username)?;
        let mut result = Vec::new();
        for edge in self.store.friendships_to(user.id)? {
            if edge.status != FriendshipStatus::Pending {
                continue;
            }
            match self.store.find_by_id(edge.from)? {
                Some(inviter) => result.push(
                    UserJson::from_entity(&inviter).with_state(Some(FriendState::InviteReceived)),
                ),
                None => warn!(id = %edge.from.0, "invitation from a missing user"),
            }
        }
        Ok(result)
    }

    pub fn send_invitation(&self, username: &str, friend: &str) -> Result<UserJson> {
        if username == friend {
            return Err(Error::Validation(format!("User can't invite themselves: {}", username)));
        }
        let user = self.get_required_user(username)?;
        let target = self.get_required_user(friend)?;

        if self.store.friendship(user.id, target.id)? == Some(FriendshipStatus::Accepted) {
            debug!(username, friend, "already friends, invitation skipped");
            return Ok(UserJson::from_entity(&target).with_state(Some(FriendState::Friend)));
        }
        self.store
            .set_friendship(user.id, target.id, FriendshipStatus::Pending)?;
        info!(username, friend, "invitation sent");
        Ok(UserJson::from_entity(&target).with_state(Some(FriendState::InviteSent)))
    }

    pub fn accept_invitation(&self, username: &str, inviter: &str) -> Result<Vec<UserJson>> {
        let user = self.get_required_user(username)?;
        let inviter_user = self.get_required_user(inviter)?;
        if self.store.friendship(inviter_user.id, user.id)?.is_none() {
            return Err(Error::invitation_not_found(inviter));
        }
        self.store
            .set_friendship(inviter_user.id, user.id, FriendshipStatus::Accepted)?;
        self.store
            .set_friendship(user.id, inviter_user.id, FriendshipStatus::Accepted)?;
        info!(username, inviter, "invitation accepted");
        self.friends(username, true)
    }

    pub fn decline_invitation(&self, username: &str, inviter: &str) -> Result<Vec<UserJson>> {
        let user = self.get_required_user(username)?;
        let inviter_user = self.get_required_user(inviter)?;
        if self.store.friendship(inviter_user.id, user.id)? != Some(FriendshipStatus::Pending) {
            return Err(Error::invitation_not_found(inviter));
        }
        self.store.remove_friendship(inviter_user.id, user.id)?;
        info!(username, inviter, "invitation declined");
        self.invitations(username)
    }

    pub fn remove_friend(&self, username: &str, friend: &str) -> Result<Vec<UserJson>> {
        let user = self.get_required_user(username)?;
        let friend_user = self.get_required_user(friend)?;
        self.store.remove_friendship(user.id, friend_user.id)?;
        self.store.remove_friendship(friend_user.id, user.id)?;
        info!(username, friend, "friend removed");
        self.friends(username, true)
    }

    fn relationships(&self, id: UserId) -> Result<Relationships> {
        Ok(Relationships {
            outgoing: self
                .store
                .friendships_from(id)?
                .into_iter()
                .map(|edge| (edge.to, edge.status))
                .collect(),
            incoming: self
                .store
                .friendships_to(id)?
                .into_iter()
                .map(|edge| (edge.from, edge.status))
                .collect(),
        })
    }

    fn tagged(
        &self,
        others: impl Iterator<Item = UserId>,
        relationships: &Relationships,
        keep: impl Fn(FriendState) -> bool,
    ) -> Result<Vec<UserJson>> {
        let mut result = Vec::new();
        for other in others {
            let Some(state) = relationships.state_of(other).filter(|state| keep(*state)) else {
                continue;
            };
            match self.store.find_by_id(other)? {
                Some(user) => result.push(UserJson::from_entity(&user).with_state(Some(state))),
                None => warn!(id = %other.0, "friendship edge points to a missing user"),
            }
        }
        Ok(result)
    }
}
