pub mod non_api_structs;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::non_api_structs::UserEntity;

#[derive(Eq, PartialEq, Ord, PartialOrd, Hash, Clone, Debug, Serialize, Deserialize, Default)]
pub struct Url(pub String);

impl Url {
    pub fn from(string: impl AsRef<str>) -> Self {
        Self(string.as_ref().trim_end_matches('/').to_string())
    }
    pub fn join(&self, path: impl AsRef<str>) -> String {
        self.0.clone() + "/" + path.as_ref().trim_start_matches('/')
    }
}

/// Display currency a user picked for their spends.
#[derive(Eq, PartialEq, Hash, Clone, Copy, Debug, Serialize, Deserialize, Default)]
pub enum CurrencyValues {
    #[default]
    RUB,
    USD,
    EUR,
    KZT,
}

/// Relationship of another user as seen by the viewer.
#[derive(Eq, PartialEq, Hash, Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FriendState {
    Friend,
    InviteSent,
    InviteReceived,
}

/// Public view of a user. `friend_state` is only filled in by relationship reads.
#[derive(Clone, Debug, Serialize, Deserialize, Default, Eq, PartialEq)]
pub struct UserJson {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub username: String,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub surname: Option<String>,
    #[serde(default)]
    pub currency: Option<CurrencyValues>,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friend_state: Option<FriendState>,
}

impl UserJson {
    pub fn from_entity(entity: &UserEntity) -> Self {
        Self {
            id: Some(entity.id.0),
            username: entity.username.clone(),
            firstname: entity.firstname.clone(),
            surname: entity.surname.clone(),
            currency: Some(entity.currency),
            photo: entity.photo.clone(),
            friend_state: None,
        }
    }
    pub fn with_state(mut self, friend_state: Option<FriendState>) -> Self {
        self.friend_state = friend_state;
        self
    }
}

/// Body of the invite / accept / decline / remove requests.
#[derive(Clone, Debug, Serialize, Deserialize, Default, Eq, PartialEq)]
pub struct FriendJson {
    pub username: String,
}

/// Opaque paging and search hint forwarded to the identity store.
#[derive(Clone, Debug, Serialize, Deserialize, Default, Eq, PartialEq)]
pub struct UsersQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub size: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::non_api_structs::UserId;

    #[test]
    fn url_join_strips_duplicate_slashes() {
        let url = Url::from("http://127.0.0.1:8089/");
        assert_eq!(url.join("/dima/current"), "http://127.0.0.1:8089/dima/current");
    }

    #[test]
    fn view_from_entity_has_no_state() {
        let mut entity = UserEntity::new(UserId::new(), "dima", CurrencyValues::RUB);
        entity.photo = Some("data:image/png;base64,AA==".to_string());
        let view = UserJson::from_entity(&entity);
        assert_eq!(view.id, Some(entity.id.0));
        assert_eq!(view.username, "dima");
        assert_eq!(view.currency, Some(CurrencyValues::RUB));
        assert_eq!(view.photo, entity.photo);
        assert_eq!(view.friend_state, None);
    }

    #[test]
    fn friend_state_uses_screaming_case_on_the_wire() {
        let view = UserJson {
            username: "barsik".to_string(),
            ..Default::default()
        }
        .with_state(Some(FriendState::InviteSent));
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["friend_state"], "INVITE_SENT");

        let plain = serde_json::to_value(UserJson::default()).unwrap();
        assert!(plain.get("friend_state").is_none());
    }

    #[test]
    fn update_body_without_optional_fields_parses() {
        let view: UserJson = serde_json::from_str(r#"{"username":"dima","currency":"USD"}"#).unwrap();
        assert_eq!(view.username, "dima");
        assert_eq!(view.currency, Some(CurrencyValues::USD));
        assert!(view.photo.is_none());
        assert!(view.id.is_none());
    }
}
