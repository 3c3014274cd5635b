pub mod client {
    use anyhow::{Context, Result};
    use niffler_common::{FriendJson, Url, UserJson, UsersQuery};
    use reqwest::{Client, Response, StatusCode};
    use serde::de::DeserializeOwned;

    /// Non-success answer of the user data service.
    #[derive(Debug, thiserror::Error)]
    #[error("{status}: {message}")]
    pub struct ResponseError {
        pub status: StatusCode,
        pub message: String,
    }

    async fn json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .with_context(|| format!("reading {} response body", status))?;
            return Err(ResponseError { status, message }.into());
        }
        Ok(response.json::<T>().await?)
    }

    pub async fn add_user(client: &Client, service: &Url, username: &str) -> Result<UserJson> {
        json(client.post(service.join(format!("add-user/{}", username)))
            .send()
            .await?)
            .await
    }
    pub async fn current_user(client: &Client, service: &Url, username: &str) -> Result<UserJson> {
        json(client.get(service.join(format!("{}/current", username)))
            .send()
            .await?)
            .await
    }
    pub async fn update_user(client: &Client, service: &Url, user: &UserJson) -> Result<UserJson> {
        json(client.post(service.join("update-user"))
            .json(user)
            .send()
            .await?)
            .await
    }
    pub async fn all_users(client: &Client, service: &Url, username: &str, query: &UsersQuery) -> Result<Vec<UserJson>> {
        json(client.get(service.join(format!("{}/all-users", username)))
            .query(query)
            .send()
            .await?)
            .await
    }
    pub async fn friends(client: &Client, service: &Url, username: &str, include_pending: bool) -> Result<Vec<UserJson>> {
        json(client.get(service.join(format!("{}/friends", username)))
            .query(&[("include_pending", include_pending)])
            .send()
            .await?)
            .await
    }
    pub async fn invitations(client: &Client, service: &Url, username: &str) -> Result<Vec<UserJson>> {
        json(client.get(service.join(format!("{}/invitations", username)))
            .send()
            .await?)
            .await
    }
    pub async fn send_invitation(client: &Client, service: &Url, username: &str, friend: &str) -> Result<UserJson> {
        json(client.post(service.join(format!("{}/invite", username)))
            .json(&FriendJson { username: friend.to_string() })
            .send()
            .await?)
            .await
    }
    pub async fn accept_invitation(client: &Client, service: &Url, username: &str, inviter: &str) -> Result<Vec<UserJson>> {
        json(client.post(service.join(format!("{}/accept-invitation", username)))
            .json(&FriendJson { username: inviter.to_string() })
            .send()
            .await?)
            .await
    }
    pub async fn decline_invitation(client: &Client, service: &Url, username: &str, inviter: &str) -> Result<Vec<UserJson>> {
        json(client.post(service.join(format!("{}/decline-invitation", username)))
            .json(&FriendJson { username: inviter.to_string() })
            .send()
            .await?)
            .await
    }
    pub async fn remove_friend(client: &Client, service: &Url, username: &str, friend: &str) -> Result<Vec<UserJson>> {
        json(client.post(service.join(format!("{}/remove-friend", username)))
            .json(&FriendJson { username: friend.to_string() })
            .send()
            .await?)
            .await
    }
}
