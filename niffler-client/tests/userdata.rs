use std::net::TcpListener;
use std::sync::Arc;

use niffler_client::client::{
    accept_invitation, add_user, all_users, current_user, decline_invitation, friends, invitations,
    remove_friend, send_invitation, update_user, ResponseError,
};
use niffler_common::{CurrencyValues, FriendState, Url, UserJson, UsersQuery};
use niffler_userdata::MemoryStore;
use reqwest::{Client, StatusCode};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

fn start_server() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = Url::from(format!("http://{}", listener.local_addr().unwrap()));
    tokio::spawn(niffler_userdata::serve(listener, Arc::new(MemoryStore::new())));
    url
}

fn state_of(users: &[UserJson], username: &str) -> Option<FriendState> {
    users
        .iter()
        .find(|u| u.username == username)
        .and_then(|u| u.friend_state)
}

#[tokio::test]
async fn friendship_round_trip() -> anyhow::Result<()> {
    let client = Client::new();
    let service = start_server();

    for name in ["dima", "barsik", "emma"] {
        add_user(&client, &service, name).await?;
    }

    send_invitation(&client, &service, "dima", "barsik").await?;
    send_invitation(&client, &service, "dima", "emma").await?;
    let friends_of_emma = accept_invitation(&client, &service, "emma", "dima").await?;
    assert_eq!(friends_of_emma.len(), 1);
    assert_eq!(friends_of_emma[0].username, "dima");

    let users = all_users(&client, &service, "dima", &UsersQuery::default()).await?;
    assert_eq!(users.len(), 2);
    assert_eq!(state_of(&users, "barsik"), Some(FriendState::InviteSent));
    assert_eq!(state_of(&users, "emma"), Some(FriendState::Friend));

    let received = invitations(&client, &service, "barsik").await?;
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].friend_state, Some(FriendState::InviteReceived));

    assert_eq!(friends(&client, &service, "dima", false).await?.len(), 1);
    assert_eq!(friends(&client, &service, "dima", true).await?.len(), 2);

    assert!(decline_invitation(&client, &service, "barsik", "dima").await?.is_empty());
    assert!(remove_friend(&client, &service, "dima", "emma").await?.is_empty());
    let users = all_users(&client, &service, "dima", &UsersQuery::default()).await?;
    assert!(users.iter().all(|u| u.friend_state.is_none()));
    Ok(())
}

#[tokio::test]
async fn update_replaces_profile_and_clears_photo() -> anyhow::Result<()> {
    let client = Client::new();
    let service = start_server();
    let created = add_user(&client, &service, "dima").await?;
    assert_eq!(created.currency, Some(CurrencyValues::RUB));

    let with_photo = update_user(
        &client,
        &service,
        &UserJson {
            username: "dima".to_string(),
            firstname: Some("Test".to_string()),
            surname: Some("TestSurname".to_string()),
            currency: Some(CurrencyValues::USD),
            photo: Some("photo".to_string()),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(with_photo.id, created.id);
    assert_eq!(with_photo.photo.as_deref(), Some("photo"));

    let cleared = update_user(
        &client,
        &service,
        &UserJson {
            username: "dima".to_string(),
            firstname: Some("Test".to_string()),
            surname: Some("TestSurname".to_string()),
            currency: Some(CurrencyValues::USD),
            photo: Some(String::new()),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(cleared.photo, None);
    assert_eq!(cleared.currency, Some(CurrencyValues::USD));
    assert_eq!(current_user(&client, &service, "dima").await?, cleared);
    Ok(())
}

#[tokio::test]
async fn missing_user_is_not_found() -> anyhow::Result<()> {
    let client = Client::new();
    let service = start_server();

    let err = current_user(&client, &service, "not_existing_user")
        .await
        .unwrap_err();
    let err = err.downcast::<ResponseError>()?;
    assert_eq!(err.status, StatusCode::NOT_FOUND);
    assert_eq!(err.message, "Can't find user by username: not_existing_user");

    add_user(&client, &service, "dima").await?;
    let err = add_user(&client, &service, "dima").await.unwrap_err();
    assert_eq!(err.downcast::<ResponseError>()?.status, StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn all_users_search_hint_is_forwarded() -> anyhow::Result<()> {
    let client = Client::new();
    let service = start_server();
    for name in ["dima", "barsik", "emma"] {
        add_user(&client, &service, name).await?;
    }

    let query = UsersQuery {
        search: Some("bar".to_string()),
        ..Default::default()
    };
    let users = all_users(&client, &service, "dima", &query).await?;
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].username, "barsik");
    Ok(())
}

#[tokio::test]
async fn truncated_error_body_is_reported() -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let service = Url::from(format!("http://{}", listener.local_addr()?));
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 1024];
        let _ = socket.read(&mut request).await.unwrap();
        socket
            .write_all(b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 64\r\n\r\npartial")
            .await
            .unwrap();
    });

    let err = current_user(&Client::new(), &service, "dima")
        .await
        .unwrap_err();
    assert!(err.downcast_ref::<ResponseError>().is_none());
    assert!(err.to_string().contains("500"));
    Ok(())
}
