mod common;

use common::{Client, seat_of, set_roles, start_in_memory};
use game_core::{Command, Phase, PhaseKind, Prompt, Recipient, RoleCount, RoleId};
use runtime::{Event, ServerMessage, SessionEvent, Topic};

// ============================================================================
// Lobby sync
// ============================================================================

#[tokio::test]
async fn role_change_reaches_every_connection() {
    let (runtime, _store) = start_in_memory().await;
    let handle = runtime.handle();

    let a = Client::signup(&handle, "Ana").await;
    let mut b = Client::signup(&handle, "Bo").await;
    let mut watcher = Client::connect(&handle).await;
    b.drain();
    watcher.drain();

    a.act(
        &handle,
        Command::UpdateRole {
            role_id: "werewolf".into(),
            delta: 1,
        },
    )
    .await;

    let view = b.latest_view().expect("Bo was pushed the change");
    assert_eq!(
        view.lobby.composition,
        vec![RoleCount {
            role: RoleId::Werewolf,
            count: 1
        }]
    );
    assert_eq!(view.lobby.status, "Role count (1) does not match player count (2)");
    assert!(!view.lobby.startable);

    let anonymous = watcher.latest_view().expect("anonymous watchers follow the lobby");
    assert_eq!(anonymous.lobby.total, 1);
    assert_eq!(anonymous.prompt, Prompt::SignUp);
}

#[tokio::test]
async fn a_new_connection_gets_the_current_view() {
    let (runtime, _store) = start_in_memory().await;
    let handle = runtime.handle();
    let _ana = Client::signup(&handle, "Ana").await;

    let mut fresh = Client::connect(&handle).await;
    let frames = fresh.drain();
    assert_eq!(frames.len(), 1);
    let ServerMessage::View { view, .. } = &frames[0] else {
        panic!("expected a view, got {:?}", frames[0]);
    };
    assert_eq!(view.players.len(), 1);
    assert_eq!(view.phase.kind, PhaseKind::Lobby);
}

#[tokio::test]
async fn rejected_commands_push_nothing() {
    let (runtime, _store) = start_in_memory().await;
    let handle = runtime.handle();
    let ana = Client::signup(&handle, "Ana").await;
    let mut bo = Client::signup(&handle, "Bo").await;
    bo.drain();

    let error = handle
        .submit(ana.id, Command::StartGame)
        .await
        .expect_err("no roles configured");
    assert_eq!(error.code(), "not_startable");
    assert!(bo.drain().is_empty());
}

// ============================================================================
// Identity and reconnection
// ============================================================================

#[tokio::test]
async fn reconnect_restores_the_same_projection() {
    let (runtime, _store) = start_in_memory().await;
    let handle = runtime.handle();

    let clients = vec![
        Client::signup(&handle, "Ana").await,
        Client::signup(&handle, "Bo").await,
        Client::signup(&handle, "Cy").await,
    ];
    set_roles(
        &handle,
        &clients[0],
        &[(RoleId::Werewolf, 1), (RoleId::Seer, 1), (RoleId::Villager, 1)],
    )
    .await;
    clients[0].act(&handle, Command::StartGame).await;

    let seer = seat_of(&handle, &clients, RoleId::Seer).await;
    let target = clients[(seer + 1) % 3].player();
    clients[seer]
        .act(&handle, Command::SeerInvestigate { target })
        .await;

    let player = clients[seer].player();
    let before = handle.query_view(Recipient::Player(player)).await.unwrap();

    handle.disconnect(clients[seer].id).await.unwrap();
    let offline = handle.query_state().await.unwrap();
    assert!(!offline.is_connected(player));
    assert!(matches!(offline.phase, Phase::Night { round: 1 }));

    let mut back = Client::connect(&handle).await;
    let reply = handle
        .submit_text(
            back.id,
            &format!(
                r#"{{"action":"login","name":"{}","secret_token":"{}"}}"#,
                clients[seer].name.to_uppercase(),
                clients[seer].token.as_deref().unwrap()
            ),
        )
        .await;
    assert_eq!(reply, ServerMessage::LoggedIn { player_id: player });

    let after = back.latest_view().expect("view after login");
    assert_eq!(after, before);
    assert_eq!(after.investigations.len(), 1);
    assert_eq!(after.investigations[0].target, target);
    assert_eq!(after.night_action.and_then(|action| action.target), Some(target));
}

#[tokio::test]
async fn logging_in_elsewhere_supersedes_the_old_connection() {
    let (runtime, _store) = start_in_memory().await;
    let handle = runtime.handle();
    let mut sessions = handle.subscribe(Topic::Session);

    let mut first = Client::signup(&handle, "Ana").await;
    first.drain();
    let second = Client::connect(&handle).await;

    let reply = handle
        .submit(
            second.id,
            Command::Login {
                name: "ana".into(),
                secret_token: first.token.clone().unwrap(),
            },
        )
        .await
        .unwrap();
    assert!(matches!(reply, game_core::CommandResult::LoggedIn { .. }));

    let frames = first.drain();
    assert!(frames.contains(&ServerMessage::Superseded));
    let view = frames
        .iter()
        .rev()
        .find_map(|frame| match frame {
            ServerMessage::View { view, .. } => Some(view),
            _ => None,
        })
        .expect("the old connection falls back to the anonymous view");
    assert!(view.me.is_none());

    // The old socket closing must not take the player offline.
    handle.disconnect(first.id).await.unwrap();
    let state = handle.query_state().await.unwrap();
    assert!(state.is_connected(first.player()));

    let mut superseded = false;
    while let Ok(event) = sessions.try_recv() {
        if let Event::Session(SessionEvent::Superseded { connection, .. }) = event {
            superseded = connection == first.id;
        }
    }
    assert!(superseded);
}

#[tokio::test]
async fn wrong_token_is_rejected_without_a_hint() {
    let (runtime, _store) = start_in_memory().await;
    let handle = runtime.handle();
    let _ana = Client::signup(&handle, "Ana").await;
    let stranger = Client::connect(&handle).await;

    let bad_token = handle
        .submit_text(
            stranger.id,
            r#"{"action":"login","name":"Ana","secret_token":"00"}"#,
        )
        .await;
    let bad_name = handle
        .submit_text(
            stranger.id,
            r#"{"action":"login","name":"Nobody","secret_token":"00"}"#,
        )
        .await;
    assert_eq!(bad_token, bad_name);
    assert!(matches!(bad_token, ServerMessage::Error { ref code, .. } if code == "bad_credentials"));
}

#[tokio::test]
async fn transport_errors_have_codes() {
    let (runtime, _store) = start_in_memory().await;
    let handle = runtime.handle();
    let stranger = Client::connect(&handle).await;

    let reply = handle.submit_text(stranger.id, "{not json").await;
    assert!(matches!(reply, ServerMessage::Error { ref code, .. } if code == "malformed_command"));

    let reply = handle
        .submit_text(stranger.id, r#"{"action":"day_pass"}"#)
        .await;
    assert!(matches!(reply, ServerMessage::Error { ref code, .. } if code == "not_signed_in"));

    handle.disconnect(stranger.id).await.unwrap();
    let error = handle
        .submit(stranger.id, Command::DayPass)
        .await
        .expect_err("closed connection");
    assert_eq!(error.code(), "unknown_connection");
}
