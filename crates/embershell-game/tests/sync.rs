//! Integration tests for the facade against a live fake server.
//!
//! Each test stands up a real TCP listener playing the remote
//! authority, attaches a session to a shared facade, and drives the
//! full path: mutation → request line on the wire, response line →
//! reconciler → facade state.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use embershell_engine::{
    AreaData, AttributesData, ChapterData, CharacterData, Module, ModuleData,
    ObjectRef, Position,
};
use embershell_game::{Game, LoginStatus};
use embershell_net::{Connection, Session};
use embershell_protocol::{Request, Response, Update};

fn snapshot() -> ModuleData {
    ModuleData {
        id: "testmod".into(),
        chapter: ChapterData {
            id: "ch1".into(),
            start_area: "village".into(),
            start_pos: Some(Position::new(10.0, 20.0)),
            areas: vec![AreaData {
                id: "village".into(),
                characters: vec![CharacterData {
                    id: "innkeep".into(),
                    serial: "0".into(),
                    health: 10,
                    max_health: 10,
                    ..Default::default()
                }],
            }],
        },
    }
}

fn pc_data() -> CharacterData {
    CharacterData {
        id: "pc".into(),
        serial: "0".into(),
        level: 1,
        health: 20,
        max_health: 20,
        attributes: AttributesData::default(),
        ..Default::default()
    }
}

type ServerReader = Lines<BufReader<OwnedReadHalf>>;

/// Binds a fake server, attaches a session to the facade, and returns
/// the server side of the stream.
async fn attach(game: &Arc<Mutex<Game>>) -> (OwnedWriteHalf, ServerReader) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("should bind");
    let addr = listener.local_addr().expect("should have addr");
    let (conn, rx) = Connection::connect(&addr.ip().to_string(), addr.port())
        .await
        .expect("should connect");
    let (server_side, _) = listener.accept().await.expect("should accept");
    let (read_half, write_half) = server_side.into_split();

    Game::set_server(game, Session::new(conn), rx).await;
    (write_half, BufReader::new(read_half).lines())
}

async fn next_request(reader: &mut ServerReader) -> Request {
    let line = reader
        .next_line()
        .await
        .expect("should read line")
        .expect("stream should stay open");
    serde_json::from_str(&line).expect("should decode request")
}

async fn send_response(writer: &mut OwnedWriteHalf, response: &Response) {
    let mut line = serde_json::to_string(response).expect("should encode");
    line.push_str("\r\n");
    writer
        .write_all(line.as_bytes())
        .await
        .expect("server write should succeed");
}

/// Polls the facade until the predicate holds.
async fn wait_until(
    game: &Arc<Mutex<Game>>,
    what: &str,
    pred: impl Fn(&Game) -> bool,
) {
    for _ in 0..200 {
        if pred(&*game.lock().await) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for: {what}");
}

#[tokio::test]
async fn test_attach_requests_snapshot_and_applies_it() {
    let game = Arc::new(Mutex::new(Game::new(None)));
    let (mut writer, mut reader) = attach(&game).await;

    // Attaching asks for the initial snapshot.
    let req = next_request(&mut reader).await;
    assert!(req.update);
    assert_eq!(game.lock().await.login_status(), LoginStatus::Pending);

    send_response(
        &mut writer,
        &Response {
            update: Some(Update { module: snapshot() }),
            ..Default::default()
        },
    )
    .await;

    wait_until(&game, "module applied", |g| g.module().is_some()).await;
    let g = game.lock().await;
    assert_eq!(g.module().unwrap().id(), "testmod");
    // A regular response also completes the login handshake.
    assert_eq!(g.login_status(), LoginStatus::Acknowledged);
}

#[tokio::test]
async fn test_logon_echo_keeps_login_pending() {
    let game = Arc::new(Mutex::new(Game::new(None)));
    let (mut writer, mut reader) = attach(&game).await;
    next_request(&mut reader).await;

    send_response(
        &mut writer,
        &Response {
            logon: true,
            ..Default::default()
        },
    )
    .await;

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(game.lock().await.login_status(), LoginStatus::Pending);
}

#[tokio::test]
async fn test_login_failure_drops_pending_player() {
    let game = Arc::new(Mutex::new(Game::new(None)));
    game.lock().await.set_pending_player(pc_data());
    let (mut writer, mut reader) = attach(&game).await;
    next_request(&mut reader).await;

    send_response(
        &mut writer,
        &Response {
            logon: true,
            errors: vec!["bad credentials".into()],
            ..Default::default()
        },
    )
    .await;

    wait_until(&game, "login failed", |g| {
        g.login_status() == LoginStatus::Failed
    })
    .await;
    assert!(game.lock().await.players().is_empty());
}

#[tokio::test]
async fn test_login_ack_spawns_pending_player() {
    let game = Arc::new(Mutex::new(Game::new(None)));
    game.lock().await.set_pending_player(pc_data());
    let (mut writer, mut reader) = attach(&game).await;
    next_request(&mut reader).await;

    send_response(
        &mut writer,
        &Response {
            update: Some(Update { module: snapshot() }),
            ..Default::default()
        },
    )
    .await;

    wait_until(&game, "player spawned", |g| !g.players().is_empty()).await;
    let g = game.lock().await;
    assert_eq!(
        g.active_player_ref().unwrap().character(),
        &ObjectRef::new("pc", "0")
    );
    let pc = g.module().unwrap().character("pc", "0").unwrap();
    assert_eq!(pc.position(), Position::new(10.0, 20.0));
}

#[tokio::test]
async fn test_mutation_applies_locally_and_forwards() {
    let game = Arc::new(Mutex::new(Game::new(Some(Module::new(snapshot())))));
    game.lock().await.spawn_player(pc_data()).expect("should spawn");
    let (_writer, mut reader) = attach(&game).await;
    next_request(&mut reader).await;

    {
        let mut g = game.lock().await;
        let mut player = g.active_player().expect("should have player");
        player.set_dest_point(7.0, 8.0).await;
    }

    // Local effect is immediate, not gated on the server.
    {
        let g = game.lock().await;
        let pc = g.module().unwrap().character("pc", "0").unwrap();
        assert_eq!(pc.dest_point(), Position::new(7.0, 8.0));
    }
    // And the same mutation went out on the wire.
    let req = next_request(&mut reader).await;
    assert_eq!(req.moves.len(), 1);
    assert_eq!(req.moves[0].id, "pc");
    assert_eq!(req.moves[0].x, 7.0);
}

#[tokio::test]
async fn test_forward_failure_keeps_local_effect() {
    let game = Arc::new(Mutex::new(Game::new(Some(Module::new(snapshot())))));
    game.lock().await.spawn_player(pc_data()).expect("should spawn");
    let (_writer, mut reader) = attach(&game).await;
    next_request(&mut reader).await;

    let session = Arc::clone(game.lock().await.session().expect("attached"));
    session.close().await;

    {
        let mut g = game.lock().await;
        let mut player = g.active_player().expect("should have player");
        player.set_dest_point(3.0, 4.0).await;
    }

    // The send failed (connection closed) but the local move stands.
    let g = game.lock().await;
    let pc = g.module().unwrap().character("pc", "0").unwrap();
    assert_eq!(pc.dest_point(), Position::new(3.0, 4.0));
}

#[tokio::test]
async fn test_snapshot_overwrites_provisional_local_state() {
    let game = Arc::new(Mutex::new(Game::new(Some(Module::new(snapshot())))));
    game.lock().await.spawn_player(pc_data()).expect("should spawn");
    let (mut writer, mut reader) = attach(&game).await;
    next_request(&mut reader).await;

    {
        let mut g = game.lock().await;
        let mut player = g.active_player().expect("should have player");
        player.set_dest_point(99.0, 99.0).await;
    }
    next_request(&mut reader).await;

    // The authority disagrees and pins the character elsewhere.
    let mut corrected = pc_data();
    corrected.position = Position::new(1.0, 1.0);
    send_response(
        &mut writer,
        &Response {
            update: Some(Update {
                module: ModuleData {
                    chapter: ChapterData {
                        areas: vec![AreaData {
                            id: "village".into(),
                            characters: vec![corrected],
                        }],
                        ..Default::default()
                    },
                    ..Default::default()
                },
            }),
            ..Default::default()
        },
    )
    .await;

    wait_until(&game, "snapshot applied", |g| {
        g.module()
            .and_then(|m| m.character("pc", "0"))
            .is_some_and(|c| c.position() == Position::new(1.0, 1.0))
    })
    .await;
    // The wrapper still resolves the replaced character.
    let g = game.lock().await;
    assert_eq!(
        g.active_player_ref().unwrap().character(),
        &ObjectRef::new("pc", "0")
    );
}
