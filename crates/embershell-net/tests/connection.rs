//! Integration tests for the server connection and session.
//!
//! These spin up a real TCP listener standing in for the game server,
//! so the full path is exercised: envelope → line → socket → line →
//! envelope → response queue.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use embershell_net::{Connection, Session};
use embershell_protocol::{Request, Response, Update};

/// Binds a listener on a random port and returns it with its address.
async fn fake_server() -> (TcpListener, String, u16) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("should bind");
    let addr = listener.local_addr().expect("should have addr");
    (listener, addr.ip().to_string(), addr.port())
}

/// Reads one `\r\n`-terminated line from the server side and decodes it
/// as a [`Request`].
async fn read_request(stream: &mut TcpStream) -> Request {
    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .await
        .expect("should read line");
    serde_json::from_str(line.trim_end()).expect("should decode request")
}

#[tokio::test]
async fn test_send_writes_one_line_per_request() {
    let (listener, host, port) = fake_server().await;
    let (conn, _rx) = Connection::connect(&host, port)
        .await
        .expect("should connect");
    let (mut server_side, _) = listener.accept().await.expect("should accept");

    conn.send(&Request {
        update: true,
        ..Default::default()
    })
    .await
    .expect("send should succeed");

    let req = read_request(&mut server_side).await;
    assert!(req.update);
    assert!(req.login.is_empty());
}

#[tokio::test]
async fn test_responses_arrive_on_queue_in_order() {
    let (listener, host, port) = fake_server().await;
    let (_conn, mut rx) = Connection::connect(&host, port)
        .await
        .expect("should connect");
    let (mut server_side, _) = listener.accept().await.expect("should accept");

    server_side
        .write_all(b"{\"errors\":[\"first\"]}\r\n{\"errors\":[\"second\"]}\r\n")
        .await
        .expect("server write should succeed");

    let r1 = rx.recv().await.expect("should receive first response");
    let r2 = rx.recv().await.expect("should receive second response");
    assert_eq!(r1.errors, vec!["first".to_string()]);
    assert_eq!(r2.errors, vec!["second".to_string()]);
}

#[tokio::test]
async fn test_decode_error_drops_frame_but_not_stream() {
    let (listener, host, port) = fake_server().await;
    let (_conn, mut rx) = Connection::connect(&host, port)
        .await
        .expect("should connect");
    let (mut server_side, _) = listener.accept().await.expect("should accept");

    // A garbage line followed by a valid one: only the valid one is
    // delivered, and the loop keeps running.
    server_side
        .write_all(b"%%% not json %%%\r\n{\"logon\":true}\r\n")
        .await
        .expect("server write should succeed");

    let resp = rx.recv().await.expect("should receive valid response");
    assert!(resp.logon);
}

#[tokio::test]
async fn test_server_eof_closes_queue() {
    let (listener, host, port) = fake_server().await;
    let (_conn, mut rx) = Connection::connect(&host, port)
        .await
        .expect("should connect");
    let (server_side, _) = listener.accept().await.expect("should accept");

    drop(server_side);

    assert!(rx.recv().await.is_none(), "queue should close on EOF");
}

#[tokio::test]
async fn test_send_after_close_fails_with_closed() {
    let (listener, host, port) = fake_server().await;
    let (conn, _rx) = Connection::connect(&host, port)
        .await
        .expect("should connect");
    let _server_side = listener.accept().await.expect("should accept");

    conn.close().await;
    conn.close().await; // idempotent

    let result = conn
        .send(&Request {
            update: true,
            ..Default::default()
        })
        .await;
    assert!(matches!(
        result,
        Err(embershell_net::ConnectError::Closed)
    ));
    assert!(conn.is_closed());
}

#[tokio::test]
async fn test_connect_refused_fails_with_dial() {
    // Bind and immediately drop to get a port with nothing listening.
    let (listener, host, port) = fake_server().await;
    drop(listener);

    let result = Connection::connect(&host, port).await;
    assert!(matches!(
        result,
        Err(embershell_net::ConnectError::Dial(_))
    ));
}

#[tokio::test]
async fn test_session_methods_build_single_action_envelopes() {
    let (listener, host, port) = fake_server().await;
    let (conn, _rx) = Connection::connect(&host, port)
        .await
        .expect("should connect");
    let session = Session::new(conn);
    let (mut server_side, _) = listener.accept().await.expect("should accept");

    session
        .login("player1", "secret")
        .await
        .expect("login should send");
    let req = read_request(&mut server_side).await;
    assert_eq!(req.login.len(), 1);
    assert_eq!(req.login[0].id, "player1");
    assert!(req.moves.is_empty() && req.chat.is_empty() && !req.update);

    session
        .move_to("pc", "0", 3.0, 4.0)
        .await
        .expect("move should send");
    let req = read_request(&mut server_side).await;
    assert_eq!(req.moves.len(), 1);
    assert_eq!(req.moves[0].x, 3.0);
    assert!(req.login.is_empty());

    session
        .chat("pc", "0", "well met")
        .await
        .expect("chat should send");
    let req = read_request(&mut server_side).await;
    assert_eq!(req.chat.len(), 1);
    assert_eq!(req.chat[0].message, "well met");
}

#[tokio::test]
async fn test_session_close_announces_and_closes() {
    let (listener, host, port) = fake_server().await;
    let (conn, _rx) = Connection::connect(&host, port)
        .await
        .expect("should connect");
    let session = Session::new(conn);
    let (mut server_side, _) = listener.accept().await.expect("should accept");

    session.close().await;

    let req = read_request(&mut server_side).await;
    assert!(req.close);
    assert!(session.connection().is_closed());
}

#[tokio::test]
async fn test_full_round_trip_update_request_snapshot_response() {
    let (listener, host, port) = fake_server().await;
    let (conn, mut rx) = Connection::connect(&host, port)
        .await
        .expect("should connect");
    let session = Session::new(conn);
    let (mut server_side, _) = listener.accept().await.expect("should accept");

    session.update().await.expect("update should send");
    let req = read_request(&mut server_side).await;
    assert!(req.update);

    // Server answers with a snapshot.
    let resp = Response {
        update: Some(Update::default()),
        ..Default::default()
    };
    let mut line = serde_json::to_string(&resp).expect("should encode");
    line.push_str("\r\n");
    server_side
        .write_all(line.as_bytes())
        .await
        .expect("server write should succeed");

    let received = rx.recv().await.expect("should receive snapshot");
    assert!(received.update.is_some());
}
