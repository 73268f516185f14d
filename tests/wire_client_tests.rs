//! End-to-end establishment over the reference wire client
//!
//! A fake server on loopback speaks the length-prefixed JSON framing.

use bytes::{Buf, BytesMut};
use dbsql_wire::protocol::{
    decode_frame, encode_frame, CloseSessionResponse, ExecuteStatementResponse,
    HandleIdentifier, OpenSessionResponse, ProtocolVersion, RequestEnvelope, RpcRequest,
    RpcResponse, SessionHandle, Status,
};
use dbsql_wire::{Config, Connector, Context, SqlConnector};
use std::collections::HashMap;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

/// Serve one client connection, reporting every request seen
async fn serve(mut socket: TcpStream, seen: mpsc::UnboundedSender<RequestEnvelope>) {
    let mut buf = BytesMut::new();
    loop {
        let envelope = match decode_frame::<RequestEnvelope>(&buf) {
            Ok((envelope, consumed)) => {
                buf.advance(consumed);
                envelope
            }
            Err(_) => {
                if socket.read_buf(&mut buf).await.unwrap_or(0) == 0 {
                    return;
                }
                continue;
            }
        };

        let reply = match &envelope.request {
            RpcRequest::OpenSession(_) => RpcResponse::OpenSession(OpenSessionResponse {
                status: Status::success(),
                server_protocol_version: ProtocolVersion::V6,
                session_handle: Some(SessionHandle {
                    session_id: HandleIdentifier {
                        guid: (0u8..16).collect(),
                        secret: vec![1, 2, 3],
                    },
                }),
                configuration: HashMap::new(),
            }),
            RpcRequest::ExecuteStatement(_) => {
                RpcResponse::ExecuteStatement(ExecuteStatementResponse {
                    status: Status::success(),
                    rows_affected: Some(0),
                })
            }
            RpcRequest::CloseSession(_) => RpcResponse::CloseSession(CloseSessionResponse {
                status: Status::success(),
            }),
        };

        let _ = seen.send(envelope);
        let frame = encode_frame(&reply).unwrap();
        if socket.write_all(&frame).await.is_err() {
            return;
        }
    }
}

async fn fake_server() -> (u16, mpsc::UnboundedReceiver<RequestEnvelope>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            tokio::spawn(serve(socket, tx.clone()));
        }
    });

    (port, rx)
}

#[tokio::test]
async fn test_open_exec_close_over_tcp() {
    let (port, mut seen) = fake_server().await;

    let config = Config::builder()
        .server_hostname("127.0.0.1")
        .port(port)
        .rpc_path("/sql/1.0/endpoints/local")
        .access_token("dapi-test")
        .initial_namespace("main", "")
        .session_param("timezone", "UTC")
        .user_agent_entry("wire-test")
        .use_tls(false)
        .default_timeout(Some(Duration::from_secs(5)))
        .poll_interval(Duration::from_millis(10))
        .build();

    let connector = SqlConnector::new(config);
    let ctx = Context::background();

    let conn = connector.connect(&ctx).await.expect("connect");
    assert_eq!(conn.id().as_str(), "00010203-0405-0607-0809-0a0b0c0d0e0f");
    assert_eq!(conn.session_handle().session_id.secret, vec![1, 2, 3]);

    let result = conn.exec(&ctx, "SELECT 1").await.expect("exec");
    assert_eq!(result.rows_affected, Some(0));
    conn.close(&ctx).await.expect("close");

    let open = seen.recv().await.unwrap();
    assert_eq!(open.path, "/sql/1.0/endpoints/local");
    assert_eq!(open.token.as_deref(), Some("dapi-test"));
    assert!(open.user_agent.ends_with("(wire-test)"));
    match open.request {
        RpcRequest::OpenSession(req) => {
            let ns = req.initial_namespace.unwrap();
            assert_eq!(ns.catalog_name.unwrap().as_str(), "main");
            assert!(ns.schema_name.is_none());
        }
        other => panic!("expected open_session, got {:?}", other),
    }

    let set = seen.recv().await.unwrap();
    match set.request {
        RpcRequest::ExecuteStatement(req) => {
            assert_eq!(req.statement, "SET `timezone` = `UTC`;");
            assert_eq!(req.session_handle.session_id.guid, (0u8..16).collect::<Vec<_>>());
        }
        other => panic!("expected execute_statement, got {:?}", other),
    }

    assert!(matches!(
        seen.recv().await.unwrap().request,
        RpcRequest::ExecuteStatement(_)
    ));
    assert!(matches!(
        seen.recv().await.unwrap().request,
        RpcRequest::CloseSession(_)
    ));
}

#[tokio::test]
async fn test_silent_server_hits_default_timeout() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    // Accept and hold the socket without ever answering
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let config = Config::builder()
        .server_hostname("127.0.0.1")
        .port(port)
        .use_tls(false)
        .default_timeout(Some(Duration::from_millis(100)))
        .poll_interval(Duration::from_millis(10))
        .build();

    let err = SqlConnector::new(config)
        .connect(&Context::background())
        .await
        .unwrap_err();
    assert!(err.is_timeout());
}

#[tokio::test]
async fn test_unreachable_server_is_session_open_error() {
    let config = Config::builder()
        .server_hostname("127.0.0.1")
        .port(1)
        .use_tls(false)
        .build();

    let err = SqlConnector::new(config)
        .connect(&Context::background())
        .await
        .unwrap_err();

    assert_eq!(
        err.session_open_cause(),
        Some(dbsql_wire::SessionOpenCause::Remote)
    );
    assert_eq!(err.target().unwrap().port, 1);
}
