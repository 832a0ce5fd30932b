//! Integration tests for the WebSocket transport against a real socket.

#[cfg(feature = "websocket")]
mod websocket {
    use futures_util::{SinkExt, StreamExt};
    use tilecast_transport::{Connection, Transport, WebSocketTransport};
    use tokio_tungstenite::tungstenite::Message;

    type ClientWs = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    async fn connect_client(addr: &str) -> ClientWs {
        let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
            .await
            .expect("client should connect");
        ws
    }

    async fn accept_one() -> (tilecast_transport::WebSocketConnection, ClientWs) {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("local addr").to_string();
        let server = tokio::spawn(async move { transport.accept().await.expect("accept") });
        let client = connect_client(&addr).await;
        (server.await.expect("accept task"), client)
    }

    #[tokio::test]
    async fn send_and_receive_round_trip() {
        let (server_conn, mut client_ws) = accept_one().await;

        server_conn
            .send(br#"{"event":"connected"}"#)
            .await
            .expect("send should succeed");

        let msg = client_ws.next().await.unwrap().unwrap();
        // UTF-8 payloads travel as text frames.
        assert!(matches!(msg, Message::Text(_)));
        assert_eq!(msg.into_data().as_ref(), br#"{"event":"connected"}"#);

        client_ws
            .send(Message::text(r#"{"event":"connect","room":"r1"}"#))
            .await
            .unwrap();

        let received = server_conn
            .recv()
            .await
            .expect("recv should succeed")
            .expect("should have data");
        assert_eq!(received, br#"{"event":"connect","room":"r1"}"#);

        server_conn.close().await.expect("close should succeed");
    }

    #[tokio::test]
    async fn binary_frames_are_accepted_inbound() {
        let (server_conn, mut client_ws) = accept_one().await;

        client_ws
            .send(Message::Binary(b"payload".to_vec().into()))
            .await
            .unwrap();

        let received = server_conn.recv().await.unwrap().unwrap();
        assert_eq!(received, b"payload");
    }

    #[tokio::test]
    async fn recv_returns_none_on_client_close() {
        let (server_conn, mut client_ws) = accept_one().await;

        client_ws.send(Message::Close(None)).await.unwrap();

        let result = server_conn.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on client close");
    }

    #[tokio::test]
    async fn send_works_while_recv_is_parked() {
        // The relay writes fan-out frames from one task while another
        // task is blocked in recv on the same connection.
        let (server_conn, mut client_ws) = accept_one().await;
        let conn = std::sync::Arc::new(server_conn);

        let reader = {
            let conn = std::sync::Arc::clone(&conn);
            tokio::spawn(async move { conn.recv().await })
        };

        // Give the reader task time to park in recv.
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        conn.send(b"pushed mid-recv").await.expect("send while recv parked");

        let msg = client_ws.next().await.unwrap().unwrap();
        assert_eq!(msg.into_data().as_ref(), b"pushed mid-recv");

        client_ws.send(Message::text("done")).await.unwrap();
        let received = reader.await.unwrap().unwrap().unwrap();
        assert_eq!(received, b"done");
    }
}
