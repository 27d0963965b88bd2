#![cfg(all(feature = "http-transport", feature = "provider-openai"))]

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use uprovider::{
    ChatRequest, Message, OpenAiAdapter, ProviderAdapter, ProviderId, ReqwestTransport, Role,
    SecretString, StopReason, StreamEvent,
};

/// Answers one request with a chunked SSE body, pausing `gap` before each event.
async fn serve_slow_sse(listener: TcpListener, events: Vec<String>, gap: Duration) {
    let (mut socket, _) = listener.accept().await.expect("client should connect");

    let mut request = Vec::new();
    let mut buffer = [0_u8; 1024];
    while !request.windows(4).any(|window| window == b"\r\n\r\n") {
        let read = socket.read(&mut buffer).await.expect("request should arrive");
        if read == 0 {
            return;
        }
        request.extend_from_slice(&buffer[..read]);
    }

    socket
        .write_all(
            b"HTTP/1.1 200 OK\r\ncontent-type: text/event-stream\r\n\
              transfer-encoding: chunked\r\nconnection: close\r\n\r\n",
        )
        .await
        .expect("headers should be written");

    for event in events {
        tokio::time::sleep(gap).await;
        let frame = format!("{:x}\r\n{event}\r\n", event.len());
        socket
            .write_all(frame.as_bytes())
            .await
            .expect("chunk should be written");
        socket.flush().await.expect("chunk should be flushed");
    }

    socket
        .write_all(b"0\r\n\r\n")
        .await
        .expect("trailer should be written");
}

#[tokio::test]
async fn stream_outliving_the_timeout_survives_while_chunks_keep_arriving() {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let address = listener.local_addr().expect("listener address");

    let mut events = (0..5)
        .map(|index| {
            let chunk = json!({"choices": [{"delta": {"content": format!("t{index} ")}}]});
            format!("data: {chunk}\n\n")
        })
        .collect::<Vec<_>>();
    events.push(format!(
        "data: {}\n\n",
        json!({"choices": [{"delta": {}, "finish_reason": "stop"}]})
    ));
    events.push("data: [DONE]\n\n".to_string());
    let server = tokio::spawn(serve_slow_sse(
        listener,
        events,
        Duration::from_millis(400),
    ));

    let transport = ReqwestTransport::with_timeout(Duration::from_secs(1))
        .expect("client should build");
    let adapter = OpenAiAdapter::new(SecretString::new("sk-local"), Arc::new(transport))
        .with_base_url(format!("http://{address}/v1"));
    let request = ChatRequest::new(
        ProviderId::OPENAI,
        "gpt-4o-mini",
        vec![Message::new(Role::User, "count slowly")],
    )
    .enable_streaming();

    let events = adapter.stream(request).collect::<Vec<_>>().await;

    let Some(StreamEvent::Done(response)) = events.last() else {
        panic!("a slow but live stream should finish, got {events:?}");
    };
    assert_eq!(response.text, "t0 t1 t2 t3 t4 ");
    assert_eq!(response.stop_reason, StopReason::EndTurn);
    assert_eq!(events.iter().filter(|event| event.is_terminal()).count(), 1);

    server.await.expect("server task should finish");
}
