use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
    task::JoinHandle,
};

/// Answer exactly one HTTP request with `status` and `body`.
///
/// Returns the server's base URL and a handle resolving to the request line
/// it received (e.g. `GET /path?query HTTP/1.1`).
pub(crate) async fn serve_once(
    status: u16,
    body: impl Into<Vec<u8>>,
) -> (String, JoinHandle<String>) {
    let body = body.into();
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept test connection");

        let mut request = Vec::new();
        let mut chunk = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut chunk).await.expect("read request");
            if n == 0 {
                break;
            }
            request.extend_from_slice(&chunk[..n]);
        }

        let reason = match status {
            200 => "OK",
            404 => "Not Found",
            _ => "Status",
        };
        let head = format!(
            "HTTP/1.1 {status} {reason}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        socket.write_all(head.as_bytes()).await.expect("write head");
        socket.write_all(&body).await.expect("write body");
        let _ = socket.shutdown().await;

        String::from_utf8_lossy(&request).lines().next().unwrap_or_default().to_string()
    });

    (format!("http://{addr}"), handle)
}
