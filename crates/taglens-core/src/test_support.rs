//! Helpers shared by unit tests.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Address nothing listens on; connections are refused immediately.
pub const UNREACHABLE: &str = "http://127.0.0.1:1";

/// Serve a single HTTP/1.1 response on an ephemeral port.
///
/// The body is sent without `Content-Length` and the connection is closed
/// afterwards, so clients have to read it to EOF. Returns the base URL.
pub async fn serve_once(status: u16, content_type: &str, body: Vec<u8>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let head = format!(
        "HTTP/1.1 {status} Test\r\nContent-Type: {content_type}\r\nConnection: close\r\n\r\n"
    );

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(n) => request.extend_from_slice(&buf[..n]),
            }
        }
        // The client may hang up early (size limits); write errors are expected then
        let _ = socket.write_all(head.as_bytes()).await;
        let _ = socket.write_all(&body).await;
        let _ = socket.shutdown().await;
    });

    format!("http://{addr}")
}
