//! Local HTTP endpoints for exercising the service clients in unit tests

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// An address nothing listens on
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:1";

/// A request captured by [`serve_once`]
#[derive(Debug)]
pub struct CapturedRequest {
    pub head: String,
    pub body: String,
}

impl CapturedRequest {
    /// The request line, e.g. `POST /api/tools/call HTTP/1.1`
    pub fn request_line(&self) -> &str {
        self.head.lines().next().unwrap_or_default()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim())
        })
    }
}

/// Accept a single connection, answer it with `status` and `body`, and
/// return the base URL plus a handle resolving to the captured request.
pub async fn serve_once(status: &str, body: &str) -> (String, JoinHandle<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        request
    });

    (base_url, handle)
}

async fn read_request(socket: &mut TcpStream) -> CapturedRequest {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(request) = split_request(&buf) {
            let expected = request
                .header("content-length")
                .and_then(|len| len.parse::<usize>().ok())
                .unwrap_or(0);
            if request.body.len() >= expected {
                return request;
            }
        }
    }

    split_request(&buf).unwrap_or(CapturedRequest {
        head: String::from_utf8_lossy(&buf).into_owned(),
        body: String::new(),
    })
}

fn split_request(buf: &[u8]) -> Option<CapturedRequest> {
    let text = String::from_utf8_lossy(buf);
    let (head, body) = text.split_once("\r\n\r\n")?;
    Some(CapturedRequest {
        head: head.to_string(),
        body: body.to_string(),
    })
}
