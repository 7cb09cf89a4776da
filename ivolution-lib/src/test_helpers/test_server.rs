//! A bare HTTP/1.1 server for responses a mock server cannot produce: bodies
//! without `Content-Length`, connections dropped mid-body, stalled bodies.

use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterBody {
    /// Close the connection.
    Close,
    /// Keep the connection open without sending anything else.
    Stall,
}

#[derive(Debug, Clone)]
pub struct RawResponse {
    /// Value of the `Content-Length` header, if any.
    pub content_length: Option<usize>,
    pub body: Vec<u8>,
    pub after_body: AfterBody,
}

impl RawResponse {
    /// Body delimited by connection close.
    pub fn without_length(body: Vec<u8>) -> Self {
        Self {
            content_length: None,
            body,
            after_body: AfterBody::Close,
        }
    }

    /// Announces the full body length, sends only the first `sent` bytes, then
    /// drops the connection.
    pub fn truncated(body: Vec<u8>, sent: usize) -> Self {
        Self {
            content_length: Some(body.len()),
            body: body[..sent].to_vec(),
            after_body: AfterBody::Close,
        }
    }

    /// Announces the full body length, sends the first `sent` bytes, then goes silent.
    pub fn stalled(body: Vec<u8>, sent: usize) -> Self {
        Self {
            content_length: Some(body.len()),
            body: body[..sent].to_vec(),
            after_body: AfterBody::Stall,
        }
    }
}

pub struct RawServer {
    addr: SocketAddr,
    task: JoinHandle<()>,
}

impl RawServer {
    pub async fn start(response: RawResponse) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("test listener address");

        let task = tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let response = response.clone();
                tokio::spawn(async move {
                    let _ = serve(socket, response).await;
                });
            }
        });

        Self { addr, task }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for RawServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve(mut socket: TcpStream, response: RawResponse) -> std::io::Result<()> {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        head.extend_from_slice(&buf[..n]);
    }

    let mut headers = String::from("HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\n");
    match response.content_length {
        Some(len) => headers.push_str(&format!("Content-Length: {len}\r\n")),
        None => headers.push_str("Connection: close\r\n"),
    }
    headers.push_str("\r\n");
    socket.write_all(headers.as_bytes()).await?;

    for chunk in response.body.chunks(4096) {
        socket.write_all(chunk).await?;
        socket.flush().await?;
    }

    match response.after_body {
        AfterBody::Close => socket.shutdown().await,
        AfterBody::Stall => {
            std::future::pending::<()>().await;
            Ok(())
        }
    }
}
