//! Fixtures shared by the tests of several modules.

use crate::http_util::Fetch;
use std::{
    collections::HashMap,
    io::{
        Cursor,
        Write,
    },
};
use bytes::Bytes;
use tokio::{
    net::TcpListener,
    io::{
        AsyncReadExt,
        AsyncWriteExt,
    },
};
use zip::{
    write::FileOptions,
    CompressionMethod,
    ZipWriter,
};
use anyhow::{
    Result,
    anyhow,
};


/// In-memory stand-in for the network. Unknown URLs fail like a 404 would.
#[derive(Debug, Default)]
pub struct FakeHttp {
    pub responses: HashMap<String, Bytes>,
    pub requests: Vec<String>,
}

impl FakeHttp {
    pub fn with(mut self, url: &str, body: impl Into<Bytes>) -> Self {
        self.responses.insert(url.to_owned(), body.into());
        self
    }

    pub fn count(&self, url: &str) -> usize {
        self.requests.iter().filter(|req| req.as_str() == url).count()
    }
}

impl Fetch for FakeHttp {
    async fn fetch(&mut self, url: &str) -> Result<Bytes> {
        self.requests.push(url.to_owned());
        self.responses.get(url)
            .cloned()
            .ok_or_else(|| anyhow!("http status code 404 getting {:?}", url))
    }
}

/// Build a zip in memory. Names ending in `/` become directory entries.
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Stored);
    for &(name, content) in entries {
        if name.ends_with('/') {
            zip.add_directory(name, options).unwrap();
        } else {
            zip.start_file(name, options).unwrap();
            zip.write_all(content).unwrap();
        }
    }
    zip.finish().unwrap().into_inner()
}

/// Serve one connection per given `(status, body)` on localhost, in order,
/// closing each after the response. Returns the `http://host:port` base.
pub async fn serve_responses(responses: Vec<(u16, &'static [u8])>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        for (status, body) in responses {
            let (mut socket, _) = listener.accept().await.unwrap();

            // discard the request head
            let mut request = Vec::new();
            let mut buf = [0; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let reason = match status {
                200 => "OK",
                404 => "Not Found",
                _ => "Unknown",
            };
            let head = format!(
                "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status,
                reason,
                body.len(),
            );
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(body).await.unwrap();
            socket.shutdown().await.unwrap();
        }
    });
    format!("http://{}", addr)
}
