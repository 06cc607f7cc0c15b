//! Test doubles shared by the stage tests: an in-process HTTP stub, a canned
//! text generator and a recording social platform.

use crate::api::GenerateText;
use crate::error::{GenerateError, PublishError};
use crate::models::{GeneratedText, MediaId, PostId};
use crate::publisher::SocialPlatform;
use reqwest::StatusCode;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// trends24-style markup with five trends in the first card.
pub const TRENDS_FIXTURE: &str = r##"
<html><body>
  <div class="trend-card">
    <h3 class="trend-card__title">1 hour ago</h3>
    <ol class="trend-card__list">
      <li><a href="/t/1">Super Bowl</a><span class="tweet-count">120K</span></li>
      <li><a href="/t/2">#NASA</a></li>
      <li><a href="/t/3">  Budget Bill  </a></li>
      <li><a href="/t/4">#Oscars</a></li>
      <li><a href="/t/5">Fifth Place</a></li>
    </ol>
  </div>
  <div class="trend-card">
    <ol class="trend-card__list">
      <li><a href="/t/6">Older Trend</a></li>
    </ol>
  </div>
</body></html>
"##;

/// An HTTP/1.1 server on localhost that answers every request with the same
/// canned response and keeps the raw requests for assertions.
pub struct StubServer {
    pub url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    pub async fn spawn(status: u16, content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let body = Arc::new(body.into());

        let log = Arc::clone(&requests);
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let log = Arc::clone(&log);
                let body = Arc::clone(&body);
                tokio::spawn(async move {
                    answer(socket, status, content_type, &body, &log).await;
                });
            }
        });

        Self { url, requests }
    }

    /// Raw requests received so far, lossily decoded.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

async fn answer(
    mut socket: TcpStream,
    status: u16,
    content_type: &str,
    body: &[u8],
    log: &Mutex<Vec<String>>,
) {
    let mut raw = Vec::new();
    let mut chunk = [0u8; 8192];
    loop {
        let n = match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        raw.extend_from_slice(&chunk[..n]);
        if request_complete(&raw) {
            break;
        }
    }
    log.lock().unwrap().push(String::from_utf8_lossy(&raw).into_owned());

    let reason = StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Stub");
    let head = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    );
    let _ = socket.write_all(head.as_bytes()).await;
    let _ = socket.write_all(body).await;
    let _ = socket.shutdown().await;
}

fn request_complete(raw: &[u8]) -> bool {
    let Some(head_end) = raw.windows(4).position(|w| w == b"\r\n\r\n") else {
        return false;
    };
    let head = String::from_utf8_lossy(&raw[..head_end]).to_ascii_lowercase();
    let body = &raw[head_end + 4..];
    if head.contains("transfer-encoding: chunked") {
        return body.ends_with(b"0\r\n\r\n");
    }
    let length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);
    body.len() >= length
}

/// Client that ignores proxy environment variables so requests reach the stub.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// Generator that returns a fixed reply and records prompts.
pub struct StaticGenerator {
    reply: Option<String>,
    pub prompts: Mutex<Vec<String>>,
}

impl StaticGenerator {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Some(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            prompts: Mutex::new(Vec::new()),
        }
    }
}

impl GenerateText for StaticGenerator {
    async fn generate(&self, prompt: &str) -> Result<GeneratedText, GenerateError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            Some(text) => Ok(text.clone()),
            None => Err(GenerateError::Api {
                status: StatusCode::TOO_MANY_REQUESTS,
                body: "quota exceeded".to_string(),
            }),
        }
    }
}

/// Platform double that records uploads and posts.
#[derive(Default)]
pub struct RecordingPlatform {
    pub fail_upload: bool,
    pub fail_post: bool,
    /// Path and contents of each file seen at upload time.
    pub uploads: Mutex<Vec<(PathBuf, Vec<u8>)>>,
    pub posts: Mutex<Vec<(String, Vec<MediaId>)>>,
}

impl SocialPlatform for RecordingPlatform {
    async fn upload_media(&self, path: &Path) -> Result<MediaId, PublishError> {
        let bytes = tokio::fs::read(path).await?;
        self.uploads.lock().unwrap().push((path.to_path_buf(), bytes));
        if self.fail_upload {
            return Err(PublishError::Api {
                endpoint: "media/upload",
                status: StatusCode::FORBIDDEN,
                body: "media upload forbidden".to_string(),
            });
        }
        Ok("media-1".to_string())
    }

    async fn create_post(&self, text: &str, media_ids: &[MediaId]) -> Result<PostId, PublishError> {
        self.posts
            .lock()
            .unwrap()
            .push((text.to_string(), media_ids.to_vec()));
        if self.fail_post {
            return Err(PublishError::Api {
                endpoint: "tweets",
                status: StatusCode::UNAUTHORIZED,
                body: "unauthorized".to_string(),
            });
        }
        Ok("post-1".to_string())
    }
}
