use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::fs;
use std::path::PathBuf;

/// Durable object storage for the published document. A put overwrites any
/// prior object at the same key wholesale.
#[async_trait]
pub trait StorageSink: Send + Sync {
    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>, content_type: &str) -> Result<()>;
}

/// PUTs objects to an S3-compatible HTTP gateway at `endpoint/bucket/key`.
pub struct HttpSink {
    http: Client,
    endpoint: String,
}

impl HttpSink {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .build()
            .context("failed to build storage client")?;
        Ok(Self {
            http,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl StorageSink for HttpSink {
    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>, content_type: &str) -> Result<()> {
        let url = format!("{}/{}/{}", self.endpoint, bucket, key);
        let response = self
            .http
            .put(&url)
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await
            .with_context(|| format!("PUT {url} failed"))?;
        response
            .error_for_status()
            .with_context(|| format!("PUT {url} returned error"))?;
        Ok(())
    }
}

/// Writes objects under `root/bucket/key` on the local filesystem. Used by
/// the export command and in tests.
pub struct FileSink {
    root: PathBuf,
}

impl FileSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl StorageSink for FileSink {
    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>, _content_type: &str) -> Result<()> {
        let path = self.root.join(bucket).join(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&path, body).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}
