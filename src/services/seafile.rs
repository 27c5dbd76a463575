use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::{Body, Client, multipart};
use serde::Deserialize;
use tokio_util::io::ReaderStream;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::SeafileConfig;
use crate::error::{PipelineError, Result};
use crate::utils::progress::{Progress, format_ibytes};

/// Stage 3 seam: push a local file to the target service.
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Upload `path` into `parent_dir`, returning the service-side
    /// identifier. For Seafile this is the uploaded filename.
    async fn upload(&self, path: &Path, parent_dir: &str) -> Result<String>;
}

#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

#[derive(Deserialize)]
struct RepoResponse {
    repo_id: String,
}

/// Client for the Seafile web API (`/api2`).
pub struct SeafileClient {
    http: Client,
    url: String,
    token: String,
    repo_id: String,
}

impl SeafileClient {
    pub fn new(config: &SeafileConfig) -> Result<Self> {
        Ok(Self {
            http: build_http_client(config.insecure_tls)?,
            url: base_url(&config.url)?,
            token: config.token.clone(),
            repo_id: config.library_id.clone(),
        })
    }

    fn auth_header(&self) -> String {
        format!("Token {}", self.token)
    }

    /// Ask the server for a one-time upload URL into the library root.
    ///
    /// The body is a JSON-quoted URL; it is unquoted here and then used
    /// verbatim as the POST target.
    async fn upload_link(&self) -> Result<String> {
        let url = format!(
            "{}/api2/repos/{}/upload-link/?p=/&replace=1",
            self.url, self.repo_id
        );
        let body = self
            .http
            .get(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let link = unquote(&body);
        if link.is_empty() {
            return Err(PipelineError::Protocol(format!(
                "expecting upload link, got: {body:?}"
            )));
        }
        Ok(link.to_string())
    }

    /// Request a public share link for an already-uploaded file. Success is
    /// signaled by a `Location` header; the shareable URL is that location
    /// with `?dl=1` appended.
    pub async fn share_link(&self, remote_path: &str) -> Result<String> {
        let url = format!("{}/api2/repos/{}/file/shared-link/", self.url, self.repo_id);
        let resp = self
            .http
            .put(&url)
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json; indent=4")
            .form(&[("p", format!("/{}", remote_path.trim_start_matches('/')))])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(PipelineError::Protocol(format!(
                "share-link request returned {}",
                resp.status()
            )));
        }

        let location = resp
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty());
        match location {
            Some(location) => Ok(format!("{location}?dl=1")),
            None => Err(PipelineError::Protocol(
                "expecting Location header from seafile".to_string(),
            )),
        }
    }
}

#[async_trait]
impl Uploader for SeafileClient {
    async fn upload(&self, path: &Path, parent_dir: &str) -> Result<String> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                PipelineError::Io(std::io::Error::other(format!(
                    "not a usable filename: {}",
                    path.display()
                )))
            })?
            .to_string();

        let link = self.upload_link().await?;
        debug!("upload link: {}", link);

        let file = tokio::fs::File::open(path).await?;
        let total = file.metadata().await?.len();

        let progress = Arc::new(Progress::new(total));
        let counter = progress.clone();
        let stream =
            ReaderStream::new(file).inspect_ok(move |chunk| counter.advance(chunk.len() as u64));

        let part = multipart::Part::stream_with_length(Body::wrap_stream(stream), total)
            .file_name(filename.clone())
            .mime_str("application/octet-stream")?;
        let form = multipart::Form::new()
            .part("file", part)
            .text("filename", filename.clone())
            .text("parent_dir", parent_dir.to_string());

        let resp = self
            .http
            .post(&link)
            .header("Authorization", self.auth_header())
            .multipart(form)
            .send()
            .await;
        progress.finish();
        resp?.error_for_status()?;

        info!("Uploaded {} ({})", filename, format_ibytes(total));
        Ok(filename)
    }
}

/// Exchange a username/password (plus optional one-time 2FA code) for an
/// API token.
pub async fn acquire_token(
    url: &str,
    username: &str,
    password: &str,
    otp: Option<&str>,
    insecure_tls: bool,
) -> Result<String> {
    let http = build_http_client(insecure_tls)?;
    let mut req = http
        .post(format!("{}/api2/auth-token/", base_url(url)?))
        .form(&[("username", username), ("password", password)]);
    if let Some(otp) = otp {
        req = req.header("X-Seafile-Otp", otp);
    }

    let body = req.send().await?.error_for_status()?.text().await?;
    let parsed: TokenResponse = serde_json::from_str(&body)
        .map_err(|e| PipelineError::Protocol(format!("expecting token, got {body:?}: {e}")))?;
    Ok(parsed.token)
}

/// Create a named library and return its generated id.
pub async fn create_library(
    url: &str,
    token: &str,
    name: &str,
    desc: &str,
    insecure_tls: bool,
) -> Result<String> {
    let http = build_http_client(insecure_tls)?;
    let body = http
        .post(format!("{}/api2/repos/", base_url(url)?))
        .header("Authorization", format!("Token {token}"))
        .header("Accept", "application/json; indent=4")
        .form(&[("name", name), ("desc", desc)])
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    let parsed: RepoResponse = serde_json::from_str(&body)
        .map_err(|e| PipelineError::Protocol(format!("expecting repo_id, got {body:?}: {e}")))?;
    Ok(parsed.repo_id)
}

/// Some Seafile deployments sit behind self-signed certificates and serve
/// pre-compressed bodies that break on transparent decompression, so
/// decompression stays off and certificate checks are opt-out only.
fn build_http_client(insecure_tls: bool) -> Result<Client> {
    if insecure_tls {
        warn!("⚠️  TLS certificate verification disabled for the Seafile connection");
    }
    let client = Client::builder()
        .danger_accept_invalid_certs(insecure_tls)
        .no_gzip()
        .no_brotli()
        .no_deflate()
        .connect_timeout(Duration::from_secs(30))
        .build()?;
    Ok(client)
}

/// Validate the server URL and normalize away a trailing slash.
fn base_url(url: &str) -> Result<String> {
    Url::parse(url)?;
    Ok(url.trim_end_matches('/').to_string())
}

/// Strip the JSON quoting from a bare-string response body.
fn unquote(s: &str) -> &str {
    s.trim().trim_matches('"')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unquote() {
        assert_eq!(
            unquote("\"https://host/upload/xyz\""),
            "https://host/upload/xyz"
        );
        assert_eq!(unquote("https://host/upload/xyz"), "https://host/upload/xyz");
        assert_eq!(unquote("  \"x\"\n"), "x");
        assert_eq!(unquote("\"\""), "");
    }

    #[test]
    fn test_base_url_normalization() {
        assert_eq!(
            base_url("https://seafile.example.com/").unwrap(),
            "https://seafile.example.com"
        );
        assert_eq!(
            base_url("https://seafile.example.com").unwrap(),
            "https://seafile.example.com"
        );
        assert!(matches!(
            base_url("not a url"),
            Err(PipelineError::UrlParse(_))
        ));
    }
}
