#![doc = "GitHub Releases store: bridges the core ReleaseStore trait to the GitHub REST API."]
//
//! # GitHub Releases client
//!
//! [`GithubReleaseClient`] implements [`ReleaseStore`] for the assets attached
//! to a release of one repository.
//!
//! - Construct it with [`GithubReleaseClient::new_from_env`] (`GITHUB_TOKEN`,
//!   falling back to `GH_TOKEN`; a `.env` file is honoured).
//! - `list_assets` pages through every asset of the release.
//! - `upload` deletes an existing asset of the same name first when asked to
//!   clobber, then posts the file to the release's upload URL.
//!
//! All transport and HTTP status errors are turned into boxed errors carrying
//! the status code and response body.

use async_trait::async_trait;
use hub_sync_core::contract::{ReleaseAsset, ReleaseStore, StoreError};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use std::env;
use std::path::Path;
use std::time::Duration;

use crate::load_config::GithubSection;

const ASSETS_PER_PAGE: usize = 100;
const API_VERSION: &str = "2022-11-28";

#[derive(Debug, Deserialize)]
struct GithubRelease {
    id: u64,
    /// RFC 6570 template, e.g. `https://uploads.github.com/.../assets{?name,label}`.
    upload_url: String,
}

#[derive(Debug, Deserialize)]
struct GithubAsset {
    id: u64,
    name: String,
    size: u64,
}

pub struct GithubReleaseClient {
    http: Client,
    api_url: String,
    repository: String,
    token: String,
}

impl GithubReleaseClient {
    pub fn new(
        api_url: &str,
        repository: &str,
        token: String,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("hub-sync/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(GithubReleaseClient {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            repository: repository.to_string(),
            token,
        })
    }

    pub fn new_from_env(github: &GithubSection, timeout: Duration) -> Result<Self, StoreError> {
        dotenvy::dotenv().ok(); // loads environment variables from .env if present
        let token = match env::var("GITHUB_TOKEN").or_else(|_| env::var("GH_TOKEN")) {
            Ok(token) => token,
            Err(e) => {
                tracing::error!(error = ?e, "GITHUB_TOKEN (or GH_TOKEN) missing in environment");
                return Err(Box::new(e));
            }
        };
        tracing::info!(
            repository = %github.repository,
            api_url = %github.api_url,
            token_set = !token.is_empty(),
            "Initialized GithubReleaseClient from environment"
        );
        Self::new(&github.api_url, &github.repository, token, timeout)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    async fn release_by_tag(&self, tag: &str) -> Result<GithubRelease, StoreError> {
        let url = format!(
            "{}/repos/{}/releases/tags/{}",
            self.api_url, self.repository, tag
        );
        let response = check(self.request(Method::GET, &url).send().await?).await?;
        Ok(response.json::<GithubRelease>().await?)
    }

    async fn release_assets(&self, release_id: u64) -> Result<Vec<GithubAsset>, StoreError> {
        let url = format!(
            "{}/repos/{}/releases/{}/assets",
            self.api_url, self.repository, release_id
        );
        let mut assets = Vec::new();
        let mut page = 1usize;
        loop {
            let response = check(
                self.request(Method::GET, &url)
                    .query(&[("per_page", ASSETS_PER_PAGE), ("page", page)])
                    .send()
                    .await?,
            )
            .await?;
            let batch: Vec<GithubAsset> = response.json().await?;
            let last_page = batch.len() < ASSETS_PER_PAGE;
            assets.extend(batch);
            if last_page {
                return Ok(assets);
            }
            page += 1;
        }
    }

    async fn delete_asset(&self, asset: &GithubAsset) -> Result<(), StoreError> {
        tracing::info!(asset = %asset.name, asset_id = asset.id, "Deleting existing release asset");
        let url = format!(
            "{}/repos/{}/releases/assets/{}",
            self.api_url, self.repository, asset.id
        );
        check(self.request(Method::DELETE, &url).send().await?).await?;
        Ok(())
    }
}

#[async_trait]
impl ReleaseStore for GithubReleaseClient {
    async fn list_assets(&self, release_tag: &str) -> Result<Vec<ReleaseAsset>, StoreError> {
        tracing::info!(repository = %self.repository, release_tag, "Listing release assets");
        let release = self.release_by_tag(release_tag).await?;
        let assets = self.release_assets(release.id).await?;
        tracing::info!(count = assets.len(), "Fetched all assets of release");
        Ok(assets
            .into_iter()
            .map(|asset| ReleaseAsset {
                name: asset.name,
                size: asset.size,
            })
            .collect())
    }

    async fn upload(
        &self,
        release_tag: &str,
        file: &Path,
        clobber: bool,
    ) -> Result<(), StoreError> {
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| format!("{} has no file name", file.display()))?;

        let release = self.release_by_tag(release_tag).await?;
        let existing = self.release_assets(release.id).await?;
        if let Some(asset) = existing.iter().find(|a| a.name == file_name) {
            if !clobber {
                return Err(format!("asset {file_name} already exists on {release_tag}").into());
            }
            self.delete_asset(asset).await?;
        }

        let body = tokio::fs::read(file).await?;
        let upload_url = release
            .upload_url
            .split('{')
            .next()
            .unwrap_or(&release.upload_url)
            .to_string();
        tracing::info!(
            asset = %file_name,
            bytes = body.len(),
            release_tag,
            "Uploading release asset"
        );
        check(
            self.request(Method::POST, &upload_url)
                .query(&[("name", file_name.as_str())])
                .header(CONTENT_TYPE, "application/octet-stream")
                .body(body)
                .send()
                .await?,
        )
        .await?;
        tracing::info!(asset = %file_name, "Successfully uploaded release asset");
        Ok(())
    }
}

/// Turn a non-success response into an error carrying status and body.
async fn check(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    tracing::error!(%status, %url, body = %body, "GitHub API request failed");
    Err(format!("GitHub API returned {status} for {url}: {body}").into())
}
