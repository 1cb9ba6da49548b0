//! Database downloader module
//!
//! Fetches the QQwry file from remote mirrors. The decoder never touches the
//! network; this module only runs at startup or on explicit update.

use crate::config::AppConfig;
use crate::error::{IpdbError, Result};
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

// Constants
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Database downloader
///
/// Streams into a temporary file next to the destination and renames it
/// into place, so readers (including memory maps) of the previous file never
/// observe a partial write.
pub struct Downloader {
    client: reqwest::Client,
    show_progress: bool,
}

impl Downloader {
    /// Create a new downloader
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!("ipservice/{}", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| IpdbError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            show_progress: true,
        })
    }

    /// Enable or disable the terminal progress bar
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Download `url` and atomically replace `dest` with it
    pub async fn download_file(&self, url: &str, dest: &Path) -> Result<()> {
        log::info!("Downloading from: {}", url);
        log::info!("Saving to: {:?}", dest);

        let dir = match dest.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| IpdbError::network(format!("Failed to send request: {}", e)))?;

        if !response.status().is_success() {
            return Err(IpdbError::download(format!(
                "HTTP error: {} - {}",
                response.status(),
                url
            )));
        }

        let pb = match response.content_length() {
            Some(total) if self.show_progress => Some(progress_bar(total, url)),
            _ => None,
        };

        let mut tmp = NamedTempFile::new_in(dir)?;
        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk
                .map_err(|e| IpdbError::network(format!("Failed to read chunk: {}", e)))?;
            tmp.write_all(&chunk)?;

            downloaded += chunk.len() as u64;
            if let Some(ref pb) = pb {
                pb.set_position(downloaded);
            }
        }

        if downloaded == 0 {
            return Err(IpdbError::download(format!("Empty response body - {}", url)));
        }

        tmp.as_file().sync_all()?;
        tmp.persist(dest).map_err(|e| IpdbError::Io(e.error))?;

        if let Some(pb) = pb {
            pb.finish_with_message(format!("Downloaded {} bytes", downloaded));
        }

        log::info!("Successfully downloaded {} bytes to: {:?}", downloaded, dest);
        Ok(())
    }

    /// Try each configured mirror in order until one succeeds
    pub async fn update(&self, config: &AppConfig) -> Result<()> {
        let urls = &config.database.download_urls;
        if urls.is_empty() {
            return Err(IpdbError::config(
                "No download URL configured, set IP_API_QQWRY_URL or place the file manually",
            ));
        }

        let mut last_error = None;
        for url in urls {
            match self.download_file(url, &config.database.path).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    log::warn!("Failed to download from {}: {}", url, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| IpdbError::download("All mirrors failed")))
    }
}

/// Make sure the configured database file exists, fetching it if allowed
pub async fn ensure_database_file(config: &AppConfig) -> Result<()> {
    let db_path = &config.database.path;
    match std::fs::metadata(db_path) {
        Ok(_) => return Ok(()),
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => return Err(IpdbError::Io(e)),
        Err(_) => {}
    }

    if !config.database.auto_fetch {
        return Err(IpdbError::config(format!(
            "qqwry.dat not found at {:?} and auto fetch is disabled",
            db_path
        )));
    }

    log::warn!("Database file not found: {:?}, attempting to download...", db_path);
    Downloader::new()?
        .with_progress(atty::is(atty::Stream::Stderr))
        .update(config)
        .await
}

fn progress_bar(total: u64, url: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb.set_message(format!(
        "Downloading {}",
        url.rsplit('/').next().unwrap_or("qqwry.dat")
    ));
    pb
}
