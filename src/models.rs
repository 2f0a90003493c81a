/*!
 * Model files kept on disk.
 *
 * Each configured asset is downloaded once, when it is missing, and never
 * refreshed afterwards. Downloads go to a temporary file inside the model
 * directory and are renamed into place once complete.
 */

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use reqwest::Client;
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::app_config::{ModelAsset, ModelsConfig};
use crate::errors::ModelError;

/// Model directory and the assets expected in it
#[derive(Debug)]
pub struct ModelStore {
    dir: PathBuf,
    assets: Vec<ModelAsset>,
    client: Client,
    show_progress: bool,
}

impl ModelStore {
    pub fn new(dir: impl Into<PathBuf>, assets: Vec<ModelAsset>) -> Self {
        Self {
            dir: dir.into(),
            assets,
            client: Client::new(),
            show_progress: false,
        }
    }

    pub fn from_config(config: &ModelsConfig) -> Self {
        Self::new(&config.dir, config.assets.clone())
    }

    /// Draw a progress bar for downloads with a known length
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn asset_path(&self, asset: &ModelAsset) -> PathBuf {
        self.dir.join(&asset.file)
    }

    /// Assets not yet present on disk
    pub fn missing_assets(&self) -> Vec<&ModelAsset> {
        self.assets
            .iter()
            .filter(|asset| !self.asset_path(asset).is_file())
            .collect()
    }

    /// Download every missing asset that has a URL.
    ///
    /// Returns the paths written. Missing assets without a URL are skipped;
    /// their consumers decide how to cope.
    pub async fn ensure_assets(&self) -> Result<Vec<PathBuf>, ModelError> {
        let mut downloaded = Vec::new();
        for asset in self.missing_assets() {
            match &asset.url {
                Some(url) => {
                    std::fs::create_dir_all(&self.dir)?;
                    downloaded.push(self.download(asset, url).await?);
                }
                None => debug!("Model asset {} is missing and has no download URL", asset.name),
            }
        }
        Ok(downloaded)
    }

    async fn download(&self, asset: &ModelAsset, url: &str) -> Result<PathBuf, ModelError> {
        let target = self.asset_path(asset);
        info!("Downloading {} from {}", asset.name, url);

        let download_error = |message: String| ModelError::Download {
            name: asset.name.clone(),
            url: url.to_string(),
            message,
        };

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| download_error(e.to_string()))?;
        if !response.status().is_success() {
            return Err(download_error(format!("server answered {}", response.status())));
        }

        let progress = self.progress_bar(response.content_length(), &asset.name);
        let mut temp = tempfile::Builder::new()
            .prefix(".download-")
            .tempfile_in(&self.dir)?;
        let mut hasher = Sha256::new();

        while let Some(chunk) = response.chunk().await.map_err(|e| download_error(e.to_string()))? {
            temp.write_all(&chunk)?;
            hasher.update(&chunk);
            if let Some(bar) = &progress {
                bar.inc(chunk.len() as u64);
            }
        }
        temp.flush()?;
        if let Some(bar) = progress {
            bar.finish_and_clear();
        }

        let actual = format!("{:x}", hasher.finalize());
        if let Some(expected) = &asset.sha256 {
            if !expected.eq_ignore_ascii_case(&actual) {
                // Dropping the temp file deletes it
                return Err(ModelError::Checksum {
                    name: asset.name.clone(),
                    expected: expected.clone(),
                    actual,
                });
            }
        }

        temp.persist(&target).map_err(|e| ModelError::Io(e.error))?;
        info!("Saved {} to {:?} (sha256 {})", asset.name, target, actual);
        Ok(target)
    }

    fn progress_bar(&self, length: Option<u64>, name: &str) -> Option<ProgressBar> {
        let length = length.filter(|_| self.show_progress)?;
        let bar = ProgressBar::new(length);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style.progress_chars("#>-"));
        bar.set_message(name.to_string());
        Some(bar)
    }
}
