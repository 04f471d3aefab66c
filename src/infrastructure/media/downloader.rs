//! Cache-aware materialization of remote files.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use super::file_store::FileStore;
use super::normalizer::{ImageNormalizer, NormalizedImage};
use crate::application::services::UrlRefresher;
use crate::domain::entities::{Attachment, Image};
use crate::domain::errors::IngestError;
use crate::domain::ports::ByteFetchPort;

/// A file that has to be fetched.
struct Miss {
    index: usize,
    key: String,
    name: String,
    url: String,
}

/// Downloads records that are not already on disk.
pub struct AttachmentDownloader {
    fetcher: Arc<dyn ByteFetchPort>,
    refresher: UrlRefresher,
}

impl AttachmentDownloader {
    /// Creates downloader.
    #[must_use]
    pub fn new(fetcher: Arc<dyn ByteFetchPort>, refresher: UrlRefresher) -> Self {
        Self { fetcher, refresher }
    }

    /// Makes every downloadable record available under `dir/{file_key}`.
    ///
    /// Files already present are reused without any network traffic. With
    /// `prune` set, files in `dir` that belong to no record are deleted
    /// first. All downloads run to completion even when one fails; the
    /// failure of the earliest record is returned.
    ///
    /// # Errors
    /// Returns `RefreshFailed` if stale links cannot be renewed and
    /// `DownloadFailed` if any fetch fails.
    pub async fn materialize(
        &self,
        records: &mut [Attachment],
        dir: &Path,
        prune: bool,
    ) -> Result<(), IngestError> {
        let store = FileStore::new(dir);
        if !records.is_empty() {
            store.ensure().await?;
        }

        if prune {
            let keep: HashSet<String> = records.iter().map(Attachment::file_key).collect();
            store.reconcile(&keep).await?;
        }

        let mut misses = Vec::new();
        for (index, record) in records.iter_mut().enumerate() {
            if !record.can_download() {
                continue;
            }
            let key = record.file_key();
            record.set_path(key.clone());

            if store.contains(&key).await {
                debug!(id = record.id(), key = %key, "Attachment already on disk");
                continue;
            }
            misses.push(Miss {
                index,
                key,
                name: record.name().to_string(),
                url: record.url().to_string(),
            });
        }

        let hits = records.iter().filter(|r| r.can_download()).count() - misses.len();
        info!(hits, misses = misses.len(), "Materializing attachments");

        let misses = self.renew(misses).await?;

        let mut tasks = JoinSet::new();
        for miss in misses {
            let fetcher = Arc::clone(&self.fetcher);
            let store = store.clone();
            tasks.spawn(async move {
                let result = fetch_into(&*fetcher, &store, &miss).await.map(|_| ());
                (miss.index, result)
            });
        }

        first_failure(&mut tasks, |_, ()| {}).await
    }

    /// Downloads and normalizes images into `processed_dir`.
    ///
    /// Existing processed files are reused and only have their dimensions
    /// read back. Raw downloads go through `staging_dir`, which is removed
    /// afterwards when empty. Images that cannot be decoded are logged and
    /// left without a path.
    ///
    /// # Errors
    /// Returns `RefreshFailed` or `DownloadFailed` on transport problems and
    /// `Io` if the processed directory cannot be managed.
    pub async fn process_images(
        &self,
        images: &mut [Image],
        staging_dir: &Path,
        processed_dir: &Path,
    ) -> Result<(), IngestError> {
        let staging = FileStore::new(staging_dir);
        let processed = FileStore::new(processed_dir);
        staging.ensure().await?;
        processed.ensure().await?;

        let keep: HashSet<String> = images.iter().map(Image::processed_key).collect();
        processed.reconcile(&keep).await?;

        let mut misses = Vec::new();
        for (index, image) in images.iter_mut().enumerate() {
            let key = image.processed_key();
            if processed.contains(&key).await {
                match read_dimensions(&processed, &key).await {
                    Some((width, height)) => {
                        image.set_processed(key, width, height);
                        continue;
                    }
                    None => processed.remove(&key).await,
                }
            }
            misses.push(Miss {
                index,
                key: image.download_key(),
                name: image.name().to_string(),
                url: image.url().to_string(),
            });
        }

        info!(
            cached = images.len() - misses.len(),
            misses = misses.len(),
            "Processing images"
        );

        let misses = self.renew(misses).await?;

        let mut tasks = JoinSet::new();
        for miss in misses {
            let fetcher = Arc::clone(&self.fetcher);
            let staging = staging.clone();
            let processed = processed.clone();
            let output_key = images[miss.index].processed_key();
            tasks.spawn(async move {
                let result = fetch_and_normalize(&*fetcher, &staging, &processed, &miss, output_key)
                    .await;
                (miss.index, result)
            });
        }

        let result = first_failure(&mut tasks, |index, outcome: Option<(String, u32, u32)>| {
            if let Some((key, width, height)) = outcome {
                images[index].set_processed(key, width, height);
            }
        })
        .await;

        staging.remove_dir_if_empty().await;
        result
    }

    /// Replaces the URLs of `misses` with renewed ones in a single batch.
    async fn renew(&self, mut misses: Vec<Miss>) -> Result<Vec<Miss>, IngestError> {
        if misses.is_empty() {
            return Ok(misses);
        }
        let urls: Vec<String> = misses.iter().map(|m| m.url.clone()).collect();
        let renewed = self.refresher.refresh(&urls).await?;
        for (miss, url) in misses.iter_mut().zip(renewed) {
            miss.url = url;
        }
        Ok(misses)
    }
}

async fn fetch_into(
    fetcher: &dyn ByteFetchPort,
    store: &FileStore,
    miss: &Miss,
) -> Result<bytes::Bytes, IngestError> {
    let bytes = fetcher.fetch_bytes(&miss.url).await.map_err(|e| {
        warn!(name = %miss.name, url = %miss.url, error = %e, "Download failed");
        IngestError::download_failed(&miss.name, &miss.url, e)
    })?;
    store.write_atomic(&miss.key, &bytes).await?;
    debug!(key = %miss.key, size = bytes.len(), "Downloaded file");
    Ok(bytes)
}

async fn fetch_and_normalize(
    fetcher: &dyn ByteFetchPort,
    staging: &FileStore,
    processed: &FileStore,
    miss: &Miss,
    output_key: String,
) -> Result<Option<(String, u32, u32)>, IngestError> {
    let bytes = fetch_into(fetcher, staging, miss).await?;

    let normalized = tokio::task::spawn_blocking(move || ImageNormalizer::normalize(&bytes))
        .await
        .map_err(|e| IngestError::task(e.to_string()))?;
    staging.remove(&miss.key).await;

    match normalized {
        Ok(NormalizedImage {
            bytes,
            width,
            height,
        }) => {
            processed.write_atomic(&output_key, &bytes).await?;
            Ok(Some((output_key, width, height)))
        }
        Err(e) => {
            warn!(name = %miss.name, error = %e, "Failed to process image");
            Ok(None)
        }
    }
}

async fn read_dimensions(store: &FileStore, key: &str) -> Option<(u32, u32)> {
    let path = store.path_for(key);
    match tokio::task::spawn_blocking(move || image::image_dimensions(path)).await {
        Ok(Ok(dimensions)) => Some(dimensions),
        Ok(Err(e)) => {
            warn!(key, error = %e, "Processed image unreadable, reprocessing");
            None
        }
        Err(e) => {
            error!(key, error = %e, "Dimension task panicked");
            None
        }
    }
}

/// Drains `tasks`, passing successes to `apply` and keeping the failure of
/// the lowest record index.
async fn first_failure<T: 'static>(
    tasks: &mut JoinSet<(usize, Result<T, IngestError>)>,
    mut apply: impl FnMut(usize, T),
) -> Result<(), IngestError> {
    let mut failure: Option<(usize, IngestError)> = None;

    while let Some(joined) = tasks.join_next().await {
        let (index, result) = match joined {
            Ok(pair) => pair,
            Err(e) => {
                error!(error = %e, "Download task panicked");
                (usize::MAX, Err(IngestError::task(e.to_string())))
            }
        };
        match result {
            Ok(value) => apply(index, value),
            Err(e) => {
                if failure.as_ref().is_none_or(|(current, _)| index < *current) {
                    failure = Some((index, e));
                }
            }
        }
    }

    match failure {
        Some((_, e)) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ContentType;
    use crate::domain::ports::mocks::{MockByteFetcher, MockUrlRefreshPort};
    use image::{DynamicImage, Rgb, RgbImage};
    use std::io::Cursor;
    use tempfile::TempDir;

    const FRESH: &str = "?ex=ffffffff&is=1&hm=2";

    fn cdn(name: &str) -> String {
        format!("https://cdn.discordapp.com/attachments/1/2/{name}{FRESH}")
    }

    fn record(id: &str, name: &str) -> Attachment {
        Attachment::new(id, name, ContentType::Discord, cdn(name)).with_can_download(true)
    }

    fn no_refresh() -> UrlRefresher {
        let mut port = MockUrlRefreshPort::new();
        port.expect_refresh_urls().times(0);
        UrlRefresher::new(Arc::new(port))
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([9, 9, 9])))
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[tokio::test]
    async fn test_second_run_makes_no_requests() {
        let dir = TempDir::new().unwrap();
        let fetcher = Arc::new(
            MockByteFetcher::new()
                .with_body(cdn("a.zip"), "zip-bytes")
                .with_body(cdn("b.litematic"), "nbt-bytes"),
        );
        let downloader = AttachmentDownloader::new(fetcher.clone(), no_refresh());

        let mut records = vec![record("1", "a.zip"), record("2", "b.litematic")];
        downloader
            .materialize(&mut records, dir.path(), true)
            .await
            .unwrap();
        assert_eq!(fetcher.calls(), 2);
        assert_eq!(records[0].path(), Some("1-a.zip"));
        assert_eq!(
            std::fs::read(dir.path().join("2-b.litematic")).unwrap(),
            b"nbt-bytes"
        );

        let snapshot = |name: &str| {
            let path = dir.path().join(name);
            let modified = std::fs::metadata(&path).unwrap().modified().unwrap();
            (std::fs::read(&path).unwrap(), modified)
        };
        let before = [snapshot("1-a.zip"), snapshot("2-b.litematic")];

        let mut again = vec![record("1", "a.zip"), record("2", "b.litematic")];
        downloader
            .materialize(&mut again, dir.path(), true)
            .await
            .unwrap();
        assert_eq!(fetcher.calls(), 2);
        assert_eq!(again[1].path(), Some("2-b.litematic"));
        assert_eq!([snapshot("1-a.zip"), snapshot("2-b.litematic")], before);
    }

    #[tokio::test]
    async fn test_links_are_not_downloaded() {
        let dir = TempDir::new().unwrap();
        let fetcher = Arc::new(MockByteFetcher::new());
        let downloader = AttachmentDownloader::new(fetcher.clone(), no_refresh());

        let mut records = vec![Attachment::new(
            "abc",
            "YouTube Video abc",
            ContentType::Youtube,
            "https://youtu.be/abc",
        )];
        downloader
            .materialize(&mut records, dir.path(), false)
            .await
            .unwrap();

        assert_eq!(fetcher.calls(), 0);
        assert_eq!(records[0].path(), None);
    }

    #[tokio::test]
    async fn test_prune_removes_files_of_other_records() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("9-old.zip"), b"old").unwrap();
        std::fs::write(dir.path().join("1-a.zip"), b"cached").unwrap();
        let fetcher = Arc::new(MockByteFetcher::new());
        let downloader = AttachmentDownloader::new(fetcher.clone(), no_refresh());

        let mut records = vec![record("1", "a.zip")];
        downloader
            .materialize(&mut records, dir.path(), true)
            .await
            .unwrap();

        assert!(!dir.path().join("9-old.zip").exists());
        assert_eq!(std::fs::read(dir.path().join("1-a.zip")).unwrap(), b"cached");
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_without_prune_foreign_files_survive() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("9-old.zip"), b"old").unwrap();
        let fetcher = Arc::new(MockByteFetcher::new().with_body(cdn("a.zip"), "new"));
        let downloader = AttachmentDownloader::new(fetcher, no_refresh());

        let mut records = vec![record("1", "a.zip")];
        downloader
            .materialize(&mut records, dir.path(), false)
            .await
            .unwrap();

        assert!(dir.path().join("9-old.zip").exists());
    }

    #[tokio::test]
    async fn test_only_misses_are_refreshed() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("1-hit.zip"), b"cached").unwrap();

        let stale_hit = "https://cdn.discordapp.com/attachments/1/2/hit.zip".to_string();
        let stale_miss = "https://cdn.discordapp.com/attachments/1/2/miss.zip".to_string();
        let renewed = format!("{stale_miss}{FRESH}");

        let mut port = MockUrlRefreshPort::new();
        let expected = stale_miss.clone();
        let renewed_for_port = renewed.clone();
        port.expect_refresh_urls()
            .withf(move |urls| urls == &vec![expected.clone()])
            .times(1)
            .returning(move |urls| {
                Ok(vec![crate::domain::ports::RefreshedUrl {
                    original: urls[0].clone(),
                    refreshed: renewed_for_port.clone(),
                }])
            });

        let fetcher = Arc::new(MockByteFetcher::new().with_body(renewed, "fresh"));
        let downloader =
            AttachmentDownloader::new(fetcher.clone(), UrlRefresher::new(Arc::new(port)));

        let mut records = vec![
            Attachment::new("1", "hit.zip", ContentType::Discord, stale_hit).with_can_download(true),
            Attachment::new("2", "miss.zip", ContentType::Discord, stale_miss)
                .with_can_download(true),
        ];
        downloader
            .materialize(&mut records, dir.path(), false)
            .await
            .unwrap();

        assert_eq!(fetcher.calls(), 1);
        assert_eq!(std::fs::read(dir.path().join("2-miss.zip")).unwrap(), b"fresh");
    }

    #[tokio::test]
    async fn test_failure_names_record_and_keeps_sibling_successes() {
        let dir = TempDir::new().unwrap();
        let fetcher = Arc::new(MockByteFetcher::new().with_body(cdn("ok.zip"), "ok"));
        let downloader = AttachmentDownloader::new(fetcher.clone(), no_refresh());

        let mut records = vec![
            record("1", "ok.zip"),
            record("2", "gone.litematic"),
            record("3", "also-gone.zip"),
        ];
        let err = downloader
            .materialize(&mut records, dir.path(), false)
            .await
            .unwrap_err();

        assert_eq!(fetcher.calls(), 3);
        match err {
            IngestError::DownloadFailed { name, .. } => assert_eq!(name, "gone.litematic"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(dir.path().join("1-ok.zip").exists());
        assert!(!dir.path().join("2-gone.litematic").exists());
    }

    #[tokio::test]
    async fn test_empty_batch_creates_nothing() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("attachments");
        let downloader = AttachmentDownloader::new(Arc::new(MockByteFetcher::new()), no_refresh());

        downloader.materialize(&mut [], &target, false).await.unwrap();

        assert!(!target.exists());
    }

    #[tokio::test]
    async fn test_process_images_normalizes_and_caches() {
        let dir = TempDir::new().unwrap();
        let staging = dir.path().join("staging");
        let processed = dir.path().join("processed");
        std::fs::create_dir(&processed).unwrap();
        std::fs::write(processed.join("7-stale.png"), b"old").unwrap();

        let fetcher = Arc::new(
            MockByteFetcher::new()
                .with_body(cdn("Big Shot.JPG"), png(1600, 1200))
                .with_body(cdn("broken.png"), "not an image"),
        );
        let downloader = AttachmentDownloader::new(fetcher.clone(), no_refresh());

        let mut images = vec![
            Image::new("1", "Big Shot.JPG", cdn("Big Shot.JPG")),
            Image::new("2", "broken.png", cdn("broken.png")),
        ];
        downloader
            .process_images(&mut images, &staging, &processed)
            .await
            .unwrap();

        assert_eq!(images[0].path(), Some("1-big%20shot.png"));
        assert_eq!(images[0].dimensions(), Some((800, 600)));
        assert_eq!(images[1].path(), None);
        assert!(!processed.join("7-stale.png").exists());
        assert!(!staging.exists());

        let mut again = vec![Image::new("1", "Big Shot.JPG", cdn("Big Shot.JPG"))];
        downloader
            .process_images(&mut again, &staging, &processed)
            .await
            .unwrap();
        assert_eq!(fetcher.calls(), 2);
        assert_eq!(again[0].dimensions(), Some((800, 600)));
    }

    #[tokio::test]
    async fn test_process_images_download_failure() {
        let dir = TempDir::new().unwrap();
        let downloader = AttachmentDownloader::new(Arc::new(MockByteFetcher::new()), no_refresh());

        let mut images = vec![Image::new("1", "a.png", cdn("a.png"))];
        let err = downloader
            .process_images(&mut images, &dir.path().join("s"), &dir.path().join("p"))
            .await
            .unwrap_err();

        assert!(matches!(err, IngestError::DownloadFailed { .. }));
        assert!(!dir.path().join("s").exists());
    }
}
