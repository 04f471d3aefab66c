//! Dispatches records to the analyzer matching their format.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use super::litematic::read_litematic;
use super::version_table::VersionTable;
use super::world_save::read_world_save;
use crate::domain::entities::{Attachment, AttachmentMetadata, ContentType};
use crate::domain::ports::VideoMetadataPort;

enum Job {
    Litematic(PathBuf),
    WorldSave(PathBuf),
    Video(String),
}

impl Job {
    fn for_path(path: PathBuf, extension: Option<&str>) -> Option<Self> {
        match extension? {
            "litematic" => Some(Self::Litematic(path)),
            "zip" => Some(Self::WorldSave(path)),
            _ => None,
        }
    }

    fn for_record(record: &Attachment, dir: &Path) -> Option<Self> {
        if record.can_download() {
            let path = dir.join(record.path()?);
            Self::for_path(path, record.extension().as_deref())
        } else if record.content_type() == ContentType::Youtube {
            Some(Self::Video(record.url().to_string()))
        } else {
            None
        }
    }
}

/// Fills in format metadata for materialized records and video links.
///
/// Analysis is best effort: format problems are recorded as `Failed`
/// metadata and lookup failures leave the field unset.
pub struct AttachmentAnalyzer {
    versions: Arc<VersionTable>,
    video: Arc<dyn VideoMetadataPort>,
}

impl AttachmentAnalyzer {
    /// Creates analyzer.
    #[must_use]
    pub fn new(versions: Arc<VersionTable>, video: Arc<dyn VideoMetadataPort>) -> Self {
        Self { versions, video }
    }

    /// Analyzes every record concurrently and waits for all of them.
    ///
    /// Downloaded records are resolved against `dir`.
    pub async fn analyze(&self, records: &mut [Attachment], dir: &Path) {
        let mut tasks = JoinSet::new();

        for (index, record) in records.iter().enumerate() {
            let Some(job) = Job::for_record(record, dir) else {
                continue;
            };
            let versions = Arc::clone(&self.versions);
            let video = Arc::clone(&self.video);
            tasks.spawn(async move { (index, run(job, versions, video).await) });
        }

        let mut analyzed = 0usize;
        while let Some(result) = tasks.join_next().await {
            match result {
                Ok((index, Some(metadata))) => {
                    if let Some(error) = metadata.error() {
                        warn!(id = records[index].id(), error, "Attachment analysis failed");
                    }
                    records[index].set_metadata(metadata);
                    analyzed += 1;
                }
                Ok((_, None)) => {}
                Err(e) => error!(error = %e, "Analysis task panicked"),
            }
        }

        info!(total = records.len(), analyzed, "Attachment analysis complete");
    }

    /// Analyzes a local file by its extension.
    pub async fn analyze_file(&self, path: &Path) -> Option<AttachmentMetadata> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase);
        let job = Job::for_path(path.to_path_buf(), extension.as_deref())?;

        run(job, Arc::clone(&self.versions), Arc::clone(&self.video)).await
    }
}

async fn run(
    job: Job,
    versions: Arc<VersionTable>,
    video: Arc<dyn VideoMetadataPort>,
) -> Option<AttachmentMetadata> {
    match job {
        Job::Litematic(path) => {
            debug!(path = %path.display(), "Analyzing litematic");
            tokio::task::spawn_blocking(move || read_litematic(&path, &versions))
                .await
                .inspect_err(|e| error!(error = %e, "Litematic task failed"))
                .ok()
                .map(AttachmentMetadata::Litematic)
        }
        Job::WorldSave(path) => {
            debug!(path = %path.display(), "Analyzing world archive");
            tokio::task::spawn_blocking(move || read_world_save(&path))
                .await
                .inspect_err(|e| error!(error = %e, "World archive task failed"))
                .ok()
                .flatten()
                .map(AttachmentMetadata::WorldSave)
        }
        Job::Video(url) => match video.fetch_video_metadata(&url).await {
            Ok(meta) => Some(AttachmentMetadata::Video(meta)),
            Err(e) => {
                warn!(url = %url, error = %e, "Failed to fetch video details");
                None
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{LitematicMeta, VideoMeta, WorldSaveMeta};
    use crate::domain::errors::TransportError;
    use crate::domain::ports::mocks::MockVideoMetadataPort;
    use crate::infrastructure::nbt::writer::{gzip, write_named};
    use crate::infrastructure::nbt::{Compound, Tag};
    use std::io::Write;
    use tempfile::TempDir;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    fn video_meta(title: &str) -> VideoMeta {
        VideoMeta {
            title: title.to_string(),
            author_name: "Builder".to_string(),
            author_url: String::new(),
            thumbnail_url: String::new(),
            thumbnail_width: 480,
            thumbnail_height: 360,
            width: 200,
            height: 113,
        }
    }

    fn downloaded(dir: &TempDir, id: &str, name: &str, content: &[u8]) -> Attachment {
        let mut record = Attachment::new(id, name, ContentType::Discord, "https://cdn.example/x")
            .with_can_download(true);
        let key = record.file_key();
        std::fs::write(dir.path().join(&key), content).unwrap();
        record.set_path(key);
        record
    }

    fn world_zip() -> Vec<u8> {
        let level = Tag::Compound(Compound::from([(
            "Data".to_string(),
            Tag::Compound(Compound::from([(
                "Version".to_string(),
                Tag::Compound(Compound::from([(
                    "Name".to_string(),
                    Tag::String("1.20.4".to_string()),
                )])),
            )])),
        )]));

        let mut writer = ZipWriter::new(std::io::Cursor::new(Vec::new()));
        writer
            .start_file("world/level.dat", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(&gzip(&write_named("", &level))).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[tokio::test]
    async fn test_dispatches_by_format() {
        let dir = TempDir::new().unwrap();
        let mut video = MockVideoMetadataPort::new();
        video
            .expect_fetch_video_metadata()
            .withf(|url| url == "https://youtu.be/abc")
            .times(1)
            .returning(|_| Ok(video_meta("Ultimate Farm")));

        let mut records = vec![
            downloaded(&dir, "1", "farm.litematic", b"garbage"),
            downloaded(&dir, "2", "world.zip", &world_zip()),
            downloaded(&dir, "3", "notes.txt", b"plain"),
            Attachment::new("abc", "YouTube Video abc", ContentType::Youtube, "https://youtu.be/abc"),
            Attachment::new("mf", "build.zip", ContentType::Mediafire, "https://www.mediafire.com/file/mf/build.zip/file"),
        ];

        let analyzer = AttachmentAnalyzer::new(Arc::new(VersionTable::builtin()), Arc::new(video));
        analyzer.analyze(&mut records, dir.path()).await;

        assert!(matches!(
            records[0].metadata(),
            Some(AttachmentMetadata::Litematic(LitematicMeta::Failed { .. }))
        ));
        assert_eq!(
            records[1].metadata(),
            Some(&AttachmentMetadata::WorldSave(WorldSaveMeta::Parsed {
                version: "1.20.4".to_string()
            }))
        );
        assert_eq!(records[2].metadata(), None);
        assert_eq!(
            records[3].metadata(),
            Some(&AttachmentMetadata::Video(video_meta("Ultimate Farm")))
        );
        assert_eq!(records[4].metadata(), None);
    }

    #[tokio::test]
    async fn test_video_failure_leaves_metadata_unset() {
        let mut video = MockVideoMetadataPort::new();
        video
            .expect_fetch_video_metadata()
            .returning(|_| Err(TransportError::status(500, "HTTP 500")));

        let mut records = vec![Attachment::new(
            "abc",
            "YouTube Video abc",
            ContentType::Youtube,
            "https://youtu.be/abc",
        )];

        let analyzer = AttachmentAnalyzer::new(Arc::new(VersionTable::builtin()), Arc::new(video));
        analyzer.analyze(&mut records, Path::new("/unused")).await;

        assert_eq!(records[0].metadata(), None);
    }

    #[tokio::test]
    async fn test_undownloaded_records_are_skipped() {
        let mut video = MockVideoMetadataPort::new();
        video.expect_fetch_video_metadata().times(0);

        let mut records = vec![
            Attachment::new("1", "farm.litematic", ContentType::Discord, "https://x")
                .with_can_download(true),
        ];

        let analyzer = AttachmentAnalyzer::new(Arc::new(VersionTable::builtin()), Arc::new(video));
        analyzer.analyze(&mut records, Path::new("/unused")).await;

        assert_eq!(records[0].metadata(), None);
    }

    #[tokio::test]
    async fn test_analyze_local_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("World.ZIP");
        std::fs::write(&path, world_zip()).unwrap();

        let analyzer = AttachmentAnalyzer::new(
            Arc::new(VersionTable::builtin()),
            Arc::new(MockVideoMetadataPort::new()),
        );

        assert!(matches!(
            analyzer.analyze_file(&path).await,
            Some(AttachmentMetadata::WorldSave(WorldSaveMeta::Parsed { .. }))
        ));
        assert_eq!(analyzer.analyze_file(&dir.path().join("a.png")).await, None);
    }
}
