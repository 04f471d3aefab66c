use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, eyre};
use futures_util::future::join_all;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use submission_ingest::application::services::UrlRefresher;
use submission_ingest::application::{
    CollectAttachmentsUseCase, ProcessAttachmentsUseCase, ProcessImagesUseCase,
    RenderGalleryUseCase,
};
use submission_ingest::domain::entities::{
    Attachment, AttachmentMetadata, BotToken, ChannelId, Image,
};
use submission_ingest::domain::services::{LayoutMode, file_key};
use submission_ingest::infrastructure::{
    AppConfig, AttachmentAnalyzer, AttachmentDownloader, CliArgs, Command, DiscordRestClient,
    NoEmbedClient, VersionTable,
};

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = &config.log_path {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .init();
    }

    Ok(())
}

fn timeout(config: &AppConfig) -> Duration {
    Duration::from_secs(config.discord.timeout_secs)
}

fn build_analyzer(config: &AppConfig) -> Result<AttachmentAnalyzer> {
    let versions = match &config.analysis.version_table {
        Some(path) => VersionTable::with_overrides(path)
            .wrap_err_with(|| format!("Failed to load version table {}", path.display()))?,
        None => VersionTable::builtin(),
    };
    let video = NoEmbedClient::new(&config.analysis.noembed_endpoint, timeout(config))?;

    Ok(AttachmentAnalyzer::new(Arc::new(versions), Arc::new(video)))
}

#[derive(Serialize)]
struct CollectReport {
    attachments: Vec<Attachment>,
    images: Vec<Image>,
}

async fn collect(config: &AppConfig, token: Option<String>, channel: u64, prune: bool) -> Result<()> {
    let token = token
        .and_then(BotToken::new)
        .ok_or_else(|| eyre!("A valid bot token is required (--token or DISCORD_BOT_TOKEN)"))?;
    let client = Arc::new(DiscordRestClient::with_base_url(
        token,
        &config.discord.api_base,
        timeout(config),
    )?);

    let records = CollectAttachmentsUseCase::new(client.clone(), &config.discord.system_author_id)
        .execute(ChannelId(channel))
        .await?;

    let (pictures, mut attachments): (Vec<Attachment>, Vec<Attachment>) =
        records.into_iter().partition(Attachment::is_image);
    let mut images: Vec<Image> = pictures.iter().map(Image::from).collect();

    let downloader = Arc::new(AttachmentDownloader::new(
        client.clone(),
        UrlRefresher::new(client),
    ));

    ProcessAttachmentsUseCase::new(Arc::clone(&downloader), Arc::new(build_analyzer(config)?))
        .execute(&mut attachments, &config.media.attachments_dir, prune)
        .await?;

    ProcessImagesUseCase::new(
        downloader,
        &config.media.download_dir,
        &config.media.processed_dir,
    )
    .execute(&mut images)
    .await?;

    let report = CollectReport {
        attachments,
        images,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn analyze(config: &AppConfig, files: Vec<PathBuf>) -> Result<()> {
    let analyzer = build_analyzer(config)?;

    let results = join_all(files.iter().map(|file| analyzer.analyze_file(file))).await;

    let mut report: BTreeMap<String, Option<AttachmentMetadata>> = BTreeMap::new();
    for (file, metadata) in files.iter().zip(results) {
        if metadata.is_none() {
            warn!(path = %file.display(), "No analyzer produced metadata");
        }
        report.insert(file.display().to_string(), metadata);
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn gallery(config: &AppConfig, images: Vec<PathBuf>, full: bool) -> Result<()> {
    let mode = if full {
        LayoutMode::Full
    } else {
        config.media.gallery_mode
    };

    let rendered = RenderGalleryUseCase::new(mode).execute(&images).await;
    if rendered.is_empty() {
        return Err(eyre!("None of the {} images could be rendered", images.len()));
    }

    for path in rendered {
        println!("{}", path.display());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    let args = CliArgs::parse();
    let mut config = AppConfig::load(args.config.as_deref())?;
    config.merge_with_args(&args);

    init_logging(&config)?;

    info!(version = submission_ingest::VERSION, "Starting {}", submission_ingest::NAME);

    match args.command {
        Command::Collect { channel, no_prune } => {
            collect(&config, args.token, channel, !no_prune).await
        }
        Command::Analyze { files } => analyze(&config, files).await,
        Command::Gallery { images, full } => gallery(&config, images, full).await,
        Command::Key { id, name, ext } => {
            println!("{}", file_key(&id, &name, ext.as_deref()));
            Ok(())
        }
    }
}
