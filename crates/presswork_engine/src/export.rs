//! Export orchestration: the per-post conversion pipeline plus bounded
//! concurrent image downloads with a join point.

use std::path::PathBuf;
use std::sync::Arc;

use futures_util::StreamExt;

use presswork_core::{
    extract_images, normalize_shortcodes, resolve_header, resolve_thumbnail, rewrite_image_urls,
    Converter, ImageRef, Post, RuleBasedConverter,
};

use crate::fetch::{FetchSettings, ImageFetcher, ReqwestImageFetcher};
use crate::persist::AtomicFileWriter;
use crate::types::{
    DownloadTally, ExportEvent, ExportSummary, FetchError, LogProgressSink, ProgressSink,
};
use crate::writer::{write_author, write_post};
use crate::wxr::Channel;

#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub dest: PathBuf,
    pub authors_dest: PathBuf,
    /// Maximum number of image downloads in flight at once.
    pub concurrency: usize,
}

impl ExportSettings {
    pub fn new(dest: PathBuf) -> Self {
        let authors_dest = dest.join("authors");
        Self {
            dest,
            authors_dest,
            concurrency: 4,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

pub struct Exporter {
    converter: Box<dyn Converter>,
    fetcher: Arc<dyn ImageFetcher>,
    sink: Arc<dyn ProgressSink>,
}

impl Exporter {
    pub fn new(
        converter: Box<dyn Converter>,
        fetcher: Arc<dyn ImageFetcher>,
        sink: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            converter,
            fetcher,
            sink,
        }
    }

    /// Default wiring: rule-based converter, reqwest downloads, log sink.
    pub fn with_defaults(fetch: FetchSettings) -> Result<Self, FetchError> {
        Ok(Self::new(
            Box::new(RuleBasedConverter::new()),
            Arc::new(ReqwestImageFetcher::new(fetch)?),
            Arc::new(LogProgressSink),
        ))
    }

    /// Run the export on an internally owned runtime.
    pub fn run(
        &self,
        channel: &Channel,
        settings: &ExportSettings,
    ) -> Result<ExportSummary, ExportError> {
        let runtime = tokio::runtime::Runtime::new()?;
        Ok(runtime.block_on(self.run_async(channel, settings)))
    }

    /// Async variant for callers that already hold a runtime.
    pub async fn run_async(&self, channel: &Channel, settings: &ExportSettings) -> ExportSummary {
        let tally = DownloadTally::default();
        let mut downloads: Vec<(PathBuf, ImageRef)> = Vec::new();
        let mut posts_converted = 0;
        let mut posts_failed = 0;

        let publishable: Vec<&Post> = channel
            .posts
            .iter()
            .filter(|post| post.is_exportable())
            .collect();
        log::info!(
            "{} of {} items are published posts with categories",
            publishable.len(),
            channel.posts.len()
        );

        for (index, post) in publishable.iter().enumerate() {
            let number = index + 1;
            log::debug!("converting post {number}: {:?}", post.title);

            let normalized = normalize_shortcodes(&post.content);
            let mut images = extract_images(&normalized);
            let rewritten = rewrite_image_urls(&normalized, &images);
            let markdown = self.converter.to_markdown(&rewritten);

            let thumbnail = resolve_thumbnail(post, &channel.posts);
            if let Some(thumbnail) = &thumbnail {
                images.insert(0, thumbnail.clone());
            }
            let header = resolve_header(post, &channel.authors, thumbnail.as_ref());

            match write_post(&settings.dest, &post.id, &header, &markdown) {
                Ok(post_dir) => {
                    posts_converted += 1;
                    self.sink.emit(ExportEvent::PostConverted {
                        index: number,
                        title: post.title.clone(),
                    });
                    tally.add_expected(images.len());
                    downloads.extend(images.into_iter().map(|image| (post_dir.clone(), image)));
                }
                Err(err) => {
                    posts_failed += 1;
                    self.sink.emit(ExportEvent::PostFailed {
                        index: number,
                        title: post.title.clone(),
                        message: err.to_string(),
                    });
                }
            }
        }

        let mut authors_written = 0;
        for author in &channel.authors {
            match write_author(&settings.authors_dest, author) {
                Ok(_) => {
                    authors_written += 1;
                    self.sink.emit(ExportEvent::AuthorWritten {
                        login: author.login.clone(),
                    });
                }
                Err(err) => log::error!("author {:?} failed: {err}", author.login),
            }
        }

        // Bounded download pool with an explicit join point, so the final
        // counters are exact before the summary is returned. A failed
        // download never touches the already-written Markdown.
        let tally_ref = &tally;
        futures_util::stream::iter(downloads.into_iter().map(|(dir, image)| {
            let fetcher = Arc::clone(&self.fetcher);
            let sink = Arc::clone(&self.sink);
            async move {
                match fetcher.fetch(&image.url).await {
                    Ok(bytes) => {
                        match AtomicFileWriter::new(dir).write_bytes(&image.file_name, &bytes) {
                            Ok(_) => {
                                tally_ref.record_success();
                                sink.emit(ExportEvent::ImageDownloaded { url: image.url });
                            }
                            Err(err) => {
                                tally_ref.record_failure();
                                sink.emit(ExportEvent::ImageFailed {
                                    url: image.url,
                                    message: err.to_string(),
                                });
                            }
                        }
                    }
                    Err(err) => {
                        tally_ref.record_failure();
                        sink.emit(ExportEvent::ImageFailed {
                            url: image.url,
                            message: err.to_string(),
                        });
                    }
                }
            }
        }))
        .buffer_unordered(settings.concurrency.max(1))
        .collect::<Vec<()>>()
        .await;

        ExportSummary {
            posts_converted,
            posts_failed,
            authors_written,
            images: tally.snapshot(),
        }
    }
}
