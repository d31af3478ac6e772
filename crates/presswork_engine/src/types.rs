use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportEvent {
    PostConverted {
        index: usize,
        title: String,
    },
    PostFailed {
        index: usize,
        title: String,
        message: String,
    },
    ImageDownloaded {
        url: String,
    },
    ImageFailed {
        url: String,
        message: String,
    },
    AuthorWritten {
        login: String,
    },
}

/// Receives progress notifications while an export runs.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ExportEvent);
}

/// Default sink: forwards everything to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgressSink;

impl ProgressSink for LogProgressSink {
    fn emit(&self, event: ExportEvent) {
        match event {
            ExportEvent::PostConverted { index, title } => {
                log::info!("post {index}: converted {title:?}");
            }
            ExportEvent::PostFailed {
                index,
                title,
                message,
            } => {
                log::error!("post {index}: {title:?} failed: {message}");
            }
            ExportEvent::ImageDownloaded { url } => log::info!("downloaded {url}"),
            ExportEvent::ImageFailed { url, message } => {
                log::error!("image {url} failed: {message}");
            }
            ExportEvent::AuthorWritten { login } => log::info!("author {login} extracted"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// Image download counters for one run. Shared across download tasks and
/// read back as a snapshot once every task has joined; there is no other
/// mutable state shared between posts.
#[derive(Debug, Default)]
pub struct DownloadTally {
    total: AtomicUsize,
    downloaded: AtomicUsize,
    failed: AtomicUsize,
}

impl DownloadTally {
    pub fn add_expected(&self, count: usize) {
        self.total.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_success(&self) {
        self.downloaded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DownloadCounts {
        DownloadCounts {
            total: self.total.load(Ordering::Relaxed),
            downloaded: self.downloaded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadCounts {
    pub total: usize,
    pub downloaded: usize,
    pub failed: usize,
}

/// Final outcome of a run, reported after all downloads have joined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub posts_converted: usize,
    pub posts_failed: usize,
    pub authors_written: usize,
    pub images: DownloadCounts,
}
