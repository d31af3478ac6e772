//! Presswork engine: WXR input, IO pipeline and artifact writing.
mod decode;
mod export;
mod fetch;
mod persist;
mod types;
mod writer;
mod wxr;

pub use decode::{decode_export, DecodeError, DecodedXml};
pub use export::{ExportError, ExportSettings, Exporter};
pub use fetch::{FetchSettings, ImageFetcher, ReqwestImageFetcher};
pub use persist::{ensure_output_dir, post_dir_name, AtomicFileWriter, PersistError};
pub use types::{
    DownloadCounts, DownloadTally, ExportEvent, ExportSummary, FailureKind, FetchError,
    LogProgressSink, ProgressSink,
};
pub use writer::{render_front_matter, write_author, write_post};
pub use wxr::{parse_wxr, Channel, WxrError};
