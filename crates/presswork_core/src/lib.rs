//! Presswork core: pure WordPress-export-to-Markdown content transformation.
mod header;
mod images;
mod markdown;
mod post;
mod shortcode;

pub use header::{
    escape_quotes, resolve_author, resolve_header, resolve_thumbnail, Header,
};
pub use images::{derive_file_name, extract_images, rewrite_image_urls, ImageRef};
pub use markdown::{Converter, RuleBasedConverter};
pub use post::{Author, Category, MetaEntry, Post};
pub use shortcode::normalize_shortcodes;
