//! Image discovery and URL rewriting for a post body.

use scraper::{Html, Selector};

/// One image found in a post body, plus the local file name it will be
/// downloaded to. Records are created fresh per post and never outlive it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageRef {
    pub url: String,
    pub file_name: String,
    /// Remaining attributes of the source element, in document order.
    pub attrs: Vec<(String, String)>,
}

impl ImageRef {
    /// Build a reference straight from a URL, e.g. a thumbnail attachment.
    pub fn from_url(url: &str) -> Self {
        Self {
            url: url.to_string(),
            file_name: derive_file_name(url),
            attrs: Vec::new(),
        }
    }
}

/// Last path segment of the URL with any query suffix stripped.
pub fn derive_file_name(url: &str) -> String {
    let tail = match url.rfind('/') {
        Some(idx) => &url[idx + 1..],
        None => url,
    };
    match tail.find('?') {
        Some(idx) => tail[..idx].to_string(),
        None => tail.to_string(),
    }
}

/// Collect one record per `<img>` element with a non-empty `src`, in
/// document order. Elements without a source are skipped silently.
pub fn extract_images(html: &str) -> Vec<ImageRef> {
    let fragment = Html::parse_fragment(html);
    let Ok(selector) = Selector::parse("img") else {
        return Vec::new();
    };

    let mut images = Vec::new();
    for element in fragment.select(&selector) {
        let Some(src) = element.value().attr("src") else {
            continue;
        };
        if src.is_empty() {
            continue;
        }
        let attrs = element
            .value()
            .attrs()
            .filter(|(name, _)| *name != "src")
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        images.push(ImageRef {
            url: src.to_string(),
            file_name: derive_file_name(src),
            attrs,
        });
    }
    images
}

/// Replace every literal occurrence of each image URL with its local
/// `./<file_name>` path. Exact string match; no URL normalization, so the
/// same image under a different encoding is left alone.
pub fn rewrite_image_urls(html: &str, images: &[ImageRef]) -> String {
    let mut rewritten = html.to_string();
    for image in images {
        let local = format!("./{}", image.file_name);
        rewritten = rewritten.replace(&image.url, &local);
    }
    rewritten
}
