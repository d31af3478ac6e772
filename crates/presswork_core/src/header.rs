//! Front-matter field resolution.
//!
//! Every field is derived from the post itself plus two read-only lookup
//! tables built once per run: the author roster and the full post list
//! (for `_thumbnail_id` attachment cross-references). Missing inputs
//! resolve to defaults or omitted fields; nothing in here returns an error.

use chrono::{DateTime, SecondsFormat};

use crate::images::ImageRef;
use crate::post::{Author, Category, Post};

const META_THUMBNAIL_ID: &str = "_thumbnail_id";
const META_SEO_TITLE: &str = "_yoast_wpseo_title";
const META_SEO_DESCRIPTION: &str = "_yoast_wpseo_metadesc";
const META_SEO_KEYWORDS: &str = "_yoast_wpseo_focuskw";

/// The resolved front-matter record for one post. Computed once, written
/// out, then discarded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    pub title: String,
    pub thumbnail: Option<String>,
    pub author: String,
    pub date: String,
    pub categories: String,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub meta_title: String,
    pub seo_description: String,
    pub seo_keywords: String,
}

impl Header {
    /// Fields in emission order. `None` values are skipped entirely by the
    /// front-matter writer.
    pub fn fields(&self) -> Vec<(&'static str, Option<String>)> {
        vec![
            ("title", Some(self.title.clone())),
            ("thumbnail", self.thumbnail.clone()),
            ("author", Some(self.author.clone())),
            ("date", Some(self.date.clone())),
            ("categories", Some(self.categories.clone())),
            ("slug", self.slug.clone()),
            ("excerpt", self.excerpt.clone()),
            ("meta_title", Some(self.meta_title.clone())),
            ("seo_description", Some(self.seo_description.clone())),
            ("seo_keywords", Some(self.seo_keywords.clone())),
        ]
    }
}

/// Escape embedded double quotes for emission inside a quoted scalar.
pub fn escape_quotes(value: &str) -> String {
    value.replace('"', "\\\"")
}

fn quoted(value: &str) -> String {
    format!("\"{}\"", escape_quotes(value))
}

/// Resolve the `_thumbnail_id` meta value against the full post list.
///
/// Absent id, unknown id, and an attachment without a URL all resolve to
/// `None`; none of these conditions is an error.
pub fn resolve_thumbnail(post: &Post, posts: &[Post]) -> Option<ImageRef> {
    let thumbnail_id = post.meta_value(META_THUMBNAIL_ID)?;
    if thumbnail_id.is_empty() {
        return None;
    }
    let Some(attachment) = posts.iter().find(|candidate| candidate.id == thumbnail_id) else {
        log::debug!("thumbnail id {thumbnail_id} matches no post, skipping");
        return None;
    };
    let Some(url) = attachment.attachment_url.as_deref() else {
        log::debug!("thumbnail post {thumbnail_id} has no attachment url, skipping");
        return None;
    };
    Some(ImageRef::from_url(url))
}

/// Map a creator login to a display name. Unknown logins keep the raw
/// login rather than dropping the post.
pub fn resolve_author(login: &str, roster: &[Author]) -> String {
    match roster.iter().find(|author| author.login == login) {
        Some(author) => author.display_name.clone(),
        None => {
            log::warn!("creator {login:?} is not in the author roster, keeping login");
            login.to_string()
        }
    }
}

fn resolve_date(pub_date: &str) -> String {
    match DateTime::parse_from_rfc2822(pub_date) {
        Ok(date) => date.to_rfc3339_opts(SecondsFormat::Secs, false),
        Err(err) => {
            log::warn!("unparseable pubDate {pub_date:?}: {err}");
            pub_date.to_string()
        }
    }
}

fn render_categories(categories: &[Category]) -> String {
    let mut rendered = String::from("[");
    for (index, category) in categories.iter().enumerate() {
        if index > 0 {
            rendered.push(' ');
        }
        rendered.push('"');
        rendered.push_str(&escape_quotes(&category.name));
        rendered.push('"');
    }
    rendered.push(']');
    rendered
}

/// Derive the header record for one post.
///
/// `thumbnail` is the already-resolved attachment reference, if any; the
/// caller also prepends it to the download list.
pub fn resolve_header(post: &Post, roster: &[Author], thumbnail: Option<&ImageRef>) -> Header {
    Header {
        title: quoted(&post.title),
        thumbnail: thumbnail.map(|image| image.url.clone()),
        author: resolve_author(&post.creator, roster),
        date: resolve_date(&post.pub_date),
        categories: render_categories(&post.categories),
        slug: post.slug.clone().filter(|slug| !slug.is_empty()),
        excerpt: post
            .excerpt
            .as_deref()
            .filter(|excerpt| !excerpt.is_empty())
            .map(quoted),
        meta_title: quoted(post.meta_value_or(META_SEO_TITLE, &post.title)),
        seo_description: quoted(post.meta_value_or(META_SEO_DESCRIPTION, "")),
        seo_keywords: quoted(post.meta_value_or(META_SEO_KEYWORDS, "")),
    }
}
