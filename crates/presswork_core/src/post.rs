//! Typed model of a parsed WordPress export.

/// A `category` element attached to a post: display name plus machine slug.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub nicename: String,
}

/// One `wp:postmeta` key/value entry. Keys are not unique per post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaEntry {
    pub key: String,
    pub value: String,
}

/// One `wp:author` roster entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Author {
    pub login: String,
    pub display_name: String,
}

/// A single `rss/channel/item` from the export.
///
/// Attachment items carry `attachment_url` and are cross-referenced by
/// `_thumbnail_id` meta values on regular posts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Post {
    pub id: String,
    pub status: String,
    pub title: String,
    /// Raw `content:encoded` HTML.
    pub content: String,
    pub excerpt: Option<String>,
    /// `dc:creator` login.
    pub creator: String,
    /// `pubDate` as found in the export (RFC 2822).
    pub pub_date: String,
    /// `wp:post_name`, the URL-safe slug.
    pub slug: Option<String>,
    pub categories: Vec<Category>,
    pub meta: Vec<MetaEntry>,
    pub attachment_url: Option<String>,
}

impl Post {
    /// First-match meta lookup in storage order.
    pub fn meta_value(&self, key: &str) -> Option<&str> {
        self.meta
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.value.as_str())
    }

    /// Meta lookup with a caller-supplied default for absent keys.
    pub fn meta_value_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.meta_value(key).unwrap_or(default)
    }

    /// Only published items with at least one category are exported.
    pub fn is_exportable(&self) -> bool {
        !self.categories.is_empty() && self.status == "publish"
    }
}
