//! Streaming parser for WordPress eXtended RSS exports.
//!
//! Only the channel children the converter consumes are modeled; anything
//! else in the document is skipped without error. Field text arrives as a
//! mix of plain text, CDATA sections and entity references, all of which
//! are folded into the same buffer.

use quick_xml::events::Event;
use quick_xml::Reader;

use presswork_core::{Author, Category, MetaEntry, Post};

/// Channel-level contents of one export: every item plus the author roster.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Channel {
    pub posts: Vec<Post>,
    pub authors: Vec<Author>,
}

#[derive(Debug, thiserror::Error)]
pub enum WxrError {
    #[error("malformed export xml: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("export has no rss channel")]
    MissingChannel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    PostId,
    Status,
    PostName,
    AttachmentUrl,
    Creator,
    PubDate,
    Content,
    Excerpt,
    Category,
    MetaKey,
    MetaValue,
    AuthorLogin,
    AuthorDisplayName,
}

#[derive(Default)]
struct WxrParser {
    channel: Channel,
    saw_channel: bool,
    item: Option<Post>,
    author: Option<Author>,
    postmeta: Option<MetaEntry>,
    field: Option<Field>,
    text: String,
    category_nicename: String,
}

/// Parse a decoded export document into the typed channel model.
pub fn parse_wxr(xml: &str) -> Result<Channel, WxrError> {
    // Text around entity references arrives as separate events, so field
    // text is trimmed once on commit rather than per event.
    let mut reader = Reader::from_str(xml);

    let mut parser = WxrParser::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => parser.handle_start(e.name().as_ref(), || {
                e.attributes()
                    .flatten()
                    .find(|attr| attr.key.as_ref() == b"nicename")
                    .map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
            }),
            Ok(Event::Text(e)) => parser.handle_text(&String::from_utf8_lossy(e.as_ref())),
            Ok(Event::CData(e)) => {
                parser.handle_text(&String::from_utf8_lossy(&e.into_inner()));
            }
            Ok(Event::GeneralRef(e)) => {
                if let Some(resolved) = resolve_entity(&String::from_utf8_lossy(e.as_ref())) {
                    parser.handle_text(&resolved);
                }
            }
            Ok(Event::End(e)) => parser.handle_end(e.name().as_ref()),
            Ok(Event::Eof) => break,
            Err(e) => return Err(WxrError::Xml(e)),
            _ => {}
        }
    }

    if !parser.saw_channel {
        return Err(WxrError::MissingChannel);
    }
    Ok(parser.channel)
}

impl WxrParser {
    fn handle_start<F>(&mut self, name: &[u8], nicename_attr: F)
    where
        F: FnOnce() -> Option<String>,
    {
        match name {
            b"channel" => self.saw_channel = true,
            b"item" => self.item = Some(Post::default()),
            b"wp:author" => self.author = Some(Author::default()),
            b"wp:postmeta" if self.item.is_some() => {
                self.postmeta = Some(MetaEntry::default());
            }
            b"category" if self.item.is_some() => {
                self.category_nicename = nicename_attr().unwrap_or_default();
                self.begin_field(Field::Category);
            }
            b"wp:meta_key" if self.postmeta.is_some() => self.begin_field(Field::MetaKey),
            b"wp:meta_value" if self.postmeta.is_some() => self.begin_field(Field::MetaValue),
            b"wp:author_login" if self.author.is_some() => self.begin_field(Field::AuthorLogin),
            b"wp:author_display_name" if self.author.is_some() => {
                self.begin_field(Field::AuthorDisplayName);
            }
            _ if self.item.is_some() && self.postmeta.is_none() => {
                let field = match name {
                    b"title" => Some(Field::Title),
                    b"wp:post_id" => Some(Field::PostId),
                    b"wp:status" => Some(Field::Status),
                    b"wp:post_name" => Some(Field::PostName),
                    b"wp:attachment_url" => Some(Field::AttachmentUrl),
                    b"dc:creator" => Some(Field::Creator),
                    b"pubDate" => Some(Field::PubDate),
                    b"content:encoded" => Some(Field::Content),
                    b"excerpt:encoded" => Some(Field::Excerpt),
                    _ => None,
                };
                if let Some(field) = field {
                    self.begin_field(field);
                }
            }
            _ => {}
        }
    }

    fn begin_field(&mut self, field: Field) {
        self.field = Some(field);
        self.text.clear();
    }

    fn handle_text(&mut self, text: &str) {
        if self.field.is_some() {
            self.text.push_str(text);
        }
    }

    fn handle_end(&mut self, name: &[u8]) {
        match name {
            b"item" => {
                if let Some(post) = self.item.take() {
                    self.channel.posts.push(post);
                }
            }
            b"wp:author" => {
                if let Some(author) = self.author.take() {
                    self.channel.authors.push(author);
                }
            }
            b"wp:postmeta" => {
                if let Some(meta) = self.postmeta.take() {
                    if let Some(post) = self.item.as_mut() {
                        post.meta.push(meta);
                    }
                }
            }
            _ => {
                if let Some(field) = self.field.take() {
                    let value = std::mem::take(&mut self.text);
                    self.commit_field(field, value.trim().to_string());
                }
            }
        }
    }

    fn commit_field(&mut self, field: Field, value: String) {
        match field {
            Field::MetaKey => {
                if let Some(meta) = self.postmeta.as_mut() {
                    meta.key = value;
                }
                return;
            }
            Field::MetaValue => {
                if let Some(meta) = self.postmeta.as_mut() {
                    meta.value = value;
                }
                return;
            }
            Field::AuthorLogin => {
                if let Some(author) = self.author.as_mut() {
                    author.login = value;
                }
                return;
            }
            Field::AuthorDisplayName => {
                if let Some(author) = self.author.as_mut() {
                    author.display_name = value;
                }
                return;
            }
            _ => {}
        }

        let Some(post) = self.item.as_mut() else {
            return;
        };
        match field {
            Field::Title => post.title = value,
            Field::PostId => post.id = value,
            Field::Status => post.status = value,
            Field::PostName => post.slug = non_empty(value),
            Field::AttachmentUrl => post.attachment_url = non_empty(value),
            Field::Creator => post.creator = value,
            Field::PubDate => post.pub_date = value,
            Field::Content => post.content = value,
            Field::Excerpt => post.excerpt = non_empty(value),
            Field::Category => post.categories.push(Category {
                name: value,
                nicename: std::mem::take(&mut self.category_nicename),
            }),
            _ => {}
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn resolve_entity(entity: &str) -> Option<String> {
    match entity {
        "apos" => return Some("'".to_string()),
        "quot" => return Some("\"".to_string()),
        "lt" => return Some("<".to_string()),
        "gt" => return Some(">".to_string()),
        "amp" => return Some("&".to_string()),
        _ => {}
    }

    if let Some(hex) = entity.strip_prefix("#x") {
        if let Ok(code) = u32::from_str_radix(hex, 16) {
            return char::from_u32(code).map(|c| c.to_string());
        }
        return None;
    }
    if let Some(dec) = entity.strip_prefix('#') {
        if let Ok(code) = dec.parse::<u32>() {
            return char::from_u32(code).map(|c| c.to_string());
        }
    }
    None
}
