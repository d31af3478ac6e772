//! Artifact writers: one `index.md` per post, one JSON file per author.

use std::path::{Path, PathBuf};

use presswork_core::{Author, Header};
use serde_json::json;

use crate::persist::{ensure_output_dir, post_dir_name, AtomicFileWriter, PersistError};

/// Render the front-matter block. Each defined field becomes a
/// `key: value` line; omitted fields are skipped entirely.
pub fn render_front_matter(header: &Header) -> String {
    let mut block = String::from("---\n");
    for (key, value) in header.fields() {
        if let Some(value) = value {
            block.push_str(key);
            block.push_str(": ");
            block.push_str(&value);
            block.push('\n');
        }
    }
    block.push_str("---\n\n");
    block
}

/// Write the post document into its own subdirectory of `dest` and return
/// the directory, so image downloads land next to the Markdown.
pub fn write_post(
    dest: &Path,
    post_id: &str,
    header: &Header,
    markdown: &str,
) -> Result<PathBuf, PersistError> {
    let dir_name = post_dir_name(header.slug.as_deref(), post_id);
    let post_dir = dest.join(dir_name);
    ensure_output_dir(&post_dir)?;

    let document = format!("{}{}\n", render_front_matter(header), markdown.trim_end());
    AtomicFileWriter::new(post_dir.clone()).write("index.md", &document)?;
    Ok(post_dir)
}

/// Write one author artifact named by the login's local part.
pub fn write_author(dest: &Path, author: &Author) -> Result<PathBuf, PersistError> {
    let local = author
        .login
        .split('@')
        .next()
        .unwrap_or(author.login.as_str());
    let artifact = json!({
        "author": author.display_name,
        "bio": serde_json::Value::Null,
        "picture": serde_json::Value::Null,
    });
    let body = serde_json::to_string_pretty(&artifact)?;
    AtomicFileWriter::new(dest.to_path_buf()).write(&format!("{local}.json"), &body)
}
