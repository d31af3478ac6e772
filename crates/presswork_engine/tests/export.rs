use std::fs;
use std::sync::{Arc, Mutex};

use presswork_core::{Category, Post, RuleBasedConverter};
use presswork_engine::{
    parse_wxr, ExportEvent, ExportSettings, Exporter, FetchSettings, ProgressSink,
    ReqwestImageFetcher,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct TestSink {
    events: Mutex<Vec<ExportEvent>>,
}

impl ProgressSink for TestSink {
    fn emit(&self, event: ExportEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn sample_wxr(image_url: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"
    xmlns:content="http://purl.org/rss/1.0/modules/content/"
    xmlns:excerpt="http://wordpress.org/export/1.2/excerpt/"
    xmlns:dc="http://purl.org/dc/elements/1.1/"
    xmlns:wp="http://wordpress.org/export/1.2/">
<channel>
    <title>My Blog</title>
    <wp:author>
        <wp:author_login><![CDATA[jane@example.com]]></wp:author_login>
        <wp:author_display_name><![CDATA[Jane Doe]]></wp:author_display_name>
    </wp:author>
    <item>
        <title>Hello &amp; Welcome</title>
        <dc:creator><![CDATA[jane@example.com]]></dc:creator>
        <pubDate>Tue, 05 Mar 2019 10:30:00 +0000</pubDate>
        <category domain="category" nicename="tech"><![CDATA[Tech]]></category>
        <content:encoded><![CDATA[<p>Hello <img src="{image_url}"/></p>]]></content:encoded>
        <wp:post_id>7</wp:post_id>
        <wp:status><![CDATA[publish]]></wp:status>
        <wp:post_name><![CDATA[hello-welcome]]></wp:post_name>
        <wp:postmeta>
            <wp:meta_key><![CDATA[_yoast_wpseo_metadesc]]></wp:meta_key>
            <wp:meta_value><![CDATA[desc]]></wp:meta_value>
        </wp:postmeta>
    </item>
    <item>
        <title>uncategorized draft</title>
        <wp:post_id>8</wp:post_id>
        <wp:status><![CDATA[publish]]></wp:status>
    </item>
</channel>
</rss>
"#
    )
}

fn exporter(sink: Arc<TestSink>) -> Exporter {
    Exporter::new(
        Box::new(RuleBasedConverter::new()),
        Arc::new(ReqwestImageFetcher::new(FetchSettings::default()).expect("client builds")),
        sink,
    )
}

#[tokio::test]
async fn end_to_end_export_writes_post_images_and_authors() {
    engine_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/x/y.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"img".to_vec()))
        .mount(&server)
        .await;

    let image_url = format!("{}/x/y.png", server.uri());
    let channel = parse_wxr(&sample_wxr(&image_url)).expect("sample parses");

    let temp = TempDir::new().unwrap();
    let settings = ExportSettings {
        dest: temp.path().join("out"),
        authors_dest: temp.path().join("authors"),
        concurrency: 2,
    };

    let sink = Arc::new(TestSink::default());
    let summary = exporter(sink.clone()).run_async(&channel, &settings).await;

    assert_eq!(summary.posts_converted, 1);
    assert_eq!(summary.posts_failed, 0);
    assert_eq!(summary.authors_written, 1);
    assert_eq!(summary.images.total, 1);
    assert_eq!(summary.images.downloaded, 1);
    assert_eq!(summary.images.failed, 0);

    let document = fs::read_to_string(settings.dest.join("hello-welcome/index.md")).unwrap();
    assert!(document.contains("title: \"Hello & Welcome\""));
    assert!(document.contains("author: Jane Doe"));
    assert!(document.contains("date: 2019-03-05T10:30:00+00:00"));
    assert!(document.contains("categories: [\"Tech\"]"));
    assert!(document.contains("slug: hello-welcome"));
    assert!(document.contains("seo_description: \"desc\""));
    assert!(document.ends_with("Hello ![](./y.png)\n"));

    let image = fs::read(settings.dest.join("hello-welcome/y.png")).unwrap();
    assert_eq!(image, b"img");

    assert!(settings.authors_dest.join("jane.json").is_file());

    // The category-less item is excluded from processing entirely.
    let entries: Vec<_> = fs::read_dir(&settings.dest).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[tokio::test]
async fn failed_downloads_leave_the_markdown_intact() {
    let server = MockServer::start().await;
    // No mock mounted: every download 404s.

    let image_url = format!("{}/x/y.png", server.uri());
    let channel = parse_wxr(&sample_wxr(&image_url)).expect("sample parses");

    let temp = TempDir::new().unwrap();
    let settings = ExportSettings {
        dest: temp.path().join("out"),
        authors_dest: temp.path().join("authors"),
        concurrency: 2,
    };

    let sink = Arc::new(TestSink::default());
    let summary = exporter(sink.clone()).run_async(&channel, &settings).await;

    assert_eq!(summary.posts_converted, 1);
    assert_eq!(summary.images.total, 1);
    assert_eq!(summary.images.downloaded, 0);
    assert_eq!(summary.images.failed, 1);

    assert!(settings.dest.join("hello-welcome/index.md").is_file());
    assert!(!settings.dest.join("hello-welcome/y.png").exists());

    let events = sink.events.lock().unwrap();
    assert!(events
        .iter()
        .any(|event| matches!(event, ExportEvent::ImageFailed { .. })));
}

#[test]
fn sync_run_owns_its_runtime() {
    let channel = presswork_engine::Channel {
        posts: vec![Post {
            id: "1".to_string(),
            status: "publish".to_string(),
            title: "No images".to_string(),
            content: "<p>text only</p>".to_string(),
            pub_date: "Tue, 05 Mar 2019 10:30:00 +0000".to_string(),
            slug: Some("no-images".to_string()),
            categories: vec![Category {
                name: "Tech".to_string(),
                nicename: "tech".to_string(),
            }],
            ..Post::default()
        }],
        authors: Vec::new(),
    };

    let temp = TempDir::new().unwrap();
    let settings = ExportSettings::new(temp.path().join("out"));

    let exporter = Exporter::with_defaults(FetchSettings::default()).expect("client builds");
    let summary = exporter.run(&channel, &settings).expect("run succeeds");

    assert_eq!(summary.posts_converted, 1);
    assert_eq!(summary.images.total, 0);
    let document = fs::read_to_string(settings.dest.join("no-images/index.md")).unwrap();
    assert!(document.contains("text only"));
}
