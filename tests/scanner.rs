mod common;

use common::{MockSource, example, page, url};
use favicon::{CancellationToken, Candidate, Dimension, Scanner};
use futures::StreamExt;

fn found(candidates: &[Candidate]) -> Vec<(&str, Dimension)> {
    candidates
        .iter()
        .map(|c| (c.location.as_str(), c.expected_size))
        .collect()
}

#[tokio::test]
async fn test_no_links_yields_only_the_well_known_icon() {
    let source = MockSource::new().add_text("http://www.example.com/", &page(""));
    let scanner = Scanner::new(source);

    let candidates = scanner.scan(example()).await;
    assert_eq!(
        found(&candidates),
        vec![("http://www.example.com/favicon.ico", Dimension::square(16))]
    );
    assert_eq!(scanner.source().request_count(), 1);
}

#[tokio::test]
async fn test_missing_page_yields_only_the_well_known_icon() {
    let scanner = Scanner::new(MockSource::new());

    let candidates = scanner.scan(url("http://www.example.com/some/page")).await;
    assert_eq!(
        found(&candidates),
        vec![("http://www.example.com/favicon.ico", Dimension::square(16))]
    );
}

#[tokio::test]
async fn test_sizes_are_kept_in_written_order() {
    let source = MockSource::new().add_text(
        "http://www.example.com/",
        &page("<link rel='icon' href='/icon.png' sizes='16x16 32x32'>"),
    );
    let scanner = Scanner::new(source);

    let candidates = scanner.scan(example()).await;
    assert_eq!(
        found(&candidates),
        vec![
            ("http://www.example.com/icon.png", Dimension::square(16)),
            ("http://www.example.com/icon.png", Dimension::square(32)),
            ("http://www.example.com/favicon.ico", Dimension::square(16)),
        ]
    );
}

#[tokio::test]
async fn test_multiple_links() {
    let source = MockSource::new().add_text(
        "http://www.example.com/",
        &page(
            "<link rel='shortcut icon' href='/favicon.ico'>
             <link rel='apple-touch-icon' href='/apple-touch-icon.png'>
             <link rel='icon' type='image/png' href='/favicon-32x32.png' sizes='32x32'>
             <link rel='stylesheet' href='/style.css'>",
        ),
    );
    let scanner = Scanner::new(source);

    let candidates = scanner.scan(example()).await;
    assert_eq!(
        found(&candidates),
        vec![
            ("http://www.example.com/favicon.ico", Dimension::square(16)),
            ("http://www.example.com/apple-touch-icon.png", Dimension::square(57)),
            ("http://www.example.com/favicon-32x32.png", Dimension::square(32)),
            ("http://www.example.com/favicon.ico", Dimension::square(16)),
        ]
    );
}

#[tokio::test]
async fn test_invalid_address_is_dropped() {
    let source = MockSource::new().add_text(
        "http://www.example.com/",
        &page(
            "<link rel='icon' href='///invalid' sizes='16x16'>
             <link rel='icon' href='/valid.png' sizes='16x16'>",
        ),
    );
    let scanner = Scanner::new(source);

    let candidates = scanner.scan(example()).await;
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].location.as_str(), "http://www.example.com/valid.png");
}

#[tokio::test]
async fn test_manifest_is_scanned_after_the_page() {
    let source = MockSource::new()
        .add_text(
            "http://www.example.com/",
            &page(
                "<link rel='manifest' href='/site.webmanifest'>
                 <link rel='icon' href='/favicon-16x16.png'>",
            ),
        )
        .add_text(
            "http://www.example.com/site.webmanifest",
            r#"{"icons": [
                {"src": "/android-chrome-192x192.png", "sizes": "192x192"},
                {"src": "///invalid.png", "sizes": "512x512"},
                {"src": "/android-chrome-512x512.png", "sizes": "512x512"}
            ]}"#,
        );
    let scanner = Scanner::new(source);

    let candidates = scanner.scan(example()).await;
    assert_eq!(
        found(&candidates),
        vec![
            ("http://www.example.com/favicon-16x16.png", Dimension::square(16)),
            ("http://www.example.com/android-chrome-192x192.png", Dimension::square(192)),
            ("http://www.example.com/android-chrome-512x512.png", Dimension::square(512)),
            ("http://www.example.com/favicon.ico", Dimension::square(16)),
        ]
    );
    assert_eq!(scanner.source().request_count(), 2);
}

#[tokio::test]
async fn test_browserconfig_is_scanned_after_the_page() {
    let source = MockSource::new()
        .add_text(
            "http://www.example.com/",
            &page("<meta name='msapplication-config' content='/browserconfig.xml'>"),
        )
        .add_text(
            "http://www.example.com/browserconfig.xml",
            "<browserconfig><msapplication><tile>
                <square70x70logo src='/mstile-70x70.png'/>
                <wide310x150logo src='/mstile-310x150.png'/>
            </tile></msapplication></browserconfig>",
        );
    let scanner = Scanner::new(source);

    let candidates = scanner.scan(example()).await;
    assert_eq!(
        found(&candidates),
        vec![
            ("http://www.example.com/mstile-70x70.png", Dimension::square(70)),
            ("http://www.example.com/mstile-310x150.png", Dimension::new(310, 150)),
            ("http://www.example.com/favicon.ico", Dimension::square(16)),
        ]
    );
}

#[tokio::test]
async fn test_scan_count_is_bounded() {
    let source = MockSource::new()
        .add_text(
            "http://www.example.com/",
            &page(
                "<link rel='manifest' href='/manifest.json'>
                 <meta name='msapplication-config' content='/browserconfig.xml'>",
            ),
        )
        .add_text(
            "http://www.example.com/manifest.json",
            r#"{"icons": [{"src": "/a.png", "sizes": "48x48"}]}"#,
        )
        .add_text(
            "http://www.example.com/browserconfig.xml",
            "<tile><square150x150logo src='/b.png'/></tile>",
        );
    let scanner = Scanner::new(source).with_max_scans(2);

    let candidates = scanner.scan(example()).await;
    assert_eq!(
        found(&candidates),
        vec![("http://www.example.com/a.png", Dimension::square(48))]
    );
    assert_eq!(scanner.source().request_count(), 2);
}

#[tokio::test]
async fn test_stream_is_lazy() {
    let source = MockSource::new()
        .add_text(
            "http://www.example.com/",
            &page(
                "<link rel='icon' href='/icon.png' sizes='16x16'>
                 <link rel='manifest' href='/manifest.json'>",
            ),
        )
        .add_text("http://www.example.com/manifest.json", r#"{"icons": []}"#);
    let scanner = Scanner::new(source);
    let cancel = CancellationToken::new();

    let mut stream = std::pin::pin!(scanner.scan_stream(example(), &cancel));
    let first = stream.next().await.unwrap();
    assert_eq!(first.location.as_str(), "http://www.example.com/icon.png");
    assert_eq!(scanner.source().request_count(), 1);

    let rest = stream.collect::<Vec<_>>().await;
    assert_eq!(rest.len(), 1);
    assert_eq!(scanner.source().request_count(), 2);
}

#[tokio::test]
async fn test_cancelled_scan_does_nothing() {
    let source = MockSource::new().add_text(
        "http://www.example.com/",
        &page("<link rel='icon' href='/icon.png'>"),
    );
    let scanner = Scanner::new(source);

    let cancel = CancellationToken::new();
    cancel.cancel();

    let candidates = scanner.scan_with_cancel(example(), &cancel).await;
    assert!(candidates.is_empty());
    assert_eq!(scanner.source().request_count(), 0);
}

#[tokio::test]
async fn test_cancelled_between_scans() {
    let source = MockSource::new()
        .add_text(
            "http://www.example.com/",
            &page(
                "<link rel='manifest' href='/manifest.json'>
                 <link rel='icon' href='/icon.png' sizes='32x32'>",
            ),
        )
        .add_text(
            "http://www.example.com/manifest.json",
            r#"{"icons": [{"src": "/a.png", "sizes": "48x48"}]}"#,
        )
        .cancel_after(1);
    let scanner = Scanner::new(source);

    let cancel = CancellationToken::new();
    let candidates = scanner.scan_with_cancel(example(), &cancel).await;

    // what the page already found is still handed out, nothing after it.
    assert_eq!(
        found(&candidates),
        vec![("http://www.example.com/icon.png", Dimension::square(32))]
    );
    assert!(cancel.is_cancelled());
    assert_eq!(scanner.source().request_count(), 1);
}

#[tokio::test]
async fn test_repeated_suggestions_are_scanned_once() {
    let source = MockSource::new()
        .add_text(
            "http://www.example.com/",
            &page(
                "<link rel='manifest' href='/site.webmanifest'>
                 <meta rel='manifest' href='/site.webmanifest'>
                 <meta name='msapplication-config' content='/browserconfig.xml'>",
            ),
        )
        .add_text(
            "http://www.example.com/site.webmanifest",
            r#"{"icons": [{"src": "/a.png", "sizes": "48x48"}]}"#,
        );
    let scanner = Scanner::new(source);

    let candidates = scanner.scan(example()).await;
    assert_eq!(
        found(&candidates),
        vec![
            ("http://www.example.com/a.png", Dimension::square(48)),
            ("http://www.example.com/favicon.ico", Dimension::square(16)),
        ]
    );
    // the page, the manifest and the missing browserconfig.xml.
    assert_eq!(scanner.source().request_count(), 3);
}
