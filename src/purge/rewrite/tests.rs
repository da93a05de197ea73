use super::*;
use crate::purge::{
    LightningReducer, MemorySink, Payload, ReduceError, ReduceOptions, ResponseInterceptor,
    extract_style,
};

/// Same shape as a typical AMP page served by a dev server.
fn doc(head: &str, body: &str) -> String {
    format!(
        "\n    <!doctype html>\n    <head>\n      {head}\n    </head>\n    <html>\n      <body>\n        {body}\n      </body>\n    </html>\n  "
    )
}

fn purify(html: &str, options: PurgeOptions) -> (MemorySink, Outcome) {
    let mut sink = MemorySink::new();
    let outcome = ResponseInterceptor::new(&mut sink, options)
        .finish(html.to_string(), ())
        .unwrap();
    (sink, outcome)
}

fn amp_css(sink: &MemorySink) -> String {
    let body = sink.body();
    extract_style(&body).unwrap().to_string()
}

#[test]
fn test_strips_unused_css() {
    let html = doc(
        "<style amp-custom>.yes { background: green; } .no { background: red; }</style>",
        "<div class=\"yes\" />",
    );
    let (sink, outcome) = purify(&html, PurgeOptions::default());

    assert!(outcome.is_purified());
    assert_eq!(amp_css(&sink), ".yes{background:green}");
}

#[test]
fn test_no_minify() {
    let html = doc(
        "<style amp-custom>.yes { background: green; }</style>",
        "<div class=\"yes\" />",
    );
    let (sink, _) = purify(&html, PurgeOptions::default().with_minify(false));

    assert_eq!(amp_css(&sink), ".yes {\n  background: green;\n}");
}

#[test]
fn test_whitelisted_selectors_kept() {
    let html = doc("<style amp-custom>.no { background: red; }</style>", "");
    let (sink, _) = purify(&html, PurgeOptions::default().with_whitelist([".no"]));

    assert_eq!(amp_css(&sink), ".no{background:red}");
}

#[test]
fn test_angle_bracket_in_css() {
    let css = ".a::after { content: \"<\"; } .no { color: red; }";
    let html = doc(&format!("<style amp-custom>{css}</style>"), "<div class=\"a\"></div>");
    let (sink, outcome) = purify(&html, PurgeOptions::default());

    let purified = amp_css(&sink);
    assert!(purified.contains("content:\"<\""));
    assert!(!purified.contains(".no"));
    assert_eq!(
        outcome,
        Outcome::Purified {
            original_bytes: css.len(),
            purified_bytes: purified.len(),
        }
    );
    assert_eq!(sink.body(), html.replace(css, &purified));
}

#[test]
fn test_uppercase_page() {
    let html = "<HTML><HEAD><STYLE amp-custom>.yes { color: green; } .no { color: red; }</STYLE></HEAD><BODY><P class=\"yes\">x</P></BODY></HTML>";
    let (sink, outcome) = purify(html, PurgeOptions::default());

    assert!(outcome.is_purified());
    assert_eq!(amp_css(&sink), ".yes{color:green}");
}

#[test]
fn test_head_untouched_without_marker() {
    let html = doc(
        "\n          <style />\n          <meta />\n          <script />\n          <noscript />\n          <base />\n        ",
        "",
    );
    let (sink, outcome) = purify(&html, PurgeOptions::default());

    assert_eq!(outcome, Outcome::NoMarker);
    assert_eq!(sink.body(), html);
    assert_eq!(sink.header(CONTENT_LENGTH), None);
}

#[test]
fn test_unchanged_without_marker() {
    let html = doc("", "<div class=\"yes\" />");
    let (sink, outcome) = purify(&html, PurgeOptions::default());

    assert_eq!(outcome, Outcome::NoMarker);
    assert_eq!(sink.body(), html);
}

#[test]
fn test_unchanged_without_body() {
    let html = "<!doctype html><html><head><style amp-custom>.a { color: red; }</style></head></html>";
    let (sink, outcome) = purify(html, PurgeOptions::default());

    assert_eq!(outcome, Outcome::NoBody);
    assert_eq!(sink.body(), html);
}

#[test]
fn test_siblings_preserved() {
    let head = concat!(
        "<meta charset=\"utf-8\">\n",
        "<style amp-custom>.yes { color: green; } .no { color: red; }</style>\n",
        "<base href=\"/\">\n",
        "<link rel=\"canonical\" href=\"/\">\n",
        "<style amp-boilerplate>body { opacity: 0; }</style>\n",
        "<script async src=\"https://cdn.ampproject.org/v0.js\"></script>\n",
        "<noscript><style amp-boilerplate>body { opacity: 1; }</style></noscript>",
    );
    let html = doc(head, "<!-- c --><pre>  keep\n  me </pre><p class=\"yes\">hi</p>");
    let (sink, _) = purify(&html, PurgeOptions::default());

    let expected = html.replace(
        ".yes { color: green; } .no { color: red; }",
        ".yes{color:green}",
    );
    assert_eq!(sink.body(), expected);
}

#[test]
fn test_content_length_matches_delivered_bytes() {
    let html = doc(
        "<style amp-custom>.yes { content: \"✓\"; } .no { color: red; }</style>",
        "<div class=\"yes\">é</div>",
    );
    let (sink, _) = purify(&html, PurgeOptions::default());

    let body = sink.body();
    assert_eq!(
        sink.header(CONTENT_LENGTH),
        Some(body.len().to_string().as_str())
    );
    assert_ne!(body.len(), body.chars().count());
}

#[test]
fn test_late_headers_skipped_silently() {
    let html = doc(
        "<style amp-custom>.yes { color: green; } .no { color: red; }</style>",
        "<div class=\"yes\"></div>",
    );
    let mut sink = MemorySink::with_headers_sent();
    let outcome = ResponseInterceptor::new(&mut sink, PurgeOptions::default())
        .finish(html, ())
        .unwrap();

    assert!(outcome.is_purified());
    assert_eq!(sink.rejected_headers(), 0);
    assert_eq!(sink.header(CONTENT_LENGTH), None);
    assert_eq!(amp_css(&sink), ".yes{color:green}");
}

#[test]
fn test_debug_report_for_removed_bytes() {
    let html = doc("<style amp-custom>.a {}</style>", "<div></div>");
    let (sink, outcome) = purify(&html, PurgeOptions::default().with_debug(true));

    assert_eq!(
        outcome,
        Outcome::Purified {
            original_bytes: 5,
            purified_bytes: 0,
        }
    );
    assert_eq!(
        outcome.report().unwrap().to_string(),
        "Purge AMP CSS removed 5 bytes of unused CSS (100.00%)"
    );
    assert_eq!(amp_css(&sink), "");
}

#[test]
fn test_debug_report_without_marker() {
    let html = doc("", "<div></div>");
    let (_, outcome) = purify(&html, PurgeOptions::default().with_debug(true));

    assert_eq!(
        outcome.report().unwrap().to_string(),
        "Purge AMP CSS found no <style amp-custom> element"
    );
}

#[test]
fn test_write_then_empty_finish() {
    let html = doc(
        "<style amp-custom>.yes { background: green; } .no { background: red; }</style>",
        "<div class=\"yes\" />",
    );
    let mut sink = MemorySink::new();
    let mut response = ResponseInterceptor::new(&mut sink, PurgeOptions::default());
    response.write(html.as_bytes(), ());
    response.finish(Payload::Absent, ()).unwrap();

    assert_eq!(amp_css(&sink), ".yes{background:green}");
}

#[test]
fn test_decide_checks_style_before_body() {
    let options = PurgeOptions::default();
    let orchestrator = Orchestrator::new(&options, &LightningReducer);

    assert_eq!(
        orchestrator.decide("<html><p>no head, no body</p></html>"),
        Decision::PassThrough(Outcome::NoMarker)
    );
    assert_eq!(
        orchestrator.decide("<html><head><style amp-custom></style></head></html>"),
        Decision::PassThrough(Outcome::NoBody)
    );
    assert!(matches!(
        orchestrator.decide(&doc("<style amp-custom>.a{}</style>", "")),
        Decision::Rewrite { .. }
    ));
}

/// Reducer that records what it was given.
struct Recording(std::cell::RefCell<Vec<(String, String, bool, Vec<String>)>>);

impl CssReducer for Recording {
    fn reduce(
        &self,
        body: &str,
        css: &str,
        options: &ReduceOptions<'_>,
    ) -> Result<String, ReduceError> {
        self.0.borrow_mut().push((
            body.to_string(),
            css.to_string(),
            options.minify,
            options.whitelist.to_vec(),
        ));
        Ok("/* reduced */".to_string())
    }
}

#[test]
fn test_reducer_receives_fragments_and_options() {
    let html = doc("<style amp-custom>.a { color: red; }</style>", "<i class=\"a\"></i>");
    let reducer = Recording(Default::default());
    let options = PurgeOptions::default()
        .with_minify(false)
        .with_whitelist(["*x*"]);

    let (out, outcome) = Orchestrator::new(&options, &reducer).rewrite(html).unwrap();

    let calls = reducer.0.borrow();
    assert_eq!(calls.len(), 1);
    let (body, css, minify, whitelist) = &calls[0];
    assert!(body.starts_with("<body>") && body.contains("<i class=\"a\"></i>"));
    assert_eq!(css, ".a { color: red; }");
    assert!(!minify);
    assert_eq!(whitelist, &vec!["*x*".to_string()]);

    assert!(out.contains("<style amp-custom>/* reduced */</style>"));
    assert_eq!(
        outcome,
        Outcome::Purified {
            original_bytes: 18,
            purified_bytes: 13,
        }
    );
}
