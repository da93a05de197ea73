//! Locating and rewriting the `<style amp-custom>` block.
//!
//! Parsing is done with `tl`, which is zero-copy: every tag keeps a slice of
//! the source it came from. The opening `<style amp-custom>` tag is found
//! through the DOM, and the CSS runs from there to the first `</style` in the
//! source. The block is addressed as a byte range of the document, and
//! splicing replaces exactly that range.
//! Everything outside it (scripts, comments, `<pre>` whitespace, sibling head
//! elements) goes back to the client byte-for-byte.

use std::ops::Range;

use super::PurgeError;

/// Raw attribute string identifying the AMP custom style block.
pub const AMP_CUSTOM: &str = "amp-custom";

/// Location of the marked style block inside a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleBlock {
    /// Byte range of the CSS text (between `>` and `</style`).
    content: Range<usize>,
}

impl StyleBlock {
    /// The CSS text of this block within `html`.
    pub fn css<'a>(&self, html: &'a str) -> &'a str {
        &html[self.content.clone()]
    }

    /// Replace the CSS text, keeping every other byte of `html`.
    pub fn splice(&self, html: &str, css: &str) -> String {
        let mut out = String::with_capacity(html.len() - self.content.len() + css.len());
        out.push_str(&html[..self.content.start]);
        out.push_str(css);
        out.push_str(&html[self.content.end..]);
        out
    }
}

/// Find the first direct child of `<head>` that is `<style amp-custom>`.
///
/// `tl` only locates the opening tag. The CSS runs from there to the first
/// `</style` in the source, since `tl` does not treat style content as raw
/// text and a `<` inside the CSS would cut its view of the element short.
///
/// Returns `None` when there is no `<head>`, no marked style element, or the
/// element is never closed.
pub fn locate_style(html: &str) -> Option<StyleBlock> {
    let dom = tl::parse(html, tl::ParserOptions::default()).ok()?;
    let parser = dom.parser();
    let head = find_tag(dom.children(), parser, "head")?;

    head.children()
        .top()
        .iter()
        .filter_map(|handle| handle.get(parser)?.as_tag())
        .find_map(|tag| {
            if !tag.name().as_utf8_str().eq_ignore_ascii_case("style") {
                return None;
            }
            let raw = source_slice(html, tag.raw().as_bytes())?;
            let offset = raw.as_ptr() as usize - html.as_ptr() as usize;
            let content = marker_content(&html[offset..])?;
            Some(StyleBlock {
                content: shift(content, offset),
            })
        })
}

/// CSS text of the marked style block, if any.
pub fn extract_style(html: &str) -> Option<&str> {
    locate_style(html).map(|block| block.css(html))
}

/// Markup of the first `<body>` element, if any.
pub fn extract_body(html: &str) -> Option<String> {
    let dom = tl::parse(html, tl::ParserOptions::default()).ok()?;
    let parser = dom.parser();
    let body = find_tag(dom.children(), parser, "body")?;
    Some(body.raw().as_utf8_str().into_owned())
}

/// Replace the CSS text of the marked style block and return the full document.
///
/// The block must exist; call after [`extract_style`] found it.
pub fn splice_style(html: &str, css: &str) -> Result<String, PurgeError> {
    locate_style(html)
        .map(|block| block.splice(html, css))
        .ok_or(PurgeError::MissingStyle)
}

// ============================================================================
// Helpers
// ============================================================================

/// Re-borrow a parser slice as a `&str` of the source document.
///
/// `tl` hands out slices of the input; this checks that `part` lies inside
/// `source` and returns the matching `&str`.
fn source_slice<'a>(source: &'a str, part: &[u8]) -> Option<&'a str> {
    let start = (part.as_ptr() as usize).checked_sub(source.as_ptr() as usize)?;
    let end = start.checked_add(part.len())?;
    source.get(start..end)
}

/// First element named `name` (ASCII case-insensitive), depth first.
fn find_tag<'p, 'a>(
    handles: &[tl::NodeHandle],
    parser: &'p tl::Parser<'a>,
    name: &str,
) -> Option<&'p tl::HTMLTag<'a>> {
    handles.iter().find_map(|handle| {
        let tag = handle.get(parser)?.as_tag()?;
        if tag.name().as_utf8_str().eq_ignore_ascii_case(name) {
            Some(tag)
        } else {
            find_tag(tag.children().top().as_slice(), parser, name)
        }
    })
}

/// Content range (relative to `source`) of a `<style>` opening at the start
/// of `source` whose attributes are exactly the marker.
fn marker_content(source: &str) -> Option<Range<usize>> {
    let open_end = source.find('>')?;
    if raw_attributes(&source[..open_end]) != AMP_CUSTOM {
        return None;
    }

    let start = open_end + 1;
    let end = start + closing_tag_start(&source[start..])?;
    Some(start..end)
}

/// Attribute string of an opening tag (`<style amp-custom` → `amp-custom`).
///
/// Whitespace after the tag name is skipped; trailing whitespace is kept.
fn raw_attributes(open_tag: &str) -> &str {
    let rest = open_tag.strip_prefix('<').unwrap_or(open_tag);
    let name_len = rest
        .find(|c: char| c.is_ascii_whitespace() || c == '/')
        .unwrap_or(rest.len());
    rest[name_len..].trim_start()
}

/// Offset of the first `</style` (ASCII case-insensitive) in `css`.
fn closing_tag_start(css: &str) -> Option<usize> {
    const CLOSE: &[u8] = b"</style";
    css.as_bytes()
        .windows(CLOSE.len())
        .position(|window| window.eq_ignore_ascii_case(CLOSE))
}

fn shift(range: Range<usize>, by: usize) -> Range<usize> {
    range.start + by..range.end + by
}
