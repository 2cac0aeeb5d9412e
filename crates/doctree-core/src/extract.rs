//! Element extraction: turning converted HTML into the flat, ordered
//! element sequence the tree builder consumes.
//!
//! Tokenization is a collaborator of the core, not part of it; the builder
//! accepts any [`ContentElement`] sequence regardless of where it came from.
//! [`HtmlExtractor`] is the default implementation, a streaming pass over
//! the HTML that the upstream document converter emits.
//!
//! Extraction rules, matching the upstream converter's output handling:
//!
//! - `h1`..`h6` become `Header` elements; inline markup is dropped and
//!   entities are decoded.
//! - A top-level `table` becomes one `Table` element with row/column counts
//!   and its raw markup; tables nested inside cells stay embedded.
//! - `img` outside tables becomes an `Image` element.
//! - Block containers (`p`, `div`, `ul`, `ol`, `pre`, `blockquote`) outside
//!   tables become `Text` elements carrying their raw markup. A container
//!   that itself holds a heading, table, or image is skipped; those parts
//!   surface as their own elements instead. Empty blocks are dropped.
//! - `script` and `style` content is ignored entirely.

use crate::{ContentElement, Error, Result};
use html_escape::decode_html_entities;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

/// Produces the ordered element sequence for one document.
pub trait ElementExtractor {
    /// Tokenize source markup into ordered content elements.
    fn extract(&self, html: &str) -> Result<Vec<ContentElement>>;
}

/// Streaming HTML extractor over the converter's output.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlExtractor;

impl HtmlExtractor {
    /// Create an extractor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

const TEXT_CONTAINERS: &[&str] = &["p", "div", "ul", "ol", "pre", "blockquote"];

/// In-flight capture of a table element.
struct TableCapture {
    start: usize,
    /// Nesting depth of `<table>` tags; 1 while in the outer table.
    depth: usize,
    rows: usize,
    cols: usize,
    in_first_row: bool,
    caption: Option<String>,
    in_caption: bool,
}

/// In-flight capture of a block text container.
struct BlockCapture {
    tag: String,
    start: usize,
    /// Nesting depth of same-named tags, so `<div><div>..</div></div>`
    /// closes at the right place.
    depth: usize,
    has_text: bool,
}

impl ElementExtractor for HtmlExtractor {
    fn extract(&self, html: &str) -> Result<Vec<ContentElement>> {
        let mut reader = Reader::from_str(html);
        reader.config_mut().check_end_names = false;

        let mut elements = Vec::new();
        let mut table: Option<TableCapture> = None;
        let mut block: Option<BlockCapture> = None;
        let mut heading: Option<(u8, String)> = None;
        let mut skip_depth = 0usize; // inside script/style

        loop {
            let event_start = position(&reader, html);
            let event = reader
                .read_event()
                .map_err(|e| Error::Parse(format!("malformed markup near byte {event_start}: {e}")))?;

            match event {
                Event::Start(ref e) => {
                    let tag = tag_name(e);

                    if skip_depth > 0 {
                        if tag == "script" || tag == "style" {
                            skip_depth += 1;
                        }
                        continue;
                    }
                    if tag == "script" || tag == "style" {
                        skip_depth += 1;
                        continue;
                    }

                    if let Some(capture) = table.as_mut() {
                        count_table_parts(capture, &tag);
                        continue;
                    }

                    if tag == "table" {
                        // A table interrupts any open text block; the block
                        // would have contained it, so the block is skipped.
                        block = None;
                        table = Some(TableCapture {
                            start: event_start,
                            depth: 1,
                            rows: 0,
                            cols: 0,
                            in_first_row: false,
                            caption: None,
                            in_caption: false,
                        });
                        continue;
                    }

                    if let Some(level) = heading_level(&tag) {
                        block = None;
                        heading = Some((level, String::new()));
                        continue;
                    }

                    if tag == "img" {
                        block = None;
                        elements.push(image_element(e));
                        continue;
                    }

                    if let Some(open) = block.as_mut() {
                        if open.tag == tag {
                            open.depth += 1;
                        }
                        continue;
                    }

                    if heading.is_none() && TEXT_CONTAINERS.contains(&tag.as_str()) {
                        block = Some(BlockCapture {
                            tag,
                            start: event_start,
                            depth: 1,
                            has_text: false,
                        });
                    }
                },
                Event::Empty(ref e) => {
                    let tag = tag_name(e);
                    if skip_depth > 0 || table.is_some() {
                        continue;
                    }
                    if tag == "img" {
                        // An image inside an open block splits the block
                        // apart just like a table does.
                        block = None;
                        elements.push(image_element(e));
                    }
                },
                Event::Text(ref t) => {
                    if skip_depth > 0 {
                        continue;
                    }
                    let raw = String::from_utf8_lossy(t.as_ref()).into_owned();
                    if let Some(capture) = table.as_mut() {
                        if capture.in_caption {
                            let decoded = decode_html_entities(&raw).into_owned();
                            capture
                                .caption
                                .get_or_insert_with(String::new)
                                .push_str(&decoded);
                        }
                    } else if let Some((_, text)) = heading.as_mut() {
                        text.push_str(&decode_html_entities(&raw));
                    } else if let Some(open) = block.as_mut() {
                        if !raw.trim().is_empty() {
                            open.has_text = true;
                        }
                    }
                },
                Event::End(ref e) => {
                    let tag = String::from_utf8_lossy(e.local_name().as_ref()).to_ascii_lowercase();

                    if skip_depth > 0 {
                        if tag == "script" || tag == "style" {
                            skip_depth -= 1;
                        }
                        continue;
                    }

                    if let Some(mut capture) = table.take() {
                        match tag.as_str() {
                            "table" => {
                                capture.depth -= 1;
                                if capture.depth == 0 {
                                    let end = position(&reader, html);
                                    elements.push(table_element(&capture, html, end));
                                } else {
                                    table = Some(capture);
                                }
                            },
                            "tr" if capture.depth == 1 => {
                                capture.in_first_row = false;
                                table = Some(capture);
                            },
                            "caption" if capture.depth == 1 => {
                                capture.in_caption = false;
                                table = Some(capture);
                            },
                            _ => table = Some(capture),
                        }
                        continue;
                    }

                    if let Some((level, text)) = heading.take() {
                        if heading_level(&tag) == Some(level) {
                            elements.push(ContentElement::Header {
                                level,
                                text: text.trim().to_string(),
                            });
                        } else {
                            heading = Some((level, text));
                        }
                        continue;
                    }

                    if let Some(mut open) = block.take() {
                        if open.tag == tag {
                            open.depth -= 1;
                            if open.depth == 0 {
                                if open.has_text {
                                    let end = position(&reader, html);
                                    let raw = html[open.start..end].trim().to_string();
                                    elements.push(ContentElement::Text { text: raw });
                                }
                            } else {
                                block = Some(open);
                            }
                        } else {
                            block = Some(open);
                        }
                    }
                },
                Event::Eof => break,
                _ => {},
            }
        }

        debug!(elements = elements.len(), "extracted content elements");
        Ok(elements)
    }
}

fn position(reader: &Reader<&[u8]>, html: &str) -> usize {
    usize::try_from(reader.buffer_position()).unwrap_or(html.len())
}

fn tag_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).to_ascii_lowercase()
}

fn heading_level(tag: &str) -> Option<u8> {
    match tag {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

fn attribute(e: &BytesStart<'_>, name: &str) -> Option<String> {
    e.try_get_attribute(name)
        .ok()
        .flatten()
        .map(|attr| decode_html_entities(&String::from_utf8_lossy(&attr.value)).into_owned())
}

fn image_element(e: &BytesStart<'_>) -> ContentElement {
    ContentElement::Image {
        src: attribute(e, "src").unwrap_or_default(),
        alt: attribute(e, "alt").filter(|alt| !alt.is_empty()),
    }
}

fn table_element(capture: &TableCapture, html: &str, end: usize) -> ContentElement {
    ContentElement::Table {
        rows: capture.rows,
        cols: capture.cols,
        caption: capture
            .caption
            .as_ref()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty()),
        html: html[capture.start..end].to_string(),
    }
}

fn count_table_parts(capture: &mut TableCapture, tag: &str) {
    match tag {
        "table" => capture.depth += 1,
        "tr" if capture.depth == 1 => {
            capture.rows += 1;
            capture.in_first_row = capture.rows == 1;
        },
        "td" | "th" if capture.depth == 1 && capture.in_first_row => capture.cols += 1,
        "caption" if capture.depth == 1 => capture.in_caption = true,
        _ => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(html: &str) -> Vec<ContentElement> {
        HtmlExtractor::new().extract(html).unwrap()
    }

    #[test]
    fn test_headings_and_text_in_order() {
        let elements = extract(
            "<html><body>\
             <h1>Title</h1>\
             <p>intro</p>\
             <h2>Chapter</h2>\
             <p>body</p>\
             </body></html>",
        );

        assert_eq!(elements.len(), 4);
        assert_eq!(
            elements[0],
            ContentElement::Header {
                level: 1,
                text: "Title".into()
            }
        );
        assert!(matches!(&elements[1], ContentElement::Text { text } if text.contains("intro")));
        assert_eq!(
            elements[2],
            ContentElement::Header {
                level: 2,
                text: "Chapter".into()
            }
        );
    }

    #[test]
    fn test_heading_entities_decoded_and_markup_dropped() {
        let elements = extract("<h2>Fish &amp; <em>Chips</em></h2>");
        assert_eq!(
            elements[0],
            ContentElement::Header {
                level: 2,
                text: "Fish & Chips".into()
            }
        );
    }

    #[test]
    fn test_table_counts_rows_and_cols() {
        let elements = extract(
            "<table><caption>Results</caption>\
             <tr><th>a</th><th>b</th></tr>\
             <tr><td>1</td><td>2</td></tr>\
             <tr><td>3</td><td>4</td></tr>\
             </table>",
        );

        assert_eq!(elements.len(), 1);
        match &elements[0] {
            ContentElement::Table {
                rows,
                cols,
                caption,
                html,
            } => {
                assert_eq!(*rows, 3);
                assert_eq!(*cols, 2);
                assert_eq!(caption.as_deref(), Some("Results"));
                assert!(html.starts_with("<table>"));
                assert!(html.ends_with("</table>"));
            },
            other => panic!("expected table, got {other:?}"),
        }
    }

    #[test]
    fn test_nested_table_stays_embedded() {
        let elements = extract(
            "<table><tr><td><table><tr><td>inner</td></tr></table></td></tr></table>",
        );

        assert_eq!(elements.len(), 1);
        match &elements[0] {
            ContentElement::Table { rows, html, .. } => {
                assert_eq!(*rows, 1);
                assert!(html.contains("inner"));
            },
            other => panic!("expected table, got {other:?}"),
        }
    }

    #[test]
    fn test_image_inside_table_is_not_extracted() {
        let elements = extract(
            "<table><tr><td><img src=\"cell.png\"/></td></tr></table>\
             <img src=\"free.png\" alt=\"figure\"/>",
        );

        assert_eq!(elements.len(), 2);
        assert!(matches!(&elements[0], ContentElement::Table { .. }));
        assert_eq!(
            elements[1],
            ContentElement::Image {
                src: "free.png".into(),
                alt: Some("figure".into()),
            }
        );
    }

    #[test]
    fn test_container_with_heading_is_split_apart() {
        // The div is not a text block; its heading and paragraph surface
        // individually.
        let elements = extract("<div><h2>Inside</h2><p>after</p></div>");

        assert_eq!(elements.len(), 2);
        assert_eq!(
            elements[0],
            ContentElement::Header {
                level: 2,
                text: "Inside".into()
            }
        );
        assert!(matches!(&elements[1], ContentElement::Text { .. }));
    }

    #[test]
    fn test_empty_blocks_dropped() {
        let elements = extract("<p>   </p><p>real</p><div></div>");
        assert_eq!(elements.len(), 1);
        assert!(matches!(&elements[0], ContentElement::Text { text } if text.contains("real")));
    }

    #[test]
    fn test_script_and_style_ignored() {
        let elements = extract(
            "<style>p { color: red }</style>\
             <script>let x = \"<h1>not a heading</h1>\";</script>\
             <p>visible</p>",
        );

        assert_eq!(elements.len(), 1);
        assert!(matches!(&elements[0], ContentElement::Text { text } if text.contains("visible")));
    }

    #[test]
    fn test_list_block_captured_whole() {
        let elements = extract("<ul><li>one</li><li>two</li></ul>");
        assert_eq!(elements.len(), 1);
        match &elements[0] {
            ContentElement::Text { text } => {
                assert!(text.contains("<li>one</li>"));
                assert!(text.contains("<li>two</li>"));
            },
            other => panic!("expected text, got {other:?}"),
        }
    }
}
