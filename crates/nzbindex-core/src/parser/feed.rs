//! RSS feed parser for NZBIndex search results
//!
//! Reads `<item>` entries out of the RSS document returned by the search
//! endpoint. Any well-formedness problem fails the whole document; a single
//! incomplete item is only skipped.

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::warn;

use crate::error::{NzbIndexError, Result};
use crate::types::RawResultItem;

/// Item field currently being read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    PubDate,
}

impl Field {
    fn from_tag(name: &[u8]) -> Option<Self> {
        match name {
            b"title" => Some(Field::Title),
            b"link" => Some(Field::Link),
            b"pubDate" => Some(Field::PubDate),
            _ => None,
        }
    }
}

/// Fields collected for the `<item>` being parsed
#[derive(Debug, Default)]
struct ItemBuilder {
    title: Option<String>,
    link: Option<String>,
    pub_date: Option<String>,
    /// Field whose text is being collected, and the element depth it opened at
    open: Option<(Field, usize)>,
    buffer: String,
}

impl ItemBuilder {
    fn start_field(&mut self, field: Field, depth: usize) {
        if self.open.is_none() && self.slot(field).is_none() {
            self.open = Some((field, depth));
            self.buffer.clear();
        }
    }

    fn push_text(&mut self, text: &str) {
        if self.open.is_some() {
            self.buffer.push_str(text);
        }
    }

    fn end_element(&mut self, depth: usize) {
        if let Some((field, open_depth)) = self.open {
            if open_depth == depth {
                let value = self.buffer.trim().to_string();
                *self.slot_mut(field) = Some(value);
                self.open = None;
            }
        }
    }

    fn slot(&self, field: Field) -> &Option<String> {
        match field {
            Field::Title => &self.title,
            Field::Link => &self.link,
            Field::PubDate => &self.pub_date,
        }
    }

    fn slot_mut(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Title => &mut self.title,
            Field::Link => &mut self.link,
            Field::PubDate => &mut self.pub_date,
        }
    }

    /// Finish the item, returning `None` when title or link is missing
    fn build(self) -> Option<RawResultItem> {
        let title = self.title.filter(|t| !t.is_empty());
        let link = self.link.filter(|l| !l.is_empty());

        match (title, link) {
            (Some(title), Some(link)) => Some(RawResultItem {
                title,
                link: link.replace("&amp;", "&"),
                pub_date: self.pub_date.filter(|d| !d.is_empty()),
            }),
            (title, link) => {
                warn!(
                    title = title.as_deref().unwrap_or(""),
                    link = link.as_deref().unwrap_or(""),
                    "Feed item is missing its title or link, skipping it"
                );
                None
            }
        }
    }
}

/// Parse an NZBIndex RSS document into raw result items.
///
/// Items are returned in document order. Only the first `title`, `link` and
/// `pubDate` element inside each `item` is used; namespaced elements such as
/// `atom:link` are ignored.
///
/// # Arguments
/// * `bytes` - Raw response body
///
/// # Returns
/// * `Ok(Vec<RawResultItem>)` with all complete items
/// * `Err(NzbIndexError::ParseError)` if the document is not well-formed
///
/// # Example
/// ```
/// use nzbindex_core::parser::parse_feed;
///
/// let xml = br#"<rss><channel><item>
///     <title>Show.Name.S01E02</title>
///     <link>http://nzbindex.nl/download/1/</link>
/// </item></channel></rss>"#;
/// let items = parse_feed(xml).unwrap();
/// assert_eq!(items[0].title, "Show.Name.S01E02");
/// assert!(parse_feed(b"<rss><channel>").is_err());
/// ```
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<RawResultItem>> {
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().check_end_names = true;

    let mut items = Vec::new();
    let mut buf = Vec::new();
    let mut depth: usize = 0;
    let mut saw_root = false;
    // The item being parsed and the depth of its <item> element
    let mut current: Option<(ItemBuilder, usize)> = None;

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| {
            NzbIndexError::ParseError(format!(
                "error at position {}: {}",
                reader.buffer_position(),
                e
            ))
        })?;

        match event {
            Event::Start(ref e) => {
                if depth == 0 && saw_root {
                    return Err(NzbIndexError::ParseError(
                        "multiple root elements".to_string(),
                    ));
                }
                depth += 1;
                saw_root = true;

                let name = e.name();
                if let Some((item, _)) = current.as_mut() {
                    if let Some(field) = Field::from_tag(name.as_ref()) {
                        item.start_field(field, depth);
                    }
                } else if name.as_ref() == b"item" {
                    current = Some((ItemBuilder::default(), depth));
                }
            }
            Event::End(_) => {
                if let Some((mut item, item_depth)) = current.take() {
                    if item_depth == depth {
                        if let Some(raw) = item.build() {
                            items.push(raw);
                        }
                    } else {
                        item.end_element(depth);
                        current = Some((item, item_depth));
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Empty(ref e) => {
                if depth == 0 {
                    if saw_root {
                        return Err(NzbIndexError::ParseError(
                            "multiple root elements".to_string(),
                        ));
                    }
                    saw_root = true;
                } else if current.is_none() && e.name().as_ref() == b"item" {
                    // <item/> carries nothing usable
                    warn!("Feed item is missing its title or link, skipping it");
                }
            }
            Event::Text(ref e) => {
                let text = e
                    .unescape()
                    .map_err(|e| NzbIndexError::ParseError(e.to_string()))?;
                if depth == 0 && !text.trim().is_empty() {
                    return Err(NzbIndexError::ParseError(
                        "text outside of the root element".to_string(),
                    ));
                }
                if let Some((item, _)) = current.as_mut() {
                    item.push_text(&text);
                }
            }
            Event::CData(ref e) => {
                let text = e
                    .decode()
                    .map_err(|e| NzbIndexError::ParseError(e.to_string()))?;
                if let Some((item, _)) = current.as_mut() {
                    item.push_text(&text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if depth != 0 {
        return Err(NzbIndexError::ParseError(
            "document ended inside an open element".to_string(),
        ));
    }
    if !saw_root {
        return Err(NzbIndexError::ParseError("no root element".to_string()));
    }

    Ok(items)
}
