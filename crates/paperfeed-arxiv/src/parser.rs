//! arXiv Atom feed parser using quick-xml

use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};

use crate::error::SourceError;

/// Entry ids of the error feed contain this path
const ERROR_ID_MARKER: &str = "/api/errors";

/// One `<entry>` as delivered by the API, before normalization
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RawResult {
    /// `<id>`, e.g. `http://arxiv.org/abs/2403.01234v1`
    pub entry_id: String,
    pub title: String,
    pub summary: String,
    pub authors: Vec<String>,
    /// Raw `<published>` text; parsed by the normalizer
    pub published: String,
    pub updated: String,
    pub links: Vec<Link>,
    pub categories: Vec<String>,
    pub primary_category: Option<String>,
    pub comment: Option<String>,
    pub journal_ref: Option<String>,
    pub doi: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Link {
    pub href: String,
    pub rel: Option<String>,
    pub title: Option<String>,
    pub content_type: Option<String>,
}

impl RawResult {
    /// Abstract page link (`rel="alternate"`)
    pub fn alternate_link(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|l| l.rel.as_deref() == Some("alternate"))
            .map(|l| l.href.as_str())
    }

    /// PDF link (`title="pdf"`)
    pub fn pdf_link(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|l| l.title.as_deref() == Some("pdf"))
            .map(|l| l.href.as_str())
    }
}

/// One page of results
#[derive(Debug, Default)]
pub struct FeedPage {
    /// `<opensearch:totalResults>`, when present
    pub total_results: Option<usize>,
    pub entries: Vec<RawResult>,
}

/// Parse an Atom response body.
///
/// An error feed (single entry with an `/api/errors` id) becomes
/// [`SourceError::Api`] carrying the entry summary.
pub fn parse_feed(xml: &str) -> Result<FeedPage, SourceError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut page = FeedPage::default();
    let mut saw_feed = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"feed" => saw_feed = true,
                b"entry" => page.entries.push(parse_entry(&mut reader)?),
                b"opensearch:totalResults" => {
                    let text = read_text(&mut reader, &e)?;
                    page.total_results = text.parse().ok();
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !saw_feed {
        return Err(SourceError::Parse("missing <feed> root element".to_string()));
    }

    if let Some(err) = page
        .entries
        .iter()
        .find(|entry| entry.entry_id.contains(ERROR_ID_MARKER))
    {
        return Err(SourceError::Api {
            message: err.summary.trim().to_string(),
        });
    }

    Ok(page)
}

fn parse_entry(reader: &mut Reader<&[u8]>) -> Result<RawResult, SourceError> {
    let mut raw = RawResult::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"id" => raw.entry_id = read_text(reader, &e)?.trim().to_string(),
                b"title" => raw.title = read_text(reader, &e)?,
                b"summary" => raw.summary = read_text(reader, &e)?,
                b"published" => raw.published = read_text(reader, &e)?.trim().to_string(),
                b"updated" => raw.updated = read_text(reader, &e)?.trim().to_string(),
                b"author" => {
                    if let Some(name) = parse_author(reader)? {
                        raw.authors.push(name);
                    }
                }
                b"arxiv:comment" => raw.comment = Some(read_text(reader, &e)?),
                b"arxiv:journal_ref" => raw.journal_ref = Some(read_text(reader, &e)?),
                b"arxiv:doi" => raw.doi = Some(read_text(reader, &e)?.trim().to_string()),
                b"link" => raw.links.push(parse_link(&e)?),
                b"category" => push_category(&mut raw, &e)?,
                b"arxiv:primary_category" => raw.primary_category = attr(&e, "term")?,
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"link" => raw.links.push(parse_link(&e)?),
                b"category" => push_category(&mut raw, &e)?,
                b"arxiv:primary_category" => raw.primary_category = attr(&e, "term")?,
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"entry" => break,
            Event::Eof => {
                return Err(SourceError::Parse("unterminated <entry>".to_string()));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(raw)
}

/// `<author><name>..</name><arxiv:affiliation>..</arxiv:affiliation></author>`
fn parse_author(reader: &mut Reader<&[u8]>) -> Result<Option<String>, SourceError> {
    let mut name = None;
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == b"name" => {
                let text = read_text(reader, &e)?;
                let text = text.trim();
                if !text.is_empty() {
                    name = Some(text.to_string());
                }
            }
            Event::End(e) if e.name().as_ref() == b"author" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(name)
}

fn parse_link(e: &BytesStart) -> Result<Link, SourceError> {
    Ok(Link {
        href: attr(e, "href")?.unwrap_or_default(),
        rel: attr(e, "rel")?,
        title: attr(e, "title")?,
        content_type: attr(e, "type")?,
    })
}

fn push_category(raw: &mut RawResult, e: &BytesStart) -> Result<(), SourceError> {
    if let Some(term) = attr(e, "term")? {
        raw.categories.push(term);
    }
    Ok(())
}

/// Element text with XML entities resolved
fn read_text(reader: &mut Reader<&[u8]>, e: &BytesStart) -> Result<String, SourceError> {
    let text = reader.read_text(e.name())?;
    let text = unescape(&text).map_err(|err| SourceError::Parse(err.to_string()))?;
    Ok(text.into_owned())
}

fn attr(e: &BytesStart, name: &str) -> Result<Option<String>, SourceError> {
    let attr = e
        .try_get_attribute(name)
        .map_err(|err| SourceError::Parse(err.to_string()))?;
    match attr {
        Some(a) => Ok(Some(a.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}
