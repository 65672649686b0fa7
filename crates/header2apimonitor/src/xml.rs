//! Small helpers over the quick-xml event reader.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;
use std::path::Path;

use crate::error::{Error, Result};

/// Escape text for use inside a double-quoted attribute value.
pub fn escape_attr(value: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(value)
}

/// Unescaped value of attribute `key`, if present.
pub(crate) fn attribute(element: &BytesStart, key: &[u8], origin: &Path) -> Result<Option<String>> {
    match element.try_get_attribute(key) {
        Ok(Some(attr)) => attr
            .unescape_value()
            .map(|value| Some(value.into_owned()))
            .map_err(|e| Error::xml(origin, e.to_string())),
        Ok(None) => Ok(None),
        Err(e) => Err(Error::xml(origin, e.to_string())),
    }
}

/// Header name referenced by an `Include` filename such as `Headers\ole.h.xml`.
///
/// Only includes below the `Headers` directory are followed.
pub(crate) fn system_header_name(filename: &str) -> Option<&str> {
    filename
        .strip_prefix("Headers")
        .and_then(|rest| rest.strip_prefix(['\\', '/']))
        .filter(|name| !name.is_empty())
}

/// Source text of every outermost `<Variable>` element, in document order.
///
/// Fragments are sliced from `xml` unchanged, so attribute order, quoting
/// and nested elements survive.
pub fn variable_fragments(xml: &str, origin: &Path) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut fragments = Vec::new();
    let mut depth = 0usize;
    // (start offset, depth) of the Variable currently being copied
    let mut open: Option<(usize, usize)> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| Error::xml(origin, e.to_string()))?;
        let end = reader.buffer_position() as usize;

        match event {
            Event::Start(e) => {
                depth += 1;
                if open.is_none() && e.name().as_ref() == b"Variable" {
                    open = Some((tag_start(xml, end, origin)?, depth));
                }
            }
            Event::Empty(e) => {
                if open.is_none() && e.name().as_ref() == b"Variable" {
                    let start = tag_start(xml, end, origin)?;
                    fragments.push(slice(xml, start, end, origin)?.to_string());
                }
            }
            Event::End(_) => {
                if let Some((start, open_depth)) = open {
                    if open_depth == depth {
                        fragments.push(slice(xml, start, end, origin)?.to_string());
                        open = None;
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(fragments)
}

/// Offset of the `<` opening the tag that ends at `end`.
fn tag_start(xml: &str, end: usize, origin: &Path) -> Result<usize> {
    slice(xml, 0, end, origin)?
        .rfind('<')
        .ok_or_else(|| Error::xml(origin, format!("no tag start before offset {end}")))
}

fn slice<'a>(xml: &'a str, start: usize, end: usize, origin: &Path) -> Result<&'a str> {
    xml.get(start..end)
        .ok_or_else(|| Error::xml(origin, format!("invalid element span {start}..{end}")))
}
