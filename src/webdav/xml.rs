//! Qualified-name XML primitives and request-body builders.
//!
//! Request bodies are assembled as plain strings with a fixed prefix map
//! (`""` → `DAV:`, `CAL:` → CalDAV, `CARD:` → CardDAV); properties from any
//! other namespace carry a local `xmlns` attribute. Response parsing uses
//! `quick_xml::NsReader`, so incoming names are resolved by namespace URI,
//! never by prefix.

use std::borrow::Cow;
use std::fmt;

use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;

use crate::webdav::error::DavError;

/// WebDAV namespace.
pub const NS_DAV: &str = "DAV:";
/// CalDAV namespace (RFC 4791).
pub const NS_CALDAV: &str = "urn:ietf:params:xml:ns:caldav";
/// CardDAV namespace (RFC 6352).
pub const NS_CARDDAV: &str = "urn:ietf:params:xml:ns:carddav";
/// Apple iCal extension namespace (calendar-color and friends).
pub const NS_APPLE_ICAL: &str = "http://apple.com/ns/ical/";
/// calendarserver.org extension namespace (getctag, proxy resource types).
pub const NS_CALENDARSERVER: &str = "http://calendarserver.org/ns/";

const XML_DECL: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>";
const ROOT_XMLNS: &str = "xmlns=\"DAV:\" xmlns:CAL=\"urn:ietf:params:xml:ns:caldav\" xmlns:CARD=\"urn:ietf:params:xml:ns:carddav\"";

/// A namespace URI plus local name. Identity is structural equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    ns: Cow<'static, str>,
    local: Cow<'static, str>,
}

impl QName {
    /// Build a `QName` from static strings, usable in `const` tables.
    pub const fn from_static(ns: &'static str, local: &'static str) -> Self {
        Self {
            ns: Cow::Borrowed(ns),
            local: Cow::Borrowed(local),
        }
    }

    pub fn new(ns: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            ns: Cow::Owned(ns.into()),
            local: Cow::Owned(local.into()),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.ns
    }

    pub fn local_name(&self) -> &str {
        &self.local
    }

    pub fn is(&self, ns: &str, local: &str) -> bool {
        self.ns == ns && self.local == local
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Clark notation, e.g. `{DAV:}displayname`.
        write!(f, "{{{}}}{}", self.ns, self.local)
    }
}

/// Escape text content for inclusion in an XML document.
pub fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Append `<name/>` (or `<name>text</name>` when `text` is given) using the
/// fixed prefix map.
fn push_element(out: &mut String, name: &QName, text: Option<&str>) {
    let (prefix, xmlns) = match name.namespace() {
        NS_DAV => ("", None),
        NS_CALDAV => ("CAL:", None),
        NS_CARDDAV => ("CARD:", None),
        other => ("", Some(other)),
    };
    out.push('<');
    out.push_str(prefix);
    out.push_str(name.local_name());
    if let Some(ns) = xmlns {
        out.push_str(" xmlns=\"");
        out.push_str(&escape_xml(ns));
        out.push('"');
    }
    match text {
        None => out.push_str("/>"),
        Some(text) => {
            out.push('>');
            out.push_str(&escape_xml(text));
            out.push_str("</");
            out.push_str(prefix);
            out.push_str(name.local_name());
            out.push('>');
        }
    }
}

/// Body for `PROPFIND`: the requested properties as empty elements.
pub fn propfind_body(props: &[QName]) -> String {
    let mut body = String::with_capacity(256);
    body.push_str(XML_DECL);
    body.push_str("<propfind ");
    body.push_str(ROOT_XMLNS);
    body.push_str("><prop>");
    for prop in props {
        push_element(&mut body, prop, None);
    }
    body.push_str("</prop></propfind>");
    body
}

/// Body for `PROPPATCH`: one `<set>` group per assignment, one `<remove>`
/// group per removal.
pub fn propertyupdate_body(set: &[(QName, String)], remove: &[QName]) -> String {
    let mut body = String::with_capacity(256);
    body.push_str(XML_DECL);
    body.push_str("<propertyupdate ");
    body.push_str(ROOT_XMLNS);
    body.push('>');
    for (name, value) in set {
        body.push_str("<set><prop>");
        push_element(&mut body, name, Some(value));
        body.push_str("</prop></set>");
    }
    for name in remove {
        body.push_str("<remove><prop>");
        push_element(&mut body, name, None);
        body.push_str("</prop></remove>");
    }
    body.push_str("</propertyupdate>");
    body
}

/// Append the `<prop>` element listing `props`, as used by REPORT bodies.
pub(crate) fn push_prop_list(out: &mut String, props: &[QName]) {
    out.push_str("<prop>");
    for prop in props {
        push_element(out, prop, None);
    }
    out.push_str("</prop>");
}

pub(crate) const fn root_xmlns() -> &'static str {
    ROOT_XMLNS
}

pub(crate) const fn xml_decl() -> &'static str {
    XML_DECL
}

/// Resolve an element name against the reader's namespace bindings.
pub(crate) fn resolve_name(reader: &NsReader<&[u8]>, start: &BytesStart<'_>) -> QName {
    let (resolution, local) = reader.resolve_element(start.name());
    let local = String::from_utf8_lossy(local.as_ref()).into_owned();
    match resolution {
        ResolveResult::Bound(ns) => {
            QName::new(String::from_utf8_lossy(ns.as_ref()).into_owned(), local)
        }
        _ => QName::new("", local),
    }
}

/// Consume events until the end tag matching an already-consumed start tag.
pub(crate) fn skip_subtree(reader: &mut NsReader<&[u8]>) -> Result<(), DavError> {
    let mut depth = 0usize;
    loop {
        match reader.read_event()? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                if depth == 0 {
                    return Ok(());
                }
                depth -= 1;
            }
            Event::Eof => {
                return Err(DavError::InvalidMultiStatus(
                    "unexpected end of document".into(),
                ));
            }
            _ => {}
        }
    }
}

/// Collect the trimmed character data of an element whose start tag has been
/// consumed. Nested markup is skipped; `None` when no non-blank text exists.
pub(crate) fn read_text(reader: &mut NsReader<&[u8]>) -> Result<Option<String>, DavError> {
    match read_raw_text(reader)? {
        Some(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                Ok(Some(trimmed.to_owned()))
            }
        }
        None => Ok(None),
    }
}

/// Like [`read_text`] but verbatim: whitespace and line endings preserved,
/// CDATA sections included as-is.
pub(crate) fn read_raw_text(reader: &mut NsReader<&[u8]>) -> Result<Option<String>, DavError> {
    let mut depth = 0usize;
    let mut out: Option<String> = None;
    loop {
        match reader.read_event()? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                if depth == 0 {
                    return Ok(out);
                }
                depth -= 1;
            }
            Event::Text(text) => {
                let chunk = text.unescape()?;
                out.get_or_insert_with(String::new).push_str(&chunk);
            }
            Event::CData(cdata) => {
                out.get_or_insert_with(String::new)
                    .push_str(&String::from_utf8_lossy(cdata.as_ref()));
            }
            Event::Eof => {
                return Err(DavError::InvalidMultiStatus(
                    "unexpected end of document".into(),
                ));
            }
            _ => {}
        }
    }
}

/// Collect the text of every `DAV: href` descendant of the current element.
pub(crate) fn read_href_children(reader: &mut NsReader<&[u8]>) -> Result<Vec<String>, DavError> {
    let mut hrefs = Vec::new();
    let mut depth = 0usize;
    let mut href_depth: Option<usize> = None;
    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                depth += 1;
                let name = resolve_name(reader, &start);
                if href_depth.is_none() && name.is(NS_DAV, "href") {
                    href_depth = Some(depth);
                }
            }
            Event::End(_) => {
                if depth == 0 {
                    return Ok(hrefs);
                }
                if href_depth == Some(depth) {
                    href_depth = None;
                }
                depth -= 1;
            }
            Event::Text(text) => {
                if href_depth.is_some() {
                    hrefs.push(text.unescape()?.trim().to_owned());
                }
            }
            Event::CData(cdata) => {
                if href_depth.is_some() {
                    hrefs.push(String::from_utf8_lossy(cdata.as_ref()).trim().to_owned());
                }
            }
            Event::Eof => {
                return Err(DavError::InvalidMultiStatus(
                    "unexpected end of document".into(),
                ));
            }
            _ => {}
        }
    }
}

/// Collect the qualified names of every *leaf* element descendant, i.e.
/// elements with no element children of their own. This is the shape shared
/// by `resourcetype` (flags), `current-user-privilege-set` (privileges
/// wrapped in `<privilege>`) and `supported-report-set` (reports wrapped in
/// `<supported-report><report>`).
pub(crate) fn read_leaf_names(reader: &mut NsReader<&[u8]>) -> Result<Vec<QName>, DavError> {
    let mut leaves = Vec::new();
    let mut stack: Vec<(QName, bool)> = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let name = resolve_name(reader, &start);
                if let Some(parent) = stack.last_mut() {
                    parent.1 = true;
                }
                stack.push((name, false));
            }
            Event::Empty(start) => {
                let name = resolve_name(reader, &start);
                if let Some(parent) = stack.last_mut() {
                    parent.1 = true;
                }
                leaves.push(name);
            }
            Event::End(_) => match stack.pop() {
                Some((name, has_children)) => {
                    if !has_children {
                        leaves.push(name);
                    }
                }
                None => return Ok(leaves),
            },
            Event::Eof => {
                return Err(DavError::InvalidMultiStatus(
                    "unexpected end of document".into(),
                ));
            }
            _ => {}
        }
    }
}

/// Collect two named attributes of every matching descendant element, e.g.
/// `content-type` and `version` of `CARDDAV:address-data-type` children.
pub(crate) fn read_child_attribute_pairs(
    reader: &mut NsReader<&[u8]>,
    child_ns: &str,
    child_local: &str,
    first: &str,
    second: &str,
) -> Result<Vec<(Option<String>, Option<String>)>, DavError> {
    let mut values = Vec::new();
    let mut depth = 0usize;
    loop {
        let event = reader.read_event()?;
        match event {
            Event::Start(ref start) | Event::Empty(ref start) => {
                let name = resolve_name(reader, start);
                if name.is(child_ns, child_local) {
                    let mut pair = (None, None);
                    for attr in start.attributes().with_checks(false).flatten() {
                        let key = attr.key.local_name();
                        if key.as_ref() == first.as_bytes() {
                            pair.0 = Some(attr.unescape_value()?.into_owned());
                        } else if key.as_ref() == second.as_bytes() {
                            pair.1 = Some(attr.unescape_value()?.into_owned());
                        }
                    }
                    values.push(pair);
                }
                if matches!(event, Event::Start(_)) {
                    depth += 1;
                }
            }
            Event::End(_) => {
                if depth == 0 {
                    return Ok(values);
                }
                depth -= 1;
            }
            Event::Eof => {
                return Err(DavError::InvalidMultiStatus(
                    "unexpected end of document".into(),
                ));
            }
            _ => {}
        }
    }
}

/// Collect a named attribute of every matching descendant element, e.g. the
/// `name` attribute of `CALDAV:comp` children.
pub(crate) fn read_child_attributes(
    reader: &mut NsReader<&[u8]>,
    child_ns: &str,
    child_local: &str,
    attribute: &str,
) -> Result<Vec<String>, DavError> {
    let mut values = Vec::new();
    let mut depth = 0usize;
    loop {
        let event = reader.read_event()?;
        match event {
            Event::Start(ref start) | Event::Empty(ref start) => {
                let name = resolve_name(reader, start);
                if name.is(child_ns, child_local) {
                    for attr in start.attributes().with_checks(false).flatten() {
                        if attr.key.local_name().as_ref() == attribute.as_bytes() {
                            values.push(attr.unescape_value()?.into_owned());
                        }
                    }
                }
                if matches!(event, Event::Start(_)) {
                    depth += 1;
                }
            }
            Event::End(_) => {
                if depth == 0 {
                    return Ok(values);
                }
                depth -= 1;
            }
            Event::Eof => {
                return Err(DavError::InvalidMultiStatus(
                    "unexpected end of document".into(),
                ));
            }
            _ => {}
        }
    }
}
