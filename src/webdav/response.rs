//! Model and parser for one `DAV:response` element of a Multi-Status body.

use std::str::FromStr;

use quick_xml::NsReader;
use quick_xml::events::Event;
use url::Url;

use crate::webdav::error::DavError;
use crate::webdav::property::{self, PropCursor, Property};
use crate::webdav::xml::{self, NS_DAV, QName};

/// HTTP status triple parsed from a status-line-shaped string inside
/// `DAV:status`. The integer code is authoritative; version and reason are
/// advisory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub version: String,
    pub code: u16,
    pub reason: String,
}

impl Status {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }
}

impl FromStr for Status {
    type Err = DavError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        fn malformed(line: &str) -> DavError {
            DavError::InvalidMultiStatus(format!("malformed status line {line:?}"))
        }
        let line = line.trim();
        let (version, rest) = line.split_once(' ').ok_or_else(|| malformed(line))?;
        let rest = rest.trim_start();
        let (code, reason) = match rest.split_once(' ') {
            Some((code, reason)) => (code, reason),
            None => (rest, ""),
        };
        let code: u16 = code.parse().map_err(|_| malformed(line))?;
        Ok(Status {
            version: version.to_owned(),
            code,
            reason: reason.to_owned(),
        })
    }
}

/// Properties sharing one status within a `DAV:response`.
#[derive(Debug, Clone, PartialEq)]
pub struct PropStat {
    pub properties: Vec<Property>,
    pub status: Status,
}

/// Relation of a response href to the request location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HrefRelation {
    /// Same resource, modulo trailing slash.
    Same,
    /// Strictly below the request location.
    Member,
    Other,
}

/// One logical `DAV:response`: a `DAV:response` element with several
/// `DAV:href` children fans out into one of these per href, sharing the
/// propstat content.
#[derive(Debug, Clone, PartialEq)]
pub struct DavResponse {
    /// Absolute URL, resolved against the request location.
    pub href: Url,
    /// Set when the resolved href names a different scheme or authority than
    /// the request location. Such responses are still delivered.
    pub foreign_href: bool,
    /// Per-response status: the operation fully succeeded or failed for this
    /// href (as opposed to per-propstat statuses).
    pub status: Option<Status>,
    pub propstat: Vec<PropStat>,
    /// Condition codes from a nested `DAV:error`.
    pub error: Vec<QName>,
    pub response_description: Option<String>,
    pub location: Option<Url>,
}

impl DavResponse {
    /// Properties from all propstat groups whose status is 2xx.
    pub fn successful_properties(&self) -> impl Iterator<Item = &Property> {
        self.propstat
            .iter()
            .filter(|group| group.status.is_success())
            .flat_map(|group| group.properties.iter())
    }

    /// First successful property with the given name.
    pub fn property(&self, name: &QName) -> Option<&Property> {
        self.successful_properties()
            .find(|property| &property.name() == name)
    }
}

fn trim_trailing_slash(path: &str) -> &str {
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}

fn same_origin(a: &Url, b: &Url) -> bool {
    a.scheme() == b.scheme()
        && a.host_str() == b.host_str()
        && a.port_or_known_default() == b.port_or_known_default()
}

/// Compute the relation of `href` to the request `base`.
pub fn href_relation(base: &Url, href: &Url) -> HrefRelation {
    if !same_origin(base, href) {
        return HrefRelation::Other;
    }
    let base_path = trim_trailing_slash(base.path());
    let href_path = trim_trailing_slash(href.path());
    if base_path == href_path {
        return HrefRelation::Same;
    }
    let mut prefix = base_path.to_owned();
    if !prefix.ends_with('/') {
        prefix.push('/');
    }
    if href_path.starts_with(&prefix) {
        HrefRelation::Member
    } else {
        HrefRelation::Other
    }
}

/// Parse one `DAV:response` element (start tag already consumed) into its
/// logical responses, resolving hrefs against `base`.
pub(crate) fn parse_response(
    reader: &mut NsReader<&[u8]>,
    base: &Url,
) -> Result<Vec<DavResponse>, DavError> {
    let mut hrefs: Vec<String> = Vec::new();
    let mut status: Option<Status> = None;
    let mut propstat: Vec<PropStat> = Vec::new();
    let mut error: Vec<QName> = Vec::new();
    let mut response_description: Option<String> = None;
    let mut location: Option<Url> = None;

    loop {
        let event = reader.read_event()?;
        match event {
            Event::Start(ref start) | Event::Empty(ref start) => {
                let empty = matches!(event, Event::Empty(_));
                let name = xml::resolve_name(reader, start);
                if name.namespace() != NS_DAV {
                    tracing::debug!(element = %name, "skipping foreign element in response");
                    if !empty {
                        xml::skip_subtree(reader)?;
                    }
                    continue;
                }
                if empty {
                    // None of the recognized children carry meaning as
                    // empty elements.
                    continue;
                }
                match name.local_name() {
                    "href" => {
                        if let Some(text) = xml::read_text(reader)? {
                            hrefs.push(text);
                        }
                    }
                    "status" => {
                        if let Some(line) = xml::read_text(reader)? {
                            match line.parse() {
                                Ok(parsed) => status = Some(parsed),
                                Err(_) => {
                                    tracing::debug!(line = %line, "unparsable response status");
                                }
                            }
                        }
                    }
                    "propstat" => {
                        if let Some(group) = parse_propstat(reader)? {
                            propstat.push(group);
                        }
                    }
                    "error" => {
                        error = xml::read_leaf_names(reader)?;
                    }
                    "responsedescription" => {
                        response_description = xml::read_text(reader)?;
                    }
                    "location" => {
                        if let Some(href) = xml::read_href_children(reader)?.into_iter().next() {
                            location = base.join(&href).ok();
                        }
                    }
                    other => {
                        tracing::debug!(element = other, "skipping unknown response child");
                        xml::skip_subtree(reader)?;
                    }
                }
            }
            Event::End(_) => break,
            Event::Eof => {
                return Err(DavError::InvalidMultiStatus(
                    "truncated response element".into(),
                ));
            }
            _ => {}
        }
    }

    let mut responses = Vec::with_capacity(hrefs.len());
    for href in hrefs {
        let resolved = base.join(&href)?;
        let foreign = !same_origin(base, &resolved);
        if foreign {
            tracing::debug!(href = %resolved, base = %base, "response href crosses origin");
        }
        responses.push(DavResponse {
            href: resolved,
            foreign_href: foreign,
            status: status.clone(),
            propstat: propstat.clone(),
            error: error.clone(),
            response_description: response_description.clone(),
            location: location.clone(),
        });
    }
    Ok(responses)
}

/// Parse one `DAV:propstat` (start tag consumed). `None` when the group has
/// no parsable status.
fn parse_propstat(reader: &mut NsReader<&[u8]>) -> Result<Option<PropStat>, DavError> {
    let mut properties: Vec<Property> = Vec::new();
    let mut status: Option<Status> = None;

    loop {
        let event = reader.read_event()?;
        match event {
            Event::Start(ref start) | Event::Empty(ref start) => {
                let empty = matches!(event, Event::Empty(_));
                let name = xml::resolve_name(reader, start);
                if name.is(NS_DAV, "prop") && !empty {
                    parse_prop_children(reader, &mut properties)?;
                } else if name.is(NS_DAV, "status") && !empty {
                    if let Some(line) = xml::read_text(reader)? {
                        match line.parse() {
                            Ok(parsed) => status = Some(parsed),
                            Err(_) => {
                                tracing::debug!(line = %line, "unparsable propstat status");
                            }
                        }
                    }
                } else if !empty {
                    xml::skip_subtree(reader)?;
                }
            }
            Event::End(_) => break,
            Event::Eof => {
                return Err(DavError::InvalidMultiStatus("truncated propstat".into()));
            }
            _ => {}
        }
    }

    match status {
        Some(status) => Ok(Some(PropStat { properties, status })),
        None => {
            tracing::debug!("dropping propstat group without status");
            Ok(None)
        }
    }
}

/// Walk the children of `DAV:prop`, decoding each through the registry.
/// Duplicate names within one group resolve last-wins; names without a
/// factory are skipped.
fn parse_prop_children(
    reader: &mut NsReader<&[u8]>,
    properties: &mut Vec<Property>,
) -> Result<(), DavError> {
    loop {
        let event = reader.read_event()?;
        match event {
            Event::Start(ref start) | Event::Empty(ref start) => {
                let empty = matches!(event, Event::Empty(_));
                let name = xml::resolve_name(reader, start);
                match property::factory_for(&name) {
                    Some(factory) => {
                        let mut cursor = PropCursor::new(reader, name, empty);
                        let decoded = factory(&mut cursor)?;
                        cursor.finish()?;
                        if let Some(decoded) = decoded {
                            properties.retain(|existing| existing.name() != decoded.name());
                            properties.push(decoded);
                        }
                    }
                    None => {
                        tracing::debug!(property = %name, "no factory registered, skipping");
                        if !empty {
                            xml::skip_subtree(reader)?;
                        }
                    }
                }
            }
            Event::End(_) => return Ok(()),
            Event::Eof => {
                return Err(DavError::InvalidMultiStatus("truncated prop".into()));
            }
            _ => {}
        }
    }
}
