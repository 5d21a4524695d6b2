//! 207 Multi-Status envelope parsing.
//!
//! The parser walks a pull-parser to `DAV:multistatus`, dispatches every
//! `DAV:response` child through the caller's [`ResponseConsumer`] in
//! document order, and accumulates residual top-level properties (the
//! RFC 6578 `sync-token`) which are returned once the envelope closes.
//! Memory is bounded by the largest single response, not the body size.

use quick_xml::NsReader;
use quick_xml::events::Event;
use url::Url;

use crate::webdav::error::DavError;
use crate::webdav::property::Property;
use crate::webdav::response::{self, DavResponse, HrefRelation};
use crate::webdav::xml::{self, NS_DAV};

/// Receiver for parsed responses. Implemented for collecting vectors and for
/// `FnMut` closures, so callers can stream or materialize as they prefer.
pub trait ResponseConsumer {
    fn consume(&mut self, response: DavResponse, relation: HrefRelation) -> Result<(), DavError>;
}

impl ResponseConsumer for Vec<(DavResponse, HrefRelation)> {
    fn consume(&mut self, response: DavResponse, relation: HrefRelation) -> Result<(), DavError> {
        self.push((response, relation));
        Ok(())
    }
}

impl<F> ResponseConsumer for F
where
    F: FnMut(DavResponse, HrefRelation) -> Result<(), DavError>,
{
    fn consume(&mut self, response: DavResponse, relation: HrefRelation) -> Result<(), DavError> {
        (self)(response, relation)
    }
}

/// Check that a response claiming to be Multi-Status may be parsed as one:
/// the status must be 207 and the `Content-Type` XML. Mislabeled bodies that
/// nevertheless start with `<?xml` are accepted with a warning, as is a
/// missing `Content-Type`.
pub fn check_multistatus(
    status: u16,
    content_type: Option<&str>,
    body: &[u8],
) -> Result<(), DavError> {
    if status != 207 {
        return Err(DavError::UnexpectedStatus {
            status,
            expected: "207 Multi-Status",
        });
    }
    match content_type {
        Some(value) => {
            let essence = value
                .split(';')
                .next()
                .unwrap_or("")
                .trim()
                .to_ascii_lowercase();
            if essence == "application/xml" || essence == "text/xml" {
                Ok(())
            } else if body.starts_with(b"<?xml") {
                tracing::warn!(content_type = %value, "207 mislabeled, body looks like XML");
                Ok(())
            } else {
                Err(DavError::NonXmlMultiStatus(value.to_owned()))
            }
        }
        None => {
            tracing::warn!("207 without Content-Type, assuming XML");
            Ok(())
        }
    }
}

/// Parse a 207 body, resolving hrefs against `base` and feeding `sink`.
/// Returns the residual top-level properties.
pub fn parse_multistatus<S: ResponseConsumer>(
    body: &[u8],
    base: &Url,
    sink: &mut S,
) -> Result<Vec<Property>, DavError> {
    parse_envelope(body, base, sink).map_err(|err| match err {
        // Malformed XML anywhere in the body is one invalid-multistatus
        // failure carrying the parser diagnostic.
        DavError::Xml(inner) => DavError::InvalidMultiStatus(inner.to_string()),
        other => other,
    })
}

fn parse_envelope<S: ResponseConsumer>(
    body: &[u8],
    base: &Url,
    sink: &mut S,
) -> Result<Vec<Property>, DavError> {
    let mut reader = NsReader::from_reader(body);
    let mut residual: Vec<Property> = Vec::new();

    // Advance to the document element, which must be DAV:multistatus.
    loop {
        match read_checked(&mut reader)? {
            Event::Start(start) => {
                let name = xml::resolve_name(&reader, &start);
                if !name.is(NS_DAV, "multistatus") {
                    return Err(DavError::InvalidMultiStatus(format!(
                        "root element is {name}, not multistatus"
                    )));
                }
                break;
            }
            Event::Empty(start) => {
                let name = xml::resolve_name(&reader, &start);
                return if name.is(NS_DAV, "multistatus") {
                    Ok(residual)
                } else {
                    Err(DavError::InvalidMultiStatus(format!(
                        "root element is {name}, not multistatus"
                    )))
                };
            }
            Event::Eof => {
                return Err(DavError::InvalidMultiStatus(
                    "document contains no multistatus element".into(),
                ));
            }
            _ => {}
        }
    }

    // Children of the envelope.
    loop {
        let event = read_checked(&mut reader)?;
        match event {
            Event::Start(ref start) | Event::Empty(ref start) => {
                let empty = matches!(event, Event::Empty(_));
                let name = xml::resolve_name(&reader, start);
                if name.is(NS_DAV, "response") && !empty {
                    for parsed in response::parse_response(&mut reader, base)? {
                        let relation = response::href_relation(base, &parsed.href);
                        sink.consume(parsed, relation)?;
                    }
                } else if name.is(NS_DAV, "sync-token") && !empty {
                    if let Some(token) = xml::read_text(&mut reader)? {
                        residual.push(Property::SyncToken(token));
                    }
                } else {
                    tracing::debug!(element = %name, "skipping multistatus child");
                    if !empty {
                        xml::skip_subtree(&mut reader)?;
                    }
                }
            }
            Event::End(_) => break,
            Event::Eof => {
                return Err(DavError::InvalidMultiStatus(
                    "truncated multistatus envelope".into(),
                ));
            }
            _ => {}
        }
    }

    Ok(residual)
}

/// Read an event, folding parser failures into the invalid-multistatus
/// error so malformed and truncated bodies surface uniformly.
fn read_checked<'a>(reader: &mut NsReader<&'a [u8]>) -> Result<Event<'a>, DavError> {
    reader
        .read_event()
        .map_err(|err| DavError::InvalidMultiStatus(err.to_string()))
}
