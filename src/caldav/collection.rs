//! CalDAV calendar collections: `calendar-query` and `calendar-multiget`
//! REPORTs (RFC 4791 §7.8, §7.9).

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use url::Url;

use crate::common::http::Transport;
use crate::webdav::collection::DavCollection;
use crate::webdav::error::DavError;
use crate::webdav::multistatus::ResponseConsumer;
use crate::webdav::property::Property;
use crate::webdav::resource::Depth;
use crate::webdav::xml::{self, QName, escape_xml};

/// UTC time window of a `calendar-query`, in iCalendar basic format
/// (`20240101T000000Z`). An open end matches everything after `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRange {
    pub start: String,
    pub end: Option<String>,
}

/// A calendar collection.
pub struct DavCalendar {
    collection: DavCollection,
}

impl DavCalendar {
    pub fn new(transport: Arc<Transport>, location: Url) -> Self {
        Self {
            collection: DavCollection::new(transport, location),
        }
    }

    /// `calendar-query` REPORT filtered to `component` (e.g. `VEVENT`,
    /// `VTODO`) inside `VCALENDAR`, optionally restricted to a time range.
    pub async fn calendar_query<S: ResponseConsumer>(
        &mut self,
        component: &str,
        time_range: Option<&TimeRange>,
        props: &[QName],
        sink: &mut S,
    ) -> Result<Vec<Property>, DavError> {
        let body = calendar_query_body(component, time_range, props);
        self.collection.report(Some(Depth::One), body, sink).await
    }

    /// `calendar-multiget` REPORT for a known set of member hrefs.
    pub async fn calendar_multiget<S: ResponseConsumer>(
        &mut self,
        hrefs: &[String],
        props: &[QName],
        sink: &mut S,
    ) -> Result<Vec<Property>, DavError> {
        let body = calendar_multiget_body(hrefs, props);
        self.collection.report(None, body, sink).await
    }
}

impl Deref for DavCalendar {
    type Target = DavCollection;

    fn deref(&self) -> &DavCollection {
        &self.collection
    }
}

impl DerefMut for DavCalendar {
    fn deref_mut(&mut self) -> &mut DavCollection {
        &mut self.collection
    }
}

/// Body of a `calendar-query` REPORT.
pub fn calendar_query_body(
    component: &str,
    time_range: Option<&TimeRange>,
    props: &[QName],
) -> String {
    let mut body = String::with_capacity(512);
    body.push_str(xml::xml_decl());
    body.push_str("<CAL:calendar-query ");
    body.push_str(xml::root_xmlns());
    body.push('>');
    xml::push_prop_list(&mut body, props);
    body.push_str("<CAL:filter><CAL:comp-filter name=\"VCALENDAR\"><CAL:comp-filter name=\"");
    body.push_str(&escape_xml(component));
    body.push('"');
    match time_range {
        Some(range) => {
            body.push('>');
            body.push_str("<CAL:time-range start=\"");
            body.push_str(&escape_xml(&range.start));
            body.push('"');
            if let Some(end) = &range.end {
                body.push_str(" end=\"");
                body.push_str(&escape_xml(end));
                body.push('"');
            }
            body.push_str("/></CAL:comp-filter>");
        }
        None => body.push_str("/>"),
    }
    body.push_str("</CAL:comp-filter></CAL:filter></CAL:calendar-query>");
    body
}

/// Body of a `calendar-multiget` REPORT.
pub fn calendar_multiget_body(hrefs: &[String], props: &[QName]) -> String {
    let mut body = String::with_capacity(256 + hrefs.len() * 48);
    body.push_str(xml::xml_decl());
    body.push_str("<CAL:calendar-multiget ");
    body.push_str(xml::root_xmlns());
    body.push('>');
    xml::push_prop_list(&mut body, props);
    for href in hrefs {
        body.push_str("<href>");
        body.push_str(&escape_xml(href));
        body.push_str("</href>");
    }
    body.push_str("</CAL:calendar-multiget>");
    body
}
