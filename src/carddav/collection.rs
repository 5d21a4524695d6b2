//! CardDAV address book collections: `addressbook-query` and
//! `addressbook-multiget` REPORTs (RFC 6352 §8.6, §8.7).

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

/// How a [`PropFilter`] text match compares values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchType {
    Equals,
    Contains,
    StartsWith,
    EndsWith,
}

impl MatchType {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchType::Equals => "equals",
            MatchType::Contains => "contains",
            MatchType::StartsWith => "starts-with",
            MatchType::EndsWith => "ends-with",
        }
    }
}

/// Text match against one vCard property, e.g. `UID` equals or `EMAIL`
/// contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropFilter {
    pub name: String,
    pub value: String,
    pub match_type: MatchType,
}

impl PropFilter {
    pub fn equals(name: &str, value: &str) -> Self {
        Self {
            name: name.to_owned(),
            value: value.to_owned(),
            match_type: MatchType::Equals,
        }
    }

    pub fn contains(name: &str, value: &str) -> Self {
        Self {
            name: name.to_owned(),
            value: value.to_owned(),
            match_type: MatchType::Contains,
        }
    }
}

/// An address book collection.
pub struct DavAddressBook {
    collection: DavCollection,
}

impl DavAddressBook {
    pub fn new(transport: Arc<Transport>, location: Url) -> Self {
        Self {
            collection: DavCollection::new(transport, location),
        }
    }

    /// `addressbook-query` REPORT. Without a filter the server enumerates
    /// every address object in the collection.
    pub async fn addressbook_query<S: ResponseConsumer>(
        &mut self,
        filter: Option<&PropFilter>,
        props: &[QName],
        sink: &mut S,
    ) -> Result<Vec<Property>, DavError> {
        let body = addressbook_query_body(filter, props);
        self.collection.report(Some(Depth::One), body, sink).await
    }

    /// `addressbook-multiget` REPORT for a known set of member hrefs.
    pub async fn addressbook_multiget<S: ResponseConsumer>(
        &mut self,
        hrefs: &[String],
        props: &[QName],
        sink: &mut S,
    ) -> Result<Vec<Property>, DavError> {
        let body = addressbook_multiget_body(hrefs, props);
        self.collection.report(None, body, sink).await
    }
}

impl Deref for DavAddressBook {
    type Target = DavCollection;

    fn deref(&self) -> &DavCollection {
        &self.collection
    }
}

impl DerefMut for DavAddressBook {
    fn deref_mut(&mut self) -> &mut DavCollection {
        &mut self.collection
    }
}

/// Body of an `addressbook-query` REPORT.
pub fn addressbook_query_body(filter: Option<&PropFilter>, props: &[QName]) -> String {
    let mut body = String::with_capacity(512);
    body.push_str(xml::xml_decl());
    body.push_str("<CARD:addressbook-query ");
    body.push_str(xml::root_xmlns());
    body.push('>');
    xml::push_prop_list(&mut body, props);
    match filter {
        Some(filter) => {
            body.push_str("<CARD:filter><CARD:prop-filter name=\"");
            body.push_str(&escape_xml(&filter.name));
            body.push_str("\"><CARD:text-match match-type=\"");
            body.push_str(filter.match_type.as_str());
            body.push_str("\">");
            body.push_str(&escape_xml(&filter.value));
            body.push_str("</CARD:text-match></CARD:prop-filter></CARD:filter>");
        }
        None => body.push_str("<CARD:filter/>"),
    }
    body.push_str("</CARD:addressbook-query>");
    body
}

/// Body of an `addressbook-multiget` REPORT.
pub fn addressbook_multiget_body(hrefs: &[String], props: &[QName]) -> String {
    let mut body = String::with_capacity(256 + hrefs.len() * 48);
    body.push_str(xml::xml_decl());
    body.push_str("<CARD:addressbook-multiget ");
    body.push_str(xml::root_xmlns());
    body.push('>');
    xml::push_prop_list(&mut body, props);
    for href in hrefs {
        body.push_str("<href>");
        body.push_str(&escape_xml(href));
        body.push_str("</href>");
    }
    body.push_str("</CARD:addressbook-multiget>");
    body
}
