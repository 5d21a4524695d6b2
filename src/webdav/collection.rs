//! WebDAV collections and sync-token-based change enumeration (RFC 6578).

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use url::Url;

use crate::common::http::Transport;
use crate::webdav::error::DavError;
use crate::webdav::multistatus::ResponseConsumer;
use crate::webdav::property::Property;
use crate::webdav::resource::DavResource;
use crate::webdav::xml::{self, QName, escape_xml};

/// Scope of a `sync-collection` REPORT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncLevel {
    One,
    Infinite,
}

impl SyncLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            SyncLevel::One => "1",
            SyncLevel::Infinite => "infinite",
        }
    }
}

/// A WebDAV collection: a [`DavResource`] plus collection-scoped reports.
pub struct DavCollection {
    resource: DavResource,
}

impl DavCollection {
    pub fn new(transport: Arc<Transport>, location: Url) -> Self {
        Self {
            resource: DavResource::new(transport, location),
        }
    }

    pub fn from_resource(resource: DavResource) -> Self {
        Self { resource }
    }

    /// `sync-collection` REPORT: enumerate changes since `sync_token`
    /// (`None` for an initial sync). The new token comes back among the
    /// residual properties as [`Property::SyncToken`].
    pub async fn sync_collection<S: ResponseConsumer>(
        &mut self,
        sync_token: Option<&str>,
        level: SyncLevel,
        limit: Option<u32>,
        props: &[QName],
        sink: &mut S,
    ) -> Result<Vec<Property>, DavError> {
        let body = sync_collection_body(sync_token, level, limit, props);
        self.resource.report(None, body, sink).await
    }
}

impl Deref for DavCollection {
    type Target = DavResource;

    fn deref(&self) -> &DavResource {
        &self.resource
    }
}

impl DerefMut for DavCollection {
    fn deref_mut(&mut self) -> &mut DavResource {
        &mut self.resource
    }
}

/// Body of a `sync-collection` REPORT.
pub fn sync_collection_body(
    sync_token: Option<&str>,
    level: SyncLevel,
    limit: Option<u32>,
    props: &[QName],
) -> String {
    let mut body = String::with_capacity(256);
    body.push_str(xml::xml_decl());
    body.push_str("<sync-collection ");
    body.push_str(xml::root_xmlns());
    body.push('>');
    match sync_token {
        Some(token) => {
            body.push_str("<sync-token>");
            body.push_str(&escape_xml(token));
            body.push_str("</sync-token>");
        }
        None => body.push_str("<sync-token/>"),
    }
    body.push_str("<sync-level>");
    body.push_str(level.as_str());
    body.push_str("</sync-level>");
    if let Some(limit) = limit {
        body.push_str("<limit><nresults>");
        body.push_str(&limit.to_string());
        body.push_str("</nresults></limit>");
    }
    xml::push_prop_list(&mut body, props);
    body.push_str("</sync-collection>");
    body
}
