//! WebDAV/CalDAV/CardDAV client protocol engine built on **hyper 1.x** +
//! **rustls**.
//!
//! The crate speaks the extended HTTP method set of RFC 4918 and its
//! calendar (RFC 4791) and address book (RFC 6352) extensions against
//! arbitrary servers: discovery, property reads and writes, collection
//! enumeration, conditional mutation, and sync-token change tracking
//! (RFC 6578). Calendar and contact payloads pass through as opaque
//! strings; this is the protocol layer, not an object model.
//!
//! # Structure
//!
//! - [`DavResource`] is the per-URL handle carrying every WebDAV verb:
//!   `OPTIONS`, `PROPFIND`, `PROPPATCH`, `MKCOL`, `HEAD`, `GET` (plain and
//!   ranged), `PUT`, `DELETE`, `COPY`, `MOVE`, `SEARCH`. It follows
//!   redirects itself (capped, refusing HTTPS→HTTP downgrades) and mutates
//!   its `location` as it goes; the injected [`Transport`] never redirects.
//! - [`DavCollection`], [`DavCalendar`] and [`DavAddressBook`] layer the
//!   REPORT variants on top: `sync-collection`, `calendar-query`,
//!   `calendar-multiget`, `addressbook-query`, `addressbook-multiget`.
//! - Multi-Status bodies stream through a pull parser that decodes each
//!   `<response>` via the typed [`Property`] registry and hands it to a
//!   caller callback in document order, so memory stays bounded by the
//!   largest single response.
//! - Non-2xx outcomes become typed [`HttpError`]s (401/403/404/409/412/503
//!   have their own variants, with WebDAV precondition codes and
//!   `Retry-After` parsed out); protocol violations become [`DavError`]s.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use dav_engine_rs::{DavError, DavResource, Depth, Transport, names};
//! use url::Url;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = Arc::new(Transport::with_basic_auth("user", "secret")?);
//! let url = Url::parse("https://dav.example.com/calendars/user/")?;
//! let mut resource = DavResource::new(transport, url);
//!
//! let mut on_response = |response: dav_engine_rs::DavResponse,
//!                        relation: dav_engine_rs::HrefRelation|
//!  -> Result<(), DavError> {
//!     println!("{} ({:?})", response.href, relation);
//!     for property in response.successful_properties() {
//!         println!("  {:?}", property);
//!     }
//!     Ok(())
//! };
//! resource
//!     .propfind(
//!         Depth::One,
//!         &[names::RESOURCETYPE, names::DISPLAYNAME, names::GETETAG],
//!         &mut on_response,
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! A handle is single-task: two concurrent operations on one `DavResource`
//! would race on its `location`. Share the `Transport` (it is cheap to
//! clone and pools connections) and give each task its own handle.

pub mod caldav;
pub mod carddav;
pub mod common;
pub mod webdav;

pub use caldav::{DavCalendar, TimeRange};
pub use carddav::{DavAddressBook, MatchType, PropFilter};
pub use common::{ContentEncoding, Transport};
pub use webdav::{
    DavCollection, DavError, DavResource, DavResponse, Depth, ErrorResponse, HrefRelation,
    HttpError, PropStat, Property, PropertyFactory, QName, ResourceType, ResponseConsumer,
    RetryAfter, Status, SyncLevel, names, register_property,
};
