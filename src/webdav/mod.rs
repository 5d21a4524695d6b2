pub mod collection;
pub mod error;
pub mod multistatus;
pub mod property;
pub mod resource;
pub mod response;
pub mod xml;

pub use collection::{DavCollection, SyncLevel, sync_collection_body};
pub use error::{DavError, ErrorResponse, HttpError, RetryAfter};
pub use multistatus::{ResponseConsumer, check_multistatus, parse_multistatus};
pub use property::{
    AddressDataType, PropCursor, Property, PropertyFactory, ResourceType, names, register_property,
};
pub use resource::{DavResource, Depth};
pub use response::{DavResponse, HrefRelation, PropStat, Status, href_relation};
pub use xml::{
    NS_APPLE_ICAL, NS_CALDAV, NS_CALENDARSERVER, NS_CARDDAV, NS_DAV, QName, escape_xml,
    propertyupdate_body, propfind_body,
};
