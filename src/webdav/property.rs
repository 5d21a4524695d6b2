//! Typed WebDAV/CalDAV/CardDAV properties and the decode registry.
//!
//! Every recognized property is a [`Property`] variant whose qualified name
//! lives in [`names`]. Decoding is driven by a process-global registry of
//! factories keyed by [`QName`]: the response parser looks up the name of
//! each `<prop>` child and hands the factory a [`PropCursor`] positioned at
//! the opening tag. A factory consumes exactly its own element and returns
//! `Ok(None)` when the body is malformed or empty in a way the property
//! treats as absent. Names with no registered factory are skipped, never
//! failing the enclosing parse.
//!
//! Applications can add their own decoders with [`register_property`];
//! registration should happen before the first parse.

use std::collections::HashMap;
use std::sync::{LazyLock, RwLock};

use chrono::{DateTime, Utc};
use quick_xml::NsReader;

use crate::webdav::error::DavError;
use crate::webdav::xml::{
    self, NS_APPLE_ICAL, NS_CALDAV, NS_CALENDARSERVER, NS_CARDDAV, NS_DAV, QName,
};

/// Qualified names of all built-in properties.
pub mod names {
    use super::{NS_APPLE_ICAL, NS_CALDAV, NS_CALENDARSERVER, NS_CARDDAV, NS_DAV, QName};

    pub const RESOURCETYPE: QName = QName::from_static(NS_DAV, "resourcetype");
    pub const DISPLAYNAME: QName = QName::from_static(NS_DAV, "displayname");
    pub const GETETAG: QName = QName::from_static(NS_DAV, "getetag");
    pub const GETCONTENTTYPE: QName = QName::from_static(NS_DAV, "getcontenttype");
    pub const GETCONTENTLENGTH: QName = QName::from_static(NS_DAV, "getcontentlength");
    pub const GETLASTMODIFIED: QName = QName::from_static(NS_DAV, "getlastmodified");
    pub const CREATIONDATE: QName = QName::from_static(NS_DAV, "creationdate");
    pub const CURRENT_USER_PRINCIPAL: QName = QName::from_static(NS_DAV, "current-user-principal");
    pub const CURRENT_USER_PRIVILEGE_SET: QName =
        QName::from_static(NS_DAV, "current-user-privilege-set");
    pub const SUPPORTED_REPORT_SET: QName = QName::from_static(NS_DAV, "supported-report-set");
    pub const SYNC_TOKEN: QName = QName::from_static(NS_DAV, "sync-token");
    pub const OWNER: QName = QName::from_static(NS_DAV, "owner");
    pub const GROUP_MEMBERSHIP: QName = QName::from_static(NS_DAV, "group-membership");
    pub const QUOTA_AVAILABLE_BYTES: QName = QName::from_static(NS_DAV, "quota-available-bytes");
    pub const QUOTA_USED_BYTES: QName = QName::from_static(NS_DAV, "quota-used-bytes");
    pub const SOURCE: QName = QName::from_static(NS_DAV, "source");
    pub const LOCKDISCOVERY: QName = QName::from_static(NS_DAV, "lockdiscovery");

    pub const CALENDAR_HOME_SET: QName = QName::from_static(NS_CALDAV, "calendar-home-set");
    pub const CALENDAR_DESCRIPTION: QName = QName::from_static(NS_CALDAV, "calendar-description");
    pub const CALENDAR_TIMEZONE: QName = QName::from_static(NS_CALDAV, "calendar-timezone");
    pub const SUPPORTED_CALENDAR_COMPONENT_SET: QName =
        QName::from_static(NS_CALDAV, "supported-calendar-component-set");
    pub const CALENDAR_DATA: QName = QName::from_static(NS_CALDAV, "calendar-data");
    pub const CALENDAR_MAX_RESOURCE_SIZE: QName =
        QName::from_static(NS_CALDAV, "max-resource-size");
    pub const SCHEDULE_TAG: QName = QName::from_static(NS_CALDAV, "schedule-tag");
    pub const CALENDAR_COLOR: QName = QName::from_static(NS_APPLE_ICAL, "calendar-color");
    pub const GETCTAG: QName = QName::from_static(NS_CALENDARSERVER, "getctag");

    pub const ADDRESSBOOK_HOME_SET: QName = QName::from_static(NS_CARDDAV, "addressbook-home-set");
    pub const ADDRESSBOOK_DESCRIPTION: QName =
        QName::from_static(NS_CARDDAV, "addressbook-description");
    pub const SUPPORTED_ADDRESS_DATA: QName =
        QName::from_static(NS_CARDDAV, "supported-address-data");
    pub const ADDRESS_DATA: QName = QName::from_static(NS_CARDDAV, "address-data");
    pub const ADDRESSBOOK_MAX_RESOURCE_SIZE: QName =
        QName::from_static(NS_CARDDAV, "max-resource-size");
}

/// Flags decoded from `DAV:resourcetype`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceType {
    pub collection: bool,
    pub principal: bool,
    pub calendar: bool,
    pub addressbook: bool,
    pub calendar_proxy_read: bool,
    pub calendar_proxy_write: bool,
    pub subscribed: bool,
}

/// One `CARDDAV:address-data-type` entry of `supported-address-data`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressDataType {
    pub content_type: Option<String>,
    pub version: Option<String>,
}

/// A decoded property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    // WebDAV core
    ResourceType(ResourceType),
    DisplayName(String),
    /// Raw entity tag: surrounding quotes and the `W/` weak prefix stripped.
    GetETag { tag: String, weak: bool },
    GetContentType(String),
    GetContentLength(u64),
    /// RFC 1123 timestamp; `None` when the server sent something unparsable.
    GetLastModified(Option<DateTime<Utc>>),
    /// ISO 8601 timestamp; `None` when unparsable.
    CreationDate(Option<DateTime<Utc>>),
    /// Principal href, or `None` for `<unauthenticated/>`.
    CurrentUserPrincipal(Option<String>),
    CurrentUserPrivilegeSet(Vec<QName>),
    SupportedReportSet(Vec<QName>),
    SyncToken(String),
    Owner(Option<String>),
    GroupMembership(Vec<String>),
    QuotaAvailableBytes(u64),
    QuotaUsedBytes(u64),
    Source(Vec<String>),
    /// Flattened text content of `lockdiscovery` (lock tokens, timeouts).
    /// Locking flows are out of scope, so no structured lock model.
    LockDiscovery(String),

    // CalDAV
    CalendarHomeSet(Vec<String>),
    CalendarDescription(String),
    CalendarColor(String),
    CalendarTimezone(String),
    SupportedCalendarComponentSet(Vec<String>),
    /// iCalendar payload, verbatim including line endings.
    CalendarData(String),
    CalendarMaxResourceSize(u64),
    ScheduleTag(String),
    GetCTag(String),

    // CardDAV
    AddressBookHomeSet(Vec<String>),
    AddressBookDescription(String),
    SupportedAddressData(Vec<AddressDataType>),
    /// vCard payload, verbatim.
    AddressData(String),
    AddressBookMaxResourceSize(u64),

    /// Catch-all for applications that register [`Property::unknown_factory`]
    /// for names the engine does not decode itself.
    Unknown { name: QName, value: Option<String> },
}

impl Property {
    /// The qualified name this value was decoded from.
    pub fn name(&self) -> QName {
        match self {
            Property::ResourceType(_) => names::RESOURCETYPE,
            Property::DisplayName(_) => names::DISPLAYNAME,
            Property::GetETag { .. } => names::GETETAG,
            Property::GetContentType(_) => names::GETCONTENTTYPE,
            Property::GetContentLength(_) => names::GETCONTENTLENGTH,
            Property::GetLastModified(_) => names::GETLASTMODIFIED,
            Property::CreationDate(_) => names::CREATIONDATE,
            Property::CurrentUserPrincipal(_) => names::CURRENT_USER_PRINCIPAL,
            Property::CurrentUserPrivilegeSet(_) => names::CURRENT_USER_PRIVILEGE_SET,
            Property::SupportedReportSet(_) => names::SUPPORTED_REPORT_SET,
            Property::SyncToken(_) => names::SYNC_TOKEN,
            Property::Owner(_) => names::OWNER,
            Property::GroupMembership(_) => names::GROUP_MEMBERSHIP,
            Property::QuotaAvailableBytes(_) => names::QUOTA_AVAILABLE_BYTES,
            Property::QuotaUsedBytes(_) => names::QUOTA_USED_BYTES,
            Property::Source(_) => names::SOURCE,
            Property::LockDiscovery(_) => names::LOCKDISCOVERY,
            Property::CalendarHomeSet(_) => names::CALENDAR_HOME_SET,
            Property::CalendarDescription(_) => names::CALENDAR_DESCRIPTION,
            Property::CalendarColor(_) => names::CALENDAR_COLOR,
            Property::CalendarTimezone(_) => names::CALENDAR_TIMEZONE,
            Property::SupportedCalendarComponentSet(_) => names::SUPPORTED_CALENDAR_COMPONENT_SET,
            Property::CalendarData(_) => names::CALENDAR_DATA,
            Property::CalendarMaxResourceSize(_) => names::CALENDAR_MAX_RESOURCE_SIZE,
            Property::ScheduleTag(_) => names::SCHEDULE_TAG,
            Property::GetCTag(_) => names::GETCTAG,
            Property::AddressBookHomeSet(_) => names::ADDRESSBOOK_HOME_SET,
            Property::AddressBookDescription(_) => names::ADDRESSBOOK_DESCRIPTION,
            Property::SupportedAddressData(_) => names::SUPPORTED_ADDRESS_DATA,
            Property::AddressData(_) => names::ADDRESS_DATA,
            Property::AddressBookMaxResourceSize(_) => names::ADDRESSBOOK_MAX_RESOURCE_SIZE,
            Property::Unknown { name, .. } => name.clone(),
        }
    }

    /// Factory that captures any element as [`Property::Unknown`] with its
    /// raw text. Register it for names worth keeping verbatim:
    ///
    /// ```ignore
    /// register_property(QName::new("urn:x", "foo"), Property::unknown_factory);
    /// ```
    pub fn unknown_factory(cursor: &mut PropCursor<'_, '_>) -> Result<Option<Property>, DavError> {
        let name = cursor.name().clone();
        let value = cursor.raw_text()?;
        Ok(Some(Property::Unknown { name, value }))
    }
}

/// Cursor over one property element. Handed to factories positioned at the
/// opening tag; whichever read method is called consumes the element through
/// its end tag. If a factory returns without reading, the caller skips the
/// remainder.
pub struct PropCursor<'a, 'xml> {
    reader: &'a mut NsReader<&'xml [u8]>,
    name: QName,
    empty: bool,
    consumed: bool,
}

impl<'a, 'xml> PropCursor<'a, 'xml> {
    pub(crate) fn new(reader: &'a mut NsReader<&'xml [u8]>, name: QName, empty: bool) -> Self {
        Self {
            reader,
            name,
            empty,
            consumed: empty,
        }
    }

    /// The resolved name of the element under the cursor.
    pub fn name(&self) -> &QName {
        &self.name
    }

    /// Trimmed character data, `None` when blank or the element is empty.
    pub fn text(&mut self) -> Result<Option<String>, DavError> {
        if self.consumed {
            return Ok(None);
        }
        self.consumed = true;
        xml::read_text(self.reader)
    }

    /// Verbatim character data including CDATA, line endings preserved.
    pub fn raw_text(&mut self) -> Result<Option<String>, DavError> {
        if self.consumed {
            return Ok(None);
        }
        self.consumed = true;
        xml::read_raw_text(self.reader)
    }

    /// Text of every `DAV:href` descendant.
    pub fn hrefs(&mut self) -> Result<Vec<String>, DavError> {
        if self.consumed {
            return Ok(Vec::new());
        }
        self.consumed = true;
        xml::read_href_children(self.reader)
    }

    /// Names of every leaf element descendant.
    pub fn leaf_names(&mut self) -> Result<Vec<QName>, DavError> {
        if self.consumed {
            return Ok(Vec::new());
        }
        self.consumed = true;
        xml::read_leaf_names(self.reader)
    }

    /// A named attribute of every matching descendant element.
    pub fn child_attributes(
        &mut self,
        child_ns: &str,
        child_local: &str,
        attribute: &str,
    ) -> Result<Vec<String>, DavError> {
        if self.consumed {
            return Ok(Vec::new());
        }
        self.consumed = true;
        xml::read_child_attributes(self.reader, child_ns, child_local, attribute)
    }

    /// Two named attributes of every matching descendant element.
    pub fn child_attribute_pairs(
        &mut self,
        child_ns: &str,
        child_local: &str,
        first: &str,
        second: &str,
    ) -> Result<Vec<(Option<String>, Option<String>)>, DavError> {
        if self.consumed {
            return Ok(Vec::new());
        }
        self.consumed = true;
        xml::read_child_attribute_pairs(self.reader, child_ns, child_local, first, second)
    }

    /// Consume whatever the factory left unread.
    pub(crate) fn finish(&mut self) -> Result<(), DavError> {
        if !self.consumed {
            self.consumed = true;
            xml::skip_subtree(self.reader)?;
        }
        Ok(())
    }
}

/// Signature of a property decoder.
pub type PropertyFactory = fn(&mut PropCursor<'_, '_>) -> Result<Option<Property>, DavError>;

static REGISTRY: LazyLock<RwLock<HashMap<QName, PropertyFactory>>> =
    LazyLock::new(|| RwLock::new(builtin_factories()));

/// Register (or replace) the decoder for a property name. Safe to call from
/// multiple threads; intended to run before the first parse.
pub fn register_property(name: QName, factory: PropertyFactory) {
    let mut registry = REGISTRY.write().expect("property registry poisoned");
    registry.insert(name, factory);
}

/// Look up the factory for `name`. Fn pointers are `Copy`, so the lock is
/// released before the factory runs.
pub(crate) fn factory_for(name: &QName) -> Option<PropertyFactory> {
    let registry = REGISTRY.read().expect("property registry poisoned");
    registry.get(name).copied()
}

fn builtin_factories() -> HashMap<QName, PropertyFactory> {
    let table: &[(QName, PropertyFactory)] = &[
        (names::RESOURCETYPE, decode_resourcetype),
        (names::DISPLAYNAME, decode_displayname),
        (names::GETETAG, decode_getetag),
        (names::GETCONTENTTYPE, decode_getcontenttype),
        (names::GETCONTENTLENGTH, decode_getcontentlength),
        (names::GETLASTMODIFIED, decode_getlastmodified),
        (names::CREATIONDATE, decode_creationdate),
        (names::CURRENT_USER_PRINCIPAL, decode_current_user_principal),
        (
            names::CURRENT_USER_PRIVILEGE_SET,
            decode_current_user_privilege_set,
        ),
        (names::SUPPORTED_REPORT_SET, decode_supported_report_set),
        (names::SYNC_TOKEN, decode_sync_token),
        (names::OWNER, decode_owner),
        (names::GROUP_MEMBERSHIP, decode_group_membership),
        (names::QUOTA_AVAILABLE_BYTES, decode_quota_available),
        (names::QUOTA_USED_BYTES, decode_quota_used),
        (names::SOURCE, decode_source),
        (names::LOCKDISCOVERY, decode_lockdiscovery),
        (names::CALENDAR_HOME_SET, decode_calendar_home_set),
        (names::CALENDAR_DESCRIPTION, decode_calendar_description),
        (names::CALENDAR_COLOR, decode_calendar_color),
        (names::CALENDAR_TIMEZONE, decode_calendar_timezone),
        (
            names::SUPPORTED_CALENDAR_COMPONENT_SET,
            decode_supported_component_set,
        ),
        (names::CALENDAR_DATA, decode_calendar_data),
        (names::CALENDAR_MAX_RESOURCE_SIZE, decode_cal_max_size),
        (names::SCHEDULE_TAG, decode_schedule_tag),
        (names::GETCTAG, decode_getctag),
        (names::ADDRESSBOOK_HOME_SET, decode_addressbook_home_set),
        (
            names::ADDRESSBOOK_DESCRIPTION,
            decode_addressbook_description,
        ),
        (names::SUPPORTED_ADDRESS_DATA, decode_supported_address_data),
        (names::ADDRESS_DATA, decode_address_data),
        (names::ADDRESSBOOK_MAX_RESOURCE_SIZE, decode_card_max_size),
    ];
    table.iter().cloned().collect()
}

// ---- decoders ----

fn decode_resourcetype(cursor: &mut PropCursor<'_, '_>) -> Result<Option<Property>, DavError> {
    let mut flags = ResourceType::default();
    for name in cursor.leaf_names()? {
        match (name.namespace(), name.local_name()) {
            (NS_DAV, "collection") => flags.collection = true,
            (NS_DAV, "principal") => flags.principal = true,
            (NS_CALDAV, "calendar") => flags.calendar = true,
            (NS_CARDDAV, "addressbook") => flags.addressbook = true,
            (NS_CALENDARSERVER, "calendar-proxy-read") => flags.calendar_proxy_read = true,
            (NS_CALENDARSERVER, "calendar-proxy-write") => flags.calendar_proxy_write = true,
            (NS_CALENDARSERVER, "subscribed") => flags.subscribed = true,
            _ => {}
        }
    }
    Ok(Some(Property::ResourceType(flags)))
}

fn decode_displayname(cursor: &mut PropCursor<'_, '_>) -> Result<Option<Property>, DavError> {
    Ok(cursor.text()?.map(Property::DisplayName))
}

/// Strip the optional `W/` weak prefix and surrounding quotes, in either
/// order, leaving the raw entity tag.
fn parse_entity_tag(raw: &str) -> (String, bool) {
    let mut tag = raw.trim();
    let mut weak = false;
    if let Some(rest) = tag.strip_prefix("W/") {
        weak = true;
        tag = rest;
    }
    if tag.len() >= 2 && tag.starts_with('"') && tag.ends_with('"') {
        tag = &tag[1..tag.len() - 1];
    }
    if let Some(rest) = tag.strip_prefix("W/") {
        weak = true;
        tag = rest;
    }
    (tag.to_owned(), weak)
}

fn decode_getetag(cursor: &mut PropCursor<'_, '_>) -> Result<Option<Property>, DavError> {
    Ok(cursor.text()?.map(|raw| {
        let (tag, weak) = parse_entity_tag(&raw);
        Property::GetETag { tag, weak }
    }))
}

fn decode_getcontenttype(cursor: &mut PropCursor<'_, '_>) -> Result<Option<Property>, DavError> {
    Ok(cursor.text()?.map(Property::GetContentType))
}

fn decode_getcontentlength(cursor: &mut PropCursor<'_, '_>) -> Result<Option<Property>, DavError> {
    Ok(cursor
        .text()?
        .and_then(|raw| raw.parse().ok())
        .map(Property::GetContentLength))
}

fn decode_getlastmodified(cursor: &mut PropCursor<'_, '_>) -> Result<Option<Property>, DavError> {
    Ok(cursor.text()?.map(|raw| {
        let parsed = DateTime::parse_from_rfc2822(&raw)
            .map(|date| date.with_timezone(&Utc))
            .ok();
        if parsed.is_none() {
            tracing::debug!(value = %raw, "unparsable getlastmodified");
        }
        Property::GetLastModified(parsed)
    }))
}

fn decode_creationdate(cursor: &mut PropCursor<'_, '_>) -> Result<Option<Property>, DavError> {
    Ok(cursor.text()?.map(|raw| {
        let parsed = DateTime::parse_from_rfc3339(&raw)
            .map(|date| date.with_timezone(&Utc))
            .ok();
        if parsed.is_none() {
            tracing::debug!(value = %raw, "unparsable creationdate");
        }
        Property::CreationDate(parsed)
    }))
}

fn decode_current_user_principal(
    cursor: &mut PropCursor<'_, '_>,
) -> Result<Option<Property>, DavError> {
    let href = cursor.hrefs()?.into_iter().next();
    Ok(Some(Property::CurrentUserPrincipal(href)))
}

fn decode_current_user_privilege_set(
    cursor: &mut PropCursor<'_, '_>,
) -> Result<Option<Property>, DavError> {
    let privileges = cursor
        .leaf_names()?
        .into_iter()
        .filter(|name| !name.is(NS_DAV, "privilege"))
        .collect();
    Ok(Some(Property::CurrentUserPrivilegeSet(privileges)))
}

fn decode_supported_report_set(
    cursor: &mut PropCursor<'_, '_>,
) -> Result<Option<Property>, DavError> {
    let reports = cursor
        .leaf_names()?
        .into_iter()
        .filter(|name| !name.is(NS_DAV, "supported-report") && !name.is(NS_DAV, "report"))
        .collect();
    Ok(Some(Property::SupportedReportSet(reports)))
}

fn decode_sync_token(cursor: &mut PropCursor<'_, '_>) -> Result<Option<Property>, DavError> {
    Ok(cursor.text()?.map(Property::SyncToken))
}

fn decode_owner(cursor: &mut PropCursor<'_, '_>) -> Result<Option<Property>, DavError> {
    let href = cursor.hrefs()?.into_iter().next();
    Ok(Some(Property::Owner(href)))
}

fn decode_group_membership(cursor: &mut PropCursor<'_, '_>) -> Result<Option<Property>, DavError> {
    Ok(Some(Property::GroupMembership(cursor.hrefs()?)))
}

fn decode_quota_available(cursor: &mut PropCursor<'_, '_>) -> Result<Option<Property>, DavError> {
    Ok(cursor
        .text()?
        .and_then(|raw| raw.parse().ok())
        .map(Property::QuotaAvailableBytes))
}

fn decode_quota_used(cursor: &mut PropCursor<'_, '_>) -> Result<Option<Property>, DavError> {
    Ok(cursor
        .text()?
        .and_then(|raw| raw.parse().ok())
        .map(Property::QuotaUsedBytes))
}

fn decode_source(cursor: &mut PropCursor<'_, '_>) -> Result<Option<Property>, DavError> {
    Ok(Some(Property::Source(cursor.hrefs()?)))
}

fn decode_lockdiscovery(cursor: &mut PropCursor<'_, '_>) -> Result<Option<Property>, DavError> {
    Ok(cursor.raw_text()?.map(Property::LockDiscovery))
}

fn decode_calendar_home_set(cursor: &mut PropCursor<'_, '_>) -> Result<Option<Property>, DavError> {
    Ok(Some(Property::CalendarHomeSet(cursor.hrefs()?)))
}

fn decode_calendar_description(
    cursor: &mut PropCursor<'_, '_>,
) -> Result<Option<Property>, DavError> {
    Ok(cursor.text()?.map(Property::CalendarDescription))
}

fn decode_calendar_color(cursor: &mut PropCursor<'_, '_>) -> Result<Option<Property>, DavError> {
    Ok(cursor.text()?.map(Property::CalendarColor))
}

fn decode_calendar_timezone(cursor: &mut PropCursor<'_, '_>) -> Result<Option<Property>, DavError> {
    Ok(cursor.raw_text()?.map(Property::CalendarTimezone))
}

fn decode_supported_component_set(
    cursor: &mut PropCursor<'_, '_>,
) -> Result<Option<Property>, DavError> {
    let components = cursor.child_attributes(NS_CALDAV, "comp", "name")?;
    Ok(Some(Property::SupportedCalendarComponentSet(components)))
}

fn decode_calendar_data(cursor: &mut PropCursor<'_, '_>) -> Result<Option<Property>, DavError> {
    Ok(cursor.raw_text()?.map(Property::CalendarData))
}

fn decode_cal_max_size(cursor: &mut PropCursor<'_, '_>) -> Result<Option<Property>, DavError> {
    Ok(cursor
        .text()?
        .and_then(|raw| raw.parse().ok())
        .map(Property::CalendarMaxResourceSize))
}

fn decode_schedule_tag(cursor: &mut PropCursor<'_, '_>) -> Result<Option<Property>, DavError> {
    Ok(cursor.text()?.map(|raw| {
        let (tag, _) = parse_entity_tag(&raw);
        Property::ScheduleTag(tag)
    }))
}

fn decode_getctag(cursor: &mut PropCursor<'_, '_>) -> Result<Option<Property>, DavError> {
    Ok(cursor.text()?.map(Property::GetCTag))
}

fn decode_addressbook_home_set(
    cursor: &mut PropCursor<'_, '_>,
) -> Result<Option<Property>, DavError> {
    Ok(Some(Property::AddressBookHomeSet(cursor.hrefs()?)))
}

fn decode_addressbook_description(
    cursor: &mut PropCursor<'_, '_>,
) -> Result<Option<Property>, DavError> {
    Ok(cursor.text()?.map(Property::AddressBookDescription))
}

fn decode_supported_address_data(
    cursor: &mut PropCursor<'_, '_>,
) -> Result<Option<Property>, DavError> {
    let types = cursor
        .child_attribute_pairs(NS_CARDDAV, "address-data-type", "content-type", "version")?
        .into_iter()
        .map(|(content_type, version)| AddressDataType {
            content_type,
            version,
        })
        .collect();
    Ok(Some(Property::SupportedAddressData(types)))
}

fn decode_address_data(cursor: &mut PropCursor<'_, '_>) -> Result<Option<Property>, DavError> {
    Ok(cursor.raw_text()?.map(Property::AddressData))
}

fn decode_card_max_size(cursor: &mut PropCursor<'_, '_>) -> Result<Option<Property>, DavError> {
    Ok(cursor
        .text()?
        .and_then(|raw| raw.parse().ok())
        .map(Property::AddressBookMaxResourceSize))
}
