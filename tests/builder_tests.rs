use dav_engine_rs::caldav::{calendar_multiget_body, calendar_query_body};
use dav_engine_rs::carddav::{PropFilter, addressbook_multiget_body, addressbook_query_body};
use dav_engine_rs::webdav::{propertyupdate_body, propfind_body, sync_collection_body};
use dav_engine_rs::{QName, SyncLevel, TimeRange, names};

#[test]
fn propfind_body_lists_empty_property_elements() {
    let body = propfind_body(&[names::DISPLAYNAME, names::GETETAG]);
    assert!(body.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(body.contains("<propfind xmlns=\"DAV:\""));
    assert!(body.contains("<prop><displayname/><getetag/></prop>"));
    assert!(body.ends_with("</propfind>"));
}

#[test]
fn propfind_body_uses_fixed_prefixes() {
    let body = propfind_body(&[names::CALENDAR_DATA, names::ADDRESS_DATA]);
    assert!(body.contains("xmlns:CAL=\"urn:ietf:params:xml:ns:caldav\""));
    assert!(body.contains("xmlns:CARD=\"urn:ietf:params:xml:ns:carddav\""));
    assert!(body.contains("<CAL:calendar-data/>"));
    assert!(body.contains("<CARD:address-data/>"));
}

#[test]
fn foreign_namespaces_get_local_xmlns() {
    let body = propfind_body(&[names::CALENDAR_COLOR]);
    assert!(body.contains("<calendar-color xmlns=\"http://apple.com/ns/ical/\"/>"));
}

#[test]
fn propertyupdate_body_sets_and_removes() {
    let body = propertyupdate_body(
        &[(names::DISPLAYNAME, "Team <Calendar>".to_owned())],
        &[names::CALENDAR_COLOR],
    );
    assert!(body.contains(
        "<set><prop><displayname>Team &lt;Calendar&gt;</displayname></prop></set>"
    ));
    assert!(body.contains(
        "<remove><prop><calendar-color xmlns=\"http://apple.com/ns/ical/\"/></prop></remove>"
    ));
}

#[test]
fn sync_collection_body_with_token_and_limit() {
    let body = sync_collection_body(
        Some("urn:sync:41"),
        SyncLevel::One,
        Some(100),
        &[names::GETETAG],
    );
    assert!(body.contains("<sync-token>urn:sync:41</sync-token>"));
    assert!(body.contains("<sync-level>1</sync-level>"));
    assert!(body.contains("<limit><nresults>100</nresults></limit>"));
    assert!(body.contains("<prop><getetag/></prop>"));
}

#[test]
fn sync_collection_body_initial_sync() {
    let body = sync_collection_body(None, SyncLevel::Infinite, None, &[names::GETETAG]);
    assert!(body.contains("<sync-token/>"));
    assert!(body.contains("<sync-level>infinite</sync-level>"));
    assert!(!body.contains("<limit>"));
}

#[test]
fn calendar_query_body_nests_comp_filters() {
    let range = TimeRange {
        start: "20240101T000000Z".into(),
        end: Some("20240201T000000Z".into()),
    };
    let body = calendar_query_body("VEVENT", Some(&range), &[names::GETETAG, names::CALENDAR_DATA]);
    assert!(body.contains("<CAL:calendar-query"));
    assert!(body.contains("<CAL:comp-filter name=\"VCALENDAR\">"));
    assert!(body.contains("<CAL:comp-filter name=\"VEVENT\">"));
    assert!(body.contains(
        "<CAL:time-range start=\"20240101T000000Z\" end=\"20240201T000000Z\"/>"
    ));
    assert!(body.ends_with("</CAL:comp-filter></CAL:filter></CAL:calendar-query>"));
}

#[test]
fn calendar_query_body_without_time_range() {
    let body = calendar_query_body("VTODO", None, &[names::GETETAG]);
    assert!(body.contains("<CAL:comp-filter name=\"VTODO\"/>"));
    assert!(!body.contains("time-range"));
}

#[test]
fn calendar_multiget_body_lists_hrefs() {
    let hrefs = vec![
        "/dav/cal/a.ics".to_owned(),
        "/dav/cal/b&c.ics".to_owned(),
    ];
    let body = calendar_multiget_body(&hrefs, &[names::GETETAG, names::CALENDAR_DATA]);
    assert!(body.contains("<CAL:calendar-multiget"));
    assert!(body.contains("<href>/dav/cal/a.ics</href>"));
    assert!(body.contains("<href>/dav/cal/b&amp;c.ics</href>"));
}

#[test]
fn addressbook_query_body_with_text_match() {
    let filter = PropFilter::equals("UID", "abc-123");
    let body = addressbook_query_body(Some(&filter), &[names::GETETAG, names::ADDRESS_DATA]);
    assert!(body.contains("<CARD:addressbook-query"));
    assert!(body.contains("<CARD:prop-filter name=\"UID\">"));
    assert!(body.contains("<CARD:text-match match-type=\"equals\">abc-123</CARD:text-match>"));
}

#[test]
fn addressbook_query_body_without_filter() {
    let body = addressbook_query_body(None, &[names::GETETAG]);
    assert!(body.contains("<CARD:filter/>"));
}

#[test]
fn addressbook_multiget_body_lists_hrefs() {
    let hrefs = vec!["/dav/contacts/one.vcf".to_owned()];
    let body = addressbook_multiget_body(&hrefs, &[names::ADDRESS_DATA]);
    assert!(body.contains("<CARD:addressbook-multiget"));
    assert!(body.contains("<href>/dav/contacts/one.vcf</href>"));
    assert!(body.contains("<CARD:address-data/>"));
}

#[test]
fn builder_output_round_trips_through_a_parser() {
    // The request bodies we emit must themselves be well-formed XML with
    // resolvable namespaces.
    let body = propfind_body(&[
        names::RESOURCETYPE,
        names::DISPLAYNAME,
        names::CALENDAR_DATA,
        names::CALENDAR_COLOR,
    ]);
    let mut reader = quick_xml::NsReader::from_reader(body.as_bytes());
    let mut names_seen: Vec<(String, String)> = Vec::new();
    loop {
        match reader.read_event().unwrap() {
            quick_xml::events::Event::Empty(e) => {
                let (resolution, local) = reader.resolve_element(e.name());
                let ns = match resolution {
                    quick_xml::name::ResolveResult::Bound(ns) => {
                        String::from_utf8_lossy(ns.as_ref()).into_owned()
                    }
                    _ => String::new(),
                };
                names_seen.push((ns, String::from_utf8_lossy(local.as_ref()).into_owned()));
            }
            quick_xml::events::Event::Eof => break,
            _ => {}
        }
    }
    let expect = [
        ("DAV:", "resourcetype"),
        ("DAV:", "displayname"),
        ("urn:ietf:params:xml:ns:caldav", "calendar-data"),
        ("http://apple.com/ns/ical/", "calendar-color"),
    ];
    for (ns, local) in expect {
        assert!(
            names_seen
                .iter()
                .any(|(seen_ns, seen_local)| seen_ns == ns && seen_local == local),
            "{ns}:{local} missing from {names_seen:?}"
        );
    }
}

#[test]
fn qname_identity_is_structural() {
    assert_eq!(QName::new("DAV:", "getetag"), names::GETETAG);
    assert_ne!(
        QName::new("urn:ietf:params:xml:ns:caldav", "max-resource-size"),
        QName::new("urn:ietf:params:xml:ns:carddav", "max-resource-size"),
    );
    assert_eq!(format!("{}", names::GETETAG), "{DAV:}getetag");
}
