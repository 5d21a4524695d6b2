use dav_engine_rs::webdav::{href_relation, parse_multistatus};
use dav_engine_rs::{DavResponse, HrefRelation, Property, QName, Status};
use url::Url;

fn base() -> Url {
    Url::parse("https://example.com/dav/").unwrap()
}

fn parse(xml: &str) -> Vec<(DavResponse, HrefRelation)> {
    let mut collected: Vec<(DavResponse, HrefRelation)> = Vec::new();
    parse_multistatus(xml.as_bytes(), &base(), &mut collected).expect("xml parsing succeeds");
    collected
}

#[test]
fn status_line_parses_into_triple() {
    let status: Status = "HTTP/1.1 404 Not Found".parse().unwrap();
    assert_eq!(status.version, "HTTP/1.1");
    assert_eq!(status.code, 404);
    assert_eq!(status.reason, "Not Found");

    let status: Status = "HTTP/1.1 200 OK".parse().unwrap();
    assert_eq!(status.code, 200);
    assert_eq!(status.reason, "OK");

    // Reason phrase may be empty.
    let status: Status = "HTTP/1.1 204".parse().unwrap();
    assert_eq!(status.code, 204);
    assert_eq!(status.reason, "");

    assert!("just wrong".parse::<Status>().is_err());
}

#[test]
fn multiple_hrefs_fan_out_into_equal_responses() {
    let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<D:multistatus xmlns:D="DAV:">
  <D:response>
    <D:href>/dav/a.ics</D:href>
    <D:href>/dav/b.ics</D:href>
    <D:href>/dav/c.ics</D:href>
    <D:propstat>
      <D:prop><D:getetag>"shared"</D:getetag></D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#;
    let parsed = parse(xml);
    assert_eq!(parsed.len(), 3);
    assert_eq!(parsed[0].0.href.path(), "/dav/a.ics");
    assert_eq!(parsed[1].0.href.path(), "/dav/b.ics");
    assert_eq!(parsed[2].0.href.path(), "/dav/c.ics");
    for (response, relation) in &parsed {
        assert_eq!(*relation, HrefRelation::Member);
        assert_eq!(response.propstat, parsed[0].0.propstat);
    }
}

#[test]
fn response_level_status_is_captured() {
    let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<D:multistatus xmlns:D="DAV:">
  <D:response>
    <D:href>/dav/gone</D:href>
    <D:status>HTTP/1.1 404 Not Found</D:status>
  </D:response>
</D:multistatus>"#;
    let parsed = parse(xml);
    assert_eq!(parsed.len(), 1);
    let response = &parsed[0].0;
    assert_eq!(response.status.as_ref().map(|s| s.code), Some(404));
    assert!(response.propstat.is_empty());
}

#[test]
fn propstat_groups_partition_by_status() {
    let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<D:multistatus xmlns:D="DAV:">
  <D:response>
    <D:href>/dav/</D:href>
    <D:propstat>
      <D:prop><D:displayname>Root</D:displayname></D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
    <D:propstat>
      <D:prop><D:getcontentlength/></D:prop>
      <D:status>HTTP/1.1 404 Not Found</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#;
    let parsed = parse(xml);
    let response = &parsed[0].0;
    assert_eq!(response.propstat.len(), 2);
    assert_eq!(response.propstat[0].status.code, 200);
    assert_eq!(response.propstat[1].status.code, 404);
    // Only the 2xx group surfaces through the convenience accessor.
    let visible: Vec<_> = response.successful_properties().cloned().collect();
    assert_eq!(visible, vec![Property::DisplayName("Root".into())]);
}

#[test]
fn href_relation_distinguishes_self_member_other() {
    let location = Url::parse("https://example.com/dav/cal/").unwrap();

    let same = Url::parse("https://example.com/dav/cal").unwrap();
    assert_eq!(href_relation(&location, &same), HrefRelation::Same);

    let member = Url::parse("https://example.com/dav/cal/event.ics").unwrap();
    assert_eq!(href_relation(&location, &member), HrefRelation::Member);

    let nested = Url::parse("https://example.com/dav/cal/sub/event.ics").unwrap();
    assert_eq!(href_relation(&location, &nested), HrefRelation::Member);

    let sibling = Url::parse("https://example.com/dav/other/").unwrap();
    assert_eq!(href_relation(&location, &sibling), HrefRelation::Other);

    // Same prefix characters but not a path segment boundary.
    let lookalike = Url::parse("https://example.com/dav/calendar").unwrap();
    assert_eq!(href_relation(&location, &lookalike), HrefRelation::Other);

    let elsewhere = Url::parse("https://other.example.com/dav/cal/").unwrap();
    assert_eq!(href_relation(&location, &elsewhere), HrefRelation::Other);
}

#[test]
fn foreign_hrefs_are_flagged_but_delivered() {
    let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<D:multistatus xmlns:D="DAV:">
  <D:response>
    <D:href>https://mirror.example.net/dav/x</D:href>
    <D:propstat>
      <D:prop><D:displayname>Mirror</D:displayname></D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#;
    let parsed = parse(xml);
    assert_eq!(parsed.len(), 1);
    let (response, relation) = &parsed[0];
    assert!(response.foreign_href);
    assert_eq!(*relation, HrefRelation::Other);
    assert_eq!(response.href.host_str(), Some("mirror.example.net"));
}

#[test]
fn hrefs_resolve_against_request_base() {
    let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<D:multistatus xmlns:D="DAV:">
  <D:response>
    <D:href>sub/item.vcf</D:href>
    <D:propstat>
      <D:prop><D:displayname>Relative</D:displayname></D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#;
    let parsed = parse(xml);
    assert_eq!(
        parsed[0].0.href.as_str(),
        "https://example.com/dav/sub/item.vcf"
    );
}

#[test]
fn response_error_and_description_are_diagnostic() {
    let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<D:multistatus xmlns:D="DAV:">
  <D:response>
    <D:href>/dav/locked</D:href>
    <D:status>HTTP/1.1 423 Locked</D:status>
    <D:error><D:lock-token-submitted/></D:error>
    <D:responsedescription>resource is locked</D:responsedescription>
  </D:response>
</D:multistatus>"#;
    let parsed = parse(xml);
    let response = &parsed[0].0;
    assert_eq!(response.error, vec![QName::new("DAV:", "lock-token-submitted")]);
    assert_eq!(
        response.response_description.as_deref(),
        Some("resource is locked")
    );
}

#[test]
fn unknown_children_are_skipped_at_every_level() {
    let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<D:multistatus xmlns:D="DAV:" xmlns:x="urn:x">
  <D:response>
    <x:surprise><x:nested>deep</x:nested></x:surprise>
    <D:href>/dav/item</D:href>
    <D:propstat>
      <x:more/>
      <D:prop><D:displayname>Still here</D:displayname></D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#;
    let parsed = parse(xml);
    let visible: Vec<_> = parsed[0].0.successful_properties().cloned().collect();
    assert_eq!(visible, vec![Property::DisplayName("Still here".into())]);
}
