use dav_engine_rs::webdav::{check_multistatus, parse_multistatus};
use dav_engine_rs::{DavError, DavResponse, HrefRelation, Property};
use url::Url;

fn base() -> Url {
    Url::parse("https://example.com/dav/").unwrap()
}

#[test]
fn minimal_propfind_round_trip() {
    let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<multistatus xmlns="DAV:">
  <response>
    <href>/dav/</href>
    <propstat>
      <prop><displayname>My Collection</displayname></prop>
      <status>HTTP/1.1 200 OK</status>
    </propstat>
  </response>
</multistatus>"#;

    let mut seen = Vec::new();
    let mut on_response = |response: DavResponse, relation: HrefRelation| -> Result<(), DavError> {
        seen.push((response, relation));
        Ok(())
    };
    let residual = parse_multistatus(xml.as_bytes(), &base(), &mut on_response).unwrap();

    assert!(residual.is_empty());
    assert_eq!(seen.len(), 1);
    let (response, relation) = &seen[0];
    assert_eq!(*relation, HrefRelation::Same);
    assert_eq!(response.href.path(), "/dav/");
    assert_eq!(response.propstat.len(), 1);
    assert_eq!(response.propstat[0].status.code, 200);
    assert_eq!(
        response.propstat[0].properties,
        vec![Property::DisplayName("My Collection".into())]
    );
}

#[test]
fn responses_dispatch_in_document_order_with_residual_sync_token() {
    let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<D:multistatus xmlns:D="DAV:">
  <D:response>
    <D:href>/dav/one.ics</D:href>
    <D:propstat>
      <D:prop><D:getetag>"1"</D:getetag></D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
  <D:response>
    <D:href>/dav/two.ics</D:href>
    <D:propstat>
      <D:prop><D:getetag>"2"</D:getetag></D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
  <D:sync-token>urn:s:42</D:sync-token>
</D:multistatus>"#;

    let mut collected: Vec<(DavResponse, HrefRelation)> = Vec::new();
    let residual = parse_multistatus(xml.as_bytes(), &base(), &mut collected).unwrap();

    assert_eq!(collected.len(), 2);
    assert_eq!(collected[0].0.href.path(), "/dav/one.ics");
    assert_eq!(collected[1].0.href.path(), "/dav/two.ics");
    assert_eq!(residual, vec![Property::SyncToken("urn:s:42".into())]);
}

#[test]
fn empty_body_is_incomplete_multistatus() {
    let mut sink: Vec<(DavResponse, HrefRelation)> = Vec::new();
    let err = parse_multistatus(b"", &base(), &mut sink).unwrap_err();
    assert!(matches!(err, DavError::InvalidMultiStatus(_)), "{err}");
}

#[test]
fn truncated_body_is_incomplete_multistatus() {
    let xml = r#"<?xml version="1.0"?><D:multistatus xmlns:D="DAV:"><D:response><D:href>/a"#;
    let mut sink: Vec<(DavResponse, HrefRelation)> = Vec::new();
    let err = parse_multistatus(xml.as_bytes(), &base(), &mut sink).unwrap_err();
    assert!(matches!(err, DavError::InvalidMultiStatus(_)), "{err}");
}

#[test]
fn malformed_xml_carries_parser_diagnostic() {
    let xml = r#"<?xml version="1.0"?><D:multistatus xmlns:D="DAV:"><D:response></D:mismatch>"#;
    let mut sink: Vec<(DavResponse, HrefRelation)> = Vec::new();
    let err = parse_multistatus(xml.as_bytes(), &base(), &mut sink).unwrap_err();
    assert!(matches!(err, DavError::InvalidMultiStatus(_)), "{err}");
}

#[test]
fn wrong_root_element_is_rejected() {
    let xml = r#"<?xml version="1.0"?><wrong xmlns="DAV:"/>"#;
    let mut sink: Vec<(DavResponse, HrefRelation)> = Vec::new();
    let err = parse_multistatus(xml.as_bytes(), &base(), &mut sink).unwrap_err();
    assert!(matches!(err, DavError::InvalidMultiStatus(_)), "{err}");
}

#[test]
fn callback_failure_aborts_the_parse() {
    let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<D:multistatus xmlns:D="DAV:">
  <D:response>
    <D:href>/dav/one.ics</D:href>
    <D:status>HTTP/1.1 200 OK</D:status>
  </D:response>
  <D:response>
    <D:href>/dav/two.ics</D:href>
    <D:status>HTTP/1.1 200 OK</D:status>
  </D:response>
</D:multistatus>"#;

    let mut calls = 0usize;
    let mut failing = |_: DavResponse, _: HrefRelation| -> Result<(), DavError> {
        calls += 1;
        Err(DavError::InvalidMultiStatus("caller gave up".into()))
    };
    let err = parse_multistatus(xml.as_bytes(), &base(), &mut failing).unwrap_err();
    assert!(matches!(err, DavError::InvalidMultiStatus(_)));
    assert_eq!(calls, 1);
}

#[test]
fn unknown_top_level_elements_are_skipped() {
    let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<D:multistatus xmlns:D="DAV:" xmlns:x="urn:x">
  <x:stats><x:count>2</x:count></x:stats>
  <D:response>
    <D:href>/dav/item</D:href>
    <D:status>HTTP/1.1 200 OK</D:status>
  </D:response>
</D:multistatus>"#;
    let mut collected: Vec<(DavResponse, HrefRelation)> = Vec::new();
    let residual = parse_multistatus(xml.as_bytes(), &base(), &mut collected).unwrap();
    assert_eq!(collected.len(), 1);
    assert!(residual.is_empty());
}

#[test]
fn precheck_requires_207() {
    let err = check_multistatus(200, Some("application/xml"), b"<?xml").unwrap_err();
    assert!(matches!(
        err,
        DavError::UnexpectedStatus { status: 200, .. }
    ));
}

#[test]
fn precheck_accepts_xml_content_types() {
    check_multistatus(207, Some("application/xml"), b"").unwrap();
    check_multistatus(207, Some("text/xml; charset=UTF-8"), b"").unwrap();
    check_multistatus(207, Some("Application/XML; charset=utf-8"), b"").unwrap();
}

#[test]
fn precheck_sniffs_mislabeled_xml() {
    let body = br#"<?xml version="1.0"?><multistatus xmlns="DAV:"/>"#;
    check_multistatus(207, Some("text/plain"), body).unwrap();
}

#[test]
fn precheck_rejects_non_xml_bodies() {
    let err = check_multistatus(207, Some("text/plain"), b"hello").unwrap_err();
    assert!(matches!(err, DavError::NonXmlMultiStatus(_)), "{err}");
}

#[test]
fn precheck_tolerates_missing_content_type() {
    check_multistatus(207, None, b"<?xml...").unwrap();
}
