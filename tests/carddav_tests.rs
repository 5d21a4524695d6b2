use std::sync::Arc;

use dav_engine_rs::{
    DavAddressBook, DavError, DavResponse, HrefRelation, PropFilter, Property, Transport, names,
};
use url::Url;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn addressbook_at(server: &MockServer, rel: &str) -> DavAddressBook {
    let url = Url::parse(&format!("{}{}", server.uri(), rel)).unwrap();
    DavAddressBook::new(Arc::new(Transport::new()), url)
}

#[tokio::test]
async fn addressbook_query_filters_by_uid() {
    let server = MockServer::start().await;
    let body = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
<D:multistatus xmlns:D=\"DAV:\" xmlns:R=\"urn:ietf:params:xml:ns:carddav\">\n\
  <D:response>\n\
    <D:href>/dav/contacts/jane.vcf</D:href>\n\
    <D:propstat>\n\
      <D:prop>\n\
        <D:getetag>\"v5\"</D:getetag>\n\
        <R:address-data>BEGIN:VCARD\r\nVERSION:4.0\r\nUID:jane-1\r\nFN:Jane Doe\r\nEND:VCARD\r\n</R:address-data>\n\
      </D:prop>\n\
      <D:status>HTTP/1.1 200 OK</D:status>\n\
    </D:propstat>\n\
  </D:response>\n\
</D:multistatus>";
    Mock::given(method("REPORT"))
        .and(path("/dav/contacts/"))
        .and(header("Depth", "1"))
        .and(body_string_contains("<CARD:prop-filter name=\"UID\">"))
        .and(body_string_contains(
            "<CARD:text-match match-type=\"equals\">jane-1</CARD:text-match>",
        ))
        .respond_with(ResponseTemplate::new(207).set_body_raw(body, "application/xml"))
        .expect(1)
        .mount(&server)
        .await;

    let mut addressbook = addressbook_at(&server, "/dav/contacts/");
    let filter = PropFilter::equals("UID", "jane-1");
    let mut seen = Vec::new();
    let mut on_response = |response: DavResponse, relation: HrefRelation| -> Result<(), DavError> {
        seen.push((response, relation));
        Ok(())
    };
    addressbook
        .addressbook_query(
            Some(&filter),
            &[names::GETETAG, names::ADDRESS_DATA],
            &mut on_response,
        )
        .await
        .unwrap();

    assert_eq!(seen.len(), 1);
    let Some(Property::AddressData(vcard)) = seen[0].0.property(&names::ADDRESS_DATA) else {
        panic!("address-data missing");
    };
    assert!(vcard.contains("FN:Jane Doe"));
    assert!(vcard.ends_with("END:VCARD\r\n"));
}

#[tokio::test]
async fn addressbook_multiget_fetches_known_members() {
    let server = MockServer::start().await;
    let body = r#"<?xml version="1.0" encoding="utf-8"?>
<D:multistatus xmlns:D="DAV:">
  <D:response>
    <D:href>/dav/contacts/a.vcf</D:href>
    <D:propstat>
      <D:prop><D:getetag>"a"</D:getetag></D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#;
    Mock::given(method("REPORT"))
        .and(path("/dav/contacts/"))
        .and(body_string_contains("<CARD:addressbook-multiget"))
        .and(body_string_contains("<href>/dav/contacts/a.vcf</href>"))
        .respond_with(ResponseTemplate::new(207).set_body_raw(body, "application/xml"))
        .expect(1)
        .mount(&server)
        .await;

    let mut addressbook = addressbook_at(&server, "/dav/contacts/");
    let hrefs = vec!["/dav/contacts/a.vcf".to_owned()];
    let mut seen: Vec<(DavResponse, HrefRelation)> = Vec::new();
    addressbook
        .addressbook_multiget(&hrefs, &[names::GETETAG], &mut seen)
        .await
        .unwrap();

    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].1, HrefRelation::Member);
}

#[tokio::test]
async fn collection_verbs_are_available_on_specializations() {
    // DavAddressBook derefs down to DavResource, so plain WebDAV verbs work.
    let server = MockServer::start().await;
    Mock::given(method("OPTIONS"))
        .respond_with(ResponseTemplate::new(200).insert_header("DAV", "1, 3, addressbook"))
        .expect(1)
        .mount(&server)
        .await;

    let mut addressbook = addressbook_at(&server, "/dav/contacts/");
    let capabilities = addressbook.options().await.unwrap();
    assert!(capabilities.contains("addressbook"));
}
