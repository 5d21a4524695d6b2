pub mod collection;

pub use collection::{
    DavAddressBook, MatchType, PropFilter, addressbook_multiget_body, addressbook_query_body,
};
