pub mod collection;

pub use collection::{DavCalendar, TimeRange, calendar_multiget_body, calendar_query_body};
