pub mod compression;
pub mod http;

pub use compression::{ContentEncoding, add_accept_encoding, decompress_body, detect_encodings};
pub use http::{HyperClient, Transport, build_hyper_client};
