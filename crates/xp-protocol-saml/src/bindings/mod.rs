//! Transport encodings for signed responses.
//!
//! The portals exchange tokens through an HTML form posted by the browser.

pub mod post;

pub use post::{decode_post_message, encode_post_message};
