//! SAML 2.0 types and data structures.
//!
//! The assertion and response models the token engine builds, plus the
//! protocol constants they are written with.

mod assertion;
mod constants;
mod name_id;
mod response;
mod status;

pub use assertion::*;
pub use constants::*;
pub use name_id::*;
pub use response::*;
pub use status::*;
