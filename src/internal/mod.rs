//! Internal helper functions.
//!
//! Key parsing, legacy key unlocking and key usability checks shared by
//! the key store and the encryption pipeline. Not part of the public API.

mod helpers;
mod legacy;
mod policy;

pub(crate) use helpers::*;
pub(crate) use legacy::*;
pub(crate) use policy::*;
