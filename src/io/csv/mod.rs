//! CSV reading operations.

mod read;

pub(crate) use read::*;
