//! HTTP request handlers.

pub(crate) mod assets;
pub(crate) mod lifecycle;
pub(crate) mod page;
