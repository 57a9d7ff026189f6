//! Test suites for the stdio server.

pub(crate) mod support;
