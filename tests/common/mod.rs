//! Fact fixtures and port mocks shared by the integration tests.
//! Included with `mod common;`, never built as its own test binary.
#![allow(dead_code)]

pub mod fixtures;
pub mod mock;
