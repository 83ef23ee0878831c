//! callpath library: call graph construction over parsed source facts, and call path queries.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod server;
