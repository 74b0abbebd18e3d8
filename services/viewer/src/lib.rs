//! Live geodata viewer service library.
//!
//! This module exposes the internal modules for testing purposes.

pub mod client;
pub mod compositor;
pub mod poller;
pub mod scene;
pub mod server;
pub mod session;
pub mod surface;
