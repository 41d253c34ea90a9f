//! regis-client library.
//!
//! Everything that talks to the outside world on behalf of the console: the
//! authenticated REST client, the durable session store, the photo bucket
//! client, and the per-entity list controller that owns a collection
//! snapshot and its refetch-after-write discipline.

pub mod api;
pub mod config;
pub mod controller;
pub mod session;
pub mod storage;
