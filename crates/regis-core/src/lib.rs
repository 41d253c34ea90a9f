//! regis-core library.
//!
//! Pure domain logic for the regis admin console: entity types, the
//! filter/sort/paginate view engine, and client-side validation. No I/O.

pub mod model;
pub mod validate;
pub mod view;
