//! Type tags and the alias registry
//!
//! Every property declares a [`TypeTag`]. Tags are written to and read from the
//! wire through a [`TypeRegistry`], which maps short aliases such as `int` or
//! `LocalDate` to tags and back.

pub mod registry;
pub mod tag;

pub use registry::TypeRegistry;
pub use tag::TypeTag;
