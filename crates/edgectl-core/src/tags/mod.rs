//! Tag spec parsing and twin tag application.

pub mod apply;
pub mod spec;

pub use apply::TagApplier;
pub use spec::TagSpec;
