#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![doc = include_str!("../README.md")]

extern crate alloc;

#[cfg(feature = "tracing")]
#[doc(hidden)]
pub use tracing as __tracing;

#[cfg(feature = "tracing")]
#[macro_export]
#[doc(hidden)]
/// Forwards to tracing::trace when the tracing feature is enabled
macro_rules! trace {
    ($($tt:tt)*) => { $crate::__tracing::trace!($($tt)*) };
}
#[cfg(feature = "tracing")]
#[macro_export]
#[doc(hidden)]
/// Forwards to tracing::debug when the tracing feature is enabled
macro_rules! debug {
    ($($tt:tt)*) => { $crate::__tracing::debug!($($tt)*) };
}

#[cfg(not(feature = "tracing"))]
#[macro_export]
#[doc(hidden)]
/// Forwards to tracing::trace when the tracing feature is enabled
macro_rules! trace {
    ($($tt:tt)*) => {};
}
#[cfg(not(feature = "tracing"))]
#[macro_export]
#[doc(hidden)]
/// Forwards to tracing::debug when the tracing feature is enabled
macro_rules! debug {
    ($($tt:tt)*) => {};
}

// Type-erased pointers and owning-object handles
mod ptr;
pub use ptr::*;

mod flags;
pub use flags::*;

mod meta_type;
pub use meta_type::*;

// Per-shape data converters
mod translator;
pub use translator::*;

mod translate;
pub use translate::*;

mod field;
pub use field::*;

mod meta_struct;
pub use meta_struct::*;

mod composite;
pub use composite::*;

mod registry;
pub use registry::*;
