#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![doc = include_str!("../README.md")]

pub use metastruct_core::*;

mod registrar;
pub use registrar::*;

pub mod ops;
pub use ops::{copy, equals, is_default_value, serializable_fields, should_serialize};
