//! Typed conversions behind [`TypedTranslator`](crate::TypedTranslator).
//!
//! A type implementing [`Translate`] knows how to compare itself and copy
//! itself into another value, and which descriptors its key and value
//! elements have. Field registration reads these at compile time to pick the
//! shape, the element count and the translator of a field.

use crate::{CopyFlags, DataShape, MetaTypeFn, MetaTypeRef, Translator, TypedTranslator};

mod array;
mod map;
mod pointer;
mod scalar;
mod sequence;
mod set;

/// A value the reflection core can compare and copy.
///
/// `equals` must be reflexive: a value always equals itself.
///
/// # Safety
///
/// A `Self` must consist of exactly `COUNT` consecutive `Element`s, since
/// fields of this type are read and written element by element. Types
/// other than arrays satisfy this with `Element = Self` and `COUNT = 1`.
pub unsafe trait Translate: Sized + 'static {
    /// What a field of this type stores per element: `T` for `[T; N]`,
    /// `Self` for everything else.
    type Element: Translate;

    /// Elements per field: `N` for `[T; N]`, 1 for everything else
    const COUNT: usize = 1;

    /// Shape reported by this type's translator
    const SHAPE: DataShape;

    /// Key descriptor of map-like types
    const KEY_TYPE: Option<MetaTypeFn> = None;

    /// Element descriptor of sequences and sets, value descriptor of maps,
    /// pointee descriptor of pointers
    const VALUE_TYPE: Option<MetaTypeFn> = None;

    /// Descriptor of this type, resolved (or allocated) through the registry
    fn meta_type() -> MetaTypeRef;

    /// Translator bound to fields of this type
    fn translator() -> Box<dyn Translator> {
        Box::new(TypedTranslator::<Self>::new())
    }

    /// Deep comparison
    fn equals(&self, other: &Self) -> bool;

    /// Assigns `self` into `dst`, aliasing pointer-shaped values when `flags`
    /// contains [`CopyFlags::SHALLOW`]
    fn copy_to(&self, dst: &mut Self, flags: CopyFlags);
}
