//! Typed entry points over the raw descriptor algorithms.
//!
//! Every function here checks that the field or composite it is handed
//! actually describes the value, so none of them are `unsafe`.

use metastruct_core::{Composite, Field, Instance, InstanceMut, MetaStruct};

/// Compares two values field by field, skipping shared fields
pub fn equals<T: Composite>(a: &T, b: &T) -> bool {
    // SAFETY: both values are instances of T
    unsafe { T::meta_struct().equals(Instance::of(a), Instance::of(b)) }
}

/// Copies `src` into `dst` through their most derived common composite.
///
/// Returns that composite, or `None` when the two types share none, in which
/// case `dst` is left untouched.
pub fn copy<S: Composite, D: Composite>(
    src: &S,
    dst: &mut D,
    shallow: bool,
) -> Option<&'static MetaStruct> {
    // SAFETY: `Composite` guarantees bases sit at offset 0, so the fields of
    // any common composite are valid in both values
    unsafe {
        MetaStruct::copy_between(
            S::meta_struct(),
            Instance::of(src),
            D::meta_struct(),
            InstanceMut::of(dst),
            shallow,
        )
    }
}

fn describes<T: Composite>(field: &Field, index: usize) -> bool {
    index < field.count()
        && field
            .structure()
            .is_some_and(|declaring| T::meta_struct().is_type(declaring))
}

/// Returns true if element `index` of `field` holds its default value in
/// `value`.
///
/// Fields that do not belong to `T`'s hierarchy, and out-of-range elements,
/// are never default.
pub fn is_default_value<T: Composite>(value: &T, field: &Field, index: usize) -> bool {
    if !describes::<T>(field, index) {
        return false;
    }
    // SAFETY: the field belongs to T's hierarchy and the element is in range
    unsafe { field.is_default_value(Instance::of(value), index) }
}

/// Returns true if element `index` of `field` should be serialized for
/// `value`.
///
/// Fields that do not belong to `T`'s hierarchy, and out-of-range elements,
/// are never serialized.
pub fn should_serialize<T: Composite>(value: &T, field: &Field, index: usize) -> bool {
    if !describes::<T>(field, index) {
        return false;
    }
    // SAFETY: the field belongs to T's hierarchy and the element is in range
    unsafe { field.should_serialize(Instance::of(value), index) }
}

/// The fields of `value` a serializer should write, in index order.
///
/// A static-array field is included when any of its elements should be.
pub fn serializable_fields<T: Composite>(value: &T) -> impl Iterator<Item = &'static Field> + '_ {
    T::meta_struct()
        .ordered_fields()
        .filter(move |field| (0..field.count()).any(|i| should_serialize(value, field, i)))
}
