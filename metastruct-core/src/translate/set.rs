use alloc::collections::BTreeSet;
use core::hash::{BuildHasher, Hash};
use std::collections::HashSet;

use crate::{CopyFlags, DataShape, MetaKind, MetaTypeFn, MetaTypeRef, Translate, intern_meta_type};

// Set elements are immutable while they are members, so copies clone them
// instead of going through `copy_to`.

unsafe impl<T: Translate + Ord + Clone> Translate for BTreeSet<T> {
    type Element = Self;
    const SHAPE: DataShape = DataShape::Set;
    const VALUE_TYPE: Option<MetaTypeFn> = Some(T::meta_type);

    fn meta_type() -> MetaTypeRef {
        intern_meta_type::<Self>(MetaKind::Container)
    }

    fn equals(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.equals(b))
    }

    fn copy_to(&self, dst: &mut Self, _flags: CopyFlags) {
        dst.clone_from(self);
    }
}

unsafe impl<T, S> Translate for HashSet<T, S>
where
    T: Translate + Eq + Hash + Clone,
    S: BuildHasher + Default + 'static,
{
    type Element = Self;
    const SHAPE: DataShape = DataShape::Set;
    const VALUE_TYPE: Option<MetaTypeFn> = Some(T::meta_type);

    fn meta_type() -> MetaTypeRef {
        intern_meta_type::<Self>(MetaKind::Container)
    }

    fn equals(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|item| other.contains(item))
    }

    fn copy_to(&self, dst: &mut Self, _flags: CopyFlags) {
        dst.clear();
        dst.extend(self.iter().cloned());
    }
}
