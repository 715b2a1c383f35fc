use alloc::sync::Arc;

use crate::{CopyFlags, DataShape, MetaKind, MetaTypeFn, MetaTypeRef, Translate, intern_meta_type};

// Shallow copies alias the pointee; deep copies allocate a fresh one.
unsafe impl<T: Translate + Default> Translate for Arc<T> {
    type Element = Self;
    const SHAPE: DataShape = DataShape::Pointer;
    const VALUE_TYPE: Option<MetaTypeFn> = Some(T::meta_type);

    fn meta_type() -> MetaTypeRef {
        intern_meta_type::<Self>(MetaKind::Pointer)
    }

    fn equals(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other) || (**self).equals(other)
    }

    fn copy_to(&self, dst: &mut Self, flags: CopyFlags) {
        if flags.contains(CopyFlags::SHALLOW) {
            *dst = Arc::clone(self);
        } else {
            let mut value = T::default();
            (**self).copy_to(&mut value, flags);
            *dst = Arc::new(value);
        }
    }
}
