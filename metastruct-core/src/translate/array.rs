use crate::{CopyFlags, DataShape, MetaKind, MetaTypeFn, MetaTypeRef, Translate, intern_meta_type};

// A field declared as `[T; N]` stores N elements of T, each handled by T's
// translator. The array translator itself is only used when arrays are
// nested inside containers.
unsafe impl<T: Translate, const N: usize> Translate for [T; N] {
    type Element = T;
    const COUNT: usize = N;
    const SHAPE: DataShape = DataShape::FixedArray;
    const VALUE_TYPE: Option<MetaTypeFn> = Some(T::meta_type);

    fn meta_type() -> MetaTypeRef {
        intern_meta_type::<Self>(MetaKind::Container)
    }

    fn equals(&self, other: &Self) -> bool {
        self.iter().zip(other).all(|(a, b)| a.equals(b))
    }

    fn copy_to(&self, dst: &mut Self, flags: CopyFlags) {
        for (src, dst) in self.iter().zip(dst.iter_mut()) {
            src.copy_to(dst, flags);
        }
    }
}
