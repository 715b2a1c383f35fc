use crate::{CopyFlags, DataShape, MetaKind, MetaTypeFn, MetaTypeRef, Translate, intern_meta_type};

unsafe impl<T: Translate + Default> Translate for Vec<T> {
    type Element = Self;
    const SHAPE: DataShape = DataShape::Sequence;
    const VALUE_TYPE: Option<MetaTypeFn> = Some(T::meta_type);

    fn meta_type() -> MetaTypeRef {
        intern_meta_type::<Self>(MetaKind::Container)
    }

    fn equals(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.equals(b))
    }

    fn copy_to(&self, dst: &mut Self, flags: CopyFlags) {
        dst.truncate(self.len());
        for (src, dst) in self.iter().zip(dst.iter_mut()) {
            src.copy_to(dst, flags);
        }
        let start = dst.len();
        dst.reserve(self.len() - start);
        for src in &self[start..] {
            let mut item = T::default();
            src.copy_to(&mut item, flags);
            dst.push(item);
        }
    }
}
