use crate::{CopyFlags, DataShape, MetaKind, MetaTypeRef, Translate, intern_meta_type};

macro_rules! impl_translate_scalar {
    (@impl $($ty:ty),* => |$a:ident, $b:ident| $eq:expr) => {
        $(
            unsafe impl Translate for $ty {
                type Element = Self;
                const SHAPE: DataShape = DataShape::Scalar;

                fn meta_type() -> MetaTypeRef {
                    intern_meta_type::<Self>(MetaKind::Primitive)
                }

                #[inline]
                #[allow(clippy::float_cmp)]
                fn equals(&self, other: &Self) -> bool {
                    let ($a, $b) = (self, other);
                    $eq
                }

                #[inline]
                fn copy_to(&self, dst: &mut Self, _flags: CopyFlags) {
                    dst.clone_from(self);
                }
            }
        )*
    };
    (@float $($ty:ty),* $(,)?) => {
        impl_translate_scalar!(@impl $($ty),* => |a, b| {
            // any NaN equals any other NaN
            a == b || (a.is_nan() && b.is_nan())
        });
    };
    ($($ty:ty),* $(,)?) => {
        impl_translate_scalar!(@impl $($ty),* => |a, b| a == b);
    };
}

impl_translate_scalar!(
    bool,
    char,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    String,
);

impl_translate_scalar!(@float f32, f64);
