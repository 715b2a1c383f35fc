//! Binding Rust types to their composite descriptors.
//!
//! A type becomes a reflected composite by implementing [`Populate`] (which
//! declares its own fields) and invoking [`reflect_struct!`](crate::reflect_struct)
//! (which wires up [`Composite`], [`BaseComposite`] and [`Translate`](crate::Translate)).
//!
//! ```
//! use metastruct_core::{MetaStruct, Populate, add_field, reflect_struct};
//!
//! #[derive(Default)]
//! #[repr(C)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! impl Populate for Point {
//!     fn populate(meta: &mut MetaStruct) {
//!         add_field!(meta, Point, x, "x");
//!         add_field!(meta, Point, y, "y");
//!     }
//! }
//!
//! reflect_struct!(Point);
//! ```

use std::sync::OnceLock;

use crate::{MetaKind, MetaStruct};

/// Appends a composite's own fields to its descriptor.
pub trait Populate {
    /// Called exactly once, while the descriptor is being built
    fn populate(meta: &mut MetaStruct);
}

/// A Rust type described by a [`MetaStruct`].
///
/// Implemented through [`reflect_struct!`](crate::reflect_struct).
///
/// # Safety
///
/// When `Base` is not `()`, an instance of `Base` must live at offset 0 of
/// every instance of `Self`, since inherited field offsets are interpreted
/// against `Self`. [`reflect_struct!`](crate::reflect_struct) checks this at
/// compile time.
pub unsafe trait Composite: Populate + Default + Send + Sync + 'static {
    /// The base composite, `()` for roots
    type Base: BaseComposite;

    /// Registered name
    const NAME: &'static str;

    /// Struct or Class
    const KIND: MetaKind = MetaKind::Struct;

    /// The descriptor, built on first use
    fn meta_struct() -> &'static MetaStruct;
}

/// Something that can sit in the base position of a [`Composite`].
pub trait BaseComposite {
    /// The base descriptor, `None` for `()`
    fn base_meta_struct() -> Option<&'static MetaStruct>;
}

impl BaseComposite for () {
    fn base_meta_struct() -> Option<&'static MetaStruct> {
        None
    }
}

/// Holds a composite descriptor built at most once.
#[derive(Debug)]
pub struct MetaStructCell(OnceLock<&'static MetaStruct>);

impl MetaStructCell {
    /// An empty cell
    pub const fn new() -> Self {
        Self(OnceLock::new())
    }

    /// The descriptor, if it was built already
    pub fn get(&self) -> Option<&'static MetaStruct> {
        self.0.get().copied()
    }

    /// The descriptor of `T`, building it (and its bases) on first call
    pub fn get_or_create<T: Composite>(&self) -> &'static MetaStruct {
        *self.0.get_or_init(build_composite::<T>)
    }
}

impl Default for MetaStructCell {
    fn default() -> Self {
        Self::new()
    }
}

fn build_composite<T: Composite>() -> &'static MetaStruct {
    let mut builder = MetaStruct::builder_for::<T>(T::NAME)
        .kind(T::KIND)
        .populate(T::populate)
        .default_instance(T::default());
    if let Some(base) = T::Base::base_meta_struct() {
        builder = builder.base(base);
    }
    builder.build()
}

/// Implements [`Composite`], [`BaseComposite`] and
/// [`Translate`](crate::Translate) for a type implementing [`Populate`].
///
/// `reflect_struct!(Type)` declares a root composite and
/// `reflect_struct!(Type: Base { member })` a derived one whose base lives in
/// `member`. A leading `class` keyword gives it [`MetaKind::Class`].
///
/// The base member must be the first member of the type; anything else is
/// rejected at compile time:
///
/// ```compile_fail
/// use metastruct_core::{MetaStruct, Populate, reflect_struct};
///
/// #[derive(Default)]
/// struct Root {
///     a: u32,
/// }
///
/// impl Populate for Root {
///     fn populate(_meta: &mut MetaStruct) {}
/// }
///
/// reflect_struct!(Root);
///
/// #[derive(Default)]
/// #[repr(C)]
/// struct Misplaced {
///     pad: u32,
///     root: Root,
/// }
///
/// impl Populate for Misplaced {
///     fn populate(_meta: &mut MetaStruct) {}
/// }
///
/// reflect_struct!(Misplaced: Root { root });
/// ```
#[macro_export]
macro_rules! reflect_struct {
    (@composite $ty:ident, $kind:expr, $base:ty) => {
        // SAFETY: roots have no base; derived composites checked theirs
        // against the base member
        unsafe impl $crate::Composite for $ty {
            type Base = $base;
            const NAME: &'static str = ::core::stringify!($ty);
            const KIND: $crate::MetaKind = $kind;

            fn meta_struct() -> &'static $crate::MetaStruct {
                static CELL: $crate::MetaStructCell = $crate::MetaStructCell::new();
                CELL.get_or_create::<Self>()
            }
        }

        impl $crate::BaseComposite for $ty {
            fn base_meta_struct() -> ::core::option::Option<&'static $crate::MetaStruct> {
                ::core::option::Option::Some(<Self as $crate::Composite>::meta_struct())
            }
        }

        // SAFETY: a composite field is a single element of itself
        unsafe impl $crate::Translate for $ty {
            type Element = Self;
            const SHAPE: $crate::DataShape = $crate::DataShape::Struct;

            fn meta_type() -> $crate::MetaTypeRef {
                $crate::MetaTypeRef::Struct(<Self as $crate::Composite>::meta_struct())
            }

            fn translator() -> ::std::boxed::Box<dyn $crate::Translator> {
                ::std::boxed::Box::new($crate::StructTranslator::new(
                    <Self as $crate::Composite>::meta_struct,
                ))
            }

            fn equals(&self, other: &Self) -> bool {
                unsafe {
                    <Self as $crate::Composite>::meta_struct()
                        .equals($crate::Instance::of(self), $crate::Instance::of(other))
                }
            }

            fn copy_to(&self, dst: &mut Self, flags: $crate::CopyFlags) {
                unsafe {
                    <Self as $crate::Composite>::meta_struct().copy(
                        $crate::Instance::of(self),
                        $crate::InstanceMut::of(dst),
                        flags.contains($crate::CopyFlags::SHALLOW),
                    )
                }
            }
        }
    };
    (@impl $ty:ident, $kind:expr, ()) => {
        $crate::reflect_struct!(@composite $ty, $kind, ());
    };
    (@impl $ty:ident, $kind:expr, ($base:ty { $member:ident })) => {
        const _: () = {
            #[allow(dead_code)]
            fn base_member(composite: &$ty) -> &$base {
                &composite.$member
            }
            ::core::assert!(
                ::core::mem::offset_of!($ty, $member) == 0,
                "the base of a composite must be its first member"
            );
        };
        $crate::reflect_struct!(@composite $ty, $kind, $base);
    };
    (class $ty:ident $(: $base:ty { $member:ident })?) => {
        $crate::reflect_struct!(@impl $ty, $crate::MetaKind::Class, ($($base { $member })?));
    };
    ($ty:ident $(: $base:ty { $member:ident })?) => {
        $crate::reflect_struct!(@impl $ty, $crate::MetaKind::Struct, ($($base { $member })?));
    };
}

/// Declares a field of `Type` inside a [`Populate::populate`] body.
///
/// `add_field!(meta, Type, member, "name")` takes the member's offset and
/// type from the struct definition; an optional trailing argument gives the
/// [`FieldFlags`](crate::FieldFlags). Evaluates to the new `&mut Field`, so
/// properties can be chained.
///
/// A further argument replaces the deduced translator. That form expands to
/// a call of [`MetaStruct::add_field_translated`] and must sit in an
/// `unsafe` block, since the translator has to handle the member's type.
#[macro_export]
macro_rules! add_field {
    ($meta:expr, $ty:ty, $member:ident, $name:expr $(,)?) => {
        $crate::add_field!($meta, $ty, $member, $name, $crate::FieldFlags::empty())
    };
    ($meta:expr, $ty:ty, $member:ident, $name:expr, $flags:expr $(,)?) => {{
        let meta: &mut $crate::MetaStruct = $meta;
        let name: &'static str = $name;
        let flags: $crate::FieldFlags = $flags;
        // SAFETY: the offset and the projection name the same member
        unsafe {
            meta.add_field(
                |c: &$ty| &c.$member,
                ::core::mem::offset_of!($ty, $member),
                name,
                flags,
            )
        }
    }};
    ($meta:expr, $ty:ty, $member:ident, $name:expr, $flags:expr, $translator:expr $(,)?) => {
        $meta.add_field_translated(
            |c: &$ty| &c.$member,
            ::core::mem::offset_of!($ty, $member),
            $name,
            $flags,
            $translator,
        )
    };
}

/// Looks up the field stored at a member of `Type`.
///
/// The member path may go through the base: `find_field!(meta, Derived, base.a)`.
#[macro_export]
macro_rules! find_field {
    ($meta:expr, $ty:ty, $($member:tt).+) => {
        $meta.find_field_by_offset(::core::mem::offset_of!($ty, $($member).+))
    };
}
