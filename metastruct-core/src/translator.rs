use core::fmt;
use core::marker::PhantomData;

use crate::{CopyFlags, Instance, InstanceMut, MetaStruct, Translate};

/// The data shape a translator handles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataShape {
    /// A single value compared and assigned as a whole
    Scalar,
    /// `[T; N]`
    FixedArray,
    /// Growable sequence (`Vec<T>`)
    Sequence,
    /// Set of unique elements
    Set,
    /// Key/value map
    Map,
    /// Reference-counted pointer
    Pointer,
    /// Nested composite, handled field by field
    Struct,
}

impl DataShape {
    /// Returns true for sequences, sets and maps
    #[inline]
    pub const fn is_container(self) -> bool {
        matches!(self, DataShape::Sequence | DataShape::Set | DataShape::Map)
    }
}

/// Reads, compares and copies values of one data shape at raw addresses.
///
/// A field owns exactly one translator and delegates every per-value
/// operation to it; the reflection core never looks at a field's memory
/// itself.
pub trait Translator: Send + Sync + 'static {
    /// The shape this translator handles
    fn shape(&self) -> DataShape;

    /// Name of the translated type, for diagnostics
    fn type_name(&self) -> &'static str;

    /// Size of one translated value, in bytes
    fn size(&self) -> usize;

    /// Compares the values at `a` and `b`.
    ///
    /// # Safety
    ///
    /// Both instances must point to initialized values of the translated type.
    unsafe fn equals(&self, a: Instance<'_>, b: Instance<'_>) -> bool;

    /// Assigns the value at `src` to the value at `dst`.
    ///
    /// # Safety
    ///
    /// Both instances must point to initialized values of the translated type,
    /// and `dst` must not be aliased for the duration of the call.
    unsafe fn copy(&self, src: Instance<'_>, dst: InstanceMut<'_>, flags: CopyFlags);
}

impl fmt::Debug for dyn Translator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}<{}>", self.shape(), self.type_name())
    }
}

/// Translator for any [`Translate`] type, dispatching to its typed operations.
pub struct TypedTranslator<T>(PhantomData<fn() -> T>);

impl<T> TypedTranslator<T> {
    /// Creates the translator
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for TypedTranslator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Translate> Translator for TypedTranslator<T> {
    fn shape(&self) -> DataShape {
        T::SHAPE
    }

    fn type_name(&self) -> &'static str {
        core::any::type_name::<T>()
    }

    fn size(&self) -> usize {
        core::mem::size_of::<T>()
    }

    unsafe fn equals(&self, a: Instance<'_>, b: Instance<'_>) -> bool {
        let (a, b) = unsafe { (a.data.get::<T>(), b.data.get::<T>()) };
        a.equals(b)
    }

    unsafe fn copy(&self, src: Instance<'_>, dst: InstanceMut<'_>, flags: CopyFlags) {
        let (src, dst) = unsafe { (src.data.get::<T>(), dst.data.as_mut::<T>()) };
        src.copy_to(dst, flags);
    }
}

/// Translator for a nested composite.
///
/// Recurses through the composite's own [`MetaStruct::equals`] and
/// [`MetaStruct::copy`], handing the owning objects down unchanged.
pub struct StructTranslator {
    meta_struct: fn() -> &'static MetaStruct,
}

impl StructTranslator {
    /// Creates a translator for the composite resolved by `meta_struct`
    pub const fn new(meta_struct: fn() -> &'static MetaStruct) -> Self {
        Self { meta_struct }
    }

    /// The composite this translator walks
    pub fn meta_struct(&self) -> &'static MetaStruct {
        (self.meta_struct)()
    }
}

impl Translator for StructTranslator {
    fn shape(&self) -> DataShape {
        DataShape::Struct
    }

    fn type_name(&self) -> &'static str {
        self.meta_struct().name()
    }

    fn size(&self) -> usize {
        self.meta_struct().size()
    }

    unsafe fn equals(&self, a: Instance<'_>, b: Instance<'_>) -> bool {
        unsafe { self.meta_struct().equals(a, b) }
    }

    unsafe fn copy(&self, src: Instance<'_>, dst: InstanceMut<'_>, flags: CopyFlags) {
        unsafe {
            self.meta_struct()
                .copy(src, dst, flags.contains(CopyFlags::SHALLOW))
        }
    }
}
