use core::fmt;

use crate::MetaStruct;

/// Hashes a type or field name the way lookups expect it.
#[inline]
pub fn name_crc(name: &str) -> u32 {
    crc32fast::hash(name.as_bytes())
}

/// The kind of entity a type descriptor describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MetaKind {
    /// Plain composite, described by a [`MetaStruct`]
    Struct,
    /// Object-system class, also described by a [`MetaStruct`]
    Class,
    /// Enumeration
    Enum,
    /// Reference-counted pointer (`Arc<T>`)
    Pointer,
    /// Scalar such as an integer, a float, or a string
    Primitive,
    /// Sequence, set, map, or fixed array used as a container element
    Container,
}

impl MetaKind {
    /// Returns true for kinds described by a [`MetaStruct`]
    #[inline]
    pub const fn is_composite(self) -> bool {
        matches!(self, MetaKind::Struct | MetaKind::Class)
    }
}

/// The identity shared by every type descriptor: name, kind, and size.
#[derive(Debug)]
pub struct MetaType {
    name: &'static str,
    name_crc: u32,
    kind: MetaKind,
    size: usize,
}

impl MetaType {
    /// Describes a type with the given identity
    pub fn new(name: &'static str, kind: MetaKind, size: usize) -> Self {
        Self {
            name,
            name_crc: name_crc(name),
            kind,
            size,
        }
    }

    /// Declared name
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// CRC-32 of the name
    #[inline]
    pub fn name_crc(&self) -> u32 {
        self.name_crc
    }

    /// Kind tag
    #[inline]
    pub fn kind(&self) -> MetaKind {
        self.kind
    }

    /// Size of one value, in bytes
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }
}

/// Resolves a type descriptor on demand.
///
/// The indirection lets a composite mention its own type (through a container
/// field, say) while it is still being populated.
pub type MetaTypeFn = fn() -> MetaTypeRef;

/// A reference to any registered type descriptor.
#[derive(Clone, Copy)]
pub enum MetaTypeRef {
    /// A composite
    Struct(&'static MetaStruct),
    /// Any non-composite type
    Leaf(&'static MetaType),
}

impl MetaTypeRef {
    /// The shared descriptor header
    #[inline]
    pub fn meta(self) -> &'static MetaType {
        match self {
            MetaTypeRef::Struct(s) => s.meta_type(),
            MetaTypeRef::Leaf(m) => m,
        }
    }

    /// Declared name
    #[inline]
    pub fn name(self) -> &'static str {
        self.meta().name()
    }

    /// Kind tag
    #[inline]
    pub fn kind(self) -> MetaKind {
        self.meta().kind()
    }

    /// The composite descriptor, if this is one
    #[inline]
    pub fn as_struct(self) -> Option<&'static MetaStruct> {
        match self {
            MetaTypeRef::Struct(s) => Some(s),
            MetaTypeRef::Leaf(_) => None,
        }
    }
}

impl PartialEq for MetaTypeRef {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.meta(), other.meta())
    }
}

impl Eq for MetaTypeRef {}

impl fmt::Debug for MetaTypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self.kind(), self.name())
    }
}

impl fmt::Display for MetaTypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
