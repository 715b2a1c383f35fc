use core::fmt;
use core::str::FromStr;
use std::sync::OnceLock;

use indexmap::IndexMap;

use crate::{
    CopyFlags, FieldFlags, Instance, InstanceMut, MetaStruct, MetaTypeFn, MetaTypeRef, Translator,
    name_crc,
};

/// Describes one member slot of a composite.
///
/// Fields are created while their composite is populated. Their layout never
/// changes afterwards; only properties can be added to a field while it is
/// being declared.
///
/// ```compile_fail
/// fn shift(field: &mut metastruct_core::Field) {
///     field.offset += 4;
/// }
/// ```
pub struct Field {
    /// the composite declaring this field, bound once population completes
    pub(crate) structure: OnceLock<&'static MetaStruct>,

    name: &'static str,
    name_crc: u32,
    size: usize,
    count: usize,
    offset: usize,
    flags: FieldFlags,
    index: usize,
    key_type: Option<MetaTypeFn>,
    value_type: Option<MetaTypeFn>,
    translator: Box<dyn Translator>,
    properties: IndexMap<&'static str, String>,
}

/// Everything [`Field::new`] needs besides the translator.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FieldLayout {
    pub name: &'static str,
    pub size: usize,
    pub count: usize,
    pub offset: usize,
    pub flags: FieldFlags,
    pub index: usize,
    pub key_type: Option<MetaTypeFn>,
    pub value_type: Option<MetaTypeFn>,
}

impl Field {
    pub(crate) fn new(layout: FieldLayout, translator: Box<dyn Translator>) -> Self {
        Self {
            structure: OnceLock::new(),
            name: layout.name,
            name_crc: name_crc(layout.name),
            size: layout.size,
            count: layout.count,
            offset: layout.offset,
            flags: layout.flags,
            index: layout.index,
            key_type: layout.key_type,
            value_type: layout.value_type,
            translator,
            properties: IndexMap::new(),
        }
    }

    /// The composite declaring this field.
    ///
    /// Always `Some` once the composite has been built; `None` only while the
    /// populate callback is still running.
    #[inline]
    pub fn structure(&self) -> Option<&'static MetaStruct> {
        self.structure.get().copied()
    }

    /// Declared name
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// CRC-32 of the name, the key for [`MetaStruct::find_field_by_name`]
    #[inline]
    pub fn name_crc(&self) -> u32 {
        self.name_crc
    }

    /// Size of one element, in bytes
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of elements: `N` for a `[T; N]` field, 1 otherwise
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Offset from the start of the complete composite instance
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Default behavior towards serializers and editors
    #[inline]
    pub fn flags(&self) -> FieldFlags {
        self.flags
    }

    /// Position in the complete hierarchy of the declaring composite: base
    /// fields come first, then declaration order
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Key descriptor, for map-like fields
    #[inline]
    pub fn key_type(&self) -> Option<MetaTypeRef> {
        self.key_type.map(|f| f())
    }

    /// Element descriptor, for sequence, set, map and pointer fields
    #[inline]
    pub fn value_type(&self) -> Option<MetaTypeRef> {
        self.value_type.map(|f| f())
    }

    /// The translator bound to this field
    #[inline]
    pub fn translator(&self) -> &dyn Translator {
        &*self.translator
    }

    /// Returns true for `[T; N]` fields with N other than 1
    #[inline]
    pub fn is_static_array(&self) -> bool {
        self.count != 1
    }

    /// Returns true if this field is a shared reference
    #[inline]
    pub fn is_shared(&self) -> bool {
        self.flags.contains(FieldFlags::SHARE)
    }

    /// Returns true if generic editors should not show this field
    #[inline]
    pub fn is_hidden(&self) -> bool {
        self.flags.contains(FieldFlags::HIDE)
    }

    /// Returns true if generic editors should not edit this field
    #[inline]
    pub fn is_read_only(&self) -> bool {
        self.flags.contains(FieldFlags::READ_ONLY)
    }

    /// Sets a string property, replacing any previous value for `key`
    pub fn set_property(&mut self, key: &'static str, value: impl ToString) -> &mut Self {
        self.properties.insert(key, value.to_string());
        self
    }

    /// Returns a property's raw value
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Returns a property parsed as `T`; `None` if absent or unparsable
    pub fn property_as<T: FromStr>(&self, key: &str) -> Option<T> {
        self.property(key).and_then(|raw| raw.parse().ok())
    }

    /// All properties, in the order they were first set
    pub fn properties(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.properties.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Address of element `index` of this field inside `instance`.
    ///
    /// # Safety
    ///
    /// `instance` must point to an instance of the declaring composite (or of
    /// a composite derived from it) and `index` must be below `count`.
    #[inline]
    pub unsafe fn element<'o>(&self, instance: Instance<'o>, index: usize) -> Instance<'o> {
        debug_assert!(index < self.count, "element {index} of {}", self.name);
        unsafe { instance.at(self.offset + index * self.size) }
    }

    /// Mutable address of element `index` of this field inside `instance`.
    ///
    /// # Safety
    ///
    /// See [`Field::element`].
    #[inline]
    pub unsafe fn element_mut<'o>(&self, instance: InstanceMut<'o>, index: usize) -> InstanceMut<'o> {
        debug_assert!(index < self.count, "element {index} of {}", self.name);
        unsafe { instance.at(self.offset + index * self.size) }
    }

    /// Compares every element of this field in `a` and `b`.
    ///
    /// # Safety
    ///
    /// Both instances must point to instances of the declaring composite or
    /// of composites derived from it.
    pub unsafe fn equals(&self, a: Instance<'_>, b: Instance<'_>) -> bool {
        (0..self.count).all(|i| unsafe {
            self.translator
                .equals(self.element(a, i), self.element(b, i))
        })
    }

    /// Copies every element of this field from `src` to `dst`.
    ///
    /// # Safety
    ///
    /// See [`Field::equals`]; `dst` must additionally be writable and not
    /// overlap `src`.
    pub unsafe fn copy(&self, src: Instance<'_>, dst: InstanceMut<'_>, flags: CopyFlags) {
        for i in 0..self.count {
            unsafe {
                self.translator
                    .copy(self.element(src, i), self.element_mut(dst, i), flags)
            }
        }
    }

    /// Returns true if element `index` of this field holds the same value as
    /// in the declaring composite's default instance.
    ///
    /// A composite without a default instance has no default values: this
    /// then always returns false.
    ///
    /// # Safety
    ///
    /// See [`Field::element`].
    pub unsafe fn is_default_value(&self, instance: Instance<'_>, index: usize) -> bool {
        let Some(default) = self.structure().and_then(MetaStruct::default_instance) else {
            return false;
        };
        unsafe {
            self.translator.equals(
                self.element(instance, index),
                self.element(Instance::new(default), index),
            )
        }
    }

    /// Returns true if element `index` of this field should be written by a
    /// serializer.
    ///
    /// `FORCE` fields always serialize (even when also `DISCARD`), `DISCARD`
    /// fields never do, and other fields serialize unless they hold their
    /// default value.
    ///
    /// # Safety
    ///
    /// See [`Field::element`].
    pub unsafe fn should_serialize(&self, instance: Instance<'_>, index: usize) -> bool {
        if self.flags.contains(FieldFlags::FORCE) {
            return true;
        }
        if self.flags.contains(FieldFlags::DISCARD) {
            return false;
        }
        !unsafe { self.is_default_value(instance, index) }
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("index", &self.index)
            .field("offset", &self.offset)
            .field("size", &self.size)
            .field("count", &self.count)
            .field("flags", &self.flags)
            .field("translator", &self.translator)
            .finish_non_exhaustive()
    }
}
