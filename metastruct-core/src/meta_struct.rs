use core::any::{Any, TypeId};
use core::fmt;

use parking_lot::RwLock;

use crate::field::FieldLayout;
use crate::{
    CopyFlags, Field, FieldFlags, Instance, InstanceMut, MetaKind, MetaType, MetaTypeRef,
    PtrConst, RegistryError, Translate, Translator, debug, name_crc, registry, trace,
};

/// Callback appending a composite's own fields, invoked once at construction.
pub type PopulateFn = fn(&mut MetaStruct);

/// Default instance kept by a composite for default-value comparisons.
pub type DefaultInstance = Box<dyn Any + Send + Sync>;

/// Describes a composite type: its own fields, its base, and the composites
/// derived from it.
///
/// The base/derived links form a single-inheritance forest that exists only
/// at runtime; it does not depend on any Rust-level relationship between the
/// described types. Descriptors are built once, leaked, and read-only from
/// then on, except for the derived set which changes at (un)registration.
pub struct MetaStruct {
    meta: MetaType,
    type_id: Option<TypeId>,
    base: Option<&'static MetaStruct>,
    derived: RwLock<Vec<&'static MetaStruct>>,
    fields: Vec<Field>,
    first_index: usize,
    populate: Option<PopulateFn>,
    default: Option<DefaultInstance>,
}

impl MetaStruct {
    /// Starts building a composite descriptor not tied to a Rust type
    pub fn builder(name: &'static str) -> MetaStructBuilder {
        MetaStructBuilder::new(name)
    }

    /// Starts building the descriptor of `T`
    pub fn builder_for<T: 'static>(name: &'static str) -> MetaStructBuilder {
        let mut builder = MetaStructBuilder::new(name);
        builder.size = core::mem::size_of::<T>();
        builder.type_id = Some(TypeId::of::<T>());
        builder
    }

    /// The shared descriptor header
    #[inline]
    pub fn meta_type(&self) -> &MetaType {
        &self.meta
    }

    /// This descriptor as a registry reference
    #[inline]
    pub fn as_type_ref(&'static self) -> MetaTypeRef {
        MetaTypeRef::Struct(self)
    }

    /// Declared name
    #[inline]
    pub fn name(&self) -> &'static str {
        self.meta.name()
    }

    /// Struct or Class
    #[inline]
    pub fn kind(&self) -> MetaKind {
        self.meta.kind()
    }

    /// Size of a complete instance, in bytes
    #[inline]
    pub fn size(&self) -> usize {
        self.meta.size()
    }

    /// The Rust type this composite describes, when it was built for one
    #[inline]
    pub fn type_id(&self) -> Option<TypeId> {
        self.type_id
    }

    /// The base composite, `None` for roots
    #[inline]
    pub fn base(&self) -> Option<&'static MetaStruct> {
        self.base
    }

    /// Own fields in declaration order, excluding inherited ones
    #[inline]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// The callback that populated this composite, if any
    #[inline]
    pub fn populate_fn(&self) -> Option<PopulateFn> {
        self.populate
    }

    /// Address of the default instance, if this composite keeps one
    #[inline]
    pub fn default_instance(&self) -> Option<PtrConst> {
        self.default.as_deref().map(PtrConst::from_ref)
    }

    /// Composites currently registered as derived from this one
    pub fn derived(&self) -> Vec<&'static MetaStruct> {
        self.derived.read().clone()
    }

    /// This composite, then its base, then the base's base, up to the root
    pub fn hierarchy(&self) -> Hierarchy<'_> {
        Hierarchy { next: Some(self) }
    }

    /// Every field of the complete hierarchy: own fields first, then
    /// inherited ones level by level
    pub fn all_fields(&self) -> impl Iterator<Item = &Field> + '_ {
        self.hierarchy().flat_map(|level| level.fields.iter())
    }

    /// Every field of the complete hierarchy in index order, root first
    pub fn ordered_fields(&self) -> impl Iterator<Item = &Field> + '_ {
        let levels: Vec<&MetaStruct> = self.hierarchy().collect();
        levels
            .into_iter()
            .rev()
            .flat_map(|level| level.fields.iter())
    }

    /// Number of fields declared by all ancestors; the index of this
    /// composite's first own field
    #[inline]
    pub fn base_field_count(&self) -> usize {
        self.first_index
    }

    /// Number of fields in the complete hierarchy
    #[inline]
    pub fn field_count(&self) -> usize {
        self.first_index + self.fields.len()
    }

    /// Returns true if this composite is `other` or derives from it
    pub fn is_type(&self, other: &MetaStruct) -> bool {
        self.hierarchy().any(|level| core::ptr::eq(level, other))
    }

    /// The most derived composite that both `self` and `other` are
    pub fn common_base<'a>(&'a self, other: &MetaStruct) -> Option<&'a MetaStruct> {
        self.hierarchy().find(|level| other.is_type(level))
    }

    /// Adds `derived` to this composite's derived set.
    ///
    /// Adding a composite that is already present does nothing.
    pub fn add_derived(&self, derived: &'static MetaStruct) {
        assert!(
            !self.is_type(derived),
            "{} cannot derive from {}: the derived forest would contain a cycle",
            derived.name(),
            self.name()
        );
        debug_assert!(
            derived.base.is_some_and(|base| core::ptr::eq(base, self)),
            "{} does not have {} as its base",
            derived.name(),
            self.name()
        );
        let mut set = self.derived.write();
        if !set.iter().any(|d| core::ptr::eq(*d, derived)) {
            set.push(derived);
        }
    }

    /// Removes `derived` from this composite's derived set, leaving its
    /// siblings in place
    pub fn remove_derived(&self, derived: &MetaStruct) {
        self.derived
            .write()
            .retain(|d| !core::ptr::eq(*d, derived));
    }

    /// Finds a field anywhere in the hierarchy by the CRC-32 of its name.
    ///
    /// Own fields shadow inherited fields of the same name.
    pub fn find_field_by_name(&self, crc: u32) -> Option<&Field> {
        self.all_fields().find(|field| field.name_crc() == crc)
    }

    /// Finds a field anywhere in the hierarchy by name
    pub fn find_field_named(&self, name: &str) -> Option<&Field> {
        self.find_field_by_name(name_crc(name))
    }

    /// Finds the field whose hierarchy-wide index is `index`
    pub fn find_field_by_index(&self, index: usize) -> Option<&Field> {
        let mut level = self;
        loop {
            if index >= level.first_index {
                return level.fields.get(index - level.first_index);
            }
            level = level.base?;
        }
    }

    /// Finds the field stored at `offset` bytes into an instance
    pub fn find_field_by_offset(&self, offset: usize) -> Option<&Field> {
        self.all_fields().find(|field| field.offset() == offset)
    }

    /// Compares two instances field by field.
    ///
    /// Every field of the complete hierarchy takes part except `SHARE` ones;
    /// the comparison stops at the first field that differs. A composite
    /// without fields compares equal, so comparing through a common root that
    /// declares nothing is vacuously true. An instance always equals itself.
    ///
    /// # Safety
    ///
    /// `a` and `b` must point to instances of this composite or of composites
    /// derived from it.
    pub unsafe fn equals(&self, a: Instance<'_>, b: Instance<'_>) -> bool {
        if a.data.as_byte_ptr() == b.data.as_byte_ptr() {
            return true;
        }
        for field in self.all_fields().filter(|field| !field.is_shared()) {
            if !unsafe { field.equals(a, b) } {
                trace!(
                    "{}: field {} (index {}) differs",
                    self.name(),
                    field.name(),
                    field.index()
                );
                return false;
            }
        }
        true
    }

    /// Copies every field of the complete hierarchy from `src` to `dst`.
    ///
    /// `SHARE` fields, and every field when `shallow` is set, are copied with
    /// [`CopyFlags::SHALLOW`]. `DISCARD` only concerns serialization: those
    /// fields are copied like any other. Copying an instance onto itself does
    /// nothing.
    ///
    /// # Safety
    ///
    /// `src` and `dst` must point to instances of this composite or of
    /// composites derived from it, and must not partially overlap.
    pub unsafe fn copy(&self, src: Instance<'_>, dst: InstanceMut<'_>, shallow: bool) {
        if src.data.as_byte_ptr() == dst.data.as_byte_ptr().cast_const() {
            return;
        }
        for field in self.all_fields() {
            unsafe { field.copy(src, dst, CopyFlags::for_field(shallow, field.flags())) };
        }
    }

    /// Copies between instances of possibly different composites through
    /// their most derived common composite.
    ///
    /// Returns the composite whose fields were copied, or `None` (copying
    /// nothing) when the two share no composite.
    ///
    /// # Safety
    ///
    /// `src` must point to an instance of `src_type` and `dst` to an instance
    /// of `dst_type`, both laid out with their base composites first (see
    /// [`Composite`](crate::Composite)).
    pub unsafe fn copy_between<'a>(
        src_type: &'a MetaStruct,
        src: Instance<'_>,
        dst_type: &MetaStruct,
        dst: InstanceMut<'_>,
        shallow: bool,
    ) -> Option<&'a MetaStruct> {
        let Some(common) = src_type.common_base(dst_type) else {
            debug!(
                "not copying {} into {}: no common composite",
                src_type.name(),
                dst_type.name()
            );
            return None;
        };
        unsafe { common.copy(src, dst, shallow) };
        Some(common)
    }

    /// Appends a field of type `F` read from composites of type `S`.
    ///
    /// `project` pins down `S` and `F`; `[T; N]` fields become N elements of
    /// `T`. The field's index continues after the last one declared so far
    /// in the hierarchy. [`add_field!`](crate::add_field) is the safe way to
    /// call this.
    ///
    /// # Safety
    ///
    /// `offset` must be the offset of the member `project` returns, and that
    /// member must hold an `F` in every instance of `S` (a plain struct
    /// member, not one behind a pointer or inside an enum).
    ///
    /// # Panics
    ///
    /// If this composite is bound to a Rust type other than `S`, or if the
    /// field does not fit in it.
    pub unsafe fn add_field<S: 'static, F: Translate>(
        &mut self,
        project: fn(&S) -> &F,
        offset: usize,
        name: &'static str,
        flags: FieldFlags,
    ) -> &mut Field {
        // SAFETY: forwarded; the translator handles `F::Element`
        unsafe { self.add_field_translated(project, offset, name, flags, F::Element::translator()) }
    }

    /// Like [`MetaStruct::add_field`], with a caller-supplied translator
    /// instead of the one `F` would get.
    ///
    /// # Safety
    ///
    /// See [`MetaStruct::add_field`]; `translator` must additionally handle
    /// values of type `F::Element`.
    pub unsafe fn add_field_translated<S: 'static, F: Translate>(
        &mut self,
        _project: fn(&S) -> &F,
        offset: usize,
        name: &'static str,
        flags: FieldFlags,
        translator: Box<dyn Translator>,
    ) -> &mut Field {
        assert!(
            self.type_id.is_none_or(|id| id == TypeId::of::<S>()),
            "field {name} is read from {}, not from {}",
            core::any::type_name::<S>(),
            self.name()
        );
        assert!(
            offset + core::mem::size_of::<F>() <= core::mem::size_of::<S>(),
            "field {name} ends past the {} bytes of {}",
            core::mem::size_of::<S>(),
            self.name()
        );
        debug_assert_eq!(
            core::mem::size_of::<F>(),
            core::mem::size_of::<F::Element>() * F::COUNT
        );
        assert_eq!(
            translator.size(),
            core::mem::size_of::<F::Element>(),
            "translator {} does not fit field {name}",
            translator.type_name()
        );
        self.push_field(
            FieldLayout {
                name,
                size: core::mem::size_of::<F::Element>(),
                count: F::COUNT,
                offset,
                flags,
                index: 0,
                key_type: F::Element::KEY_TYPE,
                value_type: F::Element::VALUE_TYPE,
            },
            translator,
        )
    }

    /// Appends a field described entirely by the caller.
    ///
    /// This is the path for composites that are not bound to a Rust type;
    /// `size` is the size of one element and `count` the number of elements.
    ///
    /// # Safety
    ///
    /// Every instance this composite is used with must hold `count`
    /// consecutive values handled by `translator`, each `size` bytes, at
    /// `offset`.
    pub unsafe fn add_raw_field(
        &mut self,
        name: &'static str,
        offset: usize,
        size: usize,
        count: usize,
        flags: FieldFlags,
        translator: Box<dyn Translator>,
    ) -> &mut Field {
        self.push_field(
            FieldLayout {
                name,
                size,
                count,
                offset,
                flags,
                index: 0,
                key_type: None,
                value_type: None,
            },
            translator,
        )
    }

    fn push_field(&mut self, mut layout: FieldLayout, translator: Box<dyn Translator>) -> &mut Field {
        debug_assert!(
            self.size() == 0 || layout.offset + layout.size * layout.count <= self.size(),
            "field {} ends past the {} bytes of {}",
            layout.name,
            self.size(),
            self.name()
        );
        debug_assert!(
            self.find_field_named(layout.name).is_none(),
            "field {} is already declared in the hierarchy of {}",
            layout.name,
            self.name()
        );

        layout.index = self.field_count();
        trace!(
            "{}: field {} at offset {} (index {}, {} x {} bytes)",
            self.name(),
            layout.name,
            layout.offset,
            layout.index,
            layout.count,
            layout.size
        );
        self.fields.push(Field::new(layout, translator));
        let last = self.fields.len() - 1;
        &mut self.fields[last]
    }

    /// Adds this composite to the process-wide registry and to its base's
    /// derived set.
    ///
    /// Registering an already registered composite again is a no-op.
    pub fn register(&'static self) -> Result<(), RegistryError> {
        registry().write().register(self.as_type_ref())?;
        if let Some(base) = self.base {
            base.add_derived(self);
        }
        debug!("registered composite {}", self.name());
        Ok(())
    }

    /// Removes this composite from the registry and from its base's derived
    /// set
    pub fn unregister(&'static self) {
        registry().write().unregister(self.as_type_ref());
        if let Some(base) = self.base {
            base.remove_derived(self);
        }
        debug!("unregistered composite {}", self.name());
    }
}

impl PartialEq for MetaStruct {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self, other)
    }
}

impl Eq for MetaStruct {}

impl fmt::Debug for MetaStruct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetaStruct")
            .field("name", &self.name())
            .field("kind", &self.kind())
            .field("size", &self.size())
            .field("base", &self.base.map(MetaStruct::name))
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

/// Prints the layout of the complete hierarchy, one field per line.
impl fmt::Display for MetaStruct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = match self.kind() {
            MetaKind::Class => "class",
            _ => "struct",
        };
        write!(f, "{keyword} {}", self.name())?;
        if let Some(base) = self.base {
            write!(f, " : {}", base.name())?;
        }
        writeln!(f)?;
        for field in self.ordered_fields() {
            write!(
                f,
                "  #{} {}: {} @{}",
                field.index(),
                field.name(),
                field.translator().type_name(),
                field.offset()
            )?;
            if field.is_static_array() {
                write!(f, " [{}]", field.count())?;
            }
            if !field.flags().is_empty() {
                f.write_str(" (")?;
                bitflags::parser::to_writer(&field.flags(), &mut *f)?;
                f.write_str(")")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Iterator over a composite and its ancestors, most derived first.
#[derive(Clone, Debug)]
pub struct Hierarchy<'a> {
    next: Option<&'a MetaStruct>,
}

impl<'a> Iterator for Hierarchy<'a> {
    type Item = &'a MetaStruct;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.base.map(|base| base as &MetaStruct);
        Some(current)
    }
}

/// Builder for [`MetaStruct`].
///
/// Composites bound to a Rust type are normally built through
/// [`Composite`](crate::Composite); the builder is the path for descriptors
/// assembled at runtime.
pub struct MetaStructBuilder {
    name: &'static str,
    kind: MetaKind,
    size: usize,
    type_id: Option<TypeId>,
    base: Option<&'static MetaStruct>,
    populate: Option<PopulateFn>,
    default: Option<DefaultInstance>,
}

impl MetaStructBuilder {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            kind: MetaKind::Struct,
            size: 0,
            type_id: None,
            base: None,
            populate: None,
            default: None,
        }
    }

    /// Sets the kind; must be [`MetaKind::Struct`] or [`MetaKind::Class`]
    pub fn kind(mut self, kind: MetaKind) -> Self {
        assert!(kind.is_composite(), "{kind:?} is not a composite kind");
        self.kind = kind;
        self
    }

    /// Sets the size of a complete instance; 0 disables field extent checks
    pub fn size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    /// Sets the base composite
    pub fn base(mut self, base: &'static MetaStruct) -> Self {
        self.base = Some(base);
        self
    }

    /// Sets the callback appending the own fields
    pub fn populate(mut self, populate: PopulateFn) -> Self {
        self.populate = Some(populate);
        self
    }

    /// Keeps `value` as the default instance
    pub fn default_instance<D: Any + Send + Sync>(mut self, value: D) -> Self {
        assert!(
            self.type_id.is_none_or(|id| id == TypeId::of::<D>()),
            "default instance of {} has the wrong type",
            self.name
        );
        self.default = Some(Box::new(value));
        self
    }

    /// Builds the descriptor, runs the populate callback, and links it into
    /// its base's derived set.
    ///
    /// The descriptor lives for the rest of the process.
    pub fn build(self) -> &'static MetaStruct {
        if let Some(base) = self.base {
            debug_assert!(
                self.size == 0 || base.size() <= self.size,
                "{} is smaller than its base {}",
                self.name,
                base.name()
            );
        }

        let mut meta_struct = MetaStruct {
            meta: MetaType::new(self.name, self.kind, self.size),
            type_id: self.type_id,
            base: self.base,
            derived: RwLock::new(Vec::new()),
            fields: Vec::new(),
            first_index: self.base.map_or(0, MetaStruct::field_count),
            populate: self.populate,
            default: self.default,
        };
        if let Some(populate) = self.populate {
            populate(&mut meta_struct);
        }

        let meta_struct: &'static MetaStruct = Box::leak(Box::new(meta_struct));
        for field in &meta_struct.fields {
            let _ = field.structure.set(meta_struct);
        }
        if let Some(base) = meta_struct.base {
            base.add_derived(meta_struct);
        }
        debug!(
            "built composite {} ({} own fields, {} inherited)",
            meta_struct.name(),
            meta_struct.fields.len(),
            meta_struct.first_index
        );
        meta_struct
    }
}
