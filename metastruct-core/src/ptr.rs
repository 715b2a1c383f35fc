//! Opaque pointers
//!
//! Type-erased pointer helpers for addressing composite instances and their
//! fields. None of these types track lifetimes of the pointee: safety is the
//! caller's responsibility, exactly like the raw addresses the translators are
//! handed.

use core::any::Any;
use core::fmt;
use core::ptr::NonNull;

/// An object owning reflected data.
///
/// Objects are supplied by the object system that allocates composite
/// instances. The reflection core never inspects them; it only forwards them
/// to translators, which may consult per-object state (for example bindings
/// that change how a field compares).
pub trait Object: Any {}

impl dyn Object {
    /// Returns the object as a `T` if that is its concrete type
    #[inline]
    pub fn downcast_ref<T: Object>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref()
    }
}

/// A type-erased pointer to initialized, read-only data.
#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct PtrConst(NonNull<u8>);

impl fmt::Debug for PtrConst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl PtrConst {
    /// Wraps a non-null byte pointer
    #[inline]
    pub const fn new(ptr: NonNull<u8>) -> Self {
        Self(ptr)
    }

    /// Points at the value behind a reference
    #[inline]
    pub fn from_ref<T: ?Sized>(value: &T) -> Self {
        Self(NonNull::from(value).cast())
    }

    /// Returns the underlying address
    #[inline]
    pub const fn as_byte_ptr(self) -> *const u8 {
        self.0.as_ptr()
    }

    /// Returns a pointer `offset` bytes past this one.
    ///
    /// # Safety
    ///
    /// The resulting address must stay within the allocation this pointer
    /// refers to.
    #[inline]
    pub unsafe fn field(self, offset: usize) -> Self {
        Self(unsafe { self.0.add(offset) })
    }

    /// Borrows the pointee as a `T`.
    ///
    /// # Safety
    ///
    /// The pointer must be aligned for `T` and point to an initialized `T`
    /// that outlives `'a` and is not mutated during `'a`.
    #[inline]
    pub unsafe fn get<'a, T>(self) -> &'a T {
        unsafe { &*self.0.as_ptr().cast::<T>() }
    }
}

/// A type-erased pointer to initialized, writable data.
#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct PtrMut(NonNull<u8>);

impl fmt::Debug for PtrMut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl PtrMut {
    /// Wraps a non-null byte pointer
    #[inline]
    pub const fn new(ptr: NonNull<u8>) -> Self {
        Self(ptr)
    }

    /// Points at the value behind a mutable reference
    #[inline]
    pub fn from_mut<T: ?Sized>(value: &mut T) -> Self {
        Self(NonNull::from(value).cast())
    }

    /// Returns the underlying address
    #[inline]
    pub const fn as_byte_ptr(self) -> *mut u8 {
        self.0.as_ptr()
    }

    /// Downgrades to a read-only pointer
    #[inline]
    pub const fn as_const(self) -> PtrConst {
        PtrConst(self.0)
    }

    /// Returns a pointer `offset` bytes past this one.
    ///
    /// # Safety
    ///
    /// The resulting address must stay within the allocation this pointer
    /// refers to.
    #[inline]
    pub unsafe fn field(self, offset: usize) -> Self {
        Self(unsafe { self.0.add(offset) })
    }

    /// Mutably borrows the pointee as a `T`.
    ///
    /// # Safety
    ///
    /// The pointer must be aligned for `T`, point to an initialized `T`, and
    /// no other reference to that `T` may be live during `'a`.
    #[inline]
    pub unsafe fn as_mut<'a, T>(self) -> &'a mut T {
        unsafe { &mut *self.0.as_ptr().cast::<T>() }
    }
}

/// A read-only composite (or element) address together with its owning object.
#[derive(Clone, Copy)]
pub struct Instance<'o> {
    /// Address of the data
    pub data: PtrConst,
    /// Object owning the data, if any
    pub object: Option<&'o (dyn Object + 'static)>,
}

impl fmt::Debug for Instance<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("data", &self.data)
            .field("has_object", &self.object.is_some())
            .finish()
    }
}

impl<'o> Instance<'o> {
    /// An instance with no owning object
    #[inline]
    pub const fn new(data: PtrConst) -> Self {
        Self { data, object: None }
    }

    /// Borrows a value as an instance with no owning object
    #[inline]
    pub fn of<T>(value: &T) -> Self {
        Self::new(PtrConst::from_ref(value))
    }

    /// Attaches an owning object
    #[inline]
    pub fn with_object(mut self, object: &'o (dyn Object + 'static)) -> Self {
        self.object = Some(object);
        self
    }

    /// Same object, data moved `offset` bytes forward.
    ///
    /// # Safety
    ///
    /// See [`PtrConst::field`].
    #[inline]
    pub unsafe fn at(self, offset: usize) -> Self {
        Self {
            data: unsafe { self.data.field(offset) },
            object: self.object,
        }
    }
}

/// A writable composite (or element) address together with its owning object.
#[derive(Clone, Copy)]
pub struct InstanceMut<'o> {
    /// Address of the data
    pub data: PtrMut,
    /// Object owning the data, if any
    pub object: Option<&'o (dyn Object + 'static)>,
}

impl fmt::Debug for InstanceMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceMut")
            .field("data", &self.data)
            .field("has_object", &self.object.is_some())
            .finish()
    }
}

impl<'o> InstanceMut<'o> {
    /// An instance with no owning object
    #[inline]
    pub const fn new(data: PtrMut) -> Self {
        Self { data, object: None }
    }

    /// Borrows a value mutably as an instance with no owning object
    #[inline]
    pub fn of<T>(value: &mut T) -> Self {
        Self::new(PtrMut::from_mut(value))
    }

    /// Attaches an owning object
    #[inline]
    pub fn with_object(mut self, object: &'o (dyn Object + 'static)) -> Self {
        self.object = Some(object);
        self
    }

    /// Read-only view of the same address and object
    #[inline]
    pub fn as_const(self) -> Instance<'o> {
        Instance {
            data: self.data.as_const(),
            object: self.object,
        }
    }

    /// Same object, data moved `offset` bytes forward.
    ///
    /// # Safety
    ///
    /// See [`PtrMut::field`].
    #[inline]
    pub unsafe fn at(self, offset: usize) -> Self {
        Self {
            data: unsafe { self.data.field(offset) },
            object: self.object,
        }
    }
}
