//! The process-wide type registry.
//!
//! Composites are registered explicitly by startup code; descriptors for
//! scalars, containers and pointers are allocated lazily the first time a
//! field refers to them, and registered under their Rust type name.

use core::any::TypeId;
use core::fmt;
use std::sync::OnceLock;

use hashbrown::HashMap;
use parking_lot::RwLock;

use crate::{MetaKind, MetaType, MetaTypeRef, debug, name_crc};

/// Errors raised while registering a type descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// A different descriptor is already registered under this name
    NameTaken {
        /// the contested name
        name: &'static str,
    },

    /// The name hashes to the same CRC-32 as a different registered name
    HashCollision {
        /// the name being registered
        name: &'static str,

        /// the registered name with the same hash
        existing: &'static str,
    },
}

impl core::error::Error for RegistryError {}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::NameTaken { name } => {
                write!(f, "another type is already registered as {name}")
            }
            RegistryError::HashCollision { name, existing } => {
                write!(f, "{name} and {existing} hash to the same CRC-32")
            }
        }
    }
}

/// Type descriptors by name and by name hash.
#[derive(Default)]
pub struct Registry {
    by_name: HashMap<&'static str, MetaTypeRef>,
    by_crc: HashMap<u32, &'static str>,
    interned: HashMap<TypeId, MetaTypeRef>,
}

static REGISTRY: OnceLock<RwLock<Registry>> = OnceLock::new();

/// The process-wide registry
pub fn registry() -> &'static RwLock<Registry> {
    REGISTRY.get_or_init(|| RwLock::new(Registry::default()))
}

impl Registry {
    /// Registers `ty` under its name.
    ///
    /// Registering the same descriptor again succeeds without changing
    /// anything.
    pub fn register(&mut self, ty: MetaTypeRef) -> Result<(), RegistryError> {
        let name = ty.name();
        if let Some(existing) = self.by_name.get(name) {
            return if *existing == ty {
                Ok(())
            } else {
                Err(RegistryError::NameTaken { name })
            };
        }

        let crc = ty.meta().name_crc();
        if let Some(&existing) = self.by_crc.get(&crc) {
            return Err(RegistryError::HashCollision { name, existing });
        }

        self.by_name.insert(name, ty);
        self.by_crc.insert(crc, name);
        debug!("registry: {name} ({:?})", ty.kind());
        Ok(())
    }

    /// Removes `ty`; returns false if it was not the descriptor registered
    /// under its name
    pub fn unregister(&mut self, ty: MetaTypeRef) -> bool {
        let name = ty.name();
        if self.by_name.get(name) != Some(&ty) {
            return false;
        }
        self.by_name.remove(name);
        self.by_crc.remove(&ty.meta().name_crc());
        true
    }

    /// Looks up a descriptor by name
    pub fn get(&self, name: &str) -> Option<MetaTypeRef> {
        self.by_name.get(name).copied()
    }

    /// Looks up a descriptor by the CRC-32 of its name
    pub fn get_by_crc(&self, crc: u32) -> Option<MetaTypeRef> {
        self.by_crc.get(&crc).and_then(|name| self.get(name))
    }

    /// Returns true if `ty` is the descriptor registered under its name
    pub fn contains(&self, ty: MetaTypeRef) -> bool {
        self.by_name.get(ty.name()) == Some(&ty)
    }

    /// Number of registered descriptors
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Returns true if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Every registered descriptor, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = MetaTypeRef> + '_ {
        self.by_name.values().copied()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.by_name.values()).finish()
    }
}

/// Resolves the descriptor of a non-composite type, allocating and
/// registering it on first use.
pub fn intern_meta_type<T: 'static>(kind: MetaKind) -> MetaTypeRef {
    let id = TypeId::of::<T>();
    if let Some(ty) = registry().read().interned.get(&id) {
        return *ty;
    }

    let mut guard = registry().write();
    if let Some(ty) = guard.interned.get(&id) {
        return *ty;
    }
    let meta: &'static MetaType = Box::leak(Box::new(MetaType::new(
        core::any::type_name::<T>(),
        kind,
        core::mem::size_of::<T>(),
    )));
    let ty = MetaTypeRef::Leaf(meta);
    guard.interned.insert(id, ty);
    if let Err(err) = guard.register(ty) {
        debug!("{} stays unnamed: {err}", meta.name());
    }
    ty
}

/// Looks up a registered descriptor by name
pub fn find_type(name: &str) -> Option<MetaTypeRef> {
    registry().read().get(name)
}

/// Looks up a registered descriptor by the CRC-32 of its name
pub fn find_type_by_crc(crc: u32) -> Option<MetaTypeRef> {
    registry().read().get_by_crc(crc)
}

/// Looks up a registered descriptor by name, hashing it first
pub fn find_type_named(name: &str) -> Option<MetaTypeRef> {
    find_type_by_crc(name_crc(name))
}
