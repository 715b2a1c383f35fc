use core::marker::PhantomData;

use metastruct_core::{Composite, RegistryError, debug, registry};

/// Registers one type descriptor with the process-wide registry, and removes
/// it again at shutdown.
pub trait TypeRegistrar: Send + Sync {
    /// Name the descriptor is registered under
    fn name(&self) -> &'static str;

    /// Adds the descriptor to the registry
    fn register(&self) -> Result<(), RegistryError>;

    /// Removes the descriptor from the registry
    fn unregister(&self);
}

/// Registrar for the descriptor of composite `T`.
pub struct MetaStructRegistrar<T>(PhantomData<fn() -> T>);

impl<T> MetaStructRegistrar<T> {
    /// Creates the registrar; nothing is built or registered yet
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for MetaStructRegistrar<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Composite> TypeRegistrar for MetaStructRegistrar<T> {
    fn name(&self) -> &'static str {
        T::NAME
    }

    fn register(&self) -> Result<(), RegistryError> {
        let meta = T::meta_struct();
        if let Some(base) = meta.base() {
            assert!(
                registry().read().contains(base.as_type_ref()),
                "{} is registered before its base {}",
                meta.name(),
                base.name()
            );
        }
        meta.register()
    }

    fn unregister(&self) {
        T::meta_struct().unregister();
    }
}

/// An ordered list of registrars, run explicitly by startup code.
///
/// Bases must come before the composites deriving from them.
#[derive(Default)]
pub struct Registrations {
    registrars: Vec<Box<dyn TypeRegistrar>>,
}

impl Registrations {
    /// An empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the registrar of composite `T`
    pub fn with<T: Composite>(self) -> Self {
        self.with_registrar(Box::new(MetaStructRegistrar::<T>::new()))
    }

    /// Appends an arbitrary registrar
    pub fn with_registrar(mut self, registrar: Box<dyn TypeRegistrar>) -> Self {
        self.registrars.push(registrar);
        self
    }

    /// Number of registrars
    pub fn len(&self) -> usize {
        self.registrars.len()
    }

    /// Returns true if there are no registrars
    pub fn is_empty(&self) -> bool {
        self.registrars.is_empty()
    }

    /// Registered names, in registration order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.registrars.iter().map(|registrar| registrar.name())
    }

    /// Runs every registrar in order, stopping at the first failure.
    ///
    /// Descriptors registered before the failure stay registered. Running
    /// this again after a success changes nothing.
    pub fn register_all(&self) -> Result<(), RegistryError> {
        for registrar in &self.registrars {
            registrar.register()?;
        }
        debug!("registered {} types", self.registrars.len());
        Ok(())
    }

    /// Unregisters everything in reverse order, derived composites first
    pub fn unregister_all(&self) {
        for registrar in self.registrars.iter().rev() {
            registrar.unregister();
        }
        debug!("unregistered {} types", self.registrars.len());
    }
}

impl core::fmt::Debug for Registrations {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
