bitflags::bitflags! {
    /// Default behavior of a field towards serializers and editors.
    ///
    /// These are defaults: consuming subsystems may override them per context.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct FieldFlags: u32 {
        /// Not serialized
        const DISCARD = 1 << 0;
        /// Always serialized, even when equal to the default value.
        /// Takes precedence over `DISCARD` when both are set.
        const FORCE = 1 << 1;
        /// Shared reference: never compared or cloned deeply
        const SHARE = 1 << 2;
        /// Not shown in generic editor views
        const HIDE = 1 << 3;
        /// Not editable in generic editor views
        const READ_ONLY = 1 << 4;
    }
}

bitflags::bitflags! {
    /// Options handed to a translator when it copies a value.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct CopyFlags: u32 {
        /// Alias pointer-shaped values instead of cloning what they point to
        const SHALLOW = 1 << 0;
    }
}

impl CopyFlags {
    /// Flags for copying a field, given the copy-wide shallow request and the
    /// field's own flags.
    #[inline]
    pub fn for_field(shallow: bool, field_flags: FieldFlags) -> Self {
        if shallow || field_flags.contains(FieldFlags::SHARE) {
            Self::SHALLOW
        } else {
            Self::empty()
        }
    }
}
