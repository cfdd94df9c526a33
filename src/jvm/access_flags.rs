use bitflags::bitflags;

bitflags! {
    /// Access flags on methods
    ///
    /// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.6-200-A.1
    pub struct MethodAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SYNCHRONIZED = 0x0020;
        const BRIDGE = 0x0040;
        const VARARGS = 0x0080;
        const NATIVE = 0x0100;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
        const SYNTHETIC = 0x1000;
    }
}

bitflags! {
    /// Access flags on fields
    ///
    /// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.5-200-A.1
    pub struct FieldAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const VOLATILE = 0x0040;
        const TRANSIENT = 0x0080;
        const SYNTHETIC = 0x1000;
        const ENUM = 0x4000;
    }
}

/// Visibility of a member, ordered from least to most visible
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Visibility {
    Private,
    Package,
    Protected,
    Public,
}

impl Visibility {
    fn from_bits(bits: u16) -> Visibility {
        if bits & 0x0001 != 0 {
            Visibility::Public
        } else if bits & 0x0004 != 0 {
            Visibility::Protected
        } else if bits & 0x0002 != 0 {
            Visibility::Private
        } else {
            Visibility::Package
        }
    }
}

impl MethodAccessFlags {
    pub fn visibility(&self) -> Visibility {
        Visibility::from_bits(self.bits())
    }

    /// Replace the visibility bits, leaving every other flag alone
    pub fn with_visibility(self, visibility: Visibility) -> MethodAccessFlags {
        let cleared = self - (Self::PUBLIC | Self::PROTECTED | Self::PRIVATE);
        match visibility {
            Visibility::Public => cleared | Self::PUBLIC,
            Visibility::Protected => cleared | Self::PROTECTED,
            Visibility::Private => cleared | Self::PRIVATE,
            Visibility::Package => cleared,
        }
    }
}

impl FieldAccessFlags {
    pub fn visibility(&self) -> Visibility {
        Visibility::from_bits(self.bits())
    }
}
