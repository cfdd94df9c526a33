//! Offline type verification
//!
//! When a mixin has been merged into a class, the merged method bodies still need to make sense
//! to the JVM's verifier: at every join point the types on the stack and in the locals from all
//! incoming paths are unified, and every use of a value must be assignable to the type expected
//! there. Doing that requires answering two questions over and over:
//!
//!   - what is the common supertype of two types (see [`Verifier::common_supertype`])?
//!   - is a value of one type assignable to a slot expecting another
//!     (see [`Verifier::is_subtype_of`])?
//!
//! The JVM answers those by loading classes. We can't: the classes being transformed are exactly
//! the ones that must not be loaded yet. Instead, every question about the class hierarchy is
//! routed through a [`crate::jvm::class_graph::ShadowModel`], and any attempt to reach for a live
//! class is an error ([`Verifier::load_class`]).
//!
//! The "types" used in verification (represented using [`VerificationType`]) are the
//! [verification types][0] of the JVM, augmented with a `null` type. Values
//! ([`Value`]) add one more state on top: uninitialized, for slots whose contents are unusable.
//!
//! [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.10.1.2

mod lattice;
mod types;

pub use lattice::*;
pub use types::*;
