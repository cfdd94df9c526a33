//! Offline merging of mixin classes into JVM classes
//!
//! The [`jvm`] module describes classes without loading them: names, descriptors, access flags,
//! a shadow model of the class hierarchy, and a verifier type lattice backed by that model. The
//! [`transform`] module decides whether (and how) mixins can be merged into their targets and
//! hands out collision-free names for the members that get merged.

pub mod jvm;
pub mod transform;
