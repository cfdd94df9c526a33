//! Merging mixins into the classes and interfaces they target
//!
//! A [`MixinApplicator`] checks every member of a [`MixinInfo`] against its [`TargetClass`]
//! (collecting all problems as [`MergeError`]s), then copies the mixin in. Names of members that
//! would collide come from a [`SymbolAllocator`], whose ids are shared through a
//! [`SymbolRegistry`]. Mixins extending other mixins are tracked by an [`InheritanceTracker`].

mod allocator;
mod applicator;
mod compatibility;
mod errors;
mod inheritance;
mod mixin;
mod settings;

pub use allocator::*;
pub use applicator::*;
pub use compatibility::*;
pub use errors::*;
pub use inheritance::*;
pub use mixin::*;
pub use settings::*;
