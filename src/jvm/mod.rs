//! Vocabulary for talking about JVM classes without loading them
//!
//! Classes are referred to by [`BinaryName`], members by [`UnqualifiedName`], and types by the
//! descriptors in [`FieldType`] and [`MethodDescriptor`]. Everything known about the class
//! hierarchy lives in a [`class_graph::ShadowModel`], which the [`verifier`] consults instead of
//! the real classes.
//!
//! ```
//! use mixin_merge::jvm::class_graph::ClassGraph;
//! use mixin_merge::jvm::verifier::{VerificationType, Verifier};
//! use mixin_merge::jvm::*;
//!
//! # fn main() -> Result<(), Error> {
//! let graph = ClassGraph::parse_listing(
//!     "
//!     class shapes/Shape
//!     class shapes/Circle extends shapes/Shape
//!     class shapes/Square extends shapes/Shape
//!     ",
//! )?;
//!
//! let circle = VerificationType::from(FieldType::<BinaryName>::parse("Lshapes/Circle;")?);
//! let square = VerificationType::from(FieldType::<BinaryName>::parse("Lshapes/Square;")?);
//! let verifier = Verifier::new(&graph);
//! assert_eq!(
//!     verifier.common_supertype(&circle, &square).unwrap().to_string(),
//!     "Lshapes/Shape;",
//! );
//! # Ok(())
//! # }
//! ```

mod access_flags;
pub mod class_graph;
mod descriptors;
mod errors;
mod names;
pub mod verifier;

pub use access_flags::*;
pub use descriptors::*;
pub use errors::*;
pub use names::*;
