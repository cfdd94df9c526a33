use super::{Value, VerificationType, VerifierError};
use crate::jvm::class_graph::ShadowModel;
use crate::jvm::{ArrayType, BinaryName, Error, RefType};
use std::convert::Infallible;

/// Type lattice queries backed by a shadow model
///
/// Every query is a pure function of its arguments and the model: nothing is cached between
/// calls.
pub struct Verifier<'m, M: ShadowModel + ?Sized> {
    model: &'m M,
}

impl<'m, M: ShadowModel + ?Sized> Verifier<'m, M> {
    pub fn new(model: &'m M) -> Self {
        Verifier { model }
    }

    /// Most specific type both types can be treated as
    ///
    /// Fails with [`VerifierError::IncompatibleTypes`] if the two types are different and at least
    /// one of them is primitive.
    pub fn common_supertype(
        &self,
        type1: &VerificationType,
        type2: &VerificationType,
    ) -> Result<VerificationType, VerifierError> {
        if type1 == type2 || type2 == &VerificationType::Null {
            return Ok(type1.clone());
        }
        if type1 == &VerificationType::Null {
            return Ok(type2.clone());
        }
        match (type1, type2) {
            (VerificationType::Object(ref1), VerificationType::Object(ref2)) => self
                .common_ref_supertype(ref1, ref2)
                .map(VerificationType::Object),

            // We know they're not the same, so they must be incompatible
            _ => Err(VerifierError::IncompatibleTypes(type1.clone(), type2.clone())),
        }
    }

    fn common_ref_supertype(
        &self,
        ref1: &RefType<BinaryName>,
        ref2: &RefType<BinaryName>,
    ) -> Result<RefType<BinaryName>, VerifierError> {
        if ref1 == ref2 {
            return Ok(ref1.clone());
        }
        match (ref1, ref2) {
            (RefType::Object(class1), RefType::Object(class2)) => {
                self.common_class(class1, class2).map(RefType::Object)
            }

            // Arrays only have `java/lang/Object` in common with classes
            (RefType::Object(_), _) | (_, RefType::Object(_)) => {
                Ok(RefType::Object(BinaryName::OBJECT))
            }

            _ => {
                let dim1 = ref1.dimensions();
                let dim2 = ref2.dimensions();
                if dim1 == dim2 {
                    if let (RefType::ObjectArray(arr1), RefType::ObjectArray(arr2)) = (ref1, ref2) {
                        let element_type = self.common_class(&arr1.element_type, &arr2.element_type)?;
                        return Ok(RefType::ObjectArray(ArrayType {
                            additional_dimensions: arr1.additional_dimensions,
                            element_type,
                        }));
                    }

                    // Element kinds differ: the elements only have `java/lang/Object` in common
                    return Ok(VerificationType::object_array(dim1 - 1));
                }

                let (smaller, shared) = if dim1 < dim2 {
                    (ref1, dim1 - 1)
                } else {
                    (ref2, dim2 - 1)
                };
                let shared = match smaller {
                    RefType::ObjectArray(_) => shared + 1,
                    _ => shared,
                };
                Ok(VerificationType::object_array(shared))
            }
        }
    }

    fn common_class(
        &self,
        class1: &BinaryName,
        class2: &BinaryName,
    ) -> Result<BinaryName, VerifierError> {
        if class1 == class2 {
            return Ok(class1.clone());
        }
        self.model
            .nearest_common_ancestor(class1, class2)
            .map_err(|err| match err {
                Error::MissingClass(name) => VerifierError::MissingClass(name),
                other => VerifierError::MissingClass(other.to_string()),
            })
    }

    /// Can a slot of type `expected` hold a value of type `actual`?
    ///
    /// This is strict: it holds exactly when `expected` is the common supertype of the two.
    pub fn is_assignable_from(
        &self,
        expected: &VerificationType,
        actual: &VerificationType,
    ) -> bool {
        match self.common_supertype(expected, actual) {
            Ok(supertype) => &supertype == expected,
            Err(_) => false,
        }
    }

    /// Is the type an interface?
    ///
    /// Only plain class types can be. Classes missing from the shadow model are reported as not
    /// being interfaces.
    pub fn is_interface(&self, verification_type: &VerificationType) -> bool {
        match verification_type {
            VerificationType::Object(RefType::Object(class)) => match self.model.resolve(class) {
                Some(class_data) => class_data.is_interface,
                None => {
                    log::warn!("Cannot tell if {} is an interface, assuming it isn't", class);
                    false
                }
            },
            _ => false,
        }
    }

    /// Can a value be used where `expected` is required?
    ///
    /// Primitive kinds must match exactly and `null` fits any reference type. For references,
    /// this is more lenient than [`Self::is_assignable_from`] when the expected type is an
    /// interface (or an array of one): merges of class or interface types can only ever produce
    /// class types, since there isn't in general a unique common super interface. Any reference
    /// is accepted for an interface instead of failing verification for code that is fine.
    pub fn is_subtype_of(&self, value: &Value, expected: &Value) -> bool {
        let (actual_type, expected_type) = match (value, expected) {
            (Value::Typed(actual_type), Value::Typed(expected_type)) => {
                (actual_type, expected_type)
            }
            (Value::Uninitialized, Value::Uninitialized) => return true,
            _ => return false,
        };

        let expected_ref = match expected_type {
            VerificationType::Integer
            | VerificationType::Float
            | VerificationType::Long
            | VerificationType::Double
            | VerificationType::Null => return actual_type == expected_type,
            VerificationType::Object(expected_ref) => expected_ref,
        };
        let actual_ref = match actual_type {
            VerificationType::Null => return true,
            VerificationType::Object(actual_ref) => actual_ref,
            _ => return false,
        };

        if self.is_assignable_from(expected_type, actual_type) {
            return true;
        }

        // For arrays, compare the innermost expected element against the actual type with the
        // same number of dimensions peeled off
        let (expected_class, actual_is_reference) = match expected_ref {
            RefType::Object(class) => (class, true),
            RefType::PrimitiveArray(_) => return false,
            RefType::ObjectArray(expected_arr) => {
                let dimensions = expected_arr.dimensions();
                if dimensions > actual_ref.dimensions() {
                    return false;
                }
                let peeled = match actual_ref {
                    RefType::Object(_) => return false,
                    RefType::ObjectArray(_) => true,
                    RefType::PrimitiveArray(arr) => arr.dimensions() > dimensions,
                };
                (&expected_arr.element_type, peeled)
            }
        };

        let expected_class = VerificationType::object(expected_class.clone());
        self.is_interface(&expected_class) && actual_is_reference
    }

    /// Unify two values flowing into the same slot
    ///
    /// Values that can't be unified (eg. an `int` and a `float`) make the slot uninitialized:
    /// that is only an error if something later tries to use the slot.
    pub fn merge(&self, value1: &Value, value2: &Value) -> Result<Value, VerifierError> {
        if value1 == value2 {
            return Ok(value1.clone());
        }
        match (value1, value2) {
            (Value::Typed(type1), Value::Typed(type2)) => {
                match self.common_supertype(type1, type2) {
                    Ok(supertype) => Ok(Value::Typed(supertype)),
                    Err(VerifierError::IncompatibleTypes(..)) => Ok(Value::Uninitialized),
                    Err(err) => Err(err),
                }
            }
            _ => Ok(Value::Uninitialized),
        }
    }

    /// Resolve the live class behind a type
    ///
    /// This always fails: the whole point of this verifier is to never load classes, so reaching
    /// this is a bug in the caller.
    pub fn load_class(
        &self,
        verification_type: &VerificationType,
    ) -> Result<Infallible, VerifierError> {
        log::error!(
            "Live-loading of {} attempted by the offline verifier",
            verification_type
        );
        Err(VerifierError::LiveClassLoading(
            verification_type.to_string(),
        ))
    }
}
