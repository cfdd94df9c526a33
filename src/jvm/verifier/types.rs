use crate::jvm::{ArrayType, BaseType, BinaryName, FieldType, RefType, RenderDescriptor};
use std::fmt;

/// These types are from [this hierarchy][0]
///
/// Booleans, bytes, chars and shorts are all just `Integer` as far as the verifier is concerned.
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se7/html/jvms-4.html#jvms-4.10.1.2
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub enum VerificationType {
    Integer,
    Float,
    Double,
    Long,

    /// Type of the `null` constant, which is assignable to every reference type
    Null,

    /// Class, interface, or array type
    Object(RefType<BinaryName>),
}

impl VerificationType {
    /// Is this type is a reference type?
    pub fn is_reference(&self) -> bool {
        match self {
            VerificationType::Integer
            | VerificationType::Float
            | VerificationType::Double
            | VerificationType::Long => false,

            VerificationType::Null | VerificationType::Object(_) => true,
        }
    }

    /// Plain class type
    pub fn object(class: BinaryName) -> VerificationType {
        VerificationType::Object(RefType::Object(class))
    }

    /// Array of `java/lang/Object` with the given dimensions (`0` is just `java/lang/Object`)
    pub fn object_array(dimensions: usize) -> RefType<BinaryName> {
        if dimensions == 0 {
            RefType::Object(BinaryName::OBJECT)
        } else {
            RefType::ObjectArray(ArrayType {
                additional_dimensions: dimensions - 1,
                element_type: BinaryName::OBJECT,
            })
        }
    }
}

impl From<FieldType<BinaryName>> for VerificationType {
    fn from(field_type: FieldType<BinaryName>) -> Self {
        match field_type {
            FieldType::Base(BaseType::Int)
            | FieldType::Base(BaseType::Char)
            | FieldType::Base(BaseType::Short)
            | FieldType::Base(BaseType::Byte)
            | FieldType::Base(BaseType::Boolean) => VerificationType::Integer,
            FieldType::Base(BaseType::Float) => VerificationType::Float,
            FieldType::Base(BaseType::Long) => VerificationType::Long,
            FieldType::Base(BaseType::Double) => VerificationType::Double,
            FieldType::Ref(ref_type) => VerificationType::Object(ref_type),
        }
    }
}

impl fmt::Display for VerificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationType::Integer => f.write_str("I"),
            VerificationType::Float => f.write_str("F"),
            VerificationType::Double => f.write_str("D"),
            VerificationType::Long => f.write_str("J"),
            VerificationType::Null => f.write_str("null"),
            VerificationType::Object(ref_type) => f.write_str(&ref_type.render()),
        }
    }
}

/// Contents of a stack slot or local variable
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub enum Value {
    /// Nothing usable is in this slot (eg. two incompatible values flowed into it)
    Uninitialized,

    Typed(VerificationType),
}

impl From<VerificationType> for Value {
    fn from(verification_type: VerificationType) -> Self {
        Value::Typed(verification_type)
    }
}

impl From<FieldType<BinaryName>> for Value {
    fn from(field_type: FieldType<BinaryName>) -> Self {
        Value::Typed(VerificationType::from(field_type))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifierError {
    /// No common supertype exists (eg. `int` and `java/lang/String`)
    IncompatibleTypes(VerificationType, VerificationType),

    /// The shadow model doesn't know about one of the classes involved
    MissingClass(String),

    /// Something asked for the live class behind a type
    ///
    /// This is always a bug in the caller: offline verification must never load classes.
    LiveClassLoading(String),
}

impl fmt::Display for VerifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifierError::IncompatibleTypes(type1, type2) => {
                write!(f, "Incompatible types {} and {}", type1, type2)
            }
            VerifierError::MissingClass(name) => {
                write!(f, "Class {} is not in the shadow model", name)
            }
            VerifierError::LiveClassLoading(name) => write!(
                f,
                "Live-loading of {} attempted by the offline verifier! This should never happen!",
                name
            ),
        }
    }
}

impl std::error::Error for VerifierError {}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::ParseDescriptor;

    #[test]
    fn small_ints_collapse() {
        for descriptor in ["Z", "B", "C", "S", "I"] {
            let field_type = FieldType::<BinaryName>::parse(descriptor).unwrap();
            assert_eq!(VerificationType::from(field_type), VerificationType::Integer);
        }
        let string = FieldType::<BinaryName>::parse("Ljava/lang/String;").unwrap();
        assert_eq!(
            Value::from(string),
            Value::Typed(VerificationType::object(BinaryName::STRING))
        );
    }

    #[test]
    fn object_arrays() {
        assert_eq!(
            VerificationType::object_array(0),
            RefType::Object(BinaryName::OBJECT)
        );
        assert_eq!(VerificationType::object_array(2).render(), "[[Ljava/lang/Object;");
        assert_eq!(VerificationType::Null.to_string(), "null");
    }
}
