use super::{CompatibilityLevel, Feature};
use crate::jvm;
use crate::jvm::verifier::VerifierError;
use crate::jvm::BinaryName;
use std::fmt;

/// Why a mixin member cannot be merged into its target
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum IllegalMergeRule {
    /// Interfaces cannot hold instance state
    NewInstanceField,

    /// Interfaces can only receive shadows, never new fields
    NonShadowField,

    /// Interface fields are always `public static final`
    NonConstantShadowField,

    /// Interface fields are constants, so they cannot be made mutable
    MutableShadowField,

    /// The shadow prefix is not supported on interface fields
    PrefixedShadowField,

    /// `super$` is an imaginary field and is never merged into interfaces
    ImaginarySuperField,

    /// Interface methods are either public or private
    NonPublicInterfaceMethod,

    /// Non-private statics would become part of the target's API
    NonPrivateStaticMethod,
}

impl fmt::Display for IllegalMergeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            IllegalMergeRule::NewInstanceField => "contains an instance field",
            IllegalMergeRule::NonShadowField => "contains a non-shadow field",
            IllegalMergeRule::NonConstantShadowField => "contains an illegal field",
            IllegalMergeRule::MutableShadowField => "contains an illegal @Mutable field",
            IllegalMergeRule::PrefixedShadowField => "contains an illegal prefixed @Shadow field",
            IllegalMergeRule::ImaginarySuperField => "contains the imaginary super field",
            IllegalMergeRule::NonPublicInterfaceMethod => {
                "contains a non-public, non-private method"
            }
            IllegalMergeRule::NonPrivateStaticMethod => "contains a non-private static method",
        };
        f.write_str(message)
    }
}

/// Capability a construct needs from the environment
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Requirement {
    Level(CompatibilityLevel),
    Feature(Feature),
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Level(level) => write!(f, "{} or above", level),
            Requirement::Feature(feature) => write!(
                f,
                "the {} feature (available from {})",
                feature,
                feature.required_level()
            ),
        }
    }
}

/// One reason a mixin is rejected against a particular target
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum MergeError {
    /// The construct can never be merged into this kind of target
    IllegalMerge {
        mixin: BinaryName,
        member: String,
        rule: IllegalMergeRule,
    },

    /// The construct could be merged, but not at the active compatibility level
    UnsupportedCompatibility {
        mixin: BinaryName,
        member: String,
        requirement: Requirement,
        active: CompatibilityLevel,
    },
}

impl MergeError {
    pub fn mixin(&self) -> &BinaryName {
        match self {
            MergeError::IllegalMerge { mixin, .. } => mixin,
            MergeError::UnsupportedCompatibility { mixin, .. } => mixin,
        }
    }

    pub fn member(&self) -> &str {
        match self {
            MergeError::IllegalMerge { member, .. } => member,
            MergeError::UnsupportedCompatibility { member, .. } => member,
        }
    }
}

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeError::IllegalMerge {
                mixin,
                member,
                rule,
            } => write!(f, "Mixin {} {} {}", mixin, rule, member),
            MergeError::UnsupportedCompatibility {
                mixin,
                member,
                requirement,
                active,
            } => write!(
                f,
                "{} in {} requires {} but the active compatibility level is {}",
                member, mixin, requirement, active
            ),
        }
    }
}

impl std::error::Error for MergeError {}

#[derive(Debug)]
pub enum Error {
    JvmError(jvm::Error),
    VerifierError(VerifierError),

    /// Every problem found while auditing a mixin against its target
    MergeErrors(Vec<MergeError>),

    InvalidSettings(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::JvmError(err) => write!(f, "{}", err),
            Error::VerifierError(err) => write!(f, "{}", err),
            Error::MergeErrors(errors) => {
                write!(f, "{} merge error(s)", errors.len())?;
                for error in errors {
                    write!(f, "\n  {}", error)?;
                }
                Ok(())
            }
            Error::InvalidSettings(msg) => write!(f, "Invalid settings: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<jvm::Error> for Error {
    fn from(err: jvm::Error) -> Error {
        Error::JvmError(err)
    }
}

impl From<VerifierError> for Error {
    fn from(err: VerifierError) -> Error {
        Error::VerifierError(err)
    }
}

impl From<MergeError> for Error {
    fn from(err: MergeError) -> Error {
        Error::MergeErrors(vec![err])
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::JvmError(jvm::Error::IoError(err))
    }
}
