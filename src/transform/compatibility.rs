use bitflags::bitflags;
use std::fmt;
use std::str::FromStr;

bitflags! {
    /// Structural features of the class file format, which only some runtimes understand
    pub struct LanguageFeatures: u32 {
        const METHODS_IN_INTERFACES = 0x0001;
        const PRIVATE_SYNTHETIC_METHODS_IN_INTERFACES = 0x0002;
        const PRIVATE_METHODS_IN_INTERFACES = 0x0004;
        const NESTING = 0x0008;
        const DYNAMIC_CONSTANTS = 0x0010;
        const RECORDS = 0x0020;
        const SEALED_CLASSES = 0x0040;
    }
}

/// Feature set of the runtime that will load the merged classes
///
/// Levels are totally ordered: every level supports everything the levels below it do.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum CompatibilityLevel {
    Java6 = 6,
    Java7 = 7,
    Java8 = 8,
    Java9 = 9,
    Java11 = 11,
    Java16 = 16,
    Java17 = 17,
    Java21 = 21,
}

impl CompatibilityLevel {
    /// All levels, from lowest to highest
    pub const ALL: [CompatibilityLevel; 8] = [
        CompatibilityLevel::Java6,
        CompatibilityLevel::Java7,
        CompatibilityLevel::Java8,
        CompatibilityLevel::Java9,
        CompatibilityLevel::Java11,
        CompatibilityLevel::Java16,
        CompatibilityLevel::Java17,
        CompatibilityLevel::Java21,
    ];

    /// Position in the total order (this is the Java release number)
    pub const fn rank(self) -> u8 {
        self as u8
    }

    /// Language features understood at this level
    pub fn language_features(self) -> LanguageFeatures {
        let mut features = LanguageFeatures::empty();
        if self >= CompatibilityLevel::Java8 {
            features |= LanguageFeatures::METHODS_IN_INTERFACES
                | LanguageFeatures::PRIVATE_SYNTHETIC_METHODS_IN_INTERFACES;
        }
        if self >= CompatibilityLevel::Java9 {
            features |= LanguageFeatures::PRIVATE_METHODS_IN_INTERFACES;
        }
        if self >= CompatibilityLevel::Java11 {
            features |= LanguageFeatures::NESTING | LanguageFeatures::DYNAMIC_CONSTANTS;
        }
        if self >= CompatibilityLevel::Java16 {
            features |= LanguageFeatures::RECORDS;
        }
        if self >= CompatibilityLevel::Java17 {
            features |= LanguageFeatures::SEALED_CLASSES;
        }
        features
    }

    /// Does this level support all of the given features?
    pub fn supports(self, features: LanguageFeatures) -> bool {
        self.language_features().contains(features)
    }

    /// Lowest level supporting all of the given features
    pub fn required_for(features: LanguageFeatures) -> Option<CompatibilityLevel> {
        Self::ALL.iter().copied().find(|level| level.supports(features))
    }
}

impl fmt::Display for CompatibilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JAVA_{}", self.rank())
    }
}

impl FromStr for CompatibilityLevel {
    type Err = String;

    /// Accepts `JAVA_8`, `java8` and plain `8`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .trim()
            .trim_start_matches(|c: char| c.is_ascii_alphabetic() || c == '_');
        let rank: u8 = digits
            .parse()
            .map_err(|_| format!("Unknown compatibility level '{}'", s))?;
        Self::ALL
            .iter()
            .copied()
            .find(|level| level.rank() == rank)
            .ok_or_else(|| format!("Unknown compatibility level '{}'", s))
    }
}

/// Optional behaviours which must be switched on explicitly
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Feature {
    /// Allow injectors in mixins which target interfaces
    InjectorsInInterfaceMixins,

    /// Allow injectors to skip validation of their targets
    UnsafeInjection,
}

impl Feature {
    pub const ALL: [Feature; 2] = [Feature::InjectorsInInterfaceMixins, Feature::UnsafeInjection];

    /// Lowest compatibility level at which the feature can be used
    pub fn required_level(self) -> CompatibilityLevel {
        match self {
            Feature::InjectorsInInterfaceMixins => {
                CompatibilityLevel::required_for(LanguageFeatures::METHODS_IN_INTERFACES)
                    .unwrap_or(CompatibilityLevel::Java8)
            }
            Feature::UnsafeInjection => CompatibilityLevel::Java6,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feature::InjectorsInInterfaceMixins => f.write_str("injectors-in-interface-mixins"),
            Feature::UnsafeInjection => f.write_str("unsafe-injection"),
        }
    }
}

impl FromStr for Feature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::ALL
            .iter()
            .copied()
            .find(|feature| feature.to_string() == s)
            .ok_or_else(|| format!("Unknown feature '{}'", s))
    }
}

/// What the merge core needs to know about the runtime and its options
pub trait Environment {
    /// Active compatibility level
    fn current_level(&self) -> CompatibilityLevel;

    /// Has the feature been switched on (and is it usable at the current level)?
    fn is_feature_enabled(&self, feature: Feature) -> bool;

    /// Could the feature be switched on at the current level?
    fn is_feature_available(&self, feature: Feature) -> bool {
        self.current_level() >= self.level_required_for(feature)
    }

    fn level_required_for(&self, feature: Feature) -> CompatibilityLevel {
        feature.required_level()
    }

    /// Does the current level support all of the given language features?
    fn supports(&self, features: LanguageFeatures) -> bool {
        self.current_level().supports(features)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn levels_are_ordered() {
        for pair in CompatibilityLevel::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].rank() < pair[1].rank());
            assert!(pair[1].language_features().contains(pair[0].language_features()));
        }
    }

    #[test]
    fn interface_features() {
        assert!(!CompatibilityLevel::Java7.supports(LanguageFeatures::METHODS_IN_INTERFACES));
        assert!(CompatibilityLevel::Java8
            .supports(LanguageFeatures::PRIVATE_SYNTHETIC_METHODS_IN_INTERFACES));
        assert!(!CompatibilityLevel::Java8.supports(LanguageFeatures::PRIVATE_METHODS_IN_INTERFACES));
        assert_eq!(
            CompatibilityLevel::required_for(LanguageFeatures::PRIVATE_METHODS_IN_INTERFACES),
            Some(CompatibilityLevel::Java9)
        );
        assert_eq!(
            Feature::InjectorsInInterfaceMixins.required_level(),
            CompatibilityLevel::Java8
        );
    }

    #[test]
    fn parsing() {
        assert_eq!("JAVA_8".parse(), Ok(CompatibilityLevel::Java8));
        assert_eq!("java17".parse(), Ok(CompatibilityLevel::Java17));
        assert_eq!("11".parse(), Ok(CompatibilityLevel::Java11));
        assert!("JAVA_10".parse::<CompatibilityLevel>().is_err());
        assert_eq!(CompatibilityLevel::Java9.to_string(), "JAVA_9");

        assert_eq!(
            "injectors-in-interface-mixins".parse(),
            Ok(Feature::InjectorsInInterfaceMixins)
        );
        assert!("time-travel".parse::<Feature>().is_err());
    }
}
