use super::{CompatibilityLevel, Environment, Error, Feature};
use std::collections::HashSet;

pub struct Settings {
    /// Identifier of this run, mixed into generated member names
    ///
    /// Generated names are only reproducible across runs if this is fixed, so tools producing
    /// distributable output should set it explicitly (see [`Self::with_session_id`]).
    pub session_id: String,

    /// Feature set of the runtime that will load the merged classes
    pub compatibility_level: CompatibilityLevel,

    /// Optional features switched on
    ///
    /// A feature listed here is still only enabled if it is available at
    /// [`Self::compatibility_level`].
    pub enabled_features: HashSet<Feature>,
}

impl Settings {
    pub const DEFAULT_COMPATIBILITY_LEVEL: CompatibilityLevel = CompatibilityLevel::Java8;

    /// Settings with a fresh random session
    pub fn new() -> Settings {
        Settings {
            session_id: uuid::Uuid::new_v4().to_string(),
            compatibility_level: Self::DEFAULT_COMPATIBILITY_LEVEL,
            enabled_features: HashSet::new(),
        }
    }

    /// Settings with a fixed session, for reproducible names
    pub fn with_session_id(session_id: impl Into<String>) -> Result<Settings, Error> {
        let session_id = session_id.into();
        if session_id.is_empty() {
            return Err(Error::InvalidSettings(String::from("Session id is empty")));
        }
        if let Some(c) = session_id
            .chars()
            .find(|c| matches!(c, '.' | ';' | '[' | '/' | '<' | '>'))
        {
            return Err(Error::InvalidSettings(format!(
                "Session id '{}' contains illegal character '{}'",
                session_id, c
            )));
        }
        Ok(Settings {
            session_id,
            ..Settings::new()
        })
    }

    pub fn compatibility_level(mut self, level: CompatibilityLevel) -> Settings {
        self.compatibility_level = level;
        self
    }

    pub fn enable(mut self, feature: Feature) -> Settings {
        self.enabled_features.insert(feature);
        self
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings::new()
    }
}

impl Environment for Settings {
    fn current_level(&self) -> CompatibilityLevel {
        self.compatibility_level
    }

    fn is_feature_enabled(&self, feature: Feature) -> bool {
        self.enabled_features.contains(&feature) && self.is_feature_available(feature)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sessions() {
        let first = Settings::new();
        let second = Settings::new();
        assert_ne!(first.session_id, second.session_id);
        assert_eq!(first.session_id.len(), 36);

        assert!(Settings::with_session_id("0123456789abcdef").is_ok());
        assert!(Settings::with_session_id("").is_err());
        assert!(Settings::with_session_id("a/b").is_err());
    }

    #[test]
    fn features_need_their_level() {
        let settings = Settings::new()
            .compatibility_level(CompatibilityLevel::Java7)
            .enable(Feature::InjectorsInInterfaceMixins);
        assert!(!settings.is_feature_available(Feature::InjectorsInInterfaceMixins));
        assert!(!settings.is_feature_enabled(Feature::InjectorsInInterfaceMixins));

        let settings = settings.compatibility_level(CompatibilityLevel::Java8);
        assert!(settings.is_feature_enabled(Feature::InjectorsInInterfaceMixins));
        assert!(!settings.is_feature_enabled(Feature::UnsafeInjection));
    }
}
