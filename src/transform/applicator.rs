use super::{
    CompatibilityLevel, Environment, Error, Feature, IllegalMergeRule, LanguageFeatures,
    MemberRole, MergeError, MixinField, MixinInfo, MixinMethod, Requirement, Settings,
    SymbolAllocator, TargetClass, TargetField, TargetKind, TargetMethod,
};
use crate::jvm;
use crate::jvm::{FieldAccessFlags, MethodAccessFlags, Name, UnqualifiedName, Visibility};

/// A member that ended up under a different name in the target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    pub original: UnqualifiedName,
    pub renamed: UnqualifiedName,
}

/// What applying one mixin did to its target
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ApplyReport {
    pub added_interfaces: Vec<jvm::BinaryName>,
    pub added_fields: Vec<UnqualifiedName>,

    /// Final names of every method copied into (or replaced in) the target
    pub merged_methods: Vec<UnqualifiedName>,

    pub renamed: Vec<Rename>,

    /// Signatures of members that were deliberately not merged
    pub skipped: Vec<String>,

    /// Whether constructor code from the mixin was injected into the target's constructors
    pub initialisers_applied: bool,
}

/// Merges mixins into targets, after checking that the merge is legal
///
/// Classes and interfaces follow different rules: interfaces cannot hold state, only support
/// some method visibilities, and only accept injectors when that is switched on.
pub struct MixinApplicator<'s> {
    settings: &'s Settings,
}

impl<'s> MixinApplicator<'s> {
    pub fn new(settings: &'s Settings) -> MixinApplicator<'s> {
        MixinApplicator { settings }
    }

    fn illegal(mixin: &MixinInfo, member: String, rule: IllegalMergeRule) -> MergeError {
        MergeError::IllegalMerge {
            mixin: mixin.name.clone(),
            member,
            rule,
        }
    }

    fn unsupported(
        &self,
        mixin: &MixinInfo,
        member: String,
        requirement: Requirement,
    ) -> MergeError {
        MergeError::UnsupportedCompatibility {
            mixin: mixin.name.clone(),
            member,
            requirement,
            active: self.settings.current_level(),
        }
    }

    /// Level needed for some language features (levels always exist for the features we use)
    fn level_for(features: LanguageFeatures) -> CompatibilityLevel {
        CompatibilityLevel::required_for(features).unwrap_or(CompatibilityLevel::Java21)
    }

    /// Check that a field can be merged into a target of the given kind
    pub fn validate_field(
        &self,
        kind: TargetKind,
        mixin: &MixinInfo,
        field: &MixinField,
    ) -> Result<(), MergeError> {
        if kind == TargetKind::Class {
            return Ok(());
        }

        let member = field.signature();
        if field.name == UnqualifiedName::IMAGINARY_SUPER {
            return Err(Self::illegal(mixin, member, IllegalMergeRule::ImaginarySuperField));
        }
        if field.role != MemberRole::Shadow {
            let rule = if field.access_flags.contains(FieldAccessFlags::STATIC) {
                IllegalMergeRule::NonShadowField
            } else {
                IllegalMergeRule::NewInstanceField
            };
            return Err(Self::illegal(mixin, member, rule));
        }
        let constant =
            FieldAccessFlags::PUBLIC | FieldAccessFlags::STATIC | FieldAccessFlags::FINAL;
        if !field.access_flags.contains(constant) {
            let rule = IllegalMergeRule::NonConstantShadowField;
            return Err(Self::illegal(mixin, member, rule));
        }
        if field.mutable {
            return Err(Self::illegal(mixin, member, IllegalMergeRule::MutableShadowField));
        }
        let prefix = field.shadow_prefix();
        if !prefix.is_empty() && field.name.as_str().starts_with(prefix) {
            return Err(Self::illegal(mixin, member, IllegalMergeRule::PrefixedShadowField));
        }
        Ok(())
    }

    /// Check that a method's declared visibility is possible in a target of the given kind
    pub fn prepare_method(
        &self,
        kind: TargetKind,
        mixin: &MixinInfo,
        method: &MixinMethod,
    ) -> Result<(), MergeError> {
        if kind == TargetKind::Class || method.access_flags.contains(MethodAccessFlags::PUBLIC) {
            return Ok(());
        }

        if method.is_synthetic() {
            let required =
                Self::level_for(LanguageFeatures::PRIVATE_SYNTHETIC_METHODS_IN_INTERFACES);
            if self.settings.current_level() < required {
                let requirement = Requirement::Level(required);
                return Err(self.unsupported(mixin, method.signature(), requirement));
            }
            Ok(())
        } else if method.name == UnqualifiedName::CLINIT && method.descriptor.is_nullary_void() {
            Ok(())
        } else if method.is_private() {
            if self.settings.supports(LanguageFeatures::PRIVATE_METHODS_IN_INTERFACES) {
                Ok(())
            } else {
                let required = Self::level_for(LanguageFeatures::PRIVATE_METHODS_IN_INTERFACES);
                Err(self.unsupported(mixin, method.signature(), Requirement::Level(required)))
            }
        } else {
            Err(Self::illegal(
                mixin,
                method.signature(),
                IllegalMergeRule::NonPublicInterfaceMethod,
            ))
        }
    }

    /// Reject non-private statics, which would leak into the target's API
    pub fn check_method_visibility(
        &self,
        kind: TargetKind,
        mixin: &MixinInfo,
        method: &MixinMethod,
    ) -> Result<(), MergeError> {
        if method.role == MemberRole::Shadow || method.is_initializer() {
            return Ok(());
        }

        // Before private interface methods, a static handler can only be public
        if kind == TargetKind::Interface
            && method.is_static()
            && method.role.injector().is_some()
            && !self.settings.supports(LanguageFeatures::PRIVATE_METHODS_IN_INTERFACES)
        {
            return Ok(());
        }

        if method.is_static()
            && !method.is_private()
            && !method.is_synthetic()
            && method.role != MemberRole::Overwrite
        {
            return Err(Self::illegal(
                mixin,
                method.signature(),
                IllegalMergeRule::NonPrivateStaticMethod,
            ));
        }
        Ok(())
    }

    /// Get injector handlers ready for merging
    ///
    /// Interfaces only take handlers when [`Feature::InjectorsInInterfaceMixins`] is enabled.
    /// Where private interface methods aren't supported yet, handlers are hidden by making them
    /// private and synthetic instead.
    pub fn prepare_injections(
        &self,
        kind: TargetKind,
        mixin: &MixinInfo,
        methods: &mut [MixinMethod],
    ) -> Result<(), MergeError> {
        if kind == TargetKind::Class {
            return Ok(());
        }

        let mut handlers = methods
            .iter_mut()
            .filter(|method| method.role.injector().is_some())
            .peekable();
        let first = match handlers.peek() {
            Some(first) => first.signature(),
            None => return Ok(()),
        };

        let feature = Feature::InjectorsInInterfaceMixins;
        if !self.settings.is_feature_enabled(feature) {
            return Err(self.unsupported(mixin, first, Requirement::Feature(feature)));
        }

        if !self.settings.supports(LanguageFeatures::PRIVATE_METHODS_IN_INTERFACES)
            && self.settings.supports(LanguageFeatures::PRIVATE_SYNTHETIC_METHODS_IN_INTERFACES)
        {
            for handler in handlers {
                handler.access_flags = handler.access_flags.with_visibility(Visibility::Private)
                    | MethodAccessFlags::SYNTHETIC;
            }
        }
        Ok(())
    }

    /// Every reason the mixin cannot be merged into the target
    pub fn audit(&self, target: &TargetClass, mixin: &MixinInfo) -> Vec<MergeError> {
        let kind = target.kind;
        let mut errors = vec![];

        for field in &mixin.fields {
            if let Err(err) = self.validate_field(kind, mixin, field) {
                errors.push(err);
            }
        }
        for method in &mixin.methods {
            if let Err(err) = self.prepare_method(kind, mixin, method) {
                errors.push(err);
            }
            if let Err(err) = self.check_method_visibility(kind, mixin, method) {
                errors.push(err);
            }
        }

        let mut methods = mixin.methods.clone();
        if let Err(err) = self.prepare_injections(kind, mixin, &mut methods) {
            errors.push(err);
        }

        errors
    }

    /// Merge a mixin into its target
    ///
    /// Nothing is changed if the audit finds any problem.
    pub fn apply(
        &self,
        target: &mut TargetClass,
        mixin: &MixinInfo,
        allocator: &mut SymbolAllocator,
    ) -> Result<ApplyReport, Error> {
        let errors = self.audit(target, mixin);
        if !errors.is_empty() {
            return Err(Error::MergeErrors(errors));
        }

        let mut methods = mixin.methods.clone();
        self.prepare_injections(target.kind, mixin, &mut methods)?;

        let mut report = ApplyReport::default();
        self.apply_interfaces(target, mixin, &mut report);
        self.merge_shadow_fields(target, mixin);
        if target.kind == TargetKind::Class {
            self.merge_new_fields(target, mixin, allocator, &mut report)?;
        }
        self.merge_methods(target, mixin, methods, allocator, &mut report)?;

        log::debug!(
            "Applied mixin {} to {} ({} methods, {} renamed)",
            mixin.name,
            target.name,
            report.merged_methods.len(),
            report.renamed.len()
        );
        Ok(report)
    }

    fn apply_interfaces(
        &self,
        target: &mut TargetClass,
        mixin: &MixinInfo,
        report: &mut ApplyReport,
    ) {
        for interface in &mixin.interfaces {
            if interface == &target.name || target.interfaces.contains(interface) {
                continue;
            }
            target.interfaces.push(interface.clone());
            report.added_interfaces.push(interface.clone());
        }
    }

    fn merge_shadow_fields(&self, target: &mut TargetClass, mixin: &MixinInfo) {
        let is_interface = target.is_interface();
        for field in mixin.fields.iter().filter(|field| field.role == MemberRole::Shadow) {
            let target_field = target.fields.iter_mut().find(|target_field| {
                target_field.name == field.name && target_field.descriptor == field.descriptor
            });
            let target_field = match target_field {
                Some(target_field) => target_field,
                None if is_interface => {
                    log::warn!(
                        "Shadow field {} was not located in the target interface {}",
                        field.signature(),
                        target.name
                    );
                    continue;
                }
                None => continue,
            };

            if is_interface {
                if field.mutable {
                    log::error!(
                        "Ignoring illegal @Mutable on {} in {}",
                        field.signature(),
                        mixin.name
                    );
                }
                if field.constant_value {
                    log::warn!(
                        "Shadow field {} in {} has an inlinable constant value",
                        field.signature(),
                        mixin.name
                    );
                }
            } else if field.mutable {
                target_field.access_flags.remove(FieldAccessFlags::FINAL);
            }
        }
    }

    fn merge_new_fields(
        &self,
        target: &mut TargetClass,
        mixin: &MixinInfo,
        allocator: &mut SymbolAllocator,
        report: &mut ApplyReport,
    ) -> Result<(), Error> {
        let source_id = mixin.source_id();
        for field in mixin.fields.iter().filter(|field| field.role != MemberRole::Shadow) {
            let mut name = field.name.clone();
            if target.has_field_named(&name) {
                if field.role != MemberRole::Unique {
                    log::debug!("Field {} already exists in {}", field.signature(), target.name);
                    report.skipped.push(field.signature());
                    continue;
                }
                let unique = allocator.unique_field_name(
                    source_id.as_deref(),
                    &self.settings.session_id,
                    name.as_str(),
                );
                name = UnqualifiedName::from_string(unique).map_err(jvm::Error::MalformedName)?;
                report.renamed.push(Rename {
                    original: field.name.clone(),
                    renamed: name.clone(),
                });
            }

            target.fields.push(TargetField {
                name: name.clone(),
                descriptor: field.descriptor.clone(),
                access_flags: field.access_flags,
            });
            report.added_fields.push(name);
        }
        Ok(())
    }

    fn merge_methods(
        &self,
        target: &mut TargetClass,
        mixin: &MixinInfo,
        methods: Vec<MixinMethod>,
        allocator: &mut SymbolAllocator,
        report: &mut ApplyReport,
    ) -> Result<(), Error> {
        let source_id = mixin.source_id();
        for mut method in methods {
            if method.role == MemberRole::Shadow {
                continue;
            }

            if method.name == UnqualifiedName::INIT {
                if target.is_interface() {
                    report.skipped.push(method.signature());
                } else {
                    report.initialisers_applied = true;
                }
                continue;
            }
            if method.name == UnqualifiedName::CLINIT && target.is_interface() {
                report.skipped.push(method.signature());
                continue;
            }

            let original = method.name.clone();
            let clashes = target.find_method(&method.name, &method.descriptor).is_some();
            let renamed = match method.role {
                MemberRole::Handler(_) => allocator.remap_handler_method(mixin, &mut method)?,
                MemberRole::Unique if clashes => {
                    let unique = allocator.unique_method_name(
                        source_id.as_deref(),
                        &self.settings.session_id,
                        method.name.as_str(),
                        false,
                    );
                    method.name = UnqualifiedName::from_string(unique)
                        .map_err(jvm::Error::MalformedName)?;
                    true
                }
                MemberRole::Plain if clashes && method.is_synthetic() => {
                    let unique = allocator.unique_method_name(
                        source_id.as_deref(),
                        &self.settings.session_id,
                        method.name.as_str(),
                        true,
                    );
                    method.name = UnqualifiedName::from_string(unique)
                        .map_err(jvm::Error::MalformedName)?;
                    true
                }
                _ => {
                    if clashes {
                        log::debug!("Overwriting {} in {}", method.signature(), target.name);
                    }
                    false
                }
            };
            if renamed {
                report.renamed.push(Rename {
                    original,
                    renamed: method.name.clone(),
                });
            }

            let merged = TargetMethod {
                name: method.name.clone(),
                descriptor: method.descriptor.clone(),
                access_flags: method.access_flags,
                merged_from: Some(mixin.name.clone()),
            };
            match target.find_method(&merged.name, &merged.descriptor) {
                Some(idx) => target.methods[idx] = merged,
                None => target.methods.push(merged),
            }
            report.merged_methods.push(method.name);
        }
        Ok(())
    }
}
