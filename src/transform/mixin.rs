use crate::jvm::{
    BinaryName, FieldAccessFlags, FieldType, MethodAccessFlags, MethodDescriptor, RenderDescriptor,
    UnqualifiedName,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Decoration holding the id of the mod that owns a mixin config
pub const MOD_ID_KEY: &str = "fabric-modId";

/// Value of [`MixinConfig::mod_id`] when no mod claimed the config
pub const UNKNOWN_MOD_ID: &str = "(unknown)";

/// Shadow prefix used when a shadow declares none
pub const DEFAULT_SHADOW_PREFIX: &str = "shadow$";

/// A mixin configuration (the unit a mod ships its mixins in)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixinConfig {
    pub name: String,

    /// Identifier of whoever supplied the config, as given
    source_id: Option<String>,

    decorations: HashMap<String, String>,
}

impl MixinConfig {
    pub fn new(name: impl Into<String>) -> MixinConfig {
        MixinConfig {
            name: name.into(),
            source_id: None,
            decorations: HashMap::new(),
        }
    }

    pub fn with_source_id(mut self, source_id: impl Into<String>) -> MixinConfig {
        self.source_id = Some(source_id.into());
        self
    }

    /// Source id safe for use inside member names
    ///
    /// Anything other than ASCII letters, digits and `_` becomes `_`.
    pub fn clean_source_id(&self) -> Option<String> {
        let cleaned: String = self
            .source_id
            .as_deref()?
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect();
        if cleaned.is_empty() {
            None
        } else {
            Some(cleaned)
        }
    }

    /// Attach a decoration, keeping the existing value if the key was already set
    pub fn decorate(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        if self.decorations.contains_key(&key) {
            false
        } else {
            self.decorations.insert(key, value.into());
            true
        }
    }

    pub fn decoration(&self, key: &str) -> Option<&str> {
        self.decorations.get(key).map(String::as_str)
    }

    pub fn mod_id(&self) -> &str {
        self.decoration(MOD_ID_KEY).unwrap_or(UNKNOWN_MOD_ID)
    }
}

/// Injector annotations, each with the prefix its handlers are renamed under
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum InjectorKind {
    Inject,
    Redirect,
    ModifyArg,
    ModifyArgs,
    ModifyVariable,
    ModifyConstant,
}

impl InjectorKind {
    pub fn prefix(self) -> &'static str {
        match self {
            InjectorKind::Inject => "handler",
            InjectorKind::Redirect => "redirect",
            InjectorKind::ModifyArg => "modify",
            InjectorKind::ModifyArgs => "args",
            InjectorKind::ModifyVariable => "localvar",
            InjectorKind::ModifyConstant => "constant",
        }
    }
}

/// What a mixin member is for
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum MemberRole {
    /// Copied into the target as-is
    Plain,

    /// Stands in for a member that already exists in the target
    Shadow,

    /// Copied into the target, renamed if it would clash
    Unique,

    /// Body of an injector, renamed to a collision-free handler name
    Handler(InjectorKind),

    /// Replaces the target's member outright
    Overwrite,
}

impl MemberRole {
    pub fn injector(self) -> Option<InjectorKind> {
        match self {
            MemberRole::Handler(kind) => Some(kind),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixinField {
    pub name: UnqualifiedName,
    pub descriptor: FieldType<BinaryName>,
    pub access_flags: FieldAccessFlags,
    pub role: MemberRole,

    /// Marked as writable even though the target field is final
    pub mutable: bool,

    /// Prefix declared on the shadow (`None` means [`DEFAULT_SHADOW_PREFIX`])
    pub shadow_prefix: Option<String>,

    /// Carries a compile-time constant that the compiler may have inlined
    pub constant_value: bool,
}

impl MixinField {
    pub fn new(
        name: UnqualifiedName,
        descriptor: FieldType<BinaryName>,
        access_flags: FieldAccessFlags,
        role: MemberRole,
    ) -> MixinField {
        MixinField {
            name,
            descriptor,
            access_flags,
            role,
            mutable: false,
            shadow_prefix: None,
            constant_value: false,
        }
    }

    pub fn shadow_prefix(&self) -> &str {
        self.shadow_prefix.as_deref().unwrap_or(DEFAULT_SHADOW_PREFIX)
    }

    /// `name:descriptor`, for messages
    pub fn signature(&self) -> String {
        format!("{}:{}", self.name, self.descriptor.render())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixinMethod {
    pub name: UnqualifiedName,
    pub descriptor: MethodDescriptor<BinaryName>,
    pub access_flags: MethodAccessFlags,
    pub role: MemberRole,

    /// Also carries the unique marker (only meaningful alongside another role)
    pub marked_unique: bool,

    /// Stand-in for another handler that failed to apply
    pub surrogate: bool,
}

impl MixinMethod {
    pub fn new(
        name: UnqualifiedName,
        descriptor: MethodDescriptor<BinaryName>,
        access_flags: MethodAccessFlags,
        role: MemberRole,
    ) -> MixinMethod {
        MixinMethod {
            name,
            descriptor,
            access_flags,
            role,
            marked_unique: false,
            surrogate: false,
        }
    }

    pub fn is_static(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::STATIC)
    }

    pub fn is_synthetic(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::SYNTHETIC)
    }

    pub fn is_private(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::PRIVATE)
    }

    /// Constructors and static initializers
    pub fn is_initializer(&self) -> bool {
        self.name.as_ref().starts_with('<')
    }

    /// `name(params)ret`, for messages
    pub fn signature(&self) -> String {
        format!("{}{}", self.name, self.descriptor.render())
    }
}

/// A mixin class, as seen by the merge core
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixinInfo {
    pub name: BinaryName,
    pub config: Arc<MixinConfig>,
    pub interfaces: Vec<BinaryName>,
    pub fields: Vec<MixinField>,
    pub methods: Vec<MixinMethod>,
}

impl MixinInfo {
    pub fn new(name: BinaryName, config: Arc<MixinConfig>) -> MixinInfo {
        MixinInfo {
            name,
            config,
            interfaces: vec![],
            fields: vec![],
            methods: vec![],
        }
    }

    pub fn source_id(&self) -> Option<String> {
        self.config.clean_source_id()
    }

    pub fn find_method(
        &self,
        name: &UnqualifiedName,
        descriptor: &MethodDescriptor<BinaryName>,
    ) -> Option<&MixinMethod> {
        self.methods
            .iter()
            .find(|method| &method.name == name && &method.descriptor == descriptor)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum TargetKind {
    Class,
    Interface,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetField {
    pub name: UnqualifiedName,
    pub descriptor: FieldType<BinaryName>,
    pub access_flags: FieldAccessFlags,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetMethod {
    pub name: UnqualifiedName,
    pub descriptor: MethodDescriptor<BinaryName>,
    pub access_flags: MethodAccessFlags,

    /// Mixin this method was merged from, if any
    pub merged_from: Option<BinaryName>,
}

/// A class (or interface) that mixins are merged into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetClass {
    pub name: BinaryName,
    pub kind: TargetKind,
    pub interfaces: Vec<BinaryName>,
    pub fields: Vec<TargetField>,
    pub methods: Vec<TargetMethod>,
}

impl TargetClass {
    pub fn new(name: BinaryName, kind: TargetKind) -> TargetClass {
        TargetClass {
            name,
            kind,
            interfaces: vec![],
            fields: vec![],
            methods: vec![],
        }
    }

    pub fn is_interface(&self) -> bool {
        self.kind == TargetKind::Interface
    }

    pub fn find_field(
        &self,
        name: &UnqualifiedName,
        descriptor: &FieldType<BinaryName>,
    ) -> Option<&TargetField> {
        self.fields
            .iter()
            .find(|field| &field.name == name && &field.descriptor == descriptor)
    }

    pub fn find_method(
        &self,
        name: &UnqualifiedName,
        descriptor: &MethodDescriptor<BinaryName>,
    ) -> Option<usize> {
        self.methods
            .iter()
            .position(|method| &method.name == name && &method.descriptor == descriptor)
    }

    pub fn has_field_named(&self, name: &UnqualifiedName) -> bool {
        self.fields.iter().any(|field| &field.name == name)
    }
}
