//! Collision-free names for members merged into target classes
//!
//! Names are built from a few ingredients:
//!
//!   - a class id, assigned the first time a target class is seen and rendered with [`finagle`]
//!   - a method id, counting how often a `name + descriptor` pair has been allocated
//!   - the source id of the mixin config (at most [`MAX_SOURCE_ID_LENGTH`] characters)
//!   - the tail of the session id (see [`session_fragment`])
//!
//! Class and method ids live in a [`SymbolRegistry`], which is shared by every allocator in the
//! process. Counters for unique members are per-target and live in the [`SymbolAllocator`].

use super::{Error, MixinInfo, MixinMethod};
use crate::jvm::{BinaryName, Name, RenderDescriptor, UnqualifiedName};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Source ids are truncated to this many characters
pub const MAX_SOURCE_ID_LENGTH: usize = 12;

/// Generated names only use the session id from this character onwards
pub const SESSION_ID_SKIP: usize = 30;

/// Render a class index using only letters
///
/// Each hex digit is shifted into the alphabet (`0-9` to `a-j`, `a-f` to `k-p`) and the result
/// is padded on the left with `z` to at least three characters.
pub fn finagle(index: usize) -> String {
    let hex = format!("{:x}", index);
    let mut finagled = String::with_capacity(hex.len().max(3));
    for _ in hex.len()..3 {
        finagled.push('z');
    }
    for c in hex.chars() {
        let shifted = if c.is_ascii_digit() {
            c as u8 + 0x31
        } else {
            c as u8 + 0x0A
        };
        finagled.push(shifted as char);
    }
    finagled
}

/// Part of the session id that goes into generated names
///
/// Falls back to the whole id when it is too short to have anything past [`SESSION_ID_SKIP`].
pub fn session_fragment(session_id: &str) -> &str {
    match session_id.get(SESSION_ID_SKIP..) {
        Some(fragment) if !fragment.is_empty() => fragment,
        _ => session_id,
    }
}

/// Source id as it appears in generated names (`""` when there is none)
fn source_namespace(source_id: Option<&str>) -> &str {
    let source_id = source_id.unwrap_or("");
    match source_id.char_indices().nth(MAX_SOURCE_ID_LENGTH) {
        Some((end, _)) => &source_id[..end],
        None => source_id,
    }
}

/// Drop a leading `{source}_` or `{source}$` from a member name
///
/// The name is left alone if nothing would remain after the separator.
pub fn strip_source_prefix<'a>(name: &'a str, source: &str) -> &'a str {
    if source.is_empty() || !name.starts_with(source) || name.len() <= source.len() + 1 {
        return name;
    }
    match name.as_bytes()[source.len()] {
        b'_' | b'$' => &name[source.len() + 1..],
        _ => name,
    }
}

#[derive(Default)]
struct RegistryState {
    /// Target classes, in the order their ids were handed out
    classes: Vec<BinaryName>,
    class_ids: HashMap<BinaryName, usize>,

    /// Allocation counts, keyed by `name + descriptor`
    method_counters: HashMap<String, u32>,
}

impl RegistryState {
    fn class_id(&mut self, class: &BinaryName) -> usize {
        if let Some(id) = self.class_ids.get(class) {
            return *id;
        }
        let id = self.classes.len();
        self.classes.push(class.clone());
        self.class_ids.insert(class.clone(), id);
        log::debug!("Assigned class id {} ({}) to {}", id, finagle(id), class);
        id
    }

    fn method_id(&mut self, key: String, increment: bool) -> u32 {
        match self.method_counters.get_mut(&key) {
            None => {
                self.method_counters.insert(key, 0);
                0
            }
            Some(counter) => {
                if increment {
                    *counter += 1;
                }
                *counter
            }
        }
    }
}

/// Process-wide class and method ids
///
/// Clones share the same state. Every operation takes the lock once, so concurrent allocators
/// never observe the same id twice.
#[derive(Clone, Default)]
pub struct SymbolRegistry {
    state: Arc<Mutex<RegistryState>>,
}

impl SymbolRegistry {
    /// Fresh registry, isolated from every other one
    pub fn new() -> SymbolRegistry {
        SymbolRegistry::default()
    }

    /// Id of a target class, assigning the next free one if it hasn't got one yet
    pub fn class_id(&self, class: &BinaryName) -> usize {
        self.state.lock().class_id(class)
    }

    pub fn class_uid(&self, class: &BinaryName) -> String {
        finagle(self.class_id(class))
    }

    /// Id for another method called `name` with `descriptor`, as three or more hex digits
    ///
    /// The first request for a key always gets `000`. Later requests get the next id, unless
    /// `increment` is false in which case they share the latest one.
    pub fn method_uid(&self, name: &str, descriptor: &str, increment: bool) -> String {
        let key = format!("{}{}", name, descriptor);
        format!("{:03x}", self.state.lock().method_id(key, increment))
    }

    /// Collision-free name for an injector handler merged into `target`
    ///
    /// Shaped `{prefix}${class uid}{method uid}${source}${name}`, where the `{source}$` part is
    /// left out when there is no source id and a leading `{source}_` is dropped from the name.
    /// Surrogates reuse the id of the handler they stand in for.
    pub fn handler_name(
        &self,
        source_id: Option<&str>,
        injector_prefix: &str,
        target: &BinaryName,
        method_name: &str,
        descriptor: &str,
        is_surrogate: bool,
    ) -> String {
        let source = source_namespace(source_id);
        let (method_name, namespace) = if source.is_empty() {
            (method_name, String::new())
        } else {
            (strip_source_prefix(method_name, source), format!("{}$", source))
        };

        let (class_id, method_id) = {
            let mut state = self.state.lock();
            let class_id = state.class_id(target);
            let method_id = state.method_id(format!("{}{}", method_name, descriptor), !is_surrogate);
            (class_id, method_id)
        };

        format!(
            "{}${}{:03x}${}{}",
            injector_prefix,
            finagle(class_id),
            method_id,
            namespace,
            method_name
        )
    }

    /// Number of target classes which have been given ids
    pub fn class_count(&self) -> usize {
        self.state.lock().classes.len()
    }
}

/// Allocates names for members merged into one target class
pub struct SymbolAllocator {
    registry: SymbolRegistry,
    target: BinaryName,

    next_unique_method_index: u32,
    next_unique_field_index: u32,

    /// Handlers already conformed on this target: `(mixin, name, descriptor)` to new name
    conformed: HashMap<(BinaryName, UnqualifiedName, String), UnqualifiedName>,
}

impl SymbolAllocator {
    pub fn new(registry: SymbolRegistry, target: BinaryName) -> SymbolAllocator {
        SymbolAllocator {
            registry,
            target,
            next_unique_method_index: 0,
            next_unique_field_index: 0,
            conformed: HashMap::new(),
        }
    }

    pub fn target(&self) -> &BinaryName {
        &self.target
    }

    pub fn registry(&self) -> &SymbolRegistry {
        &self.registry
    }

    /// Start the unique member counters over (eg. when the target class is re-transformed)
    pub fn reset(&mut self) {
        self.next_unique_method_index = 0;
        self.next_unique_field_index = 0;
    }

    /// See [`SymbolRegistry::handler_name`]
    pub fn handler_name(
        &self,
        source_id: Option<&str>,
        injector_prefix: &str,
        method_name: &str,
        descriptor: &str,
        is_surrogate: bool,
    ) -> String {
        self.registry.handler_name(
            source_id,
            injector_prefix,
            &self.target,
            method_name,
            descriptor,
            is_surrogate,
        )
    }

    /// Name for a unique method which clashes with something in the target
    ///
    /// With `preserve_prefix` the original name stays in front (so prefixes like `lambda$` are
    /// still recognizable): `{name}${source}_$md${session}${index}`. Otherwise the name is
    /// `md{session}${source}${name}${index}`.
    pub fn unique_method_name(
        &mut self,
        source_id: Option<&str>,
        session_id: &str,
        original_name: &str,
        preserve_prefix: bool,
    ) -> String {
        let index = self.next_unique_method_index;
        self.next_unique_method_index += 1;

        let source = source_namespace(source_id);
        let session = session_fragment(session_id);
        let name = if source.is_empty() {
            original_name.to_owned()
        } else {
            let stripped = strip_source_prefix(original_name, source);
            if preserve_prefix {
                format!("{}${}", stripped, source)
            } else {
                format!("{}${}", source, stripped)
            }
        };

        let unique = if preserve_prefix {
            format!("{}_$md${}${:x}", name, session, index)
        } else {
            format!("md{}${}${:x}", session, name, index)
        };
        log::debug!("Allocated unique method name {} in {}", unique, self.target);
        unique
    }

    /// Name for a unique field which clashes with something in the target
    ///
    /// Shaped `fd{session}${source}${name}${index}`. Field names are never stripped of their
    /// source prefix.
    pub fn unique_field_name(
        &mut self,
        source_id: Option<&str>,
        session_id: &str,
        original_name: &str,
    ) -> String {
        let index = self.next_unique_field_index;
        self.next_unique_field_index += 1;

        let source = source_namespace(source_id);
        let namespace = if source.is_empty() {
            String::new()
        } else {
            format!("{}$", source)
        };
        let unique = format!(
            "fd{}${}{}${:x}",
            session_fragment(session_id),
            namespace,
            original_name,
            index
        );
        log::debug!("Allocated unique field name {} in {}", unique, self.target);
        unique
    }

    /// Rename an injector handler to its collision-free name
    ///
    /// Anything other than a handler is left alone. A handler conformed earlier on this target
    /// gets the same name again. Returns whether the method was renamed.
    pub fn remap_handler_method(
        &mut self,
        mixin: &MixinInfo,
        handler: &mut MixinMethod,
    ) -> Result<bool, Error> {
        let injector = match handler.role.injector() {
            Some(injector) => injector,
            None => return Ok(false),
        };
        if handler.marked_unique {
            log::warn!(
                "Redundant unique marker on injector handler {} in {}",
                handler.signature(),
                mixin.name
            );
        }

        let descriptor = handler.descriptor.render();
        let key = (mixin.name.clone(), handler.name.clone(), descriptor);
        if let Some(conformed) = self.conformed.get(&key) {
            handler.name = conformed.clone();
            return Ok(true);
        }

        let source_id = mixin.source_id();
        let name = self.handler_name(
            source_id.as_deref(),
            injector.prefix(),
            handler.name.as_str(),
            &key.2,
            handler.surrogate,
        );
        let name = UnqualifiedName::from_string(name).map_err(crate::jvm::Error::MalformedName)?;
        log::debug!(
            "Conformed handler {} of {} to {} in {}",
            handler.name,
            mixin.name,
            name,
            self.target
        );

        self.conformed.insert(key, name.clone());
        handler.name = name;
        Ok(true)
    }
}
