use super::MixinInfo;
use crate::jvm::class_graph::ShadowModel;
use crate::jvm::{BinaryName, MethodDescriptor, UnqualifiedName};
use crate::transform::MixinMethod;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// A method in a descendant mixin which overrides one declared higher up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Override {
    pub mixin: BinaryName,
    pub method: MixinMethod,
}

/// Remembers which mixins extend which other mixins
///
/// Clones share the same registrations.
#[derive(Clone, Default)]
pub struct InheritanceTracker {
    /// Ancestor mixin to the mixins below it
    descendants: Arc<RwLock<HashMap<BinaryName, Vec<Arc<MixinInfo>>>>>,
}

impl InheritanceTracker {
    pub fn new() -> InheritanceTracker {
        InheritanceTracker::default()
    }

    /// Record a mixin against every mixin in its superclass chain
    ///
    /// The walk stops at the first ancestor that isn't a mixin (or isn't in the model).
    pub fn register<M: ShadowModel + ?Sized>(&self, mixin: Arc<MixinInfo>, model: &M) {
        let mut ancestors = vec![];
        let mut seen = HashSet::new();
        let mut current = model.superclass(&mixin.name);
        while let Some(ancestor) = current {
            if !model.is_mixin(ancestor) || !seen.insert(ancestor.clone()) {
                break;
            }
            ancestors.push(ancestor.clone());
            current = model.superclass(ancestor);
        }

        let mut descendants = self.descendants.write();
        for ancestor in ancestors {
            log::debug!("Registered mixin {} under parent mixin {}", mixin.name, ancestor);
            descendants
                .entry(ancestor)
                .or_insert_with(Vec::new)
                .push(mixin.clone());
        }
    }

    /// Overrides of `owner`'s method among the mixins registered below it
    ///
    /// Static and private methods are never overrides, and package-private ones only count in
    /// mixins from the same package.
    pub fn find_overrides(
        &self,
        owner: &BinaryName,
        name: &UnqualifiedName,
        descriptor: &MethodDescriptor<BinaryName>,
    ) -> Vec<Override> {
        let descendants = self.descendants.read();
        let children = match descendants.get(owner) {
            Some(children) => children,
            None => return vec![],
        };

        children
            .iter()
            .filter_map(|child| {
                let method = child.find_method(name, descriptor)?;
                if method.is_static() || method.is_private() {
                    return None;
                }
                if method.access_flags.visibility() == crate::jvm::Visibility::Package
                    && owner.package_prefix() != child.name.package_prefix()
                {
                    return None;
                }
                Some(Override {
                    mixin: child.name.clone(),
                    method: method.clone(),
                })
            })
            .collect()
    }

    /// Number of mixins registered below `owner`
    pub fn descendant_count(&self, owner: &BinaryName) -> usize {
        self.descendants.read().get(owner).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::class_graph::ClassGraph;
    use crate::jvm::{MethodAccessFlags, Name, ParseDescriptor};
    use crate::transform::{MemberRole, MixinConfig};

    fn name(s: &str) -> BinaryName {
        BinaryName::from_string(s.to_owned()).unwrap()
    }

    fn method(method_name: &str, flags: MethodAccessFlags) -> MixinMethod {
        MixinMethod::new(
            UnqualifiedName::from_string(method_name.to_owned()).unwrap(),
            MethodDescriptor::parse("()V").unwrap(),
            flags,
            MemberRole::Plain,
        )
    }

    fn mixin(mixin_name: &str, methods: Vec<MixinMethod>) -> Arc<MixinInfo> {
        let mut info = MixinInfo::new(name(mixin_name), Arc::new(MixinConfig::new("test")));
        info.methods = methods;
        Arc::new(info)
    }

    #[test]
    fn overrides() {
        let graph = ClassGraph::parse_listing(
            "
            mixin class m/Base
            mixin class m/Middle extends m/Base
            mixin class m/Leaf extends m/Middle
            mixin class other/Stranger extends m/Base
            ",
        )
        .unwrap();
        let tracker = InheritanceTracker::new();

        let void = MethodDescriptor::parse("()V").unwrap();
        tracker.register(
            mixin(
                "m/Leaf",
                vec![
                    method("tick", MethodAccessFlags::PUBLIC),
                    method("hidden", MethodAccessFlags::PRIVATE),
                    method("shared", MethodAccessFlags::PUBLIC | MethodAccessFlags::STATIC),
                    method("local", MethodAccessFlags::empty()),
                ],
            ),
            &graph,
        );
        tracker.register(
            mixin("other/Stranger", vec![method("local", MethodAccessFlags::empty())]),
            &graph,
        );

        assert_eq!(tracker.descendant_count(&name("m/Base")), 2);
        assert_eq!(tracker.descendant_count(&name("m/Middle")), 1);

        let tick = UnqualifiedName::from_string(String::from("tick")).unwrap();
        let found = tracker.find_overrides(&name("m/Middle"), &tick, &void);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].mixin, name("m/Leaf"));
        assert_eq!(found[0].method.name, tick);

        for skipped in ["hidden", "shared", "missing"] {
            let skipped = UnqualifiedName::from_string(skipped.to_owned()).unwrap();
            assert!(tracker.find_overrides(&name("m/Base"), &skipped, &void).is_empty());
        }

        // Package-private overrides only count within the package
        let local = UnqualifiedName::from_string(String::from("local")).unwrap();
        let found = tracker.find_overrides(&name("m/Base"), &local, &void);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].mixin, name("m/Leaf"));

        assert!(tracker
            .find_overrides(&name("m/Unknown"), &tick, &void)
            .is_empty());
    }

    #[test]
    fn stops_at_real_classes() {
        let graph = ClassGraph::parse_listing(
            "
            class a/Real
            mixin class a/Mixin extends a/Real
            mixin class a/Child extends a/Mixin
            ",
        )
        .unwrap();
        let tracker = InheritanceTracker::new();
        tracker.register(mixin("a/Child", vec![]), &graph);
        tracker.register(mixin("a/Mixin", vec![]), &graph);

        assert_eq!(tracker.descendant_count(&name("a/Mixin")), 1);
        assert_eq!(tracker.descendant_count(&name("a/Real")), 0);
    }
}
