use mixin_merge::jvm::class_graph::ClassGraph;
use mixin_merge::jvm::{
    BinaryName, FieldAccessFlags, FieldType, MethodAccessFlags, MethodDescriptor, Name,
    ParseDescriptor, UnqualifiedName,
};
use mixin_merge::transform::*;
use std::sync::Arc;
use std::thread;

fn class(name: &str) -> BinaryName {
    BinaryName::from_string(name.to_owned()).unwrap()
}

fn member(name: &str) -> UnqualifiedName {
    UnqualifiedName::from_string(name.to_owned()).unwrap()
}

fn method(name: &str, descriptor: &str, flags: MethodAccessFlags, role: MemberRole) -> MixinMethod {
    MixinMethod::new(
        member(name),
        MethodDescriptor::parse(descriptor).unwrap(),
        flags,
        role,
    )
}

fn config() -> Arc<MixinConfig> {
    let mut config = MixinConfig::new("coolmod.mixins.json").with_source_id("cool-mod");
    config.decorate(MOD_ID_KEY, "coolmod");
    Arc::new(config)
}

#[test]
fn instance_fields_never_reach_interfaces() {
    let mut mixin = MixinInfo::new(class("coolmod/mixin/ApiMixin"), config());
    mixin.fields.push(MixinField::new(
        member("cache"),
        FieldType::object(BinaryName::STRING),
        FieldAccessFlags::PRIVATE,
        MemberRole::Unique,
    ));
    let target = TargetClass::new(class("game/Api"), TargetKind::Interface);

    for level in CompatibilityLevel::ALL {
        for enabled in [false, true] {
            let mut settings = Settings::new().compatibility_level(level);
            if enabled {
                settings = settings.enable(Feature::InjectorsInInterfaceMixins);
            }
            let errors = MixinApplicator::new(&settings).audit(&target, &mixin);
            assert_eq!(
                errors,
                vec![MergeError::IllegalMerge {
                    mixin: mixin.name.clone(),
                    member: String::from("cache:Ljava/lang/String;"),
                    rule: IllegalMergeRule::NewInstanceField,
                }],
                "at {}",
                level
            );
        }
    }
}

#[test]
fn static_interface_handlers_before_private_methods() {
    let mut mixin = MixinInfo::new(class("coolmod/mixin/ApiMixin"), config());
    mixin.methods.push(method(
        "onLoad",
        "()V",
        MethodAccessFlags::PUBLIC | MethodAccessFlags::STATIC,
        MemberRole::Handler(InjectorKind::Inject),
    ));
    let mut target = TargetClass::new(class("game/Api"), TargetKind::Interface);

    let settings = Settings::with_session_id("fixed-session")
        .unwrap()
        .compatibility_level(CompatibilityLevel::Java8)
        .enable(Feature::InjectorsInInterfaceMixins);
    let applicator = MixinApplicator::new(&settings);
    assert!(applicator.audit(&target, &mixin).is_empty());

    let mut allocator = SymbolAllocator::new(SymbolRegistry::new(), target.name.clone());
    let report = applicator.apply(&mut target, &mixin, &mut allocator).unwrap();
    assert_eq!(report.merged_methods, vec![member("handler$zza000$cool_mod$onLoad")]);
    assert_eq!(
        target.methods[0].access_flags,
        MethodAccessFlags::PRIVATE | MethodAccessFlags::STATIC | MethodAccessFlags::SYNTHETIC
    );
}

#[test]
fn reapplying_keeps_names_stable() {
    let mut mixin = MixinInfo::new(class("coolmod/mixin/PlayerMixin"), config());
    assert_eq!(mixin.config.mod_id(), "coolmod");
    mixin.fields.push(MixinField::new(
        member("jumps"),
        FieldType::int(),
        FieldAccessFlags::PRIVATE,
        MemberRole::Unique,
    ));
    mixin.methods.push(method(
        "cool_mod_onJump",
        "(Z)V",
        MethodAccessFlags::PRIVATE,
        MemberRole::Handler(InjectorKind::Redirect),
    ));
    mixin.methods.push(method(
        "<clinit>",
        "()V",
        MethodAccessFlags::STATIC,
        MemberRole::Plain,
    ));

    let fresh_target = || {
        let mut target = TargetClass::new(class("game/Player"), TargetKind::Class);
        target.fields.push(TargetField {
            name: member("jumps"),
            descriptor: FieldType::int(),
            access_flags: FieldAccessFlags::PRIVATE,
        });
        target
    };

    let settings = Settings::with_session_id("0123456789abcdef0123456789abcdefwxyz").unwrap();
    let applicator = MixinApplicator::new(&settings);
    let mut allocator = SymbolAllocator::new(SymbolRegistry::new(), class("game/Player"));

    let mut first_target = fresh_target();
    let first = applicator
        .apply(&mut first_target, &mixin, &mut allocator)
        .unwrap();

    allocator.reset();
    let mut second_target = fresh_target();
    let second = applicator
        .apply(&mut second_target, &mixin, &mut allocator)
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(first_target, second_target);
    assert_eq!(
        first.added_fields,
        vec![member("fdefwxyz$cool_mod$jumps$0")]
    );
    assert_eq!(
        first.merged_methods,
        vec![member("redirect$zza000$cool_mod$onJump"), UnqualifiedName::CLINIT]
    );
}

#[test]
fn overrides_across_threads() {
    let graph = ClassGraph::parse_listing(
        "
        mixin class coolmod/mixin/BaseMixin
        mixin class coolmod/mixin/ChildMixin0 extends coolmod/mixin/BaseMixin
        mixin class coolmod/mixin/ChildMixin1 extends coolmod/mixin/BaseMixin
        mixin class coolmod/mixin/ChildMixin2 extends coolmod/mixin/BaseMixin
        mixin class coolmod/mixin/ChildMixin3 extends coolmod/mixin/BaseMixin
        ",
    )
    .unwrap();
    let tracker = InheritanceTracker::new();

    thread::scope(|scope| {
        for child in 0..4 {
            let tracker = tracker.clone();
            let graph = &graph;
            scope.spawn(move || {
                let mut mixin =
                    MixinInfo::new(class(&format!("coolmod/mixin/ChildMixin{}", child)), config());
                mixin.methods.push(method(
                    "tick",
                    "()V",
                    MethodAccessFlags::PROTECTED,
                    MemberRole::Plain,
                ));
                tracker.register(Arc::new(mixin), graph);
            });
        }
    });

    let void = MethodDescriptor::parse("()V").unwrap();
    let mut found: Vec<_> = tracker
        .find_overrides(&class("coolmod/mixin/BaseMixin"), &member("tick"), &void)
        .into_iter()
        .map(|found| found.mixin)
        .collect();
    found.sort();
    assert_eq!(
        found,
        (0..4)
            .map(|child| class(&format!("coolmod/mixin/ChildMixin{}", child)))
            .collect::<Vec<_>>()
    );
}

#[test]
fn interface_shadow_fields_must_be_constants() {
    let settings = Settings::new();
    let applicator = MixinApplicator::new(&settings);
    let mixin = MixinInfo::new(class("coolmod/mixin/ApiMixin"), config());
    let shadow = |flags| MixinField::new(member("LIMIT"), FieldType::int(), flags, MemberRole::Shadow);

    let private_constant =
        FieldAccessFlags::PRIVATE | FieldAccessFlags::STATIC | FieldAccessFlags::FINAL;
    let public_static = FieldAccessFlags::PUBLIC | FieldAccessFlags::STATIC;
    let public_constant = public_static | FieldAccessFlags::FINAL;

    for rejected in [private_constant, public_static] {
        assert!(matches!(
            applicator.validate_field(TargetKind::Interface, &mixin, &shadow(rejected)),
            Err(MergeError::IllegalMerge {
                rule: IllegalMergeRule::NonConstantShadowField,
                ..
            })
        ));
    }
    assert!(applicator
        .validate_field(TargetKind::Interface, &mixin, &shadow(public_constant))
        .is_ok());
}
