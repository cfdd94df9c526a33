use mixin_merge::jvm::{BinaryName, Name};
use mixin_merge::transform::{SymbolAllocator, SymbolRegistry};
use std::collections::HashSet;
use std::thread;

const SESSION: &str = "6c2e8d5a-0b1f-4e7a-9c3d-a1b2c3d4e5f6";

fn class(name: &str) -> BinaryName {
    BinaryName::from_string(name.to_owned()).unwrap()
}

#[test]
fn concurrent_handler_names_are_distinct() {
    let registry = SymbolRegistry::new();
    let names: Vec<String> = thread::scope(|scope| {
        let workers: Vec<_> = (0..8)
            .map(|worker| {
                let registry = registry.clone();
                scope.spawn(move || {
                    let target = class(&format!("game/Entity{}", worker % 3));
                    let allocator = SymbolAllocator::new(registry, target);
                    (0..50)
                        .map(|_| {
                            allocator.handler_name(Some("mymod"), "handler", "onTick", "()V", false)
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        workers
            .into_iter()
            .flat_map(|worker| worker.join().unwrap())
            .collect()
    });

    let distinct: HashSet<&String> = names.iter().collect();
    assert_eq!(names.len(), 400);
    assert_eq!(distinct.len(), 400);
    assert_eq!(registry.class_count(), 3);
}

#[test]
fn concurrent_class_ids_are_dense() {
    let registry = SymbolRegistry::new();
    let ids: Vec<usize> = thread::scope(|scope| {
        let workers: Vec<_> = (0..16)
            .map(|worker| {
                let registry = registry.clone();
                scope.spawn(move || registry.class_id(&class(&format!("game/Block{}", worker))))
            })
            .collect();
        workers
            .into_iter()
            .map(|worker| worker.join().unwrap())
            .collect()
    });

    let mut ids = ids;
    ids.sort_unstable();
    assert_eq!(ids, (0..16).collect::<Vec<_>>());

    // Asking again doesn't hand out anything new
    assert!(registry.class_id(&class("game/Block3")) < 16);
    assert_eq!(registry.class_count(), 16);
}

#[test]
fn unique_fields_restart_after_reset() {
    let mut allocator = SymbolAllocator::new(SymbolRegistry::new(), class("game/Player"));

    let first = allocator.unique_field_name(Some("mymod"), SESSION, "counter");
    let second = allocator.unique_field_name(Some("mymod"), SESSION, "counter");
    assert_eq!(first, "fdd4e5f6$mymod$counter$0");
    assert_eq!(second, "fdd4e5f6$mymod$counter$1");

    allocator.reset();
    assert_eq!(
        allocator.unique_field_name(Some("mymod"), SESSION, "counter"),
        first
    );
}

#[test]
fn surrogate_registered_first() {
    let registry = SymbolRegistry::new();
    let allocator = SymbolAllocator::new(registry, class("game/Player"));

    // The surrogate creates the counter, the real handler then bumps it
    assert_eq!(
        allocator.handler_name(None, "handler", "onJump", "(Z)V", true),
        "handler$zza000$onJump"
    );
    assert_eq!(
        allocator.handler_name(None, "handler", "onJump", "(Z)V", false),
        "handler$zza001$onJump"
    );
}

#[test]
fn long_source_ids_are_truncated() {
    let allocator = SymbolAllocator::new(SymbolRegistry::new(), class("game/Player"));
    assert_eq!(
        allocator.handler_name(
            Some("averylongmodidentifier"),
            "redirect",
            "averylongmod_getHealth",
            "()F",
            false
        ),
        "redirect$zza000$averylongmod$getHealth"
    );
}
