use mixin_merge::jvm::class_graph::ClassGraph;
use mixin_merge::jvm::verifier::{Value, VerificationType, Verifier, VerifierError};
use mixin_merge::jvm::{BinaryName, FieldType, ParseDescriptor};

const LISTING: &str = "
    # A small slice of a game's class hierarchy
    interface game/Tickable
    interface game/Named
    class game/Entity implements game/Tickable
    class game/Living extends game/Entity implements game/Named
    class game/Player extends game/Living
    class game/Zombie extends game/Living
    class game/Item
    class game/Sword extends game/Item implements game/Named
";

fn types() -> Vec<VerificationType> {
    [
        "I",
        "F",
        "J",
        "Ljava/lang/Object;",
        "Ljava/lang/String;",
        "Lgame/Player;",
        "Lgame/Zombie;",
        "Lgame/Entity;",
        "Lgame/Sword;",
        "Lgame/Named;",
        "[Lgame/Player;",
        "[Lgame/Zombie;",
        "[[Lgame/Item;",
        "[I",
        "[[J",
    ]
    .iter()
    .map(|descriptor| VerificationType::from(FieldType::<BinaryName>::parse(descriptor).unwrap()))
    .chain(Some(VerificationType::Null))
    .collect()
}

fn typ(descriptor: &str) -> VerificationType {
    VerificationType::from(FieldType::<BinaryName>::parse(descriptor).unwrap())
}

#[test]
fn common_supertype_is_symmetric() {
    let graph = ClassGraph::parse_listing(LISTING).unwrap();
    let verifier = Verifier::new(&graph);
    let types = types();

    for type1 in &types {
        for type2 in &types {
            let forward = verifier.common_supertype(type1, type2);
            let backward = verifier.common_supertype(type2, type1);
            match (forward, backward) {
                (Ok(forward), Ok(backward)) => {
                    assert_eq!(forward, backward, "{} and {}", type1, type2)
                }
                (
                    Err(VerifierError::IncompatibleTypes(..)),
                    Err(VerifierError::IncompatibleTypes(..)),
                ) => (),
                (forward, backward) => panic!(
                    "{} and {} disagree: {:?} vs {:?}",
                    type1, type2, forward, backward
                ),
            }
        }
    }
}

#[test]
fn supertypes_are_assignable() {
    let graph = ClassGraph::parse_listing(LISTING).unwrap();
    let verifier = Verifier::new(&graph);
    let types = types();

    for type1 in &types {
        let value = Value::from(type1.clone());
        assert!(verifier.is_subtype_of(&value, &value), "{} is not reflexive", type1);
        assert_eq!(verifier.merge(&value, &value).unwrap(), value);

        for type2 in &types {
            if let Ok(supertype) = verifier.common_supertype(type1, type2) {
                assert!(verifier.is_assignable_from(&supertype, type1));
                assert!(verifier.is_assignable_from(&supertype, type2));
            }
        }
    }
}

#[test]
fn hierarchy_queries() {
    let graph = ClassGraph::parse_listing(LISTING).unwrap();
    let verifier = Verifier::new(&graph);

    let pairs = [
        ("Lgame/Player;", "Lgame/Zombie;", "Lgame/Living;"),
        ("Lgame/Player;", "Lgame/Sword;", "Ljava/lang/Object;"),
        ("Lgame/Player;", "Lgame/Named;", "Lgame/Named;"),
        ("Lgame/Item;", "Lgame/Named;", "Ljava/lang/Object;"),
        ("[Lgame/Player;", "[Lgame/Zombie;", "[Lgame/Living;"),
        ("[Lgame/Player;", "[[Lgame/Item;", "[Ljava/lang/Object;"),
        ("[I", "[[J", "Ljava/lang/Object;"),
    ];
    for (type1, type2, expected) in pairs {
        assert_eq!(
            verifier.common_supertype(&typ(type1), &typ(type2)).unwrap(),
            typ(expected),
            "{} and {}",
            type1,
            type2
        );
    }

    // Interfaces accept any reference
    let named = Value::from(typ("Lgame/Named;"));
    assert!(verifier.is_subtype_of(&Value::from(typ("Lgame/Zombie;")), &named));
    assert!(verifier.is_subtype_of(&Value::from(typ("Lgame/Item;")), &named));
    assert!(!verifier.is_subtype_of(&Value::from(VerificationType::Integer), &named));

    // Incompatible values only poison the slot
    assert_eq!(
        verifier
            .merge(&Value::from(VerificationType::Integer), &Value::from(typ("Lgame/Item;")))
            .unwrap(),
        Value::Uninitialized
    );
}

#[test]
fn unknown_classes_and_live_loading() {
    let graph = ClassGraph::parse_listing(LISTING).unwrap();
    let verifier = Verifier::new(&graph);

    assert!(matches!(
        verifier.common_supertype(&typ("Lgame/Player;"), &typ("Lgame/Ghost;")),
        Err(VerifierError::MissingClass(_))
    ));
    assert!(matches!(
        verifier.load_class(&typ("Lgame/Player;")),
        Err(VerifierError::LiveClassLoading(_))
    ));
}
