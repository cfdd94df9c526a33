use super::{BinaryName, Error, Name};
use std::collections::{HashMap, HashSet};

/// Read-only view of the class hierarchy
///
/// This is how the rest of the crate learns about classes: nothing here ever loads a real class.
/// Implementors only need to provide [`ShadowModel::resolve`], everything else is derived from it.
pub trait ShadowModel {
    /// Look up a class by name
    fn resolve(&self, name: &BinaryName) -> Option<&ClassData>;

    /// Is the class an interface? Unknown classes are not.
    fn is_interface(&self, name: &BinaryName) -> bool {
        self.resolve(name).map_or(false, |class| class.is_interface)
    }

    /// Is the class itself a mixin? Unknown classes are not.
    fn is_mixin(&self, name: &BinaryName) -> bool {
        self.resolve(name).map_or(false, |class| class.is_mixin)
    }

    /// Superclass of a class (`None` for the root or unknown classes)
    fn superclass(&self, name: &BinaryName) -> Option<&BinaryName> {
        self.resolve(name).and_then(|class| class.superclass.as_ref())
    }

    /// Object to object assignability
    ///
    /// This does a search up the superclasses and superinterfaces looking for the super type.
    /// Classes missing from the model end the search along their branch, so this may return
    /// false negatives for incomplete models.
    fn is_assignable(&self, sub_type: &BinaryName, super_type: &BinaryName) -> bool {
        if super_type == &BinaryName::OBJECT {
            return true;
        }

        let mut supertypes_to_visit: Vec<&BinaryName> = vec![sub_type];
        let mut dont_revisit: HashSet<&BinaryName> = HashSet::new();
        dont_revisit.insert(sub_type);

        // Optimization: if the super type is a class, then skip visiting interfaces
        let super_is_class: bool = !self.is_interface(super_type);

        while let Some(next_supertype) = supertypes_to_visit.pop() {
            if next_supertype == super_type {
                return true;
            }
            if let Some(class_data) = self.resolve(next_supertype) {
                if let Some(superclass) = &class_data.superclass {
                    if dont_revisit.insert(superclass) {
                        supertypes_to_visit.push(superclass);
                    }
                }
                if !super_is_class {
                    for interface in &class_data.interfaces {
                        if dont_revisit.insert(interface) {
                            supertypes_to_visit.push(interface);
                        }
                    }
                }
            }
        }

        false
    }

    /// Closest class both types can be treated as
    ///
    /// If either type is assignable to the other, that one wins. Otherwise interfaces collapse to
    /// `java/lang/Object` (there may not be a unique common super interface) and classes walk up
    /// the superclass chain of the first type until reaching a class the second type extends.
    fn nearest_common_ancestor(
        &self,
        type1: &BinaryName,
        type2: &BinaryName,
    ) -> Result<BinaryName, Error> {
        let class1 = self
            .resolve(type1)
            .ok_or_else(|| Error::MissingClass(type1.to_string()))?;
        let class2 = self
            .resolve(type2)
            .ok_or_else(|| Error::MissingClass(type2.to_string()))?;

        if self.is_assignable(type2, type1) {
            return Ok(type1.clone());
        }
        if self.is_assignable(type1, type2) {
            return Ok(type2.clone());
        }
        if class1.is_interface || class2.is_interface {
            return Ok(BinaryName::OBJECT);
        }

        let mut ancestor = class1.superclass.as_ref();
        while let Some(candidate) = ancestor {
            if self.is_assignable(type2, candidate) {
                return Ok(candidate.clone());
            }
            ancestor = self.superclass(candidate);
        }
        Ok(BinaryName::OBJECT)
    }
}

/// Structural description of one class in the shadow model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassData {
    /// Name of the class
    pub name: BinaryName,

    /// Superclass is only ever missing for `java/lang/Object` itself
    pub superclass: Option<BinaryName>,

    /// Interfaces implemented (or super-interfaces), in declaration order
    pub interfaces: Vec<BinaryName>,

    /// Is this an interface?
    pub is_interface: bool,

    /// Is this class a mixin (as opposed to a real class)?
    pub is_mixin: bool,

    /// Arbitrary metadata
    decorations: HashMap<String, String>,
}

impl ClassData {
    pub fn new(name: BinaryName, superclass: BinaryName, is_interface: bool) -> ClassData {
        ClassData {
            name,
            superclass: Some(superclass),
            interfaces: vec![],
            is_interface,
            is_mixin: false,
            decorations: HashMap::new(),
        }
    }

    /// Data for the root of the hierarchy
    pub fn root() -> ClassData {
        ClassData {
            name: BinaryName::OBJECT,
            superclass: None,
            interfaces: vec![],
            is_interface: false,
            is_mixin: false,
            decorations: HashMap::new(),
        }
    }

    /// Add an implemented interface, ignoring duplicates
    pub fn add_interface(&mut self, interface: BinaryName) -> bool {
        if self.interfaces.contains(&interface) {
            false
        } else {
            self.interfaces.push(interface);
            true
        }
    }

    /// Attach a decoration
    ///
    /// Decorations are written once: returns `false` (and leaves the old value) if the key was
    /// already set.
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
}

/// Tracks the relationships between classes/interfaces
///
/// This is the in-memory shadow model: it is built up front (from class file headers, or from a
/// textual listing) and is then only read.
#[derive(Debug, Default)]
pub struct ClassGraph {
    classes: HashMap<BinaryName, ClassData>,
}

impl ShadowModel for ClassGraph {
    fn resolve(&self, name: &BinaryName) -> Option<&ClassData> {
        self.classes.get(name)
    }
}

impl ClassGraph {
    /// New empty graph
    pub fn new() -> ClassGraph {
        ClassGraph {
            classes: HashMap::new(),
        }
    }

    /// Add a new class to the class graph
    pub fn add_class(&mut self, data: ClassData) -> Result<(), Error> {
        if self.classes.contains_key(&data.name) {
            return Err(Error::DuplicateClass(data.name.to_string()));
        }
        self.classes.insert(data.name.clone(), data);
        Ok(())
    }

    /// Mutable access to a class, for adding interfaces and decorations
    pub fn class_mut(&mut self, name: &BinaryName) -> Option<&mut ClassData> {
        self.classes.get_mut(name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Add the handful of standard types that show up in every hierarchy
    pub fn insert_java_library_types(&mut self) -> Result<(), Error> {
        let object = BinaryName::OBJECT;
        self.add_class(ClassData::root())?;
        for interface in [
            BinaryName::CLONEABLE,
            BinaryName::SERIALIZABLE,
            BinaryName::CHARSEQUENCE,
            BinaryName::COMPARABLE,
        ] {
            self.add_class(ClassData::new(interface, object.clone(), true))?;
        }

        let mut string = ClassData::new(BinaryName::STRING, object.clone(), false);
        string.add_interface(BinaryName::SERIALIZABLE);
        string.add_interface(BinaryName::COMPARABLE);
        string.add_interface(BinaryName::CHARSEQUENCE);
        self.add_class(string)?;

        let mut number = ClassData::new(BinaryName::NUMBER, object, false);
        number.add_interface(BinaryName::SERIALIZABLE);
        self.add_class(number)?;

        let mut integer = ClassData::new(BinaryName::INTEGER, BinaryName::NUMBER, false);
        integer.add_interface(BinaryName::COMPARABLE);
        self.add_class(integer)?;

        Ok(())
    }

    /// Parse a hierarchy listing
    ///
    /// Each non-empty line not starting with `#` declares one type:
    ///
    /// ```text
    /// [mixin] class <name> [extends <super>] [implements <iface>, ...]
    /// [mixin] interface <name> [extends <iface>, ...]
    /// ```
    ///
    /// Classes without `extends` extend `java/lang/Object`. The standard library types from
    /// [`Self::insert_java_library_types`] are always present.
    pub fn parse_listing(listing: &str) -> Result<ClassGraph, Error> {
        let mut graph = ClassGraph::new();
        graph.insert_java_library_types()?;

        for (line_idx, line) in listing.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let class = Self::parse_listing_line(line).map_err(|message| Error::MalformedListing {
                line: line_idx + 1,
                message,
            })?;
            if class.name == BinaryName::OBJECT {
                continue;
            }
            graph.add_class(class)?;
        }

        Ok(graph)
    }

    fn parse_listing_line(line: &str) -> Result<ClassData, String> {
        let mut tokens = line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|token| !token.is_empty())
            .peekable();

        let is_mixin = tokens.next_if_eq(&"mixin").is_some();
        let is_interface = match tokens.next() {
            Some("class") => false,
            Some("interface") => true,
            Some(other) => return Err(format!("Expected 'class' or 'interface', found '{}'", other)),
            None => return Err(String::from("Missing type kind")),
        };
        let name = match tokens.next() {
            Some(name) => BinaryName::from_string(name.to_owned())?,
            None => return Err(String::from("Missing type name")),
        };

        let mut class = ClassData::new(name, BinaryName::OBJECT, is_interface);
        class.is_mixin = is_mixin;

        // `None` before any clause, then `true` for interfaces lists, `false` for superclass
        let mut in_interfaces: Option<bool> = None;
        let mut saw_superclass = false;
        for token in tokens {
            match token {
                "extends" if is_interface => in_interfaces = Some(true),
                "extends" => in_interfaces = Some(false),
                "implements" if !is_interface => in_interfaces = Some(true),
                other => {
                    let other = BinaryName::from_string(other.to_owned())?;
                    match in_interfaces {
                        Some(true) => {
                            class.add_interface(other);
                        }
                        Some(false) if !saw_superclass => {
                            class.superclass = Some(other);
                            saw_superclass = true;
                        }
                        Some(false) => {
                            return Err(format!("Class {} has more than one superclass", class.name))
                        }
                        None => return Err(format!("Unexpected token '{}'", other)),
                    }
                }
            }
        }

        Ok(class)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn name(s: &str) -> BinaryName {
        BinaryName::from_string(s.to_owned()).unwrap()
    }

    fn animals() -> ClassGraph {
        ClassGraph::parse_listing(
            "
            # a small zoo
            interface zoo/Pet
            class zoo/Animal
            class zoo/Dog extends zoo/Animal implements zoo/Pet
            class zoo/Cat extends zoo/Animal implements zoo/Pet, java/io/Serializable
            class zoo/Puppy extends zoo/Dog
            mixin class zoo/mixin/DogMixin extends zoo/Animal
            ",
        )
        .unwrap()
    }

    #[test]
    fn listing() {
        let graph = animals();
        let cat = graph.resolve(&name("zoo/Cat")).unwrap();
        assert_eq!(cat.superclass, Some(name("zoo/Animal")));
        assert_eq!(cat.interfaces, vec![name("zoo/Pet"), BinaryName::SERIALIZABLE]);
        assert!(graph.is_interface(&name("zoo/Pet")));
        assert!(graph.is_mixin(&name("zoo/mixin/DogMixin")));
        assert!(!graph.is_mixin(&name("zoo/Dog")));
        assert_eq!(graph.superclass(&name("zoo/Animal")), Some(&BinaryName::OBJECT));
    }

    #[test]
    fn malformed_listing() {
        assert!(matches!(
            ClassGraph::parse_listing("struct zoo/Dog"),
            Err(Error::MalformedListing { line: 1, .. })
        ));
        assert!(matches!(
            ClassGraph::parse_listing("class zoo/Dog\nclass zoo/Dog"),
            Err(Error::DuplicateClass(_))
        ));
        assert!(ClassGraph::parse_listing("class zoo/Dog extends a/A b/B").is_err());
    }

    #[test]
    fn assignability() {
        let graph = animals();
        assert!(graph.is_assignable(&name("zoo/Puppy"), &name("zoo/Animal")));
        assert!(graph.is_assignable(&name("zoo/Puppy"), &name("zoo/Pet")));
        assert!(graph.is_assignable(&name("zoo/Pet"), &BinaryName::OBJECT));
        assert!(!graph.is_assignable(&name("zoo/Animal"), &name("zoo/Dog")));
        assert!(!graph.is_assignable(&name("zoo/Dog"), &name("zoo/Cat")));
    }

    #[test]
    fn common_ancestors() {
        let graph = animals();
        let ancestor = |a: &str, b: &str| graph.nearest_common_ancestor(&name(a), &name(b)).unwrap();

        assert_eq!(ancestor("zoo/Dog", "zoo/Cat"), name("zoo/Animal"));
        assert_eq!(ancestor("zoo/Puppy", "zoo/Cat"), name("zoo/Animal"));
        assert_eq!(ancestor("zoo/Puppy", "zoo/Dog"), name("zoo/Dog"));
        assert_eq!(ancestor("zoo/Dog", "zoo/Pet"), name("zoo/Pet"));
        assert_eq!(ancestor("zoo/Pet", "java/lang/String"), BinaryName::OBJECT);
        assert_eq!(ancestor("java/lang/Integer", "java/lang/String"), BinaryName::OBJECT);
        assert!(graph
            .nearest_common_ancestor(&name("zoo/Dog"), &name("zoo/Unicorn"))
            .is_err());
    }

    #[test]
    fn decorations() {
        let mut graph = animals();
        let dog = graph.class_mut(&name("zoo/Dog")).unwrap();
        assert!(dog.decorate("origin", "kennel"));
        assert!(!dog.decorate("origin", "shelter"));
        assert_eq!(dog.decoration("origin"), Some("kennel"));
        assert_eq!(dog.decoration("missing"), None);
    }
}
