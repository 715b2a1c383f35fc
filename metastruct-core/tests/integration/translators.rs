use metastruct_core::{
    Composite, CopyFlags, DataShape, FieldFlags, Instance, InstanceMut, MetaStruct, Object,
    Populate, Translator, add_field, reflect_struct,
};
use metastruct_testhelpers::setup;

/// Per-object comparison rules for collated strings.
struct Collation {
    ignore_case: bool,
}

impl Object for Collation {}

fn ignores_case(instance: Instance<'_>) -> bool {
    instance
        .object
        .and_then(|object| object.downcast_ref::<Collation>())
        .is_some_and(|collation| collation.ignore_case)
}

/// Compares strings according to the owning object's collation.
struct CollatedString;

impl Translator for CollatedString {
    fn shape(&self) -> DataShape {
        DataShape::Scalar
    }

    fn type_name(&self) -> &'static str {
        "collated string"
    }

    fn size(&self) -> usize {
        core::mem::size_of::<String>()
    }

    unsafe fn equals(&self, a: Instance<'_>, b: Instance<'_>) -> bool {
        let (x, y) = unsafe { (a.data.get::<String>(), b.data.get::<String>()) };
        if ignores_case(a) {
            x.eq_ignore_ascii_case(y)
        } else {
            x == y
        }
    }

    unsafe fn copy(&self, src: Instance<'_>, dst: InstanceMut<'_>, _flags: CopyFlags) {
        let (src, dst) = unsafe { (src.data.get::<String>(), dst.data.as_mut::<String>()) };
        dst.clone_from(src);
    }
}

#[derive(Default)]
#[repr(C)]
struct Contact {
    name: String,
    age: u8,
}

impl Populate for Contact {
    fn populate(meta: &mut MetaStruct) {
        // SAFETY: CollatedString handles Strings
        unsafe {
            add_field!(
                meta,
                Contact,
                name,
                "name",
                FieldFlags::empty(),
                Box::new(CollatedString)
            );
        }
        add_field!(meta, Contact, age, "age")
            .set_property("min", 0)
            .set_property("max", 150)
            .set_property("unit", "years");
    }
}

reflect_struct!(Contact);

#[derive(Default)]
#[repr(C)]
struct Card {
    owner: Contact,
}

impl Populate for Card {
    fn populate(meta: &mut MetaStruct) {
        add_field!(meta, Card, owner, "owner");
    }
}

reflect_struct!(Card);

#[test]
fn custom_translators_replace_deduced_ones() {
    setup();
    let name = Contact::meta_struct().find_field_named("name").unwrap();
    assert_eq!(name.translator().type_name(), "collated string");
    assert_eq!(name.size(), core::mem::size_of::<String>());
}

#[test]
fn translators_see_the_owning_object() {
    setup();
    let meta = Contact::meta_struct();
    let a = Contact {
        name: "Ann".into(),
        age: 30,
    };
    let b = Contact {
        name: "ANN".into(),
        age: 30,
    };
    let lenient = Collation { ignore_case: true };
    let strict = Collation { ignore_case: false };

    unsafe {
        assert!(meta.equals(
            Instance::of(&a).with_object(&lenient),
            Instance::of(&b).with_object(&lenient),
        ));
        assert!(!meta.equals(
            Instance::of(&a).with_object(&strict),
            Instance::of(&b).with_object(&strict),
        ));
        assert!(!meta.equals(Instance::of(&a), Instance::of(&b)));
    }
}

#[test]
fn nested_composites_forward_the_owning_object() {
    setup();
    let meta = Card::meta_struct();
    let a = Card {
        owner: Contact {
            name: "bob".into(),
            age: 1,
        },
    };
    let mut b = Card {
        owner: Contact {
            name: "BOB".into(),
            age: 1,
        },
    };
    let lenient = Collation { ignore_case: true };

    unsafe {
        assert!(meta.equals(
            Instance::of(&a).with_object(&lenient),
            Instance::of(&b).with_object(&lenient),
        ));
        meta.copy(
            Instance::of(&a).with_object(&lenient),
            InstanceMut::of(&mut b).with_object(&lenient),
            false,
        );
    }
    assert_eq!(b.owner.name, "bob");
}

#[test]
fn fields_keep_ordered_properties() {
    setup();
    let age = Contact::meta_struct().find_field_named("age").unwrap();
    assert_eq!(age.property_as::<u8>("max"), Some(150));
    assert_eq!(age.property("unit"), Some("years"));
    assert_eq!(age.property_as::<u8>("unit"), None);
    assert!(age.property("step").is_none());
    let keys: Vec<_> = age.properties().map(|(key, _)| key).collect();
    assert_eq!(keys, ["min", "max", "unit"]);
}
