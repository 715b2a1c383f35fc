use std::collections::{BTreeMap, BTreeSet, HashSet};

use indexmap::IndexMap;
use metastruct_core::{
    Composite, CopyFlags, DataShape, MetaKind, MetaStruct, Populate, Translate, add_field,
    reflect_struct,
};
use metastruct_testhelpers::setup;

#[derive(Default)]
#[repr(C)]
struct TestStructure {
    uint8: u8,
    uint16: u16,
    uint32: u32,
    uint64: u64,
    int8: i8,
    int16: i16,
    int32: i32,
    int64: i64,
    float32: f32,
    float64: f64,
    vec_uint32: Vec<u32>,
    set_uint32: BTreeSet<u32>,
    map_uint32: BTreeMap<u32, u32>,
    dynamic_array_uint32: Vec<u32>,
    hash_set_uint32: HashSet<u32>,
    index_map_uint32: IndexMap<u32, u32>,
}

impl Populate for TestStructure {
    fn populate(meta: &mut MetaStruct) {
        add_field!(meta, TestStructure, uint8, "Unsigned 8-bit Integer");
        add_field!(meta, TestStructure, uint16, "Unsigned 16-bit Integer");
        add_field!(meta, TestStructure, uint32, "Unsigned 32-bit Integer");
        add_field!(meta, TestStructure, uint64, "Unsigned 64-bit Integer");

        add_field!(meta, TestStructure, int8, "Signed 8-bit Integer");
        add_field!(meta, TestStructure, int16, "Signed 16-bit Integer");
        add_field!(meta, TestStructure, int32, "Signed 32-bit Integer");
        add_field!(meta, TestStructure, int64, "Signed 64-bit Integer");

        add_field!(meta, TestStructure, float32, "32-bit Floating Point");
        add_field!(meta, TestStructure, float64, "64-bit Floating Point");

        add_field!(meta, TestStructure, vec_uint32, "Vec of Unsigned 32-bit Integers");
        add_field!(meta, TestStructure, set_uint32, "BTreeSet of Unsigned 32-bit Integers");
        add_field!(meta, TestStructure, map_uint32, "BTreeMap of Unsigned 32-bit Integers");

        add_field!(
            meta,
            TestStructure,
            dynamic_array_uint32,
            "Dynamic Array of Unsigned 32-bit Integers"
        );
        add_field!(meta, TestStructure, hash_set_uint32, "Set of Unsigned 32-bit Integers");
        add_field!(meta, TestStructure, index_map_uint32, "Map of Unsigned 32-bit Integers");
    }
}

reflect_struct!(TestStructure);

#[derive(Default)]
#[repr(C)]
struct TestObject {
    structure: TestStructure,
    structure_array: [TestStructure; 2],
}

impl Populate for TestObject {
    fn populate(meta: &mut MetaStruct) {
        add_field!(meta, TestObject, structure, "MetaStruct");
        add_field!(meta, TestObject, structure_array, "MetaStruct Array");
    }
}

reflect_struct!(class TestObject);

fn filled() -> TestStructure {
    TestStructure {
        uint8: u8::MAX,
        uint16: 0xbeef,
        uint32: 7,
        uint64: u64::MAX - 1,
        int8: -8,
        int16: -16,
        int32: -32,
        int64: i64::MIN,
        float32: 1.5,
        float64: -0.125,
        vec_uint32: vec![3, 1, 2],
        set_uint32: BTreeSet::from([5, 6]),
        map_uint32: BTreeMap::from([(1, 10), (2, 20)]),
        dynamic_array_uint32: vec![9],
        hash_set_uint32: HashSet::from([11, 12, 13]),
        index_map_uint32: IndexMap::from([(4, 40), (3, 30)]),
    }
}

#[test]
fn test_structure_describes_every_member() {
    setup();
    let meta = TestStructure::meta_struct();
    assert_eq!(meta.kind(), MetaKind::Struct);
    assert_eq!(meta.size(), core::mem::size_of::<TestStructure>());
    assert_eq!(meta.field_count(), 16);

    let shapes: Vec<_> = meta.fields().iter().map(|f| f.translator().shape()).collect();
    assert!(shapes[..10].iter().all(|s| *s == DataShape::Scalar));
    assert_eq!(
        shapes[10..],
        [
            DataShape::Sequence,
            DataShape::Set,
            DataShape::Map,
            DataShape::Sequence,
            DataShape::Set,
            DataShape::Map,
        ]
    );

    let map = meta
        .find_field_named("BTreeMap of Unsigned 32-bit Integers")
        .unwrap();
    assert_eq!(map.key_type(), Some(<u32 as Translate>::meta_type()));
    assert_eq!(map.value_type(), Some(<u32 as Translate>::meta_type()));
    assert_eq!(map.offset(), core::mem::offset_of!(TestStructure, map_uint32));
}

#[test]
fn test_structure_round_trips() {
    setup();
    let src = filled();
    let mut dst = TestStructure {
        vec_uint32: vec![0; 10],
        hash_set_uint32: HashSet::from([99]),
        index_map_uint32: IndexMap::from([(3, 0), (8, 80)]),
        ..TestStructure::default()
    };
    src.copy_to(&mut dst, CopyFlags::empty());
    assert!(src.equals(&dst));
    assert_eq!(dst.vec_uint32, [3, 1, 2]);
    assert_eq!(dst.hash_set_uint32, src.hash_set_uint32);
    assert_eq!(
        dst.index_map_uint32.keys().copied().collect::<Vec<_>>(),
        [4, 3]
    );
}

#[test]
fn test_object_nests_structures() {
    setup();
    let meta = TestObject::meta_struct();
    assert_eq!(meta.kind(), MetaKind::Class);

    let nested = meta.find_field_named("MetaStruct").unwrap();
    assert_eq!(nested.translator().shape(), DataShape::Struct);
    assert_eq!(nested.translator().type_name(), "TestStructure");
    assert_eq!(
        nested.translator().size(),
        core::mem::size_of::<TestStructure>()
    );

    let array = meta.find_field_named("MetaStruct Array").unwrap();
    assert_eq!(array.count(), 2);
    assert_eq!(array.index(), 1);
}

#[test]
fn test_object_round_trips() {
    setup();
    let src = TestObject {
        structure: filled(),
        structure_array: [TestStructure::default(), filled()],
    };
    let mut dst = TestObject::default();
    assert!(!src.equals(&dst));

    src.copy_to(&mut dst, CopyFlags::empty());
    assert!(src.equals(&dst));
    assert_eq!(dst.structure_array[1].int64, i64::MIN);

    dst.structure_array[1].map_uint32.insert(3, 30);
    assert!(!src.equals(&dst));
}
