use std::collections::BTreeMap;
use std::sync::Arc;

use metastruct_core::{
    Composite, CopyFlags, FieldFlags, Instance, InstanceMut, MetaStruct, Populate, Translate,
    add_field, reflect_struct,
};
use metastruct_testhelpers::setup;

#[derive(Default)]
#[repr(C)]
struct Document {
    title: String,
    revision: u32,
    tags: Vec<String>,
    cache: Arc<Vec<u8>>,
    scratch: u64,
    owners: BTreeMap<String, Arc<String>>,
}

impl Populate for Document {
    fn populate(meta: &mut MetaStruct) {
        add_field!(meta, Document, title, "title");
        add_field!(meta, Document, revision, "revision");
        add_field!(meta, Document, tags, "tags");
        add_field!(meta, Document, cache, "cache", FieldFlags::SHARE);
        add_field!(meta, Document, scratch, "scratch", FieldFlags::DISCARD);
        add_field!(meta, Document, owners, "owners");
    }
}

reflect_struct!(Document);

fn sample() -> Document {
    Document {
        title: "Report".into(),
        revision: 7,
        tags: vec!["draft".into(), "q3".into()],
        cache: Arc::new(vec![1, 2, 3]),
        scratch: 0xdead,
        owners: BTreeMap::from([("ann".into(), Arc::new("editor".to_string()))]),
    }
}

unsafe fn equals<T: Composite>(a: &T, b: &T) -> bool {
    unsafe { T::meta_struct().equals(Instance::of(a), Instance::of(b)) }
}

unsafe fn copy<T: Composite>(src: &T, dst: &mut T, shallow: bool) {
    unsafe { T::meta_struct().copy(Instance::of(src), InstanceMut::of(dst), shallow) }
}

#[test]
fn instances_equal_themselves() {
    setup();
    let doc = sample();
    assert!(unsafe { equals(&doc, &doc) });
    assert!(unsafe { equals(&Document::default(), &Document::default()) });
}

#[test]
fn copies_compare_equal() {
    setup();
    let src = sample();
    let mut dst = Document::default();
    assert!(!unsafe { equals(&src, &dst) });

    unsafe { copy(&src, &mut dst, false) };
    assert!(unsafe { equals(&src, &dst) });
    assert_eq!(dst.title, "Report");
    assert_eq!(dst.tags, ["draft", "q3"]);
}

#[test]
fn shared_fields_alias_after_copy() {
    setup();
    let src = sample();
    let mut dst = Document::default();
    unsafe { copy(&src, &mut dst, false) };
    assert!(Arc::ptr_eq(&src.cache, &dst.cache));
}

#[test]
fn shared_fields_do_not_take_part_in_equality() {
    setup();
    let a = sample();
    let mut b = sample();
    b.cache = Arc::new(vec![9, 9]);
    assert!(unsafe { equals(&a, &b) });

    b.revision += 1;
    assert!(!unsafe { equals(&a, &b) });
}

#[test]
fn discarded_fields_are_still_copied_and_compared() {
    setup();
    let src = sample();
    let mut dst = sample();
    dst.scratch = 0;
    assert!(!unsafe { equals(&src, &dst) });

    unsafe { copy(&src, &mut dst, false) };
    assert_eq!(dst.scratch, 0xdead);
}

#[test]
fn deep_copies_duplicate_pointees() {
    setup();
    let src = sample();
    let mut dst = Document::default();
    unsafe { copy(&src, &mut dst, false) };
    assert!(!Arc::ptr_eq(&src.owners["ann"], &dst.owners["ann"]));
    assert_eq!(*dst.owners["ann"], "editor");
}

#[test]
fn shallow_copies_alias_pointees_inside_containers() {
    setup();
    let src = sample();
    let mut dst = Document::default();
    unsafe { copy(&src, &mut dst, true) };
    assert!(Arc::ptr_eq(&src.owners["ann"], &dst.owners["ann"]));
    assert!(unsafe { equals(&src, &dst) });
}

#[test]
fn copying_onto_itself_changes_nothing() {
    setup();
    let mut doc = sample();
    let meta = Document::meta_struct();
    let dst = InstanceMut::of(&mut doc);
    unsafe { meta.copy(dst.as_const(), dst, false) };
    assert_eq!(doc.tags.len(), 2);
}

#[derive(Default)]
#[repr(C)]
struct Account {
    id: u64,
    holder: String,
}

impl Populate for Account {
    fn populate(meta: &mut MetaStruct) {
        add_field!(meta, Account, id, "id");
        add_field!(meta, Account, holder, "holder");
    }
}

reflect_struct!(Account);

#[derive(Default)]
#[repr(C)]
struct Savings {
    account: Account,
    rate: f64,
}

impl Populate for Savings {
    fn populate(meta: &mut MetaStruct) {
        add_field!(meta, Savings, rate, "rate");
    }
}

reflect_struct!(Savings: Account { account });

#[derive(Default)]
#[repr(C)]
struct Checking {
    account: Account,
    limit: i64,
}

impl Populate for Checking {
    fn populate(meta: &mut MetaStruct) {
        add_field!(meta, Checking, limit, "limit");
    }
}

reflect_struct!(Checking: Account { account });

#[test]
fn copies_between_siblings_go_through_the_common_base() {
    setup();
    let src = Savings {
        account: Account {
            id: 42,
            holder: "Ann".into(),
        },
        rate: 0.25,
    };
    let mut dst = Checking {
        limit: -100,
        ..Checking::default()
    };

    let common = unsafe {
        MetaStruct::copy_between(
            Savings::meta_struct(),
            Instance::of(&src),
            Checking::meta_struct(),
            InstanceMut::of(&mut dst),
            false,
        )
    };
    assert_eq!(common.map(MetaStruct::name), Some("Account"));
    assert_eq!(dst.account.id, 42);
    assert_eq!(dst.account.holder, "Ann");
    assert_eq!(dst.limit, -100);

    let equal = unsafe {
        Account::meta_struct().equals(Instance::of(&src), Instance::of(&dst))
    };
    assert!(equal);
}

#[test]
fn copies_between_unrelated_composites_do_nothing() {
    setup();
    let src = sample();
    let mut dst = Savings {
        rate: 1.5,
        ..Savings::default()
    };
    let common = unsafe {
        MetaStruct::copy_between(
            Document::meta_struct(),
            Instance::of(&src),
            Savings::meta_struct(),
            InstanceMut::of(&mut dst),
            false,
        )
    };
    assert!(common.is_none());
    assert_eq!(dst.rate, 1.5);
    assert_eq!(dst.account.id, 0);
    assert!(dst.account.holder.is_empty());
}

#[test]
fn composites_without_fields_are_vacuously_equal() {
    setup();
    let root = MetaStruct::builder("EmptyRoot").build();
    let a = 1u32;
    let b = 2u32;
    assert_eq!(root.field_count(), 0);
    assert!(unsafe { root.equals(Instance::of(&a), Instance::of(&b)) });
}

#[derive(Default)]
#[repr(C)]
struct Folder {
    name: String,
    documents: Vec<Document>,
    pinned: [Document; 2],
}

impl Populate for Folder {
    fn populate(meta: &mut MetaStruct) {
        add_field!(meta, Folder, name, "name");
        add_field!(meta, Folder, documents, "documents");
        add_field!(meta, Folder, pinned, "pinned");
    }
}

reflect_struct!(Folder);

#[test]
fn nested_composites_recurse() {
    setup();
    let src = Folder {
        name: "inbox".into(),
        documents: vec![sample(), Document::default()],
        pinned: [sample(), Document::default()],
    };
    let mut dst = Folder::default();
    src.copy_to(&mut dst, CopyFlags::empty());

    assert!(src.equals(&dst));
    assert_eq!(dst.documents.len(), 2);
    assert!(Arc::ptr_eq(&src.documents[0].cache, &dst.documents[0].cache));
    assert_eq!(dst.pinned[0].revision, 7);

    dst.pinned[1].title.push('!');
    assert!(!src.equals(&dst));

    let pinned = Folder::meta_struct().find_field_named("pinned").unwrap();
    assert_eq!(pinned.count(), 2);
    assert_eq!(pinned.size(), core::mem::size_of::<Document>());
}

#[derive(Default)]
#[repr(C)]
struct Sample {
    reading: f64,
    gain: [f32; 2],
}

impl Populate for Sample {
    fn populate(meta: &mut MetaStruct) {
        add_field!(meta, Sample, reading, "reading");
        add_field!(meta, Sample, gain, "gain");
    }
}

reflect_struct!(Sample);

#[test]
fn instances_with_nan_equal_themselves() {
    setup();
    let meta = Sample::meta_struct();
    let sample = Sample {
        reading: f64::NAN,
        gain: [1.0, f32::NAN],
    };
    assert!(unsafe { meta.equals(Instance::of(&sample), Instance::of(&sample)) });
    assert!(sample.equals(&sample));

    let mut copy = Sample::default();
    sample.copy_to(&mut copy, CopyFlags::empty());
    assert!(copy.reading.is_nan());
    assert!(sample.equals(&copy));

    copy.gain[1] = 0.0;
    assert!(!sample.equals(&copy));
}

#[derive(Default)]
#[repr(C)]
struct Reserved {
    id: u32,
    spare: [u16; 0],
}

impl Populate for Reserved {
    fn populate(meta: &mut MetaStruct) {
        add_field!(meta, Reserved, id, "id");
        add_field!(meta, Reserved, spare, "spare");
    }
}

reflect_struct!(Reserved);

#[test]
fn zero_length_arrays_have_no_elements() {
    setup();
    let spare = Reserved::meta_struct().find_field_named("spare").unwrap();
    assert_eq!(spare.count(), 0);
    assert_eq!(spare.index(), 1);
    assert!(spare.is_static_array());

    let src = Reserved { id: 4, spare: [] };
    let mut dst = Reserved::default();
    assert!(!src.equals(&dst));
    src.copy_to(&mut dst, CopyFlags::empty());
    assert_eq!(dst.id, 4);
    assert!(src.equals(&dst));
}
