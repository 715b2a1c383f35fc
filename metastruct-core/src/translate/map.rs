use alloc::collections::BTreeMap;
use core::hash::{BuildHasher, Hash};
use std::collections::HashMap;

use indexmap::IndexMap;

use crate::{CopyFlags, DataShape, MetaKind, MetaTypeFn, MetaTypeRef, Translate, intern_meta_type};

// Keys are cloned, values go through `copy_to` so pointer-shaped values honor
// the shallow flag.

fn copy_value<V: Translate + Default>(src: &V, flags: CopyFlags) -> V {
    let mut value = V::default();
    src.copy_to(&mut value, flags);
    value
}

unsafe impl<K, V> Translate for BTreeMap<K, V>
where
    K: Translate + Ord + Clone,
    V: Translate + Default,
{
    type Element = Self;
    const SHAPE: DataShape = DataShape::Map;
    const KEY_TYPE: Option<MetaTypeFn> = Some(K::meta_type);
    const VALUE_TYPE: Option<MetaTypeFn> = Some(V::meta_type);

    fn meta_type() -> MetaTypeRef {
        intern_meta_type::<Self>(MetaKind::Container)
    }

    fn equals(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other)
                .all(|((ka, va), (kb, vb))| ka.equals(kb) && va.equals(vb))
    }

    fn copy_to(&self, dst: &mut Self, flags: CopyFlags) {
        dst.retain(|k, _| self.contains_key(k));
        for (key, src) in self {
            match dst.get_mut(key) {
                Some(existing) => src.copy_to(existing, flags),
                None => {
                    dst.insert(key.clone(), copy_value(src, flags));
                }
            }
        }
    }
}

unsafe impl<K, V, S> Translate for HashMap<K, V, S>
where
    K: Translate + Eq + Hash + Clone,
    V: Translate + Default,
    S: BuildHasher + Default + 'static,
{
    type Element = Self;
    const SHAPE: DataShape = DataShape::Map;
    const KEY_TYPE: Option<MetaTypeFn> = Some(K::meta_type);
    const VALUE_TYPE: Option<MetaTypeFn> = Some(V::meta_type);

    fn meta_type() -> MetaTypeRef {
        intern_meta_type::<Self>(MetaKind::Container)
    }

    fn equals(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|o| v.equals(o)))
    }

    fn copy_to(&self, dst: &mut Self, flags: CopyFlags) {
        dst.retain(|k, _| self.contains_key(k));
        for (key, src) in self {
            match dst.get_mut(key) {
                Some(existing) => src.copy_to(existing, flags),
                None => {
                    dst.insert(key.clone(), copy_value(src, flags));
                }
            }
        }
    }
}

// Insertion order is part of an IndexMap's value.
unsafe impl<K, V, S> Translate for IndexMap<K, V, S>
where
    K: Translate + Eq + Hash + Clone,
    V: Translate + Default,
    S: BuildHasher + Default + 'static,
{
    type Element = Self;
    const SHAPE: DataShape = DataShape::Map;
    const KEY_TYPE: Option<MetaTypeFn> = Some(K::meta_type);
    const VALUE_TYPE: Option<MetaTypeFn> = Some(V::meta_type);

    fn meta_type() -> MetaTypeRef {
        intern_meta_type::<Self>(MetaKind::Container)
    }

    fn equals(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other)
                .all(|((ka, va), (kb, vb))| ka.equals(kb) && va.equals(vb))
    }

    fn copy_to(&self, dst: &mut Self, flags: CopyFlags) {
        dst.clear();
        dst.reserve(self.len());
        for (key, src) in self {
            dst.insert(key.clone(), copy_value(src, flags));
        }
    }
}
