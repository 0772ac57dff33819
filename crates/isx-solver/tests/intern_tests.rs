use super::*;
use crate::types::{DefId, TypeData};
use std::sync::Arc;

#[test]
fn test_intrinsics_have_reserved_ids() {
    let interner = TypeInterner::new();
    assert_eq!(interner.intern(TypeData::Error), TypeId::ERROR);
    assert_eq!(interner.intern(TypeData::Null), TypeId::NULL);
    assert_eq!(interner.intern(TypeData::Void), TypeId::VOID);
    assert_eq!(interner.intern(TypeData::Dynamic), TypeId::DYNAMIC);
    assert_eq!(interner.len(), TypeId::FIRST_USER as usize);
}

#[test]
fn test_structural_deduplication() {
    let interner = TypeInterner::new();
    let a = interner.simple(DefId(7));
    let list_a = interner.named(DefId(9), [a].into_iter().collect());
    let again = interner.named(DefId(9), [a].into_iter().collect());
    assert_eq!(list_a, again);
    assert_ne!(interner.array(a, 1), interner.array(a, 2));
    assert_eq!(
        interner.lookup(list_a),
        Some(TypeData::named(DefId(9), [a]))
    );
}

#[test]
fn test_child_layer_reads_through_parent() {
    let parent = TypeInterner::new();
    let shared = parent.simple(DefId(1));
    let parent = Arc::new(parent);

    let child = TypeInterner::child(parent.clone());
    assert_eq!(child.simple(DefId(1)), shared);
    assert_eq!(child.lookup(shared), parent.lookup(shared));

    let local = child.array(shared, 1);
    assert!(local.0 >= parent.len() as u32);
    assert_eq!(parent.find(&TypeData::Array { element: shared, rank: 1 }), None);
    assert_eq!(child.lookup(local), Some(TypeData::Array { element: shared, rank: 1 }));
}

#[test]
fn test_sibling_layers_are_independent() {
    let parent = Arc::new(TypeInterner::new());
    let left = TypeInterner::child(parent.clone());
    let right = TypeInterner::child(parent);
    let a = left.simple(DefId(3));
    let b = right.simple(DefId(4));
    // Both layers start allocating at the same id.
    assert_eq!(a, b);
    assert_ne!(left.lookup(a), right.lookup(b));
}
