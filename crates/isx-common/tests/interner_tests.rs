use super::*;

#[test]
fn test_intern_same_string_returns_same_atom() {
    let a = Atom::intern("Select");
    let b = Atom::intern("Select");
    assert_eq!(a, b);
    assert_eq!(a.as_str(), "Select");
}

#[test]
fn test_empty_string_is_none() {
    let atom = Atom::intern("");
    assert!(atom.is_none());
    assert_eq!(atom.as_str(), "");
}

#[test]
fn test_distinct_strings_get_distinct_atoms() {
    let a = Atom::intern("Where");
    let b = Atom::intern("where");
    assert_ne!(a, b);
    assert_eq!(b.as_str(), "where");
}

#[test]
fn test_local_interner_resolves_unknown_atom_to_empty() {
    let interner = ShardedInterner::new();
    let atom = interner.intern("alpha");
    assert_eq!(interner.resolve(atom), "alpha");
    assert_eq!(interner.len(), 2);
    let foreign = ShardedInterner::new();
    assert_eq!(foreign.resolve(atom), "");
}

#[test]
fn test_atoms_are_shared_across_threads() {
    let handles: Vec<_> = (0..4)
        .map(|_| std::thread::spawn(|| Atom::intern("SharedAcrossThreads")))
        .collect();
    let atoms: Vec<Atom> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(atoms.windows(2).all(|w| w[0] == w[1]));
}
