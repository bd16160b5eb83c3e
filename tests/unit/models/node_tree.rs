use super::*;

fn draft(raw: u64, has_children: bool) -> NodeDraft {
    NodeDraft {
        editor_id: "test-editor".into(),
        type_tag: "item".into(),
        data_ref: DataRef::new(raw),
        has_children,
    }
}

#[test]
fn test_new_tree() {
    let tree = NodeTree::new(draft(0, true));
    let root = tree.root();
    assert_eq!(tree.len(), 1);
    assert!(tree.is_expanded(root));
    assert_eq!(tree.load_state(root), Some(LoadState::NotLoaded));
    assert_eq!(tree.find_by_ref(DataRef::new(0)), Some(root));
    assert!(tree.parent(root).is_none());
}

#[test]
fn test_insert_child_appends_and_positions() {
    let mut tree = NodeTree::new(draft(0, true));
    let root = tree.root();

    let a = tree.insert_child(root, None, draft(1, false)).unwrap();
    let b = tree.insert_child(root, None, draft(2, false)).unwrap();
    let c = tree.insert_child(root, Some(1), draft(3, false)).unwrap();
    let d = tree.insert_child(root, Some(99), draft(4, false)).unwrap();

    assert_eq!(tree.children(root), &[a, c, b, d]);
    assert_eq!(tree.parent(c), Some(root));
    assert_eq!(tree.load_state(a), Some(LoadState::Loaded));
}

#[test]
fn test_insert_rejects_duplicate_data_ref() {
    let mut tree = NodeTree::new(draft(0, true));
    let root = tree.root();
    tree.insert_child(root, None, draft(1, false)).unwrap();

    let err = tree.insert_child(root, None, draft(1, false)).unwrap_err();
    assert_eq!(err, NodeTreeError::DuplicateDataRef(DataRef::new(1)));
    assert_eq!(tree.children(root).len(), 1);
}

#[test]
fn test_insert_under_unknown_parent() {
    let mut tree = NodeTree::new(draft(0, true));
    let root = tree.root();
    let a = tree.insert_child(root, None, draft(1, true)).unwrap();
    tree.remove_subtree(a).unwrap();

    let err = tree.insert_child(a, None, draft(2, false)).unwrap_err();
    assert_eq!(err, NodeTreeError::InvalidNodeId);
}

#[test]
fn test_remove_subtree_drops_descendants() {
    let mut tree = NodeTree::new(draft(0, true));
    let root = tree.root();
    let a = tree.insert_child(root, None, draft(1, true)).unwrap();
    let a1 = tree.insert_child(a, None, draft(2, false)).unwrap();
    let a2 = tree.insert_child(a, None, draft(3, true)).unwrap();
    let a2x = tree.insert_child(a2, None, draft(4, false)).unwrap();
    let b = tree.insert_child(root, None, draft(5, false)).unwrap();

    let removed = tree.remove_subtree(a).unwrap();
    assert_eq!(removed, vec![a, a1, a2, a2x]);

    let remaining = tree.traverse();
    assert_eq!(remaining, vec![root, b]);
    for id in [a, a1, a2, a2x] {
        assert!(!tree.contains(id));
    }
    assert!(tree.find_by_ref(DataRef::new(4)).is_none());
    assert_eq!(tree.children(root), &[b]);
}

#[test]
fn test_removed_ids_are_not_reused() {
    let mut tree = NodeTree::new(draft(0, true));
    let root = tree.root();
    let a = tree.insert_child(root, None, draft(1, false)).unwrap();
    tree.remove_subtree(a).unwrap();

    let b = tree.insert_child(root, None, draft(1, false)).unwrap();
    assert_ne!(a, b);
    assert!(!tree.contains(a));
}

#[test]
fn test_root_cannot_be_removed() {
    let mut tree = NodeTree::new(draft(0, true));
    let root = tree.root();
    assert_eq!(tree.remove_subtree(root), Err(NodeTreeError::RootRemoval));
}

#[test]
fn test_fill_children_marks_loaded_and_skips_duplicates() {
    let mut tree = NodeTree::new(draft(0, true));
    let root = tree.root();
    tree.insert_child(root, None, draft(1, false)).unwrap();

    let skipped = tree
        .fill_children(root, vec![draft(1, false), draft(2, false)])
        .unwrap();

    assert_eq!(skipped, vec![DataRef::new(1)]);
    assert_eq!(tree.children(root).len(), 2);
    assert_eq!(tree.load_state(root), Some(LoadState::Loaded));
}

#[test]
fn test_ancestors_and_depth() {
    let mut tree = NodeTree::new(draft(0, true));
    let root = tree.root();
    let a = tree.insert_child(root, None, draft(1, true)).unwrap();
    let b = tree.insert_child(a, None, draft(2, false)).unwrap();

    assert_eq!(tree.ancestors(b).collect::<Vec<_>>(), vec![a, root]);
    assert_eq!(tree.depth(b), 2);
    assert!(tree.is_ancestor(root, b));
    assert!(!tree.is_ancestor(b, a));
}

#[test]
fn test_flatten_for_view_respects_expansion() {
    let mut tree = NodeTree::new(draft(0, true));
    let root = tree.root();
    tree.insert_child(root, None, draft(1, false)).unwrap();
    let dir = tree.insert_child(root, None, draft(2, true)).unwrap();
    tree.insert_child(dir, None, draft(3, false)).unwrap();

    let rows = tree.flatten_for_view();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].id, root);
    assert_eq!(rows[2].depth, 1);

    tree.expand(dir);
    let rows = tree.flatten_for_view();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[3].depth, 2);
    assert_eq!(rows[3].data_ref, DataRef::new(3));

    tree.collapse(dir);
    assert_eq!(tree.flatten_for_view().len(), 3);
}

#[test]
fn test_reset_invalidates_previous_ids() {
    let mut tree = NodeTree::new(draft(0, true));
    let old_root = tree.root();
    let child = tree.insert_child(old_root, None, draft(1, false)).unwrap();

    tree.reset(draft(0, true));
    let new_root = tree.root();
    let new_child = tree.insert_child(new_root, None, draft(1, false)).unwrap();

    assert_ne!(old_root, new_root);
    assert_ne!(child, new_child);
    assert!(!tree.contains(old_root));
    assert!(!tree.contains(child));
    assert_eq!(tree.len(), 2);
    assert_eq!(tree.find_by_ref(DataRef::new(1)), Some(new_child));
    assert!(tree.is_expanded(new_root));
}
