use capture_protocol::{CommandTreeNode, FindFrom, FindRequest, NodeAddress, TreeId};
use capture_search::{find, CancellationToken};
use capture_tree::{
    Capture, Command, Database, GroupRange, TreeError, TreeResolver, TreeSpec, Visit,
};
use proptest::prelude::*;

fn build_tree(names: &[String], groups: Vec<GroupRange>) -> (Database, TreeId) {
    let db = Database::new();
    let capture = Capture::new("frame", names.iter().map(Command::new).collect());
    let capture_id = db.add_capture(capture).unwrap();
    let tree = db.add_tree(TreeSpec::new(capture_id, groups)).unwrap();
    (db, tree)
}

/// Keeps the candidates that nest in or are disjoint from every range kept so far.
fn laminar_groups(n: u64, candidates: &[(u64, u64)]) -> Vec<GroupRange> {
    let mut kept: Vec<(u64, u64)> = Vec::new();
    for &(a, b) in candidates {
        let (a, b) = (a % n, b % n);
        let (start, end) = (a.min(b), a.max(b) + 1);
        let compatible = kept.iter().all(|&(s, e)| {
            end <= s || e <= start || (s <= start && end <= e) || (start <= s && e <= end)
        });
        if compatible {
            kept.push((start, end));
        }
    }
    kept.into_iter()
        .map(|(start, end)| GroupRange::new("pass", start, end))
        .collect()
}

/// Every address of the tree in document order.
fn document_order(db: &Database, tree: &TreeId) -> Vec<Vec<u64>> {
    let tree = db.resolve_tree(tree).unwrap();
    let mut all = Vec::new();
    tree.traverse::<TreeError, _>(
        false,
        &NodeAddress::root(),
        &CancellationToken::new(),
        |addr, _| {
            all.push(addr.indices().to_vec());
            Ok(Visit::Continue)
        },
    )
    .unwrap();
    all
}

fn run(db: &Database, req: &FindRequest) -> Vec<Vec<u64>> {
    let mut found = Vec::new();
    find(req, db, &CancellationToken::new(), |res| {
        found.push(res.command_tree_node.indices.into_indices());
        Ok(())
    })
    .unwrap();
    found
}

fn request(tree: TreeId, cursor: Vec<u64>, text: &str) -> FindRequest {
    FindRequest {
        text: text.to_string(),
        from: Some(FindFrom::CommandTreeNode(CommandTreeNode {
            tree,
            indices: NodeAddress::new(cursor),
        })),
        ..FindRequest::default()
    }
}

fn grouped_tree() -> impl Strategy<Value = (Vec<String>, Vec<GroupRange>)> {
    prop::collection::vec("[ab]{1,3}", 1..12).prop_flat_map(|names| {
        let n = names.len() as u64;
        prop::collection::vec((any::<u64>(), any::<u64>()), 0..6)
            .prop_map(move |candidates| (names.clone(), laminar_groups(n, &candidates)))
    })
}

proptest! {
    #[test]
    fn case_insensitive_literal_matches_lowercased_containment(
        names in prop::collection::vec("[a-cA-C]{0,5}", 0..12),
        pattern in "[a-cA-C]{0,2}",
    ) {
        let (db, tree) = build_tree(&names, Vec::new());
        let found = run(&db, &request(tree, Vec::new(), &pattern));

        let expected: Vec<Vec<u64>> = names
            .iter()
            .enumerate()
            .filter(|(_, name)| {
                format!("{name}()")
                    .to_lowercase()
                    .contains(&pattern.to_lowercase())
            })
            .map(|(i, _)| vec![i as u64])
            .collect();
        prop_assert_eq!(found, expected);
    }

    #[test]
    fn max_items_bounds_handler_calls(
        (names, groups) in grouped_tree(),
        max_items in 1u32..5,
        backwards in any::<bool>(),
        wrap in any::<bool>(),
        cursor_seed in any::<usize>(),
    ) {
        let (db, tree) = build_tree(&names, groups);
        let all = document_order(&db, &tree);
        let cursor = all[cursor_seed % all.len()].clone();
        let mut req = request(tree, cursor, "a");
        req.max_items = max_items;
        req.backwards = backwards;
        req.wrap = wrap;

        let found = run(&db, &req);
        prop_assert!(found.len() <= max_items as usize);
    }

    #[test]
    fn cursor_is_never_reported_without_wrap(
        (names, groups) in grouped_tree(),
        backwards in any::<bool>(),
        cursor_seed in any::<usize>(),
    ) {
        let (db, tree) = build_tree(&names, groups);
        let all = document_order(&db, &tree);
        let i = cursor_seed % all.len();
        let mut req = request(tree, all[i].clone(), "");
        req.backwards = backwards;

        let found = run(&db, &req);
        prop_assert!(!found.contains(&all[i]));
        // The empty pattern matches every node strictly past the cursor.
        let expected: Vec<Vec<u64>> = if backwards {
            all[..i].iter().rev().cloned().collect()
        } else {
            all[i + 1..].to_vec()
        };
        prop_assert_eq!(found, expected);
    }

    #[test]
    fn wrap_visits_every_node_once_and_ends_on_the_cursor(
        (names, groups) in grouped_tree(),
        backwards in any::<bool>(),
        cursor_seed in any::<usize>(),
        pattern in "[ab]?",
    ) {
        let (db, tree) = build_tree(&names, groups);
        let all = document_order(&db, &tree);
        let i = cursor_seed % all.len();
        let mut req = request(tree, all[i].clone(), &pattern);
        req.backwards = backwards;
        req.wrap = true;

        let found = run(&db, &req);
        for addr in &found {
            let times = found.iter().filter(|other| *other == addr).count();
            prop_assert!(times == 1, "{:?} reported {} times", addr, times);
        }

        if pattern.is_empty() {
            // One full cycle that starts just past the cursor and ends on it.
            let expected: Vec<Vec<u64>> = if backwards {
                let mut order = all.clone();
                order.reverse();
                order.rotate_left(all.len() - i);
                order
            } else {
                let mut order = all.clone();
                order.rotate_left(i + 1);
                order
            };
            prop_assert_eq!(found, expected);
        }
    }
}
