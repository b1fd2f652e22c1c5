use swift_demangle_tree::swift::{Context, Node, UNKNOWN_KIND_NAME, kind_name};
use test_utilities::bounded_debug;

const TEST_DATA: &str = include_str!("test-node-tree-data.txt");
const DEBUG_CAPACITY: usize = 65536;

#[track_caller]
fn check_tree(root: Node) {
    for node in root.breadth_first() {
        assert_ne!(kind_name(node.kind().raw()), UNKNOWN_KIND_NAME);
        assert_eq!(node.children().count(), node.child_count());
        assert_eq!(node.has_children(), node.child_count() != 0);
        assert!(!(node.has_text() && node.has_index()));
    }
}

#[test]
fn test_node_tree() {
    let mut context = Context::new();

    for line in TEST_DATA.lines() {
        if !line.is_empty() && !line.starts_with('#') {
            let (expected, symbol) = line.split_once(' ').unwrap();
            let node_count = context.node_count();
            let root = context.demangle_symbol_as_tree(symbol);

            match expected {
                "+" => {
                    let root = context.node(root.unwrap_or_else(|| panic!("Failed: {symbol}")));

                    check_tree(root);

                    let dump = bounded_debug(&root, DEBUG_CAPACITY).unwrap();
                    let again = context.demangle_symbol_as_tree(symbol).unwrap();

                    assert_eq!(bounded_debug(&context.node(again), DEBUG_CAPACITY), Some(dump), "Failed: {symbol}");
                }
                "-" => {
                    assert!(root.is_none(), "Failed: {symbol}");
                    assert_eq!(context.node_count(), node_count, "Failed: {symbol}");
                }
                _ => panic!("Invalid test data: {line}"),
            }
        }
    }

    assert!(!context.is_empty());

    context.clear();

    assert!(context.is_empty());
}
