#![no_main]

use swift_demangle_tree::swift::{Context, Options};
use test_utilities::bounded_debug;

const MAX_NODES: usize = 65536;

fn fuzz_with(context: &mut Context, data: &str) {
    if let Some(root) = context.demangle_symbol_as_tree(data) {
        let root = context.node(root);

        for node in root.breadth_first().take(MAX_NODES) {
            let _ = node.try_text();
            let _ = node.try_index();

            assert_eq!(node.children().count(), node.child_count());
        }

        assert!(root.distinct_breadth_first().count() <= context.node_count());

        let _ = bounded_debug(&root, 65536);
    } else {
        assert!(context.is_empty());
    }

    context.clear();
}

libfuzzer_sys::fuzz_target!(|data: &str| {
    let mut context = Context::with_options(Options::new().max_repeat_count(64));

    fuzz_with(&mut context, data);
});
