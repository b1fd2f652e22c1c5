use super::{Context, Engine, InvalidHandle, NodeArena, NodeId, NodeKind, Options, UNKNOWN_KIND_NAME};

const USR: &str = "s:10DriverCore28AddPhoneVerifyViewControllerC28resendCodeViaVoiceCallButton33_3079D27A166598D3B3B79EAC945873F9LLSo8UIButtonCSgvp";

#[test]
fn test_reference_name() {
    let mut context = Context::new();
    let root = context.demangle_symbol_as_tree(USR).unwrap();
    let root = context.node(root);
    let class = root.child(0).child(0);

    assert_eq!(root.kind(), NodeKind::Global);
    assert_eq!(root.child(0).kind(), NodeKind::Variable);
    assert_eq!(class.kind(), NodeKind::Class);
    assert_eq!(class.child(0).text(), "DriverCore");
    assert_eq!(class.child(1).text(), "AddPhoneVerifyViewController");

    let texts = root.breadth_first().filter_map(|node| node.try_text()).collect::<Vec<_>>();

    assert_eq!(
        texts,
        [
            "DriverCore",
            "AddPhoneVerifyViewController",
            "_3079D27A166598D3B3B79EAC945873F9",
            "resendCodeViaVoiceCallButton",
            "Swift",
            "Optional",
            "__C",
            "UIButton",
        ]
    );
}

#[test]
fn test_reference_name_matches_mangled_name() {
    let mut context = Context::new();
    let from_reference = context.demangle_symbol_as_tree("s:module.tag:4main3FooC").unwrap();
    let from_mangled = context.demangle_symbol_as_tree("$S4main3FooC").unwrap();

    assert_ne!(from_reference, from_mangled);

    assert_eq!(
        format!("{:?}", context.node(from_reference)),
        format!("{:?}", context.node(from_mangled)),
    );
}

#[test]
fn test_reference_name_with_non_ascii_qualifier() {
    let mut context = Context::new();
    let root = context.demangle_symbol_as_tree("s:é:x").unwrap();

    assert_eq!(
        format!("{:?}", context.node(root)),
        "Global(DependentGenericParamType(Index(0), Index(0)))",
    );
}

#[test]
fn test_normalization_disabled() {
    let mut context = Context::with_options(Options::new().normalize_usr(false));

    assert!(context.demangle_symbol_as_tree(USR).is_none());
    assert!(context.demangle_symbol_as_tree("$S4main3FooC").is_some());
}

#[test]
fn test_rejected_symbols() {
    let mut context = Context::new();

    assert!(context.demangle_symbol_as_tree("c:objc(cs)CIVector").is_none());
    assert!(context.is_empty());

    let root = context.demangle_symbol_as_tree("$S4main3FooC").unwrap();
    let count = context.node_count();

    assert!(context.demangle_symbol_as_tree("$S4main3FooC3BarVyyX").is_none());
    assert_eq!(context.node_count(), count);
    assert_eq!(context.node(root).child(0).kind(), NodeKind::Class);
}

#[test]
fn test_clear() {
    let mut context = Context::new();

    context.clear();

    assert!(context.is_empty());

    let root = context.demangle_symbol_as_tree("$S4main3FooC").unwrap();

    assert!(context.try_node(root).is_ok());

    context.clear();

    assert!(context.is_empty());
    assert_eq!(context.try_node(root).err(), Some(InvalidHandle::Stale));

    let new_root = context.demangle_symbol_as_tree("$S4main3FooC").unwrap();

    assert_eq!(context.try_node(root).err(), Some(InvalidHandle::Stale));
    assert_eq!(context.node(new_root).child(0).child(1).text(), "Foo");
}

#[test]
fn test_foreign_handle() {
    let mut context_1 = Context::new();
    let mut context_2 = Context::new();
    let root_1 = context_1.demangle_symbol_as_tree("$S4main3FooC").unwrap();
    let root_2 = context_2.demangle_symbol_as_tree("$S4main3FooC").unwrap();

    assert_eq!(context_1.try_node(root_2).err(), Some(InvalidHandle::ForeignContext));
    assert_eq!(context_2.try_node(root_1).err(), Some(InvalidHandle::ForeignContext));
}

#[test]
#[should_panic(expected = "node handle was invalidated by clearing its context")]
fn test_stale_handle_panics() {
    let mut context = Context::new();
    let root = context.demangle_symbol_as_tree("$S4main3FooC").unwrap();

    context.clear();

    let _ = context.node(root);
}

#[test]
fn test_node_accessors() {
    let mut context = Context::new();
    let root = context.demangle_symbol_as_tree("$Sq_D").unwrap();
    let root = context.node(root);
    let parameter = root.child(0).child(0).child(0);

    assert!(!root.has_text());
    assert!(!root.has_index());
    assert!(root.has_children());
    assert_eq!(root.try_text(), None);
    assert_eq!(parameter.kind(), NodeKind::DependentGenericParamType);
    assert_eq!(parameter.child(1).index(), 1);
    assert!(!parameter.child(1).has_children());
    assert_eq!(parameter.child(1).child_count(), 0);
    assert_eq!(parameter.child(1).get_child(0).map(|node| node.kind()), None);
    assert_eq!(parameter.child(1).try_text(), None);
}

#[test]
fn test_shared_subtrees() {
    let mut context = Context::new();
    let root = context.demangle_symbol_as_tree("$S4main3FooVA2cCD").unwrap();
    let root = context.node(root);

    assert_eq!(root.breadth_first().count(), 15);

    let kinds = root.distinct_breadth_first().map(|node| node.kind()).collect::<Vec<_>>();

    assert_eq!(
        kinds,
        [
            NodeKind::Global,
            NodeKind::Structure,
            NodeKind::TypeMangling,
            NodeKind::Module,
            NodeKind::Identifier,
            NodeKind::Type,
        ]
    );
}

#[test]
fn test_distinct_breadth_first_skips_repeated_children() {
    let mut context = Context::new();
    let symbol = format!("$S4main3FooV{}", "AC".repeat(60));
    let root = context.demangle_symbol_as_tree(&symbol).unwrap();

    assert_eq!(context.node(root).distinct_breadth_first().count(), 4);
}

#[test]
fn test_child_count_matches_children() {
    let mut context = Context::new();
    let root = context.demangle_symbol_as_tree("$SSi_SbSStD").unwrap();
    let tuple = context.node(root).child(0).child(0).child(0);

    assert_eq!(tuple.kind(), NodeKind::Tuple);
    assert_eq!(tuple.child_count(), 3);
    assert_eq!(tuple.children().len(), 3);
    assert_eq!((0..).map_while(|i| tuple.get_child(i)).count(), tuple.child_count());
    assert_eq!(tuple.children().next_back().map(|node| node.handle()), Some(tuple.child(2).handle()));
}

#[test]
#[should_panic(expected = "child index 3 is out of range for `Tuple` node with 3 children")]
fn test_child_out_of_range() {
    let mut context = Context::new();
    let root = context.demangle_symbol_as_tree("$SSi_SbSStD").unwrap();
    let tuple = context.node(root).child(0).child(0).child(0);

    let _ = tuple.child(3);
}

#[test]
#[should_panic(expected = "`Global` node has no text")]
fn test_missing_text() {
    let mut context = Context::new();
    let root = context.demangle_symbol_as_tree("$S4main3FooC").unwrap();

    let _ = context.node(root).text();
}

#[test]
fn test_kind_names_are_known() {
    let mut context = Context::new();
    let root = context.demangle_symbol_as_tree(USR).unwrap();

    for node in context.node(root).breadth_first() {
        assert_ne!(super::kind_name(node.kind().raw()), UNKNOWN_KIND_NAME);
    }
}

struct WholeSymbol;

impl Engine for WholeSymbol {
    fn demangle(&mut self, symbol: &str, arena: &mut NodeArena) -> Option<NodeId> {
        let identifier = arena.create_with_text(NodeKind::Identifier, symbol);

        (!symbol.contains('!')).then(|| arena.create_with_children(NodeKind::Global, [identifier]))
    }
}

#[test]
fn test_custom_engine() {
    let mut context = Context::with_engine(WholeSymbol, Options::new());
    let root = context.demangle_symbol_as_tree("s:tag:abc").unwrap();

    assert_eq!(format!("{:?}", context.node(root)), r#"Global(Identifier("$Sabc"))"#);
    assert_eq!(context.node_count(), 2);

    assert!(context.demangle_symbol_as_tree("no!").is_none());
    assert_eq!(context.node_count(), 2);
}
