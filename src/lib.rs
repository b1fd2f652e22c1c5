//! # swift-demangle-tree
//!
//! Demangles Swift symbols into node trees owned by a reusable context.
//!
//! Example:
//!
//! ```rust
//! use swift_demangle_tree::swift::{Context, NodeKind};
//!
//! let mut context = Context::new();
//!
//! // Index-store reference names are accepted as well as mangled names.
//! let root = context.demangle_symbol_as_tree("s:4main3FooV3baryyF").unwrap();
//! let function = context.node(root).child(0);
//!
//! assert_eq!(function.kind(), NodeKind::Function);
//! assert_eq!(function.child(0).kind(), NodeKind::Structure);
//! assert_eq!(function.child(1).text(), "bar");
//!
//! // Nodes can be visited in breadth-first order.
//! let texts = function.breadth_first().filter_map(|node| node.try_text()).collect::<Vec<_>>();
//!
//! assert_eq!(texts, ["bar", "main", "Foo"]);
//!
//! // Malformed symbols produce no tree.
//! assert!(context.demangle_symbol_as_tree("$S4main3FooC3ba").is_none());
//!
//! // Clearing the context releases every tree, after which old handles no longer resolve.
//! context.clear();
//!
//! assert!(context.try_node(root).is_err());
//! ```

#[cfg(feature = "ffi")]
#[expect(unsafe_code, reason = "C ABI")]
pub mod ffi;
pub mod swift;
