//! C ABI over [`Context`].
//!
//! Contexts are heap allocated and passed around as opaque pointers. Nodes are passed by value as [`NodeHandle`]s.
//! Passing a handle that does not belong to the given context, or that was invalidated by clearing it, aborts the
//! process.

use crate::swift::{Context, NodeHandle, NodeKind};
use std::ffi::{CStr, c_char};
use std::mem::MaybeUninit;


const UNKNOWN_KIND_NAME_WITH_NUL: &CStr = c"__UNKNOWN__";

/// Opaque demangling context.
#[derive(Debug, Default)]
pub struct DemangleContext {
    context: Context,
}

/// Creates an empty context. Release it with [`demangle_destroy_context`].
#[unsafe(no_mangle)]
#[must_use]
pub extern "C" fn demangle_create_context() -> Box<DemangleContext> {
    Box::default()
}

/// Releases a context together with every node it owns. Null is ignored.
#[unsafe(no_mangle)]
pub extern "C" fn demangle_destroy_context(context: Option<Box<DemangleContext>>) {
    drop(context);
}

/// Releases every node owned by `context`.
#[unsafe(no_mangle)]
pub extern "C" fn demangle_clear_context(context: &mut DemangleContext) {
    context.context.clear();
}

/// Demangles a NUL-terminated symbol. On success, writes the root node to `node` and returns `true`.
///
/// # Safety
///
/// `symbol` must point to a NUL-terminated string that is valid for reads.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn demangle_symbol_as_node(
    context: &mut DemangleContext,
    symbol: *const c_char,
    node: &mut MaybeUninit<NodeHandle>,
) -> bool {
    // SAFETY: Guaranteed by the caller.
    let symbol = unsafe { CStr::from_ptr(symbol) };

    let Ok(symbol) = symbol.to_str() else {
        tracing::debug!("symbol is not valid UTF-8");

        return false;
    };

    context
        .context
        .demangle_symbol_as_tree(symbol)
        .map(|root| node.write(root))
        .is_some()
}

/// Whether `node` carries text.
#[unsafe(no_mangle)]
pub extern "C" fn node_has_text(context: &DemangleContext, node: NodeHandle) -> bool {
    context.context.node(node).has_text()
}

/// Text of `node`, which is not NUL-terminated. Its length in bytes is written to `length` unless it is null.
///
/// The text stays valid until the context is cleared or destroyed.
#[unsafe(no_mangle)]
pub extern "C" fn node_get_text(
    context: &DemangleContext,
    node: NodeHandle,
    length: Option<&mut MaybeUninit<usize>>,
) -> *const c_char {
    let text = context.context.node(node).text();

    if let Some(length) = length {
        length.write(text.len());
    }

    text.as_ptr().cast()
}

/// Whether `node` carries an index.
#[unsafe(no_mangle)]
pub extern "C" fn node_has_index(context: &DemangleContext, node: NodeHandle) -> bool {
    context.context.node(node).has_index()
}

/// Index of `node`.
#[unsafe(no_mangle)]
pub extern "C" fn node_get_index(context: &DemangleContext, node: NodeHandle) -> u64 {
    context.context.node(node).index()
}

/// Whether `node` has at least one child.
#[unsafe(no_mangle)]
pub extern "C" fn node_has_children(context: &DemangleContext, node: NodeHandle) -> bool {
    context.context.node(node).has_children()
}

/// Number of children of `node`.
#[unsafe(no_mangle)]
pub extern "C" fn node_get_num_children(context: &DemangleContext, node: NodeHandle) -> usize {
    context.context.node(node).child_count()
}

/// Child of `node` at `index`.
#[unsafe(no_mangle)]
pub extern "C" fn node_get_child(context: &DemangleContext, node: NodeHandle, index: usize) -> NodeHandle {
    context.context.node(node).child(index).handle()
}

/// Raw kind tag of `node`.
#[unsafe(no_mangle)]
pub extern "C" fn node_get_kind(context: &DemangleContext, node: NodeHandle) -> u32 {
    context.context.node(node).kind().raw()
}

/// NUL-terminated name of the kind with the raw tag `kind`, or `__UNKNOWN__`.
#[unsafe(no_mangle)]
pub extern "C" fn node_get_kind_name(kind: u32) -> *const c_char {
    NodeKind::from_raw(kind).map_or(UNKNOWN_KIND_NAME_WITH_NUL.as_ptr(), |kind| {
        kind.name_with_nul().as_ptr().cast()
    })
}
