use crate::swift::arena::{NodeArena, NodeId};
use crate::swift::kind::NodeKind;
use crate::swift::{Engine, Options};
use mini_parser::combinators::terminated;
use mini_parser::input::Input;
use mini_parser::parsers::{any_byte, digit1, tag, take};
use mini_parser::{Cursor, CursorExt, Parser, ParserExt};
use num_traits::{CheckedAdd, CheckedMul};


// References:
//
// - https://github.com/apple/swift/blob/swift-5.0-branch/docs/ABI/Mangling.rst.
// - https://github.com/apple/swift/blob/swift-5.0-branch/lib/Demangling/Demangler.cpp.

const MANGLING_PREFIXES: [&str; 4] = ["_$S", "_$s", "$S", "$s"];
const MAX_WORDS: usize = 26;
const MAX_BUILTIN_WIDTH: u64 = 4096;
const STDLIB_MODULE: &str = "Swift";
const OBJC_MODULE: &str = "__C";
const CLANG_IMPORTER_MODULE: &str = "__C_Synthesized";
const OPERATOR_CHARS: &[u8; 26] = b"& @/= >    <*!|+?%-~   ^ .";

/// The default [`Engine`]: a postfix demangler for Swift 4.2 and 5 symbols.
///
/// Symbols that use productions outside the supported subset are rejected.
#[derive(Clone, Debug)]
pub struct Demangler {
    max_repeat_count: usize,
    max_stack_depth: usize,
    max_tree_depth: usize,
}

impl Demangler {
    /// Creates an engine with the limits of `options`.
    #[must_use]
    pub const fn new(options: &Options) -> Self {
        Self {
            max_repeat_count: options.repeat_count_limit(),
            max_stack_depth: options.stack_depth_limit(),
            max_tree_depth: options.tree_depth_limit(),
        }
    }
}

impl Default for Demangler {
    fn default() -> Self {
        Self::new(&Options::new())
    }
}

impl Engine for Demangler {
    fn demangle(&mut self, symbol: &str, arena: &mut NodeArena) -> Option<NodeId> {
        let body = MANGLING_PREFIXES
            .iter()
            .find_map(|prefix| symbol.strip_prefix(prefix))?;

        State::new(body, arena, self).demangle_symbol()
    }
}

struct State<'a, 'b> {
    data: &'a str,
    position: usize,
    arena: &'b mut NodeArena,
    stack: Vec<NodeId>,
    substitutions: Vec<NodeId>,
    words: Vec<&'a str>,
    max_repeat_count: usize,
    max_stack_depth: usize,
    max_tree_depth: usize,
}

impl Cursor for State<'_, '_> {
    type Cursor = usize;

    fn get_cursor(&mut self) -> Self::Cursor {
        self.position
    }

    fn set_cursor(&mut self, cursor: Self::Cursor) {
        self.position = cursor;
    }
}

impl<'a> Input for State<'a, '_> {
    type Slice = &'a str;

    fn peek(&self) -> Option<u8> {
        self.data.as_bytes().get(self.position).copied()
    }

    fn prefix_length<F>(&self, mut f: F) -> usize
    where
        F: FnMut(u8) -> bool,
    {
        self.data.as_bytes()[self.position..]
            .iter()
            .take_while(|&&c| f(c))
            .count()
    }

    fn take(&mut self, length: usize) -> Option<Self::Slice> {
        let end = self.position.checked_add(length)?;
        let slice = self.data.get(self.position..end)?;

        self.position = end;

        Some(slice)
    }
}

// Lexical productions.

fn parse_natural<T>(state: &mut State) -> Result<T, ()>
where
    T: CheckedAdd + CheckedMul + From<u8>,
{
    state.transaction(|state| {
        digit1
            .map_opt(|_, digits: &str| {
                digits.bytes().try_fold(T::from(0), |number, digit| {
                    number
                        .checked_mul(&T::from(10))?
                        .checked_add(&T::from(digit - b'0'))
                })
            })
            .parse(state)
    })
}

fn parse_index(state: &mut State) -> Result<u64, ()> {
    tag(b'_')
        .map(|()| 0)
        .or(terminated(parse_natural::<u64>, tag(b'_')).map_opt(|_, number: u64| number.checked_add(1)))
        .parse(state)
}

const fn is_word_start(c: u8) -> bool {
    !c.is_ascii_digit() && c != b'_' && c != 0
}

const fn is_word_end(c: u8, previous: u8) -> bool {
    c == b'_' || c == 0 || (!previous.is_ascii_uppercase() && c.is_ascii_uppercase())
}

/// Decodes a Swift punycode chunk, which uses `_` as the delimiter and `A` to `J` for the digits `0` to `9`.
fn decode_punycode(encoded: &str) -> Option<String> {
    let (basic, extended) = encoded.rsplit_once('_').unwrap_or(("", encoded));
    let mut input = String::with_capacity(encoded.len());

    if !basic.is_empty() {
        input.push_str(basic);
        input.push('-');
    }

    for c in extended.bytes() {
        input.push(match c {
            b'a'..=b'z' => char::from(c),
            b'A'..=b'J' => char::from(c - b'A' + b'0'),
            _ => return None,
        });
    }

    punycode::decode(&input).ok()
}

fn standard_type(c: u8) -> Option<(NodeKind, &'static str)> {
    Some(match c {
        b'A' => (NodeKind::Structure, "AutoreleasingUnsafeMutablePointer"),
        b'a' => (NodeKind::Structure, "Array"),
        b'b' => (NodeKind::Structure, "Bool"),
        b'D' => (NodeKind::Structure, "Dictionary"),
        b'd' => (NodeKind::Structure, "Double"),
        b'f' => (NodeKind::Structure, "Float"),
        b'h' => (NodeKind::Structure, "Set"),
        b'I' => (NodeKind::Structure, "DefaultIndices"),
        b'i' => (NodeKind::Structure, "Int"),
        b'J' => (NodeKind::Structure, "Character"),
        b'N' => (NodeKind::Structure, "ClosedRange"),
        b'n' => (NodeKind::Structure, "Range"),
        b'O' => (NodeKind::Structure, "ObjectIdentifier"),
        b'P' => (NodeKind::Structure, "UnsafePointer"),
        b'p' => (NodeKind::Structure, "UnsafeMutablePointer"),
        b'R' => (NodeKind::Structure, "UnsafeBufferPointer"),
        b'r' => (NodeKind::Structure, "UnsafeMutableBufferPointer"),
        b'S' => (NodeKind::Structure, "String"),
        b's' => (NodeKind::Structure, "Substring"),
        b'u' => (NodeKind::Structure, "UInt"),
        b'V' => (NodeKind::Structure, "UnsafeRawPointer"),
        b'v' => (NodeKind::Structure, "UnsafeMutableRawPointer"),
        b'W' => (NodeKind::Structure, "UnsafeRawBufferPointer"),
        b'w' => (NodeKind::Structure, "UnsafeMutableRawBufferPointer"),
        b'q' => (NodeKind::Enum, "Optional"),
        b'B' => (NodeKind::Protocol, "BinaryFloatingPoint"),
        b'E' => (NodeKind::Protocol, "Encodable"),
        b'e' => (NodeKind::Protocol, "Decodable"),
        b'F' => (NodeKind::Protocol, "FloatingPoint"),
        b'G' => (NodeKind::Protocol, "RandomNumberGenerator"),
        b'H' => (NodeKind::Protocol, "Hashable"),
        b'j' => (NodeKind::Protocol, "Numeric"),
        b'K' => (NodeKind::Protocol, "BidirectionalCollection"),
        b'k' => (NodeKind::Protocol, "RandomAccessCollection"),
        b'L' => (NodeKind::Protocol, "Comparable"),
        b'l' => (NodeKind::Protocol, "Collection"),
        b'M' => (NodeKind::Protocol, "MutableCollection"),
        b'm' => (NodeKind::Protocol, "RangeReplaceableCollection"),
        b'Q' => (NodeKind::Protocol, "Equatable"),
        b'T' => (NodeKind::Protocol, "Sequence"),
        b't' => (NodeKind::Protocol, "IteratorProtocol"),
        b'U' => (NodeKind::Protocol, "UnsignedInteger"),
        b'X' => (NodeKind::Protocol, "RangeExpression"),
        b'x' => (NodeKind::Protocol, "Strideable"),
        b'Y' => (NodeKind::Protocol, "RawRepresentable"),
        b'y' => (NodeKind::Protocol, "StringProtocol"),
        b'Z' => (NodeKind::Protocol, "SignedInteger"),
        b'z' => (NodeKind::Protocol, "BinaryInteger"),
        _ => return None,
    })
}

/// What a generic requirement constrains.
#[derive(Clone, Copy)]
enum Subject {
    GenericParam,
    AssociatedType,
    Substitution,
}

/// How a generic requirement constrains its subject.
#[derive(Clone, Copy)]
enum Constraint {
    Protocol,
    BaseClass,
    SameType,
    Layout,
}

fn requirement_kind(c: u8) -> Option<(Constraint, Subject)> {
    Some(match c {
        b'b' => (Constraint::BaseClass, Subject::GenericParam),
        b'B' => (Constraint::BaseClass, Subject::Substitution),
        b'c' | b'C' => (Constraint::BaseClass, Subject::AssociatedType),
        b's' => (Constraint::SameType, Subject::GenericParam),
        b'S' => (Constraint::SameType, Subject::Substitution),
        b't' | b'T' => (Constraint::SameType, Subject::AssociatedType),
        b'l' => (Constraint::Layout, Subject::GenericParam),
        b'L' => (Constraint::Layout, Subject::Substitution),
        b'm' | b'M' => (Constraint::Layout, Subject::AssociatedType),
        b'Q' => (Constraint::Protocol, Subject::Substitution),
        b'p' | b'P' => (Constraint::Protocol, Subject::AssociatedType),
        _ => return None,
    })
}

impl<'a, 'b> State<'a, 'b> {
    fn new(data: &'a str, arena: &'b mut NodeArena, demangler: &Demangler) -> Self {
        Self {
            data,
            position: 0,
            arena,
            stack: Vec::new(),
            substitutions: Vec::new(),
            words: Vec::new(),
            max_repeat_count: demangler.max_repeat_count,
            max_stack_depth: demangler.max_stack_depth,
            max_tree_depth: demangler.max_tree_depth,
        }
    }

    // Input helpers.

    fn next_if(&mut self, c: u8) -> bool {
        tag(c).parse(self).is_ok()
    }

    fn next_byte(&mut self) -> Option<u8> {
        any_byte.parse(self).ok()
    }

    fn rest(&mut self) -> Option<&'a str> {
        let length = self.data.len() - self.position;

        take(length).parse(self).ok()
    }

    // Node stack.

    fn push(&mut self, node: NodeId) -> Option<()> {
        if self.stack.len() < self.max_stack_depth && self.arena.height(node) <= self.max_tree_depth {
            self.stack.push(node);

            Some(())
        } else {
            None
        }
    }

    fn pop_if<F>(&mut self, f: F) -> Option<NodeId>
    where
        F: FnOnce(NodeKind) -> bool,
    {
        let &top = self.stack.last()?;

        if f(self.arena.kind(top)) {
            self.stack.pop()
        } else {
            None
        }
    }

    fn pop_kind(&mut self, kind: NodeKind) -> Option<NodeId> {
        self.pop_if(|top| top == kind)
    }

    // Node construction.

    fn kind(&self, node: NodeId) -> NodeKind {
        self.arena.kind(node)
    }

    fn child(&self, node: NodeId, index: usize) -> Option<NodeId> {
        self.arena.children(node).get(index).copied()
    }

    fn only_child(&self, node: NodeId) -> Option<NodeId> {
        match *self.arena.children(node) {
            [child] => Some(child),
            _ => None,
        }
    }

    fn create_with_child(&mut self, kind: NodeKind, child: NodeId) -> NodeId {
        self.arena.create_with_children(kind, [child])
    }

    fn create_type(&mut self, child: NodeId) -> NodeId {
        self.create_with_child(NodeKind::Type, child)
    }

    fn create_swift_type(&mut self, kind: NodeKind, name: &str) -> NodeId {
        let module = self.arena.create_with_text(NodeKind::Module, STDLIB_MODULE);
        let name = self.arena.create_with_text(NodeKind::Identifier, name);
        let nominal = self.arena.create_with_children(kind, [module, name]);

        self.create_type(nominal)
    }

    fn create_index_node(&mut self, kind: NodeKind, index: u64) -> NodeId {
        self.arena.create_with_index(kind, index)
    }

    fn add_substitution(&mut self, node: NodeId) -> NodeId {
        self.substitutions.push(node);

        node
    }

    // Top level.

    fn demangle_symbol(mut self) -> Option<NodeId> {
        while self.peek().is_some() {
            let node = self.demangle_operator()?;

            self.push(node)?;
        }

        let global = self.arena.create(NodeKind::Global);

        while let Some(attribute) = self.pop_if(NodeKind::is_function_attr) {
            self.arena.add_child(global, attribute)?;
        }

        for node in std::mem::take(&mut self.stack) {
            let node = if self.kind(node) == NodeKind::Type {
                self.child(node, 0)?
            } else {
                node
            };

            self.arena.add_child(global, node)?;
        }

        let has_children = !self.arena.children(global).is_empty();

        (has_children && self.arena.height(global) <= self.max_tree_depth).then_some(global)
    }

    fn demangle_operator(&mut self) -> Option<NodeId> {
        match self.peek()? {
            b'0'..=b'9' => return self.demangle_identifier(),
            b'.' => {
                let suffix = self.rest()?;

                return Some(self.arena.create_with_text(NodeKind::Suffix, suffix));
            }
            _ => {}
        }

        let position = self.position;

        match self.next_byte()? {
            b'A' => self.demangle_multi_substitutions(),
            b'B' => self.demangle_builtin_type(),
            b'C' => self.demangle_any_generic_type(NodeKind::Class),
            b'D' => self.create_with_popped_type(NodeKind::TypeMangling),
            b'E' => self.demangle_extension_context(),
            b'F' => self.demangle_plain_function(),
            b'G' => self.demangle_bound_generic_type(),
            b'K' => Some(self.arena.create(NodeKind::ThrowsAnnotation)),
            b'L' => self.demangle_local_identifier(),
            b'M' => self.demangle_metatype(),
            b'N' => self.create_with_popped_type(NodeKind::TypeMetadata),
            b'O' => self.demangle_any_generic_type(NodeKind::Enum),
            b'P' => self.demangle_any_generic_type(NodeKind::Protocol),
            b'R' => self.demangle_generic_requirement(),
            b'S' => self.demangle_standard_substitution(),
            b'T' => self.demangle_thunk_or_specialization(),
            b'V' => self.demangle_any_generic_type(NodeKind::Structure),
            b'W' => self.demangle_witness(),
            b'Z' => {
                let entity = self.pop_if(NodeKind::is_entity)?;

                Some(self.create_with_child(NodeKind::Static, entity))
            }
            b'a' => self.demangle_any_generic_type(NodeKind::TypeAlias),
            b'c' => self.pop_function_type(NodeKind::FunctionType),
            b'd' => Some(self.arena.create(NodeKind::VariadicMarker)),
            b'f' => self.demangle_function_entity(),
            b'h' => self.demangle_type_modifier(NodeKind::Shared),
            b'i' => self.demangle_subscript(),
            b'l' => self.demangle_generic_signature(false),
            b'm' => {
                let type_ = self.pop_kind(NodeKind::Type)?;
                let metatype = self.create_with_child(NodeKind::Metatype, type_);

                Some(self.create_type(metatype))
            }
            b'n' => self.demangle_type_modifier(NodeKind::Owned),
            b'o' => self.demangle_operator_identifier(),
            b'q' => {
                let parameter = self.demangle_generic_param_index()?;

                Some(self.create_type(parameter))
            }
            b'r' => self.demangle_generic_signature(true),
            b's' => Some(self.arena.create_with_text(NodeKind::Module, STDLIB_MODULE)),
            b't' => self.pop_tuple(),
            b'u' => {
                let signature = self.pop_kind(NodeKind::DependentGenericSignature)?;
                let type_ = self.pop_kind(NodeKind::Type)?;

                Some(self.create_dependent_generic_type(signature, type_))
            }
            b'v' => self.demangle_variable(),
            b'x' => {
                let parameter = self.create_dependent_generic_param_type(0, 0);

                Some(self.create_type(parameter))
            }
            b'y' => Some(self.arena.create(NodeKind::EmptyList)),
            b'z' => self.demangle_type_modifier(NodeKind::InOut),
            b'_' => Some(self.arena.create(NodeKind::FirstElementMarker)),
            c => {
                tracing::trace!(operator = %char::from(c), position, "unsupported operator");

                None
            }
        }
    }

    // Identifiers.

    fn demangle_identifier(&mut self) -> Option<NodeId> {
        let mut has_word_substitutions = false;
        let mut is_punycoded = false;

        if self.next_if(b'0') {
            if self.next_if(b'0') {
                is_punycoded = true;
            } else {
                has_word_substitutions = true;
            }
        }

        let mut identifier = String::new();

        loop {
            while has_word_substitutions && self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
                let c = self.next_byte()?;

                let word_index = if c.is_ascii_lowercase() {
                    c - b'a'
                } else {
                    has_word_substitutions = false;

                    c - b'A'
                };

                identifier.push_str(self.words.get(usize::from(word_index))?);
            }

            if self.next_if(b'0') {
                break;
            }

            let length = parse_natural::<usize>(self).ok().filter(|&length| length != 0)?;

            if is_punycoded {
                self.next_if(b'_');
            }

            let chunk = take(length).parse(self).ok()?;

            if is_punycoded {
                identifier.push_str(&decode_punycode(chunk)?);
            } else {
                identifier.push_str(chunk);
                self.record_words(chunk);
            }

            if !has_word_substitutions {
                break;
            }
        }

        if identifier.is_empty() {
            return None;
        }

        let node = self.arena.create_with_text(NodeKind::Identifier, &identifier);

        Some(self.add_substitution(node))
    }

    fn record_words(&mut self, chunk: &'a str) {
        let bytes = chunk.as_bytes();
        let mut word_start = None;

        for (index, c) in bytes.iter().copied().chain([0]).enumerate() {
            if let Some(start) = word_start
                && is_word_end(c, bytes[index - 1])
            {
                if index - start >= 2
                    && self.words.len() < MAX_WORDS
                    && let Some(word) = chunk.get(start..index)
                {
                    self.words.push(word);
                }

                word_start = None;
            }

            if word_start.is_none() && is_word_start(c) {
                word_start = Some(index);
            }
        }
    }

    fn demangle_operator_identifier(&mut self) -> Option<NodeId> {
        let identifier = self.pop_kind(NodeKind::Identifier)?;
        let mut operator = Vec::new();

        for c in self.arena.text(identifier)?.bytes() {
            if c.is_ascii() {
                let index = c.checked_sub(b'a')?;

                match *OPERATOR_CHARS.get(usize::from(index))? {
                    b' ' => return None,
                    o => operator.push(o),
                }
            } else {
                operator.push(c);
            }
        }

        let operator = String::from_utf8(operator).ok()?;

        let kind = match self.next_byte()? {
            b'i' => NodeKind::InfixOperator,
            b'p' => NodeKind::PrefixOperator,
            b'P' => NodeKind::PostfixOperator,
            _ => return None,
        };

        Some(self.arena.create_with_text(kind, &operator))
    }

    fn demangle_local_identifier(&mut self) -> Option<NodeId> {
        if self.next_if(b'L') {
            let discriminator = self.pop_kind(NodeKind::Identifier)?;
            let name = self.pop_if(NodeKind::is_decl_name)?;

            return Some(
                self.arena
                    .create_with_children(NodeKind::PrivateDeclName, [discriminator, name]),
            );
        }

        if self.next_if(b'l') {
            let discriminator = self.pop_kind(NodeKind::Identifier)?;

            return Some(self.create_with_child(NodeKind::PrivateDeclName, discriminator));
        }

        if let Some(c @ (b'a'..=b'j' | b'A'..=b'J')) = self.peek() {
            self.next_byte()?;

            let related_kind = self.arena.create_with_text(NodeKind::Identifier, &char::from(c).to_string());
            let name = self.stack.pop()?;

            return Some(
                self.arena
                    .create_with_children(NodeKind::RelatedEntityDeclName, [related_kind, name]),
            );
        }

        let discriminator = parse_index(self).ok()?;
        let discriminator = self.create_index_node(NodeKind::Number, discriminator);
        let name = self.pop_if(NodeKind::is_decl_name)?;

        Some(
            self.arena
                .create_with_children(NodeKind::LocalDeclName, [discriminator, name]),
        )
    }

    // Substitutions.

    fn push_multi_substitutions(&mut self, repeat_count: Option<usize>, index: u8) -> Option<NodeId> {
        let node = *self.substitutions.get(usize::from(index))?;
        let repeat_count = repeat_count.unwrap_or(1);

        if repeat_count > self.max_repeat_count {
            return None;
        }

        for _ in 1..repeat_count {
            self.push(node)?;
        }

        Some(node)
    }

    fn demangle_multi_substitutions(&mut self) -> Option<NodeId> {
        let mut repeat_count = None;

        loop {
            if let Ok(count) = parse_natural::<usize>(self) {
                repeat_count = Some(count);

                continue;
            }

            match self.next_byte()? {
                c @ b'a'..=b'z' => {
                    let node = self.push_multi_substitutions(repeat_count.take(), c - b'a')?;

                    self.push(node)?;
                }
                c @ b'A'..=b'Z' => return self.push_multi_substitutions(repeat_count, c - b'A'),
                b'_' => {
                    let index = repeat_count.map_or(Some(26), |index: usize| index.checked_add(27))?;

                    return self.substitutions.get(index).copied();
                }
                _ => return None,
            }
        }
    }

    fn demangle_standard_substitution(&mut self) -> Option<NodeId> {
        if self.next_if(b'o') {
            return Some(self.arena.create_with_text(NodeKind::Module, OBJC_MODULE));
        }

        if self.next_if(b'C') {
            return Some(self.arena.create_with_text(NodeKind::Module, CLANG_IMPORTER_MODULE));
        }

        if self.next_if(b'g') {
            let wrapped = self.pop_kind(NodeKind::Type)?;
            let optional = self.create_swift_type(NodeKind::Enum, "Optional");
            let arguments = self.create_with_child(NodeKind::TypeList, wrapped);
            let bound = self
                .arena
                .create_with_children(NodeKind::BoundGenericEnum, [optional, arguments]);
            let type_ = self.create_type(bound);

            return Some(self.add_substitution(type_));
        }

        let repeat_count = parse_natural::<usize>(self).unwrap_or(1);

        if repeat_count > self.max_repeat_count {
            return None;
        }

        let (kind, name) = standard_type(self.next_byte()?)?;
        let node = self.create_swift_type(kind, name);

        for _ in 1..repeat_count {
            self.push(node)?;
        }

        Some(node)
    }

    // Contexts and entities.

    fn pop_module(&mut self) -> Option<NodeId> {
        match self.pop_kind(NodeKind::Identifier) {
            Some(identifier) => Some(self.arena.change_kind(identifier, NodeKind::Module)),
            None => self.pop_kind(NodeKind::Module),
        }
    }

    fn pop_context(&mut self) -> Option<NodeId> {
        if let Some(module) = self.pop_module() {
            return Some(module);
        }

        if let Some(type_) = self.pop_kind(NodeKind::Type) {
            let child = self.only_child(type_)?;

            return self.kind(child).is_context().then_some(child);
        }

        self.pop_if(NodeKind::is_context)
    }

    fn pop_type_and_get_child(&mut self) -> Option<NodeId> {
        let type_ = self.pop_kind(NodeKind::Type)?;

        self.only_child(type_)
    }

    fn pop_type_and_get_any_generic(&mut self) -> Option<NodeId> {
        let child = self.pop_type_and_get_child()?;

        self.kind(child).is_any_generic().then_some(child)
    }

    fn create_with_popped_type(&mut self, kind: NodeKind) -> Option<NodeId> {
        let type_ = self.pop_kind(NodeKind::Type)?;

        Some(self.create_with_child(kind, type_))
    }

    fn demangle_any_generic_type(&mut self, kind: NodeKind) -> Option<NodeId> {
        let name = self.pop_if(NodeKind::is_decl_name)?;
        let context = self.pop_context()?;
        let nominal = self.arena.create_with_children(kind, [context, name]);
        let type_ = self.create_type(nominal);

        Some(self.add_substitution(type_))
    }

    fn demangle_extension_context(&mut self) -> Option<NodeId> {
        let signature = self.pop_kind(NodeKind::DependentGenericSignature);
        let module = self.pop_module()?;
        let extended = self.pop_type_and_get_any_generic()?;

        Some(
            self.arena
                .create_with_children(NodeKind::Extension, [module, extended].into_iter().chain(signature)),
        )
    }

    fn demangle_entity(&mut self, kind: NodeKind) -> Option<NodeId> {
        let type_ = self.pop_kind(NodeKind::Type)?;
        let labels = self.pop_function_param_labels(type_);
        let name = self.pop_if(NodeKind::is_decl_name)?;
        let context = self.pop_context()?;

        Some(self.arena.create_with_children(
            kind,
            [context, name].into_iter().chain(labels).chain([type_]),
        ))
    }

    fn demangle_variable(&mut self) -> Option<NodeId> {
        let variable = self.demangle_entity(NodeKind::Variable)?;

        self.demangle_accessor(variable)
    }

    fn demangle_subscript(&mut self) -> Option<NodeId> {
        let private_name = self.pop_kind(NodeKind::PrivateDeclName);
        let type_ = self.pop_kind(NodeKind::Type)?;
        let labels = self.pop_function_param_labels(type_);
        let context = self.pop_context()?;

        let subscript = self.arena.create_with_children(
            NodeKind::Subscript,
            [context]
                .into_iter()
                .chain(labels)
                .chain([type_])
                .chain(private_name),
        );

        self.demangle_accessor(subscript)
    }

    fn demangle_accessor(&mut self, entity: NodeId) -> Option<NodeId> {
        let kind = match self.next_byte()? {
            b'm' => NodeKind::MaterializeForSet,
            b's' => NodeKind::Setter,
            b'g' => NodeKind::Getter,
            b'G' => NodeKind::GlobalGetter,
            b'w' => NodeKind::WillSet,
            b'W' => NodeKind::DidSet,
            b'r' => NodeKind::ReadAccessor,
            b'M' => NodeKind::ModifyAccessor,
            b'a' => match self.next_byte()? {
                b'O' => NodeKind::OwningMutableAddressor,
                b'o' => NodeKind::NativeOwningMutableAddressor,
                b'P' => NodeKind::NativePinningMutableAddressor,
                b'u' => NodeKind::UnsafeMutableAddressor,
                _ => return None,
            },
            b'l' => match self.next_byte()? {
                b'O' => NodeKind::OwningAddressor,
                b'o' => NodeKind::NativeOwningAddressor,
                b'p' => NodeKind::NativePinningAddressor,
                b'u' => NodeKind::UnsafeAddressor,
                _ => return None,
            },
            b'p' => return Some(entity),
            _ => return None,
        };

        Some(self.create_with_child(kind, entity))
    }

    fn demangle_function_entity(&mut self) -> Option<NodeId> {
        enum Arguments {
            None,
            TypeAndMaybePrivateName,
            TypeAndIndex,
            Index,
        }

        let (arguments, kind) = match self.next_byte()? {
            b'D' => (Arguments::None, NodeKind::Deallocator),
            b'd' => (Arguments::None, NodeKind::Destructor),
            b'E' => (Arguments::None, NodeKind::IVarDestroyer),
            b'e' => (Arguments::None, NodeKind::IVarInitializer),
            b'i' => (Arguments::None, NodeKind::Initializer),
            b'C' => (Arguments::TypeAndMaybePrivateName, NodeKind::Allocator),
            b'c' => (Arguments::TypeAndMaybePrivateName, NodeKind::Constructor),
            b'U' => (Arguments::TypeAndIndex, NodeKind::ExplicitClosure),
            b'u' => (Arguments::TypeAndIndex, NodeKind::ImplicitClosure),
            b'A' => (Arguments::Index, NodeKind::DefaultArgumentInitializer),
            b'p' => return self.demangle_entity(NodeKind::GenericTypeParamDecl),
            _ => return None,
        };

        let children = match arguments {
            Arguments::None => Vec::new(),
            Arguments::TypeAndMaybePrivateName => {
                let private_name = self.pop_kind(NodeKind::PrivateDeclName);
                let type_ = self.pop_kind(NodeKind::Type)?;
                let labels = self.pop_function_param_labels(type_);

                labels.into_iter().chain([type_]).chain(private_name).collect()
            }
            Arguments::TypeAndIndex => {
                let index = parse_index(self).ok()?;
                let index = self.create_index_node(NodeKind::Number, index);
                let type_ = self.pop_kind(NodeKind::Type)?;

                vec![index, type_]
            }
            Arguments::Index => {
                let index = parse_index(self).ok()?;

                vec![self.create_index_node(NodeKind::Number, index)]
            }
        };

        let context = self.pop_context()?;

        Some(
            self.arena
                .create_with_children(kind, [context].into_iter().chain(children)),
        )
    }

    // Functions.

    fn pop_function_params(&mut self, kind: NodeKind) -> Option<NodeId> {
        let parameters = if self.pop_kind(NodeKind::EmptyList).is_some() {
            let tuple = self.arena.create(NodeKind::Tuple);

            self.create_type(tuple)
        } else {
            self.pop_kind(NodeKind::Type)?
        };

        Some(self.create_with_child(kind, parameters))
    }

    fn pop_function_type(&mut self, kind: NodeKind) -> Option<NodeId> {
        let throws = self.pop_kind(NodeKind::ThrowsAnnotation);
        let arguments = self.pop_function_params(NodeKind::ArgumentTuple)?;
        let result = self.pop_function_params(NodeKind::ReturnType)?;

        let function = self
            .arena
            .create_with_children(kind, throws.into_iter().chain([arguments, result]));

        Some(self.create_type(function))
    }

    /// Pops the argument labels of a function of type `type_`. Returns `None` if the function has no label list.
    fn pop_function_param_labels(&mut self, type_: NodeId) -> Option<NodeId> {
        if self.pop_kind(NodeKind::EmptyList).is_some() {
            return Some(self.arena.create(NodeKind::LabelList));
        }

        if self.kind(type_) != NodeKind::Type {
            return None;
        }

        let mut function = self.child(type_, 0)?;

        if self.kind(function) == NodeKind::DependentGenericType {
            let generic = self.child(function, 1)?;

            function = self.child(generic, 0)?;
        }

        if !matches!(
            self.kind(function),
            NodeKind::FunctionType | NodeKind::NoEscapeFunctionType
        ) {
            return None;
        }

        let mut arguments = self.child(function, 0)?;

        if self.kind(arguments) == NodeKind::ThrowsAnnotation {
            arguments = self.child(function, 1)?;
        }

        let parameters = self.child(arguments, 0)?;
        let parameters = self.child(parameters, 0)?;

        let count = if self.kind(parameters) == NodeKind::Tuple {
            self.arena.children(parameters).len()
        } else {
            1
        };

        if count == 0 {
            return None;
        }

        let mut labels = Vec::with_capacity(count);
        let mut has_labels = false;

        for _ in 0..count {
            let label = self.pop_if(|kind| matches!(kind, NodeKind::Identifier | NodeKind::FirstElementMarker))?;

            has_labels |= self.kind(label) != NodeKind::FirstElementMarker;
            labels.push(label);
        }

        Some(if has_labels {
            self.arena
                .create_with_children(NodeKind::LabelList, labels.into_iter().rev())
        } else {
            self.arena.create(NodeKind::LabelList)
        })
    }

    fn demangle_plain_function(&mut self) -> Option<NodeId> {
        let signature = self.pop_kind(NodeKind::DependentGenericSignature);
        let mut type_ = self.pop_function_type(NodeKind::FunctionType)?;
        let labels = self.pop_function_param_labels(type_);

        if let Some(signature) = signature {
            type_ = self.create_dependent_generic_type(signature, type_);
        }

        let name = self.pop_if(NodeKind::is_decl_name)?;
        let context = self.pop_context()?;

        Some(self.arena.create_with_children(
            NodeKind::Function,
            [context, name].into_iter().chain(labels).chain([type_]),
        ))
    }

    // Types.

    fn demangle_type_modifier(&mut self, kind: NodeKind) -> Option<NodeId> {
        let type_ = self.pop_type_and_get_child()?;
        let modified = self.create_with_child(kind, type_);

        Some(self.create_type(modified))
    }

    fn pop_tuple(&mut self) -> Option<NodeId> {
        let mut elements = Vec::new();

        if self.pop_kind(NodeKind::EmptyList).is_none() {
            loop {
                let is_first = self.pop_kind(NodeKind::FirstElementMarker).is_some();
                let variadic = self.pop_kind(NodeKind::VariadicMarker);

                let label = self
                    .pop_kind(NodeKind::Identifier)
                    .map(|identifier| self.arena.change_kind(identifier, NodeKind::TupleElementName));

                let type_ = self.pop_kind(NodeKind::Type)?;

                elements.push(
                    self.arena
                        .create_with_children(NodeKind::TupleElement, variadic.into_iter().chain(label).chain([type_])),
                );

                if is_first {
                    break;
                }
            }
        }

        let tuple = self
            .arena
            .create_with_children(NodeKind::Tuple, elements.into_iter().rev());

        Some(self.create_type(tuple))
    }

    fn demangle_bound_generic_type(&mut self) -> Option<NodeId> {
        let mut arguments = Vec::new();

        while let Some(argument) = self.pop_kind(NodeKind::Type) {
            arguments.push(argument);
        }

        // Nested generic contexts separate their argument lists with `_`. Only a single level is supported.
        self.pop_kind(NodeKind::EmptyList)?;

        let nominal = self.pop_type_and_get_any_generic()?;

        let kind = match self.kind(nominal) {
            NodeKind::Class => NodeKind::BoundGenericClass,
            NodeKind::Structure => NodeKind::BoundGenericStructure,
            NodeKind::Enum => NodeKind::BoundGenericEnum,
            NodeKind::Protocol => NodeKind::BoundGenericProtocol,
            NodeKind::OtherNominalType => NodeKind::BoundGenericOtherNominalType,
            NodeKind::TypeAlias => NodeKind::BoundGenericTypeAlias,
            _ => return None,
        };

        let nominal = self.create_type(nominal);

        let arguments = self
            .arena
            .create_with_children(NodeKind::TypeList, arguments.into_iter().rev());

        let bound = self.arena.create_with_children(kind, [nominal, arguments]);
        let type_ = self.create_type(bound);

        Some(self.add_substitution(type_))
    }

    fn create_dependent_generic_param_type(&mut self, depth: u64, index: u64) -> NodeId {
        let depth = self.create_index_node(NodeKind::Index, depth);
        let index = self.create_index_node(NodeKind::Index, index);

        self.arena
            .create_with_children(NodeKind::DependentGenericParamType, [depth, index])
    }

    fn demangle_generic_param_index(&mut self) -> Option<NodeId> {
        let (depth, index) = if self.next_if(b'd') {
            let depth = parse_index(self).ok()?.checked_add(1)?;

            (depth, parse_index(self).ok()?)
        } else if self.next_if(b'z') {
            (0, 0)
        } else {
            (0, parse_index(self).ok()?.checked_add(1)?)
        };

        Some(self.create_dependent_generic_param_type(depth, index))
    }

    // Generic signatures.

    fn create_dependent_generic_type(&mut self, signature: NodeId, type_: NodeId) -> NodeId {
        let generic = self
            .arena
            .create_with_children(NodeKind::DependentGenericType, [signature, type_]);

        self.create_type(generic)
    }

    /// Without explicit counts, the signature has a single generic parameter.
    fn demangle_generic_signature(&mut self, has_param_counts: bool) -> Option<NodeId> {
        let mut children = Vec::new();

        if has_param_counts {
            while !self.next_if(b'l') {
                let count = if self.next_if(b'z') {
                    0
                } else {
                    parse_index(self).ok()?.checked_add(1)?
                };

                children.push(self.create_index_node(NodeKind::DependentGenericParamCount, count));
            }
        } else {
            children.push(self.create_index_node(NodeKind::DependentGenericParamCount, 1));
        }

        let count = children.len();

        while let Some(requirement) = self.pop_if(NodeKind::is_requirement) {
            children.push(requirement);
        }

        children[count..].reverse();

        Some(
            self.arena
                .create_with_children(NodeKind::DependentGenericSignature, children),
        )
    }

    fn demangle_generic_requirement(&mut self) -> Option<NodeId> {
        let (constraint, subject) = match requirement_kind(self.peek()?) {
            Some(kind) => {
                self.next_byte()?;

                kind
            }
            None => (Constraint::Protocol, Subject::GenericParam),
        };

        let subject = match subject {
            Subject::GenericParam => {
                let parameter = self.demangle_generic_param_index()?;

                self.create_type(parameter)
            }
            Subject::Substitution => self.pop_kind(NodeKind::Type)?,
            Subject::AssociatedType => {
                tracing::trace!(position = self.position, "unsupported associated type requirement");

                return None;
            }
        };

        let (kind, constraint) = match constraint {
            Constraint::Protocol => (NodeKind::DependentGenericConformanceRequirement, self.pop_protocol()?),
            Constraint::BaseClass => (
                NodeKind::DependentGenericConformanceRequirement,
                self.pop_kind(NodeKind::Type)?,
            ),
            Constraint::SameType => (
                NodeKind::DependentGenericSameTypeRequirement,
                self.pop_kind(NodeKind::Type)?,
            ),
            Constraint::Layout => return self.demangle_layout_requirement(subject),
        };

        Some(self.arena.create_with_children(kind, [subject, constraint]))
    }

    fn demangle_layout_requirement(&mut self, subject: NodeId) -> Option<NodeId> {
        let layout = self.next_byte()?;

        let (has_size, has_alignment) = match layout {
            b'U' | b'R' | b'N' | b'C' | b'D' | b'T' => (false, false),
            b'e' | b'm' => (true, false),
            b'E' | b'M' => (true, true),
            _ => return None,
        };

        let name = self.arena.create_with_text(NodeKind::Identifier, &char::from(layout).to_string());
        let mut children = vec![subject, name];

        if has_size {
            let size = parse_index(self).ok()?;

            children.push(self.create_index_node(NodeKind::Number, size));
        }

        if has_alignment {
            let alignment = parse_index(self).ok()?;

            children.push(self.create_index_node(NodeKind::Number, alignment));
        }

        Some(
            self.arena
                .create_with_children(NodeKind::DependentGenericLayoutRequirement, children),
        )
    }

    fn demangle_builtin_type(&mut self) -> Option<NodeId> {
        let name: String = match self.next_byte()? {
            b'b' => "Builtin.BridgeObject".into(),
            b'B' => "Builtin.UnsafeValueBuffer".into(),
            b'I' => "Builtin.IntLiteral".into(),
            b'O' => "Builtin.UnknownObject".into(),
            b'o' => "Builtin.NativeObject".into(),
            b'p' => "Builtin.RawPointer".into(),
            b't' => "Builtin.SILToken".into(),
            b'w' => "Builtin.Word".into(),
            c @ (b'f' | b'i') => {
                let width = parse_index(self).ok()?.checked_sub(1)?;

                if width == 0 || width > MAX_BUILTIN_WIDTH {
                    return None;
                }

                if c == b'f' {
                    format!("Builtin.FPIEEE{width}")
                } else {
                    format!("Builtin.Int{width}")
                }
            }
            _ => return None,
        };

        let builtin = self.arena.create_with_text(NodeKind::BuiltinTypeName, &name);

        Some(self.create_type(builtin))
    }

    // Global symbol kinds.

    fn pop_protocol(&mut self) -> Option<NodeId> {
        if let Some(type_) = self.pop_kind(NodeKind::Type) {
            let protocol = self.child(type_, 0)?;

            return (self.kind(protocol) == NodeKind::Protocol).then_some(type_);
        }

        let name = self.pop_if(NodeKind::is_decl_name)?;
        let context = self.pop_context()?;
        let protocol = self.arena.create_with_children(NodeKind::Protocol, [context, name]);

        Some(self.create_type(protocol))
    }

    fn pop_protocol_conformance(&mut self) -> Option<NodeId> {
        let signature = self.pop_kind(NodeKind::DependentGenericSignature);
        let module = self.pop_module()?;
        let protocol = self.pop_protocol()?;

        // Property behavior conformances name the behavior between the type and the protocol.
        let (mut type_, identifier) = match self.pop_kind(NodeKind::Type) {
            Some(type_) => (type_, None),
            None => {
                let identifier = self.pop_kind(NodeKind::Identifier)?;

                (self.pop_kind(NodeKind::Type)?, Some(identifier))
            }
        };

        if let Some(signature) = signature {
            type_ = self.create_dependent_generic_type(signature, type_);
        }

        Some(self.arena.create_with_children(
            NodeKind::ProtocolConformance,
            [type_, protocol, module].into_iter().chain(identifier),
        ))
    }

    fn demangle_metatype(&mut self) -> Option<NodeId> {
        let kind = match self.next_byte()? {
            b'a' => NodeKind::TypeMetadataAccessFunction,
            b'B' => NodeKind::ReflectionMetadataBuiltinDescriptor,
            b'F' => NodeKind::ReflectionMetadataFieldDescriptor,
            b'f' => NodeKind::FullTypeMetadata,
            b'i' => NodeKind::TypeMetadataInstantiationFunction,
            b'I' => NodeKind::TypeMetadataInstantiationCache,
            b'l' => NodeKind::TypeMetadataSingletonInitializationCache,
            b'L' => NodeKind::TypeMetadataLazyCache,
            b'm' => NodeKind::Metaclass,
            b'n' => NodeKind::NominalTypeDescriptor,
            b'o' => NodeKind::ClassMetadataBaseOffset,
            b'P' => NodeKind::GenericTypeMetadataPattern,
            b'r' => NodeKind::TypeMetadataCompletionFunction,
            b'u' => NodeKind::MethodLookupFunction,
            b'U' => NodeKind::ObjCMetadataUpdateFunction,
            b'c' => {
                let conformance = self.pop_protocol_conformance()?;

                return Some(self.create_with_child(NodeKind::ProtocolConformanceDescriptor, conformance));
            }
            b'p' => {
                let protocol = self.pop_protocol()?;

                return Some(self.create_with_child(NodeKind::ProtocolDescriptor, protocol));
            }
            b'V' => {
                let entity = self.pop_if(NodeKind::is_entity)?;

                return Some(self.create_with_child(NodeKind::PropertyDescriptor, entity));
            }
            _ => return None,
        };

        self.create_with_popped_type(kind)
    }

    fn demangle_thunk_or_specialization(&mut self) -> Option<NodeId> {
        let kind = match self.next_byte()? {
            b'o' => return Some(self.arena.create(NodeKind::ObjCAttribute)),
            b'O' => return Some(self.arena.create(NodeKind::NonObjCAttribute)),
            b'D' => return Some(self.arena.create(NodeKind::DynamicAttribute)),
            b'd' => return Some(self.arena.create(NodeKind::DirectMethodReferenceAttribute)),
            b'V' => return Some(self.arena.create(NodeKind::VTableAttribute)),
            b'c' => NodeKind::CurryThunk,
            b'j' => NodeKind::DispatchThunk,
            b'q' => NodeKind::MethodDescriptor,
            _ => return None,
        };

        let entity = self.pop_if(NodeKind::is_entity)?;

        Some(self.create_with_child(kind, entity))
    }

    fn demangle_witness(&mut self) -> Option<NodeId> {
        match self.next_byte()? {
            b'V' => self.create_with_popped_type(NodeKind::ValueWitnessTable),
            b'v' => {
                let directness = match self.next_byte()? {
                    b'd' => 0,
                    b'i' => 1,
                    _ => return None,
                };

                let directness = self.create_index_node(NodeKind::Directness, directness);
                let entity = self.pop_if(NodeKind::is_entity)?;

                Some(
                    self.arena
                        .create_with_children(NodeKind::FieldOffset, [directness, entity]),
                )
            }
            _ => None,
        }
    }
}
