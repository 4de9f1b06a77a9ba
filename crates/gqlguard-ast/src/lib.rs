//! GraphQL executable-document AST node types.
//!
//! Covers the executable subset of the language: operations (including the
//! anonymous `{ ... }` shorthand), fragment definitions, selection sets,
//! arguments, directives, values, and type references. Type-system
//! definitions (SDL) are intentionally absent.

use std::fmt;

// ---------------------------------------------------------------------------
// Source spans
// ---------------------------------------------------------------------------

/// Half-open byte range `[start, end)` into the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Byte offset of the first character.
    pub start: u32,
    /// Byte offset one past the last character.
    pub end: u32,
}

impl Span {
    /// The empty span at offset 0, used by synthesized nodes.
    pub const ZERO: Self = Self { start: 0, end: 0 };

    /// Construct a span from byte offsets.
    #[must_use]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both `self` and `other`.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Length of the span in bytes.
    #[must_use]
    pub const fn len(self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Whether the span covers no bytes.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.start >= self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

// ---------------------------------------------------------------------------
// Document and definitions
// ---------------------------------------------------------------------------

/// A complete executable document: one or more definitions.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Operation and fragment definitions in source order.
    pub definitions: Vec<Definition>,
    /// Span covering the whole document.
    pub span: Span,
}

impl Document {
    /// Iterate over the operation definitions in source order.
    pub fn operations(&self) -> impl Iterator<Item = &OperationDefinition> {
        self.definitions.iter().filter_map(|def| match def {
            Definition::Operation(op) => Some(op),
            Definition::Fragment(_) => None,
        })
    }

    /// Iterate over the fragment definitions in source order.
    pub fn fragments(&self) -> impl Iterator<Item = &FragmentDefinition> {
        self.definitions.iter().filter_map(|def| match def {
            Definition::Fragment(frag) => Some(frag),
            Definition::Operation(_) => None,
        })
    }

    /// Look up a named operation.
    #[must_use]
    pub fn operation(&self, name: &str) -> Option<&OperationDefinition> {
        self.operations()
            .find(|op| op.name.as_deref() == Some(name))
    }

    /// Look up a fragment definition by name.
    #[must_use]
    pub fn fragment(&self, name: &str) -> Option<&FragmentDefinition> {
        self.fragments().find(|frag| frag.name == name)
    }
}

/// A top-level definition.
#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    /// `query ... { ... }`, `mutation ...`, `subscription ...`, or the
    /// anonymous `{ ... }` shorthand.
    Operation(OperationDefinition),
    /// `fragment Name on Type { ... }`.
    Fragment(FragmentDefinition),
}

impl Definition {
    /// Span of the underlying definition.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Operation(op) => op.span,
            Self::Fragment(frag) => frag.span,
        }
    }
}

/// The three operation types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl OperationKind {
    /// Stable keyword spelling, as it appears in source.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
            Self::Subscription => "subscription",
        }
    }
}

/// An operation definition.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationDefinition {
    pub kind: OperationKind,
    /// `None` for anonymous operations.
    pub name: Option<String>,
    pub variable_definitions: Vec<VariableDefinition>,
    pub directives: Vec<Directive>,
    pub selection_set: SelectionSet,
    pub span: Span,
}

impl OperationDefinition {
    /// Whether this operation uses the anonymous shorthand.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.name.is_none()
    }
}

/// A variable definition: `$name: Type = default @dir`.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDefinition {
    /// Variable name without the leading `$`.
    pub name: String,
    pub ty: Type,
    /// Constant default value, if present.
    pub default_value: Option<Value>,
    pub directives: Vec<Directive>,
    pub span: Span,
}

/// A fragment definition: `fragment Name on Type { ... }`.
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentDefinition {
    pub name: String,
    /// The type condition (`on Type`).
    pub type_condition: String,
    pub directives: Vec<Directive>,
    pub selection_set: SelectionSet,
    pub span: Span,
}

// ---------------------------------------------------------------------------
// Selections
// ---------------------------------------------------------------------------

/// A braced selection set.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionSet {
    pub selections: Vec<Selection>,
    pub span: Span,
}

/// A single selection inside a selection set.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Field(Field),
    FragmentSpread(FragmentSpread),
    InlineFragment(InlineFragment),
}

impl Selection {
    /// Span of the underlying selection.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Field(field) => field.span,
            Self::FragmentSpread(spread) => spread.span,
            Self::InlineFragment(inline) => inline.span,
        }
    }
}

/// A field selection: `alias: name(args) @dir { ... }`.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub alias: Option<String>,
    pub name: String,
    pub arguments: Vec<Argument>,
    pub directives: Vec<Directive>,
    /// Present only for composite fields.
    pub selection_set: Option<SelectionSet>,
    pub span: Span,
}

impl Field {
    /// The key this field appears under in a response: alias if present,
    /// otherwise the field name.
    #[must_use]
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// A fragment spread: `...Name @dir`.
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentSpread {
    pub name: String,
    pub directives: Vec<Directive>,
    pub span: Span,
}

/// An inline fragment: `... on Type @dir { ... }`.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineFragment {
    /// `None` when the type condition is omitted.
    pub type_condition: Option<String>,
    pub directives: Vec<Directive>,
    pub selection_set: SelectionSet,
    pub span: Span,
}

/// A named argument: `name: value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub name: String,
    pub value: Value,
    pub span: Span,
}

/// A directive application: `@name(args)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    /// Directive name without the leading `@`.
    pub name: String,
    pub arguments: Vec<Argument>,
    pub span: Span,
}

// ---------------------------------------------------------------------------
// Values and types
// ---------------------------------------------------------------------------

/// An input value literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `$name` (never valid in constant positions).
    Variable(String, Span),
    Int(i64, Span),
    Float(f64, Span),
    /// Unescaped string or block-string contents.
    String(String, Span),
    Boolean(bool, Span),
    Null(Span),
    /// A bare name that is not `true`, `false`, or `null`.
    Enum(String, Span),
    List(Vec<Value>, Span),
    Object(Vec<ObjectField>, Span),
}

impl Value {
    /// Span of the value literal.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Variable(_, span)
            | Self::Int(_, span)
            | Self::Float(_, span)
            | Self::String(_, span)
            | Self::Boolean(_, span)
            | Self::Null(span)
            | Self::Enum(_, span)
            | Self::List(_, span)
            | Self::Object(_, span) => *span,
        }
    }

    /// Whether the value contains no variable references at any depth.
    #[must_use]
    pub fn is_const(&self) -> bool {
        match self {
            Self::Variable(..) => false,
            Self::List(items, _) => items.iter().all(Self::is_const),
            Self::Object(fields, _) => fields.iter().all(|field| field.value.is_const()),
            _ => true,
        }
    }
}

/// A field inside an input object value.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectField {
    pub name: String,
    pub value: Value,
    pub span: Span,
}

/// A type reference: `Name`, `[Inner]`, or `Inner!`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Named(String, Span),
    List(Box<Type>, Span),
    NonNull(Box<Type>, Span),
}

impl Type {
    /// Span of the type reference.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Named(_, span) | Self::List(_, span) | Self::NonNull(_, span) => *span,
        }
    }

    /// The named type at the bottom of any list/non-null wrappers.
    #[must_use]
    pub fn innermost_name(&self) -> &str {
        match self {
            Self::Named(name, _) => name,
            Self::List(inner, _) | Self::NonNull(inner, _) => inner.innermost_name(),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name, _) => write!(f, "{name}"),
            Self::List(inner, _) => write!(f, "[{inner}]"),
            Self::NonNull(inner, _) => write!(f, "{inner}!"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
