//! Recursive descent parser for executable GraphQL documents.
//!
//! The parser is generic over [`TokenSource`] so that callers can interpose
//! a wrapper between it and the [`Lexer`](crate::Lexer) — it pulls tokens
//! one at a time and propagates every source error unchanged with `?`.

use gqlguard_ast::{
    Argument, Definition, Directive, Document, Field, FragmentDefinition, FragmentSpread,
    InlineFragment, ObjectField, OperationDefinition, OperationKind, Selection, SelectionSet, Span,
    Type, Value, VariableDefinition,
};

use crate::error::ParseError;
use crate::lexer::{Lexer, TokenSource};
use crate::token::{Token, TokenKind};

/// Default bound on selection-set and value nesting depth.
pub const DEFAULT_RECURSION_LIMIT: usize = 128;

/// Options controlling a single parse call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum nesting depth of selection sets and list/object values.
    /// Bounds stack growth on adversarial documents.
    pub recursion_limit: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }
}

/// Parse a source document with default options.
pub fn parse(source: &str) -> Result<Document, ParseError> {
    parse_with_options(source, &ParseOptions::default())
}

/// Parse a source document with explicit options.
pub fn parse_with_options(source: &str, options: &ParseOptions) -> Result<Document, ParseError> {
    let mut parser = Parser::with_options(Lexer::new(source), options.clone());
    parser.parse_document()
}

/// Recursive descent parser over a token source.
#[derive(Debug)]
pub struct Parser<S> {
    tokens: S,
    options: ParseOptions,
    /// One-token lookahead. Holds a placeholder until [`Self::prime`] runs.
    current: Token,
    primed: bool,
    prev_span: Span,
    depth: usize,
}

impl<S: TokenSource> Parser<S> {
    /// Construct a parser with default options.
    ///
    /// Construction is infallible; the first token is pulled lazily so the
    /// token source stays inspectable even when priming fails.
    #[must_use]
    pub fn new(tokens: S) -> Self {
        Self::with_options(tokens, ParseOptions::default())
    }

    /// Construct a parser with explicit options.
    #[must_use]
    pub fn with_options(tokens: S, options: ParseOptions) -> Self {
        Self {
            tokens,
            options,
            current: Token::punctuator(TokenKind::Eof, Span::ZERO),
            primed: false,
            prev_span: Span::ZERO,
            depth: 0,
        }
    }

    /// Read-only access to the underlying token source.
    pub fn tokens(&self) -> &S {
        &self.tokens
    }

    /// Consume the parser, returning the underlying token source.
    pub fn into_tokens(self) -> S {
        self.tokens
    }

    /// Parse a complete document: one or more definitions up to EOF.
    pub fn parse_document(&mut self) -> Result<Document, ParseError> {
        self.prime()?;
        let start = self.current.span;

        let mut definitions = vec![self.parse_definition()?];
        while !self.current.kind.is_eof() {
            definitions.push(self.parse_definition()?);
        }

        tracing::debug!(
            target: "gqlguard.parser",
            definitions = definitions.len(),
            "parsed document"
        );
        Ok(Document {
            definitions,
            span: start.merge(self.prev_span),
        })
    }

    // -- token plumbing ----------------------------------------------------

    fn prime(&mut self) -> Result<(), ParseError> {
        if !self.primed {
            self.current = self.tokens.advance()?;
            self.primed = true;
        }
        Ok(())
    }

    /// Consume the current token, pulling the next one into the lookahead.
    fn bump(&mut self) -> Result<Token, ParseError> {
        let next = self.tokens.advance()?;
        let consumed = std::mem::replace(&mut self.current, next);
        self.prev_span = consumed.span;
        Ok(consumed)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        self.current.kind == TokenKind::Name && self.current.value == keyword
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.at(kind) {
            self.bump()
        } else {
            Err(self.unexpected_token(&expected_label(kind)))
        }
    }

    fn expect_name(&mut self) -> Result<(String, Span), ParseError> {
        let token = self.expect(TokenKind::Name)?;
        Ok((token.value, token.span))
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<Span, ParseError> {
        if self.at_keyword(keyword) {
            Ok(self.bump()?.span)
        } else {
            Err(self.unexpected_token(&format!("\"{keyword}\"")))
        }
    }

    fn unexpected_token(&self, expected: &str) -> ParseError {
        ParseError::UnexpectedToken {
            expected: expected.to_owned(),
            found: self.current.description(),
            span: self.current.span,
        }
    }

    // -- recursion budget --------------------------------------------------

    fn enter_nested(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > self.options.recursion_limit {
            return Err(ParseError::RecursionLimitExceeded {
                limit: self.options.recursion_limit,
                span: self.current.span,
            });
        }
        Ok(())
    }

    fn exit_nested(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    // -- definitions -------------------------------------------------------

    fn parse_definition(&mut self) -> Result<Definition, ParseError> {
        if self.at(TokenKind::BraceL)
            || self.at_keyword("query")
            || self.at_keyword("mutation")
            || self.at_keyword("subscription")
        {
            return Ok(Definition::Operation(self.parse_operation()?));
        }
        if self.at_keyword("fragment") {
            return Ok(Definition::Fragment(self.parse_fragment_definition()?));
        }
        Err(self.unexpected_token(
            "\"query\", \"mutation\", \"subscription\", \"fragment\", or \"{\"",
        ))
    }

    fn parse_operation(&mut self) -> Result<OperationDefinition, ParseError> {
        let start = self.current.span;

        // Anonymous shorthand: a bare selection set is a query.
        if self.at(TokenKind::BraceL) {
            let selection_set = self.parse_selection_set()?;
            let span = start.merge(selection_set.span);
            return Ok(OperationDefinition {
                kind: OperationKind::Query,
                name: None,
                variable_definitions: vec![],
                directives: vec![],
                selection_set,
                span,
            });
        }

        let keyword = self.bump()?;
        let kind = match keyword.value.as_str() {
            "query" => OperationKind::Query,
            "mutation" => OperationKind::Mutation,
            _ => OperationKind::Subscription,
        };

        let name = if self.at(TokenKind::Name) {
            Some(self.bump()?.value)
        } else {
            None
        };
        let variable_definitions = if self.at(TokenKind::ParenL) {
            self.parse_variable_definitions()?
        } else {
            vec![]
        };
        let directives = self.parse_directives(false)?;
        let selection_set = self.parse_selection_set()?;
        let span = start.merge(selection_set.span);

        Ok(OperationDefinition {
            kind,
            name,
            variable_definitions,
            directives,
            selection_set,
            span,
        })
    }

    fn parse_fragment_definition(&mut self) -> Result<FragmentDefinition, ParseError> {
        let start = self.expect_keyword("fragment")?;
        let (name, name_span) = self.expect_name()?;
        if name == "on" {
            return Err(ParseError::Unexpected {
                found: "Name \"on\"".to_owned(),
                span: name_span,
            });
        }
        self.expect_keyword("on")?;
        let (type_condition, _) = self.expect_name()?;
        let directives = self.parse_directives(false)?;
        let selection_set = self.parse_selection_set()?;
        let span = start.merge(selection_set.span);

        Ok(FragmentDefinition {
            name,
            type_condition,
            directives,
            selection_set,
            span,
        })
    }

    fn parse_variable_definitions(&mut self) -> Result<Vec<VariableDefinition>, ParseError> {
        self.expect(TokenKind::ParenL)?;
        let mut definitions = Vec::new();
        loop {
            definitions.push(self.parse_variable_definition()?);
            if self.at(TokenKind::ParenR) {
                self.bump()?;
                return Ok(definitions);
            }
        }
    }

    fn parse_variable_definition(&mut self) -> Result<VariableDefinition, ParseError> {
        let start = self.expect(TokenKind::Dollar)?.span;
        let (name, _) = self.expect_name()?;
        self.expect(TokenKind::Colon)?;
        let ty = self.parse_type()?;
        let default_value = if self.at(TokenKind::Equals) {
            self.bump()?;
            Some(self.parse_value(true)?)
        } else {
            None
        };
        let directives = self.parse_directives(true)?;
        let end = default_value
            .as_ref()
            .map_or_else(|| ty.span(), Value::span);
        let end = directives.last().map_or(end, |dir| dir.span);

        Ok(VariableDefinition {
            name,
            ty,
            default_value,
            directives,
            span: start.merge(end),
        })
    }

    // -- selections --------------------------------------------------------

    fn parse_selection_set(&mut self) -> Result<SelectionSet, ParseError> {
        let start = self.expect(TokenKind::BraceL)?.span;
        self.enter_nested()?;
        let mut selections = Vec::new();
        loop {
            selections.push(self.parse_selection()?);
            if self.at(TokenKind::BraceR) {
                break;
            }
        }
        let end = self.bump()?.span;
        self.exit_nested();

        Ok(SelectionSet {
            selections,
            span: start.merge(end),
        })
    }

    fn parse_selection(&mut self) -> Result<Selection, ParseError> {
        if self.at(TokenKind::Spread) {
            self.parse_fragment_selection()
        } else {
            Ok(Selection::Field(self.parse_field()?))
        }
    }

    fn parse_field(&mut self) -> Result<Field, ParseError> {
        let (mut name, start) = self.expect_name()?;
        let mut alias = None;
        if self.at(TokenKind::Colon) {
            self.bump()?;
            let (field_name, _) = self.expect_name()?;
            alias = Some(std::mem::replace(&mut name, field_name));
        }
        let arguments = if self.at(TokenKind::ParenL) {
            self.parse_arguments(false)?
        } else {
            vec![]
        };
        let directives = self.parse_directives(false)?;
        let selection_set = if self.at(TokenKind::BraceL) {
            Some(self.parse_selection_set()?)
        } else {
            None
        };

        let span = start.merge(self.prev_span);
        Ok(Field {
            alias,
            name,
            arguments,
            directives,
            selection_set,
            span,
        })
    }

    /// Parse `...Name`, `... on Type { ... }`, or `... { ... }`.
    fn parse_fragment_selection(&mut self) -> Result<Selection, ParseError> {
        let start = self.expect(TokenKind::Spread)?.span;

        if self.at(TokenKind::Name) && !self.at_keyword("on") {
            let (name, name_span) = self.expect_name()?;
            let directives = self.parse_directives(false)?;
            let end = directives.last().map_or(name_span, |dir| dir.span);
            return Ok(Selection::FragmentSpread(FragmentSpread {
                name,
                directives,
                span: start.merge(end),
            }));
        }

        let type_condition = if self.at_keyword("on") {
            self.bump()?;
            Some(self.expect_name()?.0)
        } else {
            None
        };
        let directives = self.parse_directives(false)?;
        let selection_set = self.parse_selection_set()?;
        let span = start.merge(selection_set.span);

        Ok(Selection::InlineFragment(InlineFragment {
            type_condition,
            directives,
            selection_set,
            span,
        }))
    }

    // -- arguments and directives -----------------------------------------

    fn parse_arguments(&mut self, constant: bool) -> Result<Vec<Argument>, ParseError> {
        self.expect(TokenKind::ParenL)?;
        let mut arguments = Vec::new();
        loop {
            let (name, start) = self.expect_name()?;
            self.expect(TokenKind::Colon)?;
            let value = self.parse_value(constant)?;
            let span = start.merge(value.span());
            arguments.push(Argument { name, value, span });
            if self.at(TokenKind::ParenR) {
                self.bump()?;
                return Ok(arguments);
            }
        }
    }

    fn parse_directives(&mut self, constant: bool) -> Result<Vec<Directive>, ParseError> {
        let mut directives = Vec::new();
        while self.at(TokenKind::At) {
            let start = self.bump()?.span;
            let (name, name_span) = self.expect_name()?;
            let arguments = if self.at(TokenKind::ParenL) {
                self.parse_arguments(constant)?
            } else {
                vec![]
            };
            let end = arguments.last().map_or(name_span, |arg| arg.span);
            directives.push(Directive {
                name,
                arguments,
                span: start.merge(end),
            });
        }
        Ok(directives)
    }

    // -- values and types --------------------------------------------------

    fn parse_value(&mut self, constant: bool) -> Result<Value, ParseError> {
        match self.current.kind {
            TokenKind::Dollar => {
                let start = self.bump()?.span;
                let (name, name_span) = self.expect_name()?;
                let span = start.merge(name_span);
                if constant {
                    return Err(ParseError::UnexpectedVariable { name, span });
                }
                Ok(Value::Variable(name, span))
            }
            TokenKind::Int => {
                let token = self.bump()?;
                let parsed = token.value.parse::<i64>().map_err(|_| {
                    ParseError::InvalidNumber {
                        message: format!("Invalid number, integer out of range \"{}\"", token.value),
                        offset: token.span.start,
                    }
                })?;
                Ok(Value::Int(parsed, token.span))
            }
            TokenKind::Float => {
                let token = self.bump()?;
                let parsed = token.value.parse::<f64>().map_err(|_| {
                    ParseError::InvalidNumber {
                        message: format!("Invalid number \"{}\"", token.value),
                        offset: token.span.start,
                    }
                })?;
                Ok(Value::Float(parsed, token.span))
            }
            TokenKind::String | TokenKind::BlockString => {
                let token = self.bump()?;
                Ok(Value::String(token.value, token.span))
            }
            TokenKind::Name => {
                let token = self.bump()?;
                Ok(match token.value.as_str() {
                    "true" => Value::Boolean(true, token.span),
                    "false" => Value::Boolean(false, token.span),
                    "null" => Value::Null(token.span),
                    _ => Value::Enum(token.value, token.span),
                })
            }
            TokenKind::BracketL => self.parse_list_value(constant),
            TokenKind::BraceL => self.parse_object_value(constant),
            _ => Err(self.unexpected_token("Value")),
        }
    }

    fn parse_list_value(&mut self, constant: bool) -> Result<Value, ParseError> {
        let start = self.expect(TokenKind::BracketL)?.span;
        self.enter_nested()?;
        let mut items = Vec::new();
        while !self.at(TokenKind::BracketR) {
            items.push(self.parse_value(constant)?);
        }
        let end = self.bump()?.span;
        self.exit_nested();
        Ok(Value::List(items, start.merge(end)))
    }

    fn parse_object_value(&mut self, constant: bool) -> Result<Value, ParseError> {
        let start = self.expect(TokenKind::BraceL)?.span;
        self.enter_nested()?;
        let mut fields = Vec::new();
        while !self.at(TokenKind::BraceR) {
            let (name, name_start) = self.expect_name()?;
            self.expect(TokenKind::Colon)?;
            let value = self.parse_value(constant)?;
            let span = name_start.merge(value.span());
            fields.push(ObjectField { name, value, span });
        }
        let end = self.bump()?.span;
        self.exit_nested();
        Ok(Value::Object(fields, start.merge(end)))
    }

    fn parse_type(&mut self) -> Result<Type, ParseError> {
        let inner = if self.at(TokenKind::BracketL) {
            let start = self.bump()?.span;
            let item = self.parse_type()?;
            let end = self.expect(TokenKind::BracketR)?.span;
            Type::List(Box::new(item), start.merge(end))
        } else {
            let (name, span) = self.expect_name()?;
            Type::Named(name, span)
        };

        if self.at(TokenKind::Bang) {
            let bang = self.bump()?.span;
            let span = inner.span().merge(bang);
            Ok(Type::NonNull(Box::new(inner), span))
        } else {
            Ok(inner)
        }
    }
}

/// How a token kind is spelled in `Expected ..., found ...` messages:
/// punctuators are quoted, `Name`/literal kinds and `<EOF>` are not.
fn expected_label(kind: TokenKind) -> String {
    if kind.has_value() || kind.is_eof() {
        kind.as_str().to_owned()
    } else {
        format!("\"{}\"", kind.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
