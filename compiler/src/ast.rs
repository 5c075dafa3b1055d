// ast.rs — AST node types for silt inline assembly
//
// The analyzer consumes these trees as produced by the surrounding
// compiler's parser; no parsing happens in this crate. Every block,
// statement, and expression carries a `Span` for diagnostics and a
// `NodeId` keying the analysis side tables.
//
// Preconditions: trees are shape-valid (assignments have at least one
//                target, switch bodies have at most one default case).
// Postconditions: none (data-only module, plus pure literal helpers).
// Failure modes: none.
// Side effects: none.

use std::fmt;

use chumsky::span::SimpleSpan;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::id::NodeId;

/// Byte-offset span (alias for chumsky's `SimpleSpan`).
pub type Span = SimpleSpan;

// ── Types ────────────────────────────────────────────────────────────────

/// Name of a primitive type as declared in source. The empty name is the
/// default type of untyped dialects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeName(String);

impl TypeName {
    pub fn new(name: impl Into<String>) -> Self {
        TypeName(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for TypeName {
    fn from(name: &str) -> Self {
        TypeName(name.to_string())
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Leaves ───────────────────────────────────────────────────────────────

/// A name reference with its source span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

/// A name together with its declared type, used in declarations and
/// function signatures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedName {
    pub name: String,
    pub ty: TypeName,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiteralKind {
    Number,
    String,
    Boolean,
}

/// A literal constant with its declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub kind: LiteralKind,
    pub value: String,
    pub ty: TypeName,
}

// ── Expressions ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    pub id: NodeId,
    pub kind: ExpressionKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpressionKind {
    Literal(Literal),
    Identifier(Identifier),
    FunctionCall(FunctionCall),
}

/// `name(arg, ...)` — user-defined function or dialect builtin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall {
    pub name: Identifier,
    pub arguments: Vec<Expression>,
}

// ── Statements ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub id: NodeId,
    pub kind: StatementKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementKind {
    /// An expression evaluated for its side effects only.
    Expression(Expression),
    Assignment(Assignment),
    VariableDeclaration(VariableDeclaration),
    FunctionDefinition(FunctionDefinition),
    If(If),
    Switch(Switch),
    ForLoop(ForLoop),
    Break,
    Continue,
    Leave,
    Block(Block),
}

/// `a, b := value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub targets: Vec<Identifier>,
    pub value: Expression,
}

/// `let a, b := value` or `let a, b`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDeclaration {
    pub variables: Vec<TypedName>,
    pub value: Option<Expression>,
}

/// `function f(a, b) -> r { ... }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDefinition {
    pub name: Identifier,
    pub parameters: Vec<TypedName>,
    pub returns: Vec<TypedName>,
    pub body: Block,
}

/// `if condition { ... }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct If {
    pub condition: Expression,
    pub body: Block,
}

/// `switch expr case v { ... } default { ... }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Switch {
    pub expression: Expression,
    pub cases: Vec<Case>,
}

/// One switch case. `value` is `None` for the default case; when present
/// it is guaranteed by the parser to be a literal expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Case {
    pub value: Option<Expression>,
    pub body: Block,
    pub span: Span,
}

/// `for pre condition post { body }` — condition, body, and post share
/// the pre-block's scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForLoop {
    pub pre: Block,
    pub condition: Expression,
    pub post: Block,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub id: NodeId,
    pub statements: Vec<Statement>,
    pub span: Span,
}

// ── Literal values ───────────────────────────────────────────────────────

/// Largest value representable on the target word size (2^256 - 1).
pub fn u256_max() -> BigUint {
    (BigUint::from(1u8) << 256u32) - 1u8
}

impl Literal {
    /// The integer value this literal denotes on the target machine:
    /// numbers by value (decimal or `0x` hex), booleans as 0/1, strings
    /// as their bytes left-aligned in a 32-byte word. `None` when the
    /// value string is not well-formed for the kind.
    pub fn value(&self) -> Option<BigUint> {
        match self.kind {
            LiteralKind::Number => number_value(&self.value),
            LiteralKind::Boolean => match self.value.as_str() {
                "true" => Some(BigUint::from(1u8)),
                "false" => Some(BigUint::from(0u8)),
                _ => None,
            },
            LiteralKind::String => {
                if self.value.len() > 32 {
                    return None;
                }
                let mut word = [0u8; 32];
                word[..self.value.len()].copy_from_slice(self.value.as_bytes());
                Some(BigUint::from_bytes_be(&word))
            }
        }
    }
}

/// Parse a number literal string (decimal or `0x` hex) into its value.
pub fn number_value(value: &str) -> Option<BigUint> {
    if let Some(hex) = value.strip_prefix("0x") {
        BigUint::parse_bytes(hex.as_bytes(), 16)
    } else {
        BigUint::parse_bytes(value.as_bytes(), 10)
    }
}

// ── Builder ──────────────────────────────────────────────────────────────

/// Convenience constructors for building trees without a parser, used by
/// the embedding compiler's lowering stage and by tests. Allocates node
/// IDs in construction order and assigns each node a fresh synthetic span
/// so diagnostics remain attributable.
pub mod builder {
    use chumsky::span::Span as _;

    use super::*;
    use crate::id::IdAllocator;

    #[derive(Debug, Default)]
    pub struct AstBuilder {
        ids: IdAllocator,
        next_offset: usize,
    }

    impl AstBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        fn next_span(&mut self) -> Span {
            let at = self.next_offset;
            self.next_offset += 1;
            Span::new((), at..at + 1)
        }

        fn expression(&mut self, kind: ExpressionKind) -> Expression {
            Expression {
                id: self.ids.alloc_node(),
                span: self.next_span(),
                kind,
            }
        }

        fn statement(&mut self, kind: StatementKind) -> Statement {
            Statement {
                id: self.ids.alloc_node(),
                span: self.next_span(),
                kind,
            }
        }

        // ── Expressions ──

        pub fn number(&mut self, value: &str) -> Expression {
            self.typed_number(value, "")
        }

        pub fn typed_number(&mut self, value: &str, ty: &str) -> Expression {
            self.expression(ExpressionKind::Literal(Literal {
                kind: LiteralKind::Number,
                value: value.to_string(),
                ty: ty.into(),
            }))
        }

        pub fn string(&mut self, value: &str) -> Expression {
            self.typed_string(value, "")
        }

        pub fn typed_string(&mut self, value: &str, ty: &str) -> Expression {
            self.expression(ExpressionKind::Literal(Literal {
                kind: LiteralKind::String,
                value: value.to_string(),
                ty: ty.into(),
            }))
        }

        pub fn boolean(&mut self, value: bool) -> Expression {
            self.typed_boolean(value, "")
        }

        pub fn typed_boolean(&mut self, value: bool, ty: &str) -> Expression {
            self.expression(ExpressionKind::Literal(Literal {
                kind: LiteralKind::Boolean,
                value: if value { "true" } else { "false" }.to_string(),
                ty: ty.into(),
            }))
        }

        pub fn identifier(&mut self, name: &str) -> Expression {
            let span = self.next_span();
            Expression {
                id: self.ids.alloc_node(),
                span,
                kind: ExpressionKind::Identifier(Identifier {
                    name: name.to_string(),
                    span,
                }),
            }
        }

        pub fn call(&mut self, name: &str, arguments: Vec<Expression>) -> Expression {
            let name = Identifier {
                name: name.to_string(),
                span: self.next_span(),
            };
            self.expression(ExpressionKind::FunctionCall(FunctionCall {
                name,
                arguments,
            }))
        }

        // ── Statements ──

        pub fn expression_statement(&mut self, expression: Expression) -> Statement {
            self.statement(StatementKind::Expression(expression))
        }

        pub fn assignment(&mut self, targets: &[&str], value: Expression) -> Statement {
            let targets = targets
                .iter()
                .map(|name| Identifier {
                    name: name.to_string(),
                    span: self.next_span(),
                })
                .collect();
            self.statement(StatementKind::Assignment(Assignment { targets, value }))
        }

        pub fn declaration(&mut self, names: &[&str], value: Option<Expression>) -> Statement {
            let typed: Vec<(&str, &str)> = names.iter().map(|n| (*n, "")).collect();
            self.typed_declaration(&typed, value)
        }

        pub fn typed_declaration(
            &mut self,
            variables: &[(&str, &str)],
            value: Option<Expression>,
        ) -> Statement {
            let variables = variables
                .iter()
                .map(|(name, ty)| self.typed_name(name, ty))
                .collect();
            self.statement(StatementKind::VariableDeclaration(VariableDeclaration {
                variables,
                value,
            }))
        }

        pub fn function(
            &mut self,
            name: &str,
            parameters: &[(&str, &str)],
            returns: &[(&str, &str)],
            body: Block,
        ) -> Statement {
            let name = Identifier {
                name: name.to_string(),
                span: self.next_span(),
            };
            let parameters = parameters
                .iter()
                .map(|(name, ty)| self.typed_name(name, ty))
                .collect();
            let returns = returns
                .iter()
                .map(|(name, ty)| self.typed_name(name, ty))
                .collect();
            self.statement(StatementKind::FunctionDefinition(FunctionDefinition {
                name,
                parameters,
                returns,
                body,
            }))
        }

        pub fn if_statement(&mut self, condition: Expression, body: Block) -> Statement {
            self.statement(StatementKind::If(If { condition, body }))
        }

        pub fn switch(&mut self, expression: Expression, cases: Vec<Case>) -> Statement {
            self.statement(StatementKind::Switch(Switch { expression, cases }))
        }

        /// A non-default case; `value` must be a literal expression.
        pub fn case(&mut self, value: Expression, body: Block) -> Case {
            Case {
                value: Some(value),
                body,
                span: self.next_span(),
            }
        }

        pub fn default_case(&mut self, body: Block) -> Case {
            Case {
                value: None,
                body,
                span: self.next_span(),
            }
        }

        pub fn for_loop(
            &mut self,
            pre: Block,
            condition: Expression,
            post: Block,
            body: Block,
        ) -> Statement {
            self.statement(StatementKind::ForLoop(ForLoop {
                pre,
                condition,
                post,
                body,
            }))
        }

        pub fn break_statement(&mut self) -> Statement {
            self.statement(StatementKind::Break)
        }

        pub fn continue_statement(&mut self) -> Statement {
            self.statement(StatementKind::Continue)
        }

        pub fn leave_statement(&mut self) -> Statement {
            self.statement(StatementKind::Leave)
        }

        pub fn nested_block(&mut self, block: Block) -> Statement {
            self.statement(StatementKind::Block(block))
        }

        pub fn block(&mut self, statements: Vec<Statement>) -> Block {
            Block {
                id: self.ids.alloc_node(),
                span: self.next_span(),
                statements,
            }
        }

        fn typed_name(&mut self, name: &str, ty: &str) -> TypedName {
            TypedName {
                name: name.to_string(),
                ty: ty.into(),
                span: self.next_span(),
            }
        }
    }
}
