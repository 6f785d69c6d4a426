use crate::span::Span;

// ══════════════════════════════════════════════════════════════
// Top-Level
// ══════════════════════════════════════════════════════════════

/// A complete source module.
///
/// The formatter consumes this tree read-only; it never mutates, reorders,
/// or rewrites nodes. Every node carries the span it covered in the
/// original source so comments can be attributed to the right construct.
#[derive(Debug, Clone)]
pub struct Module {
    pub name: String,
    pub members: Vec<ModuleMember>,
}

/// A top-level member of a module.
#[derive(Debug, Clone)]
pub enum ModuleMember {
    Function(Function),
    Proc(Proc),
    TestFunction(TestFunction),
    TestProc(TestProc),
    QuickCheck(QuickCheck),
    TypeAlias(TypeAlias),
    StructDef(StructDef),
    ConstantDef(ConstantDef),
    EnumDef(EnumDef),
    Import(Import),
    ConstAssert(ConstAssert),
}

impl ModuleMember {
    pub fn span(&self) -> Span {
        match self {
            ModuleMember::Function(f) => f.span,
            ModuleMember::Proc(p) => p.span,
            ModuleMember::TestFunction(t) => t.span,
            ModuleMember::TestProc(t) => t.span,
            ModuleMember::QuickCheck(q) => q.span,
            ModuleMember::TypeAlias(t) => t.span,
            ModuleMember::StructDef(s) => s.span,
            ModuleMember::ConstantDef(c) => c.span,
            ModuleMember::EnumDef(e) => e.span,
            ModuleMember::Import(i) => i.span,
            ModuleMember::ConstAssert(c) => c.span,
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Functions
// ══════════════════════════════════════════════════════════════

/// Distinguishes a plain function from the desugared sub-functions of a
/// proc. Non-`Normal` functions appear among module members but are
/// rendered by their enclosing proc, not at module scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionTag {
    Normal,
    ProcConfig,
    ProcInit,
    ProcNext,
}

#[derive(Debug, Clone)]
pub struct Function {
    pub is_public: bool,
    pub identifier: String,
    pub parametric_bindings: Vec<ParametricBinding>,
    pub params: Vec<Param>,
    pub return_type: Option<TypeAnnotation>,
    pub body: Block,
    pub tag: FunctionTag,
    pub span: Span,
}

impl Function {
    pub fn is_parametric(&self) -> bool {
        !self.parametric_bindings.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Param {
    pub identifier: String,
    pub type_annotation: TypeAnnotation,
    pub span: Span,
}

/// A compile-time parameter: `N: u32` or `N: u32 = {u32:8}`.
#[derive(Debug, Clone)]
pub struct ParametricBinding {
    pub identifier: String,
    pub type_annotation: TypeAnnotation,
    pub expr: Option<Expr>,
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════
// Procs
// ══════════════════════════════════════════════════════════════

/// A concurrent process: member declarations plus the `config`/`init`/
/// `next` sub-functions.
#[derive(Debug, Clone)]
pub struct Proc {
    pub is_public: bool,
    pub identifier: String,
    pub parametric_bindings: Vec<ParametricBinding>,
    pub members: Vec<ProcMember>,
    pub config: Function,
    pub init: Function,
    pub next: Function,
    pub span: Span,
}

impl Proc {
    pub fn is_parametric(&self) -> bool {
        !self.parametric_bindings.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ProcMember {
    pub identifier: String,
    pub type_annotation: TypeAnnotation,
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════
// Test Constructs
// ══════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct TestFunction {
    pub function: Function,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TestProc {
    pub proc: Proc,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct QuickCheck {
    pub function: Function,
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════
// Type Definitions
// ══════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct TypeAlias {
    pub is_public: bool,
    pub identifier: String,
    pub type_annotation: TypeAnnotation,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct StructDef {
    pub is_public: bool,
    pub identifier: String,
    pub parametric_bindings: Vec<ParametricBinding>,
    pub members: Vec<StructMember>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct StructMember {
    pub identifier: String,
    pub type_annotation: TypeAnnotation,
}

#[derive(Debug, Clone)]
pub struct EnumDef {
    pub is_public: bool,
    pub identifier: String,
    pub type_annotation: Option<TypeAnnotation>,
    pub values: Vec<EnumMember>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct EnumMember {
    pub identifier: String,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ConstantDef {
    pub is_public: bool,
    pub identifier: String,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Import {
    /// Dotted path segments: `import a.b.c` has subject `["a", "b", "c"]`.
    pub subject: Vec<String>,
    pub alias: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ConstAssert {
    pub arg: Expr,
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════
// Statements & Blocks
// ══════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub enum Statement {
    Expr(Expr),
    Let(Let),
    TypeAlias(TypeAlias),
    ConstAssert(ConstAssert),
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::Expr(e) => e.span,
            Statement::Let(l) => l.span,
            Statement::TypeAlias(t) => t.span,
            Statement::ConstAssert(c) => c.span,
        }
    }
}

/// `let name[: T] = rhs` (or `const` when `is_const`).
#[derive(Debug, Clone)]
pub struct Let {
    pub name: Pattern,
    pub type_annotation: Option<TypeAnnotation>,
    pub rhs: Box<Expr>,
    pub is_const: bool,
    pub span: Span,
}

/// `{ stmt; stmt; expr }`. `trailing_semi` records whether the final
/// statement carried a semicolon (i.e. the block yields unit).
#[derive(Debug, Clone)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub trailing_semi: bool,
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════

/// An expression node: variant payload, source span, and whether the
/// user wrote explicit parentheses around it (re-emitted verbatim).
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
    pub in_parens: bool,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span, in_parens: false }
    }

    /// Effective precedence: explicit parens make any expression bind
    /// as tightly as an atom.
    pub fn precedence(&self) -> Precedence {
        if self.in_parens {
            Precedence::Strongest
        } else {
            self.kind.precedence()
        }
    }

    /// True for expressions whose surface syntax introduces its own
    /// `{ … }`: blocks, conditionals, matches, loops.
    pub fn is_blocked(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::Block(_)
                | ExprKind::Conditional(_)
                | ExprKind::Match { .. }
                | ExprKind::For(_)
                | ExprKind::UnrollFor(_)
        )
    }
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    /// A numeric literal, optionally width-prefixed: `42`, `u32:42`.
    /// The digits are kept verbatim (radix, underscores, casing).
    Number {
        type_annotation: Option<Box<TypeAnnotation>>,
        text: String,
    },

    /// A string literal, verbatim including its quotes.
    StringLit { text: String },

    NameRef { identifier: String },

    ColonRef(ColonRef),

    /// Attribute access: `lhs.attr`.
    Attr { lhs: Box<Expr>, attr: String },

    /// Tuple element access: `lhs.0` (the index is a number literal).
    TupleIndex { lhs: Box<Expr>, index: Box<Expr> },

    /// Indexing: `lhs[i]`, `lhs[a:b]`, `lhs[s +: w]`.
    Index { lhs: Box<Expr>, rhs: IndexRhs },

    Range { start: Box<Expr>, end: Box<Expr> },

    Unop { op: UnopKind, operand: Box<Expr> },

    Binop {
        op: BinopKind,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },

    /// `expr as T`.
    Cast {
        expr: Box<Expr>,
        type_annotation: Box<TypeAnnotation>,
    },

    /// Array literal, optionally type-prefixed and ellipsis-terminated:
    /// `u8[4]:[1, 2, ...]`.
    Array {
        type_annotation: Option<Box<TypeAnnotation>>,
        members: Vec<Expr>,
        has_ellipsis: bool,
    },

    Tuple { members: Vec<Expr> },

    /// `callee<parametrics>(args)`.
    Invocation {
        callee: Box<Expr>,
        parametrics: Vec<ExprOrType>,
        args: Vec<Expr>,
    },

    /// `spawn config_invocation`.
    Spawn { config: Box<Expr> },

    /// A formatting builtin such as `trace_fmt!("{}", x)`. The format
    /// string is stored without its surrounding quotes.
    FormatMacro {
        macro_name: String,
        format: String,
        args: Vec<Expr>,
    },

    /// `zero!<T>()`.
    ZeroMacro { type_arg: Box<ExprOrType> },

    Match {
        matched: Box<Expr>,
        arms: Vec<MatchArm>,
    },

    Conditional(Conditional),

    For(ForExpr),

    /// Present in the grammar but has no formatting rules yet; the
    /// formatter treats encountering one as an invariant violation.
    UnrollFor(ForExpr),

    Block(Block),

    /// `S { a: 1, b }`.
    StructInstance {
        struct_ref: TypeRef,
        members: Vec<(String, Expr)>,
    },

    /// `S { a: 1, ..rest }`.
    SplatStructInstance {
        struct_ref: TypeRef,
        members: Vec<(String, Expr)>,
        splatted: Box<Expr>,
    },

    /// `chan<T>` / `chan<T, depth>` with optional dims.
    ChannelDecl {
        channel_type: Box<TypeAnnotation>,
        fifo_depth: Option<Box<Expr>>,
        dims: Vec<Expr>,
    },
}

/// `subject::attr` where the subject may itself be a colon-ref chain.
#[derive(Debug, Clone)]
pub struct ColonRef {
    pub subject: ColonRefSubject,
    pub attr: String,
}

#[derive(Debug, Clone)]
pub enum ColonRefSubject {
    Name(String),
    ColonRef(Box<ColonRef>),
}

#[derive(Debug, Clone)]
pub enum IndexRhs {
    Expr(Box<Expr>),
    Slice {
        start: Option<Box<Expr>>,
        limit: Option<Box<Expr>>,
    },
    WidthSlice {
        start: Box<Expr>,
        width: Box<Expr>,
    },
}

#[derive(Debug, Clone)]
pub struct MatchArm {
    pub patterns: Vec<Pattern>,
    pub expr: Box<Expr>,
    pub span: Span,
}

/// `if test { consequent } else ...`; the alternate is either a
/// terminal `else` block or a chained `else if`.
#[derive(Debug, Clone)]
pub struct Conditional {
    pub test: Box<Expr>,
    pub consequent: Block,
    pub alternate: ElseArm,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ElseArm {
    Block(Block),
    ElseIf(Box<Conditional>),
}

impl Conditional {
    pub fn has_else_if(&self) -> bool {
        matches!(self.alternate, ElseArm::ElseIf(_))
    }

    /// True if any arm of the chain holds more than one statement.
    pub fn has_multi_statement_blocks(&self) -> bool {
        if self.consequent.statements.len() > 1 {
            return true;
        }
        match &self.alternate {
            ElseArm::Block(b) => b.statements.len() > 1,
            ElseArm::ElseIf(c) => c.has_multi_statement_blocks(),
        }
    }
}

/// `for name[: T] in iterable { body }(init)`.
#[derive(Debug, Clone)]
pub struct ForExpr {
    pub name: Pattern,
    pub type_annotation: Option<TypeAnnotation>,
    pub iterable: Box<Expr>,
    pub body: Block,
    pub init: Box<Expr>,
}

/// Either side of a parametric argument position.
#[derive(Debug, Clone)]
pub enum ExprOrType {
    Expr(Expr),
    Type(TypeAnnotation),
}

// ══════════════════════════════════════════════════════════════
// Patterns
// ══════════════════════════════════════════════════════════════

/// A destructuring pattern as used by `let` bindings, `for` loop names,
/// and match arms.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub kind: PatternKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum PatternKind {
    /// Binds a fresh name.
    Name(String),
    /// References an existing binding (match against its value).
    NameRef(String),
    Wildcard,
    /// A literal leaf: number, colon-ref, or range.
    Literal(Box<Expr>),
    Tuple(Vec<Pattern>),
}

// ══════════════════════════════════════════════════════════════
// Type Annotations
// ══════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct TypeAnnotation {
    pub kind: TypeKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum TypeKind {
    /// `u32`, `s8`, `bits`, `bool`, `token`, …
    Builtin(String),

    /// `T[dim]`.
    Array {
        element: Box<TypeAnnotation>,
        dim: Box<Expr>,
    },

    /// `(A, B, C)`.
    Tuple(Vec<TypeAnnotation>),

    /// A reference to a nominal type, with optional parametrics:
    /// `Point`, `Buffer<N>`, `other_mod::Kind`.
    Ref {
        type_ref: TypeRef,
        parametrics: Vec<ExprOrType>,
    },

    /// `chan<T> in` / `chan<T> out`, with optional dims.
    Channel {
        payload: Box<TypeAnnotation>,
        direction: ChannelDirection,
        dims: Vec<Expr>,
    },
}

#[derive(Debug, Clone)]
pub enum TypeRef {
    Name(String),
    ColonRef(ColonRef),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelDirection {
    In,
    Out,
}

// ══════════════════════════════════════════════════════════════
// Operators & Precedence
// ══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnopKind {
    Negate,
    Invert,
}

impl UnopKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnopKind::Negate => "-",
            UnopKind::Invert => "!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinopKind {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Shl,
    Shr,
    Concat,
    BitAnd,
    BitXor,
    BitOr,
    LogicalAnd,
    LogicalOr,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinopKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinopKind::Add => "+",
            BinopKind::Sub => "-",
            BinopKind::Mul => "*",
            BinopKind::Div => "/",
            BinopKind::Mod => "%",
            BinopKind::Shl => "<<",
            BinopKind::Shr => ">>",
            BinopKind::Concat => "++",
            BinopKind::BitAnd => "&",
            BinopKind::BitXor => "^",
            BinopKind::BitOr => "|",
            BinopKind::LogicalAnd => "&&",
            BinopKind::LogicalOr => "||",
            BinopKind::Eq => "==",
            BinopKind::Ne => "!=",
            BinopKind::Lt => "<",
            BinopKind::Le => "<=",
            BinopKind::Gt => ">",
            BinopKind::Ge => ">=",
        }
    }

    pub fn precedence(&self) -> Precedence {
        match self {
            BinopKind::Mul | BinopKind::Div | BinopKind::Mod => Precedence::StrongArithmetic,
            BinopKind::Add | BinopKind::Sub => Precedence::WeakArithmetic,
            BinopKind::Shl | BinopKind::Shr => Precedence::Shift,
            BinopKind::Concat => Precedence::Concat,
            BinopKind::BitAnd => Precedence::BitwiseAnd,
            BinopKind::BitXor => Precedence::BitwiseXor,
            BinopKind::BitOr => Precedence::BitwiseOr,
            BinopKind::Eq
            | BinopKind::Ne
            | BinopKind::Lt
            | BinopKind::Le
            | BinopKind::Gt
            | BinopKind::Ge => Precedence::Comparison,
            BinopKind::LogicalAnd => Precedence::LogicalAnd,
            BinopKind::LogicalOr => Precedence::LogicalOr,
        }
    }
}

/// Binding strength, strongest first. A child expression in an operator
/// position is parenthesized iff its precedence is strictly weaker than
/// the operator's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Strongest = 0,
    FieldExpression = 1,
    FunctionCallOrArrayIndex = 2,
    As = 3,
    UnaryOp = 4,
    StrongArithmetic = 5,
    WeakArithmetic = 6,
    Shift = 7,
    Concat = 8,
    BitwiseAnd = 9,
    BitwiseXor = 10,
    BitwiseOr = 11,
    Comparison = 12,
    LogicalAnd = 13,
    LogicalOr = 14,
    Weakest = 15,
}

/// True iff `lhs` binds strictly more loosely than `rhs`.
pub fn weaker_than(lhs: Precedence, rhs: Precedence) -> bool {
    lhs > rhs
}

impl ExprKind {
    pub fn precedence(&self) -> Precedence {
        match self {
            ExprKind::Number { .. }
            | ExprKind::StringLit { .. }
            | ExprKind::NameRef { .. }
            | ExprKind::ColonRef(_)
            | ExprKind::Array { .. }
            | ExprKind::Tuple { .. }
            | ExprKind::Match { .. }
            | ExprKind::Conditional(_)
            | ExprKind::For(_)
            | ExprKind::UnrollFor(_)
            | ExprKind::Block(_)
            | ExprKind::StructInstance { .. }
            | ExprKind::SplatStructInstance { .. }
            | ExprKind::ChannelDecl { .. }
            | ExprKind::FormatMacro { .. }
            | ExprKind::ZeroMacro { .. }
            | ExprKind::Spawn { .. } => Precedence::Strongest,
            ExprKind::Attr { .. } | ExprKind::TupleIndex { .. } => Precedence::FieldExpression,
            ExprKind::Index { .. } | ExprKind::Invocation { .. } => {
                Precedence::FunctionCallOrArrayIndex
            }
            ExprKind::Cast { .. } => Precedence::As,
            ExprKind::Unop { .. } => Precedence::UnaryOp,
            ExprKind::Binop { op, .. } => op.precedence(),
            ExprKind::Range { .. } => Precedence::Weakest,
        }
    }

    /// Short human-readable node name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            ExprKind::Number { .. } => "number",
            ExprKind::StringLit { .. } => "string",
            ExprKind::NameRef { .. } => "name-ref",
            ExprKind::ColonRef(_) => "colon-ref",
            ExprKind::Attr { .. } => "attr",
            ExprKind::TupleIndex { .. } => "tuple-index",
            ExprKind::Index { .. } => "index",
            ExprKind::Range { .. } => "range",
            ExprKind::Unop { .. } => "unary-op",
            ExprKind::Binop { .. } => "binary-op",
            ExprKind::Cast { .. } => "cast",
            ExprKind::Array { .. } => "array",
            ExprKind::Tuple { .. } => "tuple",
            ExprKind::Invocation { .. } => "invocation",
            ExprKind::Spawn { .. } => "spawn",
            ExprKind::FormatMacro { .. } => "format-macro",
            ExprKind::ZeroMacro { .. } => "zero-macro",
            ExprKind::Match { .. } => "match",
            ExprKind::Conditional(_) => "conditional",
            ExprKind::For(_) => "for",
            ExprKind::UnrollFor(_) => "unroll-for",
            ExprKind::Block(_) => "block",
            ExprKind::StructInstance { .. } => "struct-instance",
            ExprKind::SplatStructInstance { .. } => "splat-struct-instance",
            ExprKind::ChannelDecl { .. } => "channel-decl",
        }
    }
}
