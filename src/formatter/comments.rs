//! Comment bookkeeping for the formatter.
//!
//! The lexer hands over a flat list of comment tokens; the walker needs
//! to answer "which comments lie in this span?" while visiting nodes.
//! Comments are indexed by their start line: the grammar has no
//! multi-line comments, so one line holds at most one comment. A
//! comment's span includes its trailing newline, i.e. the limit is the
//! start of the following line.

use log::trace;
use rustc_hash::FxHashMap;

use crate::ast::{ElseArm, Expr, ExprKind, ExprOrType, IndexRhs, Statement};
use crate::span::{Pos, Span};

/// A single comment token: its source span and its text with the `//`
/// sigil removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentData {
    pub span: Span,
    pub text: String,
}

impl CommentData {
    /// Comment body with surrounding whitespace stripped, ready for
    /// canonical `// <text>` emission.
    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }
}

/// Line-indexed view over all comments in a module.
///
/// If two comments start on the same line the later one overwrites the
/// earlier; the lexer never produces that today.
#[derive(Debug, Default)]
pub struct Comments {
    line_to_comment: FxHashMap<u32, CommentData>,
    last_data_limit: Option<Pos>,
}

impl Comments {
    pub fn new(comments: Vec<CommentData>) -> Self {
        let mut line_to_comment = FxHashMap::default();
        let mut last_data_limit: Option<Pos> = None;
        for cd in comments {
            trace!("comment on line {}: {:?}", cd.span.start.line, cd.text);
            last_data_limit = Some(match last_data_limit {
                Some(limit) => limit.max(cd.span.limit),
                None => cd.span.limit,
            });
            line_to_comment.insert(cd.span.start.line, cd);
        }
        Self { line_to_comment, last_data_limit }
    }

    /// Limit position of the last comment seen, used to flush comments
    /// trailing the final module member.
    pub fn last_data_limit(&self) -> Option<Pos> {
        self.last_data_limit
    }

    /// True iff any comment starts within the lines covered by `span`
    /// (inclusive of the limit line).
    pub fn has_comments(&self, span: Span) -> bool {
        (span.start.line..=span.limit.line).any(|line| self.line_to_comment.contains_key(&line))
    }

    /// All comments on the lines covered by `span`, in ascending line
    /// order.
    pub fn get_comments(&self, span: Span) -> Vec<&CommentData> {
        trace!("get_comments; span: {span}");
        (span.start.line..=span.limit.line)
            .filter_map(|line| self.line_to_comment.get(&line))
            .collect()
    }
}

/// Comments attributable to a node itself: everything in `node_span`
/// except comments that live inside a blocked expression underneath it
/// (those belong to the inner block).
///
/// For example in
///
/// ```text
/// let x = {
///     // belongs to the block, not the let
///     u32:42
/// };
/// ```
///
/// the comment is knocked out when attributing comments to the `let`.
pub fn comments_for_node<'a>(
    comments: &'a Comments,
    node_span: Span,
    blocked_spans: &[Span],
) -> Vec<&'a CommentData> {
    comments
        .get_comments(node_span)
        .into_iter()
        .filter(|cd| !blocked_spans.iter().any(|span| span.contains(&cd.span)))
        .collect()
}

/// Collect the spans of every blocked expression in the tree rooted at
/// `expr`, including `expr` itself. Type annotations are not descended
/// into; their dimension expressions cannot hold blocked constructs.
pub fn collect_blocked_expr_spans(expr: &Expr, out: &mut Vec<Span>) {
    if expr.is_blocked() {
        out.push(expr.span);
    }
    match &expr.kind {
        ExprKind::Number { .. }
        | ExprKind::StringLit { .. }
        | ExprKind::NameRef { .. }
        | ExprKind::ColonRef(_) => {}
        ExprKind::Attr { lhs, .. } => collect_blocked_expr_spans(lhs, out),
        ExprKind::TupleIndex { lhs, index } => {
            collect_blocked_expr_spans(lhs, out);
            collect_blocked_expr_spans(index, out);
        }
        ExprKind::Index { lhs, rhs } => {
            collect_blocked_expr_spans(lhs, out);
            match rhs {
                IndexRhs::Expr(e) => collect_blocked_expr_spans(e, out),
                IndexRhs::Slice { start, limit } => {
                    if let Some(e) = start {
                        collect_blocked_expr_spans(e, out);
                    }
                    if let Some(e) = limit {
                        collect_blocked_expr_spans(e, out);
                    }
                }
                IndexRhs::WidthSlice { start, width } => {
                    collect_blocked_expr_spans(start, out);
                    collect_blocked_expr_spans(width, out);
                }
            }
        }
        ExprKind::Range { start, end } => {
            collect_blocked_expr_spans(start, out);
            collect_blocked_expr_spans(end, out);
        }
        ExprKind::Unop { operand, .. } => collect_blocked_expr_spans(operand, out),
        ExprKind::Binop { lhs, rhs, .. } => {
            collect_blocked_expr_spans(lhs, out);
            collect_blocked_expr_spans(rhs, out);
        }
        ExprKind::Cast { expr, .. } => collect_blocked_expr_spans(expr, out),
        ExprKind::Array { members, .. } | ExprKind::Tuple { members } => {
            for member in members {
                collect_blocked_expr_spans(member, out);
            }
        }
        ExprKind::Invocation { callee, parametrics, args } => {
            collect_blocked_expr_spans(callee, out);
            for p in parametrics {
                if let ExprOrType::Expr(e) = p {
                    collect_blocked_expr_spans(e, out);
                }
            }
            for arg in args {
                collect_blocked_expr_spans(arg, out);
            }
        }
        ExprKind::Spawn { config } => collect_blocked_expr_spans(config, out),
        ExprKind::FormatMacro { args, .. } => {
            for arg in args {
                collect_blocked_expr_spans(arg, out);
            }
        }
        ExprKind::ZeroMacro { type_arg } => {
            if let ExprOrType::Expr(e) = type_arg.as_ref() {
                collect_blocked_expr_spans(e, out);
            }
        }
        ExprKind::Match { matched, arms } => {
            collect_blocked_expr_spans(matched, out);
            for arm in arms {
                collect_blocked_expr_spans(&arm.expr, out);
            }
        }
        ExprKind::Conditional(cond) => {
            collect_blocked_expr_spans(&cond.test, out);
            collect_blocked_stmt_spans(&cond.consequent.statements, out);
            let mut alternate = &cond.alternate;
            loop {
                match alternate {
                    ElseArm::Block(b) => {
                        collect_blocked_stmt_spans(&b.statements, out);
                        break;
                    }
                    ElseArm::ElseIf(c) => {
                        out.push(c.span);
                        collect_blocked_expr_spans(&c.test, out);
                        collect_blocked_stmt_spans(&c.consequent.statements, out);
                        alternate = &c.alternate;
                    }
                }
            }
        }
        ExprKind::For(f) | ExprKind::UnrollFor(f) => {
            collect_blocked_expr_spans(&f.iterable, out);
            collect_blocked_expr_spans(&f.init, out);
            collect_blocked_stmt_spans(&f.body.statements, out);
        }
        ExprKind::Block(b) => collect_blocked_stmt_spans(&b.statements, out),
        ExprKind::StructInstance { members, .. } => {
            for (_, e) in members {
                collect_blocked_expr_spans(e, out);
            }
        }
        ExprKind::SplatStructInstance { members, splatted, .. } => {
            for (_, e) in members {
                collect_blocked_expr_spans(e, out);
            }
            collect_blocked_expr_spans(splatted, out);
        }
        ExprKind::ChannelDecl { fifo_depth, dims, .. } => {
            if let Some(e) = fifo_depth {
                collect_blocked_expr_spans(e, out);
            }
            for dim in dims {
                collect_blocked_expr_spans(dim, out);
            }
        }
    }
}

fn collect_blocked_stmt_spans(statements: &[Statement], out: &mut Vec<Span>) {
    for stmt in statements {
        match stmt {
            Statement::Expr(e) => collect_blocked_expr_spans(e, out),
            Statement::Let(l) => collect_blocked_expr_spans(&l.rhs, out),
            Statement::TypeAlias(_) => {}
            Statement::ConstAssert(c) => collect_blocked_expr_spans(&c.arg, out),
        }
    }
}
