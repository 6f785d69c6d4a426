//! Expression and pattern rendering.
//!
//! Every child in an operator position is parenthesized iff its
//! precedence is strictly weaker than the enclosing operator's;
//! user-written parentheses recorded on the node are re-emitted
//! regardless.

use crate::ast::{
    BinopKind, Conditional, Expr, ExprKind, ElseArm, ForExpr, IndexRhs, MatchArm, Pattern,
    PatternKind, Precedence, TypeRef, weaker_than,
};
use crate::pretty::{DocArena, DocRef};
use crate::span::Span;

use super::comments::Comments;
use super::types::{fmt_colon_ref, fmt_expr_or_type, fmt_type_annotation};
use super::{fmt_block, fmt_join, invariant_violation, Joiner};

pub(crate) fn fmt_expr(n: &Expr, comments: &Comments, arena: &mut DocArena) -> DocRef {
    let result = fmt_expr_inner(n, comments, arena);
    if n.in_parens {
        let oparen = arena.oparen();
        let cparen = arena.cparen();
        arena.concat_n_group(&[oparen, result, cparen])
    } else {
        result
    }
}

/// Format a child expression, parenthesizing when it binds more loosely
/// than the surrounding operator.
fn fmt_parenthesized_if_weaker(
    n: &Expr,
    surrounding: Precedence,
    comments: &Comments,
    arena: &mut DocArena,
) -> DocRef {
    let doc = fmt_expr(n, comments, arena);
    if weaker_than(n.precedence(), surrounding) {
        let oparen = arena.oparen();
        let cparen = arena.cparen();
        arena.concat_n(&[oparen, doc, cparen])
    } else {
        doc
    }
}

fn fmt_expr_inner(n: &Expr, comments: &Comments, arena: &mut DocArena) -> DocRef {
    match &n.kind {
        ExprKind::Number { type_annotation, text } => {
            let num_text = arena.text(text.clone());
            match type_annotation {
                Some(ty) => {
                    let ty = fmt_type_annotation(ty, comments, arena);
                    let colon = arena.colon();
                    let break0 = arena.break0();
                    arena.concat_n_group(&[ty, colon, break0, num_text])
                }
                None => num_text,
            }
        }

        ExprKind::StringLit { text } => arena.text(text.clone()),

        ExprKind::NameRef { identifier } => fmt_name_ref(identifier, n.span, arena),

        ExprKind::ColonRef(colon_ref) => fmt_colon_ref(colon_ref, comments, arena),

        ExprKind::Attr { lhs, attr } => {
            let lhs = fmt_parenthesized_if_weaker(lhs, n.kind.precedence(), comments, arena);
            let dot = arena.dot();
            let attr = arena.text(attr.clone());
            arena.concat_n_group(&[lhs, dot, attr])
        }

        ExprKind::TupleIndex { lhs, index } => {
            let lhs = fmt_parenthesized_if_weaker(lhs, n.kind.precedence(), comments, arena);
            let dot = arena.dot();
            let index = fmt_expr(index, comments, arena);
            arena.concat_n_group(&[lhs, dot, index])
        }

        ExprKind::Index { lhs, rhs } => {
            let lhs = fmt_parenthesized_if_weaker(lhs, n.kind.precedence(), comments, arena);
            let obracket = arena.obracket();
            let rhs = fmt_index_rhs(rhs, comments, arena);
            let cbracket = arena.cbracket();
            arena.concat_n_group(&[lhs, obracket, rhs, cbracket])
        }

        ExprKind::Range { start, end } => {
            let start = fmt_expr(start, comments, arena);
            let end = fmt_expr(end, comments, arena);
            let break0 = arena.break0();
            let dot_dot = arena.dot_dot();
            arena.concat_n_group(&[start, break0, dot_dot, break0, end])
        }

        ExprKind::Unop { op, operand } => {
            let op = arena.text(op.as_str());
            let operand = fmt_parenthesized_if_weaker(operand, n.kind.precedence(), comments, arena);
            arena.concat_n_group(&[op, operand])
        }

        ExprKind::Binop { op, lhs, rhs } => fmt_binop(*op, lhs, rhs, comments, arena),

        ExprKind::Cast { expr, type_annotation } => {
            let lhs = fmt_parenthesized_if_weaker(expr, Precedence::As, comments, arena);
            let space = arena.space();
            let as_kw = arena.text("as");
            let break1 = arena.break1();
            let ty = fmt_type_annotation(type_annotation, comments, arena);
            arena.concat_n_group(&[lhs, space, as_kw, break1, ty])
        }

        ExprKind::Array { type_annotation, members, has_ellipsis } => {
            let mut leader_pieces = Vec::new();
            if let Some(ty) = type_annotation {
                leader_pieces.push(fmt_type_annotation(ty, comments, arena));
                leader_pieces.push(arena.colon());
            }
            leader_pieces.push(arena.obracket());
            let leader = arena.concat_n_group(&leader_pieces);

            let mut member_pieces = vec![fmt_join(
                members,
                Joiner::CommaBreak1AsGroup,
                |member, comments, arena| fmt_expr(member, comments, arena),
                comments,
                arena,
            )];
            if *has_ellipsis {
                // The grouped joiner already adds the trailing comma in
                // break mode, so the ellipsis comma is flat-only.
                let comma = arena.comma();
                let empty = arena.empty();
                member_pieces.push(arena.flat_choice(comma, empty));
                let break1 = arena.break1();
                let ellipsis = arena.text("...");
                member_pieces.push(arena.concat_n_group(&[break1, ellipsis]));
            }
            let members_doc = arena.concat_n_group(&member_pieces);

            let break0 = arena.break0();
            let nested = arena.nest(members_doc);
            let cbracket = arena.cbracket();
            arena.concat_n_group(&[leader, break0, nested, break0, cbracket])
        }

        ExprKind::Tuple { members } => fmt_tuple(members, comments, arena),

        ExprKind::Invocation { callee, parametrics, args } => {
            let mut pieces = vec![fmt_expr(callee, comments, arena)];
            if !parametrics.is_empty() {
                pieces.push(arena.oangle());
                pieces.push(fmt_join(
                    parametrics,
                    Joiner::CommaSpace,
                    |p, comments, arena| fmt_expr_or_type(p, comments, arena),
                    comments,
                    arena,
                ));
                pieces.push(arena.cangle());
            }
            pieces.push(arena.oparen());
            pieces.push(fmt_join(
                args,
                Joiner::CommaSpace,
                |arg, comments, arena| fmt_expr(arg, comments, arena),
                comments,
                arena,
            ));
            pieces.push(arena.cparen());
            arena.concat_n_group(&pieces)
        }

        ExprKind::Spawn { config } => {
            let spawn = arena.text("spawn");
            let space = arena.space();
            let config = fmt_expr(config, comments, arena);
            arena.concat_n_group(&[spawn, space, config])
        }

        ExprKind::FormatMacro { macro_name, format, args } => {
            let mut pieces = vec![
                arena.text(macro_name.clone()),
                arena.oparen(),
                arena.text(format!("\"{format}\"")),
            ];
            if !args.is_empty() {
                pieces.push(arena.comma());
                pieces.push(arena.break1());
                pieces.push(fmt_join(
                    args,
                    Joiner::CommaSpace,
                    |arg, comments, arena| fmt_expr(arg, comments, arena),
                    comments,
                    arena,
                ));
            }
            pieces.push(arena.cparen());
            arena.concat_n_group(&pieces)
        }

        ExprKind::ZeroMacro { type_arg } => {
            let zero = arena.text("zero!");
            let oangle = arena.oangle();
            let ty = fmt_expr_or_type(type_arg, comments, arena);
            let cangle = arena.cangle();
            let oparen = arena.oparen();
            let cparen = arena.cparen();
            arena.concat_n_group(&[zero, oangle, ty, cangle, oparen, cparen])
        }

        ExprKind::Match { matched, arms } => fmt_match(matched, arms, comments, arena),

        ExprKind::Conditional(cond) => fmt_conditional(cond, comments, arena),

        ExprKind::For(f) => fmt_for(f, comments, arena),

        ExprKind::UnrollFor(_) => invariant_violation("unroll-for has no formatting rules", n.span),

        ExprKind::Block(block) => fmt_block(block, comments, arena, true, false),

        ExprKind::StructInstance { struct_ref, members } => {
            let leader = fmt_struct_leader(struct_ref, comments, arena);
            if members.is_empty() {
                let ccurl = arena.ccurl();
                return arena.concat(leader, ccurl);
            }
            let body = fmt_struct_members(members, comments, arena);
            let break1 = arena.break1();
            let nested = arena.nest(body);
            let ccurl = arena.ccurl();
            arena.concat_n_group(&[leader, break1, nested, break1, ccurl])
        }

        ExprKind::SplatStructInstance { struct_ref, members, splatted } => {
            let leader = fmt_struct_leader(struct_ref, comments, arena);
            if members.is_empty() {
                let break1 = arena.break1();
                let dot_dot = arena.dot_dot();
                let splatted = fmt_expr(splatted, comments, arena);
                let ccurl = arena.ccurl();
                return arena.concat_n_group(&[leader, break1, dot_dot, splatted, break1, ccurl]);
            }
            let body = fmt_struct_members(members, comments, arena);
            let break1 = arena.break1();
            let nested = arena.nest(body);
            let comma = arena.comma();
            let dot_dot = arena.dot_dot();
            let splatted = fmt_expr(splatted, comments, arena);
            let ccurl = arena.ccurl();
            arena.concat_n_group(&[leader, break1, nested, comma, break1, dot_dot, splatted, break1, ccurl])
        }

        ExprKind::ChannelDecl { channel_type, fifo_depth, dims } => {
            let mut pieces = vec![arena.text("chan"), arena.oangle()];
            pieces.push(fmt_type_annotation(channel_type, comments, arena));
            if let Some(depth) = fifo_depth {
                pieces.push(arena.comma());
                pieces.push(arena.space());
                pieces.push(fmt_expr(depth, comments, arena));
            }
            pieces.push(arena.cangle());
            for dim in dims {
                pieces.push(fmt_expr(dim, comments, arena));
            }
            arena.concat_n_group(&pieces)
        }
    }
}

/// Spawn sites reference a proc's config sub-function by the internal
/// `Name.config` convention; the suffix is stripped on output. Any
/// other dotted identifier shape is malformed input.
fn fmt_name_ref(identifier: &str, span: Span, arena: &mut DocArena) -> DocRef {
    if let Some(pos) = identifier.find('.') {
        if &identifier[pos..] != ".config" {
            invariant_violation(
                format!("name-ref with unexpected dotted identifier `{identifier}`"),
                span,
            );
        }
        return arena.text(identifier[..pos].to_string());
    }
    arena.text(identifier.to_string())
}

fn fmt_index_rhs(rhs: &IndexRhs, comments: &Comments, arena: &mut DocArena) -> DocRef {
    match rhs {
        IndexRhs::Expr(e) => fmt_expr(e, comments, arena),
        IndexRhs::Slice { start, limit } => {
            let mut pieces = Vec::new();
            if let Some(start) = start {
                pieces.push(fmt_expr(start, comments, arena));
            }
            pieces.push(arena.colon());
            if let Some(limit) = limit {
                pieces.push(fmt_expr(limit, comments, arena));
            }
            arena.concat_n_group(&pieces)
        }
        IndexRhs::WidthSlice { start, width } => {
            let start = fmt_expr(start, comments, arena);
            let break0 = arena.break0();
            let plus_colon = arena.plus_colon();
            let width = fmt_expr(width, comments, arena);
            arena.concat_n_group(&[start, break0, plus_colon, break0, width])
        }
    }
}

fn fmt_binop(
    op: BinopKind,
    lhs: &Expr,
    rhs: &Expr,
    comments: &Comments,
    arena: &mut DocArena,
) -> DocRef {
    let op_precedence = op.precedence();

    // `lhs as T < rhs` is ambiguous with a parametric type instantiation
    // `T<rhs>`, so an unparenthesized cast on the left of `<` gets
    // conservative parens: `(lhs as T) < rhs`.
    let force_lhs_parens = op == BinopKind::Lt
        && matches!(lhs.kind, ExprKind::Cast { .. })
        && !lhs.in_parens;

    let lhs_doc = if force_lhs_parens {
        let inner = fmt_expr(lhs, comments, arena);
        let oparen = arena.oparen();
        let cparen = arena.cparen();
        arena.concat_n(&[oparen, inner, cparen])
    } else {
        fmt_parenthesized_if_weaker(lhs, op_precedence, comments, arena)
    };

    let space = arena.space();
    let op_text = arena.text(op.as_str());
    let lhs_ref = arena.concat_n_group(&[lhs_doc, space, op_text]);

    let rhs_doc = fmt_parenthesized_if_weaker(rhs, op_precedence, comments, arena);
    let rhs_group = arena.group(rhs_doc);

    let break1 = arena.break1();
    arena.concat_n_group(&[lhs_ref, break1, rhs_group])
}

fn fmt_tuple(members: &[Expr], comments: &Comments, arena: &mut DocArena) -> DocRef {
    // 1-element tuples always carry the disambiguating trailing comma
    // and never break.
    if let [only] = members {
        let oparen = arena.oparen();
        let member = fmt_expr(only, comments, arena);
        let comma = arena.comma();
        let cparen = arena.cparen();
        return arena.concat_n_group(&[oparen, member, comma, cparen]);
    }

    let mut pieces = Vec::new();
    for (i, member) in members.iter().enumerate() {
        let last_element = i + 1 == members.len();
        let member_doc = fmt_expr(member, comments, arena);
        let member_group = arena.group(member_doc);
        if last_element {
            pieces.push(member_group);
            let empty = arena.empty();
            let comma = arena.comma();
            pieces.push(arena.flat_choice(empty, comma));
        } else {
            let comma = arena.comma();
            let break1 = arena.break1();
            pieces.push(arena.concat_n_group(&[member_group, comma, break1]));
        }
    }

    let on_flat = arena.concat_n_group(&pieces);
    let body = arena.concat_n_group(&pieces);
    let nested = arena.nest(body);
    let hard_line = arena.hard_line();
    let on_break = arena.concat_n_group(&[hard_line, nested, hard_line]);
    let choice = arena.flat_choice(on_flat, on_break);

    let oparen = arena.oparen();
    let cparen = arena.cparen();
    arena.concat_n_group(&[oparen, choice, cparen])
}

// ── Struct instances ────────────────────────────────────────

/// The `S {` leader, with no spacing after the `{` so an empty instance
/// renders as `S {}`.
fn fmt_struct_leader(struct_ref: &TypeRef, comments: &Comments, arena: &mut DocArena) -> DocRef {
    let name = super::types::fmt_type_ref(struct_ref, comments, arena);
    let break1 = arena.break1();
    let ocurl = arena.ocurl();
    arena.concat_n_group(&[name, break1, ocurl])
}

fn fmt_struct_members(
    members: &[(String, Expr)],
    comments: &Comments,
    arena: &mut DocArena,
) -> DocRef {
    fmt_join(
        members,
        Joiner::CommaBreak1,
        |(name, expr), comments, arena| {
            // `x: x` canonicalizes to the shorthand `x`.
            if let ExprKind::NameRef { identifier } = &expr.kind {
                if identifier == name {
                    return arena.text(name.clone());
                }
            }
            let name = arena.text(name.clone());
            let colon = arena.colon();
            let break1 = arena.break1();
            let value = fmt_expr(expr, comments, arena);
            arena.concat_n_group(&[name, colon, break1, value])
        },
        comments,
        arena,
    )
}

// ── Match ───────────────────────────────────────────────────

fn fmt_match_arm(arm: &MatchArm, comments: &Comments, arena: &mut DocArena) -> DocRef {
    let patterns = fmt_join(
        &arm.patterns,
        Joiner::SpaceBarBreak,
        |pattern, comments, arena| fmt_pattern(pattern, comments, arena),
        comments,
        arena,
    );
    let space = arena.space();
    let fat_arrow = arena.fat_arrow();
    let break1 = arena.break1();
    let expr = fmt_expr(&arm.expr, comments, arena);
    arena.concat_n_group(&[patterns, space, fat_arrow, break1, expr])
}

fn fmt_match(matched: &Expr, arms: &[MatchArm], comments: &Comments, arena: &mut DocArena) -> DocRef {
    let match_kw = arena.text("match");
    let space = arena.space();
    let matched = fmt_expr(matched, comments, arena);
    let ocurl = arena.ocurl();
    let leader = arena.concat_n_group(&[match_kw, space, matched, space, ocurl]);

    let mut pieces = vec![leader, arena.hard_line()];
    for arm in arms {
        let arm_doc = fmt_match_arm(arm, comments, arena);
        pieces.push(arena.nest(arm_doc));
        pieces.push(arena.comma());
        pieces.push(arena.hard_line());
    }
    pieces.push(arena.ccurl());
    arena.concat_n(&pieces)
}

// ── Conditionals ────────────────────────────────────────────

/// The `if <test> {` portion as one group.
fn fmt_conditional_test_group(n: &Conditional, comments: &Comments, arena: &mut DocArena) -> DocRef {
    let if_kw = arena.text("if");
    let break1 = arena.break1();
    let test = fmt_expr(&n.test, comments, arena);
    let ocurl = arena.ocurl();
    arena.concat_n_group(&[if_kw, break1, test, break1, ocurl])
}

/// With an `else if` chain or multi-statement arms the layout is forced
/// multi-line, each closing curl on its own line.
fn fmt_conditional_multiline(n: &Conditional, comments: &Comments, arena: &mut DocArena) -> DocRef {
    let test_group = fmt_conditional_test_group(n, comments, arena);
    let mut pieces = vec![test_group, arena.hard_line()];
    pieces.push(fmt_block(&n.consequent, comments, arena, false, false));
    pieces.push(arena.hard_line());

    let mut alternate = &n.alternate;
    while let ElseArm::ElseIf(elseif) = alternate {
        pieces.push(arena.ccurl());
        pieces.push(arena.space());
        pieces.push(arena.text("else"));
        pieces.push(arena.space());
        pieces.push(fmt_conditional_test_group(elseif, comments, arena));
        pieces.push(arena.hard_line());
        pieces.push(fmt_block(&elseif.consequent, comments, arena, false, false));
        pieces.push(arena.hard_line());
        alternate = &elseif.alternate;
    }

    let ElseArm::Block(else_block) = alternate else {
        unreachable!("else-if chain terminates in a block");
    };
    pieces.push(arena.ccurl());
    pieces.push(arena.space());
    pieces.push(arena.text("else"));
    pieces.push(arena.space());
    pieces.push(arena.ocurl());
    pieces.push(arena.hard_line());
    pieces.push(fmt_block(else_block, comments, arena, false, false));
    pieces.push(arena.hard_line());
    pieces.push(arena.ccurl());

    arena.concat_n(&pieces)
}

fn fmt_conditional(n: &Conditional, comments: &Comments, arena: &mut DocArena) -> DocRef {
    if n.has_else_if() || n.has_multi_statement_blocks() {
        return fmt_conditional_multiline(n, comments, arena);
    }

    let test_group = fmt_conditional_test_group(n, comments, arena);
    let break1 = arena.break1();
    let consequent = fmt_block(&n.consequent, comments, arena, false, false);
    let mut pieces = vec![test_group, break1, consequent, arena.break1()];

    let ElseArm::Block(else_block) = &n.alternate else {
        unreachable!("flat conditional has a plain else block");
    };
    let ccurl = arena.ccurl();
    let b1 = arena.break1();
    let else_kw = arena.text("else");
    let b2 = arena.break1();
    let ocurl = arena.ocurl();
    let b3 = arena.break1();
    pieces.push(arena.concat_n_group(&[ccurl, b1, else_kw, b2, ocurl, b3]));
    pieces.push(fmt_block(else_block, comments, arena, false, false));
    pieces.push(arena.break1());
    pieces.push(arena.ccurl());
    arena.concat_n_group(&pieces)
}

// ── Loops ───────────────────────────────────────────────────

fn fmt_for(n: &ForExpr, comments: &Comments, arena: &mut DocArena) -> DocRef {
    let mut pieces = vec![arena.text("for"), arena.space()];
    pieces.push(fmt_pattern(&n.name, comments, arena));
    if let Some(ty) = &n.type_annotation {
        pieces.push(arena.colon());
        pieces.push(arena.space());
        pieces.push(fmt_type_annotation(ty, comments, arena));
    }
    pieces.push(arena.space());
    pieces.push(arena.text("in"));
    pieces.push(arena.space());
    pieces.push(fmt_expr(&n.iterable, comments, arena));
    pieces.push(arena.space());
    pieces.push(arena.ocurl());
    let leader = arena.concat_n_group(&pieces);

    let body = fmt_block(&n.body, comments, arena, false, true);
    let hard_line = arena.hard_line();
    let ccurl = arena.ccurl();
    let oparen = arena.oparen();
    let init = fmt_expr(&n.init, comments, arena);
    let cparen = arena.cparen();
    let trailer = arena.concat_n(&[hard_line, body, hard_line, ccurl, oparen, init, cparen]);

    arena.concat(leader, trailer)
}

// ── Patterns ────────────────────────────────────────────────

pub(crate) fn fmt_pattern(n: &Pattern, comments: &Comments, arena: &mut DocArena) -> DocRef {
    match &n.kind {
        PatternKind::Name(identifier) | PatternKind::NameRef(identifier) => {
            arena.text(identifier.clone())
        }
        PatternKind::Wildcard => arena.underscore(),
        PatternKind::Literal(expr) => fmt_expr(expr, comments, arena),
        PatternKind::Tuple(elements) => {
            let oparen = arena.oparen();
            let joined = fmt_join(
                elements,
                Joiner::CommaBreak1,
                |element, comments, arena| fmt_pattern(element, comments, arena),
                comments,
                arena,
            );
            let cparen = arena.cparen();
            arena.concat_n_group(&[oparen, joined, cparen])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{
        Block, ColonRef, ColonRefSubject, ExprOrType, TypeAnnotation, TypeKind, UnopKind,
    };
    use crate::pretty::pretty_print;
    use crate::span::Span;

    fn sp() -> Span {
        Span::default()
    }

    fn nref(name: &str) -> Expr {
        Expr::new(ExprKind::NameRef { identifier: name.to_string() }, sp())
    }

    fn num(text: &str) -> Expr {
        Expr::new(ExprKind::Number { type_annotation: None, text: text.to_string() }, sp())
    }

    fn builtin_ty(name: &str) -> TypeAnnotation {
        TypeAnnotation { kind: TypeKind::Builtin(name.to_string()), span: sp() }
    }

    fn typed_num(ty: &str, text: &str) -> Expr {
        Expr::new(
            ExprKind::Number {
                type_annotation: Some(Box::new(builtin_ty(ty))),
                text: text.to_string(),
            },
            sp(),
        )
    }

    fn binop(op: BinopKind, lhs: Expr, rhs: Expr) -> Expr {
        Expr::new(ExprKind::Binop { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }, sp())
    }

    fn tuple(members: Vec<Expr>) -> Expr {
        Expr::new(ExprKind::Tuple { members }, sp())
    }

    fn render(expr: &Expr, width: usize) -> String {
        let comments = Comments::default();
        let mut arena = DocArena::new();
        let doc = fmt_expr(expr, &comments, &mut arena);
        pretty_print(&arena, doc, width)
    }

    #[test]
    fn tuple_renders_flat_when_it_fits() {
        let e = tuple(vec![nref("a"), nref("b"), nref("c")]);
        assert_eq!(render(&e, 100), "(a, b, c)");
    }

    #[test]
    fn tuple_breaks_with_trailing_comma() {
        let e = tuple(vec![nref("a"), nref("b"), nref("c")]);
        assert_eq!(render(&e, 5), "(\n    a,\n    b,\n    c,\n)");
    }

    #[test]
    fn one_tuple_always_gets_trailing_comma_and_never_breaks() {
        let e = tuple(vec![nref("x")]);
        assert_eq!(render(&e, 100), "(x,)");
        assert_eq!(render(&e, 1), "(x,)");
    }

    #[test]
    fn typed_number_is_colon_joined() {
        assert_eq!(render(&typed_num("u32", "42"), 100), "u32:42");
    }

    #[test]
    fn binop_respects_precedence_without_parens() {
        let e = binop(BinopKind::Add, nref("a"), binop(BinopKind::Mul, nref("b"), nref("c")));
        assert_eq!(render(&e, 100), "a + b * c");
    }

    #[test]
    fn weaker_child_is_parenthesized() {
        let e = binop(BinopKind::Mul, binop(BinopKind::Add, nref("a"), nref("b")), nref("c"));
        assert_eq!(render(&e, 100), "(a + b) * c");
    }

    #[test]
    fn user_parens_are_preserved() {
        let mut inner = binop(BinopKind::Add, nref("a"), nref("b"));
        inner.in_parens = true;
        let e = binop(BinopKind::Mul, inner, nref("c"));
        assert_eq!(render(&e, 100), "(a + b) * c");
    }

    #[test]
    fn redundant_user_parens_are_reemitted() {
        let mut e = binop(BinopKind::Mul, nref("a"), nref("b"));
        e.in_parens = true;
        assert_eq!(render(&e, 100), "(a * b)");
    }

    #[test]
    fn cast_on_lhs_of_less_than_is_disambiguated() {
        let cast = Expr::new(
            ExprKind::Cast {
                expr: Box::new(nref("foo")),
                type_annotation: Box::new(builtin_ty("bar")),
            },
            sp(),
        );
        let e = binop(BinopKind::Lt, cast, nref("baz"));
        assert_eq!(render(&e, 100), "(foo as bar) < baz");
    }

    #[test]
    fn cast_on_lhs_of_other_comparisons_is_untouched() {
        let cast = Expr::new(
            ExprKind::Cast {
                expr: Box::new(nref("foo")),
                type_annotation: Box::new(builtin_ty("bar")),
            },
            sp(),
        );
        let e = binop(BinopKind::Gt, cast, nref("baz"));
        assert_eq!(render(&e, 100), "foo as bar > baz");
    }

    #[test]
    fn unop_parenthesizes_weaker_operand() {
        let e = Expr::new(
            ExprKind::Unop {
                op: UnopKind::Negate,
                operand: Box::new(binop(BinopKind::Add, nref("a"), nref("b"))),
            },
            sp(),
        );
        assert_eq!(render(&e, 100), "-(a + b)");
    }

    #[test]
    fn attr_and_tuple_index() {
        let attr = Expr::new(ExprKind::Attr { lhs: Box::new(nref("p")), attr: "x".to_string() }, sp());
        assert_eq!(render(&attr, 100), "p.x");

        let ti = Expr::new(
            ExprKind::TupleIndex { lhs: Box::new(nref("t")), index: Box::new(num("0")) },
            sp(),
        );
        assert_eq!(render(&ti, 100), "t.0");
    }

    #[test]
    fn index_slice_and_width_slice() {
        let index = Expr::new(
            ExprKind::Index { lhs: Box::new(nref("x")), rhs: IndexRhs::Expr(Box::new(num("3"))) },
            sp(),
        );
        assert_eq!(render(&index, 100), "x[3]");

        let slice = Expr::new(
            ExprKind::Index {
                lhs: Box::new(nref("x")),
                rhs: IndexRhs::Slice {
                    start: Some(Box::new(num("1"))),
                    limit: Some(Box::new(num("4"))),
                },
            },
            sp(),
        );
        assert_eq!(render(&slice, 100), "x[1:4]");

        let width_slice = Expr::new(
            ExprKind::Index {
                lhs: Box::new(nref("x")),
                rhs: IndexRhs::WidthSlice { start: Box::new(num("0")), width: Box::new(num("8")) },
            },
            sp(),
        );
        assert_eq!(render(&width_slice, 100), "x[0+:8]");
    }

    #[test]
    fn range_has_no_spaces() {
        let e = Expr::new(
            ExprKind::Range { start: Box::new(num("0")), end: Box::new(num("8")) },
            sp(),
        );
        assert_eq!(render(&e, 100), "0..8");
    }

    #[test]
    fn invocation_with_parametrics() {
        let e = Expr::new(
            ExprKind::Invocation {
                callee: Box::new(nref("f")),
                parametrics: vec![ExprOrType::Type(builtin_ty("u32"))],
                args: vec![nref("a"), nref("b")],
            },
            sp(),
        );
        assert_eq!(render(&e, 100), "f<u32>(a, b)");
    }

    #[test]
    fn spawn_strips_config_suffix() {
        let invocation = Expr::new(
            ExprKind::Invocation {
                callee: Box::new(nref("Worker.config")),
                parametrics: vec![],
                args: vec![nref("ch")],
            },
            sp(),
        );
        let e = Expr::new(ExprKind::Spawn { config: Box::new(invocation) }, sp());
        assert_eq!(render(&e, 100), "spawn Worker(ch)");
    }

    #[test]
    #[should_panic(expected = "formatter invariant violated")]
    fn dotted_name_ref_without_config_suffix_aborts() {
        let e = nref("Worker.frobnicate");
        render(&e, 100);
    }

    #[test]
    #[should_panic(expected = "formatter invariant violated")]
    fn unroll_for_aborts() {
        let body = Block { statements: vec![], trailing_semi: false, span: sp() };
        let e = Expr::new(
            ExprKind::UnrollFor(crate::ast::ForExpr {
                name: Pattern { kind: PatternKind::Name("i".to_string()), span: sp() },
                type_annotation: None,
                iterable: Box::new(num("4")),
                body,
                init: Box::new(num("0")),
            }),
            sp(),
        );
        render(&e, 100);
    }

    #[test]
    fn colon_ref_renders_with_double_colons() {
        let e = Expr::new(
            ExprKind::ColonRef(ColonRef {
                subject: ColonRefSubject::Name("mod_a".to_string()),
                attr: "VALUE".to_string(),
            }),
            sp(),
        );
        assert_eq!(render(&e, 100), "mod_a::VALUE");
    }

    #[test]
    fn array_with_ellipsis_flat() {
        let e = Expr::new(
            ExprKind::Array {
                type_annotation: None,
                members: vec![num("0"), num("0")],
                has_ellipsis: true,
            },
            sp(),
        );
        assert_eq!(render(&e, 100), "[0, 0, ...]");
    }

    #[test]
    fn typed_array_breaks_member_by_member() {
        let e = Expr::new(
            ExprKind::Array {
                type_annotation: None,
                members: vec![nref("aaa"), nref("bbb"), nref("ccc")],
                has_ellipsis: false,
            },
            sp(),
        );
        assert_eq!(render(&e, 8), "[\n    aaa,\n    bbb,\n    ccc,\n]");
    }

    #[test]
    fn struct_instance_uses_field_shorthand() {
        let e = Expr::new(
            ExprKind::StructInstance {
                struct_ref: TypeRef::Name("Point".to_string()),
                members: vec![("x".to_string(), num("1")), ("y".to_string(), nref("y"))],
            },
            sp(),
        );
        assert_eq!(render(&e, 100), "Point { x: 1, y }");
    }

    #[test]
    fn empty_struct_instance_has_no_inner_space() {
        let e = Expr::new(
            ExprKind::StructInstance {
                struct_ref: TypeRef::Name("Empty".to_string()),
                members: vec![],
            },
            sp(),
        );
        assert_eq!(render(&e, 100), "Empty {}");
    }

    #[test]
    fn splat_struct_instance() {
        let e = Expr::new(
            ExprKind::SplatStructInstance {
                struct_ref: TypeRef::Name("Point".to_string()),
                members: vec![("x".to_string(), num("1"))],
                splatted: Box::new(nref("rest")),
            },
            sp(),
        );
        assert_eq!(render(&e, 100), "Point { x: 1, ..rest }");
    }

    #[test]
    fn match_is_always_multiline_with_arm_commas() {
        let arm = |pattern: Pattern, value: Expr| MatchArm {
            patterns: vec![pattern],
            expr: Box::new(value),
            span: sp(),
        };
        let e = Expr::new(
            ExprKind::Match {
                matched: Box::new(nref("x")),
                arms: vec![
                    arm(
                        Pattern { kind: PatternKind::Literal(Box::new(num("0"))), span: sp() },
                        nref("a"),
                    ),
                    arm(Pattern { kind: PatternKind::Wildcard, span: sp() }, nref("b")),
                ],
            },
            sp(),
        );
        assert_eq!(render(&e, 100), "match x {\n    0 => a,\n    _ => b,\n}");
    }

    #[test]
    fn match_arm_alternative_patterns_use_bars() {
        let e = Expr::new(
            ExprKind::Match {
                matched: Box::new(nref("x")),
                arms: vec![MatchArm {
                    patterns: vec![
                        Pattern { kind: PatternKind::Literal(Box::new(num("0"))), span: sp() },
                        Pattern { kind: PatternKind::Literal(Box::new(num("1"))), span: sp() },
                    ],
                    expr: Box::new(nref("low")),
                    span: sp(),
                }],
            },
            sp(),
        );
        assert_eq!(render(&e, 100), "match x {\n    0 | 1 => low,\n}");
    }

    #[test]
    fn conditional_flattens_when_simple() {
        let cond = Conditional {
            test: Box::new(nref("c")),
            consequent: Block {
                statements: vec![crate::ast::Statement::Expr(nref("a"))],
                trailing_semi: false,
                span: sp(),
            },
            alternate: ElseArm::Block(Block {
                statements: vec![crate::ast::Statement::Expr(nref("b"))],
                trailing_semi: false,
                span: sp(),
            }),
            span: sp(),
        };
        let e = Expr::new(ExprKind::Conditional(cond), sp());
        assert_eq!(render(&e, 100), "if c { a } else { b }");
    }

    #[test]
    fn conditional_with_else_if_is_forced_multiline() {
        let single = |value: &str| Block {
            statements: vec![crate::ast::Statement::Expr(nref(value))],
            trailing_semi: false,
            span: sp(),
        };
        let inner = Conditional {
            test: Box::new(nref("b")),
            consequent: single("y"),
            alternate: ElseArm::Block(single("z")),
            span: sp(),
        };
        let cond = Conditional {
            test: Box::new(nref("a")),
            consequent: single("x"),
            alternate: ElseArm::ElseIf(Box::new(inner)),
            span: sp(),
        };
        let e = Expr::new(ExprKind::Conditional(cond), sp());
        assert_eq!(
            render(&e, 100),
            "if a {\n    x\n} else if b {\n    y\n} else {\n    z\n}"
        );
    }

    #[test]
    fn for_loop_renders_init_after_body() {
        let body = Block {
            statements: vec![crate::ast::Statement::Expr(binop(
                BinopKind::Add,
                nref("acc"),
                nref("i"),
            ))],
            trailing_semi: false,
            span: sp(),
        };
        let e = Expr::new(
            ExprKind::For(crate::ast::ForExpr {
                name: Pattern { kind: PatternKind::Name("i".to_string()), span: sp() },
                type_annotation: Some(builtin_ty("u32")),
                iterable: Box::new(Expr::new(
                    ExprKind::Range { start: Box::new(num("0")), end: Box::new(num("8")) },
                    sp(),
                )),
                body,
                init: Box::new(nref("acc")),
            }),
            sp(),
        );
        assert_eq!(render(&e, 100), "for i: u32 in 0..8 {\n    acc + i\n}(acc)");
    }

    #[test]
    fn format_macro_renders_quoted_format_string() {
        let e = Expr::new(
            ExprKind::FormatMacro {
                macro_name: "trace_fmt!".to_string(),
                format: "x is {}".to_string(),
                args: vec![nref("x")],
            },
            sp(),
        );
        assert_eq!(render(&e, 100), "trace_fmt!(\"x is {}\", x)");
    }

    #[test]
    fn zero_macro() {
        let e = Expr::new(
            ExprKind::ZeroMacro { type_arg: Box::new(ExprOrType::Type(builtin_ty("u32"))) },
            sp(),
        );
        assert_eq!(render(&e, 100), "zero!<u32>()");
    }

    #[test]
    fn channel_decl_with_depth() {
        let e = Expr::new(
            ExprKind::ChannelDecl {
                channel_type: Box::new(builtin_ty("u32")),
                fifo_depth: Some(Box::new(num("4"))),
                dims: vec![],
            },
            sp(),
        );
        assert_eq!(render(&e, 100), "chan<u32, 4>");
    }

    #[test]
    fn tuple_pattern() {
        let pattern = Pattern {
            kind: PatternKind::Tuple(vec![
                Pattern { kind: PatternKind::Name("a".to_string()), span: sp() },
                Pattern { kind: PatternKind::Wildcard, span: sp() },
            ]),
            span: sp(),
        };
        let comments = Comments::default();
        let mut arena = DocArena::new();
        let doc = fmt_pattern(&pattern, &comments, &mut arena);
        assert_eq!(pretty_print(&arena, doc, 100), "(a, _)");
    }
}
