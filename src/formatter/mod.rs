//! AST-to-document translation and the top-level formatting driver.
//!
//! Each syntactic category has a `fmt_*` function that builds documents
//! in the arena; `auto_fmt` ties the walk to the printer. The walk
//! threads the comment index through so each comment is rendered next
//! to the construct it belongs to rather than floating at file scope.

pub mod comments;
pub mod expr;
pub mod types;

use log::trace;

use crate::ast::{
    Block, ConstAssert, ConstantDef, EnumDef, EnumMember, ExprKind, Function, FunctionTag, Import,
    Let, Module, ModuleMember, Param, ParametricBinding, Proc, ProcMember, QuickCheck, Statement,
    StructDef, TestFunction, TestProc, TypeAlias,
};
use crate::pretty::{pretty_print, DocArena, DocRef};
use crate::span::{Pos, Span};

use comments::{collect_blocked_expr_spans, comments_for_node, Comments};
use expr::{fmt_expr, fmt_pattern};
use types::fmt_type_annotation;

/// Formats a parsed module into its canonical text.
///
/// Pure: one arena per call, no I/O, no shared state. The module and
/// comment index only need to outlive the call.
pub fn auto_fmt(module: &Module, comments: &Comments, text_width: usize) -> String {
    let mut arena = DocArena::new();
    let doc = fmt_module(module, comments, &mut arena);
    pretty_print(&arena, doc, text_width)
}

/// Unexpected AST shape: a programmer bug, not a user error. Aborts
/// with the offending node and its source span.
pub(crate) fn invariant_violation(message: impl AsRef<str>, span: Span) -> ! {
    panic!("formatter invariant violated at {span}: {}", message.as_ref());
}

// ══════════════════════════════════════════════════════════════
// Joiners
// ══════════════════════════════════════════════════════════════

/// How consecutive elements of a sequence are separated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Joiner {
    /// `,` + space; no multi-line form.
    CommaSpace,
    /// `,` + soft break.
    CommaBreak1,
    /// Each element grouped together with its delimiter so a sequence
    /// reflows element by element; adds a trailing comma when the
    /// sequence ends up spanning multiple lines.
    CommaBreak1AsGroup,
    /// space + `|` + soft break, for alternative match patterns.
    SpaceBarBreak,
    HardLine,
}

/// Join `items` with the given joiner, eliding it after the last item.
pub(crate) fn fmt_join<T>(
    items: &[T],
    joiner: Joiner,
    mut fmt: impl FnMut(&T, &Comments, &mut DocArena) -> DocRef,
    comments: &Comments,
    arena: &mut DocArena,
) -> DocRef {
    let mut pieces = Vec::new();
    for (i, item) in items.iter().enumerate() {
        let member = fmt(item, comments, arena);
        let last = i + 1 == items.len();
        if !last {
            match joiner {
                Joiner::CommaSpace => {
                    pieces.push(member);
                    pieces.push(arena.comma());
                    pieces.push(arena.space());
                }
                Joiner::CommaBreak1 => {
                    pieces.push(member);
                    pieces.push(arena.comma());
                    pieces.push(arena.break1());
                }
                Joiner::CommaBreak1AsGroup => {
                    let mut this_pieces = Vec::new();
                    if i != 0 {
                        this_pieces.push(arena.break1());
                    }
                    this_pieces.push(member);
                    this_pieces.push(arena.comma());
                    pieces.push(arena.concat_n_group(&this_pieces));
                }
                Joiner::SpaceBarBreak => {
                    pieces.push(member);
                    pieces.push(arena.space());
                    pieces.push(arena.bar());
                    pieces.push(arena.break1());
                }
                Joiner::HardLine => {
                    pieces.push(member);
                    pieces.push(arena.hard_line());
                }
            }
        } else if joiner == Joiner::CommaBreak1AsGroup && i != 0 {
            // A leading break only when the last element is not also
            // the first; in break mode the sequence spans lines, so a
            // trailing comma is allowed.
            let break1 = arena.break1();
            pieces.push(arena.concat_n_group(&[break1, member]));
            let empty = arena.empty();
            let comma = arena.comma();
            pieces.push(arena.flat_choice(empty, comma));
        } else {
            pieces.push(member);
        }
    }
    arena.concat_n(&pieces)
}

// ══════════════════════════════════════════════════════════════
// Comment Emission
// ══════════════════════════════════════════════════════════════

/// Emit the comments lying between two positions, contiguous comment
/// lines kept together and gaps preserved as one blank line. Returns
/// `None` when the range holds no comments; otherwise the doc has no
/// trailing hard line (callers append their own spacing) and
/// `last_comment_span` reports the span of the final comment emitted.
fn emit_comments_between(
    start_pos: Option<Pos>,
    limit_pos: Pos,
    comments: &Comments,
    arena: &mut DocArena,
    last_comment_span: &mut Option<Span>,
) -> Option<DocRef> {
    let start_pos = start_pos.unwrap_or_default();
    debug_assert!(start_pos <= limit_pos);
    let span = Span::new(start_pos, limit_pos);
    trace!("looking for comments in span: {span}");

    let texts: Vec<(Span, String)> = comments
        .get_comments(span)
        .into_iter()
        .map(|cd| (cd.span, cd.trimmed().to_string()))
        .collect();

    let mut pieces = Vec::new();
    let mut previous_comment_span: Option<Span> = None;
    let count = texts.len();
    for (i, (comment_span, text)) in texts.into_iter().enumerate() {
        // Abutting comment lines stay together; a gap becomes one
        // blank line.
        if let Some(previous) = previous_comment_span {
            if previous.start.line + 1 != comment_span.start.line {
                pieces.push(arena.hard_line());
            }
        }

        pieces.push(arena.prefixed_reflow("//", text));

        if i + 1 != count {
            pieces.push(arena.hard_line());
        }

        previous_comment_span = Some(comment_span);
        *last_comment_span = Some(comment_span);
    }

    if pieces.is_empty() {
        None
    } else {
        Some(arena.concat_n(&pieces))
    }
}

// ══════════════════════════════════════════════════════════════
// Statements & Blocks
// ══════════════════════════════════════════════════════════════

/// Format a statement, placing any trailing semicolon inside the
/// statement's own document so a `let`'s inline comment lands after it.
fn fmt_statement(
    n: &Statement,
    comments: &Comments,
    arena: &mut DocArena,
    with_semi: bool,
) -> DocRef {
    let doc = match n {
        Statement::Let(let_stmt) => return fmt_let(let_stmt, comments, arena, with_semi),
        Statement::Expr(e) => fmt_expr(e, comments, arena),
        Statement::TypeAlias(t) => fmt_type_alias(t, comments, arena),
        Statement::ConstAssert(c) => fmt_const_assert(c, comments, arena),
    };
    if with_semi {
        let semi = arena.semi();
        arena.concat(doc, semi)
    } else {
        doc
    }
}

fn fmt_let(n: &Let, comments: &Comments, arena: &mut DocArena, with_semi: bool) -> DocRef {
    let mut leader_pieces = vec![arena.text(if n.is_const { "const" } else { "let" })];
    leader_pieces.push(arena.break1());
    leader_pieces.push(fmt_pattern(&n.name, comments, arena));
    if let Some(ty) = &n.type_annotation {
        leader_pieces.push(arena.colon());
        leader_pieces.push(arena.break1());
        leader_pieces.push(fmt_type_annotation(ty, comments, arena));
    }
    leader_pieces.push(arena.break1());
    leader_pieces.push(arena.equals());
    leader_pieces.push(arena.break1());
    let leader = arena.concat_n_group(&leader_pieces);

    let rhs = fmt_expr(&n.rhs, comments, arena);
    // Blocked expressions and array literals are not aligned to the
    // `=`: that would shove large constructs too far right.
    let body = if n.rhs.is_blocked() || matches!(n.rhs.kind, ExprKind::Array { .. }) {
        rhs
    } else {
        arena.align(rhs)
    };

    let mut syntax = arena.concat(leader, body);
    if with_semi {
        let semi = arena.semi();
        syntax = arena.concat(syntax, semi);
    }

    let mut blocked_spans = Vec::new();
    collect_blocked_expr_spans(&n.rhs, &mut blocked_spans);
    let comment_data = comments_for_node(comments, n.span, &blocked_spans);
    match comment_data.as_slice() {
        [] => syntax,
        [comment] => {
            let comment_text = arena.text(comment.trimmed().to_string());
            let space = arena.space();
            let slash_slash = arena.slash_slash();

            // Flat keeps the comment inline after the binding; broken
            // hoists it onto its own line above.
            let flat = arena.concat_n(&[syntax, space, slash_slash, space, comment_text]);
            let hard_line = arena.hard_line();
            let line_prefixed =
                arena.concat_n(&[slash_slash, space, comment_text, hard_line, syntax]);
            let choice = arena.flat_choice(flat, line_prefixed);
            arena.group(choice)
        }
        _ => invariant_violation("let with multiple inline comments", n.span),
    }
}

/// Block body rendering shared by every curl-introducing construct.
///
/// `add_curls` is false when the caller supplies its own `{`/`}` (as
/// functions and conditionals do); `force_multiline` rules out the
/// single-line form even for one-statement bodies.
pub(crate) fn fmt_block(
    n: &Block,
    comments: &Comments,
    arena: &mut DocArena,
    add_curls: bool,
    force_multiline: bool,
) -> DocRef {
    let has_comments = comments.has_comments(n.span);

    if n.statements.is_empty() && !has_comments {
        if add_curls {
            let ocurl = arena.ocurl();
            let break0 = arena.break0();
            let ccurl = arena.ccurl();
            return arena.concat_n_group(&[ocurl, break0, ccurl]);
        }
        return arena.break0();
    }

    // Only single-statement blocks may flatten; multi-statement blocks
    // always put line breaks between the statements.
    if n.statements.len() == 1 && !force_multiline && !has_comments {
        let mut pieces = Vec::new();
        if add_curls {
            pieces.push(arena.ocurl());
            pieces.push(arena.break1());
        }
        pieces.push(fmt_statement(&n.statements[0], comments, arena, n.trailing_semi));
        if add_curls {
            pieces.push(arena.break1());
            pieces.push(arena.ccurl());
        }
        let body = arena.concat_n_group(&pieces);
        return arena.nest(body);
    }

    let mut top = Vec::new();
    if add_curls {
        top.push(arena.ocurl());
        top.push(arena.hard_line());
    }

    let mut last_entity_pos = n.span.start;
    let mut nested = Vec::new();
    for (i, stmt) in n.statements.iter().enumerate() {
        let stmt_span = stmt.span();
        trace!("stmt start: {} last_entity_pos: {}", stmt_span.start, last_entity_pos);

        let mut last_comment_span = None;
        if let Some(comments_doc) = emit_comments_between(
            Some(last_entity_pos),
            stmt_span.start,
            comments,
            arena,
            &mut last_comment_span,
        ) {
            let comment_span = last_comment_span
                .unwrap_or_else(|| invariant_violation("comment doc without a span", stmt_span));
            // A gap in the source before the comment is kept as one
            // blank line (paragraph style).
            if last_entity_pos.line + 1 < comment_span.start.line {
                nested.push(arena.hard_line());
            }
            nested.push(comments_doc);
            nested.push(arena.hard_line());
            last_entity_pos = comment_span.limit;
        } else {
            // Same paragraph rule between consecutive statements.
            if last_entity_pos.line + 1 < stmt_span.start.line {
                nested.push(arena.hard_line());
            }
            last_entity_pos = stmt_span.limit;
        }

        let last_stmt = i + 1 == n.statements.len();
        nested.push(fmt_statement(stmt, comments, arena, !last_stmt || n.trailing_semi));
        if !last_stmt {
            nested.push(arena.hard_line());
        }
    }

    // Comments between the last statement and the end of the block.
    let mut last_comment_span = None;
    if let Some(comments_doc) = emit_comments_between(
        Some(last_entity_pos),
        n.span.limit,
        comments,
        arena,
        &mut last_comment_span,
    ) {
        if let Some(comment_span) = last_comment_span {
            if last_entity_pos.line + 1 < comment_span.start.line {
                nested.push(arena.hard_line());
            }
        }
        nested.push(arena.hard_line());
        nested.push(comments_doc);
    }

    let nested_doc = arena.concat_n(&nested);
    top.push(arena.nest(nested_doc));
    if add_curls {
        top.push(arena.hard_line());
        top.push(arena.ccurl());
    }

    arena.concat_n_group(&top)
}

// ══════════════════════════════════════════════════════════════
// Items
// ══════════════════════════════════════════════════════════════

/// Parameter list including the surrounding parentheses.
fn fmt_params(params: &[Param], comments: &Comments, arena: &mut DocArena) -> DocRef {
    let mut pieces = vec![arena.oparen()];
    for (i, param) in params.iter().enumerate() {
        let ty = fmt_type_annotation(&param.type_annotation, comments, arena);
        let mut param_pieces = vec![
            arena.text(param.identifier.clone()),
            arena.break0(),
            arena.colon(),
            arena.break1(),
            ty,
        ];
        if i + 1 != params.len() {
            param_pieces.push(arena.comma());
            param_pieces.push(arena.break1());
        }
        pieces.push(arena.concat_n_group(&param_pieces));
    }
    pieces.push(arena.cparen());
    arena.concat_n_group(&pieces)
}

fn fmt_parametric_binding(
    n: &ParametricBinding,
    comments: &Comments,
    arena: &mut DocArena,
) -> DocRef {
    let mut pieces = vec![arena.text(n.identifier.clone()), arena.colon(), arena.break1()];
    pieces.push(fmt_type_annotation(&n.type_annotation, comments, arena));
    if let Some(expr) = &n.expr {
        pieces.push(arena.space());
        pieces.push(arena.equals());
        pieces.push(arena.space());
        pieces.push(arena.ocurl());
        pieces.push(arena.break0());
        let value = fmt_expr(expr, comments, arena);
        pieces.push(arena.nest(value));
        pieces.push(arena.ccurl());
    }
    arena.concat_n_group(&pieces)
}

fn fmt_parametrics(
    bindings: &[ParametricBinding],
    comments: &Comments,
    arena: &mut DocArena,
) -> DocRef {
    let oangle = arena.oangle();
    let joined = fmt_join(
        bindings,
        Joiner::CommaSpace,
        |binding, comments, arena| fmt_parametric_binding(binding, comments, arena),
        comments,
        arena,
    );
    let cangle = arena.cangle();
    arena.concat_n_group(&[oangle, joined, cangle])
}

fn fmt_function(n: &Function, comments: &Comments, arena: &mut DocArena) -> DocRef {
    let mut signature_pieces = Vec::new();
    if n.is_public {
        signature_pieces.push(arena.text("pub"));
        signature_pieces.push(arena.space());
    }
    signature_pieces.push(arena.text("fn"));
    signature_pieces.push(arena.space());
    signature_pieces.push(arena.text(n.identifier.clone()));

    if n.is_parametric() {
        signature_pieces.push(fmt_parametrics(&n.parametric_bindings, comments, arena));
    }

    {
        let mut params_pieces = vec![arena.break0()];
        params_pieces.push(fmt_params(&n.params, comments, arena));

        match &n.return_type {
            None => {
                params_pieces.push(arena.break1());
                params_pieces.push(arena.ocurl());
            }
            Some(return_type) => {
                let break1 = arena.break1();
                let arrow = arena.arrow();
                let break1_after_arrow = arena.break1();
                let ty = fmt_type_annotation(return_type, comments, arena);
                let break1_before_curl = arena.break1();
                let ocurl = arena.ocurl();
                params_pieces.push(arena.concat_n_group(&[
                    break1,
                    arrow,
                    break1_after_arrow,
                    ty,
                    break1_before_curl,
                    ocurl,
                ]));
            }
        }

        let params_doc = arena.concat_n_group(&params_pieces);
        signature_pieces.push(arena.nest(params_doc));
    }

    let signature = arena.concat_n_group(&signature_pieces);
    let body = fmt_block(&n.body, comments, arena, false, false);

    // Empty functions keep the curls abutted.
    if n.body.statements.is_empty() && !comments.has_comments(n.body.span) {
        let ccurl = arena.ccurl();
        return arena.concat_n_group(&[signature, body, ccurl]);
    }

    let break1_before = arena.break1();
    let break1_after = arena.break1();
    let ccurl = arena.ccurl();
    arena.concat_n_group(&[signature, break1_before, body, break1_after, ccurl])
}

fn fmt_proc_member(n: &ProcMember, comments: &Comments, arena: &mut DocArena) -> DocRef {
    let name = arena.text(n.identifier.clone());
    let colon = arena.colon();
    let break1 = arena.break1();
    let ty = fmt_type_annotation(&n.type_annotation, comments, arena);
    arena.concat_n_group(&[name, colon, break1, ty])
}

fn fmt_proc(n: &Proc, comments: &Comments, arena: &mut DocArena) -> DocRef {
    let mut signature_pieces = Vec::new();
    if n.is_public {
        signature_pieces.push(arena.text("pub"));
        signature_pieces.push(arena.space());
    }
    signature_pieces.push(arena.text("proc"));
    signature_pieces.push(arena.space());
    signature_pieces.push(arena.text(n.identifier.clone()));
    if n.is_parametric() {
        signature_pieces.push(fmt_parametrics(&n.parametric_bindings, comments, arena));
    }
    signature_pieces.push(arena.break1());
    signature_pieces.push(arena.ocurl());
    let signature = arena.concat_n_group(&signature_pieces);

    let mut member_pieces = Vec::new();
    for member in &n.members {
        member_pieces.push(fmt_proc_member(member, comments, arena));
        member_pieces.push(arena.semi());
        member_pieces.push(arena.hard_line());
    }
    let members_doc = if member_pieces.is_empty() {
        arena.empty()
    } else {
        let joined = arena.concat_n_group(&member_pieces);
        let nested = arena.nest(joined);
        let hard_line = arena.hard_line();
        arena.concat_n_group(&[nested, hard_line])
    };

    let config_params = fmt_params(&n.config.params, comments, arena);
    let config_body = fmt_block(&n.config.body, comments, arena, false, false);
    let config_pieces = [
        arena.text("config"),
        config_params,
        arena.space(),
        arena.ocurl(),
        arena.break1(),
        config_body,
        arena.break1(),
        arena.ccurl(),
    ];
    let config_doc = arena.concat_n_group(&config_pieces);

    let init_body = fmt_block(&n.init.body, comments, arena, false, false);
    let init_pieces = [
        arena.text("init"),
        arena.space(),
        arena.ocurl(),
        arena.break1(),
        init_body,
        arena.break1(),
        arena.ccurl(),
    ];
    let init_doc = arena.concat_n_group(&init_pieces);

    let next_params = fmt_params(&n.next.params, comments, arena);
    let next_body = fmt_block(&n.next.body, comments, arena, false, false);
    let next_pieces = [
        arena.text("next"),
        next_params,
        arena.space(),
        arena.ocurl(),
        arena.break1(),
        next_body,
        arena.break1(),
        arena.ccurl(),
    ];
    let next_doc = arena.concat_n_group(&next_pieces);

    let config_nested = arena.nest(config_doc);
    let init_nested = arena.nest(init_doc);
    let next_nested = arena.nest(next_doc);

    let proc_pieces = [
        signature,
        arena.hard_line(),
        members_doc,
        config_nested,
        arena.hard_line(),
        arena.hard_line(),
        init_nested,
        arena.hard_line(),
        arena.hard_line(),
        next_nested,
        arena.hard_line(),
        arena.ccurl(),
    ];

    arena.concat_n_group(&proc_pieces)
}

fn fmt_test_function(n: &TestFunction, comments: &Comments, arena: &mut DocArena) -> DocRef {
    let attribute = arena.text("#[test]");
    let hard_line = arena.hard_line();
    let function = fmt_function(&n.function, comments, arena);
    arena.concat_n(&[attribute, hard_line, function])
}

fn fmt_test_proc(n: &TestProc, comments: &Comments, arena: &mut DocArena) -> DocRef {
    let attribute = arena.text("#[test_proc]");
    let hard_line = arena.hard_line();
    let proc = fmt_proc(&n.proc, comments, arena);
    arena.concat_n(&[attribute, hard_line, proc])
}

fn fmt_quickcheck(n: &QuickCheck, comments: &Comments, arena: &mut DocArena) -> DocRef {
    let attribute = arena.text("#[quickcheck]");
    let hard_line = arena.hard_line();
    let function = fmt_function(&n.function, comments, arena);
    arena.concat_n(&[attribute, hard_line, function])
}

fn fmt_struct_def(n: &StructDef, comments: &Comments, arena: &mut DocArena) -> DocRef {
    let mut pieces = Vec::new();
    if n.is_public {
        pieces.push(arena.text("pub"));
        pieces.push(arena.space());
    }
    pieces.push(arena.text("struct"));
    pieces.push(arena.space());
    pieces.push(arena.text(n.identifier.clone()));

    if !n.parametric_bindings.is_empty() {
        pieces.push(arena.oangle());
        pieces.push(fmt_join(
            &n.parametric_bindings,
            Joiner::CommaSpace,
            |binding, comments, arena| fmt_parametric_binding(binding, comments, arena),
            comments,
            arena,
        ));
        pieces.push(arena.cangle());
    }

    pieces.push(arena.space());
    pieces.push(arena.ocurl());

    if !n.members.is_empty() {
        pieces.push(arena.break1());

        let mut body_pieces = Vec::new();
        for (i, member) in n.members.iter().enumerate() {
            body_pieces.push(arena.text(member.identifier.clone()));
            body_pieces.push(arena.colon());
            body_pieces.push(arena.space());
            body_pieces.push(fmt_type_annotation(&member.type_annotation, comments, arena));
            if i + 1 == n.members.len() {
                // Trailing comma only when the members end up broken
                // across lines.
                let empty = arena.empty();
                let comma = arena.comma();
                body_pieces.push(arena.flat_choice(empty, comma));
            } else {
                body_pieces.push(arena.comma());
                body_pieces.push(arena.break1());
            }
        }

        let body = arena.concat_n(&body_pieces);
        pieces.push(arena.nest(body));
        pieces.push(arena.break1());
    }

    pieces.push(arena.ccurl());
    arena.concat_n_group(&pieces)
}

fn fmt_constant_def(n: &ConstantDef, comments: &Comments, arena: &mut DocArena) -> DocRef {
    let mut leader_pieces = Vec::new();
    if n.is_public {
        leader_pieces.push(arena.text("pub"));
        leader_pieces.push(arena.break1());
    }
    leader_pieces.push(arena.text("const"));
    leader_pieces.push(arena.break1());
    leader_pieces.push(arena.text(n.identifier.clone()));
    leader_pieces.push(arena.break1());
    leader_pieces.push(arena.equals());
    leader_pieces.push(arena.space());
    let leader = arena.concat_n_group(&leader_pieces);

    let value = fmt_expr(&n.value, comments, arena);
    let semi = arena.semi();
    arena.concat_n_group(&[leader, value, semi])
}

fn fmt_enum_member(n: &EnumMember, comments: &Comments, arena: &mut DocArena) -> DocRef {
    let name = arena.text(n.identifier.clone());
    let space = arena.space();
    let equals = arena.equals();
    let break1 = arena.break1();
    let value = fmt_expr(&n.value, comments, arena);
    let comma = arena.comma();
    arena.concat_n_group(&[name, space, equals, break1, value, comma])
}

fn fmt_enum_def(n: &EnumDef, comments: &Comments, arena: &mut DocArena) -> DocRef {
    let mut pieces = Vec::new();
    if n.is_public {
        pieces.push(arena.text("pub"));
        pieces.push(arena.space());
    }
    pieces.push(arena.text("enum"));
    pieces.push(arena.space());
    pieces.push(arena.text(n.identifier.clone()));

    pieces.push(arena.space());
    if let Some(ty) = &n.type_annotation {
        pieces.push(arena.colon());
        pieces.push(arena.space());
        pieces.push(fmt_type_annotation(ty, comments, arena));
        pieces.push(arena.space());
    }

    pieces.push(arena.ocurl());
    pieces.push(arena.hard_line());

    let members = fmt_join(
        &n.values,
        Joiner::HardLine,
        |member, comments, arena| fmt_enum_member(member, comments, arena),
        comments,
        arena,
    );
    pieces.push(arena.nest(members));
    pieces.push(arena.hard_line());
    pieces.push(arena.ccurl());
    arena.concat_n(&pieces)
}

fn fmt_type_alias(n: &TypeAlias, comments: &Comments, arena: &mut DocArena) -> DocRef {
    let mut pieces = Vec::new();
    if n.is_public {
        pieces.push(arena.text("pub"));
        pieces.push(arena.space());
    }
    pieces.push(arena.text("type"));
    pieces.push(arena.space());
    pieces.push(arena.text(n.identifier.clone()));
    pieces.push(arena.space());
    pieces.push(arena.equals());
    pieces.push(arena.break1());
    pieces.push(fmt_type_annotation(&n.type_annotation, comments, arena));
    arena.concat_n_group(&pieces)
}

fn fmt_import(n: &Import, _comments: &Comments, arena: &mut DocArena) -> DocRef {
    let mut dotted_pieces = Vec::new();
    for (i, part) in n.subject.iter().enumerate() {
        let part_text = arena.text(part.clone());
        let piece = if i + 1 == n.subject.len() {
            arena.concat_n_group(&[part_text])
        } else {
            let dot = arena.dot();
            let break0 = arena.break0();
            arena.concat_n_group(&[part_text, dot, break0])
        };
        dotted_pieces.push(piece);
    }
    // Aligned so a break after a dot indents to the path's start.
    let dotted = arena.concat_n_group(&dotted_pieces);

    let mut pieces = vec![arena.text("import"), arena.space(), arena.align(dotted)];
    if let Some(alias) = &n.alias {
        pieces.push(arena.break1());
        pieces.push(arena.text("as"));
        pieces.push(arena.break1());
        pieces.push(arena.text(alias.clone()));
    }
    arena.concat_n_group(&pieces)
}

fn fmt_const_assert(n: &ConstAssert, comments: &Comments, arena: &mut DocArena) -> DocRef {
    let leader = arena.text("const_assert!(");
    let arg = fmt_expr(&n.arg, comments, arena);
    let cparen = arena.cparen();
    arena.concat_n_group(&[leader, arg, cparen])
}

// ══════════════════════════════════════════════════════════════
// Module Driver
// ══════════════════════════════════════════════════════════════

fn fmt_module_member(n: &ModuleMember, comments: &Comments, arena: &mut DocArena) -> DocRef {
    match n {
        ModuleMember::Function(f) => fmt_function(f, comments, arena),
        ModuleMember::Proc(p) => fmt_proc(p, comments, arena),
        ModuleMember::TestFunction(t) => fmt_test_function(t, comments, arena),
        ModuleMember::TestProc(t) => fmt_test_proc(t, comments, arena),
        ModuleMember::QuickCheck(q) => fmt_quickcheck(q, comments, arena),
        ModuleMember::TypeAlias(t) => {
            let doc = fmt_type_alias(t, comments, arena);
            let semi = arena.semi();
            arena.concat(doc, semi)
        }
        ModuleMember::StructDef(s) => fmt_struct_def(s, comments, arena),
        ModuleMember::ConstantDef(c) => fmt_constant_def(c, comments, arena),
        ModuleMember::EnumDef(e) => fmt_enum_def(e, comments, arena),
        ModuleMember::Import(i) => fmt_import(i, comments, arena),
        ModuleMember::ConstAssert(c) => {
            let doc = fmt_const_assert(c, comments, arena);
            let semi = arena.semi();
            arena.concat(doc, semi)
        }
    }
}

fn fmt_module(module: &Module, comments: &Comments, arena: &mut DocArena) -> DocRef {
    let mut pieces = Vec::new();
    let mut last_member_pos: Option<Pos> = None;

    // Desugared proc sub-functions render with their proc, not here.
    let members: Vec<&ModuleMember> = module
        .members
        .iter()
        .filter(|member| match member {
            ModuleMember::Function(f) => f.tag == FunctionTag::Normal,
            _ => true,
        })
        .collect();

    for (i, member) in members.iter().enumerate() {
        let member_span = member.span();
        let member_start = member_span.start;
        trace!("module member start: {member_start}");

        if let Some(last) = last_member_pos {
            debug_assert!(member_start >= last, "module members out of source order");
        }

        // Comment blocks between the previous member and this one.
        let mut last_comment_span = None;
        if let Some(comments_doc) = emit_comments_between(
            last_member_pos,
            member_start,
            comments,
            arena,
            &mut last_comment_span,
        ) {
            pieces.push(comments_doc);
            pieces.push(arena.hard_line());

            // A comment that abuts the member belongs to it; otherwise
            // the blank line between them is preserved.
            if let Some(comment_span) = last_comment_span {
                if comment_span.limit.line != member_start.line {
                    pieces.push(arena.hard_line());
                }
            }
        }

        last_member_pos = Some(member_span.limit);

        pieces.push(fmt_module_member(member, comments, arena));
        pieces.push(arena.hard_line());
        if i + 1 != members.len() {
            // Canonical blank separator between members.
            pieces.push(arena.hard_line());
        }
    }

    // Comments trailing the final member.
    if let Some(last_data_limit) = comments.last_data_limit() {
        if last_member_pos.is_none() || last_member_pos < Some(last_data_limit) {
            let mut last_comment_span = None;
            if let Some(comments_doc) = emit_comments_between(
                last_member_pos,
                last_data_limit,
                comments,
                arena,
                &mut last_comment_span,
            ) {
                pieces.push(comments_doc);
                pieces.push(arena.hard_line());
            }
        }
    }

    arena.concat_n(&pieces)
}
