//! Type-annotation rendering.

use crate::ast::{ChannelDirection, ColonRef, ColonRefSubject, ExprOrType, TypeAnnotation, TypeKind, TypeRef};
use crate::pretty::{DocArena, DocRef};

use super::comments::Comments;
use super::expr::fmt_expr;
use super::{fmt_join, Joiner};

pub(crate) fn fmt_type_annotation(
    ty: &TypeAnnotation,
    comments: &Comments,
    arena: &mut DocArena,
) -> DocRef {
    match &ty.kind {
        TypeKind::Builtin(name) => arena.text(name.clone()),

        TypeKind::Array { element, dim } => {
            let element = fmt_type_annotation(element, comments, arena);
            let dim = fmt_expr(dim, comments, arena);
            let obracket = arena.obracket();
            let cbracket = arena.cbracket();
            arena.concat_n_group(&[element, obracket, dim, cbracket])
        }

        TypeKind::Tuple(members) => {
            let oparen = arena.oparen();
            let joined = fmt_join(
                members,
                Joiner::CommaSpace,
                |member, comments, arena| fmt_type_annotation(member, comments, arena),
                comments,
                arena,
            );
            let cparen = arena.cparen();
            arena.concat_n_group(&[oparen, joined, cparen])
        }

        TypeKind::Ref { type_ref, parametrics } => {
            let mut pieces = vec![fmt_type_ref(type_ref, comments, arena)];
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
            arena.concat_n_group(&pieces)
        }

        TypeKind::Channel { payload, direction, dims } => {
            let mut pieces = vec![arena.text("chan"), arena.oangle()];
            pieces.push(fmt_type_annotation(payload, comments, arena));
            pieces.push(arena.cangle());
            pieces.push(arena.break1());
            pieces.push(arena.text(match direction {
                ChannelDirection::In => "in",
                ChannelDirection::Out => "out",
            }));
            for dim in dims {
                pieces.push(fmt_expr(dim, comments, arena));
            }
            arena.concat_n_group(&pieces)
        }
    }
}

pub(crate) fn fmt_type_ref(type_ref: &TypeRef, comments: &Comments, arena: &mut DocArena) -> DocRef {
    match type_ref {
        TypeRef::Name(identifier) => arena.text(identifier.clone()),
        TypeRef::ColonRef(colon_ref) => fmt_colon_ref(colon_ref, comments, arena),
    }
}

pub(crate) fn fmt_colon_ref(n: &ColonRef, comments: &Comments, arena: &mut DocArena) -> DocRef {
    let subject = match &n.subject {
        ColonRefSubject::Name(identifier) => arena.text(identifier.clone()),
        ColonRefSubject::ColonRef(inner) => fmt_colon_ref(inner, comments, arena),
    };
    let colon_colon = arena.colon_colon();
    let attr = arena.text(n.attr.clone());
    arena.concat_n_group(&[subject, colon_colon, attr])
}

pub(crate) fn fmt_expr_or_type(n: &ExprOrType, comments: &Comments, arena: &mut DocArena) -> DocRef {
    match n {
        ExprOrType::Expr(e) => fmt_expr(e, comments, arena),
        ExprOrType::Type(t) => fmt_type_annotation(t, comments, arena),
    }
}
