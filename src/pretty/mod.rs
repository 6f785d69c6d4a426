//! Document algebra for the auto-formatter.
//!
//! Formatting happens in two stages: the AST walker builds an immutable
//! document tree out of the combinators below, then the printer
//! (`print.rs`) renders the tree deciding flat vs. broken layout at each
//! `Group` boundary. Documents live in an append-only arena and are
//! referred to by copyable handles, so subtrees can be shared freely.

pub mod print;

pub use print::pretty_print;

use rustc_hash::FxHashMap;

/// Handle to a document node in a [`DocArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocRef(u32);

/// A document node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Doc {
    /// Produces no output.
    Empty,
    /// Literal text with its width in Unicode scalar values.
    Text(String, usize),
    /// An unconditional newline; forces every enclosing group to break.
    HardLine,
    /// In flat mode renders as the alternative text; in break mode as a
    /// newline plus indentation. `break0` has alt `""`, `break1` `" "`.
    Break(String),
    Concat(DocRef, DocRef),
    /// Rendered flat if the contents fit the remaining width, broken
    /// otherwise.
    Group(DocRef),
    /// Renders the child with indentation increased by one step.
    Nest(DocRef),
    /// Renders the child with indentation pinned to the current column.
    Align(DocRef),
    /// Picks a child based on the enclosing group's mode.
    FlatChoice { on_flat: DocRef, on_break: DocRef },
    /// A reflowable text block; every physical line in break mode gets
    /// the prefix prepended. Used for comments.
    PrefixedReflow { prefix: String, text: String },
}

/// Number of spaces one `Nest` level adds.
pub const INDENT_STEP: usize = 4;

fn text_width(s: &str) -> usize {
    s.chars().count()
}

/// Owns every document node built during one formatting run.
///
/// Append-only: handles are never invalidated or reused. Text atoms are
/// deduplicated, so the punctuation and keywords the walker requests
/// thousands of times resolve to one node each.
pub struct DocArena {
    docs: Vec<Doc>,
    text_cache: FxHashMap<String, DocRef>,
    empty: DocRef,
    space: DocRef,
    hard_line: DocRef,
    break0: DocRef,
    break1: DocRef,
}

impl DocArena {
    pub fn new() -> Self {
        let mut arena = Self {
            docs: Vec::new(),
            text_cache: FxHashMap::default(),
            empty: DocRef(0),
            space: DocRef(0),
            hard_line: DocRef(0),
            break0: DocRef(0),
            break1: DocRef(0),
        };
        arena.empty = arena.push(Doc::Empty);
        arena.space = arena.text(" ");
        arena.hard_line = arena.push(Doc::HardLine);
        arena.break0 = arena.push(Doc::Break(String::new()));
        arena.break1 = arena.push(Doc::Break(" ".to_string()));
        arena
    }

    fn push(&mut self, doc: Doc) -> DocRef {
        let r = DocRef(self.docs.len() as u32);
        self.docs.push(doc);
        r
    }

    pub fn deref(&self, r: DocRef) -> &Doc {
        &self.docs[r.0 as usize]
    }

    // ── Atoms ───────────────────────────────────────────────

    pub fn empty(&self) -> DocRef {
        self.empty
    }

    pub fn space(&self) -> DocRef {
        self.space
    }

    pub fn hard_line(&self) -> DocRef {
        self.hard_line
    }

    /// Flat: nothing. Break: newline + indent.
    pub fn break0(&self) -> DocRef {
        self.break0
    }

    /// Flat: one space. Break: newline + indent.
    pub fn break1(&self) -> DocRef {
        self.break1
    }

    pub fn comma(&mut self) -> DocRef {
        self.text(",")
    }

    pub fn semi(&mut self) -> DocRef {
        self.text(";")
    }

    pub fn colon(&mut self) -> DocRef {
        self.text(":")
    }

    pub fn dot(&mut self) -> DocRef {
        self.text(".")
    }

    pub fn equals(&mut self) -> DocRef {
        self.text("=")
    }

    pub fn bar(&mut self) -> DocRef {
        self.text("|")
    }

    pub fn underscore(&mut self) -> DocRef {
        self.text("_")
    }

    pub fn oparen(&mut self) -> DocRef {
        self.text("(")
    }

    pub fn cparen(&mut self) -> DocRef {
        self.text(")")
    }

    pub fn ocurl(&mut self) -> DocRef {
        self.text("{")
    }

    pub fn ccurl(&mut self) -> DocRef {
        self.text("}")
    }

    pub fn obracket(&mut self) -> DocRef {
        self.text("[")
    }

    pub fn cbracket(&mut self) -> DocRef {
        self.text("]")
    }

    pub fn oangle(&mut self) -> DocRef {
        self.text("<")
    }

    pub fn cangle(&mut self) -> DocRef {
        self.text(">")
    }

    pub fn arrow(&mut self) -> DocRef {
        self.text("->")
    }

    pub fn fat_arrow(&mut self) -> DocRef {
        self.text("=>")
    }

    pub fn dot_dot(&mut self) -> DocRef {
        self.text("..")
    }

    pub fn colon_colon(&mut self) -> DocRef {
        self.text("::")
    }

    pub fn plus_colon(&mut self) -> DocRef {
        self.text("+:")
    }

    pub fn slash_slash(&mut self) -> DocRef {
        self.text("//")
    }

    // ── Constructors ────────────────────────────────────────

    pub fn text(&mut self, s: impl Into<String>) -> DocRef {
        let s = s.into();
        if let Some(&r) = self.text_cache.get(&s) {
            return r;
        }
        let width = text_width(&s);
        let r = self.push(Doc::Text(s.clone(), width));
        self.text_cache.insert(s, r);
        r
    }

    pub fn concat(&mut self, a: DocRef, b: DocRef) -> DocRef {
        self.push(Doc::Concat(a, b))
    }

    pub fn group(&mut self, d: DocRef) -> DocRef {
        self.push(Doc::Group(d))
    }

    pub fn nest(&mut self, d: DocRef) -> DocRef {
        self.push(Doc::Nest(d))
    }

    pub fn align(&mut self, d: DocRef) -> DocRef {
        self.push(Doc::Align(d))
    }

    pub fn flat_choice(&mut self, on_flat: DocRef, on_break: DocRef) -> DocRef {
        self.push(Doc::FlatChoice { on_flat, on_break })
    }

    pub fn prefixed_reflow(&mut self, prefix: impl Into<String>, text: impl Into<String>) -> DocRef {
        self.push(Doc::PrefixedReflow { prefix: prefix.into(), text: text.into() })
    }

    /// N-ary concatenation, left-associated. Empty input yields `Empty`.
    pub fn concat_n(&mut self, parts: &[DocRef]) -> DocRef {
        match parts {
            [] => self.empty,
            [only] => *only,
            [first, rest @ ..] => {
                let mut acc = *first;
                for &part in rest {
                    acc = self.concat(acc, part);
                }
                acc
            }
        }
    }

    /// N-ary concatenation wrapped in a single group.
    pub fn concat_n_group(&mut self, parts: &[DocRef]) -> DocRef {
        let body = self.concat_n(parts);
        self.group(body)
    }
}

impl Default for DocArena {
    fn default() -> Self {
        Self::new()
    }
}
