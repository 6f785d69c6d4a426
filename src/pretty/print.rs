//! Renderer for the document algebra.
//!
//! Stack-driven: each work item carries the indentation and mode (flat
//! or broken) it was scheduled under. At every `Group` met in break
//! mode the renderer measures whether the group's flat layout fits the
//! remainder of the line and commits to one mode for the whole group;
//! a `HardLine` anywhere inside makes the flat layout unfit.
//!
//! Indentation is written lazily: newlines are emitted immediately, the
//! indent spaces only when visible text next lands on the line. Blank
//! lines therefore never carry trailing whitespace.

use log::trace;

use super::{Doc, DocArena, DocRef, INDENT_STEP};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Flat,
    Break,
}

#[derive(Debug)]
struct PrintCmd {
    indent: usize,
    mode: Mode,
    doc: DocRef,
}

/// Render `root` into a string, fitting lines within `text_width`
/// columns wherever the grammar of the document permits a break. Width
/// is a soft constraint: content whose minimal layout already exceeds
/// the width is emitted anyway.
pub fn pretty_print(arena: &DocArena, root: DocRef, text_width: usize) -> String {
    let mut printer = Printer {
        out: String::new(),
        col: 0,
        at_line_start: true,
        text_width,
    };
    printer.run(arena, root);
    printer.out
}

struct Printer {
    out: String,
    /// Column the next character lands on; only meaningful when not at
    /// a line start (pending indent is resolved at flush time).
    col: usize,
    at_line_start: bool,
    text_width: usize,
}

impl Printer {
    /// Column where the next character of an item scheduled at `indent`
    /// would land.
    fn effective_col(&self, indent: usize) -> usize {
        if self.at_line_start {
            indent
        } else {
            self.col
        }
    }

    /// Write the pending indentation if a visible item at `indent` is
    /// about to start the line.
    fn flush_indent(&mut self, indent: usize) {
        if self.at_line_start {
            for _ in 0..indent {
                self.out.push(' ');
            }
            self.col = indent;
            self.at_line_start = false;
        }
    }

    fn newline(&mut self) {
        self.out.push('\n');
        self.at_line_start = true;
        self.col = 0;
    }

    fn run(&mut self, arena: &DocArena, root: DocRef) {
        let mut stack = vec![PrintCmd { indent: 0, mode: Mode::Break, doc: root }];

        while let Some(cmd) = stack.pop() {
            match arena.deref(cmd.doc) {
                Doc::Empty => {}

                Doc::Text(s, width) => {
                    self.flush_indent(cmd.indent);
                    self.out.push_str(s);
                    self.col += width;
                }

                Doc::HardLine => self.newline(),

                Doc::Break(alt) => match cmd.mode {
                    Mode::Flat => {
                        if !alt.is_empty() {
                            self.flush_indent(cmd.indent);
                            self.out.push_str(alt);
                            self.col += alt.chars().count();
                        }
                    }
                    Mode::Break => self.newline(),
                },

                Doc::Concat(a, b) => {
                    stack.push(PrintCmd { indent: cmd.indent, mode: cmd.mode, doc: *b });
                    stack.push(PrintCmd { indent: cmd.indent, mode: cmd.mode, doc: *a });
                }

                Doc::Nest(d) => {
                    stack.push(PrintCmd {
                        indent: cmd.indent + INDENT_STEP,
                        mode: cmd.mode,
                        doc: *d,
                    });
                }

                Doc::Align(d) => {
                    let col = self.effective_col(cmd.indent);
                    stack.push(PrintCmd { indent: col, mode: cmd.mode, doc: *d });
                }

                Doc::Group(d) => {
                    let mode = match cmd.mode {
                        // Inside a flat rendering everything stays flat.
                        Mode::Flat => Mode::Flat,
                        Mode::Break => {
                            let col = self.effective_col(cmd.indent);
                            if fits(arena, *d, self.text_width as isize - col as isize) {
                                Mode::Flat
                            } else {
                                Mode::Break
                            }
                        }
                    };
                    trace!("group at col {} -> {mode:?}", self.effective_col(cmd.indent));
                    stack.push(PrintCmd { indent: cmd.indent, mode, doc: *d });
                }

                Doc::FlatChoice { on_flat, on_break } => {
                    let chosen = match cmd.mode {
                        Mode::Flat => *on_flat,
                        Mode::Break => *on_break,
                    };
                    stack.push(PrintCmd { indent: cmd.indent, mode: cmd.mode, doc: chosen });
                }

                Doc::PrefixedReflow { prefix, text } => match cmd.mode {
                    Mode::Flat => {
                        self.flush_indent(cmd.indent);
                        self.out.push_str(prefix);
                        self.col += prefix.chars().count();
                        if !text.is_empty() {
                            self.out.push(' ');
                            self.out.push_str(text);
                            self.col += 1 + text.chars().count();
                        }
                    }
                    Mode::Break => self.reflow(prefix, text, cmd.indent),
                },
            }
        }
    }

    /// Greedy word-wrap of `text` into `prefix `-led physical lines.
    fn reflow(&mut self, prefix: &str, text: &str, indent: usize) {
        let prefix_width = prefix.chars().count();
        // Budget for the words themselves, past `prefix `.
        let avail = self.text_width.saturating_sub(indent + prefix_width + 1);
        let mut emitted_any = false;
        let mut line_width = 0usize;
        let mut line_empty = true;
        for word in text.split_whitespace() {
            let word_width = word.chars().count();
            if !line_empty && line_width + 1 + word_width > avail {
                self.newline();
                line_width = 0;
                line_empty = true;
            }
            if line_empty {
                self.flush_indent(indent);
                self.out.push_str(prefix);
                self.out.push(' ');
                self.col += prefix_width + 1;
                line_empty = false;
            } else {
                self.out.push(' ');
                line_width += 1;
                self.col += 1;
            }
            self.out.push_str(word);
            line_width += word_width;
            self.col += word_width;
            emitted_any = true;
        }
        if !emitted_any {
            // Comment with an empty body: just the prefix.
            self.flush_indent(indent);
            self.out.push_str(prefix);
            self.col += prefix_width;
        }
    }
}

/// Flat-layout measurement for a group body: scan in flat mode and
/// report whether everything fits within `budget` columns. A hard line
/// (or a reflow block that already contains newlines) can never fit.
fn fits(arena: &DocArena, doc: DocRef, mut budget: isize) -> bool {
    let mut stack = vec![doc];
    while let Some(d) = stack.pop() {
        if budget < 0 {
            return false;
        }
        match arena.deref(d) {
            Doc::Empty => {}
            Doc::Text(_, width) => budget -= *width as isize,
            Doc::HardLine => return false,
            Doc::Break(alt) => budget -= alt.chars().count() as isize,
            Doc::Concat(a, b) => {
                stack.push(*b);
                stack.push(*a);
            }
            Doc::Nest(d) | Doc::Align(d) | Doc::Group(d) => stack.push(*d),
            Doc::FlatChoice { on_flat, .. } => stack.push(*on_flat),
            Doc::PrefixedReflow { prefix, text } => {
                if text.contains('\n') {
                    return false;
                }
                budget -= (prefix.chars().count() + 1 + text.chars().count()) as isize;
            }
        }
    }
    budget >= 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pretty::DocArena;

    fn render(arena: &DocArena, doc: DocRef, width: usize) -> String {
        pretty_print(arena, doc, width)
    }

    #[test]
    fn group_that_fits_renders_flat() {
        let mut arena = DocArena::new();
        let a = arena.text("a");
        let b = arena.text("b");
        let br = arena.break1();
        let doc = arena.concat_n_group(&[a, br, b]);
        assert_eq!(render(&arena, doc, 100), "a b");
    }

    #[test]
    fn group_that_exceeds_width_breaks() {
        let mut arena = DocArena::new();
        let a = arena.text("hello");
        let b = arena.text("world");
        let br = arena.break1();
        let doc = arena.concat_n_group(&[a, br, b]);
        assert_eq!(render(&arena, doc, 8), "hello\nworld");
    }

    #[test]
    fn break0_vanishes_when_flat() {
        let mut arena = DocArena::new();
        let a = arena.text("a");
        let b = arena.text("b");
        let br = arena.break0();
        let doc = arena.concat_n_group(&[a, br, b]);
        assert_eq!(render(&arena, doc, 100), "ab");
        assert_eq!(render(&arena, doc, 1), "a\nb");
    }

    #[test]
    fn hard_line_forces_enclosing_group_to_break() {
        let mut arena = DocArena::new();
        let a = arena.text("a");
        let b = arena.text("b");
        let hl = arena.hard_line();
        let br = arena.break1();
        // Plenty of width, but the hard line makes the flat trial unfit.
        let doc = arena.concat_n_group(&[a, hl, b, br, b]);
        assert_eq!(render(&arena, doc, 100), "a\nb\nb");
    }

    #[test]
    fn nest_indents_by_four() {
        let mut arena = DocArena::new();
        let open = arena.text("{");
        let stmt = arena.text("stmt");
        let close = arena.text("}");
        let hl = arena.hard_line();
        let inner = arena.concat_n(&[hl, stmt]);
        let nested = arena.nest(inner);
        let doc = arena.concat_n(&[open, nested, hl, close]);
        assert_eq!(render(&arena, doc, 100), "{\n    stmt\n}");
    }

    #[test]
    fn align_pins_to_current_column() {
        let mut arena = DocArena::new();
        let lead = arena.text("name = ");
        let a = arena.text("aaa");
        let b = arena.text("bbb");
        let br = arena.break1();
        let body = arena.concat_n_group(&[a, br, b]);
        let aligned = arena.align(body);
        let doc = arena.concat(lead, aligned);
        assert_eq!(render(&arena, doc, 9), "name = aaa\n       bbb");
    }

    #[test]
    fn flat_choice_selects_by_mode() {
        let mut arena = DocArena::new();
        let flat = arena.text("<flat>");
        let broken = arena.text("<broken>");
        let choice = arena.flat_choice(flat, broken);
        let filler = arena.text("xxxxxxxxxx");
        let br = arena.break1();
        let doc = arena.concat_n_group(&[filler, br, choice]);
        assert_eq!(render(&arena, doc, 80), "xxxxxxxxxx <flat>");
        assert_eq!(render(&arena, doc, 4), "xxxxxxxxxx\n<broken>");
    }

    #[test]
    fn nested_group_can_stay_flat_inside_broken_outer() {
        let mut arena = DocArena::new();
        let long = arena.text("aaaaaaaaaa");
        let short_a = arena.text("b");
        let short_b = arena.text("c");
        let br = arena.break1();
        let inner = arena.concat_n_group(&[short_a, br, short_b]);
        let doc = arena.concat_n_group(&[long, br, inner]);
        // Outer breaks (10 + 1 + 3 > 12) but "b c" fits on its own line.
        assert_eq!(render(&arena, doc, 12), "aaaaaaaaaa\nb c");
    }

    #[test]
    fn overlong_text_is_emitted_anyway() {
        let mut arena = DocArena::new();
        let t = arena.text("only_sixteen_col");
        let doc = arena.group(t);
        assert_eq!(render(&arena, doc, 4), "only_sixteen_col");
    }

    #[test]
    fn blank_line_inside_nest_has_no_trailing_whitespace() {
        let mut arena = DocArena::new();
        let open = arena.text("{");
        let a = arena.text("a");
        let b = arena.text("b");
        let close = arena.text("}");
        let hl = arena.hard_line();
        let inner = arena.concat_n(&[hl, a, hl, hl, b]);
        let nested = arena.nest(inner);
        let doc = arena.concat_n(&[open, nested, hl, close]);
        assert_eq!(render(&arena, doc, 100), "{\n    a\n\n    b\n}");
    }

    #[test]
    fn prefixed_reflow_flat_is_single_line() {
        let mut arena = DocArena::new();
        let doc = arena.prefixed_reflow("//", "note to self");
        // Flat mode requires an enclosing fitting group.
        let grouped = arena.group(doc);
        assert_eq!(render(&arena, grouped, 80), "// note to self");
    }

    #[test]
    fn prefixed_reflow_breaks_into_prefixed_lines() {
        let mut arena = DocArena::new();
        let doc = arena.prefixed_reflow("//", "one two three four five six");
        assert_eq!(
            render(&arena, doc, 14),
            "// one two\n// three four\n// five six"
        );
    }

    #[test]
    fn prefixed_reflow_indents_continuation_lines() {
        let mut arena = DocArena::new();
        let reflow = arena.prefixed_reflow("//", "alpha beta gamma");
        let open = arena.text("{");
        let close = arena.text("}");
        let hl = arena.hard_line();
        let inner = arena.concat_n(&[hl, reflow]);
        let nested = arena.nest(inner);
        let doc = arena.concat_n(&[open, nested, hl, close]);
        assert_eq!(
            render(&arena, doc, 14),
            "{\n    // alpha\n    // beta\n    // gamma\n}"
        );
    }

    #[test]
    fn prefixed_reflow_with_empty_body_is_bare_prefix() {
        let mut arena = DocArena::new();
        let doc = arena.prefixed_reflow("//", "");
        assert_eq!(render(&arena, doc, 80), "//");
    }

    #[test]
    fn unicode_text_is_measured_in_scalar_values() {
        let mut arena = DocArena::new();
        // Five scalar values wide, more bytes than that in UTF-8.
        let a = arena.text("héllö");
        let b = arena.text("wörld");
        let br = arena.break1();
        let doc = arena.concat_n_group(&[a, br, b]);
        assert_eq!(render(&arena, doc, 11), "héllö wörld");
        assert_eq!(render(&arena, doc, 10), "héllö\nwörld");
    }

    #[test]
    fn empty_document_renders_nothing() {
        let arena = DocArena::new();
        let doc = arena.empty();
        assert_eq!(render(&arena, doc, 80), "");
    }
}
