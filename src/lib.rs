//! Auto-formatter core for Ingot, a statically-typed hardware
//! description language.
//!
//! Given a parsed [`ast::Module`], the comment tokens recovered by the
//! lexer, and a text width, [`auto_fmt`] produces the canonical
//! reflowed rendering of the module. The lexer, parser, and file I/O
//! live elsewhere; this crate only turns trees into text.

pub mod ast;
pub mod formatter;
pub mod pretty;
pub mod span;

pub use formatter::auto_fmt;
pub use formatter::comments::{CommentData, Comments};

/// Default target text width, in columns.
pub const DEFAULT_TEXT_WIDTH: usize = 100;
