//! Value objects - immutable domain primitives

mod cursor_page;

pub use cursor_page::CursorPage;
