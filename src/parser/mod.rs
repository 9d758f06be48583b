pub mod parser;
pub mod tree;

pub use parser::Parser;
pub use tree::{format_number, render, render_root, Node};
