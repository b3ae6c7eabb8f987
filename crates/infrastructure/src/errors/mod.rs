//! Remote error document parsing.

mod graph_error_parser;

pub use graph_error_parser::GraphErrorParser;
