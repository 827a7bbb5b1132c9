//! Markup Parser
//!
//! Builds a tolerant element tree from a single scanner pass. Nodes carry
//! byte ranges (element start, end, and end-tag start) which editor features
//! use to locate the element under a cursor.
//!
//! Parsing never fails; see [`Parser`] for how broken markup is handled.
//!
//! ```
//! use marksense_parser::Parser;
//!
//! let doc = Parser::parse("<div><span></span></div>");
//! let span = doc.find_node_at(8).unwrap();
//! assert_eq!(doc.node(span).tag, "span");
//! ```

pub mod ast;
pub mod parser;

pub use ast::{HtmlDocument, Node, NodeId};
pub use parser::Parser;
