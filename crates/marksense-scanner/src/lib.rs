//! Markup Scanner
//!
//! Tokenizes HTML-like markup into a stream of typed tokens.
//! The scanner is a resumable state machine: it can start at any offset that
//! begins a new tag, and it never fails. Malformed input is reported as a
//! [`ScanError`] attached to the offending token while scanning carries on
//! until end of stream.
//!
//! # Example
//!
//! ```
//! use marksense_scanner::{Scanner, TokenType};
//!
//! let mut scanner = Scanner::new("<div>");
//! assert_eq!(scanner.scan(), TokenType::StartTagOpen);
//! assert_eq!(scanner.scan(), TokenType::StartTag);
//! assert_eq!(scanner.token_text(), "div");
//! ```

pub mod scanner;
pub mod token;

pub use scanner::{tokenize, Scanner, Tokens};
pub use token::{is_void_element, ScannerState, Span, Token, TokenType, VOID_ELEMENTS};

/// Error code attached to a token produced from malformed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ScanError {
    #[error("Tag name must directly follow the open bracket.")]
    UnexpectedWhitespace,
    #[error("Start tag name expected.")]
    StartTagNameExpected,
    #[error("End tag name expected.")]
    EndTagNameExpected,
    #[error("Closing bracket expected.")]
    ClosingBracketExpected,
    #[error("Unexpected character in tag.")]
    UnexpectedCharacterInTag,
    #[error("Comment is not closed.")]
    UnterminatedComment,
    #[error("Attribute value is missing its closing quote.")]
    UnterminatedAttributeValue,
    #[error("Unexpected character.")]
    UnexpectedCharacter,
}
