use crate::ScanError;

/// A half-open byte range `[start, end)` in the scanned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Token classification for markup source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    // Comments: `<!--`, body, `-->`
    StartCommentTag,
    Comment,
    EndCommentTag,

    // Start tags: `<`, name, `>`, `/>`
    StartTagOpen,
    StartTagClose,
    StartTagSelfClose,
    StartTag,

    // End tags: `</`, `>`, name
    EndTagOpen,
    EndTagClose,
    EndTag,

    // Attributes
    DelimiterAssign,
    AttributeName,
    AttributeValue,

    // Doctype: `<!doctype`, body, `>`
    StartDoctypeTag,
    Doctype,
    EndDoctypeTag,

    Content,
    Whitespace,
    Unknown,
    Script,
    Styles,

    /// End of stream. Once returned, every further scan returns it again.
    Eos,
}

/// The scanner's mode, deciding how the next characters are classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScannerState {
    #[default]
    WithinContent,
    AfterOpeningStartTag,
    AfterOpeningEndTag,
    WithinDoctype,
    WithinTag,
    WithinEndTag,
    WithinComment,
    WithinScriptContent,
    WithinStyleContent,
    AfterAttributeName,
    BeforeAttributeValue,
}

/// A token produced by the scanner.
///
/// Tokens borrow their text from the scanned source and are meant to be
/// inspected and dropped; consumers that need to keep data copy it out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenType,
    pub span: Span,
    pub text: &'a str,
    pub error: Option<ScanError>,
    /// Scanner state right after this token was emitted.
    pub state: ScannerState,
}

impl<'a> Token<'a> {
    pub fn offset(&self) -> usize {
        self.span.start
    }

    pub fn end(&self) -> usize {
        self.span.end
    }

    pub fn len(&self) -> usize {
        self.span.len()
    }

    pub fn is_empty(&self) -> bool {
        self.span.is_empty()
    }
}

/// Void elements: never have children and close right after their start tag.
///
/// Kept sorted so membership is a binary search.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "keygen", "link", "menuitem",
    "meta", "param", "source", "track", "wbr",
];

/// Check if a tag name is a void element, ignoring ASCII case.
pub fn is_void_element(tag: &str) -> bool {
    if tag.is_empty() {
        return false;
    }
    let lowered = tag.to_ascii_lowercase();
    VOID_ELEMENTS
        .binary_search_by(|probe| (*probe).cmp(lowered.as_str()))
        .is_ok()
}
