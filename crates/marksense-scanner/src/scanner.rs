use std::iter::FusedIterator;

use tracing::{debug, trace};

use crate::token::{ScannerState, Span, Token, TokenType};
use crate::ScanError;

/// `<script type="...">` values whose body is markup rather than script.
const HTML_SCRIPT_TYPES: &[&str] = &["text/x-handlebars-template"];

/// Escaping levels inside a `<script>` body, after the HTML script-data rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScriptEscape {
    Data,
    Escaped,
    DoubleEscaped,
}

/// Markers that change the escaping level inside a `<script>` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScriptMarker {
    CommentOpen,
    CommentClose,
    ScriptOpen,
    ScriptClose,
}

/// Markup source scanner.
///
/// Pull-based: each call to [`Scanner::scan`] classifies the next token and
/// exposes it through the `token_*` accessors. [`Scanner::tokens`] turns it
/// into an iterator of [`Token`] values up to and including the final
/// [`TokenType::Eos`].
///
/// - Byte offsets into the source, always on `char` boundaries
/// - State machine over [`ScannerState`], no recursion
/// - Every call advances at least one character until end of stream
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    source: &'a str,
    pos: usize,
    state: ScannerState,
    token_type: TokenType,
    token_offset: usize,
    token_error: Option<ScanError>,
    has_space_after_tag: bool,
    last_tag: &'a str,
    last_attribute_name: Option<&'a str>,
    last_type_value: Option<&'a str>,
}

impl<'a> Scanner<'a> {
    /// Create a new scanner at the start of the source.
    pub fn new(source: &'a str) -> Self {
        Self::with_offset(source, 0)
    }

    /// Create a scanner that resumes at `offset`, in content mode.
    ///
    /// The offset must begin a new tag (or content); resuming inside a tag is
    /// not supported. Offsets past the end are clamped, and an offset inside a
    /// multi-byte character moves forward to the next character boundary.
    pub fn with_offset(source: &'a str, offset: usize) -> Self {
        let mut pos = offset.min(source.len());
        while !source.is_char_boundary(pos) {
            pos += 1;
        }
        Self {
            source,
            pos,
            state: ScannerState::WithinContent,
            token_type: TokenType::Unknown,
            token_offset: pos,
            token_error: None,
            has_space_after_tag: false,
            last_tag: "",
            last_attribute_name: None,
            last_type_value: None,
        }
    }

    /// Advance to the next token and return its type.
    pub fn scan(&mut self) -> TokenType {
        let offset = self.pos;
        let old_state = self.state;
        let token = self.internal_scan();
        if token != TokenType::Eos && offset == self.pos {
            debug!(
                offset,
                ?old_state,
                state = ?self.state,
                "scanner did not advance, skipping one character"
            );
            self.advance_char();
            return self.finish_token(
                offset,
                TokenType::Unknown,
                Some(ScanError::UnexpectedCharacter),
            );
        }
        trace!(
            kind = ?token,
            offset = self.token_offset,
            end = self.pos,
            error = ?self.token_error,
            "token"
        );
        token
    }

    pub fn token_type(&self) -> TokenType {
        self.token_type
    }

    pub fn token_offset(&self) -> usize {
        self.token_offset
    }

    pub fn token_length(&self) -> usize {
        self.pos - self.token_offset
    }

    pub fn token_end(&self) -> usize {
        self.pos
    }

    pub fn token_text(&self) -> &'a str {
        &self.source[self.token_offset..self.pos]
    }

    pub fn token_error(&self) -> Option<ScanError> {
        self.token_error
    }

    /// The scanner state after the current token.
    pub fn state(&self) -> ScannerState {
        self.state
    }

    /// Snapshot of the current token.
    pub fn token(&self) -> Token<'a> {
        Token {
            kind: self.token_type,
            span: Span::new(self.token_offset, self.pos),
            text: self.token_text(),
            error: self.token_error,
            state: self.state,
        }
    }

    /// Iterate over the remaining tokens.
    pub fn tokens(self) -> Tokens<'a> {
        Tokens {
            scanner: self,
            finished: false,
        }
    }

    fn finish_token(
        &mut self,
        offset: usize,
        kind: TokenType,
        error: Option<ScanError>,
    ) -> TokenType {
        self.token_type = kind;
        self.token_offset = offset;
        self.token_error = error;
        kind
    }

    fn internal_scan(&mut self) -> TokenType {
        loop {
            let offset = self.pos;
            if self.is_at_end() {
                return self.finish_token(offset, TokenType::Eos, None);
            }

            match self.state {
                ScannerState::WithinComment => {
                    if self.advance_if("-->") {
                        self.state = ScannerState::WithinContent;
                        return self.finish_token(offset, TokenType::EndCommentTag, None);
                    }
                    let terminated = self.advance_until("-->");
                    let error = (!terminated).then_some(ScanError::UnterminatedComment);
                    return self.finish_token(offset, TokenType::Comment, error);
                }

                ScannerState::WithinDoctype => {
                    if self.advance_if(">") {
                        self.state = ScannerState::WithinContent;
                        return self.finish_token(offset, TokenType::EndDoctypeTag, None);
                    }
                    self.advance_until_char('>');
                    return self.finish_token(offset, TokenType::Doctype, None);
                }

                ScannerState::WithinContent => {
                    if self.advance_if("<") {
                        if self.peek() == Some('!') {
                            if self.advance_if("!--") {
                                self.state = ScannerState::WithinComment;
                                // `<!--` right at the end has no body to carry the error
                                let error =
                                    self.is_at_end().then_some(ScanError::UnterminatedComment);
                                return self.finish_token(offset, TokenType::StartCommentTag, error);
                            }
                            if self.advance_if_ignore_case("!doctype") {
                                self.state = ScannerState::WithinDoctype;
                                return self.finish_token(offset, TokenType::StartDoctypeTag, None);
                            }
                        }
                        if self.advance_if("/") {
                            self.state = ScannerState::AfterOpeningEndTag;
                            return self.finish_token(offset, TokenType::EndTagOpen, None);
                        }
                        self.state = ScannerState::AfterOpeningStartTag;
                        return self.finish_token(offset, TokenType::StartTagOpen, None);
                    }
                    self.advance_until_char('<');
                    return self.finish_token(offset, TokenType::Content, None);
                }

                ScannerState::AfterOpeningEndTag => {
                    if !self.next_element_name().is_empty() {
                        self.state = ScannerState::WithinEndTag;
                        return self.finish_token(offset, TokenType::EndTag, None);
                    }
                    if self.skip_whitespace() {
                        return self.finish_token(
                            offset,
                            TokenType::Whitespace,
                            Some(ScanError::UnexpectedWhitespace),
                        );
                    }
                    self.state = ScannerState::WithinEndTag;
                    self.advance_until_char('>');
                    if offset < self.pos {
                        return self.finish_token(
                            offset,
                            TokenType::Unknown,
                            Some(ScanError::EndTagNameExpected),
                        );
                    }
                }

                ScannerState::WithinEndTag => {
                    if self.skip_whitespace() {
                        return self.finish_token(offset, TokenType::Whitespace, None);
                    }
                    if self.advance_if(">") {
                        self.state = ScannerState::WithinContent;
                        return self.finish_token(offset, TokenType::EndTagClose, None);
                    }
                    self.advance_char();
                    self.state = ScannerState::WithinContent;
                    return self.finish_token(
                        offset,
                        TokenType::Unknown,
                        Some(ScanError::ClosingBracketExpected),
                    );
                }

                ScannerState::AfterOpeningStartTag => {
                    self.last_tag = self.next_element_name();
                    self.last_type_value = None;
                    self.last_attribute_name = None;
                    if !self.last_tag.is_empty() {
                        self.has_space_after_tag = false;
                        self.state = ScannerState::WithinTag;
                        return self.finish_token(offset, TokenType::StartTag, None);
                    }
                    if self.skip_whitespace() {
                        return self.finish_token(
                            offset,
                            TokenType::Whitespace,
                            Some(ScanError::UnexpectedWhitespace),
                        );
                    }
                    self.state = ScannerState::WithinTag;
                    self.advance_until_char('>');
                    if offset < self.pos {
                        return self.finish_token(
                            offset,
                            TokenType::Unknown,
                            Some(ScanError::StartTagNameExpected),
                        );
                    }
                }

                ScannerState::WithinTag => {
                    if self.skip_whitespace() {
                        self.has_space_after_tag = true;
                        return self.finish_token(offset, TokenType::Whitespace, None);
                    }
                    if self.has_space_after_tag {
                        let name = self.next_attribute_name();
                        if !name.is_empty() {
                            self.last_attribute_name = Some(name);
                            self.state = ScannerState::AfterAttributeName;
                            self.has_space_after_tag = false;
                            return self.finish_token(offset, TokenType::AttributeName, None);
                        }
                    }
                    if self.advance_if("/>") {
                        self.state = ScannerState::WithinContent;
                        return self.finish_token(offset, TokenType::StartTagSelfClose, None);
                    }
                    if self.advance_if(">") {
                        self.state = self.state_after_start_tag();
                        return self.finish_token(offset, TokenType::StartTagClose, None);
                    }
                    self.advance_char();
                    return self.finish_token(
                        offset,
                        TokenType::Unknown,
                        Some(ScanError::UnexpectedCharacterInTag),
                    );
                }

                ScannerState::AfterAttributeName => {
                    if self.skip_whitespace() {
                        self.has_space_after_tag = true;
                        return self.finish_token(offset, TokenType::Whitespace, None);
                    }
                    if self.advance_if("=") {
                        self.state = ScannerState::BeforeAttributeValue;
                        return self.finish_token(offset, TokenType::DelimiterAssign, None);
                    }
                    self.state = ScannerState::WithinTag;
                }

                ScannerState::BeforeAttributeValue => {
                    if self.skip_whitespace() {
                        return self.finish_token(offset, TokenType::Whitespace, None);
                    }
                    if let Some(value) = self.next_unquoted_value() {
                        self.record_type_value(value);
                        self.state = ScannerState::WithinTag;
                        self.has_space_after_tag = false;
                        return self.finish_token(offset, TokenType::AttributeValue, None);
                    }
                    if let Some(quote @ ('"' | '\'')) = self.peek() {
                        self.advance_char();
                        let terminated = self.advance_until_char(quote);
                        let value = &self.source[offset + 1..self.pos];
                        if terminated {
                            self.advance_char();
                        }
                        self.record_type_value(value);
                        self.state = ScannerState::WithinTag;
                        self.has_space_after_tag = false;
                        let error = (!terminated).then_some(ScanError::UnterminatedAttributeValue);
                        return self.finish_token(offset, TokenType::AttributeValue, error);
                    }
                    self.state = ScannerState::WithinTag;
                    self.has_space_after_tag = false;
                }

                ScannerState::WithinScriptContent => {
                    let mut escape = ScriptEscape::Data;
                    loop {
                        let Some((start, len, marker)) = self.find_script_marker() else {
                            self.pos = self.source.len();
                            return self.finish_token(offset, TokenType::Script, None);
                        };
                        self.pos = start + len;
                        match marker {
                            ScriptMarker::CommentOpen => {
                                if escape == ScriptEscape::Data {
                                    escape = ScriptEscape::Escaped;
                                }
                            }
                            ScriptMarker::CommentClose => escape = ScriptEscape::Data,
                            ScriptMarker::ScriptOpen => {
                                if escape == ScriptEscape::Escaped {
                                    escape = ScriptEscape::DoubleEscaped;
                                }
                            }
                            ScriptMarker::ScriptClose => {
                                if escape == ScriptEscape::DoubleEscaped {
                                    escape = ScriptEscape::Escaped;
                                } else {
                                    self.pos = start;
                                    break;
                                }
                            }
                        }
                    }
                    self.state = ScannerState::WithinContent;
                    if offset < self.pos {
                        return self.finish_token(offset, TokenType::Script, None);
                    }
                }

                ScannerState::WithinStyleContent => {
                    match find_ignore_ascii_case(self.rest(), "</style") {
                        Some(index) => self.pos += index,
                        None => self.pos = self.source.len(),
                    }
                    self.state = ScannerState::WithinContent;
                    if offset < self.pos {
                        return self.finish_token(offset, TokenType::Styles, None);
                    }
                }
            }
        }
    }

    /// Pick the content mode entered by the `>` of the current start tag.
    fn state_after_start_tag(&self) -> ScannerState {
        if self.last_tag.eq_ignore_ascii_case("script") {
            let markup_body = self.last_type_value.is_some_and(|value| {
                HTML_SCRIPT_TYPES
                    .iter()
                    .any(|ty| ty.eq_ignore_ascii_case(value))
            });
            if markup_body {
                ScannerState::WithinContent
            } else {
                ScannerState::WithinScriptContent
            }
        } else if self.last_tag.eq_ignore_ascii_case("style") {
            ScannerState::WithinStyleContent
        } else {
            ScannerState::WithinContent
        }
    }

    fn record_type_value(&mut self, value: &'a str) {
        if self
            .last_attribute_name
            .is_some_and(|name| name.eq_ignore_ascii_case("type"))
        {
            self.last_type_value = Some(value);
        }
    }

    // --- Lexical classes ---

    /// Consume an element name: `[_:A-Za-z0-9][_:A-Za-z0-9-.]*`.
    fn next_element_name(&mut self) -> &'a str {
        let rest = self.rest();
        let bytes = rest.as_bytes();
        let is_start = |b: u8| b.is_ascii_alphanumeric() || b == b'_' || b == b':';
        if !matches!(bytes.first(), Some(&b) if is_start(b)) {
            return "";
        }
        let len = 1 + bytes[1..]
            .iter()
            .take_while(|&&b| is_start(b) || b == b'-' || b == b'.')
            .count();
        self.pos += len;
        &rest[..len]
    }

    /// Consume an attribute name: anything up to whitespace, quotes, `<`, `>`,
    /// `/`, `=` or a control character.
    fn next_attribute_name(&mut self) -> &'a str {
        let rest = self.rest();
        let len = rest
            .char_indices()
            .find(|&(_, c)| !is_attribute_name_char(c))
            .map_or(rest.len(), |(i, _)| i);
        self.pos += len;
        &rest[..len]
    }

    /// Consume an unquoted attribute value, leaving a trailing `/` in
    /// `<a href=http://host/>` to the self-close. Nothing is consumed when
    /// only that `/` is left, as in `<a b=/>`.
    fn next_unquoted_value(&mut self) -> Option<&'a str> {
        let rest = self.rest();
        let mut len = rest
            .char_indices()
            .find(|&(_, c)| c.is_whitespace() || matches!(c, '"' | '\'' | '`' | '=' | '<' | '>'))
            .map_or(rest.len(), |(i, _)| i);
        if len == 0 {
            return None;
        }
        if rest[len..].starts_with('>') && rest[..len].ends_with('/') {
            len -= 1;
        }
        if len == 0 {
            return None;
        }
        self.pos += len;
        Some(&rest[..len])
    }

    /// Find the next script-body marker at or after the current position:
    /// `<!--`, `-->`, or a `<script` / `</script` tag.
    fn find_script_marker(&self) -> Option<(usize, usize, ScriptMarker)> {
        let bytes = self.source.as_bytes();
        for start in self.pos..bytes.len() {
            match bytes[start] {
                b'<' => {
                    let rest = &self.source[start..];
                    if rest.starts_with("<!--") {
                        return Some((start, 4, ScriptMarker::CommentOpen));
                    }
                    if let Some((len, closing)) = match_script_tag(rest) {
                        let marker = if closing {
                            ScriptMarker::ScriptClose
                        } else {
                            ScriptMarker::ScriptOpen
                        };
                        return Some((start, len, marker));
                    }
                }
                b'-' if bytes[start..].starts_with(b"-->") => {
                    return Some((start, 3, ScriptMarker::CommentClose));
                }
                _ => {}
            }
        }
        None
    }

    // --- Helpers ---

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn advance_char(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn advance_if(&mut self, expected: &str) -> bool {
        if self.rest().starts_with(expected) {
            self.pos += expected.len();
            true
        } else {
            false
        }
    }

    fn advance_if_ignore_case(&mut self, expected: &str) -> bool {
        let rest = self.rest().as_bytes();
        if rest.len() >= expected.len()
            && rest[..expected.len()].eq_ignore_ascii_case(expected.as_bytes())
        {
            self.pos += expected.len();
            true
        } else {
            false
        }
    }

    /// Move to the start of `needle`, or to the end of input if it never
    /// occurs. Returns whether it was found.
    fn advance_until(&mut self, needle: &str) -> bool {
        match self.rest().find(needle) {
            Some(index) => {
                self.pos += index;
                true
            }
            None => {
                self.pos = self.source.len();
                false
            }
        }
    }

    fn advance_until_char(&mut self, ch: char) -> bool {
        match self.rest().find(ch) {
            Some(index) => {
                self.pos += index;
                true
            }
            None => {
                self.pos = self.source.len();
                false
            }
        }
    }

    fn skip_whitespace(&mut self) -> bool {
        let len = self
            .rest()
            .bytes()
            .take_while(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0C'))
            .count();
        self.pos += len;
        len > 0
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }
}

/// Iterator over the tokens of a [`Scanner`], ending after
/// [`TokenType::Eos`].
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    scanner: Scanner<'a>,
    finished: bool,
}

impl<'a> Tokens<'a> {
    /// The underlying scanner, positioned after the last yielded token.
    pub fn scanner(&self) -> &Scanner<'a> {
        &self.scanner
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        if self.finished {
            return None;
        }
        if self.scanner.scan() == TokenType::Eos {
            self.finished = true;
        }
        Some(self.scanner.token())
    }
}

impl FusedIterator for Tokens<'_> {}

/// Tokenize the entire source. The last token is always [`TokenType::Eos`].
pub fn tokenize(source: &str) -> Vec<Token<'_>> {
    Scanner::new(source).tokens().collect()
}

fn is_attribute_name_char(c: char) -> bool {
    !(c.is_whitespace()
        || matches!(c, '"' | '\'' | '>' | '<' | '/' | '=')
        || matches!(c, '\u{00}'..='\u{0F}' | '\u{7F}'..='\u{9F}'))
}

/// Match `</?script\s*/?>?` (case-insensitive) at the start of `text`,
/// returning the match length and whether it is a closing tag.
fn match_script_tag(text: &str) -> Option<(usize, bool)> {
    let bytes = text.as_bytes();
    let mut len = 1;
    let closing = bytes.get(len) == Some(&b'/');
    if closing {
        len += 1;
    }
    let name = bytes.get(len..len + 6)?;
    if !name.eq_ignore_ascii_case(b"script") {
        return None;
    }
    len += 6;
    len += text[len..]
        .char_indices()
        .find(|&(_, c)| !c.is_whitespace())
        .map_or(text.len() - len, |(i, _)| i);
    if bytes.get(len) == Some(&b'/') {
        len += 1;
    }
    if bytes.get(len) == Some(&b'>') {
        len += 1;
    }
    Some((len, closing))
}

fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let needle = needle.as_bytes();
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Helper: tokenize and return token kinds.
    fn kinds(source: &str) -> Vec<TokenType> {
        tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    /// Helper: tokenize and return `(kind, text)` pairs, without the final EOS.
    fn pairs(source: &str) -> Vec<(TokenType, &str)> {
        tokenize(source)
            .into_iter()
            .filter(|t| t.kind != TokenType::Eos)
            .map(|t| (t.kind, t.text))
            .collect()
    }

    /// Helper: tokens that carry an error code.
    fn errors(source: &str) -> Vec<(TokenType, ScanError)> {
        tokenize(source)
            .into_iter()
            .filter_map(|t| t.error.map(|e| (t.kind, e)))
            .collect()
    }

    use TokenType::*;

    // =========================================================================
    // Structure: empty, content, EOS
    // =========================================================================

    #[test]
    fn test_empty_source() {
        let toks = tokenize("");
        assert_eq!(toks.len(), 1);
        assert_eq!(toks[0].kind, Eos);
        assert_eq!(toks[0].span, Span::new(0, 0));
    }

    #[test]
    fn test_plain_content() {
        assert_eq!(pairs("hello world"), vec![(Content, "hello world")]);
    }

    #[test]
    fn test_scan_after_eos_is_idempotent() {
        let mut scanner = Scanner::new("x");
        assert_eq!(scanner.scan(), Content);
        assert_eq!(scanner.scan(), Eos);
        assert_eq!(scanner.scan(), Eos);
        assert_eq!(scanner.scan(), Eos);
        assert_eq!(scanner.token_offset(), 1);
        assert_eq!(scanner.token_length(), 0);
    }

    #[test]
    fn test_tokens_yield_single_eos_then_fuse() {
        let mut tokens = Scanner::new("<a>").tokens();
        let collected: Vec<_> = tokens.by_ref().map(|t| t.kind).collect();
        assert_eq!(collected, vec![StartTagOpen, StartTag, StartTagClose, Eos]);
        assert!(tokens.next().is_none());
        assert_eq!(tokens.scanner().token_end(), 3);
    }

    #[test]
    fn test_scan_on_owned_scanner_field() {
        struct Holder<'a> {
            scanner: Scanner<'a>,
        }
        let mut holder = Holder {
            scanner: Scanner::new("<p>"),
        };
        assert_eq!(holder.scanner.scan(), StartTagOpen);
        assert_eq!(holder.scanner.scan(), StartTag);
        assert_eq!(holder.scanner.token_text(), "p");
    }

    // =========================================================================
    // Start and end tags
    // =========================================================================

    #[test]
    fn test_simple_element() {
        assert_eq!(
            pairs("<div>text</div>"),
            vec![
                (StartTagOpen, "<"),
                (StartTag, "div"),
                (StartTagClose, ">"),
                (Content, "text"),
                (EndTagOpen, "</"),
                (EndTag, "div"),
                (EndTagClose, ">"),
            ]
        );
    }

    #[test]
    fn test_tag_name_keeps_case() {
        assert_eq!(
            pairs("<DIV></Div>"),
            vec![
                (StartTagOpen, "<"),
                (StartTag, "DIV"),
                (StartTagClose, ">"),
                (EndTagOpen, "</"),
                (EndTag, "Div"),
                (EndTagClose, ">"),
            ]
        );
    }

    #[test]
    fn test_namespaced_and_hyphenated_names() {
        let toks = pairs("<ui:button/><c-my.widget/>");
        assert_eq!(toks[1], (StartTag, "ui:button"));
        assert_eq!(toks[2], (StartTagSelfClose, "/>"));
        assert_eq!(toks[4], (StartTag, "c-my.widget"));
    }

    #[test]
    fn test_self_closing_tag() {
        assert_eq!(
            pairs("<br/>"),
            vec![(StartTagOpen, "<"), (StartTag, "br"), (StartTagSelfClose, "/>")]
        );
    }

    #[test]
    fn test_end_tag_with_whitespace() {
        assert_eq!(
            pairs("</div  >"),
            vec![
                (EndTagOpen, "</"),
                (EndTag, "div"),
                (Whitespace, "  "),
                (EndTagClose, ">"),
            ]
        );
    }

    #[test]
    fn test_multiline_tag() {
        assert_eq!(
            kinds("<div\n  class=\"a\"\n>"),
            vec![
                StartTagOpen,
                StartTag,
                Whitespace,
                AttributeName,
                DelimiterAssign,
                AttributeValue,
                Whitespace,
                StartTagClose,
                Eos,
            ]
        );
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    #[test]
    fn test_attributes() {
        assert_eq!(
            pairs("<input type=\"text\" value='x' disabled id=main>"),
            vec![
                (StartTagOpen, "<"),
                (StartTag, "input"),
                (Whitespace, " "),
                (AttributeName, "type"),
                (DelimiterAssign, "="),
                (AttributeValue, "\"text\""),
                (Whitespace, " "),
                (AttributeName, "value"),
                (DelimiterAssign, "="),
                (AttributeValue, "'x'"),
                (Whitespace, " "),
                (AttributeName, "disabled"),
                (Whitespace, " "),
                (AttributeName, "id"),
                (DelimiterAssign, "="),
                (AttributeValue, "main"),
                (StartTagClose, ">"),
            ]
        );
    }

    #[test]
    fn test_whitespace_around_assign() {
        assert_eq!(
            kinds("<a href = \"x\">"),
            vec![
                StartTagOpen,
                StartTag,
                Whitespace,
                AttributeName,
                Whitespace,
                DelimiterAssign,
                Whitespace,
                AttributeValue,
                StartTagClose,
                Eos,
            ]
        );
    }

    #[test]
    fn test_unquoted_value_before_self_close() {
        let toks = pairs("<a href=http://host/>");
        assert_eq!(toks[5], (AttributeValue, "http://host"));
        assert_eq!(toks[6], (StartTagSelfClose, "/>"));
    }

    #[test]
    fn test_empty_unquoted_value_before_self_close() {
        assert_eq!(
            pairs("<a b=/>"),
            vec![
                (StartTagOpen, "<"),
                (StartTag, "a"),
                (Whitespace, " "),
                (AttributeName, "b"),
                (DelimiterAssign, "="),
                (StartTagSelfClose, "/>"),
            ]
        );
        assert_eq!(errors("<a b=/>"), vec![]);
    }

    #[test]
    fn test_attribute_requires_preceding_whitespace() {
        // `div"x"` - the quote cannot start an attribute name
        let toks = kinds("<div\"x\">");
        assert!(toks.contains(&Unknown));
        assert_eq!(*toks.last().unwrap(), Eos);
    }

    // =========================================================================
    // Comments and doctype
    // =========================================================================

    #[test]
    fn test_comment() {
        assert_eq!(
            pairs("<!-- hi -->"),
            vec![
                (StartCommentTag, "<!--"),
                (Comment, " hi "),
                (EndCommentTag, "-->"),
            ]
        );
    }

    #[test]
    fn test_empty_comment() {
        assert_eq!(
            kinds("<!---->"),
            vec![StartCommentTag, EndCommentTag, Eos]
        );
    }

    #[test]
    fn test_comment_containing_markup() {
        let toks = pairs("<!-- <div> -->after");
        assert_eq!(toks[1], (Comment, " <div> "));
        assert_eq!(toks[3], (Content, "after"));
    }

    #[test]
    fn test_doctype() {
        assert_eq!(
            pairs("<!DOCTYPE html>"),
            vec![
                (StartDoctypeTag, "<!DOCTYPE"),
                (Doctype, " html"),
                (EndDoctypeTag, ">"),
            ]
        );
    }

    // =========================================================================
    // Script and style bodies
    // =========================================================================

    #[test]
    fn test_script_body_is_single_token() {
        let toks = pairs("<script>if (a < b) { x = '</div>'; }</script>");
        assert_eq!(toks[3], (Script, "if (a < b) { x = '</div>'; }"));
        assert_eq!(toks[4], (EndTagOpen, "</"));
        assert_eq!(toks[5], (EndTag, "script"));
    }

    #[test]
    fn test_script_escaped_comment_hides_nested_script() {
        let toks = pairs("<script><!--<script>x</script>--></script>");
        assert_eq!(toks[3], (Script, "<!--<script>x</script>-->"));
        assert_eq!(toks[5], (EndTag, "script"));
    }

    #[test]
    fn test_empty_script() {
        assert_eq!(
            kinds("<script></script>"),
            vec![
                StartTagOpen,
                StartTag,
                StartTagClose,
                EndTagOpen,
                EndTag,
                EndTagClose,
                Eos,
            ]
        );
    }

    #[test]
    fn test_unterminated_script_runs_to_end() {
        let toks = pairs("<script>let a = 1;");
        assert_eq!(toks.last(), Some(&(Script, "let a = 1;")));
    }

    #[test]
    fn test_template_script_is_scanned_as_markup() {
        let toks = pairs("<script type=\"text/x-handlebars-template\"><div></div></script>");
        assert!(toks.contains(&(StartTag, "div")));
        assert!(!toks.iter().any(|(kind, _)| *kind == Script));
    }

    #[test]
    fn test_style_body() {
        let toks = pairs("<style>a > b { color: red }</STYLE>");
        assert_eq!(toks[3], (Styles, "a > b { color: red }"));
        assert_eq!(toks[5], (EndTag, "STYLE"));
    }

    // =========================================================================
    // Malformed input
    // =========================================================================

    #[test]
    fn test_unterminated_comment_has_error() {
        let toks = tokenize("<!-- never closed");
        assert_eq!(toks[1].kind, Comment);
        assert_eq!(toks[1].error, Some(ScanError::UnterminatedComment));
        assert_eq!(toks.last().unwrap().kind, Eos);
    }

    #[test]
    fn test_bare_comment_open_has_error() {
        assert_eq!(
            errors("<!--"),
            vec![(StartCommentTag, ScanError::UnterminatedComment)]
        );
    }

    #[test]
    fn test_whitespace_after_open_bracket() {
        let toks = tokenize("< div>");
        assert_eq!(toks[1].kind, Whitespace);
        assert_eq!(toks[1].error, Some(ScanError::UnexpectedWhitespace));
        assert_eq!(toks[2].kind, StartTag);
        assert_eq!(toks[2].text, "div");
    }

    #[test]
    fn test_missing_start_tag_name() {
        assert_eq!(
            errors("<#foo>"),
            vec![(Unknown, ScanError::StartTagNameExpected)]
        );
    }

    #[test]
    fn test_missing_end_tag_name() {
        assert_eq!(
            pairs("</ #>"),
            vec![(EndTagOpen, "</"), (Whitespace, " "), (Unknown, "#"), (EndTagClose, ">")]
        );
        assert_eq!(
            errors("</ #>"),
            vec![
                (Whitespace, ScanError::UnexpectedWhitespace),
                (Unknown, ScanError::EndTagNameExpected),
            ]
        );
    }

    #[test]
    fn test_junk_in_end_tag() {
        assert_eq!(
            errors("</div x>"),
            vec![(Unknown, ScanError::ClosingBracketExpected)]
        );
    }

    #[test]
    fn test_unexpected_character_in_tag() {
        assert_eq!(
            errors("<div =>"),
            vec![(Unknown, ScanError::UnexpectedCharacterInTag)]
        );
    }

    #[test]
    fn test_unterminated_attribute_value() {
        let toks = tokenize("<a href=\"foo");
        let value = toks.iter().find(|t| t.kind == AttributeValue).unwrap();
        assert_eq!(value.text, "\"foo");
        assert_eq!(value.error, Some(ScanError::UnterminatedAttributeValue));
        assert_eq!(toks.last().unwrap().kind, Eos);
    }

    #[test]
    fn test_stray_delimiters_never_stall() {
        for source in ["<", "</", "<<<>>>", "<a <b", "<a b=", "<a b='", "<!", "<!doc", "a>b", "</>"] {
            let toks = tokenize(source);
            assert_eq!(toks.last().unwrap().kind, Eos, "{source:?}");
            let covered: usize = toks.iter().map(|t| t.len()).sum();
            assert_eq!(covered, source.len(), "{source:?}");
        }
    }

    #[test]
    fn test_tokens_are_contiguous() {
        let source = "<!doctype html><html lang=en>\n<!-- c --><p a=1 b>x</p><br></html";
        let toks = tokenize(source);
        let mut expected_start = 0;
        for token in &toks {
            assert_eq!(token.offset(), expected_start, "{token:?}");
            assert_eq!(&source[token.span.start..token.span.end], token.text);
            expected_start = token.end();
        }
        assert_eq!(expected_start, source.len());
    }

    // =========================================================================
    // Resumption and offsets
    // =========================================================================

    #[test]
    fn test_resume_at_offset() {
        let mut scanner = Scanner::with_offset("<a><b>", 3);
        assert_eq!(scanner.scan(), StartTagOpen);
        assert_eq!(scanner.token_offset(), 3);
        assert_eq!(scanner.scan(), StartTag);
        assert_eq!(scanner.token_text(), "b");
    }

    #[test]
    fn test_resume_past_end_is_clamped() {
        let mut scanner = Scanner::with_offset("<a>", 99);
        assert_eq!(scanner.scan(), Eos);
        assert_eq!(scanner.token_offset(), 3);
    }

    #[test]
    fn test_resume_inside_multibyte_char() {
        // 'é' occupies bytes 1..3
        let mut scanner = Scanner::with_offset("héllo", 2);
        assert_eq!(scanner.scan(), Content);
        assert_eq!(scanner.token_text(), "llo");
    }

    #[test]
    fn test_multibyte_offsets() {
        let toks = tokenize("<p>héllo</p>");
        assert_eq!(toks[3].text, "héllo");
        assert_eq!(toks[3].span, Span::new(3, 9));
        assert_eq!(toks[5].span, Span::new(11, 12));
    }

    #[test]
    fn test_token_state_snapshot() {
        let toks = tokenize("<a x>");
        assert_eq!(toks[1].state, ScannerState::WithinTag);
        assert_eq!(toks[3].state, ScannerState::AfterAttributeName);
        assert_eq!(toks[4].state, ScannerState::WithinContent);
    }
}
