//! Markup Language Services
//!
//! Editor features over HTML-like markup: folding ranges computed from a
//! single scanner pass, and tag hovers resolved against the element tree and
//! an ordered registry of tag documentation providers.
//!
//! ```text
//! text ──→ Scanner ──→ folding_ranges() ──→ limit_ranges()
//!    └───→ Parser ──→ HtmlDocument ──→ HoverResolver ──→ TagRegistry
//! ```
//!
//! ```
//! use marksense_services::{FoldingOptions, LanguageService, StaticTagProvider, TagRegistry, TextDocument};
//!
//! let service = LanguageService::new(
//!     TagRegistry::builder()
//!         .with(StaticTagProvider::new("html").tag("div", "A generic container."))
//!         .build(),
//! );
//!
//! let text = "<div>\n  <span>x</span>\n</div>";
//! let ranges = service.folding_ranges(text, &FoldingOptions::default());
//! assert_eq!((ranges[0].start_line, ranges[0].end_line), (0, 1));
//!
//! let document = TextDocument::new("html", text);
//! let tree = service.parse_document(text);
//! let hover = service.hover(&document, &tree, 2).unwrap();
//! assert!(hover.content.ends_with("A generic container."));
//! ```

pub mod folding;
pub mod hover;
pub mod line_index;
pub mod tags;

pub use folding::{
    limit_ranges, nesting_levels, FoldingOptions, FoldingRange, FoldingRangeKind,
};
pub use hover::{tag_name_range, Hover, HoverResolver, TagSide, TextRange};
pub use line_index::{LineIndex, Position};
pub use tags::{
    StaticTagProvider, TagDocumentation, TagEntry, TagProvider, TagRegistry, TagRegistryBuilder,
};

use marksense_parser::{HtmlDocument, Parser};
use marksense_scanner::Scanner;

/// A document as handed over by the editor host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDocument {
    pub language_id: String,
    pub text: String,
}

impl TextDocument {
    pub fn new(language_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            language_id: language_id.into(),
            text: text.into(),
        }
    }
}

/// Entry point bundling the tag registry with the markup features.
#[derive(Debug, Default)]
pub struct LanguageService {
    registry: TagRegistry,
}

impl LanguageService {
    pub fn new(registry: TagRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &TagRegistry {
        &self.registry
    }

    pub fn create_scanner<'a>(&self, text: &'a str) -> Scanner<'a> {
        Scanner::new(text)
    }

    pub fn parse_document(&self, text: &str) -> HtmlDocument {
        Parser::parse(text)
    }

    pub fn folding_ranges(&self, text: &str, options: &FoldingOptions) -> Vec<FoldingRange> {
        folding::folding_ranges(text, options)
    }

    pub fn hover(
        &self,
        document: &TextDocument,
        tree: &HtmlDocument,
        offset: usize,
    ) -> Option<Hover> {
        HoverResolver::new(&self.registry).hover(document, tree, offset)
    }
}
