//! Tag documentation providers.
//!
//! A [`TagProvider`] knows a set of tags for some languages and can enumerate
//! them with optional documentation. Providers are collected once into an
//! ordered, immutable [`TagRegistry`] which hover lookups consult in
//! registration order.

use std::borrow::Cow;
use std::ops::ControlFlow;

use tracing::trace;

/// Documentation handle for a tag.
pub trait TagDocumentation {
    /// Markdown shown when hovering the tag.
    fn hover(&self) -> Cow<'_, str>;
}

impl TagDocumentation for String {
    fn hover(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl TagDocumentation for &'static str {
    fn hover(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

/// One tag reported by a provider.
#[derive(Clone, Copy)]
pub struct TagEntry<'a> {
    pub name: &'a str,
    pub label: &'a str,
    pub documentation: Option<&'a dyn TagDocumentation>,
}

/// A source of tag names and their documentation.
pub trait TagProvider: Send + Sync {
    fn id(&self) -> &str;

    fn is_applicable(&self, language_id: &str) -> bool;

    /// Call `visitor` once per known tag, stopping early if it breaks.
    fn collect_tags(&self, visitor: &mut dyn FnMut(TagEntry<'_>) -> ControlFlow<()>);
}

/// Ordered, read-only list of tag providers.
#[derive(Default)]
pub struct TagRegistry {
    providers: Vec<Box<dyn TagProvider>>,
}

impl TagRegistry {
    pub fn new(providers: Vec<Box<dyn TagProvider>>) -> Self {
        Self { providers }
    }

    pub fn builder() -> TagRegistryBuilder {
        TagRegistryBuilder::default()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Providers applicable to `language_id`, in registration order.
    pub fn applicable<'r>(
        &'r self,
        language_id: &'r str,
    ) -> impl Iterator<Item = &'r dyn TagProvider> + 'r {
        self.providers
            .iter()
            .map(|provider| provider.as_ref())
            .filter(move |provider| provider.is_applicable(language_id))
    }

    /// Documentation for `tag` from the first applicable provider that has
    /// some.
    ///
    /// Within a provider an exact name match wins over a match against the
    /// lowercased tag; entries without documentation are skipped.
    pub fn find_documentation(&self, language_id: &str, tag: &str) -> Option<String> {
        let lowered = tag.to_lowercase();
        for provider in self.applicable(language_id) {
            let mut exact = None;
            let mut folded = None;
            provider.collect_tags(&mut |entry| {
                let Some(documentation) = entry.documentation else {
                    return ControlFlow::Continue(());
                };
                if entry.name == tag {
                    exact = Some(documentation.hover().into_owned());
                    return ControlFlow::Break(());
                }
                if folded.is_none() && entry.name == lowered {
                    folded = Some(documentation.hover().into_owned());
                }
                ControlFlow::Continue(())
            });
            if let Some(found) = exact.or(folded) {
                trace!(provider = provider.id(), tag, "found tag documentation");
                return Some(found);
            }
        }
        None
    }
}

impl std::fmt::Debug for TagRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.providers.iter().map(|p| p.id()))
            .finish()
    }
}

#[derive(Default)]
pub struct TagRegistryBuilder {
    providers: Vec<Box<dyn TagProvider>>,
}

impl TagRegistryBuilder {
    pub fn with(mut self, provider: impl TagProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn build(self) -> TagRegistry {
        TagRegistry::new(self.providers)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct StaticTag {
    name: String,
    label: String,
    documentation: Option<String>,
}

/// In-memory provider over a fixed list of tags.
///
/// With no languages configured the provider applies to every language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticTagProvider {
    id: String,
    languages: Vec<String>,
    tags: Vec<StaticTag>,
}

impl StaticTagProvider {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            languages: Vec::new(),
            tags: Vec::new(),
        }
    }

    pub fn for_language(mut self, language_id: impl Into<String>) -> Self {
        self.languages.push(language_id.into());
        self
    }

    /// Add a documented tag, labelled with its own name.
    pub fn tag(self, name: impl Into<String>, documentation: impl Into<String>) -> Self {
        let name = name.into();
        let label = name.clone();
        self.tag_with_label(name, label, Some(documentation.into()))
    }

    pub fn tag_with_label(
        mut self,
        name: impl Into<String>,
        label: impl Into<String>,
        documentation: Option<String>,
    ) -> Self {
        self.tags.push(StaticTag {
            name: name.into(),
            label: label.into(),
            documentation,
        });
        self
    }
}

impl TagProvider for StaticTagProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn is_applicable(&self, language_id: &str) -> bool {
        self.languages.is_empty() || self.languages.iter().any(|l| l == language_id)
    }

    fn collect_tags(&self, visitor: &mut dyn FnMut(TagEntry<'_>) -> ControlFlow<()>) {
        for tag in &self.tags {
            let entry = TagEntry {
                name: &tag.name,
                label: &tag.label,
                documentation: tag
                    .documentation
                    .as_ref()
                    .map(|doc| doc as &dyn TagDocumentation),
            };
            if visitor(entry).is_break() {
                break;
            }
        }
    }
}
