//! The HTML schema.
//!
//! A definition is assembled from [`HtmlModule`]s. Each module contributes
//! element fragments, content-set memberships and attribute-collection
//! entries; merging them in order and then narrowing the result by the
//! configured allow and forbid lists yields one [`ElementDef`] per element.
//!
//! Definitions are immutable once built and are shared through a
//! [`DefinitionCache`] keyed by the configuration fingerprint.

mod allowed;
pub mod modules;

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;
use std::sync::Arc;

use purify_common::warning::warn_once;
use purify_common::{Config, DefinitionCache, MemoryCache, NoOpCache, PurifyError};
use purify_css::{AttrDef, AttrSettings, CssDefinition};

use crate::child_def::{
    ChildDef, ContentModelType, CustomModel, ElementSet, PCDATA, StrictBlockquote,
};
use crate::transform::{AttrTransform, TagTransform};
use allowed::Policy;

/// Attribute collections that pull in other collections.
const COLLECTION_INCLUDES: [(&str, &[&str]); 2] =
    [("Common", &["Core", "I18N"]), ("I18N", &["Lang"])];

/// Configuration namespaces an HTML definition depends on.
const NAMESPACES: [&str; 4] = ["HTML", "Attr", "CSS", "URI"];

// ========== Fragments and modules ==========

/// One module's declaration of (part of) an element.
#[derive(Debug, Clone)]
pub struct ElementFragment {
    /// Element name.
    pub name: String,
    /// Replaces an earlier definition instead of merging into it.
    pub standalone: bool,
    /// Content set the element joins (`Inline`, `Block`, ...).
    pub content_set: Option<String>,
    /// Content model, either a shorthand (`Empty`, `Inline`, `Flow`) or
    /// `Type: expression`.
    pub content_model: Option<String>,
    /// Attribute collections the element carries.
    pub collections: Vec<String>,
    /// Attributes beyond the collections.
    pub attrs: BTreeMap<String, AttrDef>,
    /// Attributes without which the element is removed.
    pub required_attrs: BTreeSet<String>,
    /// Elements forbidden anywhere below this one.
    pub excludes: BTreeSet<String>,
    /// Elements whose start closes this one.
    pub autoclose: BTreeSet<String>,
    /// Parent to insert when the element turns up where only that parent fits.
    pub wrap: Option<String>,
    /// Whether the element is reopened after being closed implicitly.
    pub formatting: Option<bool>,
    /// Transforms run before attribute validation.
    pub attr_transform_pre: Vec<AttrTransform>,
    /// Transforms run after attribute validation.
    pub attr_transform_post: Vec<AttrTransform>,
}

impl ElementFragment {
    /// A standalone definition with the given content model.
    #[must_use]
    pub fn new(name: &str, content_model: &str) -> Self {
        Self {
            standalone: true,
            content_model: Some(content_model.to_string()),
            ..Self::blank(name)
        }
    }

    /// A fragment that merges into an existing definition.
    #[must_use]
    pub fn blank(name: &str) -> Self {
        Self {
            name: name.to_string(),
            standalone: false,
            content_set: None,
            content_model: None,
            collections: Vec::new(),
            attrs: BTreeMap::new(),
            required_attrs: BTreeSet::new(),
            excludes: BTreeSet::new(),
            autoclose: BTreeSet::new(),
            wrap: None,
            formatting: None,
            attr_transform_pre: Vec::new(),
            attr_transform_post: Vec::new(),
        }
    }

    /// Join a content set.
    #[must_use]
    pub fn in_set(mut self, set: &str) -> Self {
        self.content_set = Some(set.to_string());
        self
    }

    /// Override the content model.
    #[must_use]
    pub fn model(mut self, content_model: &str) -> Self {
        self.content_model = Some(content_model.to_string());
        self
    }

    /// Carry the `Common` attribute collection.
    #[must_use]
    pub fn common(self) -> Self {
        self.collections(&["Common"])
    }

    /// Carry attribute collections.
    #[must_use]
    pub fn collections(mut self, names: &[&str]) -> Self {
        self.collections.extend(names.iter().map(ToString::to_string));
        self
    }

    /// Allow an attribute.
    #[must_use]
    pub fn attr(mut self, name: &str, def: AttrDef) -> Self {
        let _ = self.attrs.insert(name.to_string(), def);
        self
    }

    /// Allow and require an attribute.
    #[must_use]
    pub fn required(mut self, name: &str, def: AttrDef) -> Self {
        let _ = self.required_attrs.insert(name.to_string());
        self.attr(name, def)
    }

    /// Forbid descendants.
    #[must_use]
    pub fn excludes(mut self, names: &[&str]) -> Self {
        self.excludes.extend(names.iter().map(ToString::to_string));
        self
    }

    /// Close on these start tags.
    #[must_use]
    pub fn autoclose(mut self, names: &[&str]) -> Self {
        self.autoclose.extend(names.iter().map(ToString::to_string));
        self
    }

    /// Wrap in `parent` where that makes the element legal.
    #[must_use]
    pub fn wrap(mut self, parent: &str) -> Self {
        self.wrap = Some(parent.to_string());
        self
    }

    /// Mark as a formatting element.
    #[must_use]
    pub const fn formatting(mut self) -> Self {
        self.formatting = Some(true);
        self
    }

    /// Add a pre-validation attribute transform.
    #[must_use]
    pub fn pre(mut self, transform: AttrTransform) -> Self {
        self.attr_transform_pre.push(transform);
        self
    }

    /// Add a post-validation attribute transform.
    #[must_use]
    pub fn post(mut self, transform: AttrTransform) -> Self {
        self.attr_transform_post.push(transform);
        self
    }

    /// Field-wise merge of a later, non-standalone fragment.
    fn merge(&mut self, later: Self) {
        if later.content_model.is_some() {
            self.content_model = later.content_model;
        }
        for collection in later.collections {
            if !self.collections.contains(&collection) {
                self.collections.push(collection);
            }
        }
        self.attrs.extend(later.attrs);
        self.required_attrs.extend(later.required_attrs);
        self.excludes.extend(later.excludes);
        self.autoclose.extend(later.autoclose);
        if later.wrap.is_some() {
            self.wrap = later.wrap;
        }
        if later.formatting.is_some() {
            self.formatting = later.formatting;
        }
        self.attr_transform_pre.extend(later.attr_transform_pre);
        self.attr_transform_post.extend(later.attr_transform_post);
    }
}

/// A named schema fragment.
#[derive(Debug, Clone)]
pub struct HtmlModule {
    /// Module name, for diagnostics.
    pub name: String,
    /// `(set, "member | member")` additions.
    pub content_sets: Vec<(String, String)>,
    /// `(collection, attribute, definition)` additions.
    pub attr_collections: Vec<(String, String, AttrDef)>,
    /// Element fragments, in order.
    pub elements: Vec<ElementFragment>,
    /// Element renames applied before schema checks.
    pub tag_transforms: Vec<(String, TagTransform)>,
    /// Attribute transforms run on every element.
    pub global_attr_transforms: Vec<AttrTransform>,
}

impl HtmlModule {
    /// An empty module.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            content_sets: Vec::new(),
            attr_collections: Vec::new(),
            elements: Vec::new(),
            tag_transforms: Vec::new(),
            global_attr_transforms: Vec::new(),
        }
    }

    /// Add members to a content set.
    #[must_use]
    pub fn content_set(mut self, set: &str, members: &str) -> Self {
        self.content_sets.push((set.to_string(), members.to_string()));
        self
    }

    /// Add an attribute to a collection.
    #[must_use]
    pub fn collection_attr(mut self, collection: &str, attr: &str, def: AttrDef) -> Self {
        self.attr_collections
            .push((collection.to_string(), attr.to_string(), def));
        self
    }

    /// Add an element fragment.
    #[must_use]
    pub fn element(mut self, fragment: ElementFragment) -> Self {
        self.elements.push(fragment);
        self
    }

    /// Add a tag transform.
    #[must_use]
    pub fn tag_transform(mut self, from: &str, transform: TagTransform) -> Self {
        self.tag_transforms.push((from.to_string(), transform));
        self
    }

    /// Add an attribute transform for every element.
    #[must_use]
    pub fn global_transform(mut self, transform: AttrTransform) -> Self {
        self.global_attr_transforms.push(transform);
        self
    }
}

// ========== Finished definitions ==========

/// Everything the pipeline knows about one element.
#[derive(Debug, Clone)]
pub struct ElementDef {
    /// Allowed attributes and their validators.
    pub attrs: BTreeMap<String, AttrDef>,
    /// Attributes the element cannot do without.
    pub required_attrs: BTreeSet<String>,
    /// Content model.
    pub child: ChildDef,
    /// Elements forbidden anywhere below.
    pub excludes: BTreeSet<String>,
    /// Start tags that implicitly close this element.
    pub autoclose: BTreeSet<String>,
    /// Parent inserted to make a misplaced element legal.
    pub wrap: Option<String>,
    /// Reopened after an implicit close.
    pub formatting: bool,
    /// The last contributing fragment replaced rather than merged.
    pub standalone: bool,
    /// Nothing below this element may be block-level.
    pub descendants_are_inline: bool,
    /// Transforms run before validation.
    pub attr_transform_pre: Vec<AttrTransform>,
    /// Transforms run after validation.
    pub attr_transform_post: Vec<AttrTransform>,
}

/// Caches for the two definition families.
#[derive(Clone)]
pub struct DefinitionCaches {
    /// HTML definitions.
    pub html: Arc<dyn DefinitionCache<HtmlDefinition>>,
    /// CSS property tables.
    pub css: Arc<dyn DefinitionCache<CssDefinition>>,
}

impl Default for DefinitionCaches {
    fn default() -> Self {
        Self::none()
    }
}

impl DefinitionCaches {
    /// Caches that never store anything.
    #[must_use]
    pub fn none() -> Self {
        Self {
            html: Arc::new(NoOpCache),
            css: Arc::new(NoOpCache),
        }
    }

    /// In-process caches.
    #[must_use]
    pub fn memory() -> Self {
        Self {
            html: Arc::new(MemoryCache::new()),
            css: Arc::new(MemoryCache::new()),
        }
    }
}

/// The finished schema for one configuration.
#[derive(Debug)]
pub struct HtmlDefinition {
    fingerprint: String,
    elements: BTreeMap<String, ElementDef>,
    root_name: String,
    root: ElementDef,
    block_wrapper: String,
    content_sets: BTreeMap<String, ElementSet>,
    tag_transforms: BTreeMap<String, TagTransform>,
    global_attr_transforms: Vec<AttrTransform>,
    css: Arc<CssDefinition>,
    attr_settings: AttrSettings,
}

impl HtmlDefinition {
    /// Cache key for `config`.
    #[must_use]
    pub fn fingerprint_of(config: &Config) -> String {
        config.fingerprint_all(&NAMESPACES)
    }

    /// Fetch the definition for `config`, building and caching it on a miss.
    ///
    /// # Errors
    /// Propagates build errors, and returns [`PurifyError::CacheMismatch`]
    /// when the cache hands back a definition built for another
    /// configuration.
    pub fn fetch(config: &Config, caches: &DefinitionCaches) -> Result<Arc<Self>, PurifyError> {
        let key = Self::fingerprint_of(config);
        if let Some(cached) = caches.html.get(&key) {
            if cached.fingerprint != key {
                return Err(PurifyError::CacheMismatch { kind: "HTML" });
            }
            tracing::debug!(fingerprint = %key, "HTML definition cache hit");
            return Ok(cached);
        }
        let css = fetch_css(config, caches.css.as_ref());
        let definition = Arc::new(Self::build_with(config, css, Vec::new())?);
        let _ = caches.html.add(&key, Arc::clone(&definition));
        Ok(definition)
    }

    /// Build the standard definition for `config` without any cache.
    ///
    /// # Errors
    /// See [`HtmlDefinition::build_with`].
    pub fn build(config: &Config) -> Result<Self, PurifyError> {
        Self::build_with(config, Arc::new(CssDefinition::from_config(config)), Vec::new())
    }

    /// Build from the standard modules followed by `extra` ones.
    ///
    /// Callers that add modules should bump `HTML.DefinitionRev` so cached
    /// definitions built without them are not reused.
    ///
    /// # Errors
    /// Returns [`PurifyError::UnknownContentModel`] for an element whose
    /// content-model type is not recognized, and
    /// [`PurifyError::ContentModelSyntax`] for a custom expression that does
    /// not compile.
    pub fn build_with(
        config: &Config,
        css: Arc<CssDefinition>,
        extra: Vec<HtmlModule>,
    ) -> Result<Self, PurifyError> {
        let mut all = modules::standard(config);
        all.extend(extra);
        let merged = Merged::from_modules(all);
        let policy = Policy::from_config(config);

        // Elements that survive the allow and forbid lists.
        let mut names: BTreeSet<String> = merged
            .fragments
            .iter()
            .filter(|(_, fragment)| fragment.content_model.is_some())
            .map(|(name, _)| name.clone())
            .filter(|name| policy.element_allowed(name))
            .collect();
        if let Some(allowed) = &policy.allowed {
            for name in &allowed.elements {
                if !merged.fragments.contains_key(name) {
                    warn_once("HTMLDefinition", &format!("element '{name}' is not supported"));
                }
            }
        }

        // Attribute tables; an element whose required attribute was
        // filtered out can never be valid, so it goes too.
        let mut tables: BTreeMap<String, BTreeMap<String, AttrDef>> = BTreeMap::new();
        for (name, fragment) in &merged.fragments {
            if !names.contains(name) {
                continue;
            }
            let mut attrs = merged.collection_attrs(&fragment.collections);
            attrs.extend(fragment.attrs.iter().map(|(k, v)| (k.clone(), v.clone())));
            attrs.retain(|attr, _| policy.attribute_allowed(name, attr));
            if let Some(missing) = fragment
                .required_attrs
                .iter()
                .find(|attr| !attrs.contains_key(*attr))
            {
                warn_once(
                    "HTMLDefinition",
                    &format!(
                        "required attribute '{missing}' in element '{name}' was not allowed, \
                         which means '{name}' will not be allowed either"
                    ),
                );
                let _ = names.remove(name);
                continue;
            }
            let _ = tables.insert(name.clone(), attrs);
        }
        if let Some(allowed) = &policy.allowed {
            for (element, attr) in &allowed.attributes {
                let known = if element == "*" {
                    tables.values().any(|attrs| attrs.contains_key(attr))
                } else {
                    tables.get(element).is_some_and(|attrs| attrs.contains_key(attr))
                };
                if !known {
                    warn_once(
                        "HTMLDefinition",
                        &format!("attribute '{attr}' in element '{element}' is not supported"),
                    );
                }
            }
        }

        let content_sets: BTreeMap<String, ElementSet> = merged
            .sets
            .keys()
            .map(|set| (set.clone(), merged.expand_expression(set, &names)))
            .collect();

        let wanted_wrapper = config.get_str("HTML.BlockWrapper").unwrap_or("p");
        let block_wrapper = if content_sets
            .get("Block")
            .is_some_and(|block| block.contains(wanted_wrapper))
        {
            wanted_wrapper.to_string()
        } else {
            warn_once(
                "HTMLDefinition",
                &format!("block wrapper '{wanted_wrapper}' is not an allowed block element, using 'p'"),
            );
            "p".to_string()
        };

        let finisher = Finisher {
            merged: &merged,
            names: &names,
            content_sets: &content_sets,
            block_wrapper: &block_wrapper,
        };
        let mut elements = BTreeMap::new();
        for (name, attrs) in tables {
            if let Some(fragment) = merged.fragments.get(&name) {
                let def = finisher.element_def(&name, fragment, attrs)?;
                let _ = elements.insert(name, def);
            }
        }

        let wanted_root = config.get_str("HTML.Parent").unwrap_or("div");
        let root_name = if merged
            .fragments
            .get(wanted_root)
            .is_some_and(|fragment| fragment.content_model.is_some())
        {
            wanted_root
        } else {
            warn_once(
                "HTMLDefinition",
                &format!("cannot use unrecognized element '{wanted_root}' as parent"),
            );
            "div"
        };
        let root_fragment = merged
            .fragments
            .get(root_name)
            .ok_or_else(|| PurifyError::Invariant(format!("schema lost parent '{root_name}'")))?;
        let root = finisher.element_def(root_name, root_fragment, BTreeMap::new())?;

        tracing::debug!(
            elements = elements.len(),
            root = root_name,
            "built HTML definition"
        );

        Ok(Self {
            fingerprint: Self::fingerprint_of(config),
            elements,
            root_name: root_name.to_string(),
            root,
            block_wrapper,
            content_sets,
            tag_transforms: merged.tag_transforms,
            global_attr_transforms: merged.global_attr_transforms,
            css,
            attr_settings: AttrSettings::from_config(config),
        })
    }

    // ========== Queries ==========

    /// The fingerprint this definition was built for.
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Definition of an allowed element.
    #[must_use]
    pub fn element(&self, name: &str) -> Option<&ElementDef> {
        self.elements.get(name)
    }

    /// Whether `name` is an allowed element.
    #[must_use]
    pub fn is_allowed(&self, name: &str) -> bool {
        self.elements.contains_key(name)
    }

    /// Allowed element names in order.
    pub fn element_names(&self) -> impl Iterator<Item = &str> {
        self.elements.keys().map(String::as_str)
    }

    /// Name of the synthetic root (`HTML.Parent`).
    #[must_use]
    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    /// Definition of the synthetic root.
    #[must_use]
    pub const fn root(&self) -> &ElementDef {
        &self.root
    }

    /// Element used to wrap stray inline content in block-only contexts.
    #[must_use]
    pub fn block_wrapper(&self) -> &str {
        &self.block_wrapper
    }

    /// Expanded content set, restricted to allowed elements.
    #[must_use]
    pub fn content_set(&self, name: &str) -> Option<&ElementSet> {
        self.content_sets.get(name)
    }

    /// Transform for a deprecated element name.
    #[must_use]
    pub fn tag_transform(&self, name: &str) -> Option<&TagTransform> {
        self.tag_transforms.get(name)
    }

    /// Attribute transforms run on every element before validation.
    #[must_use]
    pub fn global_attr_transforms(&self) -> &[AttrTransform] {
        &self.global_attr_transforms
    }

    /// CSS property table for `style` attributes.
    #[must_use]
    pub fn css(&self) -> &CssDefinition {
        &self.css
    }

    /// Settings read by attribute validators.
    #[must_use]
    pub const fn attr_settings(&self) -> &AttrSettings {
        &self.attr_settings
    }
}

fn fetch_css(config: &Config, cache: &dyn DefinitionCache<CssDefinition>) -> Arc<CssDefinition> {
    let key = config.fingerprint("CSS");
    if let Some(cached) = cache.get(&key) {
        return cached;
    }
    let css = Arc::new(CssDefinition::from_config(config));
    let _ = cache.add(&key, Arc::clone(&css));
    css
}

// ========== Merging ==========

#[derive(Default)]
struct Merged {
    sets: BTreeMap<String, BTreeSet<String>>,
    collections: BTreeMap<String, BTreeMap<String, AttrDef>>,
    fragments: BTreeMap<String, ElementFragment>,
    tag_transforms: BTreeMap<String, TagTransform>,
    global_attr_transforms: Vec<AttrTransform>,
}

impl Merged {
    fn from_modules(modules: Vec<HtmlModule>) -> Self {
        let mut merged = Self::default();
        for module in modules {
            tracing::trace!(module = %module.name, "merging schema module");
            for (set, members) in module.content_sets {
                merged.sets.entry(set).or_default().extend(
                    members
                        .split('|')
                        .map(str::trim)
                        .filter(|member| !member.is_empty())
                        .map(String::from),
                );
            }
            for (collection, attr, def) in module.attr_collections {
                let _ = merged
                    .collections
                    .entry(collection)
                    .or_default()
                    .insert(attr, def);
            }
            for fragment in module.elements {
                if let Some(set) = &fragment.content_set {
                    let _ = merged
                        .sets
                        .entry(set.clone())
                        .or_default()
                        .insert(fragment.name.clone());
                }
                match merged.fragments.entry(fragment.name.clone()) {
                    Entry::Occupied(mut slot) if !fragment.standalone => slot.get_mut().merge(fragment),
                    Entry::Occupied(mut slot) => {
                        let _ = slot.insert(fragment);
                    }
                    Entry::Vacant(slot) => {
                        let _ = slot.insert(fragment);
                    }
                }
            }
            merged.tag_transforms.extend(module.tag_transforms);
            merged
                .global_attr_transforms
                .extend(module.global_attr_transforms);
        }
        merged
    }

    /// Element names a content-set name stands for.
    fn expand(&self, name: &str) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        let mut seen = BTreeSet::new();
        let mut stack = vec![name.to_string()];
        while let Some(current) = stack.pop() {
            if !seen.insert(current.clone()) {
                continue;
            }
            match self.sets.get(&current) {
                Some(members) => stack.extend(members.iter().cloned()),
                None => {
                    let _ = out.insert(current);
                }
            }
        }
        out
    }

    /// Expand a `a | Set | #PCDATA` expression, keeping only allowed names.
    fn expand_expression(&self, expression: &str, allowed: &BTreeSet<String>) -> ElementSet {
        expression
            .split('|')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .flat_map(|token| self.expand(token))
            .filter(|name| name == PCDATA || allowed.contains(name))
            .collect()
    }

    fn collection_attrs(&self, names: &[String]) -> BTreeMap<String, AttrDef> {
        let mut attrs = BTreeMap::new();
        let mut seen = BTreeSet::new();
        let mut stack: Vec<&str> = names.iter().rev().map(String::as_str).collect();
        while let Some(collection) = stack.pop() {
            if !seen.insert(collection) {
                continue;
            }
            if let Some((_, includes)) = COLLECTION_INCLUDES
                .iter()
                .find(|(name, _)| *name == collection)
            {
                stack.extend(includes.iter().copied());
            }
            if let Some(defs) = self.collections.get(collection) {
                attrs.extend(defs.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }
        attrs
    }
}

/// Split a declaration into its type and expression.
fn parse_model(model: &str) -> (String, String) {
    match model.trim() {
        "Empty" => ("empty".to_string(), String::new()),
        "Inline" => ("optional".to_string(), format!("Inline | {PCDATA}")),
        "Flow" => ("optional".to_string(), format!("Flow | {PCDATA}")),
        other => match other.split_once(':') {
            Some((kind, expression)) => (
                kind.trim().to_ascii_lowercase(),
                expression.trim().to_string(),
            ),
            None => (other.to_ascii_lowercase(), String::new()),
        },
    }
}

struct Finisher<'a> {
    merged: &'a Merged,
    names: &'a BTreeSet<String>,
    content_sets: &'a BTreeMap<String, ElementSet>,
    block_wrapper: &'a str,
}

impl Finisher<'_> {
    fn element_def(
        &self,
        name: &str,
        fragment: &ElementFragment,
        attrs: BTreeMap<String, AttrDef>,
    ) -> Result<ElementDef, PurifyError> {
        let (kind, expression) = parse_model(fragment.content_model.as_deref().unwrap_or("Empty"));
        let model_type =
            ContentModelType::from_str(&kind).map_err(|_| PurifyError::UnknownContentModel {
                element: name.to_string(),
                kind: kind.clone(),
            })?;
        let expand = |expression: &str| self.merged.expand_expression(expression, self.names);

        let child = match model_type {
            ContentModelType::Empty => ChildDef::Empty,
            ContentModelType::Optional => ChildDef::Optional(expand(&expression)),
            ContentModelType::Required => ChildDef::Required(expand(&expression)),
            ContentModelType::Custom => {
                ChildDef::Custom(CustomModel::compile(&expression).map_err(|err| {
                    PurifyError::ContentModelSyntax {
                        element: name.to_string(),
                        reason: err.to_string(),
                    }
                })?)
            }
            ContentModelType::Chameleon => {
                let (inline, block) = expression
                    .split_once('!')
                    .unwrap_or((expression.as_str(), expression.as_str()));
                ChildDef::Chameleon {
                    inline: expand(inline),
                    block: expand(block),
                }
            }
            ContentModelType::List => ChildDef::List {
                li_allowed: self.names.contains("li"),
            },
            ContentModelType::StrictBlockquote => ChildDef::StrictBlockquote(StrictBlockquote::new(
                expand(&expression),
                self.content_sets.get("Flow").cloned().unwrap_or_default(),
                self.block_wrapper,
            )),
        };

        let inline = self.content_sets.get("Inline");
        let allowed = child.allowed_elements();
        let descendants_are_inline = !allowed.is_empty()
            && allowed
                .iter()
                .all(|child| child == PCDATA || inline.is_some_and(|set| set.contains(child)));

        Ok(ElementDef {
            attrs,
            required_attrs: fragment.required_attrs.clone(),
            child,
            excludes: fragment.excludes.clone(),
            autoclose: fragment.autoclose.clone(),
            wrap: fragment.wrap.clone(),
            formatting: fragment.formatting.unwrap_or(false),
            standalone: fragment.standalone,
            descendants_are_inline,
            attr_transform_pre: fragment.attr_transform_pre.clone(),
            attr_transform_post: fragment.attr_transform_post.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_shorthands() {
        assert_eq!(parse_model("Empty"), ("empty".into(), String::new()));
        assert_eq!(
            parse_model("Inline"),
            ("optional".into(), "Inline | #PCDATA".into())
        );
        assert_eq!(
            parse_model("Required: td | th"),
            ("required".into(), "td | th".into())
        );
    }

    #[test]
    fn test_collections_include_each_other() {
        let merged = Merged::from_modules(modules::standard(&Config::default()));
        let attrs = merged.collection_attrs(&["Common".to_string()]);
        for name in ["class", "id", "title", "style", "lang", "dir"] {
            assert!(attrs.contains_key(name), "missing {name}");
        }
    }

    #[test]
    fn test_sets_expand_through_other_sets() {
        let merged = Merged::from_modules(modules::standard(&Config::default()));
        let flow = merged.expand("Flow");
        for name in ["p", "h1", "ul", "b", "table", "div"] {
            assert!(flow.contains(name), "missing {name}");
        }
        assert!(!flow.contains("li"));
    }
}
