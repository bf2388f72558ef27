//! Element and attribute filters read from `HTML.Allowed`,
//! `HTML.ForbiddenElements` and `HTML.ForbiddenAttributes`.

use std::collections::BTreeSet;

use purify_common::Config;
use purify_common::warning::warn_once;

/// Parsed `HTML.Allowed`: `p,b,a[href|title],*[class]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct AllowedList {
    pub elements: BTreeSet<String>,
    /// `(element, attribute)`; element `*` means every element.
    pub attributes: BTreeSet<(String, String)>,
}

impl AllowedList {
    pub fn parse(source: &str) -> Self {
        let mut list = Self::default();
        let compact: String = source
            .chars()
            .filter(|c| *c != ' ' && *c != '\t')
            .collect();
        for chunk in compact.split([',', '\n', '\r']) {
            if chunk.is_empty() {
                continue;
            }
            let (element, attrs) = match chunk.split_once('[') {
                Some((element, rest)) => (element, Some(rest.trim_end_matches(']'))),
                None => (chunk, None),
            };
            let element = element.to_ascii_lowercase();
            if element != "*" {
                let _ = list.elements.insert(element.clone());
            }
            for attr in attrs.into_iter().flat_map(|a| a.split('|')) {
                if !attr.is_empty() {
                    let _ = list
                        .attributes
                        .insert((element.clone(), attr.to_ascii_lowercase()));
                }
            }
        }
        list
    }
}

/// Everything that narrows the full schema.
#[derive(Debug, Clone, Default)]
pub(super) struct Policy {
    pub allowed: Option<AllowedList>,
    forbidden_elements: BTreeSet<String>,
    forbidden_attributes: BTreeSet<(String, String)>,
}

impl Policy {
    pub fn from_config(config: &Config) -> Self {
        let allowed = config.get_str("HTML.Allowed").map(AllowedList::parse);
        let forbidden_elements = config
            .get_set("HTML.ForbiddenElements")
            .into_iter()
            .map(|name| name.to_ascii_lowercase())
            .collect();
        let mut forbidden_attributes = BTreeSet::new();
        for entry in config.get_list("HTML.ForbiddenAttributes").unwrap_or_default() {
            match entry.split_once('@') {
                Some((element, attr)) => {
                    let _ = forbidden_attributes
                        .insert((element.to_ascii_lowercase(), attr.to_ascii_lowercase()));
                }
                None => warn_once(
                    "HTMLDefinition",
                    &format!(
                        "forbidden attribute '{entry}' must be written 'element@attribute' or '*@attribute'"
                    ),
                ),
            }
        }
        Self {
            allowed,
            forbidden_elements,
            forbidden_attributes,
        }
    }

    pub fn element_allowed(&self, name: &str) -> bool {
        if self.forbidden_elements.contains(name) {
            return false;
        }
        self.allowed
            .as_ref()
            .is_none_or(|allowed| allowed.elements.contains(name))
    }

    pub fn attribute_allowed(&self, element: &str, attr: &str) -> bool {
        let keyed = |element: &str| (element.to_string(), attr.to_string());
        if self.forbidden_attributes.contains(&keyed(element))
            || self.forbidden_attributes.contains(&keyed("*"))
        {
            return false;
        }
        self.allowed.as_ref().is_none_or(|allowed| {
            allowed.attributes.contains(&keyed(element)) || allowed.attributes.contains(&keyed("*"))
        })
    }
}
