use purify_common::Severity;
use purify_css::AttrContext;
use purify_dom::Attributes;

use crate::definition::{ElementDef, HtmlDefinition};
use crate::purifier::PurifyContext;

/// Validate one element's attributes in place.
///
/// Runs the global and element pre-transforms, validates every attribute
/// against the element's table (unknown and invalid ones are removed, valid
/// ones are replaced by their normalized form) and then the post-transforms.
/// Returns false when a required attribute is missing afterwards; what that
/// means for the element is up to the caller.
#[must_use]
pub fn validate_element_attributes(
    name: &str,
    def: &ElementDef,
    attrs: &mut Attributes,
    definition: &HtmlDefinition,
    cx: &mut PurifyContext<'_>,
    line: Option<usize>,
) -> bool {
    for transform in definition
        .global_attr_transforms()
        .iter()
        .chain(&def.attr_transform_pre)
    {
        transform.apply(attrs);
    }

    let mut kept = Attributes::new();
    for attr in attrs.iter() {
        let validated = def.attrs.get(&attr.name).and_then(|attr_def| {
            let mut attr_cx = AttrContext {
                element: name,
                settings: definition.attr_settings(),
                css: definition.css(),
                ids: &mut cx.ids,
            };
            attr_def.validate(&attr.value, &mut attr_cx)
        });
        match validated {
            Some(value) => kept.set(&attr.name, value),
            None => cx.errors.send(
                Severity::Error,
                "AttrValidator: Attribute removed",
                &[name, attr.name.as_str()],
                line,
            ),
        }
    }
    *attrs = kept;

    for transform in &def.attr_transform_post {
        transform.apply(attrs);
    }
    def.required_attrs.iter().all(|required| attrs.contains(required))
}
