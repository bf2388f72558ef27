//! Input clean-up that runs before either lexer sees the markup.

use std::sync::LazyLock;

use purify_common::Config;
use regex::{Captures, Regex};

use crate::generator::escape;

/// Settings for [`normalize`], read from `Core.*` directives.
#[derive(Debug, Clone)]
pub struct NormalizeSettings {
    /// `Core.NormalizeNewlines`
    pub normalize_newlines: bool,
    /// `Core.ConvertDocumentToFragment`
    pub convert_document_to_fragment: bool,
    /// `Core.RemoveProcessingInstructions`
    pub remove_processing_instructions: bool,
    /// `Core.AggressivelyRemoveScript`
    pub aggressively_remove_script: bool,
}

impl Default for NormalizeSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl NormalizeSettings {
    /// Read the settings from a configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            normalize_newlines: config.get_bool("Core.NormalizeNewlines"),
            convert_document_to_fragment: config.get_bool("Core.ConvertDocumentToFragment"),
            remove_processing_instructions: config.get_bool("Core.RemoveProcessingInstructions"),
            aggressively_remove_script: config.get_bool("Core.AggressivelyRemoveScript"),
        }
    }
}

static CDATA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").expect("cdata pattern is valid")
});

/// `<!--//--><![CDATA[//><!-- ... //--><!]]>`, the commented CDATA idiom
/// used inside scripts.
static COMMENTED_CDATA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!--//--><!\[CDATA\[//><!--(.*?)//--><!\]\]>")
        .expect("commented cdata pattern is valid")
});

static IE_CONDITIONAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?si)<!--\[if [^>]+\]>.*?<!\[endif\]-->").expect("conditional pattern is valid")
});

static PROCESSING_INSTRUCTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<\?.*?\?>").expect("pi pattern is valid"));

static SCRIPT_CONTENTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?si)(<script[^>]*>)(.*?)(</script>)").expect("script pattern is valid")
});

static BODY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?si)<body[^>]*>(.*?)(?:</body>|$)").expect("body pattern is valid")
});

/// Characters below U+0020 that are not valid in an HTML document.
const fn is_invalid_control(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}')
}

/// Prepare raw markup for tokenizing.
///
/// In order: newline normalization, conditional comment removal, CDATA
/// escaping (commented and plain), body extraction, processing instruction
/// removal, control character removal, and script content removal.
#[must_use]
pub fn normalize(html: &str, settings: &NormalizeSettings) -> String {
    let mut html = if settings.normalize_newlines {
        html.replace("\r\n", "\n").replace('\r', "\n")
    } else {
        html.to_string()
    };

    html = IE_CONDITIONAL.replace_all(&html, "").into_owned();
    html = COMMENTED_CDATA
        .replace_all(&html, |caps: &Captures<'_>| escape(&caps[1]))
        .into_owned();
    html = CDATA
        .replace_all(&html, |caps: &Captures<'_>| escape(&caps[1]))
        .into_owned();

    if settings.convert_document_to_fragment {
        if let Some(body) = BODY.captures(&html).and_then(|caps| caps.get(1)) {
            html = body.as_str().to_string();
        }
    }
    if settings.remove_processing_instructions {
        html = PROCESSING_INSTRUCTION.replace_all(&html, "").into_owned();
    }
    if html.contains(is_invalid_control) {
        html.retain(|c| !is_invalid_control(c));
    }
    if settings.aggressively_remove_script {
        html = SCRIPT_CONTENTS.replace_all(&html, "$1$3").into_owned();
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newlines_and_controls() {
        let settings = NormalizeSettings::default();
        assert_eq!(normalize("a\r\nb\rc\u{1}d\te", &settings), "a\nb\ncd\te");
    }

    #[test]
    fn test_cdata_is_escaped() {
        let settings = NormalizeSettings::default();
        assert_eq!(
            normalize("x<![CDATA[<b>&</b>]]>y", &settings),
            "x&lt;b&gt;&amp;&lt;/b&gt;y"
        );
    }

    #[test]
    fn test_body_extraction() {
        let settings = NormalizeSettings::default();
        assert_eq!(
            normalize("<html><head><title>t</title></head><body class=x><p>hi</p></body></html>", &settings),
            "<p>hi</p>"
        );
        assert_eq!(normalize("<body><p>open", &settings), "<p>open");
    }

    #[test]
    fn test_script_contents_removed() {
        let settings = NormalizeSettings::default();
        assert_eq!(
            normalize("<script type=\"x\">alert('<b>')</script>ok", &settings),
            "<script type=\"x\"></script>ok"
        );
    }

    #[test]
    fn test_conditional_comments_removed() {
        let settings = NormalizeSettings::default();
        assert_eq!(normalize("a<!--[if IE]><b>x</b><![endif]-->b", &settings), "ab");
    }
}
