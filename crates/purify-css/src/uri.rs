//! URI parsing and normalization.
//!
//! [RFC 3986](https://www.rfc-editor.org/rfc/rfc3986)
//!
//! A URI is split into its components with the regular expression of
//! appendix B, each component is percent-encoded against its own character
//! class, and the result is checked against the scheme allow-list.

use std::collections::HashSet;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::LazyLock;

use regex::Regex;

use purify_common::Config;

/// [§ 2.2 Reserved Characters](https://www.rfc-editor.org/rfc/rfc3986#section-2.2)
/// "sub-delims  = "!" / "$" / "&" / "'" / "(" / ")" / "*" / "+" / "," / ";" / "=""
const SUB_DELIMS: &str = "!$&'()*+,;=";

/// [§ 3.3 Path](https://www.rfc-editor.org/rfc/rfc3986#section-3.3)
/// "pchar = unreserved / pct-encoded / sub-delims / ":" / "@""
const PCHAR_EXTRA: &str = ":@";

/// [Appendix B](https://www.rfc-editor.org/rfc/rfc3986#appendix-B), minus the
/// characters that can never appear unescaped in an attribute.
static URI_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(([a-zA-Z0-9.+\-]+):)?(//([^/?#"<>]*))?([^?#"<>]*)(\?([^#"<>]*))?(#([^"<>]*))?"#)
        .expect("URI pattern is valid")
});

/// [§ 3.2 Authority](https://www.rfc-editor.org/rfc/rfc3986#section-3.2)
/// "authority = [ userinfo "@" ] host [ ":" port ]"
static AUTHORITY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^((.+?)@)?(\[[^\]]+\]|[^:]*)(:(\d*))?").expect("authority pattern is valid")
});

/// [§ 3.2.2 Host](https://www.rfc-editor.org/rfc/rfc3986#section-3.2.2), as a
/// DNS name: labels of letters, digits and inner hyphens.
static HOSTNAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)*([a-z0-9](?:[a-z0-9-]*[a-z0-9])?)\.?$")
        .expect("hostname pattern is valid")
});

/// A URI decomposed into its components.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Uri {
    /// Scheme, without the trailing colon.
    pub scheme: Option<String>,
    /// User information before `@`.
    pub userinfo: Option<String>,
    /// Host; `Some("")` for an empty authority (`file:///x`).
    pub host: Option<String>,
    /// Port number.
    pub port: Option<u32>,
    /// Path, possibly empty.
    pub path: String,
    /// Query, without the `?`.
    pub query: Option<String>,
    /// Fragment, without the `#`.
    pub fragment: Option<String>,
}

/// What a scheme permits.
#[derive(Debug, Clone, Copy)]
struct SchemeRules {
    default_port: Option<u32>,
    /// Whether the scheme can be fetched as an embedded resource.
    browsable: bool,
    /// Whether userinfo, host and port are meaningless (`mailto:`).
    opaque: bool,
}

fn scheme_rules(scheme: &str) -> Option<SchemeRules> {
    let rules = |default_port, browsable, opaque| SchemeRules {
        default_port,
        browsable,
        opaque,
    };
    match scheme {
        "http" => Some(rules(Some(80), true, false)),
        "https" => Some(rules(Some(443), true, false)),
        "ftp" => Some(rules(Some(21), true, false)),
        "nntp" => Some(rules(Some(119), false, false)),
        "news" | "mailto" | "tel" => Some(rules(None, false, true)),
        "file" => Some(rules(None, false, false)),
        _ => None,
    }
}

/// Schemes that are never allowed, whatever the configuration says.
const BLOCKED_SCHEMES: [&str; 3] = ["javascript", "vbscript", "data"];

/// Configuration relevant to URI validation.
#[derive(Debug, Clone)]
pub struct UriSettings {
    /// `URI.AllowedSchemes`
    pub allowed_schemes: HashSet<String>,
    /// `URI.Disable`
    pub disable: bool,
    /// `URI.Host`: the host considered local.
    pub host: Option<String>,
    /// `URI.DisableExternalResources`
    pub disable_external_resources: bool,
    /// Scheme assumed for relative references.
    pub default_scheme: String,
}

impl Default for UriSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl UriSettings {
    /// Read the `URI.*` directives.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            allowed_schemes: config
                .get_set("URI.AllowedSchemes")
                .into_iter()
                .map(|s| s.to_ascii_lowercase())
                .collect(),
            disable: config.get_bool("URI.Disable"),
            host: config.get_str("URI.Host").map(str::to_ascii_lowercase),
            disable_external_resources: config.get_bool("URI.DisableExternalResources"),
            default_scheme: "http".to_string(),
        }
    }
}

impl Uri {
    /// Split a URI reference into components.
    ///
    /// Invalid percent escapes are repaired first. Returns `None` only if
    /// the reference cannot be split at all.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let input = normalize_escapes(input);
        let caps = URI_PATTERN.captures(&input)?;
        let group = |i: usize| caps.get(i).map(|m| m.as_str().to_string());

        let (userinfo, host, port) = match caps.get(4) {
            Some(authority) => {
                let parts = AUTHORITY_PATTERN.captures(authority.as_str())?;
                let userinfo = parts.get(2).map(|m| m.as_str().to_string());
                let host = parts.get(3).map_or_else(String::new, |m| m.as_str().to_string());
                let port = parts
                    .get(5)
                    .map(|m| m.as_str().parse::<u32>().unwrap_or(0));
                (userinfo, Some(host), port)
            }
            None => (None, None, None),
        };

        Some(Self {
            scheme: group(2),
            userinfo,
            host,
            port,
            path: group(5).unwrap_or_default(),
            query: group(7),
            fragment: group(9),
        })
    }

    /// Normalize every component in place.
    ///
    /// Lower-cases scheme and host, drops an invalid host or port, drops
    /// the default scheme when no host remains, and percent-encodes each
    /// component against its character class.
    pub fn normalize(&mut self, settings: &UriSettings) {
        if let Some(scheme) = self.scheme.as_mut() {
            scheme.make_ascii_lowercase();
        }
        if let Some(host) = self.host.take() {
            self.host = validate_host(&host);
        }

        if self.scheme.as_deref() == Some(settings.default_scheme.as_str())
            && self.host.as_deref().is_none_or(str::is_empty)
        {
            self.scheme = None;
        }

        if let Some(userinfo) = self.userinfo.take() {
            self.userinfo = Some(percent_encode(&userinfo, &format!("{SUB_DELIMS}:")));
        }

        if self.port.is_some_and(|p| !(1..=65535).contains(&p)) {
            self.port = None;
        }

        let segment = format!("{SUB_DELIMS}{PCHAR_EXTRA}/");
        if self.host.is_some() {
            // path-abempty
            self.path = percent_encode(&self.path, &segment);
        } else if self.path.starts_with("//") {
            // The host was dropped; "//x" would be read as a new authority.
            self.path.clear();
        } else if self.path.starts_with('/') || self.scheme.is_some() {
            // path-absolute, path-rootless
            self.path = percent_encode(&self.path, &segment);
        } else if !self.path.is_empty() {
            // path-noscheme: no colon before the first slash.
            let first_segment = format!("{SUB_DELIMS}@");
            self.path = match self.path.split_once('/') {
                Some((head, tail)) => format!(
                    "{}/{}",
                    percent_encode(head, &first_segment),
                    percent_encode(tail, &segment)
                ),
                None => percent_encode(&self.path, &first_segment),
            };
        }

        let query = format!("{SUB_DELIMS}{PCHAR_EXTRA}/?");
        if let Some(q) = self.query.take() {
            self.query = Some(percent_encode(&q, &query));
        }
        if let Some(f) = self.fragment.take() {
            self.fragment = Some(percent_encode(&f, &query));
        }
    }

    /// Normalize and check against the scheme allow-list.
    ///
    /// `embedded` marks URIs the browser fetches on its own (`img src`),
    /// which must use a browsable scheme and, with
    /// `URI.DisableExternalResources`, point at the local host.
    #[must_use]
    pub fn validate(&mut self, settings: &UriSettings, embedded: bool) -> bool {
        if settings.disable {
            return false;
        }
        self.normalize(settings);

        let scheme = self
            .scheme
            .clone()
            .unwrap_or_else(|| settings.default_scheme.clone());
        if BLOCKED_SCHEMES.contains(&scheme.as_str()) || !settings.allowed_schemes.contains(&scheme) {
            return false;
        }
        let Some(rules) = scheme_rules(&scheme) else {
            return false;
        };
        if embedded && !rules.browsable {
            return false;
        }
        if rules.opaque {
            self.userinfo = None;
            self.host = None;
            self.port = None;
        }
        if matches!(scheme.as_str(), "http" | "https") {
            self.userinfo = None;
        }
        if self.port.is_some() && self.port == rules.default_port {
            self.port = None;
        }

        if embedded && settings.disable_external_resources {
            let external = self
                .host
                .as_deref()
                .is_some_and(|h| !h.is_empty() && Some(h) != settings.host.as_deref());
            if external {
                return false;
            }
        }
        true
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(scheme) = &self.scheme {
            write!(f, "{scheme}:")?;
        }
        if let Some(host) = &self.host {
            write!(f, "//")?;
            if let Some(userinfo) = &self.userinfo {
                write!(f, "{userinfo}@")?;
            }
            write!(f, "{host}")?;
            if let Some(port) = self.port {
                write!(f, ":{port}")?;
            }
        }
        write!(f, "{}", self.path)?;
        if let Some(query) = &self.query {
            write!(f, "?{query}")?;
        }
        if let Some(fragment) = &self.fragment {
            write!(f, "#{fragment}")?;
        }
        Ok(())
    }
}

/// [§ 3.2.2 Host](https://www.rfc-editor.org/rfc/rfc3986#section-3.2.2)
/// "host = IP-literal / IPv4address / reg-name"
fn validate_host(host: &str) -> Option<String> {
    if host.is_empty() {
        return Some(String::new());
    }
    if let Some(literal) = host.strip_prefix('[').and_then(|h| h.strip_suffix(']')) {
        return literal
            .parse::<Ipv6Addr>()
            .ok()
            .map(|ip| format!("[{ip}]"));
    }
    if let Ok(ip) = host.parse::<Ipv4Addr>() {
        return Some(ip.to_string());
    }
    let caps = HOSTNAME_PATTERN.captures(host)?;
    // An all-numeric top label is a mangled IPv4 address, not a name.
    if caps[1].bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(host.to_ascii_lowercase())
}

/// [§ 2.3 Unreserved Characters](https://www.rfc-editor.org/rfc/rfc3986#section-2.3)
/// "unreserved = ALPHA / DIGIT / "-" / "." / "_" / "~""
const fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~')
}

/// [§ 2.1 Percent-Encoding](https://www.rfc-editor.org/rfc/rfc3986#section-2.1)
///
/// Encode every byte that is neither unreserved nor in `preserve`. Existing
/// escapes are kept (upper-cased), and a `%` that does not start a valid
/// escape is itself encoded.
#[must_use]
pub fn percent_encode(input: &str, preserve: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'%' {
            if let Some(hex) = escape_at(bytes, i) {
                out.push('%');
                out.push_str(&hex);
                i += 3;
                continue;
            }
            out.push_str("%25");
        } else if is_unreserved(b) || preserve.as_bytes().contains(&b) {
            out.push(char::from(b));
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
        i += 1;
    }
    out
}

/// Repair escapes before splitting: decode escapes of unreserved
/// characters, upper-case the rest, and encode stray `%` signs.
fn normalize_escapes(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            match escape_at(bytes, i) {
                Some(hex) => {
                    let decoded = u8::from_str_radix(&hex, 16).unwrap_or(0);
                    if is_unreserved(decoded) {
                        out.push(decoded);
                    } else {
                        out.push(b'%');
                        out.extend_from_slice(hex.as_bytes());
                    }
                    i += 3;
                }
                None => {
                    out.extend_from_slice(b"%25");
                    i += 1;
                }
            }
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn escape_at(bytes: &[u8], i: usize) -> Option<String> {
    let hex = bytes.get(i + 1..i + 3)?;
    if hex.iter().all(u8::is_ascii_hexdigit) {
        Some(String::from_utf8_lossy(hex).to_ascii_uppercase())
    } else {
        None
    }
}
