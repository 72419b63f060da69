//! URL rewrites applied to the base URL before probing.
//!
//! Each transform is a pure `&str -> String` function with a name, so a run
//! can report which spelling of the URL produced which response.

use std::fmt::{self, Write};
use std::sync::Arc;

use percent_encoding::percent_decode_str;

/// Characters `percent_encode_safe` leaves alone unless told otherwise.
pub const DEFAULT_SAFE: &str = ":/";

type TransformFn = dyn Fn(&str) -> String + Send + Sync;

/// A named URL rewrite.
#[derive(Clone)]
pub struct EncodingTransform {
    name: String,
    apply: Arc<TransformFn>,
}

impl EncodingTransform {
    pub fn new(
        name: impl Into<String>,
        apply: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            apply: Arc::new(apply),
        }
    }

    /// The URL exactly as given.
    pub fn identity() -> Self {
        Self::new("identity", identity)
    }

    /// Percent-escapes decoded, scheme and authority untouched.
    pub fn percent_decode() -> Self {
        Self::new("percentDecode", percent_decode)
    }

    /// Whole URL re-encoded except for `safe`. Already-encoded input gets
    /// encoded twice (`%20` becomes `%2520`).
    pub fn percent_encode_safe(safe: impl Into<String>) -> Self {
        let safe = safe.into();
        Self::new("percentEncodeSafe", move |url| percent_encode_safe(url, &safe))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn apply(&self, url: &str) -> String {
        (self.apply)(url)
    }
}

impl fmt::Debug for EncodingTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodingTransform")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// `identity`, `percentDecode` and `percentEncodeSafe`, in that order.
pub fn canonical_variants(safe: &str) -> Vec<EncodingTransform> {
    vec![
        EncodingTransform::identity(),
        EncodingTransform::percent_decode(),
        EncodingTransform::percent_encode_safe(safe),
    ]
}

pub fn identity(url: &str) -> String {
    url.to_string()
}

/// Decode `%XX` escapes after the authority. Malformed escapes are kept as
/// written, invalid UTF-8 is replaced with U+FFFD, and `+` stays `+`.
pub fn percent_decode(url: &str) -> String {
    let (prefix, rest) = split_authority(url);
    let decoded = percent_decode_str(rest).decode_utf8_lossy();
    format!("{prefix}{decoded}")
}

/// Escape every byte that is not unreserved and not listed in `safe`.
/// Non-ASCII characters in `safe` are ignored.
pub fn percent_encode_safe(url: &str, safe: &str) -> String {
    let safe: Vec<u8> = safe.bytes().filter(u8::is_ascii).collect();
    let mut out = String::with_capacity(url.len());
    for b in url.bytes() {
        if is_unreserved(b) || safe.contains(&b) {
            out.push(char::from(b));
        } else {
            let _ = write!(out, "%{b:02X}");
        }
    }
    out
}

/// RFC 3986 unreserved characters, never escaped.
fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~')
}

/// Split `scheme://authority` from the path, query and fragment.
fn split_authority(url: &str) -> (&str, &str) {
    let Some(scheme_end) = url.find("://") else {
        return ("", url);
    };
    let authority_start = scheme_end + 3;
    let authority_end = url[authority_start..]
        .find(['/', '?', '#'])
        .map_or(url.len(), |i| authority_start + i);
    url.split_at(authority_end)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://example.test/objects/Mini%20Drone/model.sdf";

    #[test]
    fn test_canonical_example() {
        let variants = canonical_variants(DEFAULT_SAFE);
        let names: Vec<&str> = variants.iter().map(|v| v.name()).collect();
        assert_eq!(names, ["identity", "percentDecode", "percentEncodeSafe"]);

        assert_eq!(variants[0].apply(BASE), BASE);
        assert_eq!(
            variants[1].apply(BASE),
            "https://example.test/objects/Mini Drone/model.sdf"
        );
        assert_eq!(
            variants[2].apply(BASE),
            "https://example.test/objects/Mini%2520Drone/model.sdf"
        );
    }

    #[test]
    fn test_decode_is_noop_without_escapes() {
        for url in [
            "https://example.test/",
            "http://example.test:8080/a/b.txt?x=1#frag",
            "https://example.test/with space/and+plus",
        ] {
            assert_eq!(percent_decode(url), identity(url));
        }
    }

    #[test]
    fn test_decode_reverses_encode_for_segment() {
        for segment in ["Mini Drone Reconnaissance", "a/b:c?d#e", "100% sure", "ünïcødé"] {
            let encoded = percent_encode_safe(segment, "");
            assert!(!encoded.contains(' '));
            let url = format!("https://example.test/{encoded}");
            assert_eq!(percent_decode(&url), format!("https://example.test/{segment}"));
        }
    }

    #[test]
    fn test_decode_leaves_authority_untouched() {
        assert_eq!(
            percent_decode("https://user%40mail:pw@example.test/a%2Fb"),
            "https://user%40mail:pw@example.test/a/b"
        );
        assert_eq!(
            percent_decode("https://example.test?q=a%26b"),
            "https://example.test?q=a&b"
        );
    }

    #[test]
    fn test_decode_keeps_malformed_escapes() {
        assert_eq!(
            percent_decode("https://example.test/50%/%zz/%2"),
            "https://example.test/50%/%zz/%2"
        );
    }

    #[test]
    fn test_encode_safe_defaults() {
        assert_eq!(
            percent_encode_safe("https://example.test/a b", DEFAULT_SAFE),
            "https://example.test/a%20b"
        );
        assert_eq!(
            percent_encode_safe("http://h:80/x?y=1&z", DEFAULT_SAFE),
            "http://h:80/x%3Fy%3D1%26z"
        );
        assert_eq!(percent_encode_safe("-_.~", DEFAULT_SAFE), "-_.~");
    }

    #[test]
    fn test_encode_safe_custom_set() {
        assert_eq!(percent_encode_safe("a:b/c", ""), "a%3Ab%2Fc");
        assert_eq!(percent_encode_safe("a?b=c", "?="), "a?b=c");
        assert_eq!(percent_encode_safe("é", "é"), "%C3%A9");
    }

    #[test]
    fn test_custom_transform() {
        let upper = EncodingTransform::new("upper", |url| url.to_uppercase());
        assert_eq!(upper.name(), "upper");
        assert_eq!(upper.apply("http://a/b"), "HTTP://A/B");
        assert!(format!("{upper:?}").contains("upper"));
    }
}
