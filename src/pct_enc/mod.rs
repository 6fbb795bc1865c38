//! Percent-encoding utilities keyed by URI component.
//!
//! Every component of a URI has its own set of characters that may appear
//! unencoded. [`Component`] names the components this crate knows about and
//! maps each of them to a [`Table`]; the functions in this module encode and
//! decode strings against those tables.

pub mod table;

pub use table::Table;

use crate::multimap::MultivaluedMap;
use std::{borrow::Cow, iter::FusedIterator, str};

/// A component of a URI, each with its own legal-character rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Component {
    /// The scheme, e.g. `http`.
    Scheme,
    /// The opaque part of a URI such as `mailto:a@example.com`.
    SchemeSpecificPart,
    /// The whole authority, used when it cannot be split into its parts.
    Authority,
    /// The user information before `"@"`.
    UserInfo,
    /// A registered name or IP literal.
    Host,
    /// The decimal port.
    Port,
    /// The path, where `"/"` separates segments.
    Path,
    /// A single path segment; `"/"` is encoded.
    PathSegment,
    /// A name or value of a matrix parameter.
    MatrixParam,
    /// The query.
    Query,
    /// A name or value of a query parameter.
    QueryParam,
    /// The fragment.
    Fragment,
}

impl Component {
    /// Returns the table of byte patterns allowed in this component.
    #[must_use]
    pub const fn table(self) -> Table {
        match self {
            Self::Scheme => table::SCHEME,
            Self::SchemeSpecificPart => table::SCHEME_SPECIFIC_PART,
            Self::Authority => table::AUTHORITY,
            Self::UserInfo => table::USERINFO,
            Self::Host => table::REG_NAME,
            Self::Port => table::PORT,
            Self::Path => table::PATH,
            Self::PathSegment => table::SEGMENT,
            Self::MatrixParam => table::MATRIX_PARAM,
            Self::Query => table::QUERY,
            Self::QueryParam => table::QUERY_PARAM,
            Self::Fragment => table::FRAGMENT,
        }
    }
}

pub(crate) const fn is_hexdig(x: u8) -> bool {
    x.is_ascii_hexdigit()
}

pub(crate) const fn is_hexdig_pair(x: u8, y: u8) -> bool {
    is_hexdig(x) && is_hexdig(y)
}

pub(crate) const fn decode_hexdigit(x: u8) -> Option<u8> {
    match x {
        b'0'..=b'9' => Some(x - b'0'),
        b'A'..=b'F' => Some(x - b'A' + 10),
        b'a'..=b'f' => Some(x - b'a' + 10),
        _ => None,
    }
}

/// Checks whether the bytes at `i` start a percent-encoded octet.
fn is_pct_encoded_at(s: &[u8], i: usize) -> bool {
    matches!(s.get(i..i + 3), Some(&[b'%', hi, lo]) if is_hexdig_pair(hi, lo))
}

pub(crate) fn encode_byte(x: u8) -> &'static str {
    const TABLE: &[u8; 256 * 3] = &{
        const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

        let mut i = 0;
        let mut table = [0; 256 * 3];
        while i < 256 {
            table[i * 3] = b'%';
            table[i * 3 + 1] = HEX_DIGITS[i >> 4];
            table[i * 3 + 2] = HEX_DIGITS[i & 0b1111];
            i += 1;
        }
        table
    };

    const TABLE_STR: &str = match str::from_utf8(TABLE) {
        Ok(s) => s,
        Err(_) => unreachable!(),
    };

    &TABLE_STR[x as usize * 3..x as usize * 3 + 3]
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    // Every disallowed character is encoded, `%` included.
    Full,
    // Valid percent-encoded octets are kept.
    Contextual,
    // Like `Contextual`, with brace-delimited placeholders kept verbatim.
    Template,
}

/// Returns the byte length of the placeholder starting at `s[0] == b'{'`,
/// counting nested braces. An unterminated placeholder runs to the end.
pub(crate) fn placeholder_len(s: &[u8]) -> usize {
    let mut depth = 0usize;
    for (i, &x) in s.iter().enumerate() {
        match x {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return i + 1;
                }
            }
            _ => {}
        }
    }
    s.len()
}

fn encode_with(s: &str, component: Component, mode: Mode) -> Cow<'_, str> {
    let table = component.table();
    let bytes = s.as_bytes();

    let keep = |i: usize| -> usize {
        let x = bytes[i];
        if x == b'%' {
            if mode != Mode::Full && is_pct_encoded_at(bytes, i) {
                3
            } else {
                0
            }
        } else if x == b'{' && mode == Mode::Template {
            placeholder_len(&bytes[i..])
        } else if table.allows_ascii(x) {
            1
        } else {
            0
        }
    };

    // Fast path: nothing to encode.
    let mut i = 0;
    while i < bytes.len() {
        match keep(i) {
            0 => break,
            n => i += n,
        }
    }
    if i == bytes.len() {
        return Cow::Borrowed(s);
    }

    let mut buf = String::with_capacity(s.len() + 16);
    buf.push_str(&s[..i]);
    while i < bytes.len() {
        match keep(i) {
            0 => {
                buf.push_str(encode_byte(bytes[i]));
                i += 1;
            }
            n => {
                buf.push_str(&s[i..i + n]);
                i += n;
            }
        }
    }
    Cow::Owned(buf)
}

/// Percent-encodes every character not allowed by the component, including `'%'`.
///
/// Non-ASCII characters are encoded as their UTF-8 bytes.
///
/// # Examples
///
/// ```
/// use uri_template::pct_enc::{encode, Component};
///
/// assert_eq!(encode("a b/c", Component::PathSegment), "a%20b%2Fc");
/// assert_eq!(encode("100%", Component::Query), "100%25");
/// assert_eq!(encode("%41", Component::Query), "%2541");
/// ```
pub fn encode(s: &str, component: Component) -> Cow<'_, str> {
    encode_with(s, component, Mode::Full)
}

/// Percent-encodes every character not allowed by the component, leaving
/// valid percent-encoded octets untouched.
///
/// # Examples
///
/// ```
/// use uri_template::pct_enc::{contextual_encode, Component};
///
/// assert_eq!(contextual_encode("%41 %zz", Component::Query), "%41%20%25zz");
/// assert_eq!(contextual_encode("exämple.com", Component::Host), "ex%C3%A4mple.com");
/// ```
pub fn contextual_encode(s: &str, component: Component) -> Cow<'_, str> {
    encode_with(s, component, Mode::Contextual)
}

/// Contextually encodes a string while keeping `{...}` placeholders verbatim.
pub(crate) fn encode_template(s: &str, component: Component) -> Cow<'_, str> {
    encode_with(s, component, Mode::Template)
}

/// Checks whether the string is properly encoded for the component.
#[must_use]
pub fn validate(s: &str, component: Component) -> bool {
    component.table().validate(s.as_bytes())
}

/// Returns an iterator used to decode a percent-encoded string.
///
/// Decoding is lenient: a `'%'` that does not start a valid percent-encoded
/// octet is yielded unchanged.
pub fn decode(s: &str) -> Decode<'_> {
    Decode { source: s }
}

/// An iterator used to decode a percent-encoded string.
///
/// This struct is created by [`decode`].
#[derive(Clone, Debug)]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Decode<'a> {
    source: &'a str,
}

/// An item returned by the [`Decode`] iterator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodedChunk<'a> {
    /// An unencoded subslice.
    Unencoded(&'a str),
    /// A percent-encoded octet, decoded (for example, `"%20"` decoded as `0x20`).
    PctDecoded(u8),
}

impl<'a> Decode<'a> {
    fn next_if_unencoded(&mut self) -> Option<&'a str> {
        let bytes = self.source.as_bytes();
        let i = (0..bytes.len())
            .find(|&i| is_pct_encoded_at(bytes, i))
            .unwrap_or(bytes.len());

        if i == 0 {
            None
        } else {
            let s;
            (s, self.source) = self.source.split_at(i);
            Some(s)
        }
    }

    /// Decodes the string to bytes.
    ///
    /// This method allocates only when the string contains any percent-encoded octet.
    #[must_use]
    pub fn to_bytes(mut self) -> Cow<'a, [u8]> {
        let first = match self.next_if_unencoded() {
            Some(s) if self.source.is_empty() => return Cow::Borrowed(s.as_bytes()),
            Some(s) => s,
            None if self.source.is_empty() => return Cow::Borrowed(&[]),
            None => "",
        };

        let mut buf = Vec::with_capacity(first.len() + self.source.len());
        buf.extend_from_slice(first.as_bytes());
        for chunk in self {
            match chunk {
                DecodedChunk::Unencoded(s) => buf.extend_from_slice(s.as_bytes()),
                DecodedChunk::PctDecoded(x) => buf.push(x),
            }
        }
        Cow::Owned(buf)
    }

    /// Decodes the string, replacing any invalid UTF-8 sequences with
    /// [`U+FFFD REPLACEMENT CHARACTER`][U+FFFD].
    ///
    /// [U+FFFD]: char::REPLACEMENT_CHARACTER
    #[must_use]
    pub fn to_string_lossy(self) -> Cow<'a, str> {
        match self.to_bytes() {
            Cow::Borrowed(bytes) => String::from_utf8_lossy(bytes),
            Cow::Owned(bytes) => match String::from_utf8(bytes) {
                Ok(s) => Cow::Owned(s),
                Err(e) => Cow::Owned(String::from_utf8_lossy(e.as_bytes()).into_owned()),
            },
        }
    }
}

impl<'a> Iterator for Decode<'a> {
    type Item = DecodedChunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.source.is_empty() {
            None
        } else if let Some(s) = self.next_if_unencoded() {
            Some(DecodedChunk::Unencoded(s))
        } else {
            let s;
            (s, self.source) = self.source.split_at(3);
            let [_, hi, lo] = *s.as_bytes() else {
                unreachable!()
            };
            let x = decode_hexdigit(hi)? << 4 | decode_hexdigit(lo)?;
            Some(DecodedChunk::PctDecoded(x))
        }
    }
}

impl FusedIterator for Decode<'_> {}

fn decode_param(s: &str, decode_it: bool) -> String {
    if decode_it {
        decode(s).to_string_lossy().into_owned()
    } else {
        s.to_owned()
    }
}

fn add_param(map: &mut MultivaluedMap<String, String>, param: &str, decode_it: bool) {
    let (name, value) = param.split_once('=').unwrap_or((param, ""));
    if name.is_empty() {
        return;
    }
    map.add(decode_param(name, decode_it), decode_param(value, decode_it));
}

/// Parses an `'&'`-delimited query into an ordered parameter map.
///
/// A parameter without `'='` maps to the empty string. Parameters with
/// an empty name are skipped. When `decode` is `false`, names and values
/// are kept percent-encoded.
///
/// # Examples
///
/// ```
/// use uri_template::pct_enc::decode_query;
///
/// let map = decode_query("q=a%20b&flag&q=c", true);
/// assert_eq!(map.get("q").unwrap(), &["a b", "c"]);
/// assert_eq!(map.get_first("flag").unwrap(), "");
/// ```
#[must_use]
pub fn decode_query(query: &str, decode: bool) -> MultivaluedMap<String, String> {
    let mut map = MultivaluedMap::new();
    for param in query.split('&').filter(|p| !p.is_empty()) {
        add_param(&mut map, param, decode);
    }
    map
}

/// Parses the `';'`-delimited matrix parameters of a path segment.
///
/// The segment text before the first `';'` is skipped; a leading `'/'`
/// is allowed.
///
/// # Examples
///
/// ```
/// use uri_template::pct_enc::decode_matrix;
///
/// let map = decode_matrix("/cars;color=red;year=2012", false);
/// assert_eq!(map.get_first("color").unwrap(), "red");
/// assert_eq!(map.get_first("year").unwrap(), "2012");
/// ```
#[must_use]
pub fn decode_matrix(segment: &str, decode: bool) -> MultivaluedMap<String, String> {
    let mut map = MultivaluedMap::new();
    if let Some((_, params)) = segment.split_once(';') {
        for param in params.split(';').filter(|p| !p.is_empty()) {
            add_param(&mut map, param, decode);
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_modes() {
        assert_eq!(encode("a%2Fb", Component::Path), "a%252Fb");
        assert_eq!(contextual_encode("a%2Fb", Component::Path), "a%2Fb");
        assert_eq!(contextual_encode("a%2", Component::Path), "a%252");
        assert_eq!(encode_template("{id}/a b", Component::Path), "{id}/a%20b");
        assert_eq!(
            encode_template("{id: [0-9]{3}}x y", Component::PathSegment),
            "{id: [0-9]{3}}x%20y"
        );
        assert_eq!(encode("{id}", Component::Path), "%7Bid%7D");
    }

    #[test]
    fn encode_borrows_when_unchanged() {
        assert!(matches!(
            contextual_encode("plain", Component::Query),
            Cow::Borrowed("plain")
        ));
        assert!(matches!(
            encode("a b", Component::Query),
            Cow::Owned(_)
        ));
    }

    #[test]
    fn placeholder_len_counts_nesting() {
        assert_eq!(placeholder_len(b"{a}rest"), 3);
        assert_eq!(placeholder_len(b"{a:{1,2}}x"), 9);
        assert_eq!(placeholder_len(b"{a"), 2);
    }

    #[test]
    fn decode_chunks() {
        let chunks: Vec<_> = decode("a%20b%zz").collect();
        assert_eq!(
            chunks,
            [
                DecodedChunk::Unencoded("a"),
                DecodedChunk::PctDecoded(b' '),
                DecodedChunk::Unencoded("b%zz"),
            ]
        );
        assert_eq!(decode("%E6%B5%8B").to_string_lossy(), "测");
        assert_eq!(decode("%FF").to_string_lossy(), "\u{FFFD}");
        assert_eq!(&*decode("").to_bytes(), b"");
    }
}
