//! URI components.

use crate::pct_enc::{placeholder_len, table};
use ref_cast::{ref_cast_custom, RefCastCustom};

/// The [scheme] of a validated [`Uri`](crate::Uri).
///
/// Schemes compare case-insensitively, so `HTTP` equals `http`.
/// Compare [`as_str`](Self::as_str) values for an exact match.
///
/// [scheme]: https://datatracker.ietf.org/doc/html/rfc3986#section-3.1
///
/// # Examples
///
/// ```
/// use uri_template::{component::Scheme, UriBuilder};
///
/// const HTTPS: &Scheme = Scheme::new_or_panic("https");
///
/// let b = UriBuilder::from_template("{s}://example.com/")?;
/// let uri = b.build(&[&"HTTPS"])?;
/// assert_eq!(uri.scheme(), Some(HTTPS));
/// assert_eq!(uri.scheme().unwrap().as_str(), "HTTPS");
/// # Ok::<_, Box<dyn std::error::Error>>(())
/// ```
#[derive(RefCastCustom)]
#[repr(transparent)]
pub struct Scheme {
    inner: str,
}

impl Scheme {
    #[ref_cast_custom]
    #[inline]
    pub(crate) const fn new_validated(scheme: &str) -> &Scheme;

    /// Converts a string slice to `&Scheme`, panicking if it is not a scheme.
    ///
    /// Meant for constants; see [`new`](Self::new) for the fallible version.
    ///
    /// # Panics
    ///
    /// Panics if `s` is not a valid scheme.
    #[inline]
    #[must_use]
    pub const fn new_or_panic(s: &str) -> &Scheme {
        match Self::new(s) {
            Some(scheme) => scheme,
            None => panic!("invalid scheme"),
        }
    }

    /// Converts a string slice to `&Scheme`.
    ///
    /// Returns `None` unless `s` is a letter followed by letters, digits,
    /// `'+'`, `'-'` or `'.'`.
    ///
    /// ```
    /// use uri_template::component::Scheme;
    ///
    /// assert!(Scheme::new("svn+ssh").is_some());
    /// assert!(Scheme::new("1http").is_none());
    /// assert!(Scheme::new("{s}").is_none());
    /// ```
    #[inline]
    #[must_use]
    pub const fn new(s: &str) -> Option<&Scheme> {
        match s.as_bytes() {
            [first, rest @ ..] if first.is_ascii_alphabetic() && table::SCHEME.validate(rest) => {
                Some(Scheme::new_validated(s))
            }
            _ => None,
        }
    }

    /// Checks whether `s` is a scheme, or a template that may resolve to one.
    ///
    /// Outside placeholders only scheme characters are allowed, and text
    /// before the first placeholder must start with a letter.
    pub(crate) fn is_template(s: &str) -> bool {
        let bytes = s.as_bytes();
        match bytes.first() {
            Some(b'{') => {}
            Some(x) if x.is_ascii_alphabetic() => {}
            _ => return false,
        }

        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'{' {
                i += placeholder_len(&bytes[i..]);
            } else if table::SCHEME.allows_ascii(bytes[i]) {
                i += 1;
            } else {
                return false;
            }
        }
        true
    }

    /// Returns the scheme as written.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.inner
    }
}

impl PartialEq for Scheme {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.inner.eq_ignore_ascii_case(&other.inner)
    }
}

impl Eq for Scheme {}
