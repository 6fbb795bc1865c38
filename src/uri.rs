use crate::{component::Scheme, error::ParseError, parse};
use borrow_or_share::{BorrowOrShare, Bos};
use std::{borrow::Borrow, cmp::Ordering, hash, num::NonZeroUsize, num::ParseIntError, str::FromStr};

#[cfg(feature = "serde")]
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Meta {
    // The index of the trailing colon.
    pub scheme_end: Option<NonZeroUsize>,
    pub auth_meta: Option<AuthMeta>,
    pub path_bounds: (usize, usize),
    // One byte past the last byte of query.
    pub query_end: Option<NonZeroUsize>,
}

impl Meta {
    fn query_or_path_end(&self) -> usize {
        self.query_end.map_or(self.path_bounds.1, |i| i.get())
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct AuthMeta {
    pub host_bounds: (usize, usize),
}

/// A validated URI reference as defined in [RFC 3986].
///
/// This is the value produced by [`UriBuilder`] once the assembled string
/// passes syntax validation. A relative reference such as `"x/y"` is accepted,
/// so the scheme is optional.
///
/// Two variants are available: `Uri<&str>` (borrowed) and `Uri<String>` (owned).
/// `Uri<&'a str>` outputs references with lifetime `'a` where possible
/// (thanks to [`borrow-or-share`](borrow_or_share)).
///
/// `Uri`s are compared by their byte values; no normalization is performed.
///
/// # Examples
///
/// ```
/// use uri_template::{component::Scheme, Uri};
///
/// const SCHEME_FOO: &Scheme = Scheme::new_or_panic("foo");
///
/// let uri = Uri::parse("foo://user@example.com:8042/over/there?name=ferret#nose")?;
///
/// assert_eq!(uri.scheme(), Some(SCHEME_FOO));
/// assert_eq!(uri.authority(), Some("user@example.com:8042"));
/// assert_eq!(uri.user_info(), Some("user"));
/// assert_eq!(uri.host(), Some("example.com"));
/// assert_eq!(uri.port(), Some("8042"));
/// assert_eq!(uri.port_to_u16(), Ok(Some(8042)));
/// assert_eq!(uri.path(), "/over/there");
/// assert_eq!(uri.query(), Some("name=ferret"));
/// assert_eq!(uri.fragment(), Some("nose"));
/// # Ok::<_, uri_template::ParseError>(())
/// ```
///
/// [RFC 3986]: https://datatracker.ietf.org/doc/html/rfc3986
/// [`UriBuilder`]: crate::UriBuilder
#[derive(Clone, Copy)]
pub struct Uri<T> {
    val: T,
    // Identical to parser output with `val` as input.
    meta: Meta,
}

/// Input types accepted by [`Uri::parse`].
pub trait Parse {
    /// The storage type of the parsed `Uri`.
    type Val;
    /// The error type, which hands an owned input back on failure.
    type Err;

    #[doc(hidden)]
    fn parse(self) -> Result<Uri<Self::Val>, Self::Err>;
}

impl<'a> Parse for &'a str {
    type Val = &'a str;
    type Err = ParseError;

    fn parse(self) -> Result<Uri<&'a str>, ParseError> {
        parse::parse(self.as_bytes()).map(|meta| Uri { val: self, meta })
    }
}

impl Parse for String {
    type Val = Self;
    type Err = (ParseError, Self);

    fn parse(self) -> Result<Uri<String>, Self::Err> {
        match parse::parse(self.as_bytes()) {
            Ok(meta) => Ok(Uri { val: self, meta }),
            Err(e) => Err((e, self)),
        }
    }
}

impl<T> Uri<T> {
    /// Parses a URI reference from a string into a `Uri`.
    ///
    /// The return type is
    ///
    /// - `Result<Uri<&str>, ParseError>` for `I = &str`;
    /// - `Result<Uri<String>, (ParseError, String)>` for `I = String`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the string does not match the
    /// [`URI-reference`][abnf] ABNF rule from RFC 3986.
    ///
    /// [abnf]: https://datatracker.ietf.org/doc/html/rfc3986#section-4.1
    pub fn parse<I>(input: I) -> Result<Self, I::Err>
    where
        I: Parse<Val = T>,
    {
        input.parse()
    }
}

impl Uri<String> {
    /// Borrows this `Uri<String>` as `Uri<&str>`.
    #[allow(clippy::should_implement_trait)]
    #[inline]
    #[must_use]
    pub fn borrow(&self) -> Uri<&str> {
        Uri {
            val: &self.val,
            meta: self.meta,
        }
    }

    /// Consumes this `Uri<String>` and yields the underlying [`String`].
    #[inline]
    #[must_use]
    pub fn into_string(self) -> String {
        self.val
    }
}

impl Uri<&str> {
    /// Creates a new `Uri<String>` by cloning the contents of this `Uri<&str>`.
    #[inline]
    #[must_use]
    pub fn to_owned(&self) -> Uri<String> {
        Uri {
            val: self.val.to_owned(),
            meta: self.meta,
        }
    }
}

impl<'i, 'o, T: BorrowOrShare<'i, 'o, str>> Uri<T> {
    /// Returns the URI reference as a string slice.
    #[must_use]
    pub fn as_str(&'i self) -> &'o str {
        self.val.borrow_or_share()
    }

    fn slice(&'i self, start: usize, end: usize) -> &'o str {
        &self.as_str()[start..end]
    }

    fn authority_start(&self) -> usize {
        self.meta.scheme_end.map_or(2, |i| i.get() + 3)
    }

    /// Returns the optional [scheme] component.
    ///
    /// [scheme]: https://datatracker.ietf.org/doc/html/rfc3986#section-3.1
    #[must_use]
    pub fn scheme(&'i self) -> Option<&'o Scheme> {
        let end = self.meta.scheme_end?.get();
        Some(Scheme::new_validated(self.slice(0, end)))
    }

    /// Returns the optional [authority] component.
    ///
    /// [authority]: https://datatracker.ietf.org/doc/html/rfc3986#section-3.2
    ///
    /// # Examples
    ///
    /// ```
    /// use uri_template::Uri;
    ///
    /// let uri = Uri::parse("http://example.com/")?;
    /// assert_eq!(uri.authority(), Some("example.com"));
    ///
    /// let uri = Uri::parse("mailto:user@example.com")?;
    /// assert_eq!(uri.authority(), None);
    /// # Ok::<_, uri_template::ParseError>(())
    /// ```
    #[must_use]
    pub fn authority(&'i self) -> Option<&'o str> {
        self.meta.auth_meta?;
        Some(self.slice(self.authority_start(), self.meta.path_bounds.0))
    }

    /// Returns the optional [userinfo] subcomponent.
    ///
    /// [userinfo]: https://datatracker.ietf.org/doc/html/rfc3986#section-3.2.1
    #[must_use]
    pub fn user_info(&'i self) -> Option<&'o str> {
        let host_start = self.meta.auth_meta?.host_bounds.0;
        let start = self.authority_start();
        (host_start != start).then(|| self.slice(start, host_start - 1))
    }

    /// Returns the [host] subcomponent, if an authority is present.
    ///
    /// An IPv6 literal is returned with its brackets.
    ///
    /// [host]: https://datatracker.ietf.org/doc/html/rfc3986#section-3.2.2
    #[must_use]
    pub fn host(&'i self) -> Option<&'o str> {
        let (start, end) = self.meta.auth_meta?.host_bounds;
        Some(self.slice(start, end))
    }

    /// Returns the optional [port] subcomponent.
    ///
    /// The port may be empty, as in `"http://example.com:/"`.
    ///
    /// [port]: https://datatracker.ietf.org/doc/html/rfc3986#section-3.2.3
    #[must_use]
    pub fn port(&'i self) -> Option<&'o str> {
        let host_end = self.meta.auth_meta?.host_bounds.1;
        let end = self.meta.path_bounds.0;
        (host_end != end).then(|| self.slice(host_end + 1, end))
    }

    /// Converts the port subcomponent to `u16`, if present and nonempty.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the port cannot be represented as `u16`.
    pub fn port_to_u16(&'i self) -> Result<Option<u16>, ParseIntError> {
        self.port()
            .filter(|port| !port.is_empty())
            .map(|port| port.parse())
            .transpose()
    }

    /// Returns the [path] component, which is always present but may be empty.
    ///
    /// [path]: https://datatracker.ietf.org/doc/html/rfc3986#section-3.3
    #[must_use]
    pub fn path(&'i self) -> &'o str {
        self.slice(self.meta.path_bounds.0, self.meta.path_bounds.1)
    }

    /// Returns the optional [query] component.
    ///
    /// [query]: https://datatracker.ietf.org/doc/html/rfc3986#section-3.4
    #[must_use]
    pub fn query(&'i self) -> Option<&'o str> {
        let end = self.meta.query_end?.get();
        Some(self.slice(self.meta.path_bounds.1 + 1, end))
    }

    /// Returns the optional [fragment] component.
    ///
    /// [fragment]: https://datatracker.ietf.org/doc/html/rfc3986#section-3.5
    #[must_use]
    pub fn fragment(&'i self) -> Option<&'o str> {
        let start = self.meta.query_or_path_end();
        let len = self.as_str().len();
        (start != len).then(|| self.slice(start + 1, len))
    }

    /// Checks whether the URI is opaque: it has a scheme, no authority,
    /// and a nonempty path that does not start with `'/'`.
    ///
    /// ```
    /// use uri_template::Uri;
    ///
    /// assert!(Uri::parse("mailto:a@example.com")?.is_opaque());
    /// assert!(!Uri::parse("file:/etc/hosts")?.is_opaque());
    /// assert!(!Uri::parse("a/b")?.is_opaque());
    /// # Ok::<_, uri_template::ParseError>(())
    /// ```
    #[must_use]
    pub fn is_opaque(&'i self) -> bool {
        let path = self.path();
        self.meta.scheme_end.is_some()
            && self.meta.auth_meta.is_none()
            && !path.is_empty()
            && !path.starts_with('/')
    }

    /// Returns the part between the scheme and the fragment.
    pub(crate) fn scheme_specific_part(&'i self) -> &'o str {
        let start = self.meta.scheme_end.map_or(0, |i| i.get() + 1);
        self.slice(start, self.meta.query_or_path_end())
    }
}

impl<T: Bos<str>> PartialEq for Uri<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl<T: Bos<str>> PartialEq<str> for Uri<T> {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl<T: Bos<str>> PartialEq<&str> for Uri<T> {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl<T: Bos<str>> Eq for Uri<T> {}

impl<T: Bos<str>> hash::Hash for Uri<T> {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl<T: Bos<str>> PartialOrd for Uri<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Bos<str>> Ord for Uri<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl<T: Bos<str>> AsRef<str> for Uri<T> {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl<T: Bos<str>> Borrow<str> for Uri<T> {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl<'a> TryFrom<&'a str> for Uri<&'a str> {
    type Error = ParseError;

    /// Equivalent to [`parse`](Self::parse).
    #[inline]
    fn try_from(value: &'a str) -> Result<Self, Self::Error> {
        Uri::parse(value)
    }
}

impl TryFrom<String> for Uri<String> {
    type Error = (ParseError, String);

    /// Equivalent to [`parse`](Self::parse).
    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        Uri::parse(value)
    }
}

impl From<Uri<String>> for String {
    /// Equivalent to [`into_string`](Uri::into_string).
    #[inline]
    fn from(value: Uri<String>) -> String {
        value.val
    }
}

impl From<Uri<&str>> for Uri<String> {
    /// Equivalent to [`to_owned`](Uri::to_owned).
    #[inline]
    fn from(value: Uri<&str>) -> Self {
        value.to_owned()
    }
}

impl FromStr for Uri<String> {
    type Err = ParseError;

    /// Equivalent to `Uri::parse(s).map(|r| r.to_owned())`.
    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uri::parse(s).map(|r| r.to_owned())
    }
}

#[cfg(feature = "serde")]
impl<T: Bos<str>> Serialize for Uri<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Uri<&'de str> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = <&str>::deserialize(deserializer)?;
        Uri::parse(s).map_err(|e| {
            de::Error::custom(format_args!("failed to parse {s:?} as URI reference: {e}"))
        })
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Uri<String> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Uri::parse(s).map_err(|(e, s)| {
            de::Error::custom(format_args!("failed to parse {s:?} as URI reference: {e}"))
        })
    }
}
