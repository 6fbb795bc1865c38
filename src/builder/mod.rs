//! Incremental construction of URIs.

mod path;
mod split;

use crate::{
    component::Scheme,
    error::{BuildError, TemplateError, UsageError},
    ip::{self, IpLiteral},
    multimap::MultivaluedMap,
    pct_enc::{self, encode_template, Component},
    template::{
        resolve::{self, Binder, Values},
        UriTemplate,
    },
    Uri,
};
use borrow_or_share::Bos;
use path::PathBuf;
use split::Authority;
use std::{collections::HashMap, convert::Infallible, fmt};
use tracing::{debug, trace};

type Params = MultivaluedMap<String, String>;

/// A builder for URIs, with support for URI templates.
///
/// Every mutator percent-encodes its input for the component it targets
/// before storing it. Valid percent-encoded octets and `{...}` placeholders
/// are kept as they are, so the builder always holds a URI template that
/// a final [`build`](Self::build) call resolves and validates.
///
/// A URI is either hierarchical, with an authority, a path and a query,
/// or opaque, with a [scheme-specific part](Self::scheme_specific_part).
/// Hierarchical mutators fail with [`UsageError::Opaque`] on an opaque
/// builder. A mutator that returns `Err` leaves the builder unchanged.
///
/// Building takes `&self` and never alters the builder, so one builder may
/// produce many URIs. Pending parameter maps are rendered on the fly. Build
/// from a shared reference concurrently if needed; mutation requires
/// exclusive access, so clone the builder to vary it per thread.
///
/// # Examples
///
/// ```
/// use uri_template::UriBuilder;
///
/// let mut b = UriBuilder::new();
/// b.scheme("https")?
///     .host("example.com")?
///     .path("/users/{id}")?
///     .matrix_param("lang", &[&"en"])?
///     .query_param("q", &[&"a b"])?
///     .fragment("top");
///
/// let uri = b.build(&[&42])?;
/// assert_eq!(uri.as_str(), "https://example.com/users/42;lang=en?q=a%20b#top");
/// # Ok::<_, Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct UriBuilder {
    scheme: Option<String>,
    ssp: Option<String>,
    // Used only when user information, host and port are all absent.
    authority: Option<String>,
    user_info: Option<String>,
    host: Option<String>,
    port: Option<String>,
    path: PathBuf,
    query: String,
    query_params: Option<Params>,
    fragment: Option<String>,
}

/// Collects named values into the map form the resolvers expect.
fn collect_values<I, K, V>(values: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: fmt::Display,
{
    values
        .into_iter()
        .map(|(k, v)| (k.as_ref().to_owned(), v.to_string()))
        .collect()
}

fn render_query(params: &Params) -> String {
    let mut buf = String::new();
    for (name, values) in params {
        for value in values {
            if !buf.is_empty() {
                buf.push('&');
            }
            buf.push_str(name);
            buf.push('=');
            buf.push_str(value);
        }
    }
    buf
}

/// Encodes a host, keeping IP literals verbatim.
///
/// An IPv6 address without brackets is bracketed.
fn encode_host(host: &str) -> String {
    if ip::parse_host_literal(host).is_some() {
        host.to_owned()
    } else if let Some(IpLiteral::V6(_)) = ip::text_to_bytes(host) {
        format!("[{host}]")
    } else {
        encode_template(host, Component::Host).into_owned()
    }
}

/// Substitutes the placeholders of `s` that have a value, keeping the others.
fn resolve_known(
    s: &str,
    values: &HashMap<String, String>,
    component: Component,
    encode: bool,
) -> Result<String, TemplateError> {
    if !s.contains('{') {
        return Ok(s.to_owned());
    }
    let template = UriTemplate::new(s)?;
    Ok(resolve::resolve_partial(&template, values, component, encode))
}

fn resolve_known_opt(
    s: &mut Option<String>,
    values: &HashMap<String, String>,
    component: Component,
    encode: bool,
) -> Result<(), TemplateError> {
    if let Some(s) = s {
        *s = resolve_known(s, values, component, encode)?;
    }
    Ok(())
}

impl UriBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder holding the components of a URI.
    ///
    /// ```
    /// use uri_template::{Uri, UriBuilder};
    ///
    /// let uri = Uri::parse("http://example.com/a?x=1")?;
    /// let mut b = UriBuilder::from_uri(&uri);
    /// b.path("b")?.query_param("y", &[&2])?;
    /// assert_eq!(b.build(&[])?.as_str(), "http://example.com/a/b?x=1&y=2");
    /// # Ok::<_, Box<dyn std::error::Error>>(())
    /// ```
    #[must_use]
    pub fn from_uri<T: Bos<str>>(uri: &Uri<T>) -> Self {
        let mut b = Self::new();
        b.scheme = uri.scheme().map(|s| s.as_str().to_owned());
        if uri.is_opaque() {
            b.ssp = Some(uri.scheme_specific_part().to_owned());
        } else {
            if uri.authority().is_some() {
                b.user_info = uri.user_info().map(str::to_owned);
                b.host = uri.host().map(str::to_owned);
                b.port = uri.port().filter(|p| !p.is_empty()).map(str::to_owned);
            }
            b.path.append(uri.path(), false);
            b.query = uri.query().unwrap_or_default().to_owned();
        }
        b.fragment = uri.fragment().map(str::to_owned);
        b
    }

    /// Creates a builder from a URI template.
    ///
    /// The template is split into components without looking inside
    /// placeholders, so `{host: [a-z:]+}` stays whole.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the template is malformed.
    ///
    /// ```
    /// use uri_template::UriBuilder;
    ///
    /// let b = UriBuilder::from_template("{scheme}://{host}:{port}/items/{id: [0-9]+}")?;
    /// let uri = b.build(&[&"http", &"example.com", &8080, &7])?;
    /// assert_eq!(uri.as_str(), "http://example.com:8080/items/7");
    /// # Ok::<_, Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_template(template: &str) -> Result<Self, UsageError> {
        UriTemplate::new(template)?;
        let parts = split::split(template);

        let mut b = Self::new();
        b.scheme = parts.scheme.map(str::to_owned);
        if let Some(ssp) = parts.scheme_specific_part {
            b.ssp = Some(encode_template(ssp, Component::SchemeSpecificPart).into_owned());
        } else {
            b.set_hierarchical(&parts);
        }
        b.fragment = parts
            .fragment
            .map(|f| encode_template(f, Component::Fragment).into_owned());
        Ok(b)
    }

    fn set_hierarchical(&mut self, parts: &split::Parts<'_>) {
        match parts.authority {
            Some(Authority::Raw(authority)) => {
                self.authority = Some(encode_template(authority, Component::Authority).into_owned());
            }
            Some(Authority::Server {
                user_info,
                host,
                port,
            }) => {
                self.user_info = user_info.map(|u| encode_template(u, Component::UserInfo).into_owned());
                self.host = Some(encode_host(host));
                self.port = port.map(str::to_owned);
            }
            None => {}
        }
        self.path.append(parts.path, false);
        if let Some(query) = parts.query {
            self.query = encode_template(query, Component::Query).into_owned();
        }
    }

    fn clear_hierarchical(&mut self) {
        self.authority = None;
        self.user_info = None;
        self.host = None;
        self.port = None;
        self.path.clear();
        self.query.clear();
        self.query_params = None;
    }

    fn check_hierarchical(&self) -> Result<(), UsageError> {
        if self.ssp.is_some() {
            Err(UsageError::Opaque)
        } else {
            Ok(())
        }
    }

    /// Checks whether the builder holds an opaque scheme-specific part.
    #[must_use]
    pub fn is_opaque(&self) -> bool {
        self.ssp.is_some()
    }

    /// Sets the scheme, which may contain placeholders.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `scheme` is not a valid scheme.
    pub fn scheme(&mut self, scheme: &str) -> Result<&mut Self, UsageError> {
        if !Scheme::is_template(scheme) {
            return Err(UsageError::InvalidScheme(scheme.to_owned()));
        }
        self.scheme = Some(scheme.to_owned());
        Ok(self)
    }

    /// Removes the scheme.
    pub fn remove_scheme(&mut self) -> &mut Self {
        self.scheme = None;
        self
    }

    /// Sets the part between the scheme and the fragment.
    ///
    /// Text starting with `'/'` (or empty text) replaces the authority, path
    /// and query, leaving the builder hierarchical. Any other text makes the
    /// builder opaque and clears the hierarchical components.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `ssp` contains a malformed template.
    ///
    /// ```
    /// use uri_template::UriBuilder;
    ///
    /// let mut b = UriBuilder::from_template("mailto:x@example.com")?;
    /// b.scheme_specific_part("{user}@example.com")?;
    /// assert!(b.is_opaque());
    /// assert_eq!(b.build(&[&"y"])?.as_str(), "mailto:y@example.com");
    /// # Ok::<_, Box<dyn std::error::Error>>(())
    /// ```
    pub fn scheme_specific_part(&mut self, ssp: &str) -> Result<&mut Self, UsageError> {
        UriTemplate::new(ssp)?;
        self.clear_hierarchical();
        if ssp.is_empty() || ssp.starts_with('/') {
            self.ssp = None;
            let parts = split::split(ssp);
            self.set_hierarchical(&parts);
        } else {
            self.ssp = Some(encode_template(ssp, Component::SchemeSpecificPart).into_owned());
        }
        Ok(self)
    }

    /// Removes the scheme-specific part, making the builder hierarchical again.
    pub fn remove_scheme_specific_part(&mut self) -> &mut Self {
        self.ssp = None;
        self
    }

    /// Sets the user information.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the builder is opaque.
    pub fn user_info(&mut self, user_info: &str) -> Result<&mut Self, UsageError> {
        self.check_hierarchical()?;
        self.user_info = Some(encode_template(user_info, Component::UserInfo).into_owned());
        Ok(self)
    }

    /// Removes the user information.
    pub fn remove_user_info(&mut self) -> &mut Self {
        self.user_info = None;
        self
    }

    /// Sets the host.
    ///
    /// An IPv4 address or a bracketed IPv6 address is stored as given, and a
    /// bare IPv6 address gets brackets. Anything else is encoded as a
    /// registered name.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the builder is opaque or `host` is empty.
    ///
    /// ```
    /// use uri_template::UriBuilder;
    ///
    /// let mut b = UriBuilder::new();
    /// b.scheme("http")?.host("::1")?.port(8080)?;
    /// assert_eq!(b.build(&[])?.as_str(), "http://[::1]:8080");
    /// b.host("exämple.com")?;
    /// assert_eq!(b.build(&[])?.as_str(), "http://ex%C3%A4mple.com:8080");
    /// # Ok::<_, Box<dyn std::error::Error>>(())
    /// ```
    pub fn host(&mut self, host: &str) -> Result<&mut Self, UsageError> {
        self.check_hierarchical()?;
        if host.is_empty() {
            return Err(UsageError::EmptyHost);
        }
        self.host = Some(encode_host(host));
        Ok(self)
    }

    /// Removes the host.
    pub fn remove_host(&mut self) -> &mut Self {
        self.host = None;
        self
    }

    /// Sets the port, or removes it if `port` is `-1`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the builder is opaque or `port` is less than `-1`.
    pub fn port(&mut self, port: i32) -> Result<&mut Self, UsageError> {
        self.check_hierarchical()?;
        match port {
            -1 => self.port = None,
            p if p < -1 => return Err(UsageError::InvalidPort(p)),
            p => self.port = Some(p.to_string()),
        }
        Ok(self)
    }

    /// Appends to the path, joining with a single `'/'`.
    ///
    /// Matrix parameters added so far stay with the segment they were added to.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the builder is opaque.
    ///
    /// ```
    /// use uri_template::UriBuilder;
    ///
    /// let mut b = UriBuilder::new();
    /// b.path("/a/")?.path("/b")?.path("c")?;
    /// assert_eq!(b.to_template(), "/a/b/c");
    /// # Ok::<_, uri_template::UsageError>(())
    /// ```
    pub fn path(&mut self, path: &str) -> Result<&mut Self, UsageError> {
        self.check_hierarchical()?;
        self.path.append(path, false);
        Ok(self)
    }

    /// Replaces the path, discarding its matrix parameters.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the builder is opaque.
    pub fn replace_path(&mut self, path: &str) -> Result<&mut Self, UsageError> {
        self.check_hierarchical()?;
        self.path.clear();
        self.path.append(path, false);
        Ok(self)
    }

    /// Appends path segments, encoding any `'/'` inside them.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the builder is opaque.
    ///
    /// ```
    /// use uri_template::UriBuilder;
    ///
    /// let mut b = UriBuilder::new();
    /// b.path("files")?.segment(["a/b", "c d"])?;
    /// assert_eq!(b.to_template(), "files/a%2Fb/c%20d");
    /// # Ok::<_, uri_template::UsageError>(())
    /// ```
    pub fn segment<I>(&mut self, segments: I) -> Result<&mut Self, UsageError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.check_hierarchical()?;
        for segment in segments {
            self.path.append(segment.as_ref(), true);
        }
        Ok(self)
    }

    fn encode_param(
        &self,
        name: &str,
        values: &[&dyn fmt::Display],
        component: Component,
    ) -> Result<(String, Vec<String>), UsageError> {
        self.check_hierarchical()?;
        if name.is_empty() {
            return Err(UsageError::EmptyName);
        }
        let name = encode_template(name, component).into_owned();
        let values = values
            .iter()
            .map(|v| encode_template(&v.to_string(), component).into_owned())
            .collect();
        Ok((name, values))
    }

    /// Adds a matrix parameter to the last path segment, once per value.
    ///
    /// An empty value is rendered without `'='`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the builder is opaque or `name` is empty.
    ///
    /// ```
    /// use uri_template::UriBuilder;
    ///
    /// let mut b = UriBuilder::new();
    /// b.path("widgets")?.matrix_param("color", &[&"red", &"blue"])?;
    /// assert_eq!(b.to_template(), "widgets;color=red;color=blue");
    /// # Ok::<_, uri_template::UsageError>(())
    /// ```
    pub fn matrix_param(
        &mut self,
        name: &str,
        values: &[&dyn fmt::Display],
    ) -> Result<&mut Self, UsageError> {
        let (name, values) = self.encode_param(name, values, Component::MatrixParam)?;
        for value in &values {
            self.path.add_matrix_param(&name, value);
        }
        Ok(self)
    }

    /// Replaces every value of a matrix parameter of the last path segment,
    /// or removes the parameter if `values` is empty.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the builder is opaque or `name` is empty.
    ///
    /// ```
    /// use uri_template::UriBuilder;
    ///
    /// let mut b = UriBuilder::from_template("/cars;color=red;year=2012")?;
    /// b.replace_matrix_param("color", &[&"blue"])?;
    /// b.replace_matrix_param("year", &[])?;
    /// assert_eq!(b.to_template(), "/cars;color=blue");
    /// # Ok::<_, uri_template::UsageError>(())
    /// ```
    pub fn replace_matrix_param(
        &mut self,
        name: &str,
        values: &[&dyn fmt::Display],
    ) -> Result<&mut Self, UsageError> {
        let (name, values) = self.encode_param(name, values, Component::MatrixParam)?;
        let params = self.path.pending_matrix();
        params.remove(&name);
        for value in values {
            params.add(name.clone(), value);
        }
        Ok(self)
    }

    /// Replaces the matrix parameters of the last path segment with
    /// `;`-delimited text, or removes them if `matrix` is empty.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the builder is opaque.
    pub fn replace_matrix(&mut self, matrix: &str) -> Result<&mut Self, UsageError> {
        self.check_hierarchical()?;
        self.path.replace_matrix(matrix);
        Ok(self)
    }

    /// Adds a query parameter, once per value.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the builder is opaque or `name` is empty.
    ///
    /// ```
    /// use uri_template::UriBuilder;
    ///
    /// let mut b = UriBuilder::new();
    /// b.query_param("q", &[&"a b"])?.query_param("q", &[&"c"])?;
    /// assert_eq!(b.to_template(), "?q=a%20b&q=c");
    /// # Ok::<_, uri_template::UsageError>(())
    /// ```
    pub fn query_param(
        &mut self,
        name: &str,
        values: &[&dyn fmt::Display],
    ) -> Result<&mut Self, UsageError> {
        let (name, values) = self.encode_param(name, values, Component::QueryParam)?;
        for value in values {
            match &mut self.query_params {
                Some(params) => params.add(name.clone(), value),
                None => {
                    if !self.query.is_empty() {
                        self.query.push('&');
                    }
                    self.query.push_str(&name);
                    self.query.push('=');
                    self.query.push_str(&value);
                }
            }
        }
        Ok(self)
    }

    fn pending_query(&mut self) -> &mut Params {
        let query = &mut self.query;
        self.query_params.get_or_insert_with(|| {
            let params = pct_enc::decode_query(query, false);
            query.clear();
            trace!(params = params.len(), "materialized query parameters");
            params
        })
    }

    /// Replaces every value of a query parameter, or removes the parameter
    /// if `values` is empty.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the builder is opaque or `name` is empty.
    pub fn replace_query_param(
        &mut self,
        name: &str,
        values: &[&dyn fmt::Display],
    ) -> Result<&mut Self, UsageError> {
        let (name, values) = self.encode_param(name, values, Component::QueryParam)?;
        let params = self.pending_query();
        params.remove(&name);
        for value in values {
            params.add(name.clone(), value);
        }
        Ok(self)
    }

    /// Replaces the query, or removes it if `query` is empty.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the builder is opaque.
    pub fn replace_query(&mut self, query: &str) -> Result<&mut Self, UsageError> {
        self.check_hierarchical()?;
        self.query_params = None;
        self.query = encode_template(query, Component::Query).into_owned();
        Ok(self)
    }

    /// Sets the fragment.
    pub fn fragment(&mut self, fragment: &str) -> &mut Self {
        self.fragment = Some(encode_template(fragment, Component::Fragment).into_owned());
        self
    }

    /// Removes the fragment.
    pub fn remove_fragment(&mut self) -> &mut Self {
        self.fragment = None;
        self
    }

    fn flush_query(&mut self) {
        if let Some(params) = self.query_params.take() {
            self.query = render_query(&params);
        }
    }

    fn query_text(&self) -> String {
        match &self.query_params {
            Some(params) => render_query(params),
            None => self.query.clone(),
        }
    }

    fn resolve_in_place(
        &mut self,
        values: &HashMap<String, String>,
        encode: bool,
        encode_slash: bool,
    ) -> Result<&mut Self, UsageError> {
        let mut next = self.clone();
        next.flush_query();

        resolve_known_opt(&mut next.scheme, values, Component::Scheme, false)?;
        resolve_known_opt(&mut next.ssp, values, Component::SchemeSpecificPart, encode)?;
        resolve_known_opt(&mut next.user_info, values, Component::UserInfo, encode)?;
        resolve_known_opt(&mut next.host, values, Component::Host, encode)?;
        resolve_known_opt(&mut next.port, values, Component::Port, false)?;
        resolve_known_opt(&mut next.authority, values, Component::Authority, encode)?;

        let path_component = if encode_slash {
            Component::PathSegment
        } else {
            Component::Path
        };
        let path = resolve_known(&next.path.render(), values, path_component, encode)?;
        next.path.set(path);
        next.query = resolve_known(&next.query, values, Component::QueryParam, encode)?;
        resolve_known_opt(&mut next.fragment, values, Component::Fragment, encode)?;

        *self = next;
        Ok(self)
    }

    /// Substitutes a value for every placeholder with the given name,
    /// encoding it fully.
    ///
    /// With `encode_slash_in_path`, a `'/'` in a value substituted into the
    /// path is encoded as well. Placeholders without a value are kept.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a component contains a malformed template.
    ///
    /// ```
    /// use uri_template::UriBuilder;
    ///
    /// let mut b = UriBuilder::from_template("/{a}/{b}")?;
    /// b.resolve_template("a", "x/y", true)?;
    /// assert_eq!(b.to_template(), "/x%2Fy/{b}");
    /// # Ok::<_, uri_template::UsageError>(())
    /// ```
    pub fn resolve_template(
        &mut self,
        name: &str,
        value: impl fmt::Display,
        encode_slash_in_path: bool,
    ) -> Result<&mut Self, UsageError> {
        let values = HashMap::from([(name.to_owned(), value.to_string())]);
        self.resolve_in_place(&values, true, encode_slash_in_path)
    }

    /// Like [`resolve_template`](Self::resolve_template), but keeps valid
    /// percent-encoded octets in the value and never encodes `'/'` in the path.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a component contains a malformed template.
    pub fn resolve_template_from_encoded(
        &mut self,
        name: &str,
        value: impl fmt::Display,
    ) -> Result<&mut Self, UsageError> {
        let values = HashMap::from([(name.to_owned(), value.to_string())]);
        self.resolve_in_place(&values, false, false)
    }

    /// Substitutes values for placeholders by name, encoding them fully.
    ///
    /// All values are applied at once: on `Err`, none is.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a component contains a malformed template.
    pub fn resolve_templates<I, K, V>(
        &mut self,
        values: I,
        encode_slash_in_path: bool,
    ) -> Result<&mut Self, UsageError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: fmt::Display,
    {
        self.resolve_in_place(&collect_values(values), true, encode_slash_in_path)
    }

    /// Like [`resolve_templates`](Self::resolve_templates), but keeps valid
    /// percent-encoded octets in the values and never encodes `'/'` in the path.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a component contains a malformed template.
    pub fn resolve_templates_from_encoded<I, K, V>(&mut self, values: I) -> Result<&mut Self, UsageError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: fmt::Display,
    {
        self.resolve_in_place(&collect_values(values), false, false)
    }

    /// Assembles the components, passing each through `emit`.
    fn compose<E>(
        &self,
        path_component: Component,
        mut emit: impl FnMut(&str, Component) -> Result<String, E>,
    ) -> Result<String, E> {
        let mut buf = String::new();
        if let Some(scheme) = &self.scheme {
            buf.push_str(&emit(scheme, Component::Scheme)?);
            buf.push(':');
        }

        if let Some(ssp) = &self.ssp {
            buf.push_str(&emit(ssp, Component::SchemeSpecificPart)?);
        } else {
            let has_authority =
                if self.user_info.is_some() || self.host.is_some() || self.port.is_some() {
                    buf.push_str("//");
                    if let Some(user_info) = &self.user_info {
                        buf.push_str(&emit(user_info, Component::UserInfo)?);
                        buf.push('@');
                    }
                    if let Some(host) = &self.host {
                        buf.push_str(&emit(host, Component::Host)?);
                    }
                    if let Some(port) = &self.port {
                        buf.push(':');
                        buf.push_str(&emit(port, Component::Port)?);
                    }
                    true
                } else if let Some(authority) = &self.authority {
                    buf.push_str("//");
                    buf.push_str(&emit(authority, Component::Authority)?);
                    true
                } else {
                    false
                };

            let path = emit(&self.path.render(), path_component)?;
            let query = emit(&self.query_text(), Component::QueryParam)?;
            let has_fragment = self.fragment.as_deref().is_some_and(|f| !f.is_empty());
            if has_authority
                && !path.starts_with('/')
                && (!path.is_empty() || !query.is_empty() || has_fragment)
            {
                buf.push('/');
            }
            buf.push_str(&path);
            if !query.is_empty() {
                buf.push('?');
                buf.push_str(&query);
            }
        }

        if let Some(fragment) = &self.fragment {
            buf.push('#');
            buf.push_str(&emit(fragment, Component::Fragment)?);
        }
        Ok(buf)
    }

    /// Returns the URI template the builder currently holds.
    ///
    /// ```
    /// use uri_template::UriBuilder;
    ///
    /// let mut b = UriBuilder::from_template("http://{host}/a?x=1")?;
    /// b.replace_query_param("x", &[&"{x}"])?;
    /// assert_eq!(b.to_template(), "http://{host}/a?x={x}");
    /// # Ok::<_, uri_template::UsageError>(())
    /// ```
    #[must_use]
    pub fn to_template(&self) -> String {
        match self.compose(Component::Path, |s, _| Ok::<_, Infallible>(s.to_owned())) {
            Ok(s) => s,
            Err(never) => match never {},
        }
    }

    fn build_inner(
        &self,
        values: Values<'_>,
        encode: bool,
        encode_slash: bool,
    ) -> Result<Uri<String>, BuildError> {
        let mut binder = Binder::new(values);
        let path_component = if encode_slash {
            Component::PathSegment
        } else {
            Component::Path
        };

        let result = self
            .compose(path_component, |s: &str, component: Component| -> Result<String, BuildError> {
                if !s.contains('{') {
                    return Ok(s.to_owned());
                }
                let template = UriTemplate::new(s)?;
                let encode = encode && !matches!(component, Component::Scheme | Component::Port);
                Ok(binder.resolve(&template, component, encode)?)
            })
            .and_then(|s| {
                Uri::parse(s).map_err(|(source, input)| BuildError::Parse { input, source })
            });

        if let Err(e) = &result {
            debug!(template = %self, error = %e, "failed to build URI");
        }
        result
    }

    /// Builds a URI, binding values to placeholders in order of appearance.
    ///
    /// A repeated placeholder reuses the value bound at its first
    /// occurrence; surplus values are ignored. Values are encoded fully,
    /// `'%'` and `'/'` included.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a component contains a malformed template, a
    /// placeholder has no value, or the result is not a valid URI reference.
    ///
    /// ```
    /// use uri_template::UriBuilder;
    ///
    /// let b = UriBuilder::from_template("{a}/{b}/{a}")?;
    /// assert_eq!(b.build(&[&"x", &"y", &"z"])?.as_str(), "x/y/x");
    /// # Ok::<_, Box<dyn std::error::Error>>(())
    /// ```
    pub fn build(&self, values: &[&dyn fmt::Display]) -> Result<Uri<String>, BuildError> {
        self.build_inner(Values::Positional(values), true, true)
    }

    /// Like [`build`](Self::build), with control over encoding `'/'` in path values.
    ///
    /// # Errors
    ///
    /// See [`build`](Self::build).
    pub fn build_with(
        &self,
        values: &[&dyn fmt::Display],
        encode_slash_in_path: bool,
    ) -> Result<Uri<String>, BuildError> {
        self.build_inner(Values::Positional(values), true, encode_slash_in_path)
    }

    /// Builds a URI, binding values to placeholders by name.
    ///
    /// # Errors
    ///
    /// See [`build`](Self::build).
    ///
    /// ```
    /// use uri_template::UriBuilder;
    ///
    /// let b = UriBuilder::from_template("/users/{id}?tab={tab}")?;
    /// let uri = b.build_from_map([("id", "7"), ("tab", "a&b")])?;
    /// assert_eq!(uri.as_str(), "/users/7?tab=a%26b");
    /// # Ok::<_, Box<dyn std::error::Error>>(())
    /// ```
    pub fn build_from_map<I, K, V>(&self, values: I) -> Result<Uri<String>, BuildError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: fmt::Display,
    {
        self.build_inner(Values::Named(collect_values(values)), true, true)
    }

    /// Like [`build_from_map`](Self::build_from_map), with control over
    /// encoding `'/'` in path values.
    ///
    /// # Errors
    ///
    /// See [`build`](Self::build).
    pub fn build_from_map_with<I, K, V>(
        &self,
        values: I,
        encode_slash_in_path: bool,
    ) -> Result<Uri<String>, BuildError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: fmt::Display,
    {
        self.build_inner(Values::Named(collect_values(values)), true, encode_slash_in_path)
    }

    /// Like [`build`](Self::build), but keeps valid percent-encoded octets
    /// in the values and never encodes `'/'` in the path.
    ///
    /// # Errors
    ///
    /// See [`build`](Self::build).
    ///
    /// ```
    /// use uri_template::UriBuilder;
    ///
    /// let b = UriBuilder::from_template("/{p}")?;
    /// assert_eq!(b.build_from_encoded(&[&"a/b%20c d"])?.as_str(), "/a/b%20c%20d");
    /// assert_eq!(b.build(&[&"a/b%20c d"])?.as_str(), "/a%2Fb%2520c%20d");
    /// # Ok::<_, Box<dyn std::error::Error>>(())
    /// ```
    pub fn build_from_encoded(&self, values: &[&dyn fmt::Display]) -> Result<Uri<String>, BuildError> {
        self.build_inner(Values::Positional(values), false, false)
    }

    /// Like [`build_from_map`](Self::build_from_map), but keeps valid
    /// percent-encoded octets in the values and never encodes `'/'` in the path.
    ///
    /// # Errors
    ///
    /// See [`build`](Self::build).
    pub fn build_from_encoded_map<I, K, V>(&self, values: I) -> Result<Uri<String>, BuildError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: fmt::Display,
    {
        self.build_inner(Values::Named(collect_values(values)), false, false)
    }
}
