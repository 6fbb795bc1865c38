//! URI templates.
//!
//! A template is literal text interspersed with placeholders of the form
//! `{name}` or `{name: regex}`:
//!
//! ```text
//! template = *( literal-char / "{" *WSP name *WSP [ ":" regex ] "}" )
//! name     = ( ALPHA / DIGIT / "_" ) *( ALPHA / DIGIT / "_" / "-" / "." )
//! ```
//!
//! The regex of a placeholder runs to the `'}'` that balances the opening
//! brace, so it may contain braces itself (`{id: [0-9]{3}}`). A placeholder
//! without a regex matches one or more non-slash characters.

mod cursor;
pub(crate) mod resolve;

pub use cursor::{CharCursor, EndOfInput};

use crate::error::{TemplateError, TemplateErrorKind};
use regex::Regex;
use std::{borrow::Cow, collections::HashMap, hash, str::FromStr};
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// The pattern of a placeholder declared without a regex.
pub const DEFAULT_PATTERN: &str = "[^/]+?";

const REGEX_FLAGS: &str = "(?s-m)";

#[derive(Clone, Debug)]
enum Part {
    Literal(String),
    Placeholder {
        name: String,
        // The placeholder as written, braces included.
        raw: String,
    },
}

/// A compiled URI template.
///
/// Compilation turns the template into a single regular expression in which
/// every literal run is escaped and every placeholder becomes a capturing
/// group. A name may appear more than once, but every occurrence must
/// carry the same pattern.
///
/// Templates are immutable once compiled and may be shared across threads.
///
/// # Examples
///
/// ```
/// use uri_template::UriTemplate;
///
/// let t = UriTemplate::new("/users/{id: [0-9]+}/posts/{slug}")?;
/// assert_eq!(t.normalized(), "/users/{id}/posts/{slug}");
/// assert_eq!(t.variables(), ["id", "slug"]);
/// assert_eq!(t.pattern_for("id"), Some("[0-9]+"));
///
/// let m = t.match_uri("/users/42/posts/hello").unwrap();
/// assert_eq!(m, [("id", "42"), ("slug", "hello")]);
/// assert!(!t.is_match("/users/x/posts/hello"));
/// # Ok::<_, uri_template::TemplateError>(())
/// ```
#[derive(Clone)]
pub struct UriTemplate {
    template: String,
    normalized: String,
    pattern: String,
    regex: Regex,
    parts: Vec<Part>,
    variables: Vec<String>,
    patterns: HashMap<String, String>,
    group_counts: Vec<usize>,
    group_indexes: Vec<usize>,
    num_literal_chars: usize,
    num_explicit_regexes: usize,
}

struct Parser<'t> {
    template: &'t str,
    cursor: CharCursor,
    literal: String,
    normalized: String,
    pattern: String,
    parts: Vec<Part>,
    variables: Vec<String>,
    patterns: HashMap<String, String>,
    group_counts: Vec<usize>,
    num_literal_chars: usize,
    num_explicit_regexes: usize,
}

type Result<T, E = TemplateErrorKind> = std::result::Result<T, E>;

impl From<EndOfInput> for TemplateErrorKind {
    fn from(e: EndOfInput) -> Self {
        TemplateErrorKind::UnterminatedPlaceholder { index: e.index }
    }
}

fn is_name_start(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

fn is_name_char(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '_' | '-' | '.')
}

/// Pushes a regex matching `%XX` in either letter case of the hex digits.
fn push_pct_class(re: &mut String, hi: char, lo: char) {
    re.push('%');
    for ch in [hi, lo] {
        if ch.is_ascii_digit() {
            re.push(ch);
        } else {
            re.push('[');
            re.push(ch.to_ascii_lowercase());
            re.push(ch.to_ascii_uppercase());
            re.push(']');
        }
    }
}

fn escape_literal(re: &mut String, literal: &str) {
    let mut rest = literal;
    while let Some(i) = rest.find('%') {
        let (run, tail) = rest.split_at(i);
        re.push_str(&regex::escape(run));
        match tail.as_bytes() {
            [_, hi, lo, ..] if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => {
                push_pct_class(re, *hi as char, *lo as char);
                rest = &tail[3..];
            }
            _ => {
                re.push('%');
                rest = &tail[1..];
            }
        }
    }
    re.push_str(&regex::escape(rest));
}

impl<'t> Parser<'t> {
    fn new(template: &'t str) -> Self {
        Self {
            template,
            cursor: CharCursor::new(template),
            literal: String::new(),
            normalized: String::with_capacity(template.len()),
            pattern: String::with_capacity(template.len() * 2),
            parts: Vec::new(),
            variables: Vec::new(),
            patterns: HashMap::new(),
            group_counts: Vec::new(),
            num_literal_chars: 0,
            num_explicit_regexes: 0,
        }
    }

    fn parse(mut self) -> Result<UriTemplate> {
        while self.cursor.has_next() {
            let ch = self.cursor.next()?;
            if ch == '{' {
                self.flush_literal();
                self.parse_placeholder()?;
            } else {
                self.literal.push(ch);
            }
        }
        self.flush_literal();

        let regex = Regex::new(&format!("{REGEX_FLAGS}^(?:{})$", self.pattern)).map_err(|e| {
            TemplateErrorKind::InvalidRegex {
                message: e.to_string(),
            }
        })?;

        let group_indexes = if self.group_counts.iter().any(|&n| n > 1) {
            let mut next = 1;
            self.group_counts
                .iter()
                .map(|&n| {
                    let index = next;
                    next += n;
                    index
                })
                .collect()
        } else {
            Vec::new()
        };

        Ok(UriTemplate {
            template: self.template.to_owned(),
            normalized: self.normalized,
            pattern: self.pattern,
            regex,
            parts: self.parts,
            variables: self.variables,
            patterns: self.patterns,
            group_counts: self.group_counts,
            group_indexes,
            num_literal_chars: self.num_literal_chars,
            num_explicit_regexes: self.num_explicit_regexes,
        })
    }

    fn flush_literal(&mut self) {
        if self.literal.is_empty() {
            return;
        }
        let literal = std::mem::take(&mut self.literal);
        self.num_literal_chars += literal.chars().count();
        self.normalized.push_str(&literal);
        escape_literal(&mut self.pattern, &literal);
        self.parts.push(Part::Literal(literal));
    }

    fn skip_whitespace(&mut self) -> Result<char> {
        loop {
            let ch = self.cursor.next()?;
            if !ch.is_whitespace() {
                return Ok(ch);
            }
        }
    }

    fn index(&self) -> usize {
        self.cursor.position().unwrap_or(0)
    }

    fn parse_placeholder(&mut self) -> Result<()> {
        let start = self.index();

        let ch = self.skip_whitespace()?;
        if !is_name_start(ch) {
            let index = self.index();
            return Err(if matches!(ch, '}' | ':') {
                TemplateErrorKind::EmptyName { index }
            } else {
                TemplateErrorKind::IllegalNameChar { ch, index }
            });
        }

        let mut name = String::from(ch);
        let mut regex = None;
        loop {
            let mut ch = self.cursor.next()?;
            if is_name_char(ch) {
                name.push(ch);
                continue;
            }
            if ch.is_whitespace() {
                ch = self.skip_whitespace()?;
            }
            match ch {
                ':' => {
                    regex = Some(self.parse_regex()?);
                    break;
                }
                '}' => break,
                _ => {
                    return Err(TemplateErrorKind::IllegalNameChar {
                        ch,
                        index: self.index(),
                    })
                }
            }
        }

        let raw = self.cursor.slice(start, self.index() + 1);
        self.add_placeholder(name, regex, raw)
    }

    fn parse_regex(&mut self) -> Result<String> {
        let mut buf = String::new();
        let mut depth = 1;
        loop {
            let ch = self.cursor.next()?;
            match ch {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
            buf.push(ch);
        }
        Ok(buf.trim().to_owned())
    }

    fn add_placeholder(&mut self, name: String, regex: Option<String>, raw: String) -> Result<()> {
        let regex = regex.filter(|r| !r.is_empty());
        let explicit = regex.is_some();
        let pattern = regex.unwrap_or_else(|| DEFAULT_PATTERN.to_owned());

        match self.patterns.get(&name) {
            Some(first) if *first != pattern => {
                return Err(TemplateErrorKind::InconsistentPattern {
                    name,
                    first: first.clone(),
                    second: pattern,
                });
            }
            Some(_) => {}
            None => {
                self.patterns.insert(name.clone(), pattern.clone());
            }
        }

        let nested = if explicit {
            self.num_explicit_regexes += 1;
            let re = Regex::new(&pattern).map_err(|e| TemplateErrorKind::InvalidRegex {
                message: e.to_string(),
            })?;
            re.captures_len() - 1
        } else {
            0
        };
        self.group_counts.push(1 + nested);

        self.pattern.push('(');
        self.pattern.push_str(&pattern);
        self.pattern.push(')');

        self.normalized.push('{');
        self.normalized.push_str(&name);
        self.normalized.push('}');

        self.variables.push(name.clone());
        self.parts.push(Part::Placeholder { name, raw });
        Ok(())
    }
}

impl UriTemplate {
    /// Compiles a template.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a placeholder is unterminated, has an empty or
    /// malformed name, repeats a name with a different pattern, or if the
    /// resulting regular expression does not compile.
    pub fn new(template: &str) -> Result<Self, TemplateError> {
        match Parser::new(template).parse() {
            Ok(t) => {
                debug!(
                    template = %t.template,
                    variables = t.variables.len(),
                    regex = %t.pattern,
                    "compiled URI template"
                );
                Ok(t)
            }
            Err(kind) => {
                let e = TemplateError {
                    kind,
                    template: template.to_owned(),
                };
                debug!(template, error = %e, "invalid URI template");
                Err(e)
            }
        }
    }

    /// Returns the template as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Returns the template with every placeholder reduced to `{name}`.
    #[must_use]
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// Returns the unanchored regular expression the template compiles to.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns the placeholder names in order of appearance, duplicates included.
    #[must_use]
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Returns the pattern of the named placeholder.
    #[must_use]
    pub fn pattern_for(&self, name: &str) -> Option<&str> {
        self.patterns.get(name).map(String::as_str)
    }

    /// Returns, for each placeholder, the number of capturing groups it
    /// introduces: one for itself plus any groups nested in its pattern.
    #[must_use]
    pub fn group_counts(&self) -> &[usize] {
        &self.group_counts
    }

    /// Returns the capturing group index of each placeholder.
    ///
    /// Empty when no pattern has nested groups, in which case placeholder
    /// `i` is captured by group `i + 1`.
    #[must_use]
    pub fn group_indexes(&self) -> &[usize] {
        &self.group_indexes
    }

    /// Returns the number of placeholders declared with an explicit regex.
    #[must_use]
    pub fn num_explicit_regexes(&self) -> usize {
        self.num_explicit_regexes
    }

    /// Returns the number of literal characters.
    #[must_use]
    pub fn num_literal_chars(&self) -> usize {
        self.num_literal_chars
    }

    /// Checks whether the template ends with `'/'`.
    #[must_use]
    pub fn ends_with_slash(&self) -> bool {
        self.template.ends_with('/')
    }

    /// Checks whether the template has no placeholder.
    #[must_use]
    pub fn is_literal(&self) -> bool {
        self.variables.is_empty()
    }

    /// Checks whether the whole string matches the template.
    #[must_use]
    pub fn is_match(&self, s: &str) -> bool {
        self.match_uri(s).is_some()
    }

    /// Matches the whole string against the template and returns the value
    /// of each distinct placeholder, in order of first appearance.
    ///
    /// Returns `None` if the string does not match, or if a repeated
    /// placeholder captures different text at different occurrences.
    ///
    /// ```
    /// use uri_template::UriTemplate;
    ///
    /// let t = UriTemplate::new("{a}/{b}/{a}")?;
    /// assert_eq!(t.match_uri("x/y/x").unwrap(), [("a", "x"), ("b", "y")]);
    /// assert!(t.match_uri("x/y/z").is_none());
    /// # Ok::<_, uri_template::TemplateError>(())
    /// ```
    #[must_use]
    pub fn match_uri<'s>(&self, s: &'s str) -> Option<Vec<(&str, &'s str)>> {
        let caps = self.regex.captures(s)?;
        let mut out: Vec<(&str, &'s str)> = Vec::with_capacity(self.patterns.len());
        for (i, name) in self.variables.iter().enumerate() {
            let group = self.group_indexes.get(i).copied().unwrap_or(i + 1);
            let value = caps.get(group).map_or("", |m| m.as_str());
            match out.iter().find(|(n, _)| n == name) {
                Some(&(_, first)) if first != value => return None,
                Some(_) => {}
                None => out.push((name.as_str(), value)),
            }
        }
        Some(out)
    }

    /// Replaces every placeholder with the value produced by `value_for`.
    ///
    /// `value_for` receives the placeholder name; `Ok(None)` keeps the
    /// placeholder as written, regex included. The first `Err` aborts.
    ///
    /// ```
    /// use std::{borrow::Cow, convert::Infallible};
    /// use uri_template::UriTemplate;
    ///
    /// let t = UriTemplate::new("/{a}/{b: [0-9]+}")?;
    /// let s = t.substitute(|name| {
    ///     Ok::<_, Infallible>((name == "a").then(|| Cow::Borrowed("x")))
    /// });
    /// assert_eq!(s.unwrap(), "/x/{b: [0-9]+}");
    /// # Ok::<_, uri_template::TemplateError>(())
    /// ```
    pub fn substitute<'v, E, F>(&self, mut value_for: F) -> Result<String, E>
    where
        F: FnMut(&str) -> Result<Option<Cow<'v, str>>, E>,
    {
        let mut buf = String::with_capacity(self.template.len());
        for part in &self.parts {
            match part {
                Part::Literal(s) => buf.push_str(s),
                Part::Placeholder { name, raw } => match value_for(name)? {
                    Some(value) => buf.push_str(&value),
                    None => buf.push_str(raw),
                },
            }
        }
        Ok(buf)
    }
}

impl PartialEq for UriTemplate {
    fn eq(&self, other: &Self) -> bool {
        self.template == other.template
    }
}

impl Eq for UriTemplate {}

impl hash::Hash for UriTemplate {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.template.hash(state);
    }
}

impl FromStr for UriTemplate {
    type Err = TemplateError;

    /// Equivalent to [`new`](Self::new).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<&str> for UriTemplate {
    type Error = TemplateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl AsRef<str> for UriTemplate {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

#[cfg(feature = "serde")]
impl Serialize for UriTemplate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for UriTemplate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = <Cow<'de, str>>::deserialize(deserializer)?;
        UriTemplate::new(&s).map_err(de::Error::custom)
    }
}
