//! The path of a [`UriBuilder`](super::UriBuilder) as a sequence of elements.

use crate::{
    multimap::MultivaluedMap,
    pct_enc::{self, Component},
};
use tracing::trace;

type Params = MultivaluedMap<String, String>;

#[derive(Clone, Debug)]
enum Element {
    /// Encoded text appended through `path`, separator included.
    Literal(String),
    /// An encoded segment appended through `segment`, separator included.
    Segment(String),
    /// Matrix parameters bound to the segment before them.
    Matrix(Params),
}

fn push_matrix(buf: &mut String, params: &Params) {
    for (name, values) in params {
        for value in values {
            buf.push(';');
            buf.push_str(name);
            if !value.is_empty() {
                buf.push('=');
                buf.push_str(value);
            }
        }
    }
}

impl Element {
    fn render(&self, buf: &mut String) {
        match self {
            Self::Literal(s) | Self::Segment(s) => buf.push_str(s),
            Self::Matrix(params) => push_matrix(buf, params),
        }
    }

    fn rendered_len(&self) -> usize {
        match self {
            Self::Literal(s) | Self::Segment(s) => s.len(),
            Self::Matrix(_) => {
                let mut buf = String::new();
                self.render(&mut buf);
                buf.len()
            }
        }
    }
}

/// Path state.
///
/// Only a trailing [`Element::Matrix`] is pending: parameter mutators edit it
/// in place. Appending to the path freezes it where it stands.
#[derive(Clone, Debug, Default)]
pub(crate) struct PathBuf {
    elements: Vec<Element>,
}

impl PathBuf {
    pub(crate) fn clear(&mut self) {
        self.elements.clear();
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.elements.iter().all(|e| e.rendered_len() == 0)
    }

    /// Replaces the whole path with already rendered text.
    pub(crate) fn set(&mut self, rendered: String) {
        self.elements.clear();
        if !rendered.is_empty() {
            self.elements.push(Element::Literal(rendered));
        }
    }

    pub(crate) fn render(&self) -> String {
        let mut buf = String::new();
        for e in &self.elements {
            e.render(&mut buf);
        }
        buf
    }

    fn ends_with_slash(&self) -> bool {
        for e in self.elements.iter().rev() {
            match e {
                Element::Literal(s) | Element::Segment(s) if !s.is_empty() => {
                    return s.ends_with('/')
                }
                Element::Matrix(params) if !params.is_empty() => return false,
                _ => {}
            }
        }
        false
    }

    fn drop_empty_pending(&mut self) {
        if matches!(self.elements.last(), Some(Element::Matrix(p)) if p.is_empty()) {
            self.elements.pop();
        }
    }

    /// Appends encoded path text, joining with exactly one `'/'`.
    ///
    /// `as_segment` encodes `'/'` in the input.
    pub(crate) fn append(&mut self, s: &str, as_segment: bool) {
        if s.is_empty() {
            return;
        }
        self.drop_empty_pending();

        let component = if as_segment {
            Component::PathSegment
        } else {
            Component::Path
        };
        let encoded = pct_enc::encode_template(s, component);

        let has_path = !self.is_empty();
        let ends_with_slash = self.ends_with_slash();
        let starts_with_slash = encoded.starts_with('/');

        let mut text = String::with_capacity(encoded.len() + 1);
        if has_path && !ends_with_slash && !starts_with_slash {
            text.push('/');
            text.push_str(&encoded);
        } else if ends_with_slash && starts_with_slash {
            text.push_str(&encoded[1..]);
        } else {
            text.push_str(&encoded);
        }

        self.elements.push(if as_segment {
            Element::Segment(text)
        } else {
            Element::Literal(text)
        });
    }

    /// Appends a matrix parameter: into the pending map if there is one,
    /// otherwise straight onto the path.
    pub(crate) fn add_matrix_param(&mut self, name: &str, value: &str) {
        match self.elements.last_mut() {
            Some(Element::Matrix(params)) => params.add(name.to_owned(), value.to_owned()),
            _ => {
                let mut params = Params::new();
                params.add(name.to_owned(), value.to_owned());
                let mut text = String::new();
                push_matrix(&mut text, &params);
                self.elements.push(Element::Literal(text));
            }
        }
    }

    /// Returns the pending matrix map, materializing it from the `';'` run
    /// of the last segment on first use.
    pub(crate) fn pending_matrix(&mut self) -> &mut Params {
        if !matches!(self.elements.last(), Some(Element::Matrix(_))) {
            let rendered = self.render();
            let start = rendered.rfind('/').map_or(0, |i| i + 1);
            let params = match rendered[start..].find(';') {
                Some(i) => {
                    let cut = start + i;
                    let params = pct_enc::decode_matrix(&rendered[cut..], false);
                    self.truncate(cut, &rendered);
                    params
                }
                None => Params::new(),
            };
            trace!(params = params.len(), "materialized matrix parameters");
            self.elements.push(Element::Matrix(params));
        }
        match self.elements.last_mut() {
            Some(Element::Matrix(params)) => params,
            _ => unreachable!("a matrix element was just pushed"),
        }
    }

    /// Replaces the `';'` run of the last segment with `matrix`, or removes it
    /// if `matrix` is empty.
    pub(crate) fn replace_matrix(&mut self, matrix: &str) {
        if matches!(self.elements.last(), Some(Element::Matrix(_))) {
            self.elements.pop();
        }
        let rendered = self.render();
        let start = rendered.rfind('/').map_or(0, |i| i + 1);
        if let Some(i) = rendered[start..].find(';') {
            self.truncate(start + i, &rendered);
        }
        if !matrix.is_empty() {
            let encoded = pct_enc::encode_template(matrix, Component::PathSegment);
            let mut text = String::with_capacity(encoded.len() + 1);
            text.push(';');
            text.push_str(&encoded);
            self.elements.push(Element::Literal(text));
        }
    }

    /// Shortens the rendered path to `len` bytes.
    fn truncate(&mut self, len: usize, rendered: &str) {
        let mut end = rendered.len();
        while let Some(e) = self.elements.last() {
            let start = end - e.rendered_len();
            if start >= len {
                self.elements.pop();
                end = start;
            } else {
                if end > len {
                    let keep = rendered[start..len].to_owned();
                    if let Some(last) = self.elements.last_mut() {
                        *last = Element::Literal(keep);
                    }
                }
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(parts: &[&str]) -> PathBuf {
        let mut p = PathBuf::default();
        for s in parts {
            p.append(s, false);
        }
        p
    }

    #[test]
    fn separators() {
        assert_eq!(path(&["a", "b"]).render(), "a/b");
        assert_eq!(path(&["/a/", "/b"]).render(), "/a/b");
        assert_eq!(path(&["a/", "b/"]).render(), "a/b/");
        assert_eq!(path(&["", "a", ""]).render(), "a");

        let mut p = path(&["/a"]);
        p.append("b/c d", true);
        assert_eq!(p.render(), "/a/b%2Fc%20d");
    }

    #[test]
    fn matrix_stays_with_its_segment() {
        let mut p = path(&["a"]);
        p.pending_matrix().add("x".into(), "1".to_owned());
        p.append("b", false);
        p.add_matrix_param("y", "");
        assert_eq!(p.render(), "a;x=1/b;y");
    }

    #[test]
    fn materialize_and_truncate() {
        let mut p = path(&["/a;k=0", "b;x=1;y=2;x=3"]);
        {
            let params = p.pending_matrix();
            assert_eq!(params.get("x").unwrap(), ["1", "3"]);
            params.remove("x");
        }
        assert_eq!(p.render(), "/a;k=0/b;y=2");

        let mut p = path(&["/a"]);
        p.add_matrix_param("k", "v");
        p.pending_matrix().put_single("k".into(), "w".to_owned());
        assert_eq!(p.render(), "/a;k=w");
    }

    #[test]
    fn replace_matrix() {
        let mut p = path(&["/a;k=0/b;x=1"]);
        p.replace_matrix("y=2;z");
        assert_eq!(p.render(), "/a;k=0/b;y=2;z");
        p.replace_matrix("");
        assert_eq!(p.render(), "/a;k=0/b");
    }
}
