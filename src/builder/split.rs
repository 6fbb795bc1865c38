//! Splitting of a URI template into components without looking inside placeholders.

use crate::{component::Scheme, pct_enc::placeholder_len};

/// The components of a URI template, as written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Parts<'a> {
    pub scheme: Option<&'a str>,
    /// Set instead of the hierarchical parts when the template is opaque.
    pub scheme_specific_part: Option<&'a str>,
    pub authority: Option<Authority<'a>>,
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub fragment: Option<&'a str>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Authority<'a> {
    /// An authority that does not split into user information, host and port.
    Raw(&'a str),
    Server {
        user_info: Option<&'a str>,
        host: &'a str,
        port: Option<&'a str>,
    },
}

/// Returns the index of the first byte outside placeholders matching `pred`.
fn find(s: &str, pred: impl Fn(u8) -> bool) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => i += placeholder_len(&bytes[i..]),
            x if pred(x) => return Some(i),
            _ => i += 1,
        }
    }
    None
}

/// Like [`find`], but returns the last match.
fn rfind(s: &str, pred: impl Fn(u8) -> bool) -> Option<usize> {
    let mut last = None;
    let mut rest = 0;
    while let Some(i) = find(&s[rest..], &pred) {
        last = Some(rest + i);
        rest += i + 1;
    }
    last
}

/// Checks whether every byte outside placeholders is allowed by `allows`.
fn all_outside(s: &str, allows: impl Fn(u8) -> bool) -> bool {
    find(s, |x| !allows(x)).is_none()
}

pub(crate) fn split(template: &str) -> Parts<'_> {
    let mut parts = Parts::default();
    let mut rest = template;

    if let Some(i) = find(rest, |x| matches!(x, b':' | b'/' | b'?' | b'#')) {
        if rest.as_bytes()[i] == b':' && Scheme::is_template(&rest[..i]) {
            parts.scheme = Some(&rest[..i]);
            rest = &rest[i + 1..];
        }
    }

    if let Some(i) = find(rest, |x| x == b'#') {
        parts.fragment = Some(&rest[i + 1..]);
        rest = &rest[..i];
    }

    if parts.scheme.is_some() && !rest.is_empty() && !rest.starts_with('/') {
        parts.scheme_specific_part = Some(rest);
        return parts;
    }

    if let Some(after) = rest.strip_prefix("//") {
        let end = find(after, |x| matches!(x, b'/' | b'?')).unwrap_or(after.len());
        parts.authority = Some(split_authority(&after[..end]));
        rest = &after[end..];
    }

    if let Some(i) = find(rest, |x| x == b'?') {
        parts.query = Some(&rest[i + 1..]);
        rest = &rest[..i];
    }
    parts.path = rest;
    parts
}

fn split_authority(authority: &str) -> Authority<'_> {
    let (user_info, host_port) = match rfind(authority, |x| x == b'@') {
        Some(i) => (Some(&authority[..i]), &authority[i + 1..]),
        None => (None, authority),
    };

    let (host, port) = if host_port.starts_with('[') {
        match host_port.find(']') {
            Some(i) => match &host_port[i + 1..] {
                "" => (&host_port[..=i], None),
                p => match p.strip_prefix(':') {
                    Some(port) => (&host_port[..=i], Some(port)),
                    None => return Authority::Raw(authority),
                },
            },
            None => return Authority::Raw(authority),
        }
    } else {
        match rfind(host_port, |x| x == b':') {
            Some(i) => (&host_port[..i], Some(&host_port[i + 1..])),
            None => (host_port, None),
        }
    };

    let port = port.filter(|p| !p.is_empty());
    let port_ok = port.map_or(true, |p| all_outside(p, |x| x.is_ascii_digit()));
    let host_ok = !host.is_empty() && (host.starts_with('[') || find(host, |x| x == b':').is_none());

    if port_ok && host_ok {
        Authority::Server {
            user_info,
            host,
            port,
        }
    } else {
        Authority::Raw(authority)
    }
}
