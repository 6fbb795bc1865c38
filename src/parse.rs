use crate::{
    error::{ParseError, ParseErrorKind},
    ip,
    pct_enc::{
        self,
        table::{self, Table},
    },
    uri::{AuthMeta, Meta},
};
use std::{
    num::NonZeroUsize,
    ops::{Deref, DerefMut},
};

type Result<T> = std::result::Result<T, ParseError>;

/// Returns immediately with an error.
macro_rules! err {
    ($index:expr, $kind:ident) => {
        return Err(ParseError {
            index: $index,
            kind: ParseErrorKind::$kind,
        })
    };
}

pub(crate) fn parse(bytes: &[u8]) -> Result<Meta> {
    let mut parser = Parser {
        reader: Reader::new(bytes),
        out: Meta::default(),
    };
    parser.parse_from_scheme()?;
    Ok(parser.out)
}

/// URI reference parser.
///
/// # Invariants
///
/// `pos <= len`, `pos` is non-decreasing and on the boundary of a UTF-8 code point.
///
/// # Guarantees
///
/// When parsing succeeds, all output indexes are within bounds, correctly
/// ordered, and every component they delimit is validated.
struct Parser<'a> {
    reader: Reader<'a>,
    out: Meta,
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Deref for Parser<'a> {
    type Target = Reader<'a>;

    fn deref(&self) -> &Self::Target {
        &self.reader
    }
}

impl DerefMut for Parser<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.reader
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum PathKind {
    General,
    AbEmpty,
    ContinuedNoScheme,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Reader { bytes, pos: 0 }
    }

    fn len(&self) -> usize {
        self.bytes.len()
    }

    fn has_remaining(&self) -> bool {
        self.pos < self.len()
    }

    fn peek(&self, i: usize) -> Option<u8> {
        self.bytes.get(self.pos + i).copied()
    }

    // Any call to this method must keep the invariants.
    fn skip(&mut self, n: usize) {
        self.pos += n;
        debug_assert!(self.pos <= self.len());
    }

    #[cold]
    fn invalid_pct(&self, at: usize) -> Result<bool> {
        let mut i = at + 1;
        if let Some(&x) = self.bytes.get(i) {
            if pct_enc::is_hexdig(x) {
                i += 1;
            }
        }
        err!(i, UnexpectedCharOrEnd);
    }

    /// Reads as many bytes as the table allows, returning whether any was read.
    fn read(&mut self, table: Table) -> Result<bool> {
        let start = self.pos;
        let mut i = self.pos;

        while i < self.len() {
            let x = self.bytes[i];
            if table.allows_pct_encoded() && x == b'%' {
                let [hi, lo, ..] = self.bytes[i + 1..] else {
                    return self.invalid_pct(i);
                };
                if !pct_enc::is_hexdig_pair(hi, lo) {
                    return self.invalid_pct(i);
                }
                i += 3;
            } else {
                if !table.allows_ascii(x) {
                    break;
                }
                i += 1;
            }
        }

        self.pos = i;
        Ok(self.pos > start)
    }

    fn read_str(&mut self, s: &str) -> bool {
        if self.bytes[self.pos..].starts_with(s.as_bytes()) {
            self.skip(s.len());
            true
        } else {
            false
        }
    }

    fn read_port(&mut self) {
        if self.read_str(":") {
            let mut i = 0;
            while matches!(self.peek(i), Some(b'0'..=b'9')) {
                i += 1;
            }
            self.skip(i);
        }
    }

    fn read_ip_literal(&mut self) -> Result<bool> {
        if !self.read_str("[") {
            return Ok(false);
        }

        let start = self.pos;
        if let Some(b'v' | b'V') = self.peek(0) {
            self.read_ipv_future()?;
        } else {
            let len = self.bytes[start..]
                .iter()
                .position(|&x| x == b']')
                .unwrap_or(self.len() - start);
            let text = &self.bytes[start..start + len];
            if ip::parse_v6(text).is_none() {
                err!(start, InvalidIpv6Addr);
            }
            self.skip(len);
        }

        if !self.read_str("]") {
            err!(self.pos, UnexpectedCharOrEnd);
        }
        Ok(true)
    }

    fn read_ipv_future(&mut self) -> Result<()> {
        // Skips "v" or "V".
        self.skip(1);
        if self.read(table::HEXDIG)? && self.read_str(".") && self.read(table::IPV_FUTURE)? {
            return Ok(());
        }
        err!(self.pos, UnexpectedCharOrEnd);
    }
}

impl Parser<'_> {
    fn read_host(&mut self) -> Result<bool> {
        if self.read_ip_literal()? {
            return Ok(true);
        }
        // An IPv4 address is also a valid registered name.
        self.read(table::REG_NAME)?;
        Ok(false)
    }

    fn parse_from_scheme(&mut self) -> Result<()> {
        self.read(table::SCHEME)?;

        if self.peek(0) == Some(b':') {
            // Scheme starts with a letter.
            if self.pos > 0 && self.bytes[0].is_ascii_alphabetic() {
                self.out.scheme_end = NonZeroUsize::new(self.pos);
            } else {
                err!(0, UnexpectedCharOrEnd);
            }

            self.skip(1);
            return if self.read_str("//") {
                self.parse_from_authority()
            } else {
                self.parse_from_path(PathKind::General)
            };
        } else if self.pos == 0 {
            // Nothing read.
            if self.read_str("//") {
                return self.parse_from_authority();
            }
        }
        // Scheme chars are valid for path.
        self.parse_from_path(PathKind::ContinuedNoScheme)
    }

    fn parse_from_authority(&mut self) -> Result<()> {
        // We first try to read host and port, noting that
        // a reg-name or IPv4address can also be part of userinfo.
        let host_start = self.pos;
        let is_ip_literal = self.read_host()?;
        let mut auth_meta = AuthMeta {
            host_bounds: (host_start, self.pos),
        };

        self.read_port();

        if !is_ip_literal {
            let userinfo_read = self.read(table::USERINFO)?;

            if self.peek(0) == Some(b'@') {
                // Userinfo present.
                self.skip(1);

                let host_start = self.pos;
                self.read_host()?;
                auth_meta = AuthMeta {
                    host_bounds: (host_start, self.pos),
                };

                self.read_port();
            } else if userinfo_read {
                err!(self.pos, UnexpectedCharOrEnd);
            }
        }

        self.out.auth_meta = Some(auth_meta);
        self.parse_from_path(PathKind::AbEmpty)
    }

    fn parse_from_path(&mut self, kind: PathKind) -> Result<()> {
        let path_start = match kind {
            PathKind::General | PathKind::AbEmpty => self.pos,
            PathKind::ContinuedNoScheme => {
                self.read(table::SEGMENT_NZ_NC)?;

                if self.peek(0) == Some(b':') {
                    // In a relative reference, the first path
                    // segment cannot contain a colon character.
                    err!(self.pos, UnexpectedCharOrEnd);
                }
                0
            }
        };

        if self.read(table::PATH)? && kind == PathKind::AbEmpty && self.bytes[path_start] != b'/' {
            err!(path_start, UnexpectedCharOrEnd);
        }

        self.out.path_bounds = (path_start, self.pos);

        if self.read_str("?") {
            self.read(table::QUERY)?;
            self.out.query_end = NonZeroUsize::new(self.pos);
        }

        if self.read_str("#") {
            self.read(table::FRAGMENT)?;
        }

        if self.has_remaining() {
            err!(self.pos, UnexpectedCharOrEnd);
        }
        Ok(())
    }
}
