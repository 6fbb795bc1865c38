//! Conversion between textual IP literals and their raw bytes.
//!
//! The host setter of [`UriBuilder`] consults this module to decide whether
//! a host is already a valid address literal that needs no encoding.
//!
//! [`UriBuilder`]: crate::UriBuilder

use crate::pct_enc::decode_hexdigit;
use std::{
    fmt,
    net::{IpAddr, Ipv4Addr, Ipv6Addr},
};

/// The raw bytes of an IP address, in network byte order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IpLiteral {
    /// An IPv4 address.
    V4([u8; 4]),
    /// An IPv6 address.
    V6([u8; 16]),
}

impl IpLiteral {
    /// Creates an `IpLiteral` from 4 or 16 bytes, returning `None` for any other length.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if let Ok(v4) = <[u8; 4]>::try_from(bytes) {
            Some(Self::V4(v4))
        } else if let Ok(v6) = <[u8; 16]>::try_from(bytes) {
            Some(Self::V6(v6))
        } else {
            None
        }
    }

    /// Returns the raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::V4(bytes) => bytes,
            Self::V6(bytes) => bytes,
        }
    }
}

impl From<IpLiteral> for IpAddr {
    fn from(ip: IpLiteral) -> Self {
        match ip {
            IpLiteral::V4(bytes) => IpAddr::V4(Ipv4Addr::from(bytes)),
            IpLiteral::V6(bytes) => IpAddr::V6(Ipv6Addr::from(bytes)),
        }
    }
}

impl fmt::Display for IpLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V4([a, b, c, d]) => write!(f, "{a}.{b}.{c}.{d}"),
            Self::V6(bytes) => {
                let mut hextets = [0u16; 8];
                for (i, hextet) in hextets.iter_mut().enumerate() {
                    *hextet = u16::from_be_bytes([bytes[i * 2], bytes[i * 2 + 1]]);
                }
                let (start, len) = longest_zero_run(&hextets);
                let mut i = 0;
                while i < 8 {
                    if len >= 2 && i == start {
                        f.write_str("::")?;
                        i += len;
                        continue;
                    }
                    if i != 0 && !(len >= 2 && i == start + len) {
                        f.write_str(":")?;
                    }
                    write!(f, "{:x}", hextets[i])?;
                    i += 1;
                }
                Ok(())
            }
        }
    }
}

// Leftmost run wins ties.
fn longest_zero_run(hextets: &[u16; 8]) -> (usize, usize) {
    let (mut best_start, mut best_len) = (0, 0);
    let mut i = 0;
    while i < 8 {
        if hextets[i] == 0 {
            let start = i;
            while i < 8 && hextets[i] == 0 {
                i += 1;
            }
            if i - start > best_len {
                (best_start, best_len) = (start, i - start);
            }
        } else {
            i += 1;
        }
    }
    (best_start, best_len)
}

/// Parses an IPv4 or IPv6 literal into its raw bytes.
///
/// IPv4 requires four decimal octets in `0..=255` without redundant leading
/// zeros. IPv6 allows at most one `"::"` and an embedded dotted quad at the end.
/// Brackets are not accepted here; see [`parse_host_literal`].
///
/// # Examples
///
/// ```
/// use uri_template::ip::{text_to_bytes, IpLiteral};
///
/// assert_eq!(text_to_bytes("192.168.1.1"), Some(IpLiteral::V4([192, 168, 1, 1])));
/// assert_eq!(
///     text_to_bytes("2001:db8::1").unwrap().as_bytes(),
///     [0x20, 0x01, 0x0d, 0xb8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1]
/// );
/// assert_eq!(text_to_bytes("01.2.3.4"), None);
/// ```
#[must_use]
pub fn text_to_bytes(text: &str) -> Option<IpLiteral> {
    let s = text.as_bytes();
    if s.contains(&b':') {
        let segs = parse_v6(s)?;
        let mut bytes = [0; 16];
        for (i, seg) in segs.iter().enumerate() {
            bytes[i * 2..i * 2 + 2].copy_from_slice(&seg.to_be_bytes());
        }
        Some(IpLiteral::V6(bytes))
    } else {
        parse_v4(s).map(IpLiteral::V4)
    }
}

/// Formats raw address bytes as an IP literal.
///
/// The longest run of two or more zero hextets of an IPv6 address is
/// compressed into `"::"`; the leftmost run wins ties.
/// Returns `None` unless there are exactly 4 or 16 bytes.
///
/// # Examples
///
/// ```
/// use uri_template::ip::bytes_to_text;
///
/// let mut bytes = [0u8; 16];
/// bytes[0] = 0x20;
/// bytes[1] = 0x01;
/// bytes[15] = 1;
/// assert_eq!(bytes_to_text(&bytes).unwrap(), "2001::1");
/// assert_eq!(bytes_to_text(&[127, 0, 0, 1]).unwrap(), "127.0.0.1");
/// ```
#[must_use]
pub fn bytes_to_text(bytes: &[u8]) -> Option<String> {
    IpLiteral::from_bytes(bytes).map(|ip| ip.to_string())
}

/// Parses a host that is already a valid address literal in a URI:
/// an IPv4 address, or an IPv6 address inside square brackets.
#[must_use]
pub fn parse_host_literal(host: &str) -> Option<IpLiteral> {
    match host.strip_prefix('[').and_then(|h| h.strip_suffix(']')) {
        Some(v6) => match text_to_bytes(v6)? {
            ip @ IpLiteral::V6(_) => Some(ip),
            IpLiteral::V4(_) => None,
        },
        None if host.contains(':') => None,
        None => text_to_bytes(host),
    }
}

macro_rules! take_byte {
    ($s:ident) => {
        if $s.is_empty() {
            None
        } else {
            let byte = $s[0];
            $s = &$s[1..];
            Some(byte)
        }
    };
}

// dec-octet = DIGIT             ; 0-9
//           / %x31-39 DIGIT     ; 10-99
//           / "1" 2DIGIT        ; 100-199
//           / "2" %x30-34 DIGIT ; 200-249
//           / "25" %x30-35      ; 250-255
macro_rules! take_dec_octet {
    ($s:ident, $end:pat) => {
        match take_byte!($s) {
            Some(b'0') => match take_byte!($s) {
                $end => Some(0),
                _ => None,
            },
            Some(b'1') => match take_byte!($s) {
                $end => Some(1),
                Some(y @ b'0'..=b'9') => match take_byte!($s) {
                    $end => Some(10 + (y - b'0')),
                    Some(z @ b'0'..=b'9') => match take_byte!($s) {
                        $end => Some(100 + (y - b'0') * 10 + (z - b'0')),
                        _ => None,
                    },
                    _ => None,
                },
                _ => None,
            },
            Some(b'2') => match take_byte!($s) {
                $end => Some(2),
                Some(y @ b'0'..=b'4') => match take_byte!($s) {
                    $end => Some(20 + (y - b'0')),
                    Some(z @ b'0'..=b'9') => match take_byte!($s) {
                        $end => Some(200 + (y - b'0') * 10 + (z - b'0')),
                        _ => None,
                    },
                    _ => None,
                },
                Some(b'5') => match take_byte!($s) {
                    $end => Some(25),
                    Some(z @ b'0'..=b'5') => match take_byte!($s) {
                        $end => Some(250 + (z - b'0')),
                        _ => None,
                    },
                    _ => None,
                },
                Some(y @ b'6'..=b'9') => match take_byte!($s) {
                    $end => Some(20 + (y - b'0')),
                    _ => None,
                },
                _ => None,
            },
            Some(x @ b'3'..=b'9') => match take_byte!($s) {
                $end => Some(x - b'0'),
                Some(y @ b'0'..=b'9') => match take_byte!($s) {
                    $end => Some((x - b'0') * 10 + (y - b'0')),
                    _ => None,
                },
                _ => None,
            },
            _ => None,
        }
    };
}

pub(crate) fn parse_v4(mut s: &[u8]) -> Option<[u8; 4]> {
    if !matches!(s.len(), 7..=15) {
        None
    } else {
        Some([
            take_dec_octet!(s, Some(b'.'))?,
            take_dec_octet!(s, Some(b'.'))?,
            take_dec_octet!(s, Some(b'.'))?,
            #[allow(unused_assignments)]
            take_dec_octet!(s, None)?,
        ])
    }
}

pub(crate) fn parse_v6(mut s: &[u8]) -> Option<[u16; 8]> {
    if s.len() < 2 {
        return None;
    }

    let mut segs = [0u16; 8];
    let mut ellipsis_i = 8;

    let mut i = 0;
    while i < 8 {
        match take_segment(&mut s) {
            Some(Seg::Normal(seg)) => {
                if i == 7 {
                    // Trailing colon or too long.
                    return None;
                }
                segs[i] = seg;
                i += 1;
            }
            Some(Seg::End(seg)) => {
                segs[i] = seg;
                i += 1;
                break;
            }
            Some(Seg::Colon { double }) => {
                // A normal segment consumes its own colon, so a single colon
                // only completes an ellipsis after one, and "::" only leads.
                if ellipsis_i != 8 || double != (i == 0) {
                    return None;
                }
                ellipsis_i = i;
            }
            Some(Seg::MaybeV4) => {
                if i > 6 {
                    // Not enough space.
                    return None;
                }
                let octets = parse_v4(s)?;

                segs[i] = u16::from_be_bytes([octets[0], octets[1]]);
                segs[i + 1] = u16::from_be_bytes([octets[2], octets[3]]);

                i += 2;
                break;
            }
            Some(Seg::Invalid) => return None,
            None => break,
        }
    }

    if ellipsis_i == 8 {
        // No ellipsis.
        if i != 8 {
            // Too short.
            return None;
        }
    } else if i == 8 {
        // Eliding nothing.
        return None;
    } else {
        // Shift the segments after the ellipsis to the right.
        for j in (ellipsis_i..i).rev() {
            segs[8 - (i - j)] = segs[j];
            segs[j] = 0;
        }
    }

    Some(segs)
}

fn take_segment(s: &mut &[u8]) -> Option<Seg> {
    if s.is_empty() {
        return None;
    }

    if s[0] == b':' {
        return Some(match s.get(1) {
            Some(b':') => {
                *s = &s[2..];
                Seg::Colon { double: true }
            }
            // `None` for cases such as "1::".
            _ => {
                *s = &s[1..];
                Seg::Colon { double: false }
            }
        });
    }

    let mut x = match decode_hexdigit(s[0]) {
        Some(n) => n as u16,
        None => return Some(Seg::Invalid),
    };
    let mut i = 1;

    while i < 5 {
        return Some(match s.get(i) {
            // A colon needs a segment after it.
            Some(b':') if s.len() == i + 1 => Seg::Invalid,
            Some(b':') => {
                *s = &s[i + 1..];
                Seg::Normal(x)
            }
            Some(b'.') => Seg::MaybeV4,
            Some(&b) => match decode_hexdigit(b) {
                Some(n) if i < 4 => {
                    x = (x << 4) | n as u16;
                    i += 1;
                    continue;
                }
                _ => Seg::Invalid,
            },
            None => {
                *s = &[];
                Seg::End(x)
            }
        });
    }
    Some(Seg::Invalid)
}

enum Seg {
    // [0-9A-Fa-f]{1,4}:
    Normal(u16),
    // [0-9A-Fa-f]{1,4}$
    End(u16),
    // :{1,2}
    Colon { double: bool },
    // [0-9A-Fa-f]{1,4}\.
    MaybeV4,
    Invalid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_dec_octet() {
        for i in 0..=u8::MAX {
            let s = i.to_string();
            let mut s = s.as_bytes();
            assert_eq!(Some(i), take_dec_octet!(s, None));
            assert!(s.is_empty());
        }

        let mut s: &[u8] = b"255.";
        assert!(take_dec_octet!(s, None).is_none());
        assert!(s.is_empty());
        s = b"255.";
        assert_eq!(Some(255), take_dec_octet!(s, Some(b'.')));
        assert!(s.is_empty());
        s = b"256";
        assert!(take_dec_octet!(s, None).is_none());
        assert!(s.is_empty());
    }

    #[test]
    fn test_longest_zero_run() {
        assert_eq!(longest_zero_run(&[1, 0, 0, 2, 0, 0, 3, 4]), (1, 2));
        assert_eq!(longest_zero_run(&[1, 0, 2, 0, 0, 0, 3, 4]), (3, 3));
        assert_eq!(longest_zero_run(&[1, 2, 3, 4, 5, 6, 7, 8]), (0, 0));
        assert_eq!(longest_zero_run(&[0; 8]), (0, 8));
    }

    #[test]
    fn test_format_v6() {
        let fmt = |segs: [u16; 8]| IpLiteral::V6(Ipv6Addr::from(segs).octets()).to_string();
        assert_eq!(fmt([0; 8]), "::");
        assert_eq!(fmt([0, 0, 0, 0, 0, 0, 0, 1]), "::1");
        assert_eq!(fmt([1, 0, 0, 0, 0, 0, 0, 0]), "1::");
        assert_eq!(fmt([1, 0, 2, 0, 0, 3, 0, 0]), "1:0:2::3:0:0");
        assert_eq!(fmt([1, 0, 2, 3, 4, 5, 6, 7]), "1:0:2:3:4:5:6:7");
        assert_eq!(fmt([0x2001, 0xdb8, 0, 0, 1, 0, 0, 1]), "2001:db8::1:0:0:1");
    }

    #[test]
    fn test_trailing_colon() {
        assert!(parse_v6(b"1::1:").is_none());
        assert!(parse_v6(b"1:2:3:4:5:6:7:").is_none());
        assert_eq!(parse_v6(b"1::"), Some([1, 0, 0, 0, 0, 0, 0, 0]));
    }

    #[test]
    fn test_v4_length() {
        assert_eq!(parse_v4(b"255.255.255.255"), Some([255; 4]));
        assert!(parse_v4(b"1.1.1.1.").is_none());
        assert!(parse_v4(b"255.255.255.2555").is_none());
    }

    #[test]
    fn test_single_leading_colon() {
        assert!(parse_v6(b":1:2").is_none());
        assert!(parse_v6(b":1").is_none());
    }
}
