use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use uri_template::ip::{bytes_to_text, parse_host_literal, text_to_bytes, IpLiteral};

fn parse_v4(s: &str) -> Option<Ipv4Addr> {
    match text_to_bytes(s)? {
        IpLiteral::V4(bytes) => Some(Ipv4Addr::from(bytes)),
        IpLiteral::V6(_) => None,
    }
}

fn parse_v6(s: &str) -> Option<Ipv6Addr> {
    match text_to_bytes(s)? {
        IpLiteral::V6(bytes) => Some(Ipv6Addr::from(bytes)),
        IpLiteral::V4(_) => None,
    }
}

#[test]
fn test_parse_v4() {
    assert_eq!(Some(Ipv4Addr::new(127, 0, 0, 1)), parse_v4("127.0.0.1"));
    assert_eq!(
        Some(Ipv4Addr::new(255, 255, 255, 255)),
        parse_v4("255.255.255.255")
    );
    assert_eq!(Some(Ipv4Addr::new(0, 0, 0, 0)), parse_v4("0.0.0.0"));
    assert_eq!(Some(Ipv4Addr::new(250, 199, 25, 9)), parse_v4("250.199.25.9"));

    // out of range
    assert!(parse_v4("256.0.0.1").is_none());
    // too short
    assert!(parse_v4("255.0.0").is_none());
    // too long
    assert!(parse_v4("255.0.0.1.2").is_none());
    // no number between dots
    assert!(parse_v4("255.0..1").is_none());
    // octal
    assert!(parse_v4("255.0.0.01").is_none());
    // octal zero
    assert!(parse_v4("255.0.0.00").is_none());
    assert!(parse_v4("255.0.00.0").is_none());
    // leading dot
    assert!(parse_v4(".0.0.0.0").is_none());
    // trailing dot
    assert!(parse_v4("0.0.0.0.").is_none());
    // empty
    assert!(parse_v4("").is_none());
}

#[test]
fn test_parse_v6() {
    assert_eq!(
        Some(Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 0)),
        parse_v6("0:0:0:0:0:0:0:0")
    );
    assert_eq!(
        Some(Ipv6Addr::new(1, 2, 3, 4, 5, 6, 7, 8)),
        parse_v6("1:02:003:0004:0005:006:07:8")
    );

    assert_eq!(Some(Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 1)), parse_v6("::1"));
    assert_eq!(Some(Ipv6Addr::new(1, 0, 0, 0, 0, 0, 0, 0)), parse_v6("1::"));
    assert_eq!(Some(Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 0)), parse_v6("::"));

    assert_eq!(
        Some(Ipv6Addr::new(0x2a02, 0x6b8, 0, 0, 0, 0, 0x11, 0x11)),
        parse_v6("2a02:6b8::11:11")
    );
    assert_eq!(
        Some(Ipv6Addr::new(0, 2, 3, 4, 5, 6, 7, 8)),
        parse_v6("::2:3:4:5:6:7:8")
    );
    assert_eq!(
        Some(Ipv6Addr::new(1, 2, 3, 4, 0, 6, 7, 8)),
        parse_v6("1:2:3:4::6:7:8")
    );
    assert_eq!(
        Some(Ipv6Addr::new(1, 2, 3, 4, 5, 6, 7, 0)),
        parse_v6("1:2:3:4:5:6:7::")
    );

    // only a colon
    assert!(parse_v6(":").is_none());
    // too long group
    assert!(parse_v6("::00000").is_none());
    // too short
    assert!(parse_v6("1:2:3:4:5:6:7").is_none());
    // too long
    assert!(parse_v6("1:2:3:4:5:6:7:8:9").is_none());
    // triple colon
    assert!(parse_v6("1:2:::6:7:8").is_none());
    assert!(parse_v6(":::").is_none());
    // two double colons
    assert!(parse_v6("1:2::6::8").is_none());
    assert!(parse_v6("::2:6::").is_none());
    // `::` standing for zero groups
    assert!(parse_v6("::1:2:3:4:5:6:7:8").is_none());
    assert!(parse_v6("1:2:3:4::5:6:7:8").is_none());
    // leading colon
    assert!(parse_v6(":1:2:3:4:5:6:7:8").is_none());
    assert!(parse_v6(":1::1").is_none());
    assert!(parse_v6(":1").is_none());
    // trailing colon
    assert!(parse_v6("1:2:3:4:5:6:7:8:").is_none());
    assert!(parse_v6("1::1:").is_none());
    assert!(parse_v6("1:").is_none());
    // brackets belong to the host, not the address
    assert!(parse_v6("[::1]").is_none());
}

#[test]
fn test_parse_v4_in_v6() {
    assert_eq!(
        Some(Ipv6Addr::new(0, 0, 0, 0, 0, 0, 49152, 545)),
        parse_v6("::192.0.2.33")
    );
    assert_eq!(
        Some(Ipv6Addr::new(0, 0, 0, 0, 0, 0xFFFF, 49152, 545)),
        parse_v6("::FFFF:192.0.2.33")
    );
    assert_eq!(
        Some(Ipv6Addr::new(
            0x2001, 0xdb8, 0x122, 0xc000, 0x2, 0x2100, 49152, 545
        )),
        parse_v6("2001:db8:122:c000:2:2100:192.0.2.33")
    );

    // colon after v4
    assert!(parse_v6("::127.0.0.1:").is_none());
    // not enough groups
    assert!(parse_v6("1:2:3:4:5:127.0.0.1").is_none());
    // too many groups
    assert!(parse_v6("1:2:3:4:5:6:7:127.0.0.1").is_none());
    // no colon before v4
    assert!(parse_v6("::ffff4.4.4.4").is_none());
}

#[test]
fn bytes_round_trip() {
    let ip = text_to_bytes("2001:db8::1").unwrap();
    assert_eq!(
        ip.as_bytes(),
        [0x20, 0x01, 0x0d, 0xb8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1]
    );
    assert_eq!(bytes_to_text(ip.as_bytes()).unwrap(), "2001:db8::1");
    assert_eq!(
        IpAddr::from(ip),
        IpAddr::V6(Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1))
    );

    assert_eq!(bytes_to_text(&[10, 0, 0, 255]).unwrap(), "10.0.0.255");
    assert!(bytes_to_text(&[1, 2, 3]).is_none());
    assert!(bytes_to_text(&[0; 5]).is_none());
}

#[test]
fn canonical_text() {
    let text = |s: &str| text_to_bytes(s).unwrap().to_string();

    // Leftmost of two equal runs is compressed.
    assert_eq!(text("1:0:0:2:0:0:3:4"), "1::2:0:0:3:4");
    // Longer run wins over an earlier shorter one.
    assert_eq!(text("1:0:0:2:0:0:0:3"), "1:0:0:2::3");
    // A single zero hextet is not compressed.
    assert_eq!(text("1:0:2:3:4:5:6:7"), "1:0:2:3:4:5:6:7");
    assert_eq!(text("0:0:0:0:0:0:0:0"), "::");
    assert_eq!(text("1::"), "1::");
    assert_eq!(text("::1"), "::1");
    assert_eq!(text("ABCD:00EF::"), "abcd:ef::");
}

#[test]
fn host_literals() {
    assert_eq!(
        parse_host_literal("192.168.1.1"),
        Some(IpLiteral::V4([192, 168, 1, 1]))
    );
    assert!(matches!(parse_host_literal("[::1]"), Some(IpLiteral::V6(_))));

    // IPv6 needs brackets in a host, IPv4 must not have them.
    assert!(parse_host_literal("::1").is_none());
    assert!(parse_host_literal("[1.2.3.4]").is_none());
    assert!(parse_host_literal("[::1").is_none());
    assert!(parse_host_literal("example.com").is_none());
    assert!(parse_host_literal("").is_none());
}
