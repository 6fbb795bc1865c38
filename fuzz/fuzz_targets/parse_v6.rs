#![no_main]
use libfuzzer_sys::fuzz_target;
use std::net::Ipv6Addr;
use std::str::FromStr;
use uri_template::ip::{text_to_bytes, IpLiteral};

fuzz_target!(|data: &str| {
    let ours = match text_to_bytes(data) {
        Some(IpLiteral::V6(bytes)) => Some(Ipv6Addr::from(bytes)),
        _ => None,
    };
    assert_eq!(ours, Ipv6Addr::from_str(data).ok());

    if let Some(addr) = ours {
        let text = IpLiteral::V6(addr.octets()).to_string();
        assert_eq!(text_to_bytes(&text), Some(IpLiteral::V6(addr.octets())));
    }
});
