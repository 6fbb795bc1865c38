#![no_main]
use libfuzzer_sys::fuzz_target;
use std::{borrow::Cow, convert::Infallible};
use uri_template::UriTemplate;

fuzz_target!(|data: &str| {
    let Ok(t) = UriTemplate::new(data) else {
        return;
    };
    assert_eq!(t.as_str(), data);

    // Substituting every name with itself yields the normalized template.
    let same = t
        .substitute(|name| Ok::<_, Infallible>(Some(Cow::Owned(format!("{{{name}}}")))))
        .unwrap();
    assert_eq!(same, t.normalized());

    let _ = t.match_uri(data);
});
