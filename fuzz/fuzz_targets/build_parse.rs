#![no_main]
use libfuzzer_sys::{
    arbitrary::{self, Arbitrary},
    fuzz_target,
};
use uri_template::UriBuilder;

#[derive(Arbitrary, Debug)]
struct Components<'a> {
    scheme: Option<&'a str>,
    ssp: Option<&'a str>,
    user_info: Option<&'a str>,
    host: Option<&'a str>,
    port: Option<i32>,
    path: Vec<&'a str>,
    segments: Vec<&'a str>,
    matrix: Vec<(&'a str, &'a str)>,
    query: Vec<(&'a str, &'a str)>,
    fragment: Option<&'a str>,
    values: Vec<&'a str>,
}

fuzz_target!(|c: Components<'_>| {
    let mut b = UriBuilder::new();
    if let Some(s) = c.scheme {
        let _ = b.scheme(s);
    }
    if let Some(s) = c.user_info {
        let _ = b.user_info(s);
    }
    if let Some(s) = c.host {
        let _ = b.host(s);
    }
    if let Some(p) = c.port {
        let _ = b.port(p);
    }
    for s in c.path {
        let _ = b.path(s);
    }
    let _ = b.segment(c.segments);
    for (name, value) in c.matrix {
        let _ = b.matrix_param(name, &[&value]);
    }
    for (name, value) in c.query {
        let _ = b.query_param(name, &[&value]);
    }
    if let Some(s) = c.ssp {
        let _ = b.scheme_specific_part(s);
    }
    if let Some(s) = c.fragment {
        b.fragment(s);
    }

    let values: Vec<&dyn std::fmt::Display> = c.values.iter().map(|v| v as _).collect();
    let Ok(direct) = b.build_from_encoded(&values) else {
        return;
    };

    // A built URI parses on its own, and so does the builder's template.
    let again = UriBuilder::from_template(&b.to_template())
        .unwrap()
        .build_from_encoded(&values)
        .unwrap();
    assert_eq!(direct, again);
});
