use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::collections::HashMap;
use uri_template::{ip, pct_enc, Uri, UriBuilder, UriTemplate};

criterion_group!(
    benches,
    bench_compile,
    bench_match,
    bench_build,
    bench_build_from_map,
    bench_from_template,
    bench_encode,
    bench_parse,
    bench_parse_v6,
);
criterion_main!(benches);

const TEMPLATE: &str = "/users/{id: [0-9]+}/posts/{slug}.{ext}";
const MATCH_CASE: &str = "/users/42/posts/hello-world.json";
const BUILD_TEMPLATE: &str = "https://{host}/api/{version}/users/{id}?page={page}#{frag}";
const ENCODE_CASE: &str = "te😃a 测1`~!@试#$%st^&+=";
const PARSE_CASE: &str = "https://user@example.com/search?q=%E6%B5%8B%E8%AF%95#fragment";
const V6_CASE: &str = "2001:db8:122:c000:2:2100:192.0.2.33";

fn bench_compile(c: &mut Criterion) {
    c.bench_function("compile", |b| b.iter(|| UriTemplate::new(black_box(TEMPLATE))));
}

fn bench_match(c: &mut Criterion) {
    let t = UriTemplate::new(TEMPLATE).unwrap();
    c.bench_function("match", |b| b.iter(|| t.match_uri(black_box(MATCH_CASE))));
}

fn bench_build(c: &mut Criterion) {
    let builder = UriBuilder::from_template(BUILD_TEMPLATE).unwrap();
    c.bench_function("build", |b| {
        b.iter(|| builder.build(&[&"example.com", &"v2", &"j doe", &3, &"top"]))
    });
}

fn bench_build_from_map(c: &mut Criterion) {
    let builder = UriBuilder::from_template(BUILD_TEMPLATE).unwrap();
    let values = HashMap::from([
        ("host", "example.com"),
        ("version", "v2"),
        ("id", "j doe"),
        ("page", "3"),
        ("frag", "top"),
    ]);
    c.bench_function("build_from_map", |b| {
        b.iter(|| builder.build_from_map(black_box(&values)))
    });
}

fn bench_from_template(c: &mut Criterion) {
    c.bench_function("from_template", |b| {
        b.iter(|| UriBuilder::from_template(black_box(BUILD_TEMPLATE)))
    });
}

fn bench_encode(c: &mut Criterion) {
    c.bench_function("encode", |b| {
        b.iter(|| pct_enc::encode(black_box(ENCODE_CASE), pct_enc::Component::Query))
    });
}

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse", |b| b.iter(|| Uri::parse(black_box(PARSE_CASE))));
}

fn bench_parse_v6(c: &mut Criterion) {
    c.bench_function("parse_v6", |b| {
        b.iter(|| ip::text_to_bytes(black_box(V6_CASE)))
    });
}
