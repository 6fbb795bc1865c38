use std::{borrow::Cow, collections::HashMap, convert::Infallible};

use uri_template::{
    error::TemplateErrorKind,
    template::{CharCursor, EndOfInput, DEFAULT_PATTERN},
    UriTemplate,
};

fn kind(template: &str) -> TemplateErrorKind {
    UriTemplate::new(template).unwrap_err().kind().clone()
}

#[test]
fn cursor_current_advances_once_when_fresh() {
    let mut c = CharCursor::new("{a}");
    assert_eq!(c.position(), None);
    assert_eq!(c.current(), Ok('{'));
    assert_eq!(c.position(), Some(0));
    assert_eq!(c.current(), Ok('{'));
    assert_eq!(c.next(), Ok('a'));
    assert_eq!(c.peek(), Ok('}'));
    assert_eq!(c.next(), Ok('}'));
    assert_eq!(c.peek(), Err(EndOfInput { index: 3 }));
    assert_eq!(c.set_position(3), Err(EndOfInput { index: 3 }));
    assert_eq!(c.set_position(1), Ok(()));
    assert_eq!(c.current(), Ok('a'));
}

#[test]
fn compile() {
    let t = UriTemplate::new("/users/{id: [0-9]+}/posts/{slug}.{ext}").unwrap();
    assert_eq!(t.as_str(), "/users/{id: [0-9]+}/posts/{slug}.{ext}");
    assert_eq!(t.normalized(), "/users/{id}/posts/{slug}.{ext}");
    assert_eq!(t.pattern(), r"/users/([0-9]+)/posts/([^/]+?)\.([^/]+?)");
    assert_eq!(t.variables(), ["id", "slug", "ext"]);
    assert_eq!(t.pattern_for("slug"), Some(DEFAULT_PATTERN));
    assert_eq!(t.pattern_for("nope"), None);
    assert_eq!(t.num_explicit_regexes(), 1);
    assert_eq!(t.num_literal_chars(), 15);
    assert!(!t.ends_with_slash());
    assert!(!t.is_literal());
    assert_eq!(t.to_string(), t.as_str());
}

#[test]
fn match_uri() {
    let t = UriTemplate::new("/users/{id: [0-9]+}/posts/{slug}.{ext}").unwrap();
    assert_eq!(
        t.match_uri("/users/42/posts/hello.world.json").unwrap(),
        [("id", "42"), ("slug", "hello"), ("ext", "world.json")]
    );
    assert!(t.match_uri("/users/x/posts/a.b").is_none());
    // Anchored at both ends.
    assert!(!t.is_match("/users/1/posts/a.b/"));
    assert!(!t.is_match("x/users/1/posts/a.b"));

    // Percent-encoded literals match either case.
    let t = UriTemplate::new("/a%2fb/{x}").unwrap();
    assert!(t.is_match("/a%2Fb/c"));
    assert!(t.is_match("/a%2fb/c"));
    assert!(!t.is_match("/a/b/c"));
}

#[test]
fn repeated_names() {
    let t = UriTemplate::new("{a}/{b}/{a}").unwrap();
    assert_eq!(t.variables(), ["a", "b", "a"]);
    assert_eq!(t.normalized(), "{a}/{b}/{a}");
    assert_eq!(t.match_uri("x/y/x").unwrap(), [("a", "x"), ("b", "y")]);
    assert!(t.match_uri("x/y/z").is_none());

    // Same pattern written twice is fine.
    let t = UriTemplate::new("{n: \\d+}-{n:\\d+ }").unwrap();
    assert_eq!(t.match_uri("1-1").unwrap(), [("n", "1")]);

    assert_eq!(
        kind("{a: x}/{a}"),
        TemplateErrorKind::InconsistentPattern {
            name: "a".into(),
            first: "x".into(),
            second: DEFAULT_PATTERN.into(),
        }
    );
}

#[test]
fn nested_groups() {
    let t = UriTemplate::new("/{date: (\\d{4})-(\\d{2})}/{slug}").unwrap();
    assert_eq!(t.group_counts(), [3, 1]);
    assert_eq!(t.group_indexes(), [1, 4]);
    assert_eq!(
        t.match_uri("/2024-05/hello").unwrap(),
        [("date", "2024-05"), ("slug", "hello")]
    );

    let t = UriTemplate::new("/{a: (?:x|y)+}/{b}").unwrap();
    assert_eq!(t.group_counts(), [1, 1]);
    assert!(t.group_indexes().is_empty());
    assert_eq!(t.match_uri("/xyx/q").unwrap(), [("a", "xyx"), ("b", "q")]);
}

#[test]
fn definition_errors() {
    assert_eq!(
        kind("/{id"),
        TemplateErrorKind::UnterminatedPlaceholder { index: 4 }
    );
    assert_eq!(
        kind("/{id:"),
        TemplateErrorKind::UnterminatedPlaceholder { index: 5 }
    );
    assert_eq!(kind("/{"), TemplateErrorKind::UnterminatedPlaceholder { index: 2 });
    assert_eq!(
        kind("{a.}x{$}"),
        TemplateErrorKind::IllegalNameChar { ch: '$', index: 6 }
    );
    assert_eq!(kind("{:x}"), TemplateErrorKind::EmptyName { index: 1 });
    assert_eq!(kind("{ }"), TemplateErrorKind::EmptyName { index: 2 });
    assert!(matches!(
        kind("{a: [z-a]}"),
        TemplateErrorKind::InvalidRegex { .. }
    ));

    let e = UriTemplate::new("/{id").unwrap_err();
    assert_eq!(e.template(), "/{id");
    assert_eq!(e.index(), Some(4));
    assert!(e.to_string().contains("unterminated placeholder"));
}

#[test]
fn substitute() {
    let t = UriTemplate::new("/{a}/{b: [0-9]+}/{a}").unwrap();
    let values = HashMap::from([("a", "x")]);
    let s = t.substitute(|name| Ok::<_, Infallible>(values.get(name).map(|v| Cow::Borrowed(*v))));
    assert_eq!(s.unwrap(), "/x/{b: [0-9]+}/x");

    let e = t.substitute(|name| Err::<Option<Cow<'_, str>>, _>(name.to_owned()));
    assert_eq!(e.unwrap_err(), "a");
}

#[test]
fn literal_template() {
    let t = UriTemplate::new("/static/").unwrap();
    assert!(t.is_literal());
    assert!(t.ends_with_slash());
    assert!(t.match_uri("/static/").unwrap().is_empty());
    assert!(!t.is_match("/static"));

    let t = UriTemplate::new("").unwrap();
    assert!(t.is_match(""));
    assert_eq!(t.num_literal_chars(), 0);
}

#[test]
fn equality_and_parsing() {
    let a: UriTemplate = "/{x}".parse().unwrap();
    let b = UriTemplate::try_from("/{x}").unwrap();
    let c = UriTemplate::new("/{ x }").unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a.normalized(), c.normalized());
}

#[cfg(feature = "serde")]
#[test]
fn serde() {
    let t = UriTemplate::new("/a/{b: [0-9]+}").unwrap();
    let json = serde_json::to_string(&t).unwrap();
    assert_eq!(json, r#""/a/{b: [0-9]+}""#);
    let back: UriTemplate = serde_json::from_str(&json).unwrap();
    assert_eq!(back, t);
    assert!(serde_json::from_str::<UriTemplate>(r#""/{a""#).is_err());
}
