use uri_template::{EmptyString, MultivaluedMap, NullValues};

#[test]
fn add_variants() {
    let mut map: MultivaluedMap<String, String> = MultivaluedMap::new();
    map.add("a".into(), "1".to_owned());
    map.add_all("a".into(), ["2".to_owned(), "3".to_owned()]);
    map.add_all("b".into(), [Some("x".to_owned()), None]);
    map.add_first("a".into(), "0".to_owned());

    assert_eq!(map.len(), 2);
    assert_eq!(map.get("a").unwrap(), ["0", "1", "2", "3"]);
    assert_eq!(map.get("b").unwrap(), ["x"]);
    assert_eq!(map.get_first("a").map(String::as_str), Some("0"));
    assert!(map.get("c").is_none());
    assert!(map.get_first("c").is_none());
}

#[test]
fn put_replaces() {
    let mut map: MultivaluedMap<&str, i32> = [("a", 1), ("a", 2), ("b", 3)].into_iter().collect();
    map.put_single("a", 9);
    assert_eq!(map.get("a").unwrap(), [9]);

    assert_eq!(map.put("b", vec![4, 5]), Some(vec![3]));
    assert_eq!(map.put("c", vec![]), None);
    assert!(map.get("c").unwrap().is_empty());
    assert!(map.keys().copied().eq(["a", "b", "c"]));

    assert_eq!(map.remove("b"), Some(vec![4, 5]));
    assert_eq!(map.remove("b"), None);
    map.clear();
    assert!(map.is_empty());
}

#[test]
fn iteration_order() {
    let mut map: MultivaluedMap<&str, &str> = MultivaluedMap::new();
    map.extend([("q", "1"), ("p", "2"), ("q", "3")]);
    let pairs: Vec<_> = map.iter().map(|(k, v)| (*k, v.to_vec())).collect();
    assert_eq!(pairs, [("q", vec!["1", "3"]), ("p", vec!["2"])]);

    let mut n = 0;
    for (_, values) in &map {
        n += values.len();
    }
    assert_eq!(n, 3);
}

struct Marker;

impl NullValues<&'static str> for Marker {
    fn add_null(&self, values: &mut Vec<&'static str>) {
        values.push("null");
    }
}

#[test]
fn null_value_hooks() {
    let mut map = MultivaluedMap::with_null_values(EmptyString);
    map.add_all("k", [None, Some("v".to_owned())]);
    map.add_first("k", None);
    assert_eq!(map.get("k").unwrap(), ["", "", "v"]);

    let mut map = MultivaluedMap::with_null_values(Marker);
    map.add("k", None);
    // Not overridden, so dropped.
    map.add_first("k", None);
    map.add("k", "v");
    assert_eq!(map.get("k").unwrap(), ["null", "v"]);
}

#[test]
fn equality_ignores_key_order() {
    let a: MultivaluedMap<_, _> = [("a", 1), ("b", 2), ("b", 3)].into_iter().collect();
    let b: MultivaluedMap<_, _> = [("b", 2), ("a", 1), ("b", 3)].into_iter().collect();
    let c: MultivaluedMap<_, _> = [("b", 3), ("a", 1), ("b", 2)].into_iter().collect();
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert!(a.equals_ignore_value_order(&c));

    let mut d = MultivaluedMap::new();
    d.add("a", 1);
    assert!(!a.equals_ignore_value_order(&d));
    d.add_all("b", [3, 2]);
    assert!(a.equals_ignore_value_order(&d));
    assert_ne!(a, d);

    assert_eq!(format!("{a:?}"), r#"{"a": [1], "b": [2, 3]}"#);
}
