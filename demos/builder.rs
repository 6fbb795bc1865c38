use std::collections::HashMap;

use uri_template::UriBuilder;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut b = UriBuilder::from_template("https://{host}/api/{version}")?;
    b.segment(["users", "{id}"])?
        .matrix_param("fields", &[&"name", &"email"])?
        .query_param("page", &[&"{page}"])?
        .fragment("top");
    println!("{b}");

    let uri = b.build(&[&"example.com", &"v2", &"j doe", &3])?;
    println!("{uri}");
    println!("{uri:#?}");

    let values = HashMap::from([
        ("host", "example.org"),
        ("version", "v1"),
        ("id", "a/b"),
        ("page", "1"),
    ]);
    println!("{}", b.build_from_map(&values)?);
    println!("{}", b.build_from_map_with(&values, false)?);

    b.resolve_template("host", "localhost", false)?;
    println!("{b}");

    let mut mail = UriBuilder::new();
    mail.scheme("mailto")?.scheme_specific_part("{user}@example.com")?;
    println!("{}", mail.build(&[&"postmaster"])?);
    Ok(())
}
