use std::io;

use uri_template::UriTemplate;

fn main() {
    let mut args = std::env::args().skip(1);
    let Some(template) = args.next() else {
        eprintln!("usage: template <TEMPLATE>, then URIs on stdin");
        return;
    };
    let t = match UriTemplate::new(&template) {
        Ok(t) => t,
        Err(e) => {
            println!("Error: {e}");
            return;
        }
    };
    println!("{t:#?}");

    let mut buf = String::new();
    loop {
        buf.clear();
        match io::stdin().read_line(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let line = buf.trim_end_matches(['\r', '\n']);
        match t.match_uri(line) {
            Some(values) => println!("{values:?}"),
            None => println!("no match"),
        }
    }
}
