#![warn(missing_debug_implementations, missing_docs, rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]

//! URI templates and an incremental URI builder.
//!
//! A [`UriTemplate`] is literal text interspersed with placeholders such as
//! `{id}` or `{id: [0-9]+}`. It compiles to a regular expression for
//! matching and can be substituted with values.
//!
//! A [`UriBuilder`] holds the components of a URI, each percent-encoded as
//! it is set, and may carry placeholders in any of them. Building resolves
//! the placeholders and validates the result as an [RFC 3986] URI reference,
//! yielding a [`Uri`].
//!
//! ```
//! use uri_template::UriBuilder;
//!
//! let mut b = UriBuilder::from_template("https://example.com/{user}/repos")?;
//! b.query_param("sort", &[&"updated"])?;
//! let uri = b.build(&[&"octo cat"])?;
//! assert_eq!(uri.as_str(), "https://example.com/octo%20cat/repos?sort=updated");
//! assert_eq!(uri.host(), Some("example.com"));
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```
//!
//! # Feature flags
//!
//! All features are disabled by default.
//!
//! - `serde`: Enables [`serde`] support for [`Uri`] and [`UriTemplate`].
//!
//! # Logging
//!
//! The crate emits [`tracing`] events at `debug` and `trace` level, such as
//! when a template compiles or a build fails. It never installs a subscriber.
//!
//! [RFC 3986]: https://datatracker.ietf.org/doc/html/rfc3986/
//! [`serde`]: https://docs.rs/serde
//! [`tracing`]: https://docs.rs/tracing

mod builder;
pub mod component;
pub mod error;
mod fmt;
pub mod ip;
mod multimap;
mod parse;
pub mod pct_enc;
pub mod template;
mod uri;

pub use builder::UriBuilder;
pub use error::{BuildError, ParseError, ResolveError, TemplateError, UsageError};
pub use multimap::{DropNull, EmptyString, Iter, MultivaluedMap, NullValues};
pub use template::UriTemplate;
pub use uri::{Parse, Uri};
