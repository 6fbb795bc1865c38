//! Binding of template variables to values.

use super::UriTemplate;
use crate::{
    error::ResolveError,
    pct_enc::{self, Component},
};
use std::{borrow::Cow, collections::HashMap, convert::Infallible, fmt};

/// Encodes a substituted value for a component.
///
/// With `encode` every disallowed character is escaped, `'%'` included;
/// otherwise valid percent-encoded octets are kept.
pub(crate) fn encode_value(value: &str, component: Component, encode: bool) -> Cow<'_, str> {
    if encode {
        pct_enc::encode(value, component)
    } else {
        pct_enc::contextual_encode(value, component)
    }
}

/// Values supplied to a build.
pub(crate) enum Values<'a> {
    /// Bound to placeholders in order of first appearance.
    Positional(&'a [&'a dyn fmt::Display]),
    /// Bound by name.
    Named(HashMap<String, String>),
}

/// Hands out values to placeholders across all components of one build.
///
/// A positional value is bound to a name the first time the name is seen;
/// later occurrences of the name, in any component, reuse it. Surplus
/// positional values are ignored.
pub(crate) struct Binder<'a> {
    values: Values<'a>,
    bound: HashMap<String, String>,
    offset: usize,
}

impl<'a> Binder<'a> {
    pub(crate) fn new(values: Values<'a>) -> Self {
        Self {
            values,
            bound: HashMap::new(),
            offset: 0,
        }
    }

    fn value_for(&mut self, name: &str) -> Option<&str> {
        match &self.values {
            Values::Named(map) => map.get(name).map(String::as_str),
            Values::Positional(values) => {
                if !self.bound.contains_key(name) {
                    let value = values.get(self.offset)?;
                    self.offset += 1;
                    self.bound.insert(name.to_owned(), value.to_string());
                }
                self.bound.get(name).map(String::as_str)
            }
        }
    }

    /// Substitutes every placeholder of `template`, failing on the first
    /// one without a value.
    pub(crate) fn resolve(
        &mut self,
        template: &UriTemplate,
        component: Component,
        encode: bool,
    ) -> Result<String, ResolveError> {
        template.substitute(|name| match self.value_for(name) {
            Some(value) => Ok(Some(Cow::Owned(
                encode_value(value, component, encode).into_owned(),
            ))),
            None => Err(ResolveError::Unresolved {
                name: name.to_owned(),
            }),
        })
    }
}

/// Substitutes the placeholders of `template` that have a value in `values`,
/// keeping the others as written.
pub(crate) fn resolve_partial(
    template: &UriTemplate,
    values: &HashMap<String, String>,
    component: Component,
    encode: bool,
) -> String {
    let resolved = template.substitute(|name| {
        Ok::<_, Infallible>(
            values
                .get(name)
                .map(|value| encode_value(value, component, encode)),
        )
    });
    match resolved {
        Ok(s) => s,
        Err(never) => match never {},
    }
}
