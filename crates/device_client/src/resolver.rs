//! Template-variable substitution for option values such as the device name
//! and the API base url.

use std::collections::HashMap;

pub trait VariableResolver: Send + Sync {
    fn resolve(&self, template: &str) -> String;
}

impl<F> VariableResolver for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn resolve(&self, template: &str) -> String {
        self(template)
    }
}

/// Returns templates unchanged.
pub struct IdentityResolver;

impl VariableResolver for IdentityResolver {
    fn resolve(&self, template: &str) -> String {
        template.to_string()
    }
}

/// Dashboard-style variables: `$name`, `${name}` and `[[name]]`.
///
/// A `:format` suffix inside braces or brackets is accepted and ignored.
/// References to unknown variables are left in place verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateVariables {
    values: HashMap<String, String>,
}

impl TemplateVariables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Expands the reference at the start of `tail`, returning the value and
    /// the number of bytes it replaces.
    fn expand(&self, tail: &str) -> Option<(&str, usize)> {
        if let Some(inner) = tail.strip_prefix("${") {
            let end = inner.find('}')?;
            let value = self.get(strip_format(&inner[..end]))?;
            return Some((value, end + 3));
        }

        if let Some(inner) = tail.strip_prefix("[[") {
            let end = inner.find("]]")?;
            let value = self.get(strip_format(&inner[..end]))?;
            return Some((value, end + 4));
        }

        let inner = tail.strip_prefix('$')?;
        let len = inner
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(inner.len());
        if len == 0 {
            return None;
        }
        let value = self.get(&inner[..len])?;
        Some((value, len + 1))
    }
}

fn strip_format(reference: &str) -> &str {
    reference.split(':').next().unwrap_or_default()
}

impl<K, V> FromIterator<(K, V)> for TemplateVariables
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut variables = Self::new();
        for (name, value) in iter {
            variables.insert(name, value);
        }
        variables
    }
}

impl VariableResolver for TemplateVariables {
    fn resolve(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(pos) = rest.find(['$', '[']) {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos..];
            match self.expand(tail) {
                Some((value, consumed)) => {
                    out.push_str(value);
                    rest = &tail[consumed..];
                }
                None => {
                    // '$' and '[' are both one byte.
                    out.push_str(&tail[..1]);
                    rest = &tail[1..];
                }
            }
        }

        out.push_str(rest);
        out
    }
}
