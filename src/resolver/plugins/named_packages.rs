use crate::resolver::context::ResolutionContext;
use crate::resolver::plugin::ResolvePlugin;
use ahash::AHashMap;
use regex::{Captures, Regex};
use serde_json::Value;
use std::sync::LazyLock;
use tracing::debug;

struct NamePatterns {
    /// A name in package position inside a target or type tag: `@org/app::module`.
    qualified: Regex,
    /// A string that is nothing but a name, as found in a `package` field.
    bare: Regex,
}

static NAME_PATTERNS: LazyLock<Result<NamePatterns, regex::Error>> = LazyLock::new(|| {
    Ok(NamePatterns {
        qualified: Regex::new(r"(^|[^A-Za-z0-9_@.\-])(@[A-Za-z0-9_\-]+(?:/[A-Za-z0-9_\-]+)*)::")?,
        bare: Regex::new(r"^@[A-Za-z0-9_\-]+(?:/[A-Za-z0-9_\-]+)*$")?,
    })
});

fn name_patterns() -> eyre::Result<&'static NamePatterns> {
    NAME_PATTERNS.as_ref().map_err(|e| eyre::eyre!("invalid package name pattern: {}", e))
}

/// Rewrites `@org/app`-style package names in command payloads to package addresses.
///
/// Only package positions are touched: a name directly followed by `::`, or a `package`
/// field holding a bare name. An `@` anywhere else, such as in a memo, is left alone.
pub struct NamedPackagesPlugin {
    packages: AHashMap<String, String>,
}

impl NamedPackagesPlugin {
    pub fn new() -> Self {
        Self { packages: AHashMap::new() }
    }

    /// Registers `name` (with or without the leading `@`) as an alias for `address`.
    pub fn with_package(mut self, name: &str, address: impl Into<String>) -> Self {
        let name = if name.starts_with('@') { name.to_string() } else { format!("@{}", name) };
        self.packages.insert(name, address.into());
        self
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    fn rewrite(&self, patterns: &NamePatterns, value: &mut Value, package_field: bool, unknown: &mut Vec<String>) -> usize {
        match value {
            Value::String(s) if package_field && patterns.bare.is_match(s.as_str()) => match self.packages.get(s.as_str()) {
                Some(address) => {
                    *s = address.clone();
                    1
                }
                None => {
                    unknown.push(s.clone());
                    0
                }
            },
            Value::String(s) => {
                let mut replaced = 0;
                let rewritten = patterns.qualified.replace_all(s, |caps: &Captures| match self.packages.get(&caps[2]) {
                    Some(address) => {
                        replaced += 1;
                        format!("{}{}::", &caps[1], address)
                    }
                    None => {
                        unknown.push(caps[2].to_string());
                        caps[0].to_string()
                    }
                });
                if replaced > 0 {
                    *s = rewritten.into_owned();
                }
                replaced
            }
            Value::Array(items) => items.iter_mut().map(|item| self.rewrite(patterns, item, false, unknown)).sum(),
            Value::Object(map) => {
                map.iter_mut().map(|(key, item)| self.rewrite(patterns, item, key == "package", unknown)).sum()
            }
            _ => 0,
        }
    }
}

impl Default for NamedPackagesPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolvePlugin for NamedPackagesPlugin {
    fn name(&self) -> &str {
        "NamedPackagesPlugin"
    }

    fn resolve(&self, ctx: &mut ResolutionContext) -> eyre::Result<()> {
        let patterns = name_patterns()?;
        let mut unknown = Vec::new();
        let mut replaced = 0;

        for payload in ctx.transaction.payloads_mut() {
            replaced += self.rewrite(patterns, payload, false, &mut unknown);
        }

        if let Some(name) = unknown.first() {
            return Err(eyre::eyre!("unresolved package name {}", name));
        }
        if replaced > 0 {
            debug!(replaced, "Rewrote named packages");
        }
        Ok(())
    }
}
