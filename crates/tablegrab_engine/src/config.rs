//! Selector configuration: which DOM constraints identify each extraction
//! phase (table/header/body/row/column) for a named profile.
//!
//! The configuration is a two-level JSON map `category -> profile -> rule`.
//! String values starting with `regex_` are compiled into patterns once at
//! load time; everything else is an exact-match literal.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read selector config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("selector config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("bad pattern {pattern:?} for {category}.{profile}: {source}")]
    BadPattern {
        category: String,
        profile: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("selector rule {category}.{profile} has none of tag/attr/class")]
    MalformedRule { category: String, profile: String },
}

/// One constraint value, decoded once at load time.
#[derive(Debug, Clone)]
pub enum Matcher {
    Literal(String),
    Pattern(Regex),
}

impl Matcher {
    fn decode(raw: &str, category: &str, profile: &str) -> Result<Self, ConfigError> {
        if raw.starts_with("regex_") {
            // Only the token between the first and second underscore is the
            // pattern source, so patterns cannot themselves contain
            // underscores. Compatibility with the deployed config format.
            let pattern = raw.split('_').nth(1).unwrap_or("");
            let re = Regex::new(pattern).map_err(|source| ConfigError::BadPattern {
                category: category.to_string(),
                profile: profile.to_string(),
                pattern: pattern.to_string(),
                source,
            })?;
            Ok(Matcher::Pattern(re))
        } else {
            Ok(Matcher::Literal(raw.to_string()))
        }
    }

    /// Unanchored search for patterns, full equality for literals.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Matcher::Literal(lit) => lit == value,
            Matcher::Pattern(re) => re.is_match(value),
        }
    }
}

/// Declarative element constraints for one profile within one category.
///
/// All three fields are optional; a rule with none of them set is only
/// rejected when it is actually used (see `resolve`).
#[derive(Debug, Clone, Default)]
pub struct SelectorRule {
    pub tag: Option<Matcher>,
    pub attr: Option<BTreeMap<String, Matcher>>,
    pub class: Option<Matcher>,
}

impl SelectorRule {
    pub fn is_unconstrained(&self) -> bool {
        self.tag.is_none() && self.attr.is_none() && self.class.is_none()
    }
}

/// Raw JSON shape of a rule, before pattern compilation.
#[derive(Debug, Deserialize)]
struct RawRule {
    tag: Option<String>,
    attr: Option<BTreeMap<String, String>>,
    class: Option<String>,
}

impl RawRule {
    fn compile(self, category: &str, profile: &str) -> Result<SelectorRule, ConfigError> {
        let tag = self
            .tag
            .as_deref()
            .map(|raw| Matcher::decode(raw, category, profile))
            .transpose()?;
        let class = self
            .class
            .as_deref()
            .map(|raw| Matcher::decode(raw, category, profile))
            .transpose()?;
        let attr = self
            .attr
            .map(|raw| {
                raw.into_iter()
                    .map(|(name, value)| {
                        Matcher::decode(&value, category, profile).map(|m| (name, m))
                    })
                    .collect::<Result<BTreeMap<_, _>, _>>()
            })
            .transpose()?;
        Ok(SelectorRule { tag, attr, class })
    }
}

/// The selector rule store: loaded once, read-only during extraction.
#[derive(Debug, Clone, Default)]
pub struct ParseConfig {
    rules: HashMap<String, HashMap<String, SelectorRule>>,
}

impl ParseConfig {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let raw: HashMap<String, HashMap<String, RawRule>> = serde_json::from_str(text)?;
        Self::compile(raw)
    }

    /// Build a config from an in-memory JSON value. Mainly for tests.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        let raw: HashMap<String, HashMap<String, RawRule>> = serde_json::from_value(value)?;
        Self::compile(raw)
    }

    fn compile(raw: HashMap<String, HashMap<String, RawRule>>) -> Result<Self, ConfigError> {
        let mut rules = HashMap::with_capacity(raw.len());
        for (category, profiles) in raw {
            let mut compiled = HashMap::with_capacity(profiles.len());
            for (profile, rule) in profiles {
                let rule = rule.compile(&category, &profile)?;
                compiled.insert(profile, rule);
            }
            rules.insert(category, compiled);
        }
        Ok(Self { rules })
    }

    /// Look up the rule for one category/profile pair, if configured.
    pub fn rule(&self, category: &str, profile: &str) -> Option<&SelectorRule> {
        self.rules.get(category)?.get(profile)
    }
}
