//! The selector resolver: applies one configured [`SelectorRule`] to a DOM
//! subtree and returns the matching elements in document order.
//!
//! CSS selectors cannot express regex constraints, so matching is a manual
//! walk over the subtree rather than a `scraper::Selector`.

use scraper::ElementRef;

use crate::config::{ParseConfig, SelectorRule};

/// Outcome of one resolver call. The three non-`Found` variants are the
/// distinct "miss" causes; only `ConfigMalformed` indicates a config defect
/// that callers should escalate to a hard error.
#[derive(Debug, Clone)]
pub enum Resolution<'a> {
    /// The rule exists and was applied; the vector may still be empty.
    Found(Vec<ElementRef<'a>>),
    /// The profile name was the empty skip sentinel.
    ProfileSkipped,
    /// No rule under this category/profile key.
    RuleNotConfigured,
    /// A rule exists but carries none of tag/attr/class.
    ConfigMalformed,
}

/// Resolve `category`/`profile` against the descendants of `scope`.
///
/// At most `limit` elements are returned, in document order. `scope` itself
/// is never a candidate.
pub fn resolve<'a>(
    config: &ParseConfig,
    scope: ElementRef<'a>,
    category: &str,
    profile: &str,
    limit: usize,
) -> Resolution<'a> {
    if profile.is_empty() {
        return Resolution::ProfileSkipped;
    }

    let Some(rule) = config.rule(category, profile) else {
        log::error!("no selector rule configured for {category}.{profile}");
        return Resolution::RuleNotConfigured;
    };
    if rule.is_unconstrained() {
        log::error!("selector rule {category}.{profile} has none of tag/attr/class");
        return Resolution::ConfigMalformed;
    }

    let mut matches = Vec::new();
    for node in scope.descendants().skip(1) {
        if matches.len() >= limit {
            break;
        }
        if let Some(element) = ElementRef::wrap(node) {
            if rule_matches(rule, element) {
                matches.push(element);
            }
        }
    }
    Resolution::Found(matches)
}

/// The tag/attr/class decision table.
///
/// When the tag constraint is absent and an attribute constraint is present,
/// the class constraint is ignored. The deployed configs rely on this, so it
/// is kept verbatim; see DESIGN.md.
fn rule_matches(rule: &SelectorRule, element: ElementRef<'_>) -> bool {
    let el = element.value();
    let tag = rule.tag.as_ref().map(|m| m.matches(el.name()));
    let attr = rule.attr.as_ref().map(|constraints| {
        constraints
            .iter()
            .all(|(name, m)| el.attr(name).is_some_and(|value| m.matches(value)))
    });
    let class = rule
        .class
        .as_ref()
        .map(|m| el.classes().any(|class| m.matches(class)));

    match (tag, attr, class) {
        (Some(t), Some(a), Some(c)) => t && a && c,
        (Some(t), Some(a), None) => t && a,
        (Some(t), None, Some(c)) => t && c,
        (Some(t), None, None) => t,
        (None, Some(a), _) => a,
        (None, None, Some(c)) => c,
        // Unconstrained rules are rejected before matching.
        (None, None, None) => false,
    }
}
