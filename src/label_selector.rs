//! Label selector parsing and matching
//!
//! Parses the textual selector syntax into a `kube::core::Selector`:
//! - Equality: `key=value` or `key==value`
//! - Inequality: `key!=value`
//! - Set-based: `key in (value1,value2)` or `key notin (value1,value2)`
//! - Existence: `key` or `!key`
//! - Requirements joined by commas are ANDed

use crate::{Error, Result};
use kube::core::{Expression, Selector, SelectorExt};
use std::collections::{BTreeMap, BTreeSet};

/// Split a selector string by commas, but not inside parentheses
fn split_requirements(selector: &str) -> Vec<&str> {
    let mut result = Vec::new();
    let mut start = 0;
    let mut depth = 0;

    for (i, ch) in selector.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                result.push(&selector[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    result.push(&selector[start..]);

    result
        .into_iter()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .collect()
}

fn parse_value_set(requirement: &str, values: &str) -> Result<BTreeSet<String>> {
    let values = values
        .trim()
        .strip_prefix('(')
        .and_then(|v| v.strip_suffix(')'))
        .ok_or_else(|| Error::InvalidSelector(format!("expected a value set: {}", requirement)))?;
    Ok(values.split(',').map(|v| v.trim().to_string()).collect())
}

fn parse_key(requirement: &str, key: &str) -> Result<String> {
    let key = key.trim();
    if key.is_empty() || key.contains(char::is_whitespace) {
        return Err(Error::InvalidSelector(format!(
            "invalid label key in: {}",
            requirement
        )));
    }
    Ok(key.to_string())
}

fn parse_requirement(requirement: &str) -> Result<Expression> {
    if let Some((key, values)) = requirement.split_once(" notin ") {
        return Ok(Expression::NotIn(
            parse_key(requirement, key)?,
            parse_value_set(requirement, values)?,
        ));
    }
    if let Some((key, values)) = requirement.split_once(" in ") {
        return Ok(Expression::In(
            parse_key(requirement, key)?,
            parse_value_set(requirement, values)?,
        ));
    }
    if let Some((key, value)) = requirement.split_once("!=") {
        let value = BTreeSet::from([value.trim().to_string()]);
        return Ok(Expression::NotIn(parse_key(requirement, key)?, value));
    }
    if let Some(key) = requirement.strip_prefix('!') {
        return Ok(Expression::DoesNotExist(parse_key(requirement, key)?));
    }
    let equality = requirement
        .split_once("==")
        .or_else(|| requirement.split_once('='));
    if let Some((key, value)) = equality {
        let value = BTreeSet::from([value.trim().to_string()]);
        return Ok(Expression::In(parse_key(requirement, key)?, value));
    }
    Ok(Expression::Exists(parse_key(requirement, requirement)?))
}

/// Parse a label selector string into a Selector; an empty string selects everything.
///
/// ```
/// use hive_testing::label_selector::parse_label_selector;
///
/// let selector = parse_label_selector("env in (prod,staging),!legacy").unwrap();
/// ```
pub fn parse_label_selector(selector: &str) -> Result<Selector> {
    split_requirements(selector)
        .into_iter()
        .map(parse_requirement)
        .collect::<Result<Vec<_>>>()
        .map(Selector::from_iter)
}

/// Match labels against a label selector string
///
/// ```
/// use std::collections::BTreeMap;
/// use hive_testing::label_selector::matches_label_selector;
///
/// let labels = BTreeMap::from([("env".to_string(), "prod".to_string())]);
/// assert!(matches_label_selector(&labels, "env=prod").unwrap());
/// assert!(!matches_label_selector(&labels, "env notin (prod)").unwrap());
/// ```
pub fn matches_label_selector(labels: &BTreeMap<String, String>, selector: &str) -> Result<bool> {
    Ok(parse_label_selector(selector)?.matches(labels))
}

/// Match optional object labels; absent labels behave like an empty set.
pub fn matches_labels(labels: Option<&BTreeMap<String, String>>, selector: &Selector) -> bool {
    match labels {
        Some(labels) => selector.matches(labels),
        None => selector.matches(&BTreeMap::new()),
    }
}
