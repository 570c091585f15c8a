//! Property filter evaluation for value set include rules.
//!
//! A concept is kept only if it satisfies every filter. The filtered value
//! is the concept's `code` or `display` field, or for any other property
//! name the first matching entry in the concept's property list, rendered as
//! a string. Concepts with no value for a filtered property never match.
//!
//! Every value type is rendered through `PropertyValue`'s `Display`: booleans
//! as lowercase `true`/`false`, decimals as `f64`, dateTimes verbatim and
//! codings as their code. This departs from the legacy Python terminology
//! service, which rendered booleans as `True`/`False` and never resolved
//! `valueDateTime`, `valueDecimal` or `valueCoding`, so filters on those
//! properties excluded every concept there.
//!
//! Only `=` and `regex` are evaluated. Every other operator, including the
//! hierarchy operators (`is-a`, `descendent-of`, ...) and unrecognized
//! operator strings, matches nothing, so a filter using one excludes every
//! concept.

use std::borrow::Cow;

use regex::Regex;
use terminology_types::{Concept, Filter, FilterOperator};

/// How a single compiled filter tests a value.
#[derive(Debug)]
enum Matcher<'f> {
    Equals(&'f str),
    Regex(Regex),
    Never,
}

#[derive(Debug)]
struct CompiledFilter<'f> {
    property: &'f str,
    matcher: Matcher<'f>,
}

/// A list of filters compiled once and applied to many concepts.
#[derive(Debug)]
pub struct FilterEvaluator<'f> {
    filters: Vec<CompiledFilter<'f>>,
}

impl<'f> FilterEvaluator<'f> {
    /// Compiles the filters. Regex patterns that fail to compile are logged
    /// and treated as matching nothing.
    pub fn new(filters: &'f [Filter]) -> Self {
        let filters = filters
            .iter()
            .map(|filter| CompiledFilter {
                property: &filter.property,
                matcher: compile(filter),
            })
            .collect();
        Self { filters }
    }

    /// Returns true if the concept satisfies every filter.
    pub fn matches(&self, concept: &Concept) -> bool {
        self.filters.iter().all(|filter| {
            let Some(value) = property_value(concept, filter.property) else {
                return false;
            };
            match &filter.matcher {
                Matcher::Equals(expected) => value == *expected,
                Matcher::Regex(re) => re.is_match(&value),
                Matcher::Never => false,
            }
        })
    }

    /// Keeps the concepts that satisfy every filter, preserving order.
    pub fn apply<'a>(&self, concepts: &[&'a Concept]) -> Vec<&'a Concept> {
        concepts
            .iter()
            .copied()
            .filter(|c| self.matches(c))
            .collect()
    }
}

/// Filters a concept list in one call.
pub fn apply_filters<'a>(concepts: &[&'a Concept], filters: &[Filter]) -> Vec<&'a Concept> {
    FilterEvaluator::new(filters).apply(concepts)
}

fn compile(filter: &Filter) -> Matcher<'_> {
    match &filter.op {
        FilterOperator::Equals => Matcher::Equals(&filter.value),
        FilterOperator::Regex => match Regex::new(&filter.value) {
            Ok(re) => Matcher::Regex(re),
            Err(e) => {
                tracing::warn!(
                    property = %filter.property,
                    pattern = %filter.value,
                    "Invalid regex in value set filter, no concepts will match: {}",
                    e
                );
                Matcher::Never
            }
        },
        op => {
            tracing::debug!(
                property = %filter.property,
                op = %op,
                "Filter operator is not evaluated, no concepts will match"
            );
            Matcher::Never
        }
    }
}

/// Resolves the string value a filter is tested against.
fn property_value<'c>(concept: &'c Concept, property: &str) -> Option<Cow<'c, str>> {
    match property {
        "code" => Some(Cow::Borrowed(concept.code.as_str())),
        "display" => concept.display.as_deref().map(Cow::Borrowed),
        other => concept.property(other).map(|v| Cow::Owned(v.to_string())),
    }
}
