//! Point expressions.
//!
//! An expression is a sum of parenthesized terms:
//! - literal coordinates in centimeters: `(120,-35)`
//! - a point of another part in the same layer: `(Kitchen-3)`
//!
//! `(Kitchen-3)+(0,25)` is the third point of `Kitchen`, 25 cm further up.

use crate::error::{InputError, Result};
use crate::geometry::Point;
use crate::model::Part;

/// One parsed term of a point expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Literal(Point),
    /// `index` is 1-based.
    Reference { identifier: String, index: i64 },
}

/// Split an expression into terms.
pub fn parse_expression(expression: &str) -> Result<Vec<(String, Term)>> {
    let expression = expression.trim();
    if expression.is_empty() {
        return Err(InputError::EmptyExpression);
    }
    split_terms(expression)
        .into_iter()
        .map(|raw| parse_term(raw).map(|t| (raw.to_string(), t)))
        .collect()
}

/// Split at `+` signs outside parentheses, so `(+5,3)` stays one term.
fn split_terms(expression: &str) -> Vec<&str> {
    let mut terms = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in expression.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            '+' if depth == 0 => {
                terms.push(expression[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    terms.push(expression[start..].trim());
    terms
}

pub fn parse_term(raw: &str) -> Result<Term> {
    let malformed = || InputError::MalformedTerm(raw.to_string());
    let inner = raw
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(malformed)?;

    if let Some((x, y)) = inner.split_once(',') {
        let x = x.trim().parse::<i64>().map_err(|_| malformed())?;
        let y = y.trim().parse::<i64>().map_err(|_| malformed())?;
        return Ok(Term::Literal(Point::new(x as f64, y as f64)));
    }

    // Identifiers may contain dashes themselves, the index follows the last one.
    let (identifier, index) = inner.rsplit_once('-').ok_or_else(malformed)?;
    let identifier = identifier.trim();
    if identifier.is_empty() {
        return Err(malformed());
    }
    let index = index.trim().parse::<i64>().map_err(|_| malformed())?;
    Ok(Term::Reference {
        identifier: identifier.to_string(),
        index,
    })
}

/// Resolves expressions against the parts ingested so far.
pub struct Resolver<'a> {
    parts: &'a [Part],
    owner: Option<&'a str>,
}

impl<'a> Resolver<'a> {
    pub fn new(parts: &'a [Part]) -> Self {
        Resolver { parts, owner: None }
    }

    /// Resolve on behalf of the row `identifier`, which must not reference itself.
    pub fn for_row(mut self, identifier: &'a str) -> Self {
        self.owner = Some(identifier);
        self
    }

    /// The unique part named `identifier` in `layer`.
    pub fn find_part(&self, identifier: &str, layer: &str) -> Result<&'a Part> {
        let mut matches = self
            .parts
            .iter()
            .filter(|p| p.identifier == identifier && p.layer == layer);
        match (matches.next(), matches.next()) {
            (Some(p), None) => Ok(p),
            (None, _) => Err(InputError::PartNotFound {
                identifier: identifier.to_string(),
                layer: layer.to_string(),
            }),
            (Some(_), Some(_)) => Err(InputError::DuplicatePart {
                identifier: identifier.to_string(),
                layer: layer.to_string(),
            }),
        }
    }

    /// Absolute coordinates of point `index` (1-based) of a referenced part.
    fn referenced_point(&self, raw: &str, identifier: &str, index: i64, layer: &str) -> Result<Point> {
        if self.owner == Some(identifier) {
            return Err(InputError::SelfReference(raw.to_string()));
        }
        let part = self.find_part(identifier, layer)?;
        if index < 1 {
            return Err(InputError::NonPositiveIndex(raw.to_string()));
        }
        let points = part.points();
        let point = points
            .get((index - 1) as usize)
            .ok_or_else(|| InputError::IndexOutOfRange {
                term: raw.to_string(),
                count: points.len(),
            })?;
        Ok(*point + part.reference_or_origin())
    }

    /// Sum all terms of `expression`. With `relative_to` the result is
    /// expressed relative to that point.
    pub fn resolve(&self, expression: &str, layer: &str, relative_to: Option<Point>) -> Result<Point> {
        let mut sum = Point::ORIGIN;
        for (raw, term) in parse_expression(expression)? {
            sum += match term {
                Term::Literal(p) => p,
                Term::Reference { identifier, index } => {
                    self.referenced_point(&raw, &identifier, index, layer)?
                }
            };
        }
        Ok(match relative_to {
            Some(r) => sum - r,
            None => sum,
        })
    }

    /// Resolve an optional expression; an empty one yields `None`.
    pub fn resolve_optional(&self, expression: &str, layer: &str) -> Result<Option<Point>> {
        if expression.trim().is_empty() {
            Ok(None)
        } else {
            self.resolve(expression, layer, None).map(Some)
        }
    }
}
