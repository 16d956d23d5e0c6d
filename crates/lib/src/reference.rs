//! Deferred references between declarations.
//!
//! Many attributes are only known once the engine has realized a resource: a
//! bucket's id, a function's ARN, an endpoint's URL. Assemblers describe them
//! with a typed [`Deferred`] handle and embed it in attribute strings as a
//! token, so the graph builder can find every reference, check that it
//! resolves, and let synthesis rewrite it into the engine's syntax.
//!
//! # Token Format
//!
//! - `$${ref:<logical-id>:<attribute>}` - attribute of a declared resource
//!
//! Single `$` characters pass through unchanged. Use `$$$` before `{` to
//! produce a literal `$${` sequence.
//!
//! # Example
//!
//! ```
//! use thumbstack_lib::reference::{parse, Deferred, Segment};
//!
//! let segments = parse("http://$${ref:webapp_bucket:bucket}/index.html").unwrap();
//! assert_eq!(segments, vec![
//!     Segment::Literal("http://".to_string()),
//!     Segment::Reference(Deferred::new("webapp_bucket", "bucket")),
//!     Segment::Literal("/index.html".to_string()),
//! ]);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::resource::LogicalId;

/// A value owned by another declaration, resolved after realization.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Deferred {
  pub resource: LogicalId,
  pub attribute: String,
}

impl Deferred {
  pub fn new(resource: impl Into<LogicalId>, attribute: &str) -> Self {
    Self {
      resource: resource.into(),
      attribute: attribute.to_string(),
    }
  }

  /// The token embedding this reference in an attribute string.
  pub fn token(&self) -> String {
    format!("$${{ref:{}:{}}}", self.resource, self.attribute)
  }
}

impl std::fmt::Display for Deferred {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}.{}", self.resource, self.attribute)
  }
}

/// A segment of parsed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
  Literal(String),
  Reference(Deferred),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
  #[error("unclosed reference at position {0}")]
  Unclosed(usize),

  #[error("unknown reference type: {0}")]
  UnknownType(String),

  #[error("malformed reference: {0}")]
  Malformed(String),

  #[error("unresolved reference: {0}")]
  Unresolved(Deferred),
}

/// Resolves deferred references to concrete text.
pub trait Resolver {
  fn resolve(&self, reference: &Deferred) -> Result<String, ReferenceError>;
}

/// Parse a string containing reference tokens into segments.
///
/// # Errors
///
/// Returns an error if a token is unclosed, of an unknown type, or missing
/// its resource id or attribute.
pub fn parse(input: &str) -> Result<Vec<Segment>, ReferenceError> {
  let mut segments = Vec::new();
  let mut literal = String::new();
  let mut chars = input.char_indices().peekable();

  while let Some((pos, ch)) = chars.next() {
    if ch != '$' {
      literal.push(ch);
      continue;
    }

    match chars.peek() {
      Some((_, '$')) => {
        chars.next();

        match chars.peek() {
          Some((_, '$')) => {
            chars.next();
            match chars.peek() {
              Some((_, '{')) => {
                // $$${ escapes to a literal $${
                literal.push_str("$${");
                chars.next();
              }
              _ => literal.push_str("$$$"),
            }
          }
          Some((_, '{')) => {
            chars.next();

            if !literal.is_empty() {
              segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }

            let mut content = String::new();
            let mut found_close = false;
            for (_, c) in chars.by_ref() {
              if c == '}' {
                found_close = true;
                break;
              }
              content.push(c);
            }

            if !found_close {
              return Err(ReferenceError::Unclosed(pos));
            }

            segments.push(Segment::Reference(parse_token_content(&content)?));
          }
          _ => literal.push_str("$$"),
        }
      }
      _ => literal.push('$'),
    }
  }

  if !literal.is_empty() {
    segments.push(Segment::Literal(literal));
  }

  Ok(segments)
}

fn parse_token_content(content: &str) -> Result<Deferred, ReferenceError> {
  let (kind, rest) = content
    .split_once(':')
    .ok_or_else(|| ReferenceError::Malformed(format!("missing colon in '{content}'")))?;

  if kind != "ref" {
    return Err(ReferenceError::UnknownType(kind.to_string()));
  }

  let (resource, attribute) = rest
    .split_once(':')
    .ok_or_else(|| ReferenceError::Malformed(format!("reference missing attribute: '{content}'")))?;

  if resource.is_empty() || attribute.is_empty() || attribute.contains(':') {
    return Err(ReferenceError::Malformed(content.to_string()));
  }

  Ok(Deferred::new(resource, attribute))
}

/// All references embedded in a string, in order of appearance.
pub fn references(input: &str) -> Result<Vec<Deferred>, ReferenceError> {
  Ok(
    parse(input)?
      .into_iter()
      .filter_map(|segment| match segment {
        Segment::Reference(r) => Some(r),
        Segment::Literal(_) => None,
      })
      .collect(),
  )
}

/// Parse and substitute in one step.
pub fn substitute(input: &str, resolver: &impl Resolver) -> Result<String, ReferenceError> {
  let segments = parse(input)?;
  substitute_segments(&segments, resolver)
}

pub fn substitute_segments(segments: &[Segment], resolver: &impl Resolver) -> Result<String, ReferenceError> {
  let mut result = String::new();
  for segment in segments {
    match segment {
      Segment::Literal(s) => result.push_str(s),
      Segment::Reference(r) => result.push_str(&resolver.resolve(r)?),
    }
  }
  Ok(result)
}

/// Recursively collect the references in every string of a JSON value.
pub fn collect_references(value: &serde_json::Value, out: &mut Vec<Deferred>) -> Result<(), ReferenceError> {
  match value {
    serde_json::Value::String(s) => out.extend(references(s)?),
    serde_json::Value::Array(items) => {
      for item in items {
        collect_references(item, out)?;
      }
    }
    serde_json::Value::Object(map) => {
      for item in map.values() {
        collect_references(item, out)?;
      }
    }
    serde_json::Value::Null | serde_json::Value::Bool(_) | serde_json::Value::Number(_) => {}
  }
  Ok(())
}

/// Recursively substitute references in every string of a JSON value.
pub fn substitute_value(value: &mut serde_json::Value, resolver: &impl Resolver) -> Result<(), ReferenceError> {
  match value {
    serde_json::Value::String(s) => *s = substitute(s, resolver)?,
    serde_json::Value::Array(items) => {
      for item in items {
        substitute_value(item, resolver)?;
      }
    }
    serde_json::Value::Object(map) => {
      for item in map.values_mut() {
        substitute_value(item, resolver)?;
      }
    }
    serde_json::Value::Null | serde_json::Value::Bool(_) | serde_json::Value::Number(_) => {}
  }
  Ok(())
}
