use std::collections::HashMap;

use regex::Regex;

use crate::{ErrorKind, Result};

/// Characters a named parameter never spans
const PARAM_PATTERN: &str = r"([^/#?]+?)";

/// A path (or host) template with named `:parameters`, e.g.
/// `/lol/match/v5/matches/:matchId/timeline`.
///
/// Matching is anchored at both ends, case-insensitive and tolerates a single
/// trailing `/`, `#` or `?`.
#[derive(Debug, Clone)]
pub(crate) struct PathTemplate {
    template: &'static str,
    params: Vec<&'static str>,
    regex: Regex,
}

/// One piece of a template: literal text or a named parameter
#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Literal(&'a str),
    Param(&'a str),
}

impl PathTemplate {
    /// Compile a template.
    ///
    /// Templates are static catalog data, so an empty parameter name
    /// (`/foo/:/bar`) is treated as literal text rather than an error.
    pub(crate) fn new(template: &'static str) -> Self {
        let mut pattern = String::from("(?i)^");
        let mut params = Vec::new();
        for segment in segments(template) {
            match segment {
                Segment::Literal(text) => pattern.push_str(&regex::escape(text)),
                Segment::Param(name) => {
                    pattern.push_str(PARAM_PATTERN);
                    params.push(name);
                }
            }
        }
        pattern.push_str("[/#?]?$");

        // Only escaped literals and a fixed parameter group go into the
        // pattern, so compilation cannot fail.
        let regex = Regex::new(&pattern).unwrap_or_else(|_| unreachable!("{pattern}"));
        Self {
            template,
            params,
            regex,
        }
    }

    /// The raw template string
    pub(crate) const fn as_str(&self) -> &'static str {
        self.template
    }

    /// Parameter names in order of appearance
    pub(crate) fn params(&self) -> &[&'static str] {
        &self.params
    }

    /// Returns `true` if `input` matches this template
    pub(crate) fn is_match(&self, input: &str) -> bool {
        self.regex.is_match(input)
    }

    /// Captured parameter values by name, if `input` matches
    pub(crate) fn captures<'a>(&self, input: &'a str) -> Option<HashMap<&'static str, &'a str>> {
        let captures = self.regex.captures(input)?;
        Some(
            self.params
                .iter()
                .zip(captures.iter().skip(1))
                .filter_map(|(name, value)| value.map(|v| (*name, v.as_str())))
                .collect(),
        )
    }

    /// Substitute every parameter with its value.
    ///
    /// Values are inserted verbatim; callers are responsible for escaping.
    pub(crate) fn render(&self, values: &HashMap<&str, &str>) -> Result<String> {
        let mut rendered = String::with_capacity(self.template.len());
        for segment in segments(self.template) {
            match segment {
                Segment::Literal(text) => rendered.push_str(text),
                Segment::Param(name) => {
                    let value =
                        values
                            .get(name)
                            .ok_or_else(|| ErrorKind::MissingTemplateParameter {
                                template: self.template,
                                param: name.to_string(),
                            })?;
                    rendered.push_str(value);
                }
            }
        }
        Ok(rendered)
    }
}

/// Split a template into literals and `:name` parameters.
/// A parameter name consists of ASCII alphanumerics and `_`.
fn segments(template: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find(':') {
        let name_len = rest[start + 1..]
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(rest.len() - start - 1);
        if name_len == 0 {
            segments.push(Segment::Literal(&rest[..=start]));
            rest = &rest[start + 1..];
            continue;
        }
        if start > 0 {
            segments.push(Segment::Literal(&rest[..start]));
        }
        segments.push(Segment::Param(&rest[start + 1..start + 1 + name_len]));
        rest = &rest[start + 1 + name_len..];
    }
    if !rest.is_empty() {
        segments.push(Segment::Literal(rest));
    }
    segments
}
