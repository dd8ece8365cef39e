//! Script front-end: parse turtle scripts into calls

use miette::{NamedSource, SourceSpan};
use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;

use crate::command::Value;
use crate::errors::ScriptError;

#[derive(Parser)]
#[grammar = "turtle.pest"]
struct ScriptParser;

/// One call as written in the script.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub name: String,
    pub args: Vec<Value>,
    /// Byte range of the call in the source.
    pub span: SourceSpan,
}

/// A parsed script, keeping its source for diagnostics.
#[derive(Debug, Clone)]
pub struct Script {
    name: String,
    source: String,
    calls: Vec<Call>,
}

impl Script {
    pub fn parse(name: impl Into<String>, source: impl Into<String>) -> Result<Self, ScriptError> {
        let name = name.into();
        let source = source.into();
        let calls = parse_calls(&name, &source)?;
        Ok(Self {
            name,
            source,
            calls,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.name, self.source.clone())
    }
}

fn span_of(pair: &Pair<'_, Rule>) -> SourceSpan {
    let span = pair.as_span();
    (span.start(), span.end() - span.start()).into()
}

fn parse_calls(name: &str, source: &str) -> Result<Vec<Call>, ScriptError> {
    let src = || NamedSource::new(name, source.to_string());

    let program = ScriptParser::parse(Rule::program, source).map_err(|e| {
        let span: SourceSpan = match e.location {
            pest::error::InputLocation::Pos(p) => (p, 0).into(),
            pest::error::InputLocation::Span((start, end)) => (start, end - start).into(),
        };
        ScriptError::Syntax {
            message: e.variant.message().into_owned(),
            src: src(),
            span,
        }
    })?;

    let mut calls = Vec::new();
    for pair in program.flat_map(|p| p.into_inner()) {
        if pair.as_rule() != Rule::call {
            continue;
        }
        let span = span_of(&pair);
        let mut inner = pair.into_inner();
        let name = inner
            .next()
            .map(|p| p.as_str().to_string())
            .unwrap_or_default();
        let args = inner
            .map(|arg| parse_value(arg, &src))
            .collect::<Result<Vec<_>, _>>()?;
        calls.push(Call { name, args, span });
    }
    Ok(calls)
}

fn parse_value(
    pair: Pair<'_, Rule>,
    src: &impl Fn() -> NamedSource<String>,
) -> Result<Value, ScriptError> {
    match pair.as_rule() {
        Rule::boolean => Ok(Value::Bool(pair.as_str() == "true")),
        Rule::string => Ok(Value::Str(
            pair.into_inner()
                .next()
                .map(|p| p.as_str().to_string())
                .unwrap_or_default(),
        )),
        _ => {
            let text = pair.as_str();
            text.parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(Value::Number)
                .ok_or_else(|| ScriptError::InvalidNumber {
                    text: text.to_string(),
                    src: src(),
                    span: span_of(&pair),
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calls(source: &str) -> Vec<(String, Vec<Value>)> {
        Script::parse("test", source)
            .unwrap()
            .calls()
            .iter()
            .map(|c| (c.name.clone(), c.args.clone()))
            .collect()
    }

    #[test]
    fn calls_with_and_without_arguments() {
        assert_eq!(
            calls("fd(100)\npenup\ncolor('red')"),
            vec![
                ("fd".to_string(), vec![Value::Number(100.0)]),
                ("penup".to_string(), vec![]),
                ("color".to_string(), vec![Value::Str("red".into())]),
            ]
        );
    }

    #[test]
    fn semicolons_comments_and_blank_lines() {
        let parsed = calls("# square\n\nfd(10); lt(90) # turn\n  fill(true) ;\n");
        let names: Vec<_> = parsed.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["fd", "lt", "fill"]);
        assert_eq!(parsed[2].1, vec![Value::Bool(true)]);
    }

    #[test]
    fn numbers_in_several_forms() {
        assert_eq!(
            calls("setworldcoordinates(-1.5, .5, 2e2, +3)")[0].1,
            vec![
                Value::Number(-1.5),
                Value::Number(0.5),
                Value::Number(200.0),
                Value::Number(3.0)
            ]
        );
    }

    #[test]
    fn empty_script_has_no_calls() {
        assert!(calls("").is_empty());
        assert!(calls("# nothing here\n").is_empty());
    }

    #[test]
    fn spans_point_at_calls() {
        let script = Script::parse("test", "home\n  fd(5)").unwrap();
        assert_eq!(script.calls()[1].span, SourceSpan::from((7, 5)));
    }

    #[test]
    fn syntax_errors_carry_a_span() {
        let err = Script::parse("bad", "fd(10\nlt(90)").unwrap_err();
        assert!(matches!(err, ScriptError::Syntax { .. }));
    }

    #[test]
    fn overflowing_number_is_rejected() {
        let err = Script::parse("big", "fd(1e999)").unwrap_err();
        assert!(matches!(err, ScriptError::InvalidNumber { ref text, .. } if text == "1e999"));
    }
}
