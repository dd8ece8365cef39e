//! Runs every `tests/scripts/*.turtle` and checks the final turtle state
//! against the sibling `.expected` file.
//!
//! Expectation lines:
//! - `position <x> <y>`
//! - `heading <degrees>`
//! - `pen up` / `pen down`
//! - `turtles <n>`
//! - `error <call>`: the script stops at the named call
//!
//! Blank lines and `#` comments are ignored.

use std::rc::Rc;

use camino::Utf8Path;
use turtle_canvas::render::Immediate;
use turtle_canvas::surface::RecordingHost;
use turtle_canvas::{Command, Reply, ScriptError, Session, TurtleConfig};

const TOLERANCE: f64 = 1e-6;

fn number(word: Option<&str>, line: &str) -> Result<f64, String> {
    word.and_then(|w| w.parse().ok())
        .ok_or_else(|| format!("malformed expectation `{line}`"))
}

fn run_turtle_script(path: &Utf8Path) -> datatest_stable::Result<()> {
    let source = std::fs::read_to_string(path)?;
    let expected_path = path.with_extension("expected");
    let expected = std::fs::read_to_string(&expected_path)
        .map_err(|e| format!("{expected_path}: {e}"))?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    let mut session = Session::new(
        Box::new(RecordingHost::new(400, 400)),
        Rc::new(Immediate),
        TurtleConfig::default(),
    );
    let outcome = runtime.block_on(session.run_source(path.as_str(), &source));
    let mut query = |command: Command| {
        runtime
            .block_on(session.execute(command))
            .map_err(|e| e.to_string())
    };

    let mut error_expected = false;
    for line in expected
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
    {
        let mut words = line.split_whitespace();
        match words.next() {
            Some("error") => {
                error_expected = true;
                let want = words.next().unwrap_or_default();
                match &outcome {
                    Err(ScriptError::CallFailed { call, .. }) if call == want => {}
                    other => {
                        return Err(format!("expected `{want}` to fail, got {other:?}").into());
                    }
                }
            }
            Some("position") => {
                let want = (number(words.next(), line)?, number(words.next(), line)?);
                let Reply::Position(x, y) = query(Command::Position)? else {
                    return Err("position query returned no position".into());
                };
                if (x - want.0).abs() > TOLERANCE || (y - want.1).abs() > TOLERANCE {
                    return Err(format!("expected position {want:?}, got ({x}, {y})").into());
                }
            }
            Some("heading") => {
                let want = number(words.next(), line)?;
                let Reply::Number(h) = query(Command::Heading)? else {
                    return Err("heading query returned no number".into());
                };
                if (h - want).abs() > TOLERANCE {
                    return Err(format!("expected heading {want}, got {h}").into());
                }
            }
            Some("pen") => {
                let want = words.next() == Some("down");
                let got = query(Command::IsDown)?;
                if got != Reply::Bool(want) {
                    return Err(format!("expected `{line}`, got is_down = {got}").into());
                }
            }
            Some("turtles") => {
                let want = number(words.next(), line)? as usize;
                let got = query(Command::Turtles)?;
                if got != Reply::Count(want) {
                    return Err(format!("expected {want} turtle(s), got {got}").into());
                }
            }
            _ => return Err(format!("unknown expectation `{line}`").into()),
        }
    }

    if !error_expected {
        if let Err(e) = outcome {
            return Err(format!("{:?}", miette::Report::new(e)).into());
        }
    }
    Ok(())
}

datatest_stable::harness! {
    { test = run_turtle_script, root = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/scripts"), pattern = r"\.turtle$" },
}
