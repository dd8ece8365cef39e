//! Caller-facing commands
//!
//! A [`Command`] is one call into the engine with its arguments already
//! checked. [`Command::from_call`] turns a loosely typed call (as written in
//! a script) into a command, resolving aliases and validating arity and
//! argument types. Query results come back as a [`Reply`].

use std::fmt;

use crate::errors::{Result, TurtleError};
use crate::types::Color;

/// A loosely typed call argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Str(String),
    Bool(bool),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Bool(b) => write!(f, "{b}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // Motion
    Forward(f64),
    Backward(f64),
    Right(f64),
    Left(f64),
    Goto(f64, f64),
    SetPosition(f64, f64),
    SetX(f64),
    SetY(f64),
    SetHeading(f64),
    Home,
    Circle { radius: f64, extent: Option<f64> },
    Dot { size: Option<f64>, color: Option<Color> },
    Write { text: String, font: Option<String> },
    Stamp,

    // Animation
    Speed { speed: f64, segment: Option<f64> },
    Delay(Option<f64>),
    Tracer { counter: i64, delay: Option<f64> },

    // Queries
    Heading,
    Position,
    XCor,
    YCor,
    Towards(f64, f64),
    Distance(f64, f64),

    // Pen and fill
    PenUp,
    PenDown,
    IsDown,
    Width(Option<f64>),
    PenColor(Option<Color>),
    FillColor(Option<Color>),
    Color(Option<Color>),
    BeginFill,
    EndFill,
    Fill(Option<bool>),

    // Appearance and state
    ShowTurtle,
    HideTurtle,
    IsVisible,
    Shape(Option<String>),
    Reset,
    Clear,
    SetWorldCoordinates { llx: f64, lly: f64, urx: f64, ury: f64 },

    // Screen
    BgColor(Color),
    Setup { width: u32, height: u32 },
    WindowWidth,
    WindowHeight,
    ExitOnClick,
    Turtles,
}

/// Canonical command name for `name`, resolving aliases.
fn canonical(name: &str) -> Option<&'static str> {
    Some(match name {
        "forward" | "fd" => "forward",
        "backward" | "bk" | "back" => "backward",
        "right" | "rt" => "right",
        "left" | "lt" => "left",
        "goto" => "goto",
        "setposition" | "setpos" => "setposition",
        "setx" => "setx",
        "sety" => "sety",
        "setheading" | "seth" => "setheading",
        "home" => "home",
        "circle" => "circle",
        "dot" => "dot",
        "write" => "write",
        "stamp" => "stamp",
        "speed" => "speed",
        "delay" => "delay",
        "tracer" => "tracer",
        "heading" => "heading",
        "position" | "pos" => "position",
        "xcor" => "xcor",
        "ycor" => "ycor",
        "towards" => "towards",
        "distance" => "distance",
        "penup" | "pu" | "up" => "penup",
        "pendown" | "pd" | "down" => "pendown",
        "isdown" => "isdown",
        "width" | "pensize" => "width",
        "pencolor" => "pencolor",
        "fillcolor" => "fillcolor",
        "color" => "color",
        "begin_fill" => "begin_fill",
        "end_fill" => "end_fill",
        "fill" => "fill",
        "showturtle" | "st" => "showturtle",
        "hideturtle" | "ht" => "hideturtle",
        "isvisible" => "isvisible",
        "shape" => "shape",
        "reset" => "reset",
        "clear" => "clear",
        "setworldcoordinates" => "setworldcoordinates",
        "bgcolor" => "bgcolor",
        "setup" => "setup",
        "window_width" => "window_width",
        "window_height" => "window_height",
        "exitonclick" => "exitonclick",
        "turtles" => "turtles",
        _ => return None,
    })
}

/// Positional argument access with errors naming the command.
struct Args<'a> {
    op: &'static str,
    values: &'a [Value],
}

impl Args<'_> {
    fn arity(&self, min: usize, max: usize) -> Result<()> {
        let n = self.values.len();
        if (min..=max).contains(&n) {
            return Ok(());
        }
        let expected = if min == max {
            format!("{min}")
        } else {
            format!("{min} to {max}")
        };
        Err(TurtleError::invalid(
            self.op,
            format!("expected {expected} argument(s), got {n}"),
        ))
    }

    fn mismatch(&self, index: usize, expected: &str) -> TurtleError {
        let got = self
            .values
            .get(index)
            .map_or_else(|| "nothing".to_string(), Value::to_string);
        TurtleError::invalid(
            self.op,
            format!("argument {} must be {expected}, got {got}", index + 1),
        )
    }

    fn number(&self, index: usize) -> Result<f64> {
        match self.values.get(index) {
            Some(Value::Number(n)) => TurtleError::check_finite(self.op, "argument", *n),
            _ => Err(self.mismatch(index, "a number")),
        }
    }

    fn opt_number(&self, index: usize) -> Result<Option<f64>> {
        if index < self.values.len() {
            self.number(index).map(Some)
        } else {
            Ok(None)
        }
    }

    fn integer(&self, index: usize) -> Result<i64> {
        let n = self.number(index)?;
        if n.fract() != 0.0 || n.abs() > i64::MAX as f64 {
            return Err(self.mismatch(index, "an integer"));
        }
        Ok(n as i64)
    }

    fn size(&self, index: usize) -> Result<u32> {
        let n = self.integer(index)?;
        u32::try_from(n)
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| self.mismatch(index, "a positive size"))
    }

    fn string(&self, index: usize) -> Result<String> {
        match self.values.get(index) {
            Some(Value::Str(s)) => Ok(s.clone()),
            _ => Err(self.mismatch(index, "a string")),
        }
    }

    fn opt_string(&self, index: usize) -> Result<Option<String>> {
        if index < self.values.len() {
            self.string(index).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Text to write: strings as-is, other values as displayed.
    fn text(&self, index: usize) -> Result<String> {
        match self.values.get(index) {
            Some(Value::Str(s)) => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            Some(Value::Bool(b)) => Ok(b.to_string()),
            None => Err(self.mismatch(index, "text")),
        }
    }

    fn opt_bool(&self, index: usize) -> Result<Option<bool>> {
        match self.values.get(index) {
            Some(Value::Bool(b)) => Ok(Some(*b)),
            None => Ok(None),
            Some(_) => Err(self.mismatch(index, "true or false")),
        }
    }

    /// A color from the arguments starting at `index`: nothing, one string,
    /// or three numeric channels.
    fn opt_color(&self, index: usize) -> Result<Option<Color>> {
        match self.values.get(index..).unwrap_or_default() {
            [] => Ok(None),
            [Value::Str(s)] => s.parse().map(Some),
            [Value::Number(_), Value::Number(_), Value::Number(_)] => Ok(Some(
                Color::from_channels(
                    self.number(index)?,
                    self.number(index + 1)?,
                    self.number(index + 2)?,
                )?,
            )),
            _ => Err(self.mismatch(index, "a color name or three channels")),
        }
    }

    fn color(&self, index: usize) -> Result<Color> {
        self.opt_color(index)?
            .ok_or_else(|| self.mismatch(index, "a color"))
    }
}

impl Command {
    /// Build a command from a call name (aliases accepted) and its arguments.
    pub fn from_call(name: &str, values: &[Value]) -> Result<Command> {
        let Some(op) = canonical(name) else {
            return Err(TurtleError::invalid(
                "command",
                format!("unknown command `{name}`"),
            ));
        };
        let a = Args { op, values };

        let none = |command: Command| -> Result<Command> {
            a.arity(0, 0)?;
            Ok(command)
        };

        match op {
            "forward" | "backward" | "right" | "left" | "setx" | "sety" | "setheading" => {
                a.arity(1, 1)?;
                let n = a.number(0)?;
                Ok(match op {
                    "forward" => Command::Forward(n),
                    "backward" => Command::Backward(n),
                    "right" => Command::Right(n),
                    "left" => Command::Left(n),
                    "setx" => Command::SetX(n),
                    "sety" => Command::SetY(n),
                    _ => Command::SetHeading(n),
                })
            }
            "goto" | "setposition" | "towards" | "distance" => {
                a.arity(2, 2)?;
                let (x, y) = (a.number(0)?, a.number(1)?);
                Ok(match op {
                    "goto" => Command::Goto(x, y),
                    "setposition" => Command::SetPosition(x, y),
                    "towards" => Command::Towards(x, y),
                    _ => Command::Distance(x, y),
                })
            }
            "circle" => {
                a.arity(1, 2)?;
                Ok(Command::Circle {
                    radius: a.number(0)?,
                    extent: a.opt_number(1)?,
                })
            }
            "dot" => {
                a.arity(0, 4)?;
                Ok(Command::Dot {
                    size: a.opt_number(0)?,
                    color: a.opt_color(1)?,
                })
            }
            "write" => {
                a.arity(1, 2)?;
                Ok(Command::Write {
                    text: a.text(0)?,
                    font: a.opt_string(1)?,
                })
            }
            "speed" => {
                a.arity(1, 2)?;
                Ok(Command::Speed {
                    speed: a.number(0)?,
                    segment: a.opt_number(1)?,
                })
            }
            "delay" => {
                a.arity(0, 1)?;
                Ok(Command::Delay(a.opt_number(0)?))
            }
            "tracer" => {
                a.arity(1, 2)?;
                Ok(Command::Tracer {
                    counter: a.integer(0)?,
                    delay: a.opt_number(1)?,
                })
            }
            "width" => {
                a.arity(0, 1)?;
                Ok(Command::Width(a.opt_number(0)?))
            }
            "pencolor" | "fillcolor" | "color" => {
                a.arity(0, 3)?;
                let color = a.opt_color(0)?;
                Ok(match op {
                    "pencolor" => Command::PenColor(color),
                    "fillcolor" => Command::FillColor(color),
                    _ => Command::Color(color),
                })
            }
            "fill" => {
                a.arity(0, 1)?;
                Ok(Command::Fill(a.opt_bool(0)?))
            }
            "shape" => {
                a.arity(0, 1)?;
                Ok(Command::Shape(a.opt_string(0)?))
            }
            "setworldcoordinates" => {
                a.arity(4, 4)?;
                Ok(Command::SetWorldCoordinates {
                    llx: a.number(0)?,
                    lly: a.number(1)?,
                    urx: a.number(2)?,
                    ury: a.number(3)?,
                })
            }
            "bgcolor" => {
                a.arity(1, 3)?;
                Ok(Command::BgColor(a.color(0)?))
            }
            "setup" => {
                a.arity(2, 2)?;
                Ok(Command::Setup {
                    width: a.size(0)?,
                    height: a.size(1)?,
                })
            }
            "home" => none(Command::Home),
            "stamp" => none(Command::Stamp),
            "heading" => none(Command::Heading),
            "position" => none(Command::Position),
            "xcor" => none(Command::XCor),
            "ycor" => none(Command::YCor),
            "penup" => none(Command::PenUp),
            "pendown" => none(Command::PenDown),
            "isdown" => none(Command::IsDown),
            "begin_fill" => none(Command::BeginFill),
            "end_fill" => none(Command::EndFill),
            "showturtle" => none(Command::ShowTurtle),
            "hideturtle" => none(Command::HideTurtle),
            "isvisible" => none(Command::IsVisible),
            "reset" => none(Command::Reset),
            "clear" => none(Command::Clear),
            "window_width" => none(Command::WindowWidth),
            "window_height" => none(Command::WindowHeight),
            "exitonclick" => none(Command::ExitOnClick),
            _ => none(Command::Turtles),
        }
    }
}

/// Result of executing a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    None,
    Number(f64),
    Position(f64, f64),
    Bool(bool),
    Text(String),
    Color(Color),
    /// `(pen, fill)`
    Colors(Color, Color),
    Count(usize),
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::None => Ok(()),
            Reply::Number(n) => write!(f, "{n}"),
            Reply::Position(x, y) => write!(f, "({x}, {y})"),
            Reply::Bool(b) => write!(f, "{b}"),
            Reply::Text(s) => f.write_str(s),
            Reply::Color(c) => write!(f, "{c}"),
            Reply::Colors(pen, fill) => write!(f, "{pen} {fill}"),
            Reply::Count(n) => write!(f, "{n}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    #[test]
    fn aliases_resolve() {
        assert_eq!(Command::from_call("fd", &[num(10.0)]), Ok(Command::Forward(10.0)));
        assert_eq!(Command::from_call("back", &[num(3.0)]), Ok(Command::Backward(3.0)));
        assert_eq!(Command::from_call("pu", &[]), Ok(Command::PenUp));
        assert_eq!(Command::from_call("seth", &[num(90.0)]), Ok(Command::SetHeading(90.0)));
        assert_eq!(Command::from_call("pensize", &[num(4.0)]), Ok(Command::Width(Some(4.0))));
    }

    #[test]
    fn arity_is_checked() {
        let err = Command::from_call("forward", &[]).unwrap_err();
        assert_eq!(err.to_string(), "forward: invalid argument: expected 1 argument(s), got 0");
        let err = Command::from_call("circle", &[num(1.0), num(2.0), num(3.0)]).unwrap_err();
        assert!(err.to_string().contains("expected 1 to 2"));
    }

    #[test]
    fn argument_types_are_checked() {
        let err = Command::from_call("left", &[Value::Str("ninety".into())]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "left: invalid argument: argument 1 must be a number, got \"ninety\""
        );
        assert!(Command::from_call("fill", &[num(1.0)]).is_err());
        assert!(Command::from_call("tracer", &[num(1.5)]).is_err());
        assert!(Command::from_call("setup", &[num(0.0), num(10.0)]).is_err());
    }

    #[test]
    fn colors_from_names_or_channels() {
        assert_eq!(
            Command::from_call("pencolor", &[Value::Str("red".into())]),
            Ok(Command::PenColor(Some(Color::Named("red".into()))))
        );
        assert_eq!(
            Command::from_call("color", &[num(255.0), num(-16.0), num(0.0)]),
            Ok(Command::Color(Some(Color::Rgb(255, 16, 0))))
        );
        assert_eq!(Command::from_call("fillcolor", &[]), Ok(Command::FillColor(None)));
        assert!(Command::from_call("pencolor", &[num(1.0), num(2.0)]).is_err());
        assert!(Command::from_call("pencolor", &[num(300.0), num(0.0), num(0.0)]).is_err());
    }

    #[test]
    fn dot_takes_optional_color() {
        assert_eq!(
            Command::from_call("dot", &[num(5.0), Value::Str("blue".into())]),
            Ok(Command::Dot {
                size: Some(5.0),
                color: Some(Color::Named("blue".into()))
            })
        );
        assert_eq!(
            Command::from_call("dot", &[]),
            Ok(Command::Dot { size: None, color: None })
        );
    }

    #[test]
    fn unknown_command() {
        let err = Command::from_call("moonwalk", &[]).unwrap_err();
        assert!(matches!(err, TurtleError::InvalidArgument { operation: "command", .. }));
    }

    #[test]
    fn replies_display() {
        assert_eq!(Reply::Position(1.5, -2.0).to_string(), "(1.5, -2)");
        assert_eq!(
            Reply::Colors(Color::black(), Color::Rgb(255, 0, 0)).to_string(),
            "black #ff0000"
        );
        assert_eq!(Reply::None.to_string(), "");
    }
}
