//! Session: a registry plus an anonymous turtle on the default surface
//!
//! Convenience wrapper for callers that issue procedural commands without
//! managing turtles themselves. The turtle is created on first use.

use std::rc::Rc;

use crate::TurtleConfig;
use crate::command::{Command, Reply};
use crate::errors::{Result, ScriptError};
use crate::log;
use crate::render::{DeviceHandle, DeviceRegistry, Pacer, Turtle};
use crate::script::Script;
use crate::surface::SurfaceHost;

pub struct Session {
    registry: DeviceRegistry,
    turtle: Option<Turtle>,
}

impl Session {
    pub fn new(host: Box<dyn SurfaceHost>, pacer: Rc<dyn Pacer>, config: TurtleConfig) -> Self {
        Self {
            registry: DeviceRegistry::new(host, pacer, config),
            turtle: None,
        }
    }

    pub fn registry(&mut self) -> &mut DeviceRegistry {
        &mut self.registry
    }

    fn canvas_id(&self) -> String {
        self.registry.config().canvas_id.clone()
    }

    /// The default surface's device.
    pub fn device(&mut self) -> Result<DeviceHandle> {
        let id = self.canvas_id();
        self.registry.device(&id)
    }

    /// The anonymous turtle, spawned on first use.
    pub fn turtle(&mut self) -> Result<&mut Turtle> {
        let turtle = match self.turtle.take() {
            Some(turtle) => turtle,
            None => {
                let id = self.canvas_id();
                self.registry.spawn_turtle(&id)?
            }
        };
        Ok(self.turtle.insert(turtle))
    }

    pub async fn execute(&mut self, command: Command) -> Result<Reply> {
        match command {
            Command::BgColor(color) => {
                self.device()?.borrow_mut().bgcolor(color)?;
                Ok(Reply::None)
            }
            Command::Setup { width, height } => {
                self.device()?.borrow_mut().setup(width, height)?;
                Ok(Reply::None)
            }
            Command::WindowWidth => Ok(Reply::Number(f64::from(
                self.device()?.borrow().window_width(),
            ))),
            Command::WindowHeight => Ok(Reply::Number(f64::from(
                self.device()?.borrow().window_height(),
            ))),
            Command::Turtles => Ok(Reply::Count(self.device()?.borrow().turtles().len())),
            Command::ExitOnClick => {
                // The anonymous turtle would otherwise keep the device busy.
                self.turtle = None;
                let id = self.canvas_id();
                Ok(Reply::Bool(self.registry.exit_on_click(&id)?))
            }
            command => self.execute_turtle(command).await,
        }
    }

    async fn execute_turtle(&mut self, command: Command) -> Result<Reply> {
        let t = self.turtle()?;
        let reply = match command {
            Command::Forward(d) => {
                t.forward(d).await?;
                Reply::None
            }
            Command::Backward(d) => {
                t.backward(d).await?;
                Reply::None
            }
            Command::Right(a) => {
                t.right(a)?;
                Reply::None
            }
            Command::Left(a) => {
                t.left(a)?;
                Reply::None
            }
            Command::Goto(x, y) => {
                t.goto(x, y).await?;
                Reply::None
            }
            Command::SetPosition(x, y) => {
                t.set_position(x, y).await?;
                Reply::None
            }
            Command::SetX(x) => {
                t.set_x(x).await?;
                Reply::None
            }
            Command::SetY(y) => {
                t.set_y(y).await?;
                Reply::None
            }
            Command::SetHeading(a) => {
                t.set_heading(a)?;
                Reply::None
            }
            Command::Home => {
                t.home()?;
                Reply::None
            }
            Command::Circle { radius, extent } => {
                t.circle(radius, extent).await?;
                Reply::None
            }
            Command::Dot { size, color } => {
                t.dot(size, color.as_ref())?;
                Reply::None
            }
            Command::Write { text, font } => {
                t.write(&text, font.as_deref())?;
                Reply::None
            }
            Command::Stamp => {
                t.stamp()?;
                Reply::None
            }
            Command::Speed { speed, segment } => {
                t.speed(speed, segment)?;
                Reply::None
            }
            Command::Delay(ms) => Reply::Number(t.delay(ms)?),
            Command::Tracer { counter, delay } => {
                t.tracer(counter, delay)?;
                Reply::None
            }
            Command::Heading => Reply::Number(t.heading()),
            Command::Position => {
                let (x, y) = t.position();
                Reply::Position(x, y)
            }
            Command::XCor => Reply::Number(t.xcor()),
            Command::YCor => Reply::Number(t.ycor()),
            Command::Towards(x, y) => Reply::Number(t.towards(x, y)?),
            Command::Distance(x, y) => Reply::Number(t.distance(x, y)?),
            Command::PenUp => {
                t.pen_up();
                Reply::None
            }
            Command::PenDown => {
                t.pen_down();
                Reply::None
            }
            Command::IsDown => Reply::Bool(t.is_down()),
            Command::Width(None) => Reply::Number(t.pen_width()),
            Command::Width(Some(w)) => {
                t.width(w)?;
                Reply::None
            }
            Command::PenColor(None) => Reply::Color(t.pen_color().clone()),
            Command::PenColor(Some(c)) => {
                t.set_pen_color(c)?;
                Reply::None
            }
            Command::FillColor(None) => Reply::Color(t.fill_color().clone()),
            Command::FillColor(Some(c)) => {
                t.set_fill_color(c)?;
                Reply::None
            }
            Command::Color(None) => {
                let (pen, fill) = t.color();
                Reply::Colors(pen.clone(), fill.clone())
            }
            Command::Color(Some(c)) => {
                t.set_color(c)?;
                Reply::None
            }
            Command::BeginFill => {
                t.begin_fill()?;
                Reply::None
            }
            Command::EndFill => {
                t.end_fill()?;
                Reply::None
            }
            Command::Fill(on) => Reply::Bool(t.fill(on)?),
            Command::ShowTurtle => {
                t.show_turtle()?;
                Reply::None
            }
            Command::HideTurtle => {
                t.hide_turtle()?;
                Reply::None
            }
            Command::IsVisible => Reply::Bool(t.is_visible()),
            Command::Shape(None) => Reply::Text(t.current_shape().to_string()),
            Command::Shape(Some(name)) => {
                t.shape(&name)?;
                Reply::None
            }
            Command::Reset => {
                t.reset()?;
                Reply::None
            }
            Command::Clear => {
                t.clear()?;
                Reply::None
            }
            Command::SetWorldCoordinates { llx, lly, urx, ury } => {
                t.set_world_coordinates(llx, lly, urx, ury)?;
                Reply::None
            }
            Command::BgColor(_)
            | Command::Setup { .. }
            | Command::WindowWidth
            | Command::WindowHeight
            | Command::ExitOnClick
            | Command::Turtles => Reply::None,
        };
        Ok(reply)
    }

    /// Run every call of `script` in order, stopping at the first failure.
    pub async fn run_script(&mut self, script: &Script) -> Result<Vec<Reply>, ScriptError> {
        let mut replies = Vec::with_capacity(script.calls().len());
        for call in script.calls() {
            let fail = |cause| ScriptError::CallFailed {
                call: call.name.clone(),
                cause,
                src: script.named_source(),
                span: call.span,
            };
            let command = Command::from_call(&call.name, &call.args).map_err(fail)?;
            match self.execute(command).await {
                Ok(reply) => replies.push(reply),
                Err(cause) => {
                    log::warn!(call = %call.name, error = %cause, "script call rejected");
                    return Err(fail(cause));
                }
            }
        }
        Ok(replies)
    }

    /// Parse and run a script in one go.
    pub async fn run_source(&mut self, name: &str, source: &str) -> Result<Vec<Reply>, ScriptError> {
        let script = Script::parse(name, source)?;
        self.run_script(&script).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Immediate;
    use crate::surface::{DrawOp, RecordingHost};

    fn session() -> Session {
        Session::new(
            Box::new(RecordingHost::new(200, 200)),
            Rc::new(Immediate),
            TurtleConfig::default(),
        )
    }

    #[tokio::test]
    async fn commands_drive_the_anonymous_turtle() {
        let mut s = session();
        s.execute(Command::Forward(50.0)).await.unwrap();
        s.execute(Command::Left(90.0)).await.unwrap();
        s.execute(Command::Forward(20.0)).await.unwrap();
        let pos = s.execute(Command::Position).await.unwrap();
        assert_eq!(pos, Reply::Position(50.0, 20.0));
        assert_eq!(s.execute(Command::Turtles).await.unwrap(), Reply::Count(1));
    }

    #[tokio::test]
    async fn scripts_return_one_reply_per_call() {
        let mut s = session();
        let replies = s
            .run_source("square", "speed(0)\nfd(10); heading\nisdown")
            .await
            .unwrap();
        assert_eq!(
            replies,
            vec![Reply::None, Reply::None, Reply::Number(0.0), Reply::Bool(true)]
        );
    }

    #[tokio::test]
    async fn failing_call_points_at_the_script() {
        let mut s = session();
        let err = s.run_source("bad", "fd(10)\nshape('dragon')").await.unwrap_err();
        match err {
            ScriptError::CallFailed { call, span, .. } => {
                assert_eq!(call, "shape");
                assert_eq!(span.offset(), 7);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn exit_on_click_drops_the_anonymous_turtle() {
        let mut host = RecordingHost::new(100, 100);
        let (main, _) = host.logs("mycanvas");
        let mut s = Session::new(Box::new(host), Rc::new(Immediate), TurtleConfig::default());
        s.execute(Command::Forward(10.0)).await.unwrap();
        assert_eq!(s.execute(Command::ExitOnClick).await.unwrap(), Reply::Bool(true));
        assert_eq!(main.ops().last(), Some(&DrawOp::Visible(false)));
        assert!(s.registry().get("mycanvas").is_none());
    }

    #[tokio::test]
    async fn screen_commands() {
        let mut s = session();
        s.execute(Command::Setup { width: 300, height: 120 }).await.unwrap();
        assert_eq!(s.execute(Command::WindowWidth).await.unwrap(), Reply::Number(300.0));
        assert_eq!(s.execute(Command::WindowHeight).await.unwrap(), Reply::Number(120.0));
    }
}
