//! Run a turtle script headlessly and save the drawing as a PNG.
//!
//! ```text
//! cargo run --example render -- [script.turtle] [out.png]
//! RUST_LOG=debug cargo run --example render --features tracing
//! ```

use std::rc::Rc;

use miette::{IntoDiagnostic, miette};
use turtle_canvas::render::Immediate;
use turtle_canvas::render::defaults::{CANVAS_ID, WINDOW_HEIGHT, WINDOW_WIDTH};
use turtle_canvas::surface::RasterHost;
use turtle_canvas::{Session, TurtleConfig};

const STAR: &str = r#"
# A filled star with a ring around it
bgcolor("white")
color("navy")
fillcolor("gold")
width(3)
penup; goto(-120, 40); pendown
begin_fill
fd(240); rt(144); fd(240); rt(144); fd(240); rt(144); fd(240); rt(144); fd(240)
end_fill
penup; goto(0, -160); seth(0); pendown
pencolor(200, 30, 30)
circle(160)
hideturtle
"#;

#[tokio::main(flavor = "current_thread")]
async fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let (name, source) = match args.next() {
        Some(path) => {
            let source = std::fs::read_to_string(&path).into_diagnostic()?;
            (path, source)
        }
        None => ("star".to_string(), STAR.to_string()),
    };
    let out = args.next().unwrap_or_else(|| "turtle.png".to_string());

    let mut host = RasterHost::new(WINDOW_WIDTH, WINDOW_HEIGHT);
    let surface = host
        .surface(CANVAS_ID)
        .ok_or_else(|| miette!("cannot allocate a {WINDOW_WIDTH}x{WINDOW_HEIGHT} surface"))?;

    let config = TurtleConfig {
        animate: false,
        ..TurtleConfig::default()
    };
    let mut session = Session::new(Box::new(host), Rc::new(Immediate), config);
    let replies = session.run_source(&name, &source).await?;
    tracing::info!(script = %name, calls = replies.len(), "script finished");
    for reply in replies.iter().filter(|r| !r.to_string().is_empty()) {
        println!("{reply}");
    }

    let png = surface
        .borrow()
        .encode_png()
        .ok_or_else(|| miette!("PNG encoding failed"))?;
    std::fs::write(&out, png).into_diagnostic()?;
    eprintln!("wrote {out}");
    Ok(())
}
