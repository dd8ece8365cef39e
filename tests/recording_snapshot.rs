use std::rc::Rc;

use turtle_canvas::render::Immediate;
use turtle_canvas::surface::{DrawLog, RecordingHost};
use turtle_canvas::{Session, TurtleConfig};

async fn record(script: &str) -> DrawLog {
    let mut host = RecordingHost::new(200, 200);
    let (main, _) = host.logs("mycanvas");
    let config = TurtleConfig {
        animate: false,
        ..TurtleConfig::default()
    };
    let mut session = Session::new(Box::new(host), Rc::new(Immediate), config);
    session.run_source("snapshot", script).await.unwrap();
    main
}

#[tokio::test]
async fn pen_moves_and_dot() {
    let main = record(
        "hideturtle\npencolor('red')\nfd(50)\nlt(90)\npenup\nfd(20)\npendown\ndot(4)",
    )
    .await;
    insta::assert_snapshot!(main.to_string(), @r"
    reset_transform
    translate 100 100
    scale 1 -1
    clear_rect -100 -100 200 200
    move_to 0 0
    stroke_style red
    begin_path
    move_to 0 0
    line_cap round
    line_join round
    line_width 2
    stroke_style red
    line_to 50 0
    stroke
    close_path
    move_to 50 20
    fill_rect 48 18 4 4
    ");
}

#[tokio::test]
async fn quarter_circle_is_one_arc() {
    let main = record("hideturtle\ncircle(10, 90)").await;
    insta::assert_snapshot!(main.to_string(), @r"
    reset_transform
    translate 100 100
    scale 1 -1
    clear_rect -100 -100 200 200
    move_to 0 0
    line_cap round
    line_join round
    line_width 2
    stroke_style black
    begin_path
    arc 0.000 10.000 r=10.000 -7.8540..-6.2832
    stroke
    close_path
    ");
}

#[tokio::test]
async fn fill_wraps_the_outline_in_one_path() {
    let main = record("hideturtle\nbegin_fill\nfd(10)\nlt(90)\nfd(10)\nend_fill").await;
    let ops: Vec<String> = main.ops().iter().skip(5).map(ToString::to_string).collect();
    insta::assert_snapshot!(ops.join("\n"), @r"
    begin_path
    move_to 0 0
    line_cap round
    line_join round
    line_width 2
    stroke_style black
    line_to 10 0
    stroke
    line_cap round
    line_join round
    line_width 2
    stroke_style black
    line_to 10 10
    stroke
    stroke
    fill_style black
    fill
    close_path
    ");
}
