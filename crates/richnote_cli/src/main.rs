//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `richnote_core` linkage.
//! - Run a short scripted edit and print deterministic markup.

use richnote_core::{
    render_html, BlockFormat, EditorResult, EditorSession, MarkFormat, Point, Range,
};

fn main() {
    println!("richnote_core version={}", richnote_core::core_version());
    match run_demo() {
        Ok(html) => println!("richnote_core demo={html}"),
        Err(err) => {
            eprintln!("richnote_core demo failed: {err}");
            std::process::exit(1);
        }
    }
}

fn run_demo() -> EditorResult<String> {
    let mut session = EditorSession::default();
    session.select(Range::collapsed(Point::new([0, 0], 0)))?;
    session.insert_text("Hello rich world")?;

    session.select(Range::new(Point::new([0, 0], 6), Point::new([0, 0], 10)))?;
    session.toggle_mark(MarkFormat::Bold)?;
    session.toggle_block(BlockFormat::HeadingOne)?;

    session.select(Range::new(Point::new([0, 2], 1), Point::new([0, 2], 6)))?;
    session.insert_link("https://example.com")?;

    Ok(render_html(session.document()))
}
