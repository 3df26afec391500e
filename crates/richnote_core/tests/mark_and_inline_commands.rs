use richnote_core::{
    Document, EditorError, EditorSession, Element, ElementKind, MarkFormat, Node, Path, Point,
    Range,
};
use serde_json::json;

fn session_with(text: &str) -> EditorSession {
    EditorSession::new(Document::new(vec![Element::paragraph(text).into()]).unwrap())
}

fn block_json(session: &EditorSession, index: usize) -> serde_json::Value {
    serde_json::to_value(&session.document().children()[index]).unwrap()
}

#[test]
fn toggle_mark_twice_on_range_restores_runs() {
    let mut session = session_with("hello world");
    let original = session.document().clone();
    session
        .select(Range::new(Point::new([0, 0], 0), Point::new([0, 0], 5)))
        .unwrap();

    session.toggle_mark(MarkFormat::Bold).unwrap();
    assert_eq!(
        block_json(&session, 0),
        json!({
            "type": "paragraph",
            "children": [{"text": "hello", "bold": true}, {"text": " world"}]
        })
    );
    assert!(session.is_mark_active(MarkFormat::Bold));
    assert!(!session.is_mark_active(MarkFormat::Italic));

    session.toggle_mark(MarkFormat::Bold).unwrap();
    assert_eq!(session.document(), &original);
    assert!(!session.is_mark_active(MarkFormat::Bold));
}

#[test]
fn mark_is_active_only_when_every_covered_run_has_it() {
    let doc = Document::from_json_str(
        r#"[{"type":"paragraph","children":[{"text":"ab","italic":true},{"text":"cd"}]}]"#,
    )
    .unwrap();
    let mut session = EditorSession::new(doc);

    session
        .select(Range::new(Point::new([0, 0], 0), Point::new([0, 1], 1)))
        .unwrap();
    assert!(!session.is_mark_active(MarkFormat::Italic));

    session
        .select(Range::new(Point::new([0, 0], 0), Point::new([0, 1], 0)))
        .unwrap();
    assert!(session.is_mark_active(MarkFormat::Italic));

    session
        .select(Range::collapsed(Point::new([0, 0], 1)))
        .unwrap();
    assert!(session.is_mark_active(MarkFormat::Italic));
}

#[test]
fn collapsed_toggle_mark_applies_to_next_typed_text() {
    let mut session = EditorSession::default();
    session
        .select(Range::collapsed(Point::new([0, 0], 0)))
        .unwrap();

    session.toggle_mark(MarkFormat::Bold).unwrap();
    assert!(!session.can_undo());
    assert!(session.is_mark_active(MarkFormat::Bold));

    session.insert_text("hi").unwrap();
    session.insert_text("!").unwrap();
    assert_eq!(
        block_json(&session, 0),
        json!({"type": "paragraph", "children": [{"text": "hi!", "bold": true}]})
    );
    assert!(session.pending_marks().is_none());
    assert!(session.is_mark_active(MarkFormat::Bold));
}

#[test]
fn collapsed_insert_link_uses_url_as_text() {
    let mut session = EditorSession::default();
    session
        .select(Range::collapsed(Point::new([0, 0], 0)))
        .unwrap();

    session.insert_link("https://x.com").unwrap();
    assert_eq!(
        block_json(&session, 0),
        json!({
            "type": "paragraph",
            "children": [
                {"text": ""},
                {"type": "link", "url": "https://x.com", "children": [{"text": "https://x.com"}]},
                {"text": ""}
            ]
        })
    );
    assert!(session.is_link_active());
}

#[test]
fn expanded_insert_link_wraps_selected_text() {
    let mut session = session_with("see docs here");
    session
        .select(Range::new(Point::new([0, 0], 4), Point::new([0, 0], 8)))
        .unwrap();

    session.insert_link("https://docs.rs").unwrap();
    assert_eq!(
        block_json(&session, 0),
        json!({
            "type": "paragraph",
            "children": [
                {"text": "see "},
                {"type": "link", "url": "https://docs.rs", "children": [{"text": "docs"}]},
                {"text": " here"}
            ]
        })
    );
    let selection = session.selection().unwrap();
    assert!(selection.is_collapsed());
    assert_eq!(selection.anchor, Point::new([0, 1, 0], 4));
}

#[test]
fn insert_link_replaces_an_existing_link() {
    let mut session = session_with("see docs here");
    session
        .select(Range::new(Point::new([0, 0], 4), Point::new([0, 0], 8)))
        .unwrap();
    session.insert_link("https://old.example").unwrap();

    session
        .select(Range::new(Point::new([0, 1, 0], 0), Point::new([0, 1, 0], 4)))
        .unwrap();
    session.insert_link("https://new.example").unwrap();

    let links: Vec<_> = session
        .document()
        .descendants()
        .into_iter()
        .filter_map(|(_, node)| match node.as_element().map(|element| &element.kind) {
            Some(ElementKind::Link { url }) => Some(url.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(links, vec!["https://new.example".to_string()]);
}

#[test]
fn remove_link_restores_plain_text() {
    let mut session = session_with("see docs here");
    let original = session.document().clone();
    session
        .select(Range::new(Point::new([0, 0], 4), Point::new([0, 0], 8)))
        .unwrap();
    session.insert_link("https://docs.rs").unwrap();

    session.remove_link().unwrap();
    assert_eq!(session.document(), &original);
    assert!(!session.is_link_active());

    // Nothing left to unwrap.
    session.remove_link().unwrap();
    assert_eq!(session.history().undos().len(), 2);
}

#[test]
fn empty_link_url_is_rejected_without_changes() {
    let mut session = session_with("abc");
    session
        .select(Range::collapsed(Point::new([0, 0], 1)))
        .unwrap();
    assert_eq!(
        session.insert_link("   "),
        Err(EditorError::EmptyInput("url"))
    );
    assert!(!session.can_undo());
}

#[test]
fn typing_replaces_expanded_selection() {
    let mut session = session_with("hello world");
    session
        .select(Range::new(Point::new([0, 0], 6), Point::new([0, 0], 11)))
        .unwrap();
    session.insert_text("rust").unwrap();
    assert_eq!(session.document().children()[0].text_content(), "hello rust");
    assert_eq!(
        session.selection(),
        Some(&Range::collapsed(Point::new([0, 0], 10)))
    );
}

#[test]
fn delete_fragment_merges_adjacent_blocks() {
    let mut session = EditorSession::new(
        Document::new(vec![
            Element::paragraph("first").into(),
            Element::paragraph("second").into(),
        ])
        .unwrap(),
    );
    session
        .select(Range::new(Point::new([0, 0], 2), Point::new([1, 0], 3)))
        .unwrap();
    session.delete_fragment().unwrap();

    assert_eq!(session.document().children().len(), 1);
    assert_eq!(session.document().children()[0].text_content(), "fiond");
    assert_eq!(
        session.selection(),
        Some(&Range::collapsed(Point::new([0, 0], 2)))
    );
}

#[test]
fn insert_node_places_text_run_at_cursor() {
    let mut session = session_with("ac");
    session
        .select(Range::collapsed(Point::new([0, 0], 1)))
        .unwrap();
    session.insert_node(Node::text("b")).unwrap();
    assert_eq!(session.document().children()[0].text_content(), "abc");
    assert_eq!(session.document().text(&Path::from([0, 0])).unwrap().text, "abc");
}
