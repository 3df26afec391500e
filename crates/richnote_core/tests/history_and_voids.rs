use richnote_core::{
    BlockFormat, Document, EditorConfig, EditorSession, Element, ElementKind,
    MarkFormat, Node, Point, Range,
};
use serde_json::json;

fn paragraphs(texts: &[&str]) -> Document {
    Document::new(
        texts
            .iter()
            .map(|text| Element::paragraph(*text).into())
            .collect(),
    )
    .unwrap()
}

fn assert_single_empty_text(node: &Node) {
    let element = node.as_element().expect("element");
    assert!(element.kind.is_void());
    assert_eq!(element.children, vec![Node::text("")]);
}

#[test]
fn undo_restores_document_and_selection_exactly() {
    let original = paragraphs(&["one", "two"]);
    let mut session = EditorSession::new(original.clone());
    let selection = Range::new(Point::new([0, 0], 1), Point::new([1, 0], 2));
    session.select(selection.clone()).unwrap();

    session.toggle_mark(MarkFormat::Italic).unwrap();
    session.toggle_block(BlockFormat::NumberedList).unwrap();
    session.insert_link("https://example.com").unwrap();
    let edited = session.document().clone();

    while session.undo().unwrap() {}
    assert_eq!(session.document(), &original);
    assert_eq!(session.selection(), Some(&selection));
    assert!(session.can_redo());

    while session.redo().unwrap() {}
    assert_eq!(session.document(), &edited);
}

#[test]
fn undo_and_redo_on_empty_history_are_noops() {
    let original = paragraphs(&["stable"]);
    let mut session = EditorSession::new(original.clone());
    assert!(!session.undo().unwrap());
    assert!(!session.redo().unwrap());
    assert_eq!(session.document(), &original);
}

#[test]
fn new_command_clears_redo_stack() {
    let mut session = EditorSession::new(paragraphs(&["text"]));
    session
        .select(Range::collapsed(Point::new([0, 0], 4)))
        .unwrap();
    session.toggle_block(BlockFormat::HeadingTwo).unwrap();
    session.undo().unwrap();
    assert!(session.can_redo());

    session.toggle_block(BlockFormat::BlockQuote).unwrap();
    assert!(!session.can_redo());
}

#[test]
fn history_limit_drops_oldest_batches() {
    let config = EditorConfig {
        history_limit: 2,
        ..EditorConfig::default()
    };
    let mut session = EditorSession::with_config(paragraphs(&["a"]), config);
    session
        .select(Range::collapsed(Point::new([0, 0], 1)))
        .unwrap();
    for format in [
        BlockFormat::HeadingOne,
        BlockFormat::HeadingTwo,
        BlockFormat::BlockQuote,
    ] {
        session.toggle_block(format).unwrap();
    }
    assert_eq!(session.history().undos().len(), 2);

    session.undo().unwrap();
    session.undo().unwrap();
    assert!(!session.can_undo());
    let kind = &session.document().children()[0].as_element().unwrap().kind;
    assert_eq!(kind, &ElementKind::HeadingOne);
}

#[test]
fn collapsed_image_insert_adds_void_block_after_cursor_block() {
    let mut session = EditorSession::new(paragraphs(&["caption"]));
    session
        .select(Range::collapsed(Point::new([0, 0], 7)))
        .unwrap();
    session.insert_image("https://img.example/cat.png").unwrap();

    let blocks = session.document().children();
    assert_eq!(blocks.len(), 2);
    assert_eq!(
        blocks[1].as_element().unwrap().kind,
        ElementKind::Image {
            url: "https://img.example/cat.png".to_string()
        }
    );
    assert_single_empty_text(&blocks[1]);
}

#[test]
fn expanded_image_insert_replaces_selection_and_splits_block() {
    let mut session = EditorSession::new(paragraphs(&["abcd"]));
    session
        .select(Range::new(Point::new([0, 0], 1), Point::new([0, 0], 3)))
        .unwrap();
    session.insert_image("https://img.example/dog.png").unwrap();

    let blocks = session.document().children();
    assert_eq!(blocks.len(), 3);
    assert_eq!(blocks[0].text_content(), "a");
    assert_single_empty_text(&blocks[1]);
    assert_eq!(blocks[2].text_content(), "d");
}

#[test]
fn embed_insert_extracts_status_id() {
    let mut session = EditorSession::default();
    session
        .select(Range::collapsed(Point::new([0, 0], 0)))
        .unwrap();
    session
        .insert_embed("https://twitter.com/rustlang/status/1234567890")
        .unwrap();

    let embed = session.document().children()[1].as_element().unwrap();
    assert_eq!(
        embed.kind,
        ElementKind::Embed {
            id: "1234567890".to_string()
        }
    );
    assert_single_empty_text(&session.document().children()[1]);
}

#[test]
fn typing_inside_void_moves_to_following_paragraph() {
    let mut session = EditorSession::new(
        Document::new(vec![
            Element::paragraph("a").into(),
            Element::image("https://img.example/1.png").into(),
        ])
        .unwrap(),
    );
    session
        .select(Range::collapsed(Point::new([1, 0], 0)))
        .unwrap();
    session.insert_text("b").unwrap();

    let blocks = session.document().children();
    assert_eq!(blocks.len(), 3);
    assert_single_empty_text(&blocks[1]);
    assert_eq!(blocks[2].text_content(), "b");
}

#[test]
fn list_toggle_over_void_wraps_blocks_on_each_side() {
    let original = Document::new(vec![
        Element::paragraph("a").into(),
        Element::image("https://img.example/1.png").into(),
        Element::paragraph("b").into(),
    ])
    .unwrap();
    let mut session = EditorSession::new(original.clone());
    session
        .select(Range::new(Point::new([0, 0], 0), Point::new([2, 0], 1)))
        .unwrap();

    session.toggle_block(BlockFormat::BulletedList).unwrap();
    let blocks = session.document().children();
    let kinds: Vec<_> = blocks
        .iter()
        .map(|block| block.as_element().unwrap().kind.clone())
        .collect();
    assert_eq!(
        kinds,
        vec![
            ElementKind::BulletedList,
            ElementKind::Image {
                url: "https://img.example/1.png".to_string()
            },
            ElementKind::BulletedList,
        ]
    );
    assert_eq!(blocks[0].text_content(), "a");
    assert_eq!(blocks[2].text_content(), "b");
    assert_single_empty_text(&blocks[1]);
    assert!(session.is_block_active(BlockFormat::BulletedList));

    session.toggle_block(BlockFormat::BulletedList).unwrap();
    assert_eq!(session.document(), &original);
}

#[test]
fn list_toggle_on_void_alone_changes_nothing() {
    let original = Document::new(vec![
        Element::image("https://img.example/1.png").into(),
        Element::paragraph("a").into(),
    ])
    .unwrap();
    let mut session = EditorSession::new(original.clone());
    session
        .select(Range::collapsed(Point::new([0, 0], 0)))
        .unwrap();

    session.toggle_block(BlockFormat::NumberedList).unwrap();
    assert_eq!(session.document(), &original);
    assert!(!session.can_undo());
}

#[test]
fn image_insert_over_only_voids_leaves_one_image() {
    let mut session = EditorSession::new(
        Document::new(vec![
            Element::image("https://img.example/a.png").into(),
            Element::image("https://img.example/b.png").into(),
        ])
        .unwrap(),
    );
    session
        .select(Range::new(Point::new([0, 0], 0), Point::new([1, 0], 0)))
        .unwrap();

    session.insert_image("https://img.example/c.png").unwrap();
    let blocks = session.document().children();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].as_element().unwrap().kind, ElementKind::Paragraph);
    assert_eq!(blocks[0].text_content(), "");
    assert_eq!(
        blocks[1].as_element().unwrap().kind,
        ElementKind::Image {
            url: "https://img.example/c.png".to_string()
        }
    );
    assert_single_empty_text(&blocks[1]);
    assert_eq!(
        session.selection(),
        Some(&Range::collapsed(Point::new([1, 0], 0)))
    );
}

#[test]
fn deleting_only_voids_leaves_empty_paragraph() {
    let mut session = EditorSession::new(
        Document::new(vec![
            Element::image("https://img.example/a.png").into(),
            Element::embed("42").into(),
        ])
        .unwrap(),
    );
    session
        .select(Range::new(Point::new([1, 0], 0), Point::new([0, 0], 0)))
        .unwrap();

    session.delete_fragment().unwrap();
    assert_eq!(session.document(), &paragraphs(&[""]));
    assert_eq!(
        session.selection(),
        Some(&Range::collapsed(Point::new([0, 0], 0)))
    );
}

#[test]
fn document_json_shape_round_trips() {
    let value = json!([
        {"type": "heading-one", "children": [{"text": "Title"}]},
        {"type": "paragraph", "children": [
            {"text": "plain "},
            {"text": "bold", "bold": true, "italic": true},
            {"type": "link", "url": "https://a.b", "children": [{"text": "link"}]},
            {"text": ""}
        ]},
        {"type": "bulleted-list", "children": [
            {"type": "list-item", "children": [{"text": "item"}]}
        ]},
        {"type": "image", "url": "https://img/1.png", "children": [{"text": ""}]},
        {"type": "embed", "id": "42", "children": [{"text": ""}]}
    ]);
    let document = Document::from_json_str(&value.to_string()).unwrap();
    let round_trip: serde_json::Value =
        serde_json::from_str(&document.to_json_string().unwrap()).unwrap();
    assert_eq!(round_trip, value);
}

#[test]
fn invalid_document_json_is_rejected() {
    let list_with_paragraph =
        r#"[{"type":"bulleted-list","children":[{"type":"paragraph","children":[{"text":"x"}]}]}]"#;
    assert!(Document::from_json_str(list_with_paragraph).is_err());

    let void_with_text =
        r#"[{"type":"image","url":"u","children":[{"text":"not empty"}]}]"#;
    assert!(Document::from_json_str(void_with_text).is_err());

    assert!(Document::from_json_str("[]").is_err());
}
