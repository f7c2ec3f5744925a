//! Integration tests for the editor lifecycle: load, save, history, sessions

mod common;

use common::{caret, load, span};
use folio_editor::{
    BlockType, ChangeOrigin, EditCommand, EditSession, Editor, EditorConfig, EditorError, InlineType,
    LoadError, Marks, Mark, Node, Point,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

#[test]
fn test_document_lifecycle() {
    let mut editor = load(vec![Node::paragraph("hello")], caret([0, 0], 5));

    assert_eq!(editor.version(), 0);
    assert!(!editor.can_undo());

    editor.insert_text(" world").unwrap();
    assert_eq!(editor.version(), 1);
    assert_eq!(editor.save(), vec![Node::paragraph("hello world")]);
    assert_eq!(editor.history().undo_description(), Some("insert_text"));
}

#[test]
fn test_load_from_json() -> anyhow::Result<()> {
    let json = r#"[
        {"object": "block", "type": "paragraph", "children": [
            {"object": "text", "text": "hi ", "marks": ["emph1"]},
            {"object": "inline", "type": "link", "attributes": {"href": "https://example.com"},
             "children": [{"object": "text", "text": "there"}]}
        ]}
    ]"#;

    let editor = Editor::from_json(json, EditorConfig::default())?;
    let saved = editor.save();
    let children = saved[0].children();
    assert_eq!(children[0], Node::marked("hi ", Marks::from(["emph1"])));
    assert_eq!(
        children[1],
        Node::inline(InlineType::Link, vec![Node::text("there")]).with_attribute("href", "https://example.com")
    );
    // Caret defaults to the start of the first text
    assert_eq!(editor.selection(), Some(caret([0, 0], 0)));
    Ok(())
}

#[test]
fn test_save_load_round_trip() -> anyhow::Result<()> {
    let doc = vec![
        Node::block(BlockType::Header, vec![Node::text("Title")]),
        common::image(),
        common::list(BlockType::OrderedList, &["one", "two"]),
        common::code("fn main() {}\n"),
    ];
    let editor = Editor::load(doc, None, EditorConfig::default())?;

    let json = editor.to_json()?;
    let reloaded = Editor::from_json(&json, EditorConfig::default())?;
    assert_eq!(reloaded.save(), editor.save());
    assert!(!reloaded.can_undo());
    Ok(())
}

#[test]
fn test_empty_forest_loads_default_document() {
    let editor = Editor::new_empty(EditorConfig::default()).unwrap();
    assert_eq!(editor.save(), vec![Node::paragraph("")]);
    assert_eq!(editor.selection(), Some(caret([0, 0], 0)));
}

#[test]
fn test_load_rejects_structural_errors() {
    let void_with_two_texts = vec![Node::block(BlockType::Image, vec![Node::text(""), Node::text("")])];
    let result = Editor::load(void_with_two_texts, None, EditorConfig::default());
    assert!(matches!(
        result,
        Err(EditorError::Load(LoadError::VoidChildren { count: 2, .. }))
    ));

    let top_level_inline = vec![Node::inline(InlineType::Link, vec![Node::text("x")])];
    let result = Editor::load(top_level_inline, None, EditorConfig::default());
    assert!(matches!(result, Err(EditorError::Load(LoadError::InlineAtTopLevel { .. }))));

    let result = Editor::from_json("not a document", EditorConfig::default());
    assert!(matches!(result, Err(EditorError::Load(LoadError::Json(_)))));
}

#[test]
fn test_load_rejects_selection_outside_document() {
    let result = Editor::load(
        vec![Node::paragraph("ab")],
        Some(caret([3, 0], 0)),
        EditorConfig::default(),
    );
    assert!(matches!(result, Err(EditorError::Load(LoadError::InvalidSelection(_)))));
}

#[test]
fn test_undo_redo_restores_tree_and_selection() {
    let range = span([0, 0], 0, 3);
    let mut editor = load(vec![Node::paragraph("abcdef")], range.clone());

    editor.toggle_mark(Mark::strikethrough()).unwrap();
    let marked = editor.save();
    assert_ne!(marked, vec![Node::paragraph("abcdef")]);

    assert!(editor.undo().unwrap());
    assert_eq!(editor.save(), vec![Node::paragraph("abcdef")]);
    assert_eq!(editor.selection(), Some(range));
    assert!(editor.can_redo());

    assert!(editor.redo().unwrap());
    assert_eq!(editor.save(), marked);
    assert!(editor.is_mark_active(&Mark::strikethrough()));

    assert!(!editor.redo().unwrap());
}

#[test]
fn test_undo_restores_marks_of_deleted_leaf() {
    let doc = vec![Node::block(
        BlockType::Paragraph,
        vec![Node::text("ab"), Node::marked("cd", Marks::from(["strikethrough"]))],
    )];
    let mut editor = load(doc.clone(), span([0, 1], 0, 2));

    editor.delete_fragment().unwrap();
    assert_eq!(editor.save(), vec![Node::paragraph("ab")]);

    editor.undo().unwrap();
    assert_eq!(editor.save(), doc);
    assert_eq!(editor.selection(), Some(span([0, 1], 0, 2)));

    editor.redo().unwrap();
    assert_eq!(editor.save(), vec![Node::paragraph("ab")]);
}

#[test]
fn test_undo_merge_restores_block_type() {
    let doc = vec![
        Node::block(BlockType::Header, vec![Node::text("a")]),
        Node::paragraph("b"),
    ];
    let mut editor = load(doc.clone(), caret([1, 0], 0));

    editor.merge_node(&folio_editor::Path::from([1])).unwrap();
    assert_eq!(editor.save(), vec![Node::block(BlockType::Header, vec![Node::text("ab")])]);

    editor.undo().unwrap();
    assert_eq!(editor.save(), doc);

    editor.redo().unwrap();
    assert_eq!(editor.save(), vec![Node::block(BlockType::Header, vec![Node::text("ab")])]);
}

#[test]
fn test_undo_redo_across_normalization_repairs() {
    let doc = vec![Node::block(
        BlockType::Paragraph,
        vec![
            Node::text("ab"),
            Node::marked("cd", Marks::from(["code"])),
            Node::marked("ef", Marks::from(["emph1"])),
        ],
    )];
    let mut editor = load(doc.clone(), span([0, 1], 0, 2));

    // Unmarking merges "cd" into "ab"
    editor.remove_mark(&Mark::code()).unwrap();
    let edited = editor.save();
    assert_eq!(
        edited,
        vec![Node::block(
            BlockType::Paragraph,
            vec![Node::text("abcd"), Node::marked("ef", Marks::from(["emph1"]))],
        )]
    );

    for _ in 0..2 {
        editor.undo().unwrap();
        assert_eq!(editor.save(), doc);
        editor.redo().unwrap();
        assert_eq!(editor.save(), edited);
    }
}

#[test]
fn test_new_edit_clears_redo() {
    let mut editor = load(vec![Node::paragraph("")], caret([0, 0], 0));
    editor.insert_text("a").unwrap();
    editor.undo().unwrap();
    assert!(editor.can_redo());

    editor.insert_text("b").unwrap();
    assert!(!editor.can_redo());
    assert_eq!(editor.save(), vec![Node::paragraph("b")]);
}

#[test]
fn test_undo_limit_from_config() {
    let config = EditorConfig {
        undo_limit: 2,
        ..EditorConfig::default()
    };
    let mut editor = Editor::load(vec![Node::paragraph("")], None, config).unwrap();
    for text in ["a", "b", "c"] {
        editor.insert_text(text).unwrap();
    }
    assert_eq!(editor.history().undo_levels(), 2);

    editor.undo().unwrap();
    editor.undo().unwrap();
    assert!(!editor.undo().unwrap());
    assert_eq!(editor.save(), vec![Node::paragraph("a")]);
}

#[test]
fn test_failed_batch_rolls_back() {
    let mut editor = load(vec![Node::paragraph("keep")], caret([0, 0], 4));

    let result: Result<(), EditorError> = editor.with_batch("failing", |editor| {
        editor.insert_text_at(&Point::new([0, 0], 0), "zz")?;
        Err(EditorError::invalid_operation("boom"))
    });

    assert!(matches!(result, Err(EditorError::InvalidOperation(_))));
    assert_eq!(editor.save(), vec![Node::paragraph("keep")]);
    assert_eq!(editor.selection(), Some(caret([0, 0], 4)));
    assert_eq!(editor.version(), 0);
    assert!(!editor.can_undo());
}

#[test]
fn test_nested_batches_commit_once() {
    let mut editor = load(vec![Node::paragraph("")], caret([0, 0], 0));

    editor
        .with_batch("typing", |editor| {
            editor.insert_text("ab")?;
            editor.insert_text("cd")
        })
        .unwrap();

    assert_eq!(editor.version(), 1);
    assert_eq!(editor.history().undo_levels(), 1);
    editor.undo().unwrap();
    assert_eq!(editor.save(), vec![Node::paragraph("")]);
}

#[test]
fn test_change_listeners_see_every_commit() {
    let mut editor = load(vec![Node::paragraph("")], caret([0, 0], 0));
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    editor.on_change(move |change| sink.borrow_mut().push((change.version, change.origin)));

    editor.insert_text("x").unwrap();
    editor.undo().unwrap();
    editor.redo().unwrap();
    // Selection changes are not document changes
    editor.deselect();

    assert_eq!(
        *seen.borrow(),
        vec![
            (1, ChangeOrigin::Edit),
            (2, ChangeOrigin::Undo),
            (3, ChangeOrigin::Redo),
        ]
    );
}

#[test]
fn test_keymap_drives_editing() {
    let mut editor = load(vec![Node::paragraph("hello")], caret([0, 0], 2));

    assert!(editor.handle_key("Enter").unwrap());
    assert_eq!(editor.save(), vec![Node::paragraph("he"), Node::paragraph("llo")]);

    assert!(editor.handle_key("Backspace").unwrap());
    assert_eq!(editor.save(), vec![Node::paragraph("hello")]);

    assert!(editor.handle_key("Cmd+Z").unwrap());
    assert_eq!(editor.save(), vec![Node::paragraph("he"), Node::paragraph("llo")]);
}

#[test]
fn test_session_hands_off_latest_snapshot() -> anyhow::Result<()> {
    common::init_tracing();
    let editor = Editor::new_empty(EditorConfig::default())?;
    let mut session = EditSession::new("client-1", editor);
    let start = Instant::now();

    session.execute(&EditCommand::InsertText("draft".to_string()), start)?;
    session.execute(&EditCommand::InsertBreak, start + Duration::from_millis(200))?;
    assert_eq!(session.poll_save(start + Duration::from_millis(1000))?, None);

    let snapshot = session
        .poll_save(start + Duration::from_millis(1200))?
        .expect("save should be due");
    assert_eq!(snapshot.version, 2);

    let restored = Editor::from_json(&snapshot.json, EditorConfig::default())?;
    assert_eq!(restored.save(), session.editor.save());
    assert_eq!(session.saved_version(), 2);
    assert_eq!(session.flush()?, None);
    Ok(())
}
