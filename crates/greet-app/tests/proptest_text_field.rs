//! Property tests for the text field's edit invariants.

use greet_app::TextField;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Edit {
    Char(char),
    Text(String),
    Set(String),
    Backspace,
    Delete,
    DeleteWord,
    Clear,
    Left,
    Right,
    Home,
    End,
}

fn any_char() -> impl Strategy<Value = char> {
    prop::sample::select(vec![
        'K', 'e', 'n', ' ', '\t', '\n', '\u{7f}', 'é', '\u{301}', '名', '👍',
    ])
}

fn any_text() -> impl Strategy<Value = String> {
    prop::collection::vec(any_char(), 0..6).prop_map(|chars| chars.into_iter().collect())
}

fn edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        4 => any_char().prop_map(Edit::Char),
        1 => any_text().prop_map(Edit::Text),
        1 => any_text().prop_map(Edit::Set),
        2 => Just(Edit::Backspace),
        1 => Just(Edit::Delete),
        1 => Just(Edit::DeleteWord),
        1 => Just(Edit::Clear),
        2 => Just(Edit::Left),
        1 => Just(Edit::Right),
        1 => Just(Edit::Home),
        1 => Just(Edit::End),
    ]
}

fn apply(field: &mut TextField, edit: &Edit) -> Option<greet_app::TextChange> {
    match edit {
        Edit::Char(ch) => field.insert_char(*ch),
        Edit::Text(text) => field.insert_text(text),
        Edit::Set(text) => field.set_text(text),
        Edit::Backspace => field.delete_backward(),
        Edit::Delete => field.delete_forward(),
        Edit::DeleteWord => field.delete_word_backward(),
        Edit::Clear => field.clear(),
        Edit::Left => {
            field.move_left();
            None
        }
        Edit::Right => {
            field.move_right();
            None
        }
        Edit::Home => {
            field.move_home();
            None
        }
        Edit::End => {
            field.move_end();
            None
        }
    }
}

proptest! {
    #[test]
    fn cursor_stays_within_graphemes(edits in prop::collection::vec(edit(), 0..40)) {
        let mut field = TextField::new();
        for edit in &edits {
            apply(&mut field, edit);
            prop_assert!(
                field.cursor() <= field.grapheme_count(),
                "cursor {} past {} graphemes in {:?} after {:?}",
                field.cursor(),
                field.grapheme_count(),
                field.text(),
                edit
            );
        }
    }

    #[test]
    fn change_reported_iff_content_changed(edits in prop::collection::vec(edit(), 0..40)) {
        let mut field = TextField::new();
        for edit in &edits {
            let before = field.text().to_string();
            let change = apply(&mut field, edit);
            match change {
                Some(change) => {
                    prop_assert_ne!(&before, field.text());
                    let expected = (!field.is_empty()).then(|| field.text().to_string());
                    prop_assert_eq!(change.text, expected);
                }
                None => prop_assert_eq!(&before, field.text()),
            }
        }
    }

    #[test]
    fn field_never_holds_control_characters(edits in prop::collection::vec(edit(), 0..40)) {
        let mut field = TextField::new();
        for edit in &edits {
            apply(&mut field, edit);
        }
        prop_assert!(!field.text().chars().any(char::is_control));
    }
}
