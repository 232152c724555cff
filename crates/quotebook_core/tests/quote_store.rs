use quotebook_core::db::open_db;
use quotebook_core::repo::slot_repo::{
    LAST_QUOTE_SLOT, LEGACY_CATEGORY_SLOT, QUOTES_SLOT, SELECTED_CATEGORY_SLOT,
};
use quotebook_core::{
    default_quotes, CategorySelection, FormatError, ImportPolicy, IndexSource, MemorySlotStore,
    PickError, Quote, QuotePresenter, QuoteStore, QuoteValidationError, RepoError, RepoResult,
    SilentPresenter, SlotStore, SqliteSlotStore, StoreError,
};
use std::cell::RefCell;

#[derive(Default)]
struct RecordingPresenter {
    rendered: RefCell<Vec<Quote>>,
    empty: RefCell<Vec<String>>,
    errors: RefCell<Vec<String>>,
}

impl QuotePresenter for RecordingPresenter {
    fn render(&self, quote: &Quote) {
        self.rendered.borrow_mut().push(quote.clone());
    }

    fn render_empty(&self, selection: &CategorySelection) {
        self.empty.borrow_mut().push(selection.to_string());
    }

    fn render_error(&self, message: &str) {
        self.errors.borrow_mut().push(message.to_string());
    }

    fn notify(&self, _message: &str) {}
}

/// Reads nothing and refuses every write, like a read-only or full disk.
struct FailingWrites;

impl SlotStore for FailingWrites {
    fn get(&self, _key: &str) -> RepoResult<Option<String>> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> RepoResult<()> {
        Err(RepoError::Sqlite(rusqlite::Error::InvalidQuery))
    }

    fn remove(&self, _key: &str) -> RepoResult<()> {
        Err(RepoError::Sqlite(rusqlite::Error::InvalidQuery))
    }
}

struct BrokenRandomness;

impl IndexSource for BrokenRandomness {
    fn next_index(&mut self, _upper: usize) -> Result<usize, PickError> {
        Err(PickError::RandomUnavailable("no entropy".to_string()))
    }
}

fn memory_store() -> QuoteStore<MemorySlotStore, MemorySlotStore> {
    QuoteStore::open(MemorySlotStore::new(), MemorySlotStore::new())
}

#[test]
fn add_appends_one_retrievable_quote_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quotebook.sqlite3");
    let conn = open_db(&path).unwrap();

    let mut store = QuoteStore::open(SqliteSlotStore::new(&conn), MemorySlotStore::new());
    let before = store.len();
    let added = store.add("  Carpe diem ", "Motivation").unwrap();
    assert_eq!(store.len(), before + 1);
    assert_eq!(added.text, "Carpe diem");
    assert!(store.quotes().iter().any(|quote| quote.same_identity(&added)));
    drop(store);

    let reopened = QuoteStore::open(SqliteSlotStore::new(&conn), MemorySlotStore::new());
    assert_eq!(reopened.len(), before + 1);
    assert_eq!(reopened.quotes().last(), Some(&added));
}

#[test]
fn add_accepts_exact_duplicates() {
    let mut store = memory_store();
    store.add("Carpe diem", "Motivation").unwrap();
    store.add("Carpe diem", "Motivation").unwrap();
    let count = store
        .quotes()
        .iter()
        .filter(|quote| quote.text == "Carpe diem")
        .count();
    assert_eq!(count, 2);
}

#[test]
fn add_rejects_blank_fields_without_state_change() {
    let mut store = memory_store();
    let before = store.quotes().to_vec();

    for (text, category) in [("", "Life"), ("   ", "Life"), ("Carpe diem", " \t"), ("", "")] {
        let err = store.add(text, category).expect_err("blank input must fail");
        assert!(matches!(err, StoreError::Validation(_)));
    }
    assert!(matches!(
        store.add(" ", "Life"),
        Err(StoreError::Validation(QuoteValidationError::EmptyText))
    ));
    assert_eq!(store.quotes(), before.as_slice());
}

#[test]
fn add_rejects_wildcard_category() {
    let mut store = memory_store();
    assert!(matches!(
        store.add("Carpe diem", "all"),
        Err(StoreError::Validation(QuoteValidationError::ReservedCategory))
    ));
    assert_eq!(store.quotes(), default_quotes().as_slice());
}

#[test]
fn failed_writes_leave_collection_unchanged() {
    let mut store = QuoteStore::open(FailingWrites, MemorySlotStore::new());
    assert_eq!(store.quotes(), default_quotes().as_slice());

    let err = store.add("Carpe diem", "Motivation").unwrap_err();
    assert!(matches!(err, StoreError::Storage(_)));
    assert_eq!(store.quotes(), default_quotes().as_slice());

    let payload = r#"[
        {"text":"Carpe diem","category":"Motivation"},
        {"text":"Veni, vidi, vici","category":"History"}
    ]"#;
    let err = store.import_bulk(payload).unwrap_err();
    assert!(matches!(err, StoreError::Storage(_)));
    assert_eq!(store.quotes(), default_quotes().as_slice());

    let replacement = vec![Quote::new("Only one", "Server").unwrap()];
    let err = store.replace_all(replacement).unwrap_err();
    assert!(matches!(err, StoreError::Storage(_)));
    assert_eq!(store.quotes(), default_quotes().as_slice());
}

#[test]
fn corrupt_persisted_collection_falls_back_to_defaults() {
    let durable = MemorySlotStore::new();
    durable.set(QUOTES_SLOT, "{not json").unwrap();

    let store = QuoteStore::open(durable, MemorySlotStore::new());
    assert_eq!(store.quotes(), default_quotes().as_slice());
}

#[test]
fn categories_and_options_include_wildcard_once() {
    let mut store = memory_store();
    store.add("Carpe diem", "Motivation").unwrap();

    assert_eq!(store.categories(), vec!["Motivation", "Inspiration", "Life"]);
    assert_eq!(
        store.category_options(),
        vec!["all", "Motivation", "Inspiration", "Life"]
    );
}

#[test]
fn selected_category_persists_and_reads_legacy_slot() {
    let durable = MemorySlotStore::new();
    durable.set(LEGACY_CATEGORY_SLOT, "Life").unwrap();
    let store = QuoteStore::open(durable, MemorySlotStore::new());
    assert_eq!(
        store.selected_category(),
        CategorySelection::Exact("Life".to_string())
    );

    let selection = store.set_selected_category(" Inspiration ").unwrap();
    assert_eq!(selection.as_str(), "Inspiration");
    assert_eq!(store.selected_category().as_str(), "Inspiration");

    store.set_selected_category("").unwrap();
    assert_eq!(store.selected_category(), CategorySelection::All);
}

#[test]
fn effective_selection_widens_unknown_category() {
    let durable = MemorySlotStore::new();
    durable.set(SELECTED_CATEGORY_SLOT, "Vanished").unwrap();
    let store = QuoteStore::open(durable, MemorySlotStore::new());
    assert_eq!(store.effective_selection(), CategorySelection::All);
}

#[test]
fn show_random_renders_and_remembers_for_session() {
    let store = memory_store();
    let presenter = RecordingPresenter::default();

    let shown = store
        .show_random(&CategorySelection::parse("Life"), &presenter)
        .unwrap();
    assert_eq!(shown.category, "Life");
    assert_eq!(presenter.rendered.borrow().as_slice(), &[shown.clone()]);
    assert_eq!(store.last_shown(), Some(shown));
}

#[test]
fn show_random_on_empty_filter_renders_empty_state() {
    let store = memory_store();
    let presenter = RecordingPresenter::default();

    let result = store.show_random(&CategorySelection::parse("Unknown"), &presenter);
    assert_eq!(result.unwrap_err(), PickError::Empty);
    assert_eq!(presenter.empty.borrow().as_slice(), &["Unknown".to_string()]);
    assert!(presenter.rendered.borrow().is_empty());
    assert_eq!(store.last_shown(), None);
}

#[test]
fn show_random_reports_randomness_failure_instead_of_guessing() {
    let store = memory_store();
    let presenter = RecordingPresenter::default();

    let result =
        store.show_random_with(&CategorySelection::All, &presenter, &mut BrokenRandomness);
    assert!(matches!(result, Err(PickError::RandomUnavailable(_))));
    assert_eq!(presenter.errors.borrow().len(), 1);
    assert!(presenter.empty.borrow().is_empty());
    assert!(presenter.rendered.borrow().is_empty());
    assert_eq!(store.last_shown(), None);
}

#[test]
fn last_shown_is_scoped_to_session_store() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db(dir.path().join("quotebook.sqlite3")).unwrap();

    let first = QuoteStore::open(SqliteSlotStore::new(&conn), MemorySlotStore::new());
    first
        .show_random(&CategorySelection::All, &SilentPresenter)
        .unwrap();
    assert!(first.last_shown().is_some());
    drop(first);

    let second = QuoteStore::open(SqliteSlotStore::new(&conn), MemorySlotStore::new());
    assert_eq!(second.last_shown(), None);
}

#[test]
fn corrupt_last_quote_is_treated_as_absent() {
    let session = MemorySlotStore::new();
    session.set(LAST_QUOTE_SLOT, "[]").unwrap();
    let store = QuoteStore::open(MemorySlotStore::new(), session);
    assert_eq!(store.last_shown(), None);
}

#[test]
fn import_rejects_malformed_payloads_without_state_change() {
    let mut store = memory_store();
    let before = store.quotes().to_vec();

    for raw in [
        "nope",
        r#"{"text":"a","category":"b"}"#,
        r#"[{"text":"a","category":"b"},{}]"#,
    ] {
        let err = store.import_bulk(raw).expect_err("malformed import must fail");
        assert!(matches!(err, StoreError::Format(_)));
    }
    assert!(matches!(
        store.import_bulk("[1]"),
        Err(StoreError::Format(FormatError::MissingFields { index: 0 }))
    ));
    assert_eq!(store.quotes(), before.as_slice());
}

#[test]
fn import_policy_is_configurable() {
    let payload = r#"[
        {"text":"In the middle of every difficulty lies opportunity.","category":"Inspiration"},
        {"text":"Carpe diem","category":"Motivation"}
    ]"#;

    let mut skipping = memory_store();
    let result = skipping.import_bulk(payload).unwrap();
    assert_eq!(result.added, 1);
    assert_eq!(result.skipped, 1);
    assert_eq!(skipping.len(), 4);

    let mut appending = memory_store().with_import_policy(ImportPolicy::AppendAll);
    let result = appending.import_bulk(payload).unwrap();
    assert_eq!(result.added, 2);
    assert_eq!(appending.len(), 5);
}

#[test]
fn export_then_import_keeps_every_original_entry() {
    let mut source = memory_store();
    source.add("Carpe diem", "Motivation").unwrap();
    let exported = source.export_all().unwrap();
    let raw = String::from_utf8(exported).unwrap();

    let mut target = QuoteStore::open(MemorySlotStore::new(), MemorySlotStore::new());
    target.import_bulk(&raw).unwrap();
    for quote in source.quotes() {
        assert!(target.quotes().iter().any(|known| known.same_identity(quote)));
    }

    let again = target.import_bulk(&raw).unwrap();
    assert_eq!(again.added, 0);
}

#[test]
fn import_persists_added_quotes() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db(dir.path().join("quotebook.sqlite3")).unwrap();

    let mut store = QuoteStore::open(SqliteSlotStore::new(&conn), MemorySlotStore::new());
    store
        .import_bulk(r#"[{"text":"Carpe diem","category":"Motivation"}]"#)
        .unwrap();
    drop(store);

    let reopened = QuoteStore::open(SqliteSlotStore::new(&conn), MemorySlotStore::new());
    assert!(reopened
        .quotes()
        .iter()
        .any(|quote| quote.text == "Carpe diem"));
}
