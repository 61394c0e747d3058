//! Integration test: sled-backed session and timetable state.
//!
//! ## Scenarios
//! 1. Tokens and the profile survive a store reopen.
//! 2. Clearing the access token signs the profile out while keeping the
//!    refresh token and the stored payload.
//! 3. The demo session is authenticated and recognizable as demo.
//! 4. Timetable conflicts are rejected against persisted state.
//! 5. The demo week loads and clears.
//! 6. Wiping the store removes session and timetable state together.

use std::path::Path;
use std::sync::Arc;

use tempfile::tempdir;
use ustaz_core::{
    demo_week, LessonSlot, ScheduleStore, Session, SledStore, StateStore, UserProfile, DAYS,
    DEMO_TOKEN,
};

fn open_store(path: &Path) -> Arc<SledStore> {
    Arc::new(SledStore::open(path).expect("open sled store"))
}

fn profile() -> UserProfile {
    UserProfile {
        email: "aray@school.kz".to_string(),
        full_name: "Арай Нұрланқызы".to_string(),
        phone: None,
        school_id: Some("sch-1".to_string()),
        class_id: Some("7a".to_string()),
        role: Some("teacher".to_string()),
    }
}

// ---------------------------------------------------------------------------
// 1. Durability
// ---------------------------------------------------------------------------

#[test]
fn session_state_survives_a_reopen() {
    let dir = tempdir().expect("tempdir");

    {
        let session = Session::new(open_store(dir.path()));
        session.set_access_token("token-1").expect("access token");
        session.set_refresh_token("refresh-1").expect("refresh token");
        session.save_profile(&profile()).expect("profile");
    }

    let session = Session::new(open_store(dir.path()));
    assert_eq!(session.access_token().as_deref(), Some("token-1"));
    assert_eq!(session.refresh_token().as_deref(), Some("refresh-1"));
    let user = session.current_user().expect("profile survives");
    assert_eq!(user.full_name, "Арай Нұрланқызы");
}

// ---------------------------------------------------------------------------
// 2. Signing out of the access token only
// ---------------------------------------------------------------------------

#[test]
fn dropping_the_access_token_hides_the_profile() {
    let dir = tempdir().expect("tempdir");
    let session = Session::new(open_store(dir.path()));

    session.set_access_token("token-1").expect("access token");
    session.set_refresh_token("refresh-1").expect("refresh token");
    session.save_profile(&profile()).expect("profile");

    session.clear_access_token().expect("clear access");
    assert!(!session.is_authenticated());
    assert!(
        session.current_user().is_none(),
        "the profile reads signed-out without an access token"
    );
    assert_eq!(
        session.refresh_token().as_deref(),
        Some("refresh-1"),
        "the refresh token is untouched"
    );

    // A new token brings the stored profile back.
    session.set_access_token("token-2").expect("new token");
    assert!(session.current_user().is_some());
}

// ---------------------------------------------------------------------------
// 3. Demo session
// ---------------------------------------------------------------------------

#[test]
fn demo_session_is_authenticated_and_flagged() {
    let dir = tempdir().expect("tempdir");
    let session = Session::new(open_store(dir.path()));

    session.start_demo().expect("start demo");
    assert!(session.is_demo());
    assert!(session.is_authenticated());
    assert_eq!(session.access_token().as_deref(), Some(DEMO_TOKEN));
}

// ---------------------------------------------------------------------------
// 4. Timetable conflicts against persisted state
// ---------------------------------------------------------------------------

#[test]
fn persisted_lessons_still_block_conflicting_saves() {
    let dir = tempdir().expect("tempdir");

    {
        let table = ScheduleStore::new(open_store(dir.path()));
        table
            .upsert(LessonSlot::new(DAYS[0], 1, "math", "7a", Some("205")))
            .expect("first lesson");
    }

    let table = ScheduleStore::new(open_store(dir.path()));
    let clash = LessonSlot::new(DAYS[0], 1, "physics", "7a", None);
    assert!(table.upsert(clash).is_err(), "cell is taken across restarts");
    assert_eq!(table.entries().len(), 1);
}

// ---------------------------------------------------------------------------
// 5. Demo week
// ---------------------------------------------------------------------------

#[test]
fn demo_week_loads_and_clears() {
    let dir = tempdir().expect("tempdir");
    let table = ScheduleStore::new(open_store(dir.path()));

    table.load_demo().expect("load demo week");
    assert_eq!(table.entries().len(), demo_week().len());

    table.clear().expect("clear");
    assert!(table.entries().is_empty());
}

// ---------------------------------------------------------------------------
// 6. Wipe
// ---------------------------------------------------------------------------

#[test]
fn wipe_clears_session_and_timetable_together() {
    let dir = tempdir().expect("tempdir");
    let store = open_store(dir.path());
    let session = Session::new(store.clone());
    let table = ScheduleStore::new(store.clone());

    session.set_access_token("token-1").expect("token");
    session.save_profile(&profile()).expect("profile");
    table.load_demo().expect("demo week");

    store.wipe().expect("wipe");
    assert!(session.access_token().is_none());
    assert!(session.current_user().is_none());
    assert!(table.entries().is_empty());
}
