//! Tests for the registration service orchestration.

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{MockPasswordHasher, MockUserRecordStore};
use crate::domain::user::{EmailAddress, PasswordHash};
use crate::domain::validation::FieldName;
use rstest::{fixture, rstest};
use rstest_bdd_macros::{given, then, when};
use uuid::Uuid;

fn stored(record: &NewUserRecord) -> UserRecord {
    UserRecord {
        id: Uuid::nil(),
        username: record.username.clone(),
        email: record.email.clone(),
        full_name: record.full_name.clone(),
        bio: record.bio.clone(),
    }
}

fn existing(username: &str, email: &str) -> UserRecord {
    UserRecord {
        id: Uuid::nil(),
        username: Username::normalise(username).expect("username"),
        email: EmailAddress::normalise(email).expect("email"),
        full_name: None,
        bio: None,
    }
}

fn healthy_hasher() -> MockPasswordHasher {
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .returning(|password| Ok(PasswordHash::new(format!("hashed:{}", password.expose().len()))));
    hasher
}

fn accepting_store() -> MockUserRecordStore {
    let mut store = MockUserRecordStore::new();
    store.expect_find_by_username().returning(|_| Ok(None));
    store.expect_find_by_email().returning(|_| Ok(None));
    store
        .expect_insert()
        .returning(|record| Ok(stored(record)));
    store
}

#[fixture]
fn hasher() -> MockPasswordHasher {
    healthy_hasher()
}

/// Store with no users that accepts any insert.
#[fixture]
fn empty_store() -> MockUserRecordStore {
    accepting_store()
}

fn service(
    store: MockUserRecordStore,
    hasher: MockPasswordHasher,
) -> RegistrationService<MockUserRecordStore, MockPasswordHasher> {
    RegistrationService::new(Arc::new(store), Arc::new(hasher), ProfileValidator::default())
}

#[rstest]
fn clones_share_collaborators_without_cloning_them(
    empty_store: MockUserRecordStore,
    hasher: MockPasswordHasher,
) {
    let original = service(empty_store, hasher);
    let copy = original.clone();

    assert!(Arc::ptr_eq(&original.store, &copy.store));
    assert!(Arc::ptr_eq(&original.hasher, &copy.hasher));
    assert_eq!(copy.validator().policy(), original.validator().policy());
}

#[rstest]
#[tokio::test]
async fn registers_valid_profile(empty_store: MockUserRecordStore, hasher: MockPasswordHasher) {
    let service = service(empty_store, hasher);
    let outcome = service
        .register(&CandidateProfile::new("Alice2", "Str0ng!Pass", "A@B.com"))
        .await
        .expect("collaborators healthy");

    let RegistrationOutcome::Registered(record) = outcome else {
        panic!("expected registration, got {outcome:?}");
    };
    assert_eq!(record.username.as_ref(), "alice2");
    assert_eq!(record.email.as_ref(), "a@b.com");
}

#[rstest]
#[tokio::test]
async fn insert_receives_hash_not_plaintext(hasher: MockPasswordHasher) {
    let mut store = MockUserRecordStore::new();
    store.expect_find_by_username().returning(|_| Ok(None));
    store.expect_find_by_email().returning(|_| Ok(None));
    store
        .expect_insert()
        .withf(|record| record.password_hash.as_str() == "hashed:11")
        .times(1)
        .returning(|record| Ok(stored(record)));

    let outcome = service(store, hasher)
        .register(&CandidateProfile::new("alice2", "Str0ng!Pass", "a@b.com"))
        .await
        .expect("collaborators healthy");
    assert!(matches!(outcome, RegistrationOutcome::Registered(_)));
}

#[rstest]
#[tokio::test]
async fn rejected_profiles_never_touch_collaborators() {
    let service = service(MockUserRecordStore::new(), MockPasswordHasher::new());
    let outcome = service
        .register(&CandidateProfile::new("al", "weak", "invalidemail"))
        .await
        .expect("validation failures are outcomes");

    let RegistrationOutcome::Rejected(rejections) = outcome else {
        panic!("expected rejection, got {outcome:?}");
    };
    assert_eq!(
        rejections.fields(),
        vec![FieldName::Username, FieldName::Password, FieldName::Email]
    );
}

#[rstest]
#[case(true, false, ConflictField::Username)]
#[case(false, true, ConflictField::Email)]
#[tokio::test]
async fn advisory_conflicts_stop_before_insert(
    #[case] username_taken: bool,
    #[case] email_taken: bool,
    #[case] expected: ConflictField,
) {
    let mut store = MockUserRecordStore::new();
    store.expect_find_by_username().returning(move |_| {
        Ok(username_taken.then(|| existing("existing_user", "other@example.com")))
    });
    store.expect_find_by_email().returning(move |_| {
        Ok(email_taken.then(|| existing("someone", "test@example.com")))
    });
    store.expect_insert().never();

    let outcome = service(store, MockPasswordHasher::new())
        .register(&CandidateProfile::new(
            "existing_user",
            "Newpassowrd123!",
            "test@example.com",
        ))
        .await
        .expect("collaborators healthy");
    assert_eq!(outcome, RegistrationOutcome::Conflict(expected));
}

#[rstest]
#[tokio::test]
async fn insert_constraint_wins_over_advisory_check(hasher: MockPasswordHasher) {
    let mut store = MockUserRecordStore::new();
    store.expect_find_by_username().returning(|_| Ok(None));
    store.expect_find_by_email().returning(|_| Ok(None));
    store
        .expect_insert()
        .times(1)
        .returning(|_| Err(UserRecordStoreError::duplicate_key(ConflictField::Username)));

    let outcome = service(store, hasher)
        .register(&CandidateProfile::new("alice2", "Str0ng!Pass", "a@b.com"))
        .await
        .expect("duplicate key is an outcome");
    assert_eq!(
        outcome,
        RegistrationOutcome::Conflict(ConflictField::Username)
    );
}

#[rstest]
#[tokio::test]
async fn unavailable_store_is_an_error() {
    let mut store = MockUserRecordStore::new();
    store
        .expect_find_by_username()
        .returning(|_| Err(UserRecordStoreError::connection("connection refused")));

    let err = service(store, MockPasswordHasher::new())
        .register(&CandidateProfile::new("alice2", "Str0ng!Pass", "a@b.com"))
        .await
        .expect_err("store outage propagates");
    assert_eq!(
        err,
        RegistrationError::CollaboratorUnavailable {
            message: "connection refused".to_owned()
        }
    );
    assert_eq!(Error::from(err).code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn hashing_failure_is_an_error(empty_store: MockUserRecordStore) {
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .returning(|_| Err(PasswordHasherError::failed("out of memory")));

    let err = service(empty_store, hasher)
        .register(&CandidateProfile::new("alice2", "Str0ng!Pass", "a@b.com"))
        .await
        .expect_err("hasher failure propagates");
    assert!(matches!(err, RegistrationError::Hashing(_)));
    assert_eq!(Error::from(err).code(), ErrorCode::InternalError);
}

#[rstest]
fn outcomes_map_to_domain_errors() {
    let conflict = RegistrationOutcome::Conflict(ConflictField::Email)
        .into_result()
        .expect_err("conflict is an error");
    assert_eq!(conflict.code(), ErrorCode::Conflict);
    assert_eq!(conflict.message(), "User with given email already exists.");

    let rejections = ProfileValidator::default()
        .validate(&CandidateProfile::new("al", "Str0ng!Pass", "a@b.com"))
        .into_result()
        .expect_err("rejected");
    let invalid = RegistrationOutcome::Rejected(rejections)
        .into_result()
        .expect_err("rejection is an error");
    assert_eq!(invalid.code(), ErrorCode::InvalidRequest);
    assert_eq!(invalid.message(), "Validation error");
    let details = invalid.details().expect("details");
    assert_eq!(details["fields"][0]["field"], "username");
}

#[rstest]
#[tokio::test]
async fn edit_profile_updates_email_and_hashes_password(hasher: MockPasswordHasher) {
    let mut store = MockUserRecordStore::new();
    store
        .expect_find_by_username()
        .returning(|_| Ok(Some(existing("user_to_update", "update@example.com"))));
    store.expect_find_by_email().returning(|_| Ok(None));
    store
        .expect_update_profile()
        .withf(|username, changes| {
            username.as_ref() == "user_to_update"
                && changes.email.as_ref().map(|email| email.as_ref()) == Some("updated_email@example.com")
                && changes.password_hash.is_some()
        })
        .times(1)
        .returning(|_, _| Ok(Some(existing("user_to_update", "updated_email@example.com"))));

    let update = ProfileUpdate {
        email: Some("updated_email@example.com".to_owned()),
        password: Some(crate::domain::Password::new("NewPassword123!")),
        ..ProfileUpdate::default()
    };
    let outcome = service(store, hasher)
        .edit_profile("User_To_Update", &update)
        .await
        .expect("collaborators healthy");
    let ProfileEditOutcome::Updated(record) = outcome else {
        panic!("expected update, got {outcome:?}");
    };
    assert_eq!(record.email.as_ref(), "updated_email@example.com");
}

#[rstest]
#[tokio::test]
async fn edit_profile_rejects_email_owned_by_another_user() {
    let mut store = MockUserRecordStore::new();
    store
        .expect_find_by_username()
        .returning(|_| Ok(Some(existing("user_to_update", "update@example.com"))));
    store
        .expect_find_by_email()
        .returning(|_| Ok(Some(existing("existing_user", "existing@example.com"))));
    store.expect_update_profile().never();

    let update = ProfileUpdate {
        email: Some("existing@example.com".to_owned()),
        ..ProfileUpdate::default()
    };
    let outcome = service(store, MockPasswordHasher::new())
        .edit_profile("user_to_update", &update)
        .await
        .expect("collaborators healthy");
    assert_eq!(outcome, ProfileEditOutcome::Conflict(ConflictField::Email));
}

#[rstest]
#[tokio::test]
async fn edit_profile_keeping_own_email_skips_lookup() {
    let mut store = MockUserRecordStore::new();
    store
        .expect_find_by_username()
        .returning(|_| Ok(Some(existing("alice", "alice@example.com"))));
    store.expect_find_by_email().never();
    store
        .expect_update_profile()
        .times(1)
        .returning(|_, _| Ok(Some(existing("alice", "alice@example.com"))));

    let update = ProfileUpdate {
        email: Some("ALICE@example.com".to_owned()),
        ..ProfileUpdate::default()
    };
    let outcome = service(store, MockPasswordHasher::new())
        .edit_profile("alice", &update)
        .await
        .expect("collaborators healthy");
    assert!(matches!(outcome, ProfileEditOutcome::Updated(_)));
}

#[rstest]
#[tokio::test]
async fn edit_profile_reports_invalid_fields() {
    let mut store = MockUserRecordStore::new();
    store
        .expect_find_by_username()
        .returning(|_| Ok(Some(existing("alice", "alice@example.com"))));

    let update = ProfileUpdate {
        email: Some("invalidemail".to_owned()),
        ..ProfileUpdate::default()
    };
    let outcome = service(store, MockPasswordHasher::new())
        .edit_profile("alice", &update)
        .await
        .expect("collaborators healthy");
    let ProfileEditOutcome::Rejected(rejections) = outcome else {
        panic!("expected rejection, got {outcome:?}");
    };
    assert_eq!(rejections.fields(), vec![FieldName::Email]);
}

#[rstest]
#[case("   ")]
#[case("ghost")]
#[tokio::test]
async fn edit_profile_for_unknown_user_is_not_found(#[case] username: &str) {
    let mut store = MockUserRecordStore::new();
    store.expect_find_by_username().returning(|_| Ok(None));

    let err = service(store, MockPasswordHasher::new())
        .edit_profile(username, &ProfileUpdate::default())
        .await
        .expect_err("unknown user");
    assert!(matches!(err, RegistrationError::NotFound { .. }));
    assert_eq!(Error::from(err).code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn empty_edit_returns_existing_record_without_writing() {
    let mut store = MockUserRecordStore::new();
    store
        .expect_find_by_username()
        .returning(|_| Ok(Some(existing("alice", "alice@example.com"))));
    store.expect_update_profile().never();

    let outcome = service(store, MockPasswordHasher::new())
        .edit_profile("alice", &ProfileUpdate::default())
        .await
        .expect("collaborators healthy");
    assert_eq!(
        outcome,
        ProfileEditOutcome::Updated(existing("alice", "alice@example.com"))
    );
}

#[given("an empty user store")]
fn an_empty_user_store() -> RegistrationService<MockUserRecordStore, MockPasswordHasher> {
    service(accepting_store(), healthy_hasher())
}

#[when("alice2 registers with a strong password")]
fn alice2_registers_with_a_strong_password(
    service: RegistrationService<MockUserRecordStore, MockPasswordHasher>,
) -> RegistrationOutcome {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime")
        .block_on(service.register(&CandidateProfile::new("alice2", "Str0ng!Pass", "a@b.com")))
        .expect("collaborators healthy")
}

#[then("the registration is accepted")]
fn the_registration_is_accepted(outcome: RegistrationOutcome) {
    let record = outcome.into_result().expect("registered");
    assert_eq!(record.username.as_ref(), "alice2");
}

#[rstest]
fn strong_password_with_empty_store_scenario() {
    let service = an_empty_user_store();
    let outcome = alice2_registers_with_a_strong_password(service);
    the_registration_is_accepted(outcome);
}
