use notewell_core::db::open_db_in_memory;
use notewell_core::{
    AccountError, AccountService, NewUser, ProfileUpdate, SqliteUserRepository, UserRole,
    UserValidationError,
};
use uuid::Uuid;

#[test]
fn register_defaults_role_and_normalizes_email() {
    let conn = open_db_in_memory().unwrap();
    let service = AccountService::new(SqliteUserRepository::new(&conn));

    let user = service
        .register(&new_user("Grace.Hopper@Example.COM"))
        .unwrap();
    assert_eq!(user.email, "grace.hopper@example.com");
    assert_eq!(user.role, UserRole::User);
    assert_eq!(user.created_at, user.updated_at);

    let profile = service.get_profile(user.id).unwrap();
    assert_eq!(profile, user);
}

#[test]
fn register_accepts_explicit_admin_role() {
    let conn = open_db_in_memory().unwrap();
    let service = AccountService::new(SqliteUserRepository::new(&conn));

    let mut input = new_user("admin@example.com");
    input.role = Some(UserRole::Admin);
    let user = service.register(&input).unwrap();
    assert_eq!(user.role, UserRole::Admin);
}

#[test]
fn duplicate_email_is_rejected_regardless_of_case() {
    let conn = open_db_in_memory().unwrap();
    let service = AccountService::new(SqliteUserRepository::new(&conn));

    service.register(&new_user("ada@example.com")).unwrap();
    let err = service
        .register(&new_user("ADA@example.com"))
        .unwrap_err();
    assert!(matches!(err, AccountError::EmailTaken(_)));
}

#[test]
fn malformed_registration_input_fails_validation() {
    let conn = open_db_in_memory().unwrap();
    let service = AccountService::new(SqliteUserRepository::new(&conn));

    let mut input = new_user("not-an-email");
    let err = service.register(&input).unwrap_err();
    assert!(matches!(
        err,
        AccountError::Validation(UserValidationError::InvalidEmail(_))
    ));

    input.email = "ok@example.com".to_string();
    input.last_name = String::new();
    let err = service.register(&input).unwrap_err();
    assert!(matches!(
        err,
        AccountError::Validation(UserValidationError::EmptyField("last_name"))
    ));
}

#[test]
fn profile_update_applies_only_present_fields() {
    let conn = open_db_in_memory().unwrap();
    let service = AccountService::new(SqliteUserRepository::new(&conn));
    let user = service.register(&new_user("ada@example.com")).unwrap();

    let updated = service
        .update_profile(
            user.id,
            &ProfileUpdate {
                first_name: Some("Augusta".to_string()),
                last_name: None,
            },
        )
        .unwrap();
    assert_eq!(updated.first_name, "Augusta");
    assert_eq!(updated.last_name, user.last_name);

    let reloaded = service.get_profile(user.id).unwrap();
    assert_eq!(reloaded.first_name, "Augusta");
}

#[test]
fn unknown_user_surfaces_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = AccountService::new(SqliteUserRepository::new(&conn));

    let missing = Uuid::new_v4();
    assert!(matches!(
        service.get_profile(missing).unwrap_err(),
        AccountError::UserNotFound(id) if id == missing
    ));
    assert!(matches!(
        service
            .update_profile(missing, &ProfileUpdate::default())
            .unwrap_err(),
        AccountError::UserNotFound(_)
    ));
}

fn new_user(email: &str) -> NewUser {
    NewUser {
        email: email.to_string(),
        password_hash: "$2b$10$hash".to_string(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        role: None,
    }
}
