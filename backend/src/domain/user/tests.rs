//! Tests for user summaries and the password-reset form.

use super::*;
use rstest::{fixture, rstest};

#[fixture]
fn account() -> UserAccount {
    UserAccount {
        id: UserId::random(),
        email: "ada@example.com".into(),
        user_name: "ada".into(),
        lockout_enabled: false,
        lockout_end: None,
        external_logins: Vec::new(),
        roles: vec!["Members".into()],
    }
}

#[rstest]
fn summary_flags_local_non_admin(account: UserAccount) {
    let summary = UserSummary::from_account(&account, &ProtectedRoles::default());
    assert!(summary.is_authorized_locally);
    assert!(!summary.is_admin);
    assert!(!summary.is_locked_out);
    assert_eq!(summary.roles, vec!["Members".to_owned()]);
}

#[rstest]
fn summary_flags_admin_and_external(mut account: UserAccount) {
    account.roles.push("Administrator".into());
    account.external_logins.push("Google".into());
    account.lockout_enabled = true;
    let summary = UserSummary::from_account(&account, &ProtectedRoles::default());
    assert!(summary.is_admin);
    assert!(!summary.is_authorized_locally);
    assert!(summary.is_locked_out);
}

#[rstest]
fn admin_role_follows_configuration(mut account: UserAccount) {
    account.roles = vec!["Administrator".into()];
    let protected = ProtectedRoles::parse("Owner,Administrator");
    assert!(!UserSummary::from_account(&account, &protected).is_admin);
}

#[rstest]
fn summaries_sort_unlocked_first_then_name(account: UserAccount) {
    let summary = |name: &str, locked: bool| {
        let mut acc = account.clone();
        acc.user_name = name.into();
        acc.lockout_enabled = locked;
        UserSummary::from_account(&acc, &ProtectedRoles::default())
    };
    let mut summaries = vec![
        summary("zoe", false),
        summary("amy", true),
        summary("bob", false),
    ];
    sort_summaries(&mut summaries);
    let names: Vec<&str> = summaries.iter().map(|s| s.user_name.as_str()).collect();
    assert_eq!(names, vec!["bob", "zoe", "amy"]);
}

fn form(password: &str, confirm: &str) -> PasswordResetForm {
    PasswordResetForm {
        code: "token".into(),
        password: password.into(),
        confirm_password: confirm.into(),
    }
}

#[rstest]
#[case("secret", "secret", vec![])]
#[case("", "", vec!["The Password field is required."])]
#[case("abc", "abc", vec!["The Password must be at least 6 characters long."])]
#[case("secret1", "secret2", vec!["The password and confirmation password do not match."])]
fn password_form_validation(
    #[case] password: &str,
    #[case] confirm: &str,
    #[case] expected: Vec<&str>,
) {
    let failures = form(password, confirm).validate();
    let messages: Vec<&str> = failures.iter().map(|f| f.message.as_str()).collect();
    assert_eq!(messages, expected);
}

#[rstest]
fn password_over_limit_fails() {
    let long = "x".repeat(PASSWORD_MAX + 1);
    let failures = form(&long, &long).validate();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].field, PasswordField::Password);
}

#[rstest]
fn missing_code_is_reported() {
    let mut reset = form("secret", "secret");
    reset.code = " ".into();
    assert_eq!(reset.validate()[0].field, PasswordField::Code);
}

#[rstest]
fn user_id_parses_uuid_text() {
    let id = UserId::random();
    assert_eq!(id.to_string().parse::<UserId>().expect("parse"), id);
}
