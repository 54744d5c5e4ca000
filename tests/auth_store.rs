use std::fs;

use betmind_terminal::auth::{RegisterForm, Role, Session};
use betmind_terminal::config::AdminCredentials;
use betmind_terminal::store::{AppConfig, SessionStore};

fn form(name: &str, email: &str, password: &str, confirm: &str) -> RegisterForm {
    RegisterForm {
        name: name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        confirm_password: confirm.to_string(),
    }
}

fn admin() -> AdminCredentials {
    AdminCredentials {
        email: "admin@betmind.local".to_string(),
        password: "troque-me".to_string(),
    }
}

#[test]
fn registration_persists_hashed_credentials() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SessionStore::new(Some(dir.path().to_path_buf()));
    let mut session = Session::load(store, None);

    let profile = session
        .register(&form("Ana", "ana@x.com", "segredo1", "segredo1"))
        .expect("register");
    assert_eq!(profile.role, Role::User);
    assert_eq!(session.current_user(), Some(&profile));

    let users = fs::read_to_string(dir.path().join("users.json")).expect("users.json");
    assert!(users.contains("ana@x.com"));
    assert!(!users.contains("segredo1"));

    let record = fs::read_to_string(dir.path().join("session.json")).expect("session.json");
    assert!(record.contains("ana@x.com"));
    assert!(!record.contains("segredo1"));
    assert!(!record.contains("password"));
}

#[test]
fn duplicate_email_leaves_users_file_unchanged() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut session = Session::load(SessionStore::new(Some(dir.path().to_path_buf())), None);
    session
        .register(&form("Ana", "ana@x.com", "pw1", "pw1"))
        .expect("first");
    let before = fs::read(dir.path().join("users.json")).expect("users.json");

    let err = session
        .register(&form("Outra Ana", "ANA@x.com", "pw2", "pw2"))
        .unwrap_err();
    assert_eq!(err.message(), "Email já cadastrado.");
    assert_eq!(session.users().len(), 1);
    let after = fs::read(dir.path().join("users.json")).expect("users.json");
    assert_eq!(before, after);
}

#[test]
fn password_mismatch_writes_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut session = Session::load(SessionStore::new(Some(dir.path().to_path_buf())), None);
    let err = session
        .register(&form("Ana", "ana@x.com", "pw1", "pw2"))
        .unwrap_err();
    assert_eq!(err.message(), "As senhas não conferem.");
    assert!(!dir.path().join("users.json").exists());
    assert!(session.current_user().is_none());
}

#[test]
fn login_survives_restart_and_rejects_wrong_password() {
    let dir = tempfile::tempdir().expect("tempdir");
    {
        let mut session = Session::load(SessionStore::new(Some(dir.path().to_path_buf())), None);
        session
            .register(&form("Ana", "ana@x.com", "pw1", "pw1"))
            .expect("register");
        session.logout();
        assert!(!dir.path().join("session.json").exists());
    }

    let mut session = Session::load(SessionStore::new(Some(dir.path().to_path_buf())), None);
    assert!(session.current_user().is_none());
    let err = session.login("ana@x.com", "errada").unwrap_err();
    assert_eq!(err.message(), "Credenciais inválidas.");
    assert!(session.current_user().is_none());

    session.login("ana@x.com", "pw1").expect("login");
    let restored = Session::load(SessionStore::new(Some(dir.path().to_path_buf())), None);
    assert_eq!(
        restored.current_user().map(|u| u.email.as_str()),
        Some("ana@x.com")
    );
}

#[test]
fn admin_config_round_trips() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut session = Session::load(
        SessionStore::new(Some(dir.path().to_path_buf())),
        Some(admin()),
    );
    let profile = session
        .login("admin@betmind.local", "troque-me")
        .expect("admin login");
    assert_eq!(profile.role, Role::Admin);
    assert!(session.is_admin());

    let config = AppConfig {
        logo_url: "https://cdn/logo.png".to_string(),
        login_bg_url: String::new(),
        app_bg_url: "https://cdn/bg.jpg".to_string(),
    };
    session.save_config(config.clone()).expect("save");

    let reloaded = Session::load(SessionStore::new(Some(dir.path().to_path_buf())), None);
    assert_eq!(reloaded.config(), &config);
}

#[test]
fn user_cannot_save_config() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut session = Session::load(
        SessionStore::new(Some(dir.path().to_path_buf())),
        Some(admin()),
    );
    session
        .register(&form("Ana", "ana@x.com", "pw1", "pw1"))
        .expect("register");
    let err = session
        .save_config(AppConfig {
            logo_url: "https://evil".to_string(),
            ..AppConfig::default()
        })
        .unwrap_err();
    assert_eq!(err.message(), "Acesso restrito ao administrador.");
    assert!(!dir.path().join("config.json").exists());
}
