use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::config::AdminCredentials;
use crate::error::AuthError;
use crate::store::{AppConfig, SessionStore};

const PBKDF2_ROUNDS: u32 = 10_000;
const SALT_LEN: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    User,
}

/// Logged-in identity. Never carries a credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub salt: String,
    pub role: Role,
}

impl StoredUser {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }

    fn verify(&self, password: &str) -> bool {
        let Ok(salt) = BASE64.decode(self.salt.as_bytes()) else {
            return false;
        };
        hash_password(password, &salt) == self.password_hash
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

pub fn hash_password(password: &str, salt: &[u8]) -> String {
    let mut key = [0u8; 32];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ROUNDS, &mut key);
    BASE64.encode(key)
}

fn same_email(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Validates a registration and appends the new user. `users` is untouched on error.
pub fn register(users: &mut Vec<StoredUser>, form: &RegisterForm) -> Result<UserProfile, AuthError> {
    if form.password != form.confirm_password {
        return Err(AuthError::rejected("As senhas não conferem."));
    }
    let name = form.name.trim();
    let email = form.email.trim();
    if name.is_empty() || email.is_empty() || form.password.is_empty() {
        return Err(AuthError::rejected("Preencha nome, email e senha."));
    }
    if users.iter().any(|u| same_email(&u.email, email)) {
        return Err(AuthError::rejected("Email já cadastrado."));
    }

    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    let user = StoredUser {
        name: name.to_string(),
        email: email.to_string(),
        password_hash: hash_password(&form.password, &salt),
        salt: BASE64.encode(salt),
        role: Role::User,
    };
    let profile = user.profile();
    users.push(user);
    Ok(profile)
}

fn is_configured_admin(admin: Option<&AdminCredentials>, email: &str) -> bool {
    admin.is_some_and(|admin| same_email(&admin.email, email))
}

pub fn login(
    users: &[StoredUser],
    admin: Option<&AdminCredentials>,
    email: &str,
    password: &str,
) -> Result<UserProfile, AuthError> {
    if let Some(admin) = admin
        && same_email(&admin.email, email)
        && admin.password == password
    {
        return Ok(UserProfile {
            name: "Administrador".to_string(),
            email: admin.email.clone(),
            role: Role::Admin,
        });
    }

    users
        .iter()
        .find(|u| same_email(&u.email, email) && u.verify(password))
        .map(StoredUser::profile)
        .ok_or_else(|| AuthError::rejected("Credenciais inválidas."))
}

/// Explicit application session: credential list, branding and the current
/// user, loaded once and written back on every change.
pub struct Session {
    store: SessionStore,
    admin: Option<AdminCredentials>,
    users: Vec<StoredUser>,
    config: AppConfig,
    current_user: Option<UserProfile>,
}

impl Session {
    pub fn load(store: SessionStore, admin: Option<AdminCredentials>) -> Self {
        let users = store.load_users();
        let config = store.load_config();
        let current_user = store
            .load_session()
            .filter(|user| user.role != Role::Admin || is_configured_admin(admin.as_ref(), &user.email));
        Self {
            store,
            admin,
            users,
            config,
            current_user,
        }
    }

    pub fn current_user(&self) -> Option<&UserProfile> {
        self.current_user.as_ref()
    }

    /// Admin rights need the role and a still-configured admin with the same email.
    pub fn is_admin(&self) -> bool {
        self.current_user.as_ref().is_some_and(|u| {
            u.role == Role::Admin && is_configured_admin(self.admin.as_ref(), &u.email)
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn users(&self) -> &[StoredUser] {
        &self.users
    }

    pub fn register(&mut self, form: &RegisterForm) -> Result<UserProfile, AuthError> {
        let profile = register(&mut self.users, form)?;
        if let Err(err) = self.store.save_users(&self.users) {
            tracing::error!(error = %err, "failed to persist credential list");
            self.users.pop();
            return Err(AuthError::rejected("Falha ao salvar o cadastro."));
        }
        tracing::info!(email = %profile.email, "user registered");
        self.start(profile.clone());
        Ok(profile)
    }

    pub fn login(&mut self, email: &str, password: &str) -> Result<UserProfile, AuthError> {
        let profile = login(&self.users, self.admin.as_ref(), email, password)?;
        tracing::info!(email = %profile.email, role = ?profile.role, "login");
        self.start(profile.clone());
        Ok(profile)
    }

    pub fn logout(&mut self) {
        self.current_user = None;
        if let Err(err) = self.store.save_session(None) {
            tracing::warn!(error = %err, "failed to clear session record");
        }
    }

    pub fn save_config(&mut self, config: AppConfig) -> Result<(), AuthError> {
        if !self.is_admin() {
            return Err(AuthError::rejected("Acesso restrito ao administrador."));
        }
        if let Err(err) = self.store.save_config(&config) {
            tracing::error!(error = %err, "failed to persist app config");
            return Err(AuthError::rejected("Falha ao salvar configurações."));
        }
        self.config = config;
        Ok(())
    }

    fn start(&mut self, profile: UserProfile) {
        if let Err(err) = self.store.save_session(Some(&profile)) {
            tracing::warn!(error = %err, "failed to persist session");
        }
        self.current_user = Some(profile);
    }
}
