use crate::database::json_file::{FileOptions, JsonFile};
use crate::error::app_error::AppError;
use crate::models::user::{SignupRequest, User, UserResponse, UserSummary};
use crate::util::make_unique_id;
use argon2::Argon2;
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use std::path::Path;
use std::sync::LazyLock;
use tokio::sync::RwLock;
use tracing::info;

pub const USER_FILE_NAME: &str = "user.json";

/// A real Argon2 hash generated once at startup, used as a timing decoy
/// so that logins for unknown usernames cost the same as real ones.
static DUMMY_HASH: LazyLock<Option<String>> = LazyLock::new(|| hash_password("dummy-never-matches").ok());

pub struct UserStore {
    file: JsonFile,
    users: RwLock<Vec<User>>,
}

impl UserStore {
    /// Loads `user.json`. Entries whose password is not a PHC hash string are
    /// legacy plaintext; they are hashed and the file is rewritten.
    pub async fn load(data_dir: impl AsRef<Path>, options: FileOptions) -> Result<Self, AppError> {
        let file = JsonFile::new(data_dir, USER_FILE_NAME, options);
        let mut users = file.load::<User>().await?;

        let mut upgraded = 0;
        for user in users.iter_mut().filter(|user| PasswordHash::new(&user.password).is_err()) {
            user.password = hash_password(&user.password)?;
            upgraded += 1;
        }
        if upgraded > 0 {
            file.persist(&users).await?;
            info!(upgraded, "hashed legacy plaintext passwords");
        }

        Ok(Self {
            file,
            users: RwLock::new(users),
        })
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn list(&self) -> Vec<UserSummary> {
        self.users.read().await.iter().map(UserSummary::from).collect()
    }

    pub async fn get_by_id(&self, id: &str) -> Result<UserResponse, AppError> {
        let users = self.users.read().await;
        users
            .iter()
            .find(|user| user.id == id)
            .map(UserResponse::from)
            .ok_or_else(|| AppError::not_found(format!("User {}", id)))
    }

    pub async fn find_by_username(&self, username: &str) -> Option<User> {
        self.users.read().await.iter().find(|user| user.username == username).cloned()
    }

    pub async fn add(&self, request: &SignupRequest) -> Result<UserResponse, AppError> {
        let password = hash_password(&request.password)?;

        let mut users = self.users.write().await;
        if users.iter().any(|user| user.username == request.username) {
            return Err(AppError::UserAlreadyExists(request.username.clone()));
        }

        let user = User {
            id: make_unique_id(|candidate| users.iter().any(|user| user.id == candidate)),
            username: request.username.clone(),
            password,
            fullname: request.fullname.clone(),
            is_admin: false,
        };

        let mut next = users.clone();
        next.push(user.clone());

        self.file.persist(&next).await?;
        *users = next;

        info!(user_id = %user.id, username = %user.username, "user created");
        Ok(UserResponse::from(&user))
    }

    pub async fn remove(&self, id: &str) -> Result<(), AppError> {
        let mut users = self.users.write().await;
        let idx = users
            .iter()
            .position(|user| user.id == id)
            .ok_or_else(|| AppError::not_found(format!("User {}", id)))?;

        let mut next = users.clone();
        next.remove(idx);

        self.file.persist(&next).await?;
        *users = next;

        info!(user_id = %id, "user removed");
        Ok(())
    }
}

pub(crate) fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

pub(crate) fn verify_password(user: &User, password: &str) -> Result<(), AppError> {
    let stored = PasswordHash::new(&user.password).map_err(|e| AppError::password_hash("Failed to parse stored password hash", e))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &stored)
        .map_err(|_| AppError::InvalidCredentials)
}

/// Throwaway verification to equalize response timing for unknown users.
pub(crate) fn dummy_verify(password: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref()
        && let Ok(hash) = PasswordHash::new(hash)
    {
        let _ = Argon2::default().verify_password(password.as_bytes(), &hash);
    }
}
