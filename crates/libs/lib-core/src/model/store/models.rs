use sqlx::FromRow;

/// User entity representing a complete user record from the database.
///
/// Not `Serialize`: the password hash must never reach a response body.
#[derive(Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub username: String,
    #[sqlx(rename = "password")]
    pub password_hash: String,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Data structure for creating a new user.
///
/// Password should be hashed before creating.
#[derive(Debug, Clone)]
pub struct UserForCreate {
    pub name: String,
    pub username: String,
    pub password_hash: String,
}

impl UserForCreate {
    /// Create a new `UserForCreate` instance.
    pub fn new(name: String, username: String, password_hash: String) -> Self {
        Self {
            name,
            username,
            password_hash,
        }
    }
}
