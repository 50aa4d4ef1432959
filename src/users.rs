use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[strum(serialize = "Admin")]
    Admin,
    #[strum(serialize = "Teacher")]
    Teacher,
    #[strum(serialize = "Student")]
    Student,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
}

impl User {
    pub fn new(id: &str, email: &str, full_name: &str, role: Role) -> Self {
        Self {
            id: id.to_string(),
            email: email.to_string(),
            full_name: full_name.to_string(),
            role,
        }
    }
}

/// Lookup of known users
pub trait UserDirectory {
    fn by_email(&self, email: &str) -> Option<User>;
    fn by_id(&self, id: &str) -> Option<User>;
    /// Used when the configured email is unknown
    fn fallback(&self) -> User;
}

#[derive(Debug, Clone)]
pub struct InMemoryDirectory {
    users: Vec<User>,
}

impl InMemoryDirectory {
    pub fn new(users: Vec<User>) -> Self {
        Self { users }
    }
}

impl Default for InMemoryDirectory {
    fn default() -> Self {
        Self::new(vec![
            User::new("1", "admin@neuropeak.com", "Joseph Mwamba", Role::Admin),
            User::new("2", "teacher@neuropeak.com", "Taizya Simunza", Role::Teacher),
            User::new("3", "student@neuropeak.com", "Narco", Role::Student),
        ])
    }
}

impl UserDirectory for InMemoryDirectory {
    fn by_email(&self, email: &str) -> Option<User> {
        self.users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email.trim()))
            .cloned()
    }

    fn by_id(&self, id: &str) -> Option<User> {
        self.users.iter().find(|u| u.id == id).cloned()
    }

    fn fallback(&self) -> User {
        self.users
            .iter()
            .find(|u| u.role == Role::Student)
            .cloned()
            .unwrap_or_else(|| User::new("0", "guest@localhost", "Guest", Role::Student))
    }
}

/// The user the app is acting for. Passed explicitly to whatever needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    pub user: User,
}

impl Viewer {
    pub fn resolve(directory: &dyn UserDirectory, email: Option<&str>) -> Self {
        let user = match email.and_then(|e| directory.by_email(e)) {
            Some(user) => user,
            None => {
                if let Some(email) = email {
                    tracing::warn!(email, "unknown user, falling back to default student");
                }
                directory.fallback()
            }
        };
        Self { user }
    }

    pub fn id(&self) -> &str {
        &self.user.id
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn can_author_quizzes(&self) -> bool {
        matches!(self.user.role, Role::Teacher | Role::Admin)
    }

    pub fn is_admin(&self) -> bool {
        self.user.role == Role::Admin
    }
}
