use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Manager,
    Staff,
    Superuser,
    Customer,
}

impl Role {
    pub fn parse(name: &str) -> Option<Role> {
        match name.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "manager" => Some(Role::Manager),
            "staff" => Some(Role::Staff),
            "superuser" => Some(Role::Superuser),
            "customer" => Some(Role::Customer),
            _ => None,
        }
    }

    pub fn is_elevated(&self) -> bool {
        !matches!(self, Role::Customer)
    }
}

/// Authenticated user acting on a payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: i64,
    pub email: String,
    /// Customer record this login belongs to, if any.
    pub customer_id: Option<i64>,
    pub roles: Vec<Role>,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl Caller {
    pub fn is_privileged(&self) -> bool {
        self.is_staff || self.is_superuser || self.roles.iter().any(Role::is_elevated)
    }
}
