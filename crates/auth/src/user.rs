//! User account as returned by the backend, plus the payloads that create or
//! edit one.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use inventario_core::datetime::lenient;
use inventario_core::{Entity, Labeled, SoftDelete, UserId};

use crate::Role;

fn active_by_default() -> bool {
    true
}

/// A user account. The backend owns it; the client holds a cached copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub nombre: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub rol: Role,
    #[serde(default = "active_by_default")]
    pub activo: bool,
    #[serde(default, with = "lenient")]
    pub fecha_creacion: Option<NaiveDateTime>,
    #[serde(default, with = "lenient")]
    pub fecha_ultima_sesion: Option<NaiveDateTime>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.rol.is_admin()
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }
}

impl SoftDelete for User {
    fn is_active(&self) -> bool {
        self.activo
    }

    fn set_active(&mut self, active: bool) {
        self.activo = active;
    }
}

impl Labeled for User {
    fn label(&self) -> &str {
        &self.nombre
    }
}

/// Registration payload for `POST /auth/registro`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub nombre: String,
    pub email: String,
    pub password: String,
    #[serde(default, serialize_with = "crate::roles::serialize_known")]
    pub rol: Role,
}

impl NewUser {
    /// New account with the default `empleado` role.
    pub fn new(nombre: impl Into<String>, email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            nombre: nombre.into(),
            email: email.into(),
            password: password.into(),
            rol: Role::Empleado,
        }
    }

    pub fn with_role(mut self, rol: Role) -> Self {
        self.rol = rol;
        self
    }
}

// Keeps the password out of logs.
impl core::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NewUser")
            .field("nombre", &self.nombre)
            .field("email", &self.email)
            .field("rol", &self.rol)
            .finish_non_exhaustive()
    }
}

/// Edit payload for `PUT /usuarios/{id}`; passwords are never sent here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdate {
    pub nombre: String,
    pub email: String,
    #[serde(serialize_with = "crate::roles::serialize_known")]
    pub rol: Role,
}

impl From<&User> for UserUpdate {
    fn from(user: &User) -> Self {
        Self {
            nombre: user.nombre.clone(),
            email: user.email.clone(),
            rol: user.rol,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_backend_user_and_ignores_password_hash() {
        let json = r#"{
            "id": 3,
            "nombre": "Ana",
            "email": "ana@example.com",
            "password_hash": "$2b$12$xyz",
            "rol": "admin",
            "activo": true,
            "fecha_creacion": "01/02/2024 10:00:00",
            "fecha_ultima_sesion": null
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, UserId::new(3));
        assert!(user.is_admin());
        assert!(user.fecha_creacion.is_some());
        assert!(user.fecha_ultima_sesion.is_none());
    }

    #[test]
    fn minimal_profile_defaults_to_active() {
        let user: User = serde_json::from_str(r#"{"id":1,"nombre":"A","email":"a@b.com","rol":"empleado"}"#).unwrap();
        assert!(user.activo);
        assert!(!user.is_admin());
    }

    #[test]
    fn registration_defaults_to_employee_and_hides_password() {
        let new = NewUser::new("Luis", "luis@example.com", "hunter2");
        assert_eq!(new.rol, Role::Empleado);
        let body = serde_json::to_value(&new).unwrap();
        assert_eq!(body["rol"], "empleado");
        assert_eq!(body["password"], "hunter2");
        assert!(!format!("{new:?}").contains("hunter2"));
    }

    #[test]
    fn update_payload_carries_only_editable_fields() {
        let user: User = serde_json::from_str(r#"{"id":1,"nombre":"A","email":"a@b.com","rol":"admin"}"#).unwrap();
        let body = serde_json::to_value(UserUpdate::from(&user)).unwrap();
        let keys: Vec<&str> = body.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 3);
        assert!(keys.contains(&"nombre") && keys.contains(&"email") && keys.contains(&"rol"));
    }

    #[test]
    fn unreadable_role_is_never_written_back() {
        let user: User = serde_json::from_str(r#"{"id":2,"nombre":"B","email":"b@b.com","rol":"supervisor"}"#).unwrap();
        assert_eq!(user.rol, Role::Unknown);
        assert!(serde_json::to_value(UserUpdate::from(&user)).is_err());
        assert!(serde_json::to_value(NewUser::new("B", "b@b.com", "pw").with_role(Role::Unknown)).is_err());
        // Display output of the record itself still works.
        assert_eq!(serde_json::to_value(&user).unwrap()["rol"], "unknown");
    }
}
