use core::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

/// Role of a user account.
///
/// The backend stores the role as a lowercase string. Anything it may add
/// later deserializes to [`Role::Unknown`], which gets no more than employee
/// rights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Empleado,
    #[serde(other)]
    Unknown,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Empleado => "empleado",
            Role::Unknown => "unknown",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// `serialize_with` for payloads written back to the backend: a role the
/// client could not read is refused instead of being sent as `"unknown"`.
pub(crate) fn serialize_known<S: Serializer>(role: &Role, serializer: S) -> Result<S::Ok, S::Error> {
    match role {
        Role::Unknown => Err(serde::ser::Error::custom(
            "unrecognized role; choose admin or empleado before saving",
        )),
        known => known.serialize(serializer),
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "empleado" => Ok(Role::Empleado),
            other => Err(format!("unknown role '{other}' (expected admin or empleado)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_wire_roles_are_tolerated() {
        let role: Role = serde_json::from_str(r#""supervisor""#).unwrap();
        assert_eq!(role, Role::Unknown);
        assert!(!role.is_admin());
    }

    #[test]
    fn parses_cli_input_case_insensitively() {
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("empleado".parse::<Role>().unwrap(), Role::Empleado);
        assert!("root".parse::<Role>().is_err());
    }
}
