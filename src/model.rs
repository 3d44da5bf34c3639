//! Record model: the user row and the typed field selector used by
//! filtering, sorting, rendering and export.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One row of user contact data as served by the remote store.
///
/// Extra keys in the JSON payload (address, company, ...) are ignored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: u64,
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
}

impl UserRecord {
    /// Read the text of one column.
    pub fn field(&self, field: UserField) -> &str {
        match field {
            UserField::Name => &self.name,
            UserField::Username => &self.username,
            UserField::Email => &self.email,
            UserField::Phone => &self.phone,
        }
    }

    /// Column values in display/export order.
    pub fn columns(&self) -> [&str; 4] {
        UserField::ALL.map(|f| self.field(f))
    }
}

/// Column selector for a [`UserRecord`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UserField {
    Name,
    Username,
    Email,
    Phone,
}

impl UserField {
    /// All fields in column order.
    pub const ALL: [UserField; 4] = [
        UserField::Name,
        UserField::Username,
        UserField::Email,
        UserField::Phone,
    ];

    /// Column header, e.g. `Name`.
    pub fn label(self) -> &'static str {
        match self {
            UserField::Name => "Name",
            UserField::Username => "Username",
            UserField::Email => "Email",
            UserField::Phone => "Phone",
        }
    }

    /// Lowercase key, e.g. `name`.
    pub fn key(self) -> &'static str {
        match self {
            UserField::Name => "name",
            UserField::Username => "username",
            UserField::Email => "email",
            UserField::Phone => "phone",
        }
    }

    /// Position of this field in [`UserField::ALL`].
    pub fn index(self) -> usize {
        match self {
            UserField::Name => 0,
            UserField::Username => 1,
            UserField::Email => 2,
            UserField::Phone => 3,
        }
    }

    /// Next field, wrapping around after `Phone`.
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Previous field, wrapping around before `Name`.
    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for UserField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for UserField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        UserField::ALL
            .into_iter()
            .find(|f| f.key() == wanted)
            .ok_or_else(|| format!("unknown field '{s}' (expected name, username, email or phone)"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_placeholder_shape() {
        let json = r#"{
            "id": 1,
            "name": "Leanne Graham",
            "username": "Bret",
            "email": "Sincere@april.biz",
            "address": { "street": "Kulas Light", "city": "Gwenborough" },
            "phone": "1-770-736-8031 x56442",
            "website": "hildegard.org"
        }"#;
        let user: UserRecord = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(user.username, "Bret");
        assert_eq!(user.field(UserField::Phone), "1-770-736-8031 x56442");
    }

    #[test]
    fn field_parsing_is_case_insensitive() {
        assert_eq!("EMAIL".parse::<UserField>(), Ok(UserField::Email));
        assert_eq!(" username ".parse::<UserField>(), Ok(UserField::Username));
        assert!("website".parse::<UserField>().is_err());
    }

    #[test]
    fn next_and_prev_wrap() {
        assert_eq!(UserField::Phone.next(), UserField::Name);
        assert_eq!(UserField::Name.prev(), UserField::Phone);
        assert_eq!(UserField::Username.next().prev(), UserField::Username);
    }
}
