use ::csv::{Terminator, WriterBuilder};

use crate::error::ExportError;
use crate::model::{UserField, UserRecord};

/// First line of every CSV export.
pub const CSV_HEADER: &str = "Name,Username,Email,Phone";

/// Render `users` as CSV: the header line, then one line per record in
/// Name, Username, Email, Phone order, joined by `\n` with no trailing newline.
///
/// Values containing a comma, quote or line break are quoted (RFC 4180);
/// anything else is written verbatim.
pub fn export_to_csv(users: &[UserRecord]) -> Result<String, ExportError> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(UserField::ALL.map(UserField::label))?;
    for user in users {
        writer.write_record(user.columns())?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))?;
    let mut text = String::from_utf8(bytes)?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str, username: &str, email: &str, phone: &str) -> UserRecord {
        UserRecord {
            id: 0,
            name: name.into(),
            username: username.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }

    #[test]
    fn empty_set_is_header_only() {
        assert_eq!(export_to_csv(&[]).unwrap(), CSV_HEADER);
    }

    #[test]
    fn one_line_per_record_in_column_order() {
        let users = vec![
            user("Bob", "b1", "b@x.com", "111"),
            user("Amy", "a1", "a@x.com", "222"),
        ];
        let text = export_to_csv(&users).unwrap();
        let lines: Vec<&str> = text.split('\n').collect();
        assert_eq!(lines, vec![CSV_HEADER, "Bob,b1,b@x.com,111", "Amy,a1,a@x.com,222"]);
    }

    #[test]
    fn embedded_delimiters_are_quoted() {
        let users = vec![user("Doe, Jane", "jd", "j@x.com", "1 \"ext\" 2")];
        let text = export_to_csv(&users).unwrap();
        assert_eq!(
            text,
            format!("{CSV_HEADER}\n\"Doe, Jane\",jd,j@x.com,\"1 \"\"ext\"\" 2\"")
        );
    }
}
