//! Per-field rules of the submission form.
//!
//! Every field validates on its own: a failing rule only reports against the
//! field it belongs to. Values are trimmed before checking and lengths count
//! characters.
use std::fmt::{self, Display, Formatter};
use std::sync::OnceLock;

use regex::Regex;

static RE_EMAIL: OnceLock<Regex> = OnceLock::new();
static RE_CONTACT: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    RE_EMAIL.get_or_init(|| {
        Regex::new(
            r"^(?:[a-zA-Z0-9_'^&/+-])+(?:\.(?:[a-zA-Z0-9_'^&/+-])+)*@(?:(?:[a-zA-Z0-9-]+\.)+[a-zA-Z]{2,})$",
        )
        .expect("Invalid regex pattern")
    })
}

fn contact_regex() -> &'static Regex {
    RE_CONTACT.get_or_init(|| Regex::new(r"^[0-9]{7,15}$").expect("Invalid regex pattern"))
}

/// A field of the submission form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    /// School name.
    Name,
    /// Contact email, sent as `email_id`.
    Email,
    /// Contact number.
    Contact,
    /// Street address.
    Address,
    /// City.
    City,
    /// State or region.
    State,
    /// Image file.
    Image,
}

impl Field {
    /// Text fields in form order.
    pub const TEXT: [Self; 6] = [
        Self::Name,
        Self::Email,
        Self::Contact,
        Self::Address,
        Self::City,
        Self::State,
    ];

    /// Every field in form order.
    pub const ALL: [Self; 7] = [
        Self::Name,
        Self::Email,
        Self::Contact,
        Self::Address,
        Self::City,
        Self::State,
        Self::Image,
    ];

    /// Multipart form key of this field.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email_id",
            Self::Contact => "contact",
            Self::Address => "address",
            Self::City => "city",
            Self::State => "state",
            Self::Image => crate::IMAGE_FIELD,
        }
    }

    /// Human label shown next to the input.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "School Name",
            Self::Email => "Email",
            Self::Contact => "Contact",
            Self::Address => "Address",
            Self::City => "City",
            Self::State => "State",
            Self::Image => "School Image",
        }
    }

    fn required_message(self) -> &'static str {
        match self {
            Self::Name => "School name is required",
            Self::Email => "Email is required",
            Self::Contact => "Contact is required",
            Self::Address => "Address is required",
            Self::City => "City is required",
            Self::State => "State is required",
            Self::Image => "Image is required",
        }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A rule violation on a single field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    /// The offending field.
    pub field: Field,
    /// Message shown inline under the field.
    pub message: &'static str,
}

impl FieldError {
    fn new(field: Field, message: &'static str) -> Self {
        Self { field, message }
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.message)
    }
}

impl std::error::Error for FieldError {}

/// Checks a text value against the rule of `field`.
///
/// For `Field::Image` use [`check_image`]; here any non-empty value passes.
pub fn check(field: Field, value: &str) -> Result<(), FieldError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(FieldError::new(field, field.required_message()));
    }
    let chars = value.chars().count();
    match field {
        Field::Name if chars < 2 => Err(FieldError::new(field, "Name must be at least 2 characters")),
        Field::Email if !email_regex().is_match(value) => Err(FieldError::new(field, "Enter a valid email")),
        Field::Contact if !contact_regex().is_match(value) => Err(FieldError::new(field, "Enter 7-15 digits")),
        Field::Address if chars < 6 => Err(FieldError::new(field, "Address must be at least 6 characters")),
        Field::City if chars < 2 => Err(FieldError::new(field, "City must be at least 2 characters")),
        Field::State if chars < 2 => Err(FieldError::new(field, "State must be at least 2 characters")),
        _ => Ok(()),
    }
}

/// Checks that an image was selected.
pub fn check_image(present: bool) -> Result<(), FieldError> {
    if present {
        Ok(())
    } else {
        Err(FieldError::new(Field::Image, Field::Image.required_message()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(field: Field, value: &str) -> Option<&'static str> {
        check(field, value).err().map(|e| e.message)
    }

    #[test]
    fn test_required_messages() {
        assert_eq!(message(Field::Name, ""), Some("School name is required"));
        assert_eq!(message(Field::Email, "   "), Some("Email is required"));
        assert_eq!(message(Field::Contact, ""), Some("Contact is required"));
        assert_eq!(message(Field::Address, ""), Some("Address is required"));
        assert_eq!(message(Field::City, ""), Some("City is required"));
        assert_eq!(message(Field::State, ""), Some("State is required"));
        assert_eq!(check_image(false).unwrap_err().message, "Image is required");
        assert!(check_image(true).is_ok());
    }

    #[test]
    fn test_min_lengths() {
        assert_eq!(message(Field::Name, "A"), Some("Name must be at least 2 characters"));
        assert_eq!(message(Field::Name, "Ab"), None);
        assert_eq!(message(Field::Address, "12 Oa"), Some("Address must be at least 6 characters"));
        assert_eq!(message(Field::Address, "12 Oak"), None);
        assert_eq!(message(Field::City, "X"), Some("City must be at least 2 characters"));
        assert_eq!(message(Field::State, "Y"), Some("State must be at least 2 characters"));
    }

    #[test]
    fn test_length_counts_chars_after_trim() {
        assert_eq!(message(Field::Name, "  é  "), Some("Name must be at least 2 characters"));
        assert_eq!(message(Field::City, "Åå"), None);
    }

    #[test]
    fn test_email_pattern() {
        for ok in ["a@b.com", "first.last@school.edu", "o'neil+admin@mail.example.org"] {
            assert_eq!(message(Field::Email, ok), None, "{ok}");
        }
        for bad in ["a@b", "@b.com", "a@@b.com", "a b@c.com", "a@b.c", "a.@b.com"] {
            assert_eq!(message(Field::Email, bad), Some("Enter a valid email"), "{bad}");
        }
    }

    #[test]
    fn test_contact_pattern() {
        assert_eq!(message(Field::Contact, "1234567"), None);
        assert_eq!(message(Field::Contact, "123456789012345"), None);
        assert_eq!(message(Field::Contact, "123456"), Some("Enter 7-15 digits"));
        assert_eq!(message(Field::Contact, "1234567890123456"), Some("Enter 7-15 digits"));
        assert_eq!(message(Field::Contact, "+1234567"), Some("Enter 7-15 digits"));
        assert_eq!(message(Field::Contact, "123 4567"), Some("Enter 7-15 digits"));
        assert_eq!(message(Field::Contact, "١٢٣٤٥٦٧"), Some("Enter 7-15 digits"));
        assert_eq!(message(Field::Contact, "１２３４５６７"), Some("Enter 7-15 digits"));
    }

    #[test]
    fn test_field_keys() {
        let keys: Vec<_> = Field::ALL.iter().map(|f| f.key()).collect();
        assert_eq!(keys, ["name", "email_id", "contact", "address", "city", "state", "image"]);
        assert_eq!(Field::Email.to_string(), "email_id");
    }
}
