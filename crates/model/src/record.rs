use serde::{Deserialize, Serialize};

use crate::rules::{self, Field, FieldError};

/// One row of the `schools` table.
///
/// Field names follow the table columns, so `email_id` stays `email_id` on the wire.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SchoolRecord {
    /// Identifier assigned by storage on insert.
    pub id: i64,
    /// School name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// State or region.
    pub state: String,
    /// Contact phone number, digits only.
    pub contact: String,
    /// Public URL or path of the stored image.
    pub image: String,
    /// Contact email.
    pub email_id: String,
}

/// The text part of a submission, before storage assigns `id` and `image`.
#[derive(Serialize, Deserialize, Clone, Default, Debug, PartialEq, Eq)]
pub struct NewSchool {
    /// School name.
    pub name: String,
    /// Contact email.
    pub email_id: String,
    /// Contact phone number.
    pub contact: String,
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// State or region.
    pub state: String,
}

impl NewSchool {
    /// Returns a copy with every field trimmed.
    #[must_use]
    pub fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_owned(),
            email_id: self.email_id.trim().to_owned(),
            contact: self.contact.trim().to_owned(),
            address: self.address.trim().to_owned(),
            city: self.city.trim().to_owned(),
            state: self.state.trim().to_owned(),
        }
    }

    /// Value of a text field. `Field::Image` has no text value and yields `""`.
    #[must_use]
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email_id,
            Field::Contact => &self.contact,
            Field::Address => &self.address,
            Field::City => &self.city,
            Field::State => &self.state,
            Field::Image => "",
        }
    }

    /// Mutable access to a text field, `None` for `Field::Image`.
    pub fn get_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::Name => Some(&mut self.name),
            Field::Email => Some(&mut self.email_id),
            Field::Contact => Some(&mut self.contact),
            Field::Address => Some(&mut self.address),
            Field::City => Some(&mut self.city),
            Field::State => Some(&mut self.state),
            Field::Image => None,
        }
    }

    /// Checks every text field and returns the first failure in form order.
    pub fn validate(&self) -> Result<(), FieldError> {
        Field::TEXT
            .iter()
            .try_for_each(|field| rules::check(*field, self.get(*field)))
    }

    /// Attaches storage-assigned values, producing the persisted record.
    #[must_use]
    pub fn into_record(self, id: i64, image: impl Into<String>) -> SchoolRecord {
        SchoolRecord {
            id,
            name: self.name,
            address: self.address,
            city: self.city,
            state: self.state,
            contact: self.contact,
            image: image.into(),
            email_id: self.email_id,
        }
    }
}
