//! Shared data model of the schoolhouse directory.
//!
//! This crate holds what both the HTTP service and the client agree on:
//! - [`SchoolRecord`] and [`NewSchool`], the persisted row and a submission
//! - the JSON envelopes exchanged over `/api/addSchool` and `/api/getSchools`
//! - the per-field [`rules`] used to validate a submission
//! - the [`filter`] used by the listing to search schools by name
#![cfg_attr(docsrs, feature(doc_cfg))]

mod envelope;
pub mod filter;
mod record;
pub mod rules;

pub use envelope::{CreatedResponse, ErrorResponse, ListResponse};
pub use filter::filter_by_name;
pub use record::{NewSchool, SchoolRecord};
pub use rules::{Field, FieldError};

/// Form field carrying the uploaded image.
pub const IMAGE_FIELD: &str = "image";
