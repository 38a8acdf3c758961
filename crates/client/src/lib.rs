//! Client of the schoolhouse directory.
//!
//! [`api::ApiClient`] talks to the service. The views are plain state machines
//! driven by the caller:
//! - [`form::SubmissionForm`] validates fields as they are touched, submits
//!   them with the selected image and confirms the result;
//! - [`listing::ListingView`] fetches the schools once and filters them by
//!   name locally.
//!
//! [`render`] turns both into text and [`cli`] wires them to a command line.
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod api;
pub mod cli;
mod error;
pub mod form;
pub mod listing;
pub mod render;

pub use api::{ApiClient, SchoolApi};
pub use error::{ClientError, ClientResult};
