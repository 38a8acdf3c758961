//! Submission form view model.
//!
//! The form is in one of two states. While *editing*, each field validates on
//! its own once touched (blurred) and again on every later edit. A successful
//! submission clears the fields and moves to *submitted*, which shows the
//! confirmation [`Popup`]; confirming it navigates to the listing.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use schoolhouse_model::rules::{self, Field};
use schoolhouse_model::{CreatedResponse, NewSchool};

use crate::api::SchoolApi;
use crate::error::{ClientError, ClientResult};

/// Alert shown when the service gives no reason for a rejected submission.
pub const SUBMIT_FALLBACK: &str = "Failed to add school";

const SUBMIT_LABEL: &str = "Add School";
const SUBMITTING_LABEL: &str = "Submitting…";

/// A locally selected image, previewed before upload.
#[derive(Clone, PartialEq, Eq)]
pub struct ImagePreview {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl fmt::Debug for ImagePreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagePreview")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl ImagePreview {
    /// Reads `path` from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Io`] if the file cannot be read.
    pub async fn load(path: &Path) -> ClientResult<Self> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ClientError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::from_bytes(file_name, bytes))
    }

    /// Preview of in-memory content, typed from the file name.
    #[must_use]
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = mime_infer::from_path(&file_name).first_or_octet_stream().to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    /// Original file name.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Content type inferred from the file name.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// File content.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Inline `data:` URL of the image.
    #[must_use]
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.content_type, STANDARD.encode(&self.bytes))
    }
}

/// Where the form is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FormState {
    /// Collecting input.
    #[default]
    Editing,
    /// The last submission was accepted.
    Submitted,
}

/// Screen to show next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    /// Stay on the form.
    Form,
    /// The school listing.
    Listing,
}

/// Confirmation dialog.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Popup {
    /// Heading.
    pub title: &'static str,
    /// Body text.
    pub description: &'static str,
    /// Label of the confirming action.
    pub confirm_label: &'static str,
}

/// Dialog shown once a school is added.
pub const ADDED_POPUP: Popup = Popup {
    title: "School Added",
    description: "The school has been added successfully.",
    confirm_label: "Go to Schools",
};

/// The add-school form.
#[derive(Debug, Default)]
pub struct SubmissionForm {
    values: NewSchool,
    image: Option<ImagePreview>,
    touched: HashSet<Field>,
    errors: HashMap<Field, &'static str>,
    state: FormState,
    submitting: bool,
    alert: Option<String>,
    last_created: Option<CreatedResponse>,
}

impl SubmissionForm {
    /// Empty form in the editing state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> FormState {
        self.state
    }

    /// Current text values, as typed.
    #[must_use]
    pub fn values(&self) -> &NewSchool {
        &self.values
    }

    /// Selected image, if any.
    #[must_use]
    pub fn image(&self) -> Option<&ImagePreview> {
        self.image.as_ref()
    }

    /// Updates a text field. `Field::Image` is ignored, use [`SubmissionForm::select_image`].
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let Some(slot) = self.values.get_mut(field) else {
            return;
        };
        *slot = value.into();
        if self.touched.contains(&field) {
            self.validate(field);
        }
    }

    /// Selects or clears the image and validates it.
    pub fn select_image(&mut self, image: Option<ImagePreview>) {
        self.image = image;
        self.touched.insert(Field::Image);
        self.validate(Field::Image);
    }

    /// Marks `field` as touched and validates it.
    pub fn blur(&mut self, field: Field) {
        self.touched.insert(field);
        self.validate(field);
    }

    /// Inline error of `field`, if its rule currently fails.
    #[must_use]
    pub fn error(&self, field: Field) -> Option<&'static str> {
        self.errors.get(&field).copied()
    }

    /// Every current inline error in form order.
    #[must_use]
    pub fn errors(&self) -> Vec<(Field, &'static str)> {
        Field::ALL
            .iter()
            .filter_map(|field| self.error(*field).map(|message| (*field, message)))
            .collect()
    }

    /// Whether a submission is in flight.
    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Label of the submit control.
    #[must_use]
    pub fn submit_label(&self) -> &'static str {
        if self.submitting { SUBMITTING_LABEL } else { SUBMIT_LABEL }
    }

    /// Pending blocking alert.
    #[must_use]
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    /// Dismisses the alert, returning it.
    pub fn take_alert(&mut self) -> Option<String> {
        self.alert.take()
    }

    /// Confirmation dialog, shown while the form is submitted.
    #[must_use]
    pub fn popup(&self) -> Option<Popup> {
        (self.state == FormState::Submitted).then_some(ADDED_POPUP)
    }

    /// Reply to the last accepted submission.
    #[must_use]
    pub fn last_created(&self) -> Option<&CreatedResponse> {
        self.last_created.as_ref()
    }

    fn validate(&mut self, field: Field) {
        let result = match field {
            Field::Image => rules::check_image(self.image.is_some()),
            _ => rules::check(field, self.values.get(field)),
        };
        match result {
            Ok(()) => self.errors.remove(&field),
            Err(e) => self.errors.insert(field, e.message),
        };
    }

    /// Touches and validates every field. Returns the payload when all rules pass
    /// and marks the submission in flight.
    pub fn begin_submit(&mut self) -> Option<(NewSchool, ImagePreview)> {
        if self.submitting {
            return None;
        }
        for field in Field::ALL {
            self.blur(field);
        }
        if !self.errors.is_empty() {
            return None;
        }
        let image = self.image.clone()?;
        self.submitting = true;
        Some((self.values.clone(), image))
    }

    /// Applies the service reply to an in-flight submission.
    pub fn finish_submit(&mut self, result: ClientResult<CreatedResponse>) {
        self.submitting = false;
        match result {
            Ok(created) => {
                tracing::info!(id = created.id, "school added");
                self.values = NewSchool::default();
                self.image = None;
                self.touched.clear();
                self.errors.clear();
                self.alert = None;
                self.last_created = Some(created);
                self.state = FormState::Submitted;
            }
            Err(e) => {
                tracing::warn!(error = %e, "submission rejected");
                self.alert = Some(e.server_message().unwrap_or(SUBMIT_FALLBACK).to_owned());
            }
        }
    }

    /// Validates and, if every rule passes, submits through `api`.
    ///
    /// Returns `false` when validation blocked the submission.
    pub async fn submit<A: SchoolApi + ?Sized>(&mut self, api: &A) -> bool {
        let Some((school, image)) = self.begin_submit() else {
            return false;
        };
        let result = api.add_school(&school, &image).await;
        self.finish_submit(result);
        true
    }

    /// Confirms the dialog. Leaves the submitted state and routes to the listing.
    pub fn confirm(&mut self) -> Route {
        if self.state == FormState::Submitted {
            self.state = FormState::Editing;
            Route::Listing
        } else {
            Route::Form
        }
    }
}
