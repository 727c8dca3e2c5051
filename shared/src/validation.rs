//! Input checks that run before any classifier call, on both the client and
//! the server.

use std::fmt;

use derive_more::Display;

use crate::form_fields;
use crate::report::ContactDetails;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ContactField {
    #[display(fmt = "Name")]
    Name,
    #[display(fmt = "Location")]
    Location,
    #[display(fmt = "Phone number")]
    Phone,
    #[display(fmt = "Email")]
    Email,
}

impl ContactField {
    pub fn from_form_name(name: &str) -> Option<Self> {
        match name {
            form_fields::NAME => Some(Self::Name),
            form_fields::LOCATION => Some(Self::Location),
            form_fields::PHONE => Some(Self::Phone),
            form_fields::EMAIL => Some(Self::Email),
            _ => None,
        }
    }

    pub fn form_name(self) -> &'static str {
        match self {
            Self::Name => form_fields::NAME,
            Self::Location => form_fields::LOCATION,
            Self::Phone => form_fields::PHONE,
            Self::Email => form_fields::EMAIL,
        }
    }

    pub fn is_required(self) -> bool {
        !matches!(self, Self::Email)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingImage,
    MissingField(ContactField),
    UnsupportedType(String),
    FileTooLarge { size: usize, max: usize },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingImage => write!(f, "Please upload an image of your crop."),
            Self::MissingField(field) => write!(f, "{} is required.", field),
            Self::UnsupportedType(mime) if mime.is_empty() => {
                write!(f, "Invalid file type. Please upload an image file.")
            }
            Self::UnsupportedType(mime) => {
                write!(f, "Invalid file type ({}). Please upload an image file.", mime)
            }
            Self::FileTooLarge { size, max } => write!(
                f,
                "Image is too large ({}). The maximum size is {}.",
                format_megabytes(*size),
                format_megabytes(*max)
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

pub fn format_megabytes(bytes: usize) -> String {
    format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_bytes: usize,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl UploadLimits {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    pub fn check_type(&self, mime_type: &str) -> Result<(), ValidationError> {
        if mime_type.trim().to_ascii_lowercase().starts_with("image/") {
            Ok(())
        } else {
            Err(ValidationError::UnsupportedType(mime_type.to_string()))
        }
    }

    pub fn check_size(&self, size: usize) -> Result<(), ValidationError> {
        if size > self.max_bytes {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_bytes,
            });
        }
        Ok(())
    }

    /// Index of the first image in a picked or dropped selection. A
    /// selection without images is rejected with the first file's type.
    pub fn select_image<'a, I>(&self, mime_types: I) -> Result<usize, ValidationError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut rejected = None;
        for (index, mime_type) in mime_types.into_iter().enumerate() {
            match self.check_type(mime_type) {
                Ok(()) => return Ok(index),
                Err(e) => {
                    rejected.get_or_insert(e);
                }
            }
        }
        Err(rejected.unwrap_or(ValidationError::MissingImage))
    }

    pub fn check(&self, mime_type: &str, size: usize) -> Result<(), ValidationError> {
        self.check_type(mime_type)?;
        self.check_size(size)
    }
}

impl ContactDetails {
    pub fn field(&self, field: ContactField) -> &str {
        match field {
            ContactField::Name => &self.name,
            ContactField::Location => &self.location,
            ContactField::Phone => &self.phone,
            ContactField::Email => self.email.as_deref().unwrap_or_default(),
        }
    }

    pub fn set_field(&mut self, field: ContactField, value: String) {
        match field {
            ContactField::Name => self.name = value,
            ContactField::Location => self.location = value,
            ContactField::Phone => self.phone = value,
            ContactField::Email => self.email = Some(value),
        }
    }

    /// Fails on the first required field that is blank.
    pub fn validate(&self) -> Result<(), ValidationError> {
        [ContactField::Name, ContactField::Location, ContactField::Phone]
            .into_iter()
            .find(|field| self.field(*field).trim().is_empty())
            .map_or(Ok(()), |field| Err(ValidationError::MissingField(field)))
    }
}
