use thiserror::Error;

/// Rejections raised before a payload is sent to the backend.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ValidationError {
    #[error("Amount must be positive")]
    NonPositiveAmount,
    #[error("Description is required")]
    MissingDescription,
    #[error("Description too long (at most {max} characters)")]
    DescriptionTooLong {
        max: usize
    },
    #[error("Please select a category")]
    MissingCategory,
    #[error("Date cannot be in the future")]
    FutureDate,
    #[error("Name is required")]
    MissingName,
    #[error("Email is required")]
    MissingEmail,
    #[error("Email is invalid")]
    InvalidEmail,
    #[error("Password is required")]
    MissingPassword,
    #[error("Password must be at least {min} characters")]
    PasswordTooShort {
        min: usize
    },
    #[error("Password must contain at least one uppercase letter, one lowercase letter, and one number")]
    WeakPassword
}
