use std::path::PathBuf;
use std::time::Duration;

use crate::locator::Locator;

/// Which category picker a lookup was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryLevel {
    Large,
    Middle,
}

impl std::fmt::Display for CategoryLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryLevel::Large => write!(f, "large"),
            CategoryLevel::Middle => write!(f, "middle"),
        }
    }
}

/// Failures that abort an entry run.
///
/// Tolerated conditions (absent OTP field, absent continue button, absent
/// toggles) never surface as errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EntryError {
    #[error("Element {element:?} not found using any of: {}", format_locators(.attempted))]
    ElementNotFound {
        element: String,
        attempted: Vec<Locator>,
    },

    #[error("No {level} category option named {name:?}")]
    CategoryNotFound { level: CategoryLevel, name: String },

    #[error("Expected at least {expected} {element:?} elements on the page, found {found}")]
    UnexpectedPageLayout {
        element: String,
        expected: usize,
        found: usize,
    },

    #[error("Login did not complete within {timeout:?} (last url: {url})")]
    AuthTimeout { timeout: Duration, url: String },

    #[error("Input file is empty: {}", .path.display())]
    EmptyInput { path: PathBuf },

    #[error("An entry form is already open and has not been submitted")]
    ModalAlreadyOpen,
}

fn format_locators(locators: &[Locator]) -> String {
    locators
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
