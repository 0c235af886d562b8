//! Logical elements of the host's login and manual-entry pages.
//!
//! Each function returns the fixed fallback list for one element. Category
//! options are the only elements addressed by row data.

use crate::error::CategoryLevel;
use crate::locator::{Locator, LocatorSpec};

/// Class shared by every "new entry" button on the household-book page.
pub const NEW_ENTRY_BUTTON_CLASS: &str = "cf-new-btn";

/// Sub-account option meaning "none".
pub const NO_SUB_ACCOUNT: &str = "0";

pub fn email_input() -> LocatorSpec {
    LocatorSpec::single("email input", Locator::css("input[type='email']"))
}

pub fn password_input() -> LocatorSpec {
    LocatorSpec::single("password input", Locator::css("input[type='password']"))
}

pub fn otp_input() -> LocatorSpec {
    LocatorSpec::single("one-time passcode input", Locator::css("input[name*='otp']"))
}

pub fn new_entry_button() -> LocatorSpec {
    LocatorSpec::single(
        "new entry button",
        Locator::class_name(NEW_ENTRY_BUTTON_CLASS),
    )
}

/// "Continue entering" button shown in the modal after a save.
pub fn continue_button() -> LocatorSpec {
    LocatorSpec::single("continue button", Locator::id("confirmation-button"))
}

pub fn entry_modal() -> LocatorSpec {
    LocatorSpec::new(
        "entry modal",
        [
            Locator::id("form-user-asset-act"),
            Locator::css("form#form-user-asset-act"),
            Locator::id("updated-at"),
        ],
    )
}

pub fn date_field() -> LocatorSpec {
    LocatorSpec::single("date field", Locator::id("updated-at"))
}

pub fn amount_field() -> LocatorSpec {
    LocatorSpec::single("amount field", Locator::id("appendedPrependedInput"))
}

pub fn income_toggle() -> LocatorSpec {
    LocatorSpec::single("income toggle", Locator::class_name("plus-payment"))
}

pub fn expense_toggle() -> LocatorSpec {
    LocatorSpec::single("expense toggle", Locator::class_name("minus-payment"))
}

pub fn sub_account_select() -> LocatorSpec {
    LocatorSpec::single(
        "sub-account select",
        Locator::id("user_asset_act_sub_account_id_hash"),
    )
}

pub fn category_picker(level: CategoryLevel) -> LocatorSpec {
    match level {
        CategoryLevel::Large => LocatorSpec::single(
            "large category picker",
            Locator::id("js-large-category-selected"),
        ),
        CategoryLevel::Middle => LocatorSpec::single(
            "middle category picker",
            Locator::id("js-middle-category-selected"),
        ),
    }
}

pub fn category_option(level: CategoryLevel, name: &str) -> LocatorSpec {
    LocatorSpec::single(
        format!("{level} category option {name:?}"),
        Locator::link_text(name),
    )
}

pub fn content_field() -> LocatorSpec {
    LocatorSpec::single("content field", Locator::id("js-content-field"))
}

pub fn submit_button() -> LocatorSpec {
    LocatorSpec::single("submit button", Locator::id("submit-button"))
}
