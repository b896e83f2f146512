//! Demo access gating for patients and clinicians.

use thiserror::Error;

const IC_NUMBER_LEN: usize = 12;

const DOCTOR_USERNAMES: [&str; 3] = ["dr.lim", "dr.wong", "dr.ahmad"];
const DEMO_PASSWORD: &str = "demo123";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a valid 12-digit IC number")]
    InvalidIcNumber,

    #[error("Please provide consent to proceed")]
    ConsentRequired,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Message cannot be empty")]
    EmptyMessage,
}

pub fn validate_ic_number(ic_number: &str) -> Result<(), ValidationError> {
    if ic_number.len() == IC_NUMBER_LEN && ic_number.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidIcNumber)
    }
}

/// Checks a patient login in the order the form reports problems: IC
/// format first, then consent.
pub fn validate_patient_login(ic_number: &str, consent: bool) -> Result<(), ValidationError> {
    validate_ic_number(ic_number)?;
    if !consent {
        return Err(ValidationError::ConsentRequired);
    }
    Ok(())
}

pub fn verify_doctor(username: &str, password: &str) -> Result<(), ValidationError> {
    if DOCTOR_USERNAMES.contains(&username) && password == DEMO_PASSWORD {
        Ok(())
    } else {
        Err(ValidationError::InvalidCredentials)
    }
}

/// `"dr.lim"` -> `"Dr.Lim"`.
pub fn display_name(username: &str) -> String {
    let mut name = String::with_capacity(username.len());
    let mut at_word_start = true;
    for c in username.chars() {
        if at_word_start {
            name.extend(c.to_uppercase());
        } else {
            name.extend(c.to_lowercase());
        }
        at_word_start = !c.is_alphabetic();
    }
    name
}
