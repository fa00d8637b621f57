//! Admin sign-in check
//!
//! The dashboard has a single operator account whose credentials are fixed.

use tracing::{info, warn};

use crate::error::{Error, Result};

pub const ADMIN_EMAIL: &str = "admin@cleaningservice.com";
pub const ADMIN_PASSWORD: &str = "admin123";

/// Accept exactly the operator credentials
pub fn check_credentials(email: &str, password: &str) -> Result<()> {
    if email == ADMIN_EMAIL && password == ADMIN_PASSWORD {
        info!("Admin login accepted");
        return Ok(());
    }

    warn!(email, "Admin login rejected");
    Err(Error::InvalidCredentials(format!(
        "Invalid credentials. Use {} / {}",
        ADMIN_EMAIL, ADMIN_PASSWORD
    )))
}
