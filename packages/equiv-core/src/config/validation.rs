//! Configuration validation

use tracing::debug;

use super::error::ConfigResult;

/// A configuration section that can reject itself
pub trait Validatable {
    fn validate(&self) -> ConfigResult<()>;

    /// Section name used in logs
    fn config_name(&self) -> &'static str {
        "Config"
    }
}

/// Validate sections in order, stopping at the first invalid one
pub fn validate_sections(sections: &[&dyn Validatable]) -> ConfigResult<()> {
    for section in sections {
        if let Err(e) = section.validate() {
            debug!(section = section.config_name(), error = %e, "Invalid configuration section");
            return Err(e);
        }
    }
    Ok(())
}
