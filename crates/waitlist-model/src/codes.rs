use serde::{Deserialize, Serialize};

/// Registry default code for a deceased donor.
pub const DEFAULT_DECEASED_DONOR_CODE: &str = "C";
/// Registry default code for a living donor.
pub const DEFAULT_LIVING_DONOR_CODE: &str = "L";

/// Donor type codes that mark a transplant outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DonorCodes {
    pub deceased: String,
    pub living: String,
}

impl Default for DonorCodes {
    fn default() -> Self {
        Self {
            deceased: DEFAULT_DECEASED_DONOR_CODE.to_string(),
            living: DEFAULT_LIVING_DONOR_CODE.to_string(),
        }
    }
}

impl DonorCodes {
    pub fn is_deceased(&self, donor_type: &str) -> bool {
        donor_type.trim().eq_ignore_ascii_case(self.deceased.trim())
    }

    pub fn is_living(&self, donor_type: &str) -> bool {
        donor_type.trim().eq_ignore_ascii_case(self.living.trim())
    }
}
