//! Employee Profile
//!
//! Read-only view of the HR master record for a directory login name.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeProfile {
    pub employee_id: String,
    pub mobile_number: String,
}
