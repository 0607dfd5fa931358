pub mod advance;
pub mod attendance;
pub mod employee;
pub mod payroll;
pub mod role;

/// Opaque organization partition key.
pub type OrgId = u64;
