pub mod amortization;
pub mod applicant;
pub mod evaluation;
pub mod policy;
