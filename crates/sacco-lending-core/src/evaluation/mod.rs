//! Loan application evaluation: risk scoring, eligibility gates, and
//! savings-adjusted amount and rate recommendations.

pub mod criteria;
pub mod eligibility;
pub mod engine;
pub mod policy;
pub mod pricing;
pub mod risk;

pub use criteria::{EmploymentStatus, LoanEvaluationCriteria, LoanType};
pub use engine::{evaluate_loan_application, LoanEvaluationResult, SavingsImpact};
pub use policy::{LendingPolicy, ProductRule};
