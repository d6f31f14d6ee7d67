//! Plan expressions, their compilation and the execution-plan cache.

mod builder;
mod cache;
mod compile;
mod expr;

pub use builder::PlanBuilder;
pub use cache::ExecutionPlanCache;
pub use compile::{CompiledPlan, compile};
pub use expr::{AssignSource, ConstructExpr, ErrorContext, MemberAssign, PlanExpr};

pub(crate) use cache::build_expression;

#[cfg(test)]
#[path = "../../tests/plan_tests.rs"]
mod tests;
