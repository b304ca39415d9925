/// Business logic services
/// Following Single Responsibility Principle
pub mod balance;

// Re-export for convenience
pub use balance::{BalanceService, BalanceServiceTrait, FetchStrategy};
