/// Repository pattern implementations
///
/// Each repository is a focused trait plus a PostgreSQL implementation that
/// receives a connection provider, so handlers and the trigger job depend on
/// contracts rather than on Diesel. All Diesel work runs inside
/// `spawn_blocking` to keep the async runtime free.

pub mod chat_repository;
pub mod contact_repository;
pub mod stake_repository;
pub mod task_repository;
pub mod transaction_repository;
pub mod user_repository;

pub use chat_repository::{ChatRepository, ChatRepositoryImpl};
pub use contact_repository::{ContactRepository, ContactRepositoryImpl};
pub use stake_repository::{StakeRepository, StakeRepositoryImpl};
pub use task_repository::{TaskRepository, TaskRepositoryImpl};
pub use transaction_repository::{TransactionRepository, TransactionRepositoryImpl};
pub use user_repository::{UserRepository, UserRepositoryImpl};
