pub mod chat;
pub mod contact;
pub mod scheduled_task;
pub mod stake_account;
pub mod transaction;
pub mod user;

pub use chat::{Chat, Message, NewChat, NewMessage};
pub use contact::{Contact, NewContact};
pub use scheduled_task::{NewScheduledTask, PendingTask, ScheduledTask};
pub use stake_account::{NewStakeAccount, StakeAccount};
pub use transaction::{NewTransaction, Transaction};
pub use user::{NewUser, User};
