//! Types that represent the core data model, such as `Task` and `Transaction`.
mod archetype;
mod currency;
mod groups;
pub mod money;
mod record;
mod task;

pub use archetype::{Archetype, TypeDesc, TRANSFER_BETWEEN_MY_ACCOUNTS};
pub use currency::{cross_rate, round2, Currency, UnsupportedCurrency};
pub use groups::CategoryGroups;
pub use record::{write_canonical, CanonicalRecord, CANONICAL_HEADER};
pub use task::{Operation, PoolAccount, Task, TaskContext, Transaction};
