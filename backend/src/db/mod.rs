pub mod events;
#[cfg(test)]
pub mod memory;
pub mod pool;
pub mod users;

pub use events::{EventLog, PgEventLog};
pub use pool::create_pool;
pub use users::{PgUserDirectory, UserDirectory};
