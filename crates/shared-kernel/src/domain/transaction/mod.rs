mod connection;
mod connection_provider;
mod transaction_context;
mod transaction_manager;
mod unit_of_work;


pub use connection::{Connection, ConnectionExt};
pub use connection_provider::ConnectionProvider;
pub use transaction_context::TransactionContext;
pub use transaction_manager::{TransactionManager, TransactionManagerExt, UnitOfWorkFn};
pub use unit_of_work::{UnitOfWork, UnitOfWorkState};
