mod postgres_connection;
mod postgres_connection_provider;

pub use postgres_connection::PostgresConnection;
pub use postgres_connection_provider::PostgresConnectionProvider;
