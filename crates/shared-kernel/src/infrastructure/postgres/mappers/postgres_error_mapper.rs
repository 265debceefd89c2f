// crates/shared-kernel/src/infrastructure/postgres/mappers/postgres_error_mapper.rs

use crate::domain::entities::EntityMetadata;
use crate::errors::DomainError;

const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";

pub trait SqlxErrorExt<T> {
    fn map_domain<E: EntityMetadata>(self) -> Result<T, DomainError>;
    fn map_domain_infra(self, context: &'static str) -> Result<T, DomainError>;
}

impl<T> SqlxErrorExt<T> for std::result::Result<T, sqlx::Error> {
    fn map_domain<E: EntityMetadata>(self) -> Result<T, DomainError> {
        self.map_err(|e| match e {
            sqlx::Error::RowNotFound => DomainError::NotFound {
                entity: E::entity_name(),
                id: "unknown".into(),
            },
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.into_owned());

                // Concurrence : la transaction a été annulée par Postgres, elle peut être rejouée
                if matches!(code.as_deref(), Some(SERIALIZATION_FAILURE | DEADLOCK_DETECTED)) {
                    return DomainError::ConcurrencyConflict {
                        reason: format!("Concurrency conflict on {}: {}", E::entity_name(), db_err.message()),
                    };
                }

                DomainError::DataAccess {
                    code,
                    message: db_err.message().into(),
                }
            }
            other => from_driver(other, E::entity_name()),
        })
    }

    fn map_domain_infra(self, context: &'static str) -> Result<T, DomainError> {
        self.map_err(|e| match e {
            sqlx::Error::Database(db_err) => DomainError::DataAccess {
                code: db_err.code().map(|c| c.into_owned()),
                message: format!("{}: {}", context, db_err.message()),
            },
            other => from_driver(other, context),
        })
    }
}

fn from_driver(e: sqlx::Error, context: &str) -> DomainError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            DomainError::PoolExhausted(format!("{}: {}", context, e))
        }
        _ => DomainError::DataAccess {
            code: None,
            message: format!("{}: {}", context, e),
        },
    }
}
