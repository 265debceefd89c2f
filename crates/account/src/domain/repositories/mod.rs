mod account_repository;

pub use account_repository::AccountRepository;

#[cfg(test)]
mod account_repository_stub;

#[cfg(test)]
pub use account_repository_stub::AccountRepositoryStub;
