//! Database layer (Postgres).

pub mod users;

pub use users::UserStore;
