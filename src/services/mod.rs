pub mod cleanup;
pub mod health;
