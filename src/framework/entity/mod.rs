pub mod ent_trait;

pub use ent_trait::{Entity, Record, MAX_WRITE_ATTEMPTS};
