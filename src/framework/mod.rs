// Entity framework - typed collections over the document store

pub mod entity;

pub use entity::{Entity, Record};
