//! Domain entities - Core business objects with identity

mod character;
mod house;

pub use character::{Character, CharacterRequest};
pub use house::{House, HouseRequest};
