//! Document chunking for docqa.

pub mod character;

pub use character::CharacterChunker;
