pub mod directory;
pub mod generator;
pub mod package;
pub mod pattern;
pub mod similarity;
