pub(crate) mod reader;
pub(crate) mod text;
pub mod xml;
pub(crate) mod zip;
