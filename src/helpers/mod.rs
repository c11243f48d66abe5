pub(crate) mod reader;
pub mod string;
pub(crate) mod xml;
pub(crate) mod zip;
