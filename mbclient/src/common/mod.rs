pub(crate) mod checksum;
pub(crate) mod cursor;
pub(crate) mod frame;
pub(crate) mod function;
