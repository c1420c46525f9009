pub(crate) mod migrate;
pub(crate) mod seek;
pub(crate) mod sync;
