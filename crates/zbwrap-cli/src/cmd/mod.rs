pub(crate) mod add;
pub(crate) mod backup;
pub(crate) mod info;
pub(crate) mod list;
pub(crate) mod sync;
