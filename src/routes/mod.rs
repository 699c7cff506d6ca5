pub(crate) mod funds;
pub(crate) mod health;
pub(crate) mod index;
pub(crate) mod portfolio;
