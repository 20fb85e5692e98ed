pub mod icon;
pub mod layout;
pub mod listing;
pub mod persister;
pub mod validation;
