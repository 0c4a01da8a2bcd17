// Host-facing plumbing shared by the page controllers.
pub mod actions;
pub mod debounce;
pub mod document;
pub mod notify;
