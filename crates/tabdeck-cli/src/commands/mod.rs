pub mod add;
pub mod edit;
pub mod favicons;
pub mod import;
pub mod list;
pub mod remove;
pub mod run;
pub mod settings;
