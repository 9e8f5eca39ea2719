pub mod currency;
pub mod savings;
pub mod dashboard;
pub mod history;
pub mod entry_form;
