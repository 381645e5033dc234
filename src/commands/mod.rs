pub mod history;
pub mod replace;
pub mod search;
