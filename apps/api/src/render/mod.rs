pub mod page;
pub mod report;
