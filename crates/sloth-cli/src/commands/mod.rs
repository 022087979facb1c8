pub mod completion;
pub mod locate;
pub mod report;
pub mod top;
