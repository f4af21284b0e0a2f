// Plain domain logic over plain data. Nothing in here touches the
// database or the network; services call in and persist the results.
pub mod grouping;
pub mod placement;
pub mod progress;
pub mod reports;
pub mod workflow;
