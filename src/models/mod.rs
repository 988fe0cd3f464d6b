pub mod endpoint;
pub mod message;
pub mod outcome;
pub mod topology;
