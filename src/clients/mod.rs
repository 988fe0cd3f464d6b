pub mod rbmq;
pub mod webhook;
