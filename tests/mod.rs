mod common;
mod processor_tests;
