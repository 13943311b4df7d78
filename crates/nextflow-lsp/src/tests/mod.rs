
mod session_lifecycle_test;
