//! Integration tests for the Aino HTTP surface

mod access;
mod directories;
mod records;
mod schema;
mod support;
