#![forbid(unsafe_code)]

mod delete;
mod get;
mod insert;
mod update;
