//! Client facade tests against an in-process server.

mod common;

mod admin;
mod data_plane;
mod errors;
mod subscribe;
