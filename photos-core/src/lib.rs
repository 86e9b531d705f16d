#![allow(clippy::new_without_default)]

pub mod controller;
pub mod data;
pub mod error;
pub mod util;
pub mod webapi;
