#![no_std]

pub mod config;
pub mod controller;
pub mod deadline;
pub mod decision;
pub mod poll;
pub mod programmer;
pub mod reason;
pub mod state;
pub mod tasks;
