// app/src/lib.rs

//! Storefront backend: order placement over a relational store, served by
//! actix-web.

pub mod config;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod services;
pub mod state;
pub mod store;
pub mod web;
