// src/lib.rs

pub mod config;
pub mod extractor;
pub mod fetcher;
pub mod merger;
pub mod models;
pub mod store;
pub mod tracker_service;
pub mod web;
