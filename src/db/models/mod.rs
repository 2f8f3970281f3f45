// src/db/models/mod.rs

//! Data models for metadata database entities

mod pkgmeta;

pub use pkgmeta::PkgMeta;
