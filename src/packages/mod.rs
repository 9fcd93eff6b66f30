// src/packages/mod.rs

//! Package metadata carried inside mod archives
//!
//! Each archive contains a JSON descriptor (usually `package.json`) naming
//! the mod, its version and its dependencies. The manifest records where in
//! the archive that file lives.

mod descriptor;

pub use descriptor::PackageDescriptor;
