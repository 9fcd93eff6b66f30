// src/test_support.rs

//! Fixture builders shared by unit tests

use std::io::{Cursor, Write};

/// Build a zip archive containing the given files
pub fn zip_archive(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in files {
        writer
            .start_file(*name, zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Descriptor JSON for a mod
pub fn descriptor_json(name: &str, version: &str, display_name: Option<&str>) -> Vec<u8> {
    let mut value = serde_json::json!({ "name": name, "version": version });
    if let Some(display_name) = display_name {
        value["ccmodHumanName"] = serde_json::Value::from(display_name);
    }
    serde_json::to_vec(&value).unwrap()
}

/// A mod archive with its descriptor at `package.json`
pub fn mod_archive(name: &str, version: &str, display_name: Option<&str>) -> Vec<u8> {
    let descriptor = descriptor_json(name, version, display_name);
    zip_archive(&[
        ("package.json", descriptor.as_slice()),
        ("assets/readme.txt", b"mod content".as_slice()),
    ])
}
