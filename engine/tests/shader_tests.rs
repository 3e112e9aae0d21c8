//! Shader Tests - WGSL Parsing and Validation
//!
//! Parses `shaders/globe.wgsl` with naga and checks the entry points the
//! renderer binds by name.

use naga::valid::{Capabilities, ValidationFlags, Validator};

const GLOBE_SHADER: &str = include_str!("../../shaders/globe.wgsl");

fn parse() -> naga::Module {
    match naga::front::wgsl::parse_str(GLOBE_SHADER) {
        Ok(module) => module,
        Err(e) => panic!("globe.wgsl failed to parse:\n{}", e.emit_to_string(GLOBE_SHADER)),
    }
}

#[test]
fn test_globe_shader_validates() {
    let module = parse();
    let mut validator = Validator::new(ValidationFlags::all(), Capabilities::all());
    if let Err(e) = validator.validate(&module) {
        panic!("globe.wgsl failed validation: {e:?}");
    }
}

#[test]
fn test_globe_shader_entry_points() {
    let module = parse();
    let names: Vec<&str> = module.entry_points.iter().map(|e| e.name.as_str()).collect();
    for expected in [
        "vs_sky", "fs_sky", "vs_globe", "fs_globe", "vs_plane", "fs_plane", "vs_label", "fs_label",
    ] {
        assert!(names.contains(&expected), "missing entry point {expected}");
    }
}
