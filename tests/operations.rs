//! End-to-end keymap operations against the simulated Air60.

use std::path::Path;

use nudelta::operations;
use nudelta_keyboard::defaults::{MAC_DEFAULT, WINDOWS_DEFAULT};
use nudelta_keyboard::{factory_default, Air60, KeyboardError, Keymap, Mode, Position};
use nudelta_transport::sim::SimulatedAir60;
use nudelta_transport::{require_interface, DiscoveredDevice, TransportError};

fn pattern(seed: u8) -> [u8; 1024] {
    let mut bytes = [0u8; 1024];
    for (i, b) in bytes.iter_mut().enumerate() {
        *b = (i as u8).wrapping_mul(13).wrapping_add(seed);
    }
    bytes
}

fn parse_hex(text: &str) -> Vec<u8> {
    text.split_whitespace()
        .map(|pair| u8::from_str_radix(pair, 16).unwrap())
        .collect()
}

#[test]
fn missing_keyboard_is_reported_before_any_write() {
    let err = require_interface(Vec::new()).unwrap_err();
    assert!(matches!(err, TransportError::DeviceNotFound(_)));
    assert!(err.to_string().contains("NuPhy Air60"), "{err}");

    let sim = SimulatedAir60::new(0x0110);
    let dir = tempfile::tempdir().unwrap();
    let bin = dir.path().join("out.bin");

    let err = operations::with_connection(
        || Air60::connect(Vec::new(), |_| Ok(sim.session())),
        |air60| operations::dump(air60, Mode::Windows, &bin, None),
    )
    .unwrap_err();
    assert!(
        matches!(
            err.downcast_ref::<KeyboardError>(),
            Some(KeyboardError::Transport(TransportError::DeviceNotFound(_)))
        ),
        "{err:#}"
    );
    assert!(!bin.exists());
    assert_eq!(sim.frames_received(), 0);
}

#[test]
fn connected_keyboard_runs_the_operation() {
    let sim = SimulatedAir60::new(0x0110);
    sim.set_keymap(Mode::Windows, &pattern(4));
    let dir = tempfile::tempdir().unwrap();
    let bin = dir.path().join("out.bin");

    let devices = vec![DiscoveredDevice { info: sim.info() }];
    operations::with_connection(
        || Air60::connect(devices, |_| Ok(sim.session())),
        |air60| operations::dump(air60, Mode::Windows, &bin, None),
    )
    .unwrap();
    assert_eq!(std::fs::read(&bin).unwrap(), pattern(4));
}

#[test]
fn mac_dump_writes_binary_and_hex_sidecar() {
    let sim = SimulatedAir60::new(0x0110);
    sim.set_keymap(Mode::Mac, &pattern(9));
    let air60 = Air60::open(sim.session()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let bin = dir.path().join("out.bin");
    let hex = dir.path().join("out.txt");
    let report = operations::dump(&air60, Mode::Mac, &bin, Some(&hex)).unwrap();

    let written = std::fs::read(&bin).unwrap();
    assert_eq!(written.len(), 1024);
    assert_eq!(written, pattern(9));
    assert_eq!(parse_hex(&std::fs::read_to_string(&hex).unwrap()), written);
    assert_eq!(report.bytes, 1024);
    assert_eq!(report.hex_path.as_deref(), Some(hex.as_path()));
    assert_eq!(sim.write_chunks_applied(), 0);
}

#[test]
fn reset_then_dump_matches_factory_default() {
    for mode in Mode::ALL {
        let sim = SimulatedAir60::new(0x0110);
        sim.set_keymap(mode, &pattern(1));
        let air60 = Air60::open(sim.session()).unwrap();
        operations::reset(&air60, mode).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("reset.bin");
        operations::dump(&air60, mode, &bin, None).unwrap();
        assert_eq!(
            std::fs::read(&bin).unwrap(),
            factory_default(mode).to_binary()
        );
    }
}

#[test]
fn profile_a_to_b_changes_only_a() {
    let sim = SimulatedAir60::new(0x0110);
    sim.set_keymap(Mode::Windows, &WINDOWS_DEFAULT.to_binary());
    let air60 = Air60::open(sim.session()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let yml = dir.path().join("keys.yml");
    std::fs::write(&yml, "keys:\n  A: B\n").unwrap();
    let report = operations::load_profile(&air60, Mode::Windows, &yml).unwrap();
    assert_eq!(report.changed, 1);

    let stored = Keymap::from_binary(&sim.keymap(Mode::Windows)).unwrap();
    let a: Position = "A".parse().unwrap();
    assert_eq!(WINDOWS_DEFAULT.diff(&stored), vec![a]);
    assert_eq!(stored.get(a), WINDOWS_DEFAULT.get("B".parse().unwrap()));
    // The other slot is untouched
    assert_eq!(sim.keymap(Mode::Mac), [0u8; 1024]);
}

#[test]
fn invalid_profile_never_reaches_the_keyboard() {
    let sim = SimulatedAir60::new(0x0110);
    sim.set_keymap(Mode::Windows, &WINDOWS_DEFAULT.to_binary());
    let air60 = Air60::open(sim.session()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let yml = dir.path().join("bad.yml");
    std::fs::write(&yml, "keys:\n  A: B\n  CapsLock: Hyper\n").unwrap();

    let err = operations::load_profile(&air60, Mode::Windows, &yml).unwrap_err();
    assert!(format!("{err:#}").contains("Hyper"), "{err:#}");
    assert_eq!(sim.write_chunks_applied(), 0);
    assert_eq!(sim.keymap(Mode::Windows), WINDOWS_DEFAULT.to_binary());
}

#[test]
fn flat_profile_mapping_is_rejected_without_writing() {
    let sim = SimulatedAir60::new(0x0110);
    sim.set_keymap(Mode::Windows, &WINDOWS_DEFAULT.to_binary());
    let air60 = Air60::open(sim.session()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let yml = dir.path().join("flat.yml");
    std::fs::write(&yml, "A: B\n").unwrap();

    assert!(operations::load_profile(&air60, Mode::Windows, &yml).is_err());
    assert_eq!(sim.write_chunks_applied(), 0);
    assert_eq!(sim.keymap(Mode::Windows), WINDOWS_DEFAULT.to_binary());
}

#[test]
fn short_binary_file_keeps_device_tail() {
    let sim = SimulatedAir60::new(0x0110);
    sim.set_keymap(Mode::Windows, &pattern(3));
    let air60 = Air60::open(sim.session()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let bin = dir.path().join("short.bin");
    std::fs::write(&bin, [0xEE; 200]).unwrap();

    let report = operations::load_binary(&air60, Mode::Windows, &bin).unwrap();
    assert_eq!(report.consumed, 200);

    let stored = sim.keymap(Mode::Windows);
    assert!(stored[..200].iter().all(|&b| b == 0xEE));
    assert_eq!(&stored[200..], &pattern(3)[200..]);
}

#[test]
fn oversized_binary_file_uses_first_keymap_only() {
    let sim = SimulatedAir60::new(0x0110);
    let air60 = Air60::open(sim.session()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let bin = dir.path().join("long.bin");
    let mut data = pattern(5).to_vec();
    data.extend_from_slice(&[0xFF; 512]);
    std::fs::write(&bin, &data).unwrap();

    let report = operations::load_binary(&air60, Mode::Mac, &bin).unwrap();
    assert_eq!(report.consumed, 1024);
    assert_eq!(sim.keymap(Mode::Mac), pattern(5));
}

#[test]
fn export_then_load_restores_keymap() {
    let sim = SimulatedAir60::new(0x0110);
    sim.set_keymap(Mode::Mac, &MAC_DEFAULT.to_binary());
    let air60 = Air60::open(sim.session()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let yml = dir.path().join("mac.yml");
    let report = operations::export_profile(&air60, Mode::Mac, &yml).unwrap();
    assert_eq!(report.entries, 256);

    // Wipe the slot, then bring it back from the profile
    sim.set_keymap(Mode::Mac, &[0u8; 1024]);
    operations::load_profile(&air60, Mode::Mac, &yml).unwrap();
    assert_eq!(sim.keymap(Mode::Mac), MAC_DEFAULT.to_binary());
}

#[test]
fn export_refuses_unnamed_keycodes() {
    let sim = SimulatedAir60::new(0x0110);
    sim.set_keymap(Mode::Windows, &[0xFF; 1024]);
    let air60 = Air60::open(sim.session()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let yml = dir.path().join("raw.yml");
    assert!(operations::export_profile(&air60, Mode::Windows, &yml).is_err());
    assert!(!yml.exists());
}

#[test]
fn file_errors_name_the_path() {
    let sim = SimulatedAir60::new(0x0110);
    let air60 = Air60::open(sim.session()).unwrap();
    let missing = Path::new("/nonexistent/nudelta/keys.bin");

    let err = operations::load_binary(&air60, Mode::Windows, missing).unwrap_err();
    assert!(err.to_string().contains("keys.bin"), "{err}");
    let err = operations::dump(&air60, Mode::Windows, missing, None).unwrap_err();
    assert!(err.to_string().contains("for writing"), "{err}");
    assert_eq!(sim.write_chunks_applied(), 0);
}

#[test]
fn firmware_query_is_read_only() {
    let sim = SimulatedAir60::new(0x0203);
    sim.set_keymap(Mode::Windows, &pattern(2));
    let air60 = Air60::open(sim.session()).unwrap();

    assert_eq!(operations::firmware(&air60).unwrap().to_string(), "0203");
    assert_eq!(sim.write_chunks_applied(), 0);
    assert_eq!(sim.keymap(Mode::Windows), pattern(2));
}
