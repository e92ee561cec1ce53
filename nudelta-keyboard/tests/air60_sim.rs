//! Air60 keymap operations against the simulated keyboard.

use nudelta_keyboard::defaults::{MAC_DEFAULT, WINDOWS_DEFAULT};
use nudelta_keyboard::{factory_default, Air60, KeyboardError, Keymap, Mode, Position, Profile};
use nudelta_transport::sim::SimulatedAir60;

#[test]
fn reset_then_dump_is_factory_default() {
    for mode in Mode::ALL {
        let sim = SimulatedAir60::new(0x0110);
        let air60 = Air60::open(sim.session()).unwrap();

        air60.reset_keymap(mode).unwrap();
        let dumped = air60.get_keymap(mode).unwrap();
        assert_eq!(dumped.to_binary(), factory_default(mode).to_binary());
    }
    assert_ne!(WINDOWS_DEFAULT, MAC_DEFAULT);
}

#[test]
fn firmware_query_never_touches_keymaps() {
    let sim = SimulatedAir60::new(0x0110);
    sim.set_keymap(Mode::Windows, &WINDOWS_DEFAULT.to_binary());
    sim.set_keymap(Mode::Mac, &MAC_DEFAULT.to_binary());

    let air60 = Air60::open(sim.session()).unwrap();
    for _ in 0..3 {
        assert_eq!(air60.read_firmware().unwrap().raw, 0x0110);
    }

    assert_eq!(sim.write_chunks_applied(), 0);
    assert_eq!(sim.keymap(Mode::Windows), WINDOWS_DEFAULT.to_binary());
    assert_eq!(sim.keymap(Mode::Mac), MAC_DEFAULT.to_binary());
}

#[test]
fn profile_overlay_changes_one_slot_on_device() {
    let sim = SimulatedAir60::new(0x0110);
    sim.set_keymap(Mode::Windows, &WINDOWS_DEFAULT.to_binary());
    let air60 = Air60::open(sim.session()).unwrap();

    let profile = Profile::from_yaml("keys:\n  A: B\n").unwrap();
    let before = air60.get_keymap(Mode::Windows).unwrap();
    let after = profile.apply(&before).unwrap();
    air60.set_keymap(Mode::Windows, &after).unwrap();

    let stored = Keymap::from_binary(&sim.keymap(Mode::Windows)).unwrap();
    let a: Position = "A".parse().unwrap();
    let b: Position = "B".parse().unwrap();
    assert_eq!(before.diff(&stored), vec![a]);
    assert_eq!(stored.get(a), WINDOWS_DEFAULT.get(b));
}

#[test]
fn device_errors_surface_as_transport_errors() {
    let sim = SimulatedAir60::new(0x0110);
    let air60 = Air60::open(sim.session()).unwrap();
    sim.truncate_keymap_responses();

    match air60.get_keymap(Mode::Mac) {
        Err(KeyboardError::Transport(e)) => assert!(e.is_io(), "{e}"),
        other => panic!("expected a transport error, got {other:?}"),
    }
}
