use super::*;
use crate::address::WAYS;
use crate::mem::ByteLanes;

use ControllerState::*;

fn assert_one_hot(out: &ControllerOutputs) {
    assert!(out.arrays.tag_we.is_one_hot(), "{:?}", out);
    assert!(out.arrays.data_we.is_one_hot(), "{:?}", out);
    assert!(out.arrays.valid_we.is_one_hot(), "{:?}", out);
}

fn step(ctl: &mut Controller, input: &ControllerInputs) -> ControllerOutputs {
    let out = ctl.step(input);
    assert_one_hot(&out);
    out
}

/// Run reset and the invalidation sweep.
fn boot(ctl: &mut Controller) -> Vec<ControllerOutputs> {
    let mut outs = Vec::new();
    while ctl.state() != Idle {
        outs.push(step(ctl, &ControllerInputs::default()));
        assert!(outs.len() < 32, "stuck in {:?}", ctl.state());
    }
    outs
}

fn read(address: u32) -> ControllerInputs {
    ControllerInputs {
        request_active: true,
        address,
        ..Default::default()
    }
}

fn write(address: u32, data: u16) -> ControllerInputs {
    ControllerInputs {
        request_active: true,
        address,
        write: true,
        write_data: data,
        lanes: ByteLanes::all(),
        ..Default::default()
    }
}

#[test]
fn state_codes() {
    for code in 0..=10 {
        assert_eq!(ControllerState::from_code(code).code(), code);
    }
    for code in 11..=255 {
        assert_eq!(ControllerState::from_code(code), Idle);
    }
}

#[test]
fn reset_sweeps_every_set() {
    let mut ctl = Controller::new();
    assert_eq!(ctl.state(), Reset);
    let outs = boot(&mut ctl);

    assert_eq!(outs.len(), 1 + SET_COUNT);
    assert!(outs[0].counter_reset);
    assert!(outs[0].arrays.is_idle());
    for (set, out) in outs[1..].iter().enumerate() {
        assert_eq!(out.arrays.set_index, set);
        assert!(out.arrays.sweep_clear);
        assert!(out.arrays.lru_we);
        assert_eq!(out.arrays.lru_value, PlruState::RESET);
    }
}

#[test]
fn idle_without_request() {
    let mut ctl = Controller::new();
    boot(&mut ctl);
    for _ in 0..4 {
        let out = step(&mut ctl, &ControllerInputs { address: 0x40, ..Default::default() });
        assert_eq!(ctl.state(), Idle);
        assert!(!out.ack);
        assert!(out.arrays.is_idle());
        assert!(!out.dram.read_strobe && !out.dram.write_strobe);
    }
}

#[test]
fn read_miss_fill_sequence() {
    let mut ctl = Controller::new();
    boot(&mut ctl);

    let addr = DecodedAddress::new(0x0000_1234);
    let mut input = read(0x0000_1234);

    step(&mut ctl, &input);
    assert_eq!(ctl.state(), CheckForCacheHit);
    assert_eq!(ctl.lru_hold(), PlruState::RESET);

    let out = step(&mut ctl, &input);
    assert_eq!(ctl.state(), ReadDataFromDramIntoCache);
    assert_eq!(ctl.victim(), 0);
    assert!(out.arrays.lru_we);
    assert_eq!(out.arrays.set_index, addr.set);
    assert_eq!(out.arrays.lru_value, PlruState::new(0b011));

    // Waits for the backing store.
    for _ in 0..3 {
        let out = step(&mut ctl, &input);
        assert_eq!(ctl.state(), ReadDataFromDramIntoCache);
        assert!(out.dram.read_strobe);
        assert_eq!(out.dram.address, addr.line_base());
        assert_eq!(out.arrays.tag_we, BlockMask::Block0);
        assert_eq!(out.arrays.valid_we, BlockMask::Block0);
        assert_eq!(out.arrays.tag_value, addr.tag);
        assert!(out.arrays.valid_value);
        assert!(!out.ack);
    }
    input.access_ready = true;
    step(&mut ctl, &input);
    assert_eq!(ctl.state(), CASDelay1);
    let out = step(&mut ctl, &input);
    assert_eq!(ctl.state(), CASDelay2);
    assert!(out.arrays.data_we.is_empty());
    let out = step(&mut ctl, &input);
    assert_eq!(ctl.state(), BurstFill);
    assert!(out.counter_reset);
    assert!(out.arrays.data_we.is_empty());
    assert_eq!(ctl.counter(), 0);

    let mut words = Vec::new();
    while ctl.state() == BurstFill {
        let out = step(&mut ctl, &input);
        assert_eq!(out.arrays.data_we, BlockMask::Block0);
        assert_eq!(out.dram.address, addr.word_address(out.arrays.word_offset));
        assert!(!out.ack);
        words.push(out.arrays.word_offset);
    }
    assert_eq!(words, (0..LINE_WORDS).collect::<Vec<_>>());
    assert_eq!(ctl.state(), EndBurstFill);

    input.hit = BlockMask::Block0;
    input.hit_data = 0xBEEF;
    for _ in 0..2 {
        let out = step(&mut ctl, &input);
        assert_eq!(ctl.state(), EndBurstFill);
        assert!(out.ack);
        assert_eq!(out.read_data, 0xBEEF);
        assert!(out.arrays.is_idle());
    }

    input.request_active = false;
    let out = step(&mut ctl, &input);
    assert_eq!(ctl.state(), Idle);
    assert!(!out.ack);
}

#[test]
fn read_hit_promotes_hit_block() {
    let mut ctl = Controller::new();
    boot(&mut ctl);

    let mut input = read(0x80);
    input.hit = BlockMask::Block2;
    input.valid = BlockMask::all();
    input.lru_state = PlruState::new(0b000);
    input.hit_data = 0x4242;

    let out = step(&mut ctl, &input);
    assert_eq!(ctl.state(), CheckForCacheHit);
    assert!(!out.ack);

    let out = step(&mut ctl, &input);
    assert_eq!(ctl.state(), WaitForEndOfCacheRead);
    assert!(out.arrays.lru_we);
    assert_eq!(out.arrays.lru_value, plru::promote(PlruState::new(0b000), 2));
    assert!(out.arrays.tag_we.is_empty() && out.arrays.valid_we.is_empty());
    assert!(!out.dram.read_strobe);

    let out = step(&mut ctl, &input);
    assert!(out.ack);
    assert_eq!(out.read_data, 0x4242);
    assert!(!out.arrays.lru_we);

    input.request_active = false;
    step(&mut ctl, &input);
    assert_eq!(ctl.state(), Idle);
}

#[test]
fn lru_is_read_before_update() {
    let mut ctl = Controller::new();
    boot(&mut ctl);

    let mut input = read(0x80);
    input.lru_state = PlruState::new(0b101);
    step(&mut ctl, &input);
    // The array value changing after Idle does not affect the decision.
    input.lru_state = PlruState::new(0b010);
    let out = step(&mut ctl, &input);
    assert_eq!(ctl.victim(), 3);
    assert_eq!(out.arrays.lru_value, PlruState::new(0b000));
}

#[test]
fn write_invalidates_hit_and_forwards_ack() {
    let mut ctl = Controller::new();
    boot(&mut ctl);

    let mut input = write(0x1236, 0x7777);
    input.hit = BlockMask::Block1;
    input.valid = BlockMask::Block1 | BlockMask::Block3;

    let out = step(&mut ctl, &input);
    assert_eq!(ctl.state(), WriteDataToDram);
    assert_eq!(out.arrays.valid_we, BlockMask::Block1);
    assert!(!out.arrays.valid_value);
    assert_eq!(out.arrays.set_index, DecodedAddress::new(0x1236).set);
    assert!(out.arrays.tag_we.is_empty());
    assert!(!out.ack);

    input.hit = BlockMask::empty();
    for _ in 0..2 {
        let out = step(&mut ctl, &input);
        assert_eq!(ctl.state(), WriteDataToDram);
        assert!(out.dram.write_strobe);
        assert_eq!(out.dram.address, 0x1236);
        assert_eq!(out.dram.data, 0x7777);
        assert_eq!(out.dram.lanes, ByteLanes::all());
        assert!(!out.ack);
        assert!(out.arrays.is_idle());
    }

    input.write_ack = true;
    let out = step(&mut ctl, &input);
    assert!(out.ack);

    input.request_active = false;
    let out = step(&mut ctl, &input);
    assert_eq!(ctl.state(), Idle);
    assert!(!out.dram.write_strobe);
    assert!(!out.ack);
}

#[test]
fn write_miss_touches_no_block() {
    let mut ctl = Controller::new();
    boot(&mut ctl);
    let out = step(&mut ctl, &write(0x10, 1));
    assert_eq!(ctl.state(), WriteDataToDram);
    assert!(out.arrays.is_idle());
}

#[test]
fn multiple_hits_stay_one_hot() {
    let mut ctl = Controller::new();
    boot(&mut ctl);
    let mut input = write(0x10, 1);
    input.hit = BlockMask::Block1 | BlockMask::Block3;
    let out = step(&mut ctl, &input);
    assert_eq!(out.arrays.valid_we, BlockMask::Block1);
}

#[test]
fn fill_completes_without_strobe() {
    let mut ctl = Controller::new();
    boot(&mut ctl);

    let mut input = read(0x200);
    input.access_ready = true;
    step(&mut ctl, &input);
    step(&mut ctl, &input);
    assert_eq!(ctl.state(), ReadDataFromDramIntoCache);

    input.request_active = false;
    let mut pulses = 0;
    while ctl.state() != EndBurstFill {
        let out = step(&mut ctl, &input);
        if !out.arrays.data_we.is_empty() {
            pulses += 1;
        }
        assert!(!out.ack);
    }
    assert_eq!(pulses, LINE_WORDS);

    step(&mut ctl, &input);
    assert_eq!(ctl.state(), Idle);
}

#[test]
fn request_dropped_before_hit_check() {
    let mut ctl = Controller::new();
    boot(&mut ctl);
    let mut input = read(0x200);
    step(&mut ctl, &input);
    input.request_active = false;
    let out = step(&mut ctl, &input);
    assert_eq!(ctl.state(), Idle);
    assert!(out.arrays.is_idle());
}

#[test]
fn reset_aborts_fill() {
    let mut ctl = Controller::new();
    boot(&mut ctl);

    let mut input = read(0x200);
    input.access_ready = true;
    for _ in 0..6 {
        step(&mut ctl, &input);
    }
    assert_eq!(ctl.state(), BurstFill);

    input.reset = true;
    let out = step(&mut ctl, &input);
    assert_eq!(out, ControllerOutputs::default());
    assert_eq!(ctl.state(), Reset);

    assert_eq!(boot(&mut ctl).len(), 1 + SET_COUNT);
}

#[test]
fn victims_follow_plru_table() {
    let mut ctl = Controller::new();
    boot(&mut ctl);

    let mut lru = PlruState::RESET;
    let mut victims = Vec::new();
    for _ in 0..(WAYS + 1) {
        let mut input = read(0x300);
        input.lru_state = lru;
        step(&mut ctl, &input);
        let out = step(&mut ctl, &input);
        victims.push(ctl.victim());
        lru = out.arrays.lru_value;

        input.access_ready = true;
        while ctl.state() != EndBurstFill {
            step(&mut ctl, &input);
        }
        input.request_active = false;
        step(&mut ctl, &input);
    }
    assert_eq!(victims, vec![0, 2, 1, 3, 0]);
}

#[test]
fn evaluate_is_pure() {
    let mut ctl = Controller::new();
    boot(&mut ctl);
    let input = read(0x40);
    let a = ctl.evaluate(&input);
    let b = ctl.evaluate(&input);
    assert_eq!(a.next, b.next);
    assert_eq!(a.outputs, b.outputs);
    assert_eq!(ctl.state(), Idle);
}
