//! Controller Tests.
//!
//! Verifies construction against a mock PHY, the reset sequence, and the FSM phases of
//! real transactions against the behavioural PHY.

use hyperram_core::common::ConfigError;
use hyperram_core::common::constants::{REG_TYPE_CONFIG, REG_TYPE_SHIFT};
use hyperram_core::phy::{BusWidth, PhySense};
use hyperram_core::soc::controller::Controller;
use hyperram_core::soc::controller::fsm::ControllerState;
use hyperram_core::soc::devices::lookup;
use hyperram_core::soc::port::{AddressSpace, BurstType, Command, Request, Response, WriteWord};

use crate::common::harness;
use crate::common::mocks::phy::{self as mock_phy, MockPhy};

const CLOCK_HZ: u64 = 100_000_000;
/// `reset_delay` at 100 MHz.
const DELAY: usize = 21;

fn controller(phy: MockPhy) -> Controller<MockPhy> {
    Controller::new(phy, lookup("S27KS0641DP").unwrap(), CLOCK_HZ, None, None).unwrap()
}

fn idle_clocks(ctrl: &mut Controller<MockPhy>, n: usize) {
    for _ in 0..n {
        ctrl.clock(&Request::default());
    }
}

// ══════════════════════════════════════════════════════════
// 1. Construction
// ══════════════════════════════════════════════════════════

#[test]
fn construction_samples_phy_once() {
    let mut phy = mock_phy::with_timing(1, 1);
    phy.expect_step().times(1).returning(|_| PhySense::default());
    let ctrl = controller(phy);
    assert_eq!(ctrl.state(), ControllerState::CaWord(0));
    assert_eq!(ctrl.response(), Response::IDLE);
}

#[test]
fn rejected_configuration_never_touches_the_bus() {
    let mut phy = mock_phy::with_timing(1, 1);
    phy.expect_step().never();
    let Err(err) = Controller::new(phy, lookup("S27KS0641DP").unwrap(), CLOCK_HZ, Some(3), None)
    else {
        panic!("latency 3 at 100 MHz should be rejected");
    };
    assert!(matches!(err, ConfigError::InitialLatencyTooLow { .. }));
}

#[test]
fn infeasible_phy_is_rejected() {
    let mut phy = mock_phy::with_timing(1, 1);
    phy.expect_step().never();
    let Err(err) =
        Controller::new(phy, lookup("S27KL0641").unwrap(), 80_000_000, Some(3), Some(false))
    else {
        panic!("variable latency 3 behind a one-cycle PHY should be rejected");
    };
    assert_eq!(
        err,
        ConfigError::PhyRequiresFixedLatency {
            latency: 3,
            tx_latency: 1
        }
    );
}

// ══════════════════════════════════════════════════════════
// 2. Reset sequence
// ══════════════════════════════════════════════════════════

#[test]
fn reset_waits_for_delay_and_pll_lock() {
    let mut ctrl = controller(mock_phy::locked());
    let initial = ctrl.drive();
    assert!(!initial.reset_n);
    assert!(initial.cs_n);

    idle_clocks(&mut ctrl, DELAY);
    assert!(!ctrl.drive().reset_n, "reset held for the power-up delay");

    idle_clocks(&mut ctrl, 1);
    assert!(ctrl.drive().reset_n, "reset released once the PLL is locked");

    idle_clocks(&mut ctrl, DELAY);
    assert!(ctrl.drive().cs_n, "no bus activity during the post-reset delay");
    assert_eq!(ctrl.state(), ControllerState::CaWord(0));

    idle_clocks(&mut ctrl, 1);
    let drive = ctrl.drive();
    assert!(!drive.cs_n, "auto-configuration write starts");
    assert!(drive.clk_enable);
    assert!(drive.dq_oe);
    assert_eq!(drive.dq, 0x6000, "first CA half-word of the CR0 write");
}

#[test]
fn reset_is_held_while_pll_is_unlocked() {
    let mut phy = mock_phy::with_timing(1, 1);
    phy.expect_step().returning(|_| PhySense::default());
    let mut ctrl = controller(phy);

    idle_clocks(&mut ctrl, 10 * DELAY);
    assert!(!ctrl.drive().reset_n);
    assert!(ctrl.drive().cs_n);
    assert_eq!(ctrl.response(), Response::IDLE);
}

#[test]
fn commands_are_refused_during_reset() {
    let mut ctrl = controller(mock_phy::locked());
    let req = Request {
        cmd: Some(Command::read(0)),
        ..Request::default()
    };
    for _ in 0..2 * DELAY {
        assert!(!ctrl.response().cmd_ready);
        ctrl.clock(&req);
    }
    assert_eq!(ctrl.stats().reads, 0);
}

// ══════════════════════════════════════════════════════════
// 3. Transaction phases
// ══════════════════════════════════════════════════════════

#[test]
fn startup_write_reaches_device_and_returns_to_idle() {
    let config = harness::config("S27KS0641DP", CLOCK_HZ, BusWidth::X16);
    let mut sim = harness::simulator(&config);
    let cr0 = sim.core.controller().timing().cr0;

    for _ in 0..200 {
        sim.step();
    }
    let ctrl = sim.core.controller();
    let writes = ctrl.phy().device().register_writes();
    assert!(!writes.is_empty());
    assert_eq!(writes[0].value, cr0);
    assert_eq!(writes[0].die, 0);
    assert_eq!(ctrl.phy().device().cr0(0), Some(cr0));
    assert!(!ctrl.registers().initial);
}

#[test]
fn read_walks_every_phase_in_order() {
    let config = harness::config("S27KS0641DP", CLOCK_HZ, BusWidth::X16);
    let mut sim = harness::ready(&config);
    while sim.core.controller().state() != ControllerState::Idle {
        sim.step();
    }

    let mut visited = vec![ControllerState::Idle];
    let mut req = Request {
        cmd: Some(Command::read(0x10)),
        ..Request::default()
    };
    let mut received = 0;
    for _ in 0..200 {
        let resp = sim.core.tick(&req);
        if resp.cmd_ready && req.cmd.is_some() {
            req = Request {
                rdata_ready: true,
                rdata_last: false,
                ..Request::default()
            };
        } else if resp.rdata.is_some() && req.rdata_ready {
            received += 1;
            req.rdata_last = received + 1 >= 2;
        }
        let state = sim.core.controller().state();
        if visited.last() != Some(&state) {
            visited.push(state);
        }
        if received == 2 && state == ControllerState::Idle {
            break;
        }
    }

    assert_eq!(
        visited,
        [
            ControllerState::Idle,
            ControllerState::CaWord(0),
            ControllerState::CaWord(1),
            ControllerState::CaWord(2),
            ControllerState::SelectOp,
            ControllerState::ReadDelay,
            ControllerState::Read,
            ControllerState::EndRead,
            ControllerState::Idle,
        ]
    );
    assert_eq!(received, 2);
}

#[test]
fn missing_write_data_pauses_the_clock() {
    let config = harness::config("S27KS0641DP", CLOCK_HZ, BusWidth::X16);
    let mut sim = harness::ready(&config);
    while sim.core.controller().state() != ControllerState::Idle {
        sim.step();
    }

    let cmd = Request {
        cmd: Some(Command::write(0x20)),
        ..Request::default()
    };
    while !sim.core.tick(&cmd).cmd_ready {}

    // Starve the write channel until the controller is waiting for data.
    let mut paused = false;
    for _ in 0..100 {
        sim.core.tick(&Request::default());
        if sim.core.controller().state() == ControllerState::Write
            && !sim.core.controller().drive().clk_enable
        {
            paused = true;
            break;
        }
    }
    assert!(paused);
    assert!(sim.core.stats().clock_pauses > 0);
}

#[test]
fn multi_word_register_write_streams_through_write_reg() {
    let config = harness::config("S27KS0641DP", CLOCK_HZ, BusWidth::X16);
    let mut sim = harness::ready(&config);
    while sim.core.controller().state() != ControllerState::Idle {
        sim.step();
    }
    let cr0 = u32::from(sim.core.controller().timing().cr0);
    let words_before = sim.core.stats().words;

    let cmd = Command {
        we: true,
        aspace: AddressSpace::Register,
        burst: BurstType::Linear,
        addr: u32::from(REG_TYPE_CONFIG) << REG_TYPE_SHIFT,
    };
    let mut pending = vec![
        WriteWord {
            data: cr0,
            we: 0b11,
            last: true,
        },
        WriteWord {
            data: cr0,
            we: 0b11,
            last: false,
        },
    ];

    let mut visited = vec![ControllerState::Idle];
    let mut req = Request {
        cmd: Some(cmd),
        ..Request::default()
    };
    for _ in 0..100 {
        let resp = sim.core.tick(&req);
        if resp.cmd_ready && req.cmd.is_some() {
            req.cmd = None;
            req.wdata = pending.pop();
        } else if resp.wdata_ready && req.wdata.is_some() {
            req.wdata = pending.pop();
        }
        let state = sim.core.controller().state();
        if visited.last() != Some(&state) {
            visited.push(state);
        }
        if pending.is_empty() && req.wdata.is_none() && state == ControllerState::Idle {
            break;
        }
    }

    assert_eq!(
        visited,
        [
            ControllerState::Idle,
            ControllerState::CaWord(0),
            ControllerState::CaWord(1),
            ControllerState::CaWord(2),
            ControllerState::SelectOp,
            ControllerState::WriteReg,
            ControllerState::EndWrite,
            ControllerState::EndRead,
            ControllerState::Idle,
        ]
    );
    assert_eq!(sim.core.stats().words - words_before, 2);
    assert_eq!(
        sim.core.controller().phy().device().cr0(0),
        Some(cr0 as u16)
    );
}
