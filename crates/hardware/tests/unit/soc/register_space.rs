//! Register Space Tests.
//!
//! Drives the register-space client with hand-built port responses to verify the CSR
//! layout, the startup sequence and single register accesses.

use hyperram_core::common::constants::{REG_TYPE_CONFIG, REG_TYPE_ID};
use hyperram_core::phy::BusWidth;
use hyperram_core::soc::port::{
    AddressSpace, BurstType, Command, PortWires, ReadWord, Request, Response, WriteWord,
};
use hyperram_core::soc::register_space::{CsrFields, RegisterSpace, RegisterState};
use pretty_assertions::assert_eq;
use rstest::rstest;

const CR0: u16 = 0x8FFF;
const DIE_SHIFT: u32 = 22;
const BUSY: u32 = 1 << 31;

fn respond(rs: &mut RegisterSpace, resp: Response) {
    let req = rs.request();
    rs.clock(&PortWires::new(req, resp));
}

const CMD_READY: Response = Response {
    cmd_ready: true,
    wdata_ready: false,
    rdata: None,
};

const WDATA_READY: Response = Response {
    cmd_ready: false,
    wdata_ready: true,
    rdata: None,
};

const fn read_word(data: u32) -> Response {
    Response {
        cmd_ready: false,
        wdata_ready: false,
        rdata: Some(ReadWord { data }),
    }
}

/// Runs one complete register write, asserting the command it issues.
fn expect_write(rs: &mut RegisterSpace, addr: u32, value: u16) {
    respond(rs, Response::IDLE);
    assert_eq!(rs.state(), RegisterState::WaitCmd);
    assert_eq!(
        rs.request().cmd,
        Some(Command {
            we: true,
            aspace: AddressSpace::Register,
            burst: BurstType::Linear,
            addr,
        })
    );
    respond(rs, CMD_READY);
    assert_eq!(rs.state(), RegisterState::WaitWrite);
    assert_eq!(
        rs.request().wdata,
        Some(WriteWord {
            data: u32::from(value),
            we: 0xF,
            last: true,
        })
    );
    respond(rs, WDATA_READY);
    assert_eq!(rs.state(), RegisterState::Start);
}

fn configured(banks: u8, width: BusWidth) -> RegisterSpace {
    let mut rs = RegisterSpace::new(CR0, banks, DIE_SHIFT, width);
    for die in (0..u32::from(banks)).rev() {
        expect_write(&mut rs, (die << DIE_SHIFT) | (1 << 11), CR0);
    }
    assert!(rs.setup_done());
    rs
}

// ══════════════════════════════════════════════════════════
// 1. CSR layout
// ══════════════════════════════════════════════════════════

#[test]
fn csr_field_positions() {
    let fields = CsrFields {
        reg_value: 0xBEEF,
        reg_nr: 5,
        reg_type: 0xA5,
        die_nr: 1,
        we: true,
        strobe: true,
    };
    assert_eq!(fields.encode(), 0x6D2D_BEEF);
    assert_eq!(CsrFields::decode(0x6D2D_BEEF), fields);
}

#[test]
fn decode_ignores_busy_bit() {
    assert_eq!(CsrFields::decode(BUSY), CsrFields::default());
}

// ══════════════════════════════════════════════════════════
// 2. Startup sequence
// ══════════════════════════════════════════════════════════

#[test]
fn busy_and_not_done_before_startup() {
    let rs = RegisterSpace::new(CR0, 1, DIE_SHIFT, BusWidth::X16);
    assert!(!rs.setup_done());
    assert!(rs.busy());
    assert_ne!(rs.read_csr() & BUSY, 0);
    assert_eq!(rs.request(), Request::default());
    assert_eq!(rs.fields().reg_value, CR0);
    assert_eq!(rs.fields().reg_type, REG_TYPE_CONFIG);
}

#[rstest]
#[case(1)]
#[case(2)]
fn startup_writes_every_die_counting_down(#[case] banks: u8) {
    let rs = configured(banks, BusWidth::X16);
    assert!(!rs.busy());
    assert_eq!(rs.fields().die_nr, 0);
    assert_eq!(rs.read_csr() & BUSY, 0);
}

#[test]
fn startup_waits_for_command_ready() {
    let mut rs = RegisterSpace::new(CR0, 1, DIE_SHIFT, BusWidth::X16);
    for _ in 0..10 {
        respond(&mut rs, Response::IDLE);
        assert_eq!(rs.state(), RegisterState::WaitCmd);
    }
    assert!(!rs.setup_done());
}

#[test]
fn csr_writes_are_ignored_while_busy() {
    let mut rs = RegisterSpace::new(CR0, 2, DIE_SHIFT, BusWidth::X16);
    rs.write_csr(0x4000_1234);
    respond(&mut rs, Response::IDLE);
    assert_eq!(rs.fields().reg_value, CR0);
    assert_eq!(rs.fields().die_nr, 1);
    assert!(!rs.fields().strobe);
}

// ══════════════════════════════════════════════════════════
// 3. Caller accesses
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(BusWidth::X16, 0x0C81, 0x0C81)]
#[case(BusWidth::X32, 0x0C81_0C81, 0x0C81)]
#[case(BusWidth::X32, 0x1234_5678, 0x1234)]
fn read_captures_first_half_word(#[case] width: BusWidth, #[case] data: u32, #[case] expected: u16) {
    let mut rs = configured(1, width);
    rs.write_csr(
        CsrFields {
            reg_type: REG_TYPE_ID,
            strobe: true,
            ..CsrFields::default()
        }
        .encode(),
    );
    respond(&mut rs, Response::IDLE);
    assert!(rs.busy(), "busy as soon as the strobe lands");

    respond(&mut rs, Response::IDLE);
    assert_eq!(rs.state(), RegisterState::WaitCmd);
    assert!(!rs.fields().strobe, "strobe self-clears");
    assert_eq!(rs.request().cmd, Some(Command {
        we: false,
        aspace: AddressSpace::Register,
        burst: BurstType::Linear,
        addr: 0,
    }));

    respond(&mut rs, CMD_READY);
    assert_eq!(rs.state(), RegisterState::WaitRead);
    assert!(rs.request().rdata_ready && rs.request().rdata_last);

    respond(&mut rs, Response::IDLE);
    assert_eq!(rs.state(), RegisterState::WaitRead);

    respond(&mut rs, read_word(data));
    assert_eq!(rs.state(), RegisterState::Start);
    assert_eq!(rs.fields().reg_value, expected);
    assert!(!rs.busy());
}

#[test]
fn write_addresses_selected_die_and_register() {
    let mut rs = configured(2, BusWidth::X16);
    rs.write_csr(
        CsrFields {
            reg_value: 0xFFC2,
            reg_nr: 1,
            reg_type: REG_TYPE_CONFIG,
            die_nr: 1,
            we: true,
            strobe: true,
        }
        .encode(),
    );
    respond(&mut rs, Response::IDLE);
    expect_write(&mut rs, (1 << DIE_SHIFT) | (1 << 11) | 1, 0xFFC2);
    assert!(!rs.busy());
}
