use hyperram_core::phy::{BusWidth, Phy, PhyDrive, PhySense, PhyTiming};
use mockall::mock;

mock! {
    pub Phy {}
    impl Phy for Phy {
        fn timing(&self) -> PhyTiming;
        fn step(&mut self, drive: &PhyDrive) -> PhySense;
    }
}

/// A mock reporting the given pipeline depths on a 16-bit datapath.
pub fn with_timing(tx_latency: u32, rx_latency: u32) -> MockPhy {
    let mut phy = MockPhy::new();
    phy.expect_timing().return_const(PhyTiming {
        tx_latency,
        rx_latency,
        width: BusWidth::X16,
    });
    phy
}

/// A mock whose PLL is locked from the first cycle and whose bus floats low.
pub fn locked() -> MockPhy {
    let mut phy = with_timing(1, 1);
    phy.expect_step().returning(|_| PhySense {
        pll_locked: true,
        ..PhySense::default()
    });
    phy
}
