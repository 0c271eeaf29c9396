//! End-to-end transfer: framer -> loopback link -> receiver -> panel

use embassy_futures::block_on;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::mutex::Mutex;
use embedded_hal_async::delay::DelayNs;
use proptest::prelude::*;

use shelftag_core::{
    drain_next, Advertiser, CompletionSignal, ReceiverConfig, ReceiverError, SignalScheduler,
    State, WatchdogStatus,
};
use shelftag_display::{DisplayError, EpaperPanel, PanelGeometry};
use shelftag_protocol::{ChunkTransport, Framer, FramerConfig, SendError, WriteOutcome};

type Receiver<'a> =
    shelftag_core::Receiver<Panel, SignalScheduler<'a, NoopRawMutex>, Radio, 8000>;

#[derive(Default)]
struct Panel {
    frames: Vec<(Vec<u8>, Vec<u8>)>,
}

impl EpaperPanel for Panel {
    fn render(&mut self, black: &[u8], red: &[u8]) -> Result<(), DisplayError> {
        self.frames.push((black.to_vec(), red.to_vec()));
        Ok(())
    }

    fn geometry(&self) -> PanelGeometry {
        PanelGeometry::SHELF_TAG_213
    }
}

#[derive(Default)]
struct Radio {
    advertised: usize,
}

impl Advertiser for Radio {
    type Error = ();

    fn start_advertising(&mut self, name: &str) -> Result<(), ()> {
        assert_eq!(name, "ShelfTag");
        self.advertised += 1;
        Ok(())
    }
}

struct NoDelay;

impl DelayNs for NoDelay {
    async fn delay_ns(&mut self, _ns: u32) {}
}

/// Central side of the link, writing straight into the receiver
struct Loopback<'r, 'a> {
    receiver: &'r Mutex<NoopRawMutex, Receiver<'a>>,
    writes: Vec<usize>,
    /// Drop the link before this write
    fail_at: Option<usize>,
}

impl<'r, 'a> Loopback<'r, 'a> {
    fn new(receiver: &'r Mutex<NoopRawMutex, Receiver<'a>>) -> Self {
        Self {
            receiver,
            writes: Vec::new(),
            fail_at: None,
        }
    }
}

impl ChunkTransport for Loopback<'_, '_> {
    type Error = ReceiverError;

    fn write(&mut self, chunk: &[u8]) -> Result<(), ReceiverError> {
        if self.fail_at == Some(self.writes.len()) {
            return Err(ReceiverError::NotConnected);
        }
        self.writes.push(chunk.len());
        block_on(self.receiver.lock())
            .on_write(chunk)
            .map(|_: WriteOutcome| ())
    }
}

fn connect(signal: &CompletionSignal<NoopRawMutex>, mtu: u16) -> Mutex<NoopRawMutex, Receiver<'_>> {
    let mut receiver = shelftag_core::Receiver::new(
        ReceiverConfig::default(),
        Panel::default(),
        SignalScheduler::new(signal),
        Radio::default(),
    )
    .unwrap();
    receiver.start().unwrap();
    receiver.on_connect(mtu).unwrap();
    Mutex::new(receiver)
}

fn framer(mtu: u16) -> Framer {
    Framer::new(FramerConfig {
        mtu,
        ..Default::default()
    })
    .unwrap()
}

fn image(len: usize, seed: u8) -> Vec<u8> {
    (0..len).map(|i| (i as u8).wrapping_mul(31) ^ seed).collect()
}

#[test]
fn test_image_at_mtu_244() {
    let signal = CompletionSignal::new();
    let receiver = connect(&signal, 244);
    let payload = image(3812, 0x5A);

    let mut link = Loopback::new(&receiver);
    let report = framer(244).send(&mut link, &payload).unwrap();

    // 3816 stream bytes in writes of 241, then the end marker
    assert_eq!(report.writes, 17);
    assert!(report.terminated);
    assert_eq!(link.writes[..15], [241; 15]);
    assert_eq!(link.writes[15], 201);
    assert_eq!(link.writes[16], 3);

    // Nothing rendered until the completion task runs
    assert!(block_on(receiver.lock()).panel().frames.is_empty());
    let completion = block_on(drain_next(&signal, &receiver, &mut NoDelay)).unwrap();
    assert_eq!(completion.map(|c| c.len), Some(3812));

    let r = block_on(receiver.lock());
    let (black, red) = &r.panel().frames[0];
    assert_eq!(black.len(), 1906);
    assert_eq!(red.len(), 1906);
    assert_eq!(black.as_slice(), &payload[..1906]);
    assert_eq!(red.as_slice(), &payload[1906..]);
    assert_eq!(r.state(), State::Connected);
    assert_eq!(r.stats().completed, 1);
}

#[test]
fn test_full_panel_frame() {
    let signal = CompletionSignal::new();
    let receiver = connect(&signal, 185);
    let payload = image(PanelGeometry::SHELF_TAG_213.frame_len(), 1);

    framer(185).send(&mut Loopback::new(&receiver), &payload).unwrap();
    block_on(drain_next(&signal, &receiver, &mut NoDelay)).unwrap();

    let r = block_on(receiver.lock());
    assert_eq!(r.panel().frames[0].0.len(), 4000);
    assert_eq!(r.panel().frames[0].1.as_slice(), &payload[4000..]);
}

#[test]
fn test_back_to_back_transfers() {
    let signal = CompletionSignal::new();
    let receiver = connect(&signal, 64);

    for seed in 0..3u8 {
        let payload = image(500 + seed as usize * 2, seed);
        framer(64).send(&mut Loopback::new(&receiver), &payload).unwrap();
        block_on(drain_next(&signal, &receiver, &mut NoDelay)).unwrap();

        let r = block_on(receiver.lock());
        let (black, red) = r.panel().frames.last().unwrap();
        assert_eq!([black.as_slice(), red.as_slice()].concat(), payload);
    }

    let r = block_on(receiver.lock());
    assert_eq!(r.stats().completed, 3);
    // Initial advertising plus one restart per rendered frame
    assert_eq!(r.advertiser().advertised, 4);
}

#[test]
fn test_aborted_sender_recovers() {
    let signal = CompletionSignal::new();
    let receiver = connect(&signal, 100);
    let payload = image(1000, 9);

    let mut link = Loopback::new(&receiver);
    link.fail_at = Some(3);
    let result = framer(100).send(&mut link, &payload);
    assert_eq!(
        result.map(|r| r.writes),
        Err(SendError::TransportWriteFailure {
            index: 3,
            error: ReceiverError::NotConnected
        })
    );

    {
        let mut r = block_on(receiver.lock());
        assert_eq!(r.state(), State::Receiving);
        assert_eq!(r.poll(10_000), WatchdogStatus::Stalled);
        assert_eq!(r.state(), State::Connected);
    }

    framer(100).send(&mut Loopback::new(&receiver), &payload).unwrap();
    let completion = block_on(drain_next(&signal, &receiver, &mut NoDelay)).unwrap();
    assert_eq!(completion.map(|c| c.len), Some(1000));
}

#[test]
fn test_reconnect_resets_session() {
    let signal = CompletionSignal::new();
    let receiver = connect(&signal, 23);
    let payload = image(300, 3);

    let mut link = Loopback::new(&receiver);
    link.fail_at = Some(5);
    assert!(framer(23).send(&mut link, &payload).is_err());

    {
        let mut r = block_on(receiver.lock());
        r.on_disconnect().unwrap();
        r.on_disconnect().unwrap();
        assert_eq!(r.state(), State::Advertising);
        r.on_connect(23).unwrap();
    }

    framer(23).send(&mut Loopback::new(&receiver), &payload).unwrap();
    block_on(drain_next(&signal, &receiver, &mut NoDelay)).unwrap();
    let r = block_on(receiver.lock());
    assert_eq!(r.panel().frames.len(), 1);
    assert_eq!(r.stats().failed(), 0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_any_even_image_arrives_intact(
        half in proptest::collection::vec(any::<u8>(), 1..1500),
        mtu in 4u16..300,
    ) {
        let payload: Vec<u8> = half.iter().chain(half.iter().rev()).copied().collect();
        let signal = CompletionSignal::new();
        let receiver = connect(&signal, mtu);

        framer(mtu).send(&mut Loopback::new(&receiver), &payload).unwrap();
        let completion = block_on(drain_next(&signal, &receiver, &mut NoDelay)).unwrap();
        prop_assert_eq!(completion.map(|c| c.len), Some(payload.len()));

        let r = block_on(receiver.lock());
        let (black, red) = &r.panel().frames[0];
        prop_assert_eq!(black.as_slice(), &payload[..half.len()]);
        prop_assert_eq!(red.as_slice(), &payload[half.len()..]);
    }
}
