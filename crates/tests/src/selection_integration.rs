//! Integration tests for target selection and volume adjustment
//!
//! These tests run whole invocations against an in-memory audio server and
//! against recorded `pactl` output, covering the documented scenarios.

use async_trait::async_trait;
use proptest::prelude::*;
use smart_volume_core::domain::audio::Result as GatewayResult;
use smart_volume_core::domain::{
    AdjustPlan, AudioGateway, Device, Notice, Outcome, SelectOptions, Snapshot, Stream, TargetId,
    Volume, VolumeAdjuster, VolumeLimit, VolumeRequest, EXIT_NOTHING_MATCHED, EXIT_OK,
};
use smart_volume_infra::audio::pactl_json;
use std::sync::Mutex;

struct FakeServer {
    snapshot: Snapshot,
    set_calls: Mutex<Vec<(TargetId, Volume)>>,
}

impl FakeServer {
    fn new(streams: Vec<Stream>, devices: Vec<Device>) -> Self {
        Self {
            snapshot: Snapshot::new(streams, devices),
            set_calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<(TargetId, Volume)> {
        self.set_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AudioGateway for FakeServer {
    async fn snapshot(&self) -> GatewayResult<Snapshot> {
        Ok(self.snapshot.clone())
    }

    async fn set_volume(&self, target: TargetId, volume: Volume) -> GatewayResult<()> {
        self.set_calls.lock().unwrap().push((target, volume));
        Ok(())
    }
}

fn stream(index: u32, label: &str, is_playing: bool, volume: f64) -> Stream {
    Stream {
        index,
        label: label.to_string(),
        is_playing,
        volume: Volume::new(volume),
    }
}

fn device(index: u32, label: &str, is_default: bool, volume: f64) -> Device {
    Device {
        index,
        label: label.to_string(),
        is_default,
        volume: Volume::new(volume),
    }
}

fn players() -> Vec<Stream> {
    vec![
        stream(1, "Spotify-player", true, 0.50),
        stream(2, "Chrome-player", false, 0.30),
    ]
}

fn plan(patterns: &[&str], filter_active: bool, default_fallback: bool, request: VolumeRequest) -> AdjustPlan {
    let options = SelectOptions {
        filter_active,
        default_fallback,
    };
    AdjustPlan::new(patterns, options, request, VolumeLimit::default()).unwrap()
}

fn approx(actual: Volume, expected: f64) -> bool {
    (actual.fraction() - expected).abs() < 1e-9
}

async fn run(server: &FakeServer, plan: &AdjustPlan) -> Outcome {
    // VolumeAdjuster owns its gateway, so lend the fake through a reference wrapper
    struct Borrowed<'a>(&'a FakeServer);

    #[async_trait]
    impl AudioGateway for Borrowed<'_> {
        async fn snapshot(&self) -> GatewayResult<Snapshot> {
            self.0.snapshot().await
        }

        async fn set_volume(&self, target: TargetId, volume: Volume) -> GatewayResult<()> {
            self.0.set_volume(target, volume).await
        }
    }

    VolumeAdjuster::new(Borrowed(server)).run(plan).await.unwrap()
}

// ============================================================================
// DOCUMENTED SCENARIOS
// ============================================================================

#[tokio::test]
async fn test_playing_stream_matched_by_first_pattern() {
    let server = FakeServer::new(players(), Vec::new());
    let plan = plan(&["Spotify", "Chrome", ""], true, false, VolumeRequest::Relative(0.05));

    let outcome = run(&server, &plan).await;
    let adjustment = outcome.adjustment.as_ref().unwrap();

    assert_eq!(adjustment.target.label, "Spotify-player");
    assert!(approx(adjustment.volume, 0.55));
    assert_eq!(outcome.exit_code(), EXIT_OK);

    let calls = server.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, TargetId::Stream(1));
    assert!(approx(calls[0].1, 0.55));
}

#[tokio::test]
async fn test_catch_all_pattern_after_miss() {
    let server = FakeServer::new(players(), Vec::new());
    let plan = plan(&["Firefox", ""], true, false, VolumeRequest::Relative(0.05));

    let outcome = run(&server, &plan).await;
    assert_eq!(outcome.adjustment.unwrap().target.label, "Spotify-player");
}

#[tokio::test]
async fn test_fallback_to_default_device() {
    let server = FakeServer::new(
        vec![stream(1, "X", false, 0.2)],
        vec![device(7, "Speakers", true, 0.40)],
    );
    let plan = plan(&["Y"], true, true, VolumeRequest::Relative(-0.10));

    let outcome = run(&server, &plan).await;
    let adjustment = outcome.adjustment.unwrap();

    assert_eq!(adjustment.target.id, TargetId::Device(7));
    assert_eq!(adjustment.target.label, "Speakers");
    assert!(approx(adjustment.volume, 0.30));
    assert_eq!(server.calls().len(), 1);
}

#[tokio::test]
async fn test_absolute_request_is_clamped() {
    let server = FakeServer::new(vec![stream(3, "mpv", true, 0.20)], Vec::new());
    let plan = plan(&["mpv"], false, false, VolumeRequest::Absolute(1.30));

    let outcome = run(&server, &plan).await;
    assert_eq!(outcome.adjustment.unwrap().volume, Volume::new(1.0));
    assert_eq!(server.calls(), vec![(TargetId::Stream(3), Volume::new(1.0))]);
}

#[tokio::test]
async fn test_nothing_matched_leaves_server_untouched() {
    let server = FakeServer::new(players(), vec![device(7, "Speakers", true, 0.4)]);
    let plan = plan(&["Firefox"], true, false, VolumeRequest::Relative(0.05));

    let outcome = run(&server, &plan).await;
    assert!(outcome.adjustment.is_none());
    assert_eq!(outcome.exit_code(), EXIT_NOTHING_MATCHED);
    assert!(server.calls().is_empty());
}

#[tokio::test]
async fn test_dry_run_matches_normal_run_without_mutation() {
    let streams = vec![
        stream(1, "Firefox", true, 0.5),
        stream(2, "mpv", true, 0.7),
        stream(3, "Firefox Nightly", false, 0.1),
    ];
    let patterns = ["mpv", "Firefox", ""];

    let normal_server = FakeServer::new(streams.clone(), Vec::new());
    let normal = run(&normal_server, &plan(&patterns, false, false, VolumeRequest::Relative(-0.2))).await;

    let dry_server = FakeServer::new(streams, Vec::new());
    let dry_plan = plan(&patterns, false, false, VolumeRequest::Relative(-0.2)).dry_run(true);
    let dry = run(&dry_server, &dry_plan).await;

    let normal_adj = normal.adjustment.unwrap();
    let dry_adj = dry.adjustment.clone().unwrap();
    assert_eq!(normal_adj.target, dry_adj.target);
    assert_eq!(normal_adj.volume, dry_adj.volume);
    assert!(normal_adj.applied);
    assert!(!dry_adj.applied);

    assert_eq!(normal_server.calls().len(), 1);
    assert!(dry_server.calls().is_empty());

    let claimed: Vec<(&str, Vec<&str>)> = dry
        .matches
        .iter()
        .map(|m| (m.pattern.as_str(), m.labels.iter().map(String::as_str).collect()))
        .collect();
    assert_eq!(
        claimed,
        vec![
            ("mpv", vec!["mpv"]),
            ("Firefox", vec!["Firefox", "Firefox Nightly"]),
            ("", vec![]),
        ]
    );
}

#[tokio::test]
async fn test_absolute_notice_reports_resulting_volume() {
    let server = FakeServer::new(players(), Vec::new());
    let plan = plan(&["Spotify"], false, false, VolumeRequest::Relative(-0.08));

    let outcome = run(&server, &plan).await;
    let adjustment = outcome.adjustment.unwrap();

    let relative = Notice::for_adjustment(&adjustment, false, VolumeLimit::default());
    assert_eq!(relative.body, "Spotify-player: -8%");
    assert_eq!(relative.replace_key, None);

    let absolute = Notice::for_adjustment(&adjustment, true, VolumeLimit::default());
    assert_eq!(absolute.body, "Spotify-player: 42%");
    assert_eq!(absolute.replace_key, Some(TargetId::Stream(1)));
}

// ============================================================================
// RECORDED PACTL OUTPUT
// ============================================================================

const INFO: &str = r#"{"server_name":"PulseAudio (on PipeWire 1.0.5)","default_sink_name":"alsa_output.usb-headset.analog-stereo"}"#;

const SINKS: &str = r#"[
    {"index":40,"state":"IDLE","name":"alsa_output.pci.analog-stereo","description":"Speakers","mute":false,"volume":{"front-left":{"value":45875,"value_percent":"70%","db":"-9.29 dB"},"front-right":{"value":45875,"value_percent":"70%","db":"-9.29 dB"}}},
    {"index":41,"state":"RUNNING","name":"alsa_output.usb-headset.analog-stereo","description":"USB Headset","mute":false,"volume":{"front-left":{"value":32768,"value_percent":"50%","db":"-18.06 dB"},"front-right":{"value":32768,"value_percent":"50%","db":"-18.06 dB"}}}
]"#;

const SINK_INPUTS: &str = r#"[
    {"index":200,"corked":true,"volume":{"front-left":{"value":65536},"front-right":{"value":65536}},"properties":{"application.name":"Firefox","media.name":"AudioStream"}},
    {"index":201,"corked":false,"volume":{"front-left":{"value":19661},"front-right":{"value":19661}},"properties":{"application.name":"mpv","media.name":"song.flac"}}
]"#;

#[tokio::test]
async fn test_recorded_pactl_snapshot_end_to_end() {
    let snapshot = pactl_json::parse_snapshot(INFO, SINKS, SINK_INPUTS).unwrap();
    let server = FakeServer {
        snapshot,
        set_calls: Mutex::new(Vec::new()),
    };

    // paused Firefox is skipped by the activity filter
    let outcome = run(&server, &plan(&["Firefox", "mpv"], true, true, VolumeRequest::Relative(0.1))).await;
    let adjustment = outcome.adjustment.unwrap();
    assert_eq!(adjustment.target.id, TargetId::Stream(201));
    assert_eq!(adjustment.volume.percent(), 40);

    // nothing playing matches, so the default headset is changed
    let outcome = run(&server, &plan(&["vlc"], true, true, VolumeRequest::Absolute(0.25))).await;
    let adjustment = outcome.adjustment.unwrap();
    assert_eq!(adjustment.target.id, TargetId::Device(41));
    assert_eq!(adjustment.target.label, "USB Headset");

    let raw: Vec<u32> = server
        .calls()
        .iter()
        .map(|(_, volume)| pactl_json::to_raw(*volume))
        .collect();
    // 19661 / 65536 + 0.1 lands just above 26214.5
    assert_eq!(raw, vec![26215, 16384]);
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #[test]
    fn prop_no_match_without_fallback_never_mutates(
        labels in prop::collection::vec("[a-m]{1,4}", 0..6),
        delta in -1.0f64..1.0,
    ) {
        let streams = labels
            .iter()
            .enumerate()
            .map(|(i, label)| stream(i as u32, label, true, 0.5))
            .collect();
        let server = FakeServer::new(streams, vec![device(1, "Speakers", true, 0.5)]);
        // labels never contain digits
        let plan = plan(&["[0-9]"], false, false, VolumeRequest::Relative(delta));

        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let outcome = runtime.block_on(run(&server, &plan));

        prop_assert!(outcome.adjustment.is_none());
        prop_assert!(server.calls().is_empty());
    }
}
