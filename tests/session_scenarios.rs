use std::io::Cursor;
use std::sync::Arc;
use std::time::{Duration, Instant};

use assert_approx_eq::assert_approx_eq;
use pretty_assertions::assert_eq;

use spectrum_player::audio::{Clip, ClipInfo, SimulatedOutput};
use spectrum_player::playback::{CommandOutcome, IgnoreReason, ManualTime, PlaybackPhase};
use spectrum_player::render::{DisplayMode, DrawList, DrawOp};
use spectrum_player::{LoadStatus, Session, SessionSettings};

fn session() -> (Arc<ManualTime>, Session) {
    let time = Arc::new(ManualTime::new());
    let sim_time = time.clone();
    let session = Session::create(SessionSettings::default(), time.clone(), move |tap| {
        Box::new(SimulatedOutput::new(sim_time, tap))
    });
    (time, session)
}

fn advance(time: &ManualTime, session: &mut Session, seconds: f64) -> usize {
    let mut finished = 0;
    for _ in 0..(seconds / 0.01).round() as usize {
        time.advance(0.01);
        if session.update().finished {
            finished += 1;
        }
    }
    finished
}

fn mono_wav(sample_rate: u32, seconds: u32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        let len = sample_rate * seconds;
        for i in 0..len {
            let t = i as f32 / sample_rate as f32;
            let s = (2.0 * std::f32::consts::PI * 440.0 * t).sin();
            writer.write_sample((s * i16::MAX as f32 * 0.5) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

#[test]
fn ten_second_clip_walkthrough() {
    let (time, mut s) = session();
    s.install_clip(Clip::from_samples(vec![0.0; 10_000], 1000), "ten.wav");

    s.play();
    assert_eq!(advance(&time, &mut s, 3.0), 0);
    s.pause();
    assert_approx_eq!(s.elapsed(), 3.0, 1e-6);

    s.seek(7.0);
    assert_approx_eq!(s.elapsed(), 7.0);
    assert_approx_eq!(s.progress_ratio(), 0.7);

    s.play();
    assert_eq!(advance(&time, &mut s, 3.5), 1);
    assert_eq!(s.phase(), PlaybackPhase::Stopped);
    assert_eq!(s.elapsed(), 0.0);
    assert_eq!(s.progress_ratio(), 0.0);
    assert!(!s.progress_running());
}

#[test]
fn pause_resume_is_continuous() {
    let (time, mut s) = session();
    s.install_clip(Clip::from_samples(vec![0.0; 20_000], 1000), "long.wav");

    s.play();
    advance(&time, &mut s, 2.0);
    s.pause();
    let at_pause = s.elapsed();
    time.advance(5.0);
    assert_eq!(s.elapsed(), at_pause);

    s.play();
    advance(&time, &mut s, 1.5);
    assert_approx_eq!(s.elapsed(), at_pause + 1.5, 1e-6);
}

#[test]
fn decoded_wav_drives_the_spectrum() {
    let (time, mut s) = session();
    let info = s.load_bytes("tone.wav", mono_wav(8000, 2), Some("wav")).unwrap();
    assert_eq!(
        info,
        ClipInfo {
            duration: 2.0,
            sample_rate: 8000
        }
    );
    assert_eq!(s.status(), &LoadStatus::Loaded("tone.wav".to_string()));

    s.toggle_mode();
    assert_eq!(s.display().mode, DisplayMode::Grouped);
    s.play();
    advance(&time, &mut s, 0.6);

    let mut list = DrawList::new();
    s.render_frame(&mut list, 1280.0, 720.0);
    let tallest = list
        .ops()
        .iter()
        .filter_map(|op| match op {
            DrawOp::FillRect(rect, _) => Some(rect.height),
            _ => None,
        })
        .fold(0.0, f64::max);
    assert!(tallest > 0.0, "a 440 Hz tone lights up at least one bar");
    // Nyquist of an 8 kHz clip.
    assert!(list.texts().any(|t| t == "4"));
    assert!(!list.texts().any(|t| t == "5"));
}

#[test]
fn background_decode_enables_controls() {
    let (_time, mut s) = session();
    let path = std::env::temp_dir().join(format!("spectrum_player_it_{}.wav", std::process::id()));
    std::fs::write(&path, mono_wav(4000, 1)).unwrap();

    s.begin_load(&path);
    assert!(matches!(s.status(), LoadStatus::Decoding(_)));
    assert_eq!(s.play(), CommandOutcome::Ignored(IgnoreReason::NoClipLoaded));

    let started = Instant::now();
    while s.is_loading() && started.elapsed() < Duration::from_secs(10) {
        s.update();
        std::thread::sleep(Duration::from_millis(5));
    }
    std::fs::remove_file(&path).ok();

    assert!(s.controls_enabled());
    assert_approx_eq!(s.clip_info().unwrap().duration, 1.0);
    assert!(s.status_message().starts_with("LOADED"));
}
