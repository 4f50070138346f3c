//! VCS emulator entry point.
//!
//! Loads a ROM image and runs it with a display window and audio output.
//! Usage: halcyon <path/to/game.bin>

use std::time::{Duration, Instant};
use std::{env, fs, process};

use ansi_term::Colour::Red;
use halcyon::tia::palette::ntsc_rgb;
use halcyon::tia::tia::{FRAME_HEIGHT, FRAME_WIDTH};
use halcyon::{Console, InputState};
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, Sink};

/// NTSC field rate is ~59.92 Hz; one frame per 16.67 ms is close enough.
const FRAME_DURATION: Duration = Duration::from_nanos(16_666_667);
/// Two samples per scanline at 262 lines and ~60 fps.
const AUDIO_RATE: u32 = 31_440;

fn main() {
    env_logger::init();
    if let Err(message) = run() {
        eprintln!("{} {}", Red.bold().paint("error:"), message);
        process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let path = env::args()
        .nth(1)
        .ok_or_else(|| "usage: halcyon <path/to/game.bin>".to_string())?;
    let rom = fs::read(&path).map_err(|e| format!("{path}: {e}"))?;
    let mut console = Console::load(&rom).map_err(|e| e.to_string())?;

    let mut window = Window::new(
        "Halcyon",
        FRAME_WIDTH,
        FRAME_HEIGHT,
        WindowOptions {
            borderless: false,
            resize: true,
            scale: minifb::Scale::X4,
            scale_mode: minifb::ScaleMode::AspectRatioStretch,
            topmost: false,
            title: true,
            transparency: false,
            none: false,
        },
    )
    .map_err(|e| e.to_string())?;
    window.set_target_fps(60);

    let (_stream, stream_handle) = OutputStream::try_default().map_err(|e| e.to_string())?;
    let sink = Sink::try_new(&stream_handle).map_err(|e| e.to_string())?;

    let mut rgb = vec![0u32; FRAME_WIDTH * FRAME_HEIGHT];
    let mut saved_state: Option<Vec<u8>> = None;

    while window.is_open() && !window.is_key_down(Key::Escape) {
        let frame_start = Instant::now();

        console.set_input(read_input(&window));

        if window.is_key_pressed(Key::F5, KeyRepeat::No) {
            match console.snapshot() {
                Ok(bytes) => {
                    log::info!("state saved ({} bytes)", bytes.len());
                    saved_state = Some(bytes);
                }
                Err(e) => log::error!("snapshot failed: {e}"),
            }
        }
        if window.is_key_pressed(Key::F7, KeyRepeat::No) {
            if let Some(bytes) = &saved_state {
                match console.restore(bytes) {
                    Ok(()) => log::info!("state restored"),
                    Err(e) => log::error!("restore failed: {e}"),
                }
            }
        }
        if window.is_key_pressed(Key::F9, KeyRepeat::No) {
            console.reset();
        }

        console.run_frame().map_err(|e| e.to_string())?;

        for (dst, &src) in rgb.iter_mut().zip(console.frame_buffer()) {
            *dst = ntsc_rgb(src);
        }
        window
            .update_with_buffer(&rgb, FRAME_WIDTH, FRAME_HEIGHT)
            .map_err(|e| e.to_string())?;

        let samples = console.drain_audio();
        if !samples.is_empty() {
            sink.append(SamplesBuffer::new(1, AUDIO_RATE, samples));
        }

        // Pace to ~60 fps; emulation runs far faster than the real machine.
        let elapsed = frame_start.elapsed();
        if elapsed < FRAME_DURATION {
            std::thread::sleep(FRAME_DURATION - elapsed);
        }
    }
    Ok(())
}

/// Keyboard map: arrows + space drive the left joystick, WASD + left shift
/// the right one, F1/F2 the console Reset/Select switches.
fn read_input(window: &Window) -> InputState {
    let mut input = InputState::default();

    input.joysticks[0].up = window.is_key_down(Key::Up);
    input.joysticks[0].down = window.is_key_down(Key::Down);
    input.joysticks[0].left = window.is_key_down(Key::Left);
    input.joysticks[0].right = window.is_key_down(Key::Right);
    input.joysticks[0].fire = window.is_key_down(Key::Space);

    input.joysticks[1].up = window.is_key_down(Key::W);
    input.joysticks[1].down = window.is_key_down(Key::S);
    input.joysticks[1].left = window.is_key_down(Key::A);
    input.joysticks[1].right = window.is_key_down(Key::D);
    input.joysticks[1].fire = window.is_key_down(Key::LeftShift);

    input.switches.reset = window.is_key_down(Key::F1);
    input.switches.select = window.is_key_down(Key::F2);

    input
}
