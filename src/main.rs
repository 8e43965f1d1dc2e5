// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::{crate_version, Parser, Subcommand};

use gridtone::audio;
use gridtone::config::Layout;
use gridtone::grid::Pad;
use gridtone::input;
use gridtone::instrument::Instrument;
use gridtone::led::console::ConsoleSink;
use gridtone::led::{Animation, AnimationScheduler, Color, Curve};
use gridtone::playsync::CancelHandle;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "A button-grid instrument."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Starts the instrument with a terminal grid and stdin controller.
    Start {
        /// The path to the layout config.
        layout_path: PathBuf,
        /// The audio output device name.
        #[arg(short, long, default_value = "default")]
        device: String,
    },
    /// Runs an animation showcase on the terminal grid.
    Demo {
        /// The path to the layout config.
        layout_path: PathBuf,
    },
    /// Verifies a layout and prints its grid.
    Check {
        /// The path to the layout config.
        layout_path: PathBuf,
    },
    /// Lists the available audio output devices.
    Devices {},
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Start {
            layout_path,
            device,
        } => {
            let layout = Layout::load(&layout_path)?;
            let device = audio::get_device(&device)?;
            let sink = Arc::new(ConsoleSink::new(layout.grid_size()));
            let instrument = Instrument::new(layout, device, sink)?;

            let cancel_handle = CancelHandle::new();
            let events = input::spawn_stdin_controller(cancel_handle.clone());
            println!("Type 'press X Y', 'release X Y', or 'quit'.");
            instrument.run(events, cancel_handle);
        }
        Commands::Demo { layout_path } => {
            let layout = Layout::load(&layout_path)?;
            run_demo(&layout);
        }
        Commands::Check { layout_path } => {
            let layout = Layout::load(&layout_path)?;
            println!("Layout: {}", layout.name());
            println!(
                "Grid: {size}x{size} at {fps} fps",
                size = layout.grid_size(),
                fps = layout.fps()
            );
            println!("{}", layout.ascii_grid());
        }
        Commands::Devices {} => {
            let devices = audio::list_devices()?;

            if devices.is_empty() {
                println!("No devices found.");
                return Ok(());
            }

            println!("Devices:");
            for device in devices {
                println!("- {}", device);
            }
        }
    }

    Ok(())
}

/// Cycles each animation kind across the terminal grid.
fn run_demo(layout: &Layout) {
    let size = layout.grid_size();
    let sink = Arc::new(ConsoleSink::new(size));
    let scheduler = AnimationScheduler::new(sink, layout.fps());
    for y in 0..size {
        for x in 0..size {
            let pad = Pad::new(x, y);
            scheduler.set_idle_color(pad, layout.idle_color(pad));
        }
    }
    scheduler.start_ticker();

    let all_pads: Vec<Pad> = (0..size)
        .flat_map(|y| (0..size).map(move |x| Pad::new(x, y)))
        .collect();
    let center = Pad::new(size / 2, size / 2);
    let hold = Duration::from_secs(3);

    for pad in &all_pads {
        scheduler.start(
            Animation::Breathe {
                color: Color::new(0, 180, 120),
                period: Duration::from_secs(2),
                min_brightness: 0.3,
            },
            vec![*pad],
        );
    }
    thread::sleep(hold);

    scheduler.start(
        Animation::Wave {
            color: Color::new(40, 80, 255),
            period: Duration::from_secs(2),
            phase_offset: Duration::from_millis(200),
        },
        all_pads.clone(),
    );
    thread::sleep(hold);

    scheduler.start(
        Animation::Ripple {
            center,
            color: Color::new(255, 120, 0),
            radius: size as f32,
            duration: Duration::from_secs(2),
            fade_out: true,
        },
        all_pads.clone(),
    );
    thread::sleep(hold);

    for pad in &all_pads {
        scheduler.start(
            Animation::Sparkle {
                color: Color::new(220, 220, 255),
                duration: Some(hold),
                intensity: 0.6,
            },
            vec![*pad],
        );
    }
    thread::sleep(hold);

    for pad in &all_pads {
        scheduler.start(Animation::RainbowCycle { period: Duration::from_secs(3) }, vec![*pad]);
    }
    thread::sleep(hold);

    scheduler.start(
        Animation::Strobe {
            color: Color::WHITE,
            frequency: 4.0,
            duration: Duration::from_secs(2),
        },
        vec![center],
    );
    thread::sleep(hold);

    for pad in &all_pads {
        scheduler.start(
            Animation::Pulse {
                color: Color::new(255, 0, 120),
                duration: Duration::from_millis(800),
                max_brightness: 1.5,
            },
            vec![*pad],
        );
    }
    thread::sleep(Duration::from_secs(1));

    for pad in &all_pads {
        scheduler.start(
            Animation::Fade {
                from: Color::WHITE,
                to: layout.idle_color(*pad),
                duration: Duration::from_secs(1),
                curve: Curve::EaseOut,
            },
            vec![*pad],
        );
    }
    thread::sleep(Duration::from_secs(2));

    scheduler.shutdown();
}
