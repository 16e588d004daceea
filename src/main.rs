/*
 *  main.rs
 *
 *  unicornhatmini - two chips, one picture
 *  (c) 2020-26 unicornhatmini contributors
 *
 *  Demo runner: animate the display until told to stop
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::{error, info};
use tokio::signal::unix::{signal, SignalKind};
use tokio::time::MissedTickBehavior;

use unicornhatmini::config::{self, Cli, DEFAULT_BRIGHTNESS, DEFAULT_FPS};
use unicornhatmini::demo::{Frame, Pattern};
use unicornhatmini::display::{hardware, HardwareDisplay};

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// Waits for SIGINT, SIGTERM or SIGHUP.
async fn signal_handler() -> anyhow::Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT received. Initiating graceful shutdown.");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received. Initiating graceful shutdown.");
        }
        _ = sighup.recv() => {
            info!("SIGHUP received. Initiating graceful shutdown.");
        }
    }
    Ok(())
}

/// Render and flush one frame per tick, forever
async fn demo_loop(display: &mut HardwareDisplay, pattern: Pattern, fps: u32) {
    let mut ticker = tokio::time::interval(Duration::from_micros(1_000_000 / u64::from(fps.max(1))));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let start = Instant::now();
    let mut step: u64 = 0;
    loop {
        ticker.tick().await;
        step = step.wrapping_add(1);

        let frame = Frame { seconds: start.elapsed().as_secs_f64(), step };
        pattern.render(display, frame);

        if let Err(e) = display.show() {
            error!("Error showing display: {}", e);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli).context("loading configuration")?;

    if cli.dump_config {
        println!("{}", config::dump(&cfg)?);
        return Ok(());
    }

    let level = cfg.log_level.clone().unwrap_or_else(|| "info".to_string());
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();

    info!("{} v.{} built {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), BUILD_DATE);

    let display_cfg = cfg.display.clone().unwrap_or_default();
    let demo_cfg = cfg.demo.clone().unwrap_or_default();
    let pattern = demo_cfg.pattern.unwrap_or_default();
    let fps = demo_cfg.fps.unwrap_or(DEFAULT_FPS);

    let mut display = hardware::open(&display_cfg).context("opening display")?;
    display
        .set_brightness(display_cfg.brightness.unwrap_or(DEFAULT_BRIGHTNESS))
        .context("setting brightness")?;
    display
        .set_rotation(display_cfg.rotate_deg.unwrap_or(0))
        .context("setting rotation")?;

    info!("Running {:?} at {} fps, Ctrl+C to exit", pattern, fps);

    let stopped = tokio::select! {
        res = signal_handler() => res,
        _ = demo_loop(&mut display, pattern, fps) => Ok(()),
    };
    if let Err(e) = &stopped {
        error!("Signal handling failed: {:#}", e);
    }

    info!("Shutting down...");
    let closed = display.close().context("closing display");

    stopped.and(closed)
}
