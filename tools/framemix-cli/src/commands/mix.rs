//! Mix a scene of synthetic sources into output frames.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

use framemix_common::tick::{RunClock, TickPacer};
use framemix_frame::VideoFrame;
use framemix_mixer::{CycleOutput, QueueSupplier, SceneConfig};

pub fn run(
    scene_path: PathBuf,
    frames: u64,
    fps: u32,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let scene = SceneConfig::load(&scene_path)
        .map_err(|e| anyhow::anyhow!("Failed to load scene: {e}"))?;
    let (mut mixer, slot_ids) = scene
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build scene: {e}"))?;

    println!("Mixing scene: {}", scene_path.display());
    println!("  Format: {}", scene.format);
    println!("  Slots: {}", scene.slots.len());
    println!("  Ticks: {frames} @ {fps}fps");

    // One generated frame per slot, re-supplied every tick. The patterns are
    // deterministic, so regenerating per tick would only waste time.
    let sources: Vec<Arc<VideoFrame>> = scene
        .slots
        .iter()
        .map(|slot| {
            slot.pattern
                .generate(scene.format, slot.width, slot.height)
                .map(Arc::new)
        })
        .collect::<Result<_, _>>()
        .map_err(|e| anyhow::anyhow!("Failed to generate source pattern: {e}"))?;

    let mut writer = match &output {
        Some(path) => Some(BufWriter::new(File::create(path)?)),
        None => None,
    };

    let clock = RunClock::start();
    let mut pacer = TickPacer::new(fps);
    let mut supplier = QueueSupplier::new();
    let mut emitted = 0u64;
    let mut skipped = 0u64;
    let mut bytes_written = 0usize;
    let mut last_geometry = None;

    for _ in 0..frames {
        for (id, source) in slot_ids.iter().zip(&sources) {
            supplier.push(*id, Arc::clone(source));
        }
        let pts_ns = pacer.advance();

        match mixer.mix_cycle(&mut supplier)? {
            CycleOutput::Frame(out) => {
                emitted += 1;
                last_geometry = Some(out.geometry);
                if let Some(w) = writer.as_mut() {
                    for plane in out.frame.planes() {
                        w.write_all(&plane.data)?;
                        bytes_written += plane.data.len();
                    }
                }
                tracing::debug!(sequence = out.sequence, pts_ns, "emitted frame");
            }
            CycleOutput::Skipped(reason) => {
                skipped += 1;
                tracing::debug!(?reason, "cycle skipped");
            }
        }
    }

    if let Some(w) = writer.as_mut() {
        w.flush()?;
    }

    println!();
    println!("Mix complete:");
    println!("  Started: {}", clock.epoch_wall());
    if let Some(g) = last_geometry {
        println!("  Canvas: {}x{}", g.width, g.height);
    }
    println!("  Frames emitted: {emitted} ({skipped} skipped)");
    println!(
        "  Covers: {:.2}s of output",
        RunClock::ns_to_secs(pacer.peek_pts_ns())
    );
    if let Some(path) = &output {
        println!("  Wrote: {} ({bytes_written} bytes)", path.display());
    }
    println!("  Elapsed: {:.2}s", clock.elapsed_secs());

    Ok(())
}
