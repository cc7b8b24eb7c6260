//! Scene configuration.
//!
//! A small JSON document describing a mixer setup — working format,
//! background, and per-slot geometry/opacity/stacking plus a test pattern
//! for drivers that synthesize their own inputs. The CLI builds its whole
//! pipeline from one of these.

use std::path::Path;

use serde::{Deserialize, Serialize};

use framemix_common::{MixError, MixResult};
use framemix_frame::{PixelFormat, TestPattern};

use crate::background::BackgroundMode;
use crate::mixer::VideoMixer;
use crate::slot::SlotId;

/// A complete mixer setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Working pixel format for the canvas and every input.
    #[serde(default = "default_format")]
    pub format: PixelFormat,

    /// Background fill under the composited slots.
    #[serde(default)]
    pub background: BackgroundMode,

    /// Input slots, in attach order.
    #[serde(default)]
    pub slots: Vec<SlotConfig>,
}

/// One input slot in a scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotConfig {
    /// Natural frame size of this input.
    pub width: u32,
    pub height: u32,

    /// Offset within the output canvas; may be negative.
    #[serde(default)]
    pub xpos: i32,
    #[serde(default)]
    pub ypos: i32,

    /// Opacity in [0.0, 1.0].
    #[serde(default = "default_alpha")]
    pub alpha: f64,

    /// Paint order; higher paints on top.
    #[serde(default)]
    pub zorder: u32,

    /// Pattern generated for this slot by synthetic drivers.
    #[serde(default = "default_pattern")]
    pub pattern: TestPattern,
}

fn default_format() -> PixelFormat {
    PixelFormat::Ayuv
}

fn default_alpha() -> f64 {
    1.0
}

fn default_pattern() -> TestPattern {
    TestPattern::LumaRamp
}

impl SceneConfig {
    /// Load and validate a scene from a JSON file.
    pub fn load(path: &Path) -> MixResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let scene: SceneConfig = serde_json::from_str(&content)?;
        scene.validate()?;
        Ok(scene)
    }

    fn validate(&self) -> MixResult<()> {
        for (idx, slot) in self.slots.iter().enumerate() {
            if slot.width == 0 || slot.height == 0 {
                return Err(MixError::scene(format!(
                    "slot {idx} has zero size ({}x{})",
                    slot.width, slot.height
                )));
            }
        }
        Ok(())
    }

    /// Build a mixer and its slots from this scene.
    ///
    /// Returned slot ids are in the same order as [`SceneConfig::slots`].
    pub fn build(&self) -> MixResult<(VideoMixer, Vec<SlotId>)> {
        self.validate()?;

        let mixer = VideoMixer::new(self.format);
        let controls = mixer.controls();
        controls.set_background(self.background);

        let mut ids = Vec::with_capacity(self.slots.len());
        for slot in &self.slots {
            let id = controls.add_slot();
            controls.set_position(id, slot.xpos, slot.ypos)?;
            controls.set_alpha(id, slot.alpha)?;
            controls.set_zorder(id, slot.zorder)?;
            ids.push(id);
        }

        Ok((mixer, ids))
    }

    /// A small two-slot demonstration scene.
    pub fn example() -> Self {
        Self {
            format: PixelFormat::Ayuv,
            background: BackgroundMode::Checker,
            slots: vec![
                SlotConfig {
                    width: 320,
                    height: 240,
                    xpos: 0,
                    ypos: 0,
                    alpha: 1.0,
                    zorder: 0,
                    pattern: TestPattern::LumaRamp,
                },
                SlotConfig {
                    width: 100,
                    height: 100,
                    xpos: 24,
                    ypos: 16,
                    alpha: 0.7,
                    zorder: 1,
                    pattern: TestPattern::Gray { luma: 180 },
                },
            ],
        }
    }
}
