//! List supported working pixel formats.

use framemix_frame::PixelFormat;

pub fn run() -> anyhow::Result<()> {
    println!("Framemix Working Formats");
    println!("{}", "=".repeat(50));

    for format in PixelFormat::ALL {
        let layout = match format.packed_layout() {
            Some(layout) => format!("packed, {} bytes/pixel", layout.bytes_per_pixel),
            None => format!("planar, {} planes", format.plane_count()),
        };
        let alpha = if format.has_alpha() {
            "alpha"
        } else {
            "no alpha"
        };
        println!("  {format:<6} {layout}, {alpha}");
    }

    println!();
    println!("Every input frame must arrive in the canvas's working format;");
    println!("format conversion belongs to an upstream collaborator.");

    Ok(())
}
