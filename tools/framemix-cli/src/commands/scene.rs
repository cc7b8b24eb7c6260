//! Print a scene file template.

use std::path::PathBuf;

use framemix_mixer::SceneConfig;

pub fn run(output: Option<PathBuf>) -> anyhow::Result<()> {
    let template = serde_json::to_string_pretty(&SceneConfig::example())?;

    match output {
        Some(path) => {
            std::fs::write(&path, template)?;
            println!("Wrote scene template to {}", path.display());
        }
        None => println!("{template}"),
    }

    Ok(())
}
