//! Initialize a site layout

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::config::SiteConfig;
use crate::templates::DEFAULT_TEMPLATE;
use crate::CONFIG_FILE;

/// Create the posts directory, `_config.yml` and the post template.
///
/// Existing files are left untouched.
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config = SiteConfig::default();

    fs::create_dir_all(target_dir.join(&config.posts_dir))?;

    let config_path = target_dir.join(CONFIG_FILE);
    if config_path.exists() {
        tracing::info!("Keeping existing {:?}", config_path);
    } else {
        let header = "# postwrap configuration\n";
        fs::write(&config_path, format!("{}{}", header, serde_yaml::to_string(&config)?))?;
        tracing::info!("Created {:?}", config_path);
    }

    let template_path = target_dir.join(&config.template);
    if template_path.exists() {
        tracing::info!("Keeping existing {:?}", template_path);
    } else {
        if let Some(parent) = template_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&template_path, DEFAULT_TEMPLATE)?;
        tracing::info!("Created {:?}", template_path);
    }

    Ok(())
}
