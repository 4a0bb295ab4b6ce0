
#[macro_use]
extern crate tracing;

mod fs_util;
mod http_util;
mod download;
mod extract;
mod layout;
mod setup;
pub mod sources;

#[cfg(test)]
mod test_util;

pub use crate::{
    http_util::Fetch,
    download::download_url_to,
    extract::extract_zip,
    layout::flatten_ctm,
    setup::{
        setup_assets,
        get_items,
        get_ctm,
        get_fonts,
        SetupReport,
        StepOutcome,
    },
};
use std::path::PathBuf;
use anyhow::{
    Result,
    ensure,
};


const DEFAULT_AZ_DIR: &'static str = "az";
const ITEMS_SUBDIR: &'static str = "items";
const CTM_SUBDIR: &'static str = "ctm";
const CTM_ZIP: &'static str = "ctm.zip";
const SPRITES_SUBDIR: &'static str = "sprites";
const FONTS_SUBDIR: &'static str = "fonts";
const FONT_FILE: &'static str = "minecraft.otf";
const BOLD_FONT_FILE: &'static str = "minecraft-bold.otf";


/// Base directory which all downloaded assets are placed relative to.
///
/// Must already exist. Nothing in this crate changes the process working
/// directory; every operation takes the base explicitly.
#[derive(Debug, Clone)]
pub struct AzDir(pub PathBuf);

impl AzDir {
    pub fn new() -> Self {
        AzDir(PathBuf::from(DEFAULT_AZ_DIR))
    }

    pub fn subdir(&self, subdir: &str) -> PathBuf {
        self.0.join(subdir)
    }

    pub fn items_zip(&self, version: &str) -> PathBuf {
        self.0.join(format!("{}.items.zip", version))
    }

    pub fn items_dir(&self) -> PathBuf {
        self.subdir(ITEMS_SUBDIR)
    }

    pub fn ctm_zip(&self) -> PathBuf {
        self.subdir(CTM_ZIP)
    }

    pub fn ctm_dir(&self) -> PathBuf {
        self.subdir(CTM_SUBDIR)
    }

    pub fn ctm_sprites_dir(&self) -> PathBuf {
        self.ctm_dir().join(SPRITES_SUBDIR)
    }

    pub fn fonts_dir(&self) -> PathBuf {
        self.subdir(FONTS_SUBDIR)
    }

    pub fn font_file(&self) -> PathBuf {
        self.fonts_dir().join(FONT_FILE)
    }

    pub fn bold_font_file(&self) -> PathBuf {
        self.fonts_dir().join(BOLD_FONT_FILE)
    }

    /// Ensure the base directory itself exists and is a directory.
    pub async fn ensure_present(&self) -> Result<()> {
        ensure!(
            fs_util::dir_exists(&self.0).await?,
            "asset base directory {} does not exist",
            self.0.display(),
        );
        Ok(())
    }

    /// List the asset paths the overlay reads at startup which are not present
    /// locally. Only checks existence, same as the download steps do.
    pub async fn missing_assets(&self) -> Result<Vec<PathBuf>> {
        let expected = [
            self.items_dir(),
            self.ctm_sprites_dir(),
            self.font_file(),
            self.bold_font_file(),
        ];
        let mut missing = Vec::new();
        for path in expected {
            if !fs_util::exists(&path).await? {
                missing.push(path);
            }
        }
        Ok(missing)
    }

    /// Download and unpack everything into this directory.
    pub async fn setup_assets<F: Fetch>(&self, http: &mut F) -> Result<SetupReport> {
        setup::setup_assets(self, http).await
    }
}

impl Default for AzDir {
    fn default() -> Self {
        AzDir::new()
    }
}


#[tokio::test]
async fn test_missing_assets() {
    let tmp = tempfile::tempdir().unwrap();
    let base = AzDir(tmp.path().to_owned());
    assert_eq!(base.missing_assets().await.unwrap().len(), 4);

    std::fs::create_dir_all(base.ctm_sprites_dir()).unwrap();
    std::fs::create_dir_all(base.fonts_dir()).unwrap();
    std::fs::write(base.font_file(), b"font").unwrap();
    assert_eq!(
        base.missing_assets().await.unwrap(),
        vec![base.items_dir(), base.bold_font_file()],
    );
}

#[tokio::test]
async fn test_ensure_present() {
    let tmp = tempfile::tempdir().unwrap();
    AzDir(tmp.path().to_owned()).ensure_present().await.unwrap();
    assert!(AzDir(tmp.path().join("az")).ensure_present().await.is_err());
}
