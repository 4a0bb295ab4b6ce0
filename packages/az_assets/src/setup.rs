//! Sequencing of the individual asset sets.

use crate::{
    AzDir,
    http_util::Fetch,
    download::download_url_to,
    extract::extract_zip,
    layout::flatten_ctm,
    fs_util::{
        dir_exists,
        file_exists,
    },
    sources,
};
use tokio::fs::{
    create_dir_all,
    remove_dir,
};
use anyhow::{
    Context,
    Result,
};


/// What a setup step did.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum StepOutcome {
    /// Already present locally, nothing touched.
    Skipped,
    /// Extracted from an archive already on disk, no network.
    Extracted,
    /// Downloaded (and unpacked, if an archive).
    Fetched,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SetupReport {
    pub items: StepOutcome,
    pub ctm: StepOutcome,
    pub fonts: StepOutcome,
}


/// Run every step in order, stopping at the first failure.
pub async fn setup_assets<F: Fetch>(base: &AzDir, http: &mut F) -> Result<SetupReport> {
    base.ensure_present().await?;
    let items = get_items(base, http).await?;
    let ctm = get_ctm(base, http).await?;
    let fonts = get_fonts(base, http).await?;
    Ok(SetupReport { items, ctm, fonts })
}

/// Item sprites. Gated on the zip file, not the extracted directory.
pub async fn get_items<F: Fetch>(base: &AzDir, http: &mut F) -> Result<StepOutcome> {
    let zip = base.items_zip(sources::ITEMS_VERSION);
    let items = base.items_dir();

    if !file_exists(&zip).await? {
        info!("downloading nerothe (item) assets");
        let url = sources::items_url(sources::ITEMS_VERSION)?;
        download_url_to(http, url.as_str(), &zip).await?;
        if dir_exists(&items).await? {
            info!("removing previous items directory to overwrite");
            // non-recursive, a populated stale directory is an error
            remove_dir(&items).await
                .with_context(|| format!("removing {}", items.display()))?;
        }
        extract_zip(&zip, &items).await?;
        Ok(StepOutcome::Fetched)
    } else if !dir_exists(&items).await? {
        info!("extracting nerothe (item) assets from existing {}", zip.display());
        extract_zip(&zip, &items).await?;
        Ok(StepOutcome::Extracted)
    } else {
        debug!("item assets already present");
        Ok(StepOutcome::Skipped)
    }
}

/// Connected textures. Gated on the `ctm` directory existing, contents
/// unchecked.
pub async fn get_ctm<F: Fetch>(base: &AzDir, http: &mut F) -> Result<StepOutcome> {
    let ctm = base.ctm_dir();
    if dir_exists(&ctm).await? {
        debug!("CTM assets already present");
        return Ok(StepOutcome::Skipped);
    }

    info!("downloading CTM (misc/extra/criteria) assets");
    let zip = base.ctm_zip();
    download_url_to(http, sources::CTM_URL, &zip).await?;
    extract_zip(&zip, &ctm).await?;
    flatten_ctm(&ctm).await?;
    Ok(StepOutcome::Fetched)
}

/// Fonts. Always re-downloaded.
pub async fn get_fonts<F: Fetch>(base: &AzDir, http: &mut F) -> Result<StepOutcome> {
    info!("downloading fonts");
    create_dir_all(base.fonts_dir()).await?;
    download_url_to(http, sources::FONT_URL, base.font_file()).await?;
    download_url_to(http, sources::BOLD_FONT_URL, base.bold_font_file()).await?;
    info!("finished downloading fonts");
    Ok(StepOutcome::Fetched)
}


#[cfg(test)]
fn fake_remote() -> crate::test_util::FakeHttp {
    use crate::test_util::{FakeHttp, zip_bytes};

    let items_url = sources::items_url(sources::ITEMS_VERSION).unwrap();
    FakeHttp::default()
        .with(items_url.as_str(), zip_bytes(&[
            ("diamond.png", b"diamond"),
            ("tools/iron_pickaxe.png", b"pickaxe"),
        ]))
        .with(sources::CTM_URL, zip_bytes(&[
            ("ctm_aatool_1.7.5.0/", b""),
            ("ctm_aatool_1.7.5.0/assets/sprites/global/criteria/bee.png", b"bee"),
            ("ctm_aatool_1.7.5.0/assets/sprites/gif/nether.gif", b"gif"),
            ("ctm_aatool_1.7.5.0/assets/fonts/unused.ttf", b"font"),
        ]))
        .with(sources::FONT_URL, "regular")
        .with(sources::BOLD_FONT_URL, "bold")
}

#[cfg(test)]
fn test_base() -> (tempfile::TempDir, AzDir) {
    let tmp = tempfile::tempdir().unwrap();
    let base = AzDir(tmp.path().join("az"));
    std::fs::create_dir(&base.0).unwrap();
    (tmp, base)
}

#[cfg(test)]
fn dir_names(path: &std::path::Path) -> Vec<String> {
    let mut names = std::fs::read_dir(path).unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect::<Vec<_>>();
    names.sort();
    names
}

#[tokio::test]
async fn test_clean_setup() {
    let (_tmp, base) = test_base();
    let mut http = fake_remote();

    let report = setup_assets(&base, &mut http).await.unwrap();
    assert_eq!(report, SetupReport {
        items: StepOutcome::Fetched,
        ctm: StepOutcome::Fetched,
        fonts: StepOutcome::Fetched,
    });

    assert_eq!(std::fs::read(base.items_dir().join("diamond.png")).unwrap(), b"diamond");
    assert_eq!(
        std::fs::read(base.items_dir().join("tools/iron_pickaxe.png")).unwrap(),
        b"pickaxe",
    );
    assert_eq!(dir_names(&base.ctm_dir()), vec!["sprites"]);
    assert_eq!(
        std::fs::read(base.ctm_sprites_dir().join("global/criteria/bee.png")).unwrap(),
        b"bee",
    );
    assert_eq!(std::fs::read(base.font_file()).unwrap(), b"regular");
    assert_eq!(std::fs::read(base.bold_font_file()).unwrap(), b"bold");
    assert!(base.items_zip(sources::ITEMS_VERSION).is_file());
    assert!(base.ctm_zip().is_file());
    assert!(base.missing_assets().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_second_run_only_fetches_fonts() {
    let (_tmp, base) = test_base();
    let mut http = fake_remote();
    setup_assets(&base, &mut http).await.unwrap();
    http.requests.clear();

    let report = setup_assets(&base, &mut http).await.unwrap();
    assert_eq!(report, SetupReport {
        items: StepOutcome::Skipped,
        ctm: StepOutcome::Skipped,
        fonts: StepOutcome::Fetched,
    });
    assert_eq!(http.requests, vec![
        sources::FONT_URL.to_owned(),
        sources::BOLD_FONT_URL.to_owned(),
    ]);
}

#[tokio::test]
async fn test_items_extracted_from_existing_zip() {
    let (_tmp, base) = test_base();
    let mut http = fake_remote();
    setup_assets(&base, &mut http).await.unwrap();
    std::fs::remove_dir_all(base.items_dir()).unwrap();
    http.requests.clear();

    assert_eq!(get_items(&base, &mut http).await.unwrap(), StepOutcome::Extracted);
    assert!(http.requests.is_empty());
    assert_eq!(std::fs::read(base.items_dir().join("diamond.png")).unwrap(), b"diamond");
}

#[tokio::test]
async fn test_items_replaces_empty_stale_dir() {
    let (_tmp, base) = test_base();
    let mut http = fake_remote();
    std::fs::create_dir(base.items_dir()).unwrap();

    assert_eq!(get_items(&base, &mut http).await.unwrap(), StepOutcome::Fetched);
    assert_eq!(std::fs::read(base.items_dir().join("diamond.png")).unwrap(), b"diamond");
}

#[tokio::test]
async fn test_items_fails_on_populated_stale_dir() {
    let (_tmp, base) = test_base();
    let mut http = fake_remote();
    std::fs::create_dir(base.items_dir()).unwrap();
    std::fs::write(base.items_dir().join("stale.png"), b"stale").unwrap();

    assert!(get_items(&base, &mut http).await.is_err());
    assert!(base.items_dir().join("stale.png").is_file());
}

#[tokio::test]
async fn test_empty_ctm_dir_counts_as_present() {
    let (_tmp, base) = test_base();
    let mut http = fake_remote();
    std::fs::create_dir(base.ctm_dir()).unwrap();

    assert_eq!(get_ctm(&base, &mut http).await.unwrap(), StepOutcome::Skipped);
    assert_eq!(http.count(sources::CTM_URL), 0);
    assert!(dir_names(&base.ctm_dir()).is_empty());
}

#[tokio::test]
async fn test_ctm_with_two_wrappers_fails() {
    use crate::test_util::zip_bytes;

    let (_tmp, base) = test_base();
    let mut http = fake_remote().with(sources::CTM_URL, zip_bytes(&[
        ("a/assets/sprites/x.png", b"x"),
        ("b/assets/sprites/y.png", b"y"),
    ]));

    assert!(get_ctm(&base, &mut http).await.is_err());
}

#[tokio::test]
async fn test_refetch_fonts_only() {
    let (_tmp, base) = test_base();
    let mut http = fake_remote();
    setup_assets(&base, &mut http).await.unwrap();
    std::fs::remove_dir_all(base.fonts_dir()).unwrap();
    http.requests.clear();

    let report = setup_assets(&base, &mut http).await.unwrap();
    assert_eq!(report.items, StepOutcome::Skipped);
    assert_eq!(report.ctm, StepOutcome::Skipped);
    assert_eq!(http.count(sources::FONT_URL), 1);
    assert_eq!(http.count(sources::BOLD_FONT_URL), 1);
    assert_eq!(http.requests.len(), 2);
    assert_eq!(std::fs::read(base.bold_font_file()).unwrap(), b"bold");
}

#[tokio::test]
async fn test_missing_base_dir() {
    let tmp = tempfile::tempdir().unwrap();
    let base = AzDir(tmp.path().join("az"));
    let mut http = fake_remote();

    assert!(setup_assets(&base, &mut http).await.is_err());
    assert!(http.requests.is_empty());
    assert!(!base.0.exists());
}

#[tokio::test]
async fn test_failure_stops_later_steps() {
    let (_tmp, base) = test_base();
    let mut http = fake_remote();
    http.responses.remove(sources::CTM_URL);

    assert!(setup_assets(&base, &mut http).await.is_err());
    assert!(base.items_dir().is_dir());
    assert_eq!(http.count(sources::FONT_URL), 0);
    assert!(!base.fonts_dir().exists());
}
