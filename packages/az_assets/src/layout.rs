//! Flattening of the connected textures archive.
//!
//! The archive unpacks to a single generated wrapper directory:
//!
//! ```text
//! ctm/
//!   ctm_aatool_.../
//!     assets/
//!       sprites/
//!       ...
//! ```
//!
//! Of that, only `assets/sprites` is kept, moved up to `ctm/sprites`.

use crate::fs_util::dir_exists;
use std::path::Path;
use tokio::fs::{
    read_dir,
    rename,
    remove_dir_all,
};
use anyhow::{
    Context,
    Result,
    ensure,
};


const SPRITES: &'static str = "sprites";


/// Move `<wrapper>/assets/sprites` to `sprites` within `ctm_dir` and delete the
/// wrapper. Fails unless `ctm_dir` holds exactly one entry, a directory.
pub async fn flatten_ctm<P: AsRef<Path>>(ctm_dir: P) -> Result<()> {
    let ctm_dir = ctm_dir.as_ref();
    info!("cleaning up CTM assets");

    let mut entries = Vec::new();
    let mut read_dir = read_dir(ctm_dir).await
        .with_context(|| format!("listing {}", ctm_dir.display()))?;
    while let Some(entry) = read_dir.next_entry().await? {
        entries.push(entry.path());
    }
    ensure!(
        entries.len() == 1,
        "expected exactly 1 top-level entry in {}, found {}",
        ctm_dir.display(),
        entries.len(),
    );
    let wrapper = entries.pop().unwrap();
    ensure!(
        dir_exists(&wrapper).await?,
        "top-level entry {} is not a directory",
        wrapper.display(),
    );
    let target = ctm_dir.join(SPRITES);
    ensure!(
        wrapper != target,
        "top-level entry {} would be replaced by the sprites it contains",
        wrapper.display(),
    );

    let sprites = wrapper.join("assets").join(SPRITES);
    ensure!(
        dir_exists(&sprites).await?,
        "CTM archive has no assets/sprites directory under {}",
        wrapper.display(),
    );
    debug!("moving {} to sprites", sprites.display());
    rename(&sprites, &target).await
        .with_context(|| format!("moving {}", sprites.display()))?;
    remove_dir_all(&wrapper).await
        .with_context(|| format!("removing {}", wrapper.display()))?;
    Ok(())
}


#[tokio::test]
async fn test_flatten_ctm() {
    let tmp = tempfile::tempdir().unwrap();
    let ctm = tmp.path().join("ctm");
    let wrapper = ctm.join("ctm_aatool_1.7.5.0");
    std::fs::create_dir_all(wrapper.join("assets/sprites/global/criteria")).unwrap();
    std::fs::create_dir_all(wrapper.join("assets/fonts")).unwrap();
    std::fs::write(wrapper.join("assets/sprites/global/criteria/bee.png"), b"bee").unwrap();
    std::fs::write(wrapper.join("assets/fonts/unused.ttf"), b"font").unwrap();
    std::fs::write(wrapper.join("readme.txt"), b"hi").unwrap();

    flatten_ctm(&ctm).await.unwrap();

    let names = std::fs::read_dir(&ctm).unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["sprites".to_owned()]);
    assert_eq!(std::fs::read(ctm.join("sprites/global/criteria/bee.png")).unwrap(), b"bee");
}

#[tokio::test]
async fn test_flatten_ctm_empty() {
    let tmp = tempfile::tempdir().unwrap();
    assert!(flatten_ctm(tmp.path()).await.is_err());
}

#[tokio::test]
async fn test_flatten_ctm_ambiguous() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(tmp.path().join("a/assets/sprites")).unwrap();
    std::fs::create_dir_all(tmp.path().join("b/assets/sprites")).unwrap();

    assert!(flatten_ctm(tmp.path()).await.is_err());
    assert!(tmp.path().join("a/assets/sprites").is_dir());
    assert!(tmp.path().join("b/assets/sprites").is_dir());
}

#[tokio::test]
async fn test_flatten_ctm_no_sprites() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(tmp.path().join("wrapper/assets/other")).unwrap();

    assert!(flatten_ctm(tmp.path()).await.is_err());
    assert!(tmp.path().join("wrapper").is_dir());
}

#[tokio::test]
async fn test_flatten_ctm_file_entry() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("ctm.txt"), b"?").unwrap();

    assert!(flatten_ctm(tmp.path()).await.is_err());
}

#[tokio::test]
async fn test_flatten_ctm_wrapper_named_sprites() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(tmp.path().join("sprites/assets/sprites")).unwrap();

    let e = flatten_ctm(tmp.path()).await.unwrap_err();
    assert!(e.to_string().contains("would be replaced"), "{}", e);
    assert!(tmp.path().join("sprites/assets/sprites").is_dir());
}
