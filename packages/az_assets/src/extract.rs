
use std::{
    io::{
        Cursor,
        Read,
    },
    path::Path,
};
use tokio::fs::{
    self,
    create_dir_all,
};
use zip::read::ZipArchive;
use anyhow::{
    anyhow,
    Context,
    Result,
};


/// Extract every entry of the zip at `zip_path` into `target_dir`, keeping
/// the archive's relative paths.
pub async fn extract_zip<P, Q>(zip_path: P, target_dir: Q) -> Result<()>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let zip_path = zip_path.as_ref();
    let target_dir = target_dir.as_ref();
    info!("extracting {} into {}", zip_path.display(), target_dir.display());

    let zip = fs::read(zip_path).await
        .with_context(|| format!("reading {}", zip_path.display()))?;
    let mut zip = ZipArchive::new(Cursor::new(zip))
        .with_context(|| format!("opening {}", zip_path.display()))?;

    create_dir_all(target_dir).await?;
    let mut files = 0;
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        let entry_path = entry.enclosed_name()
            .ok_or_else(|| anyhow!(
                "zip file contains illegal name {:?}",
                entry.name(),
            ))?
            .to_owned();
        let target_path = target_dir.join(&entry_path);
        if entry.is_dir() {
            create_dir_all(&target_path).await?;
            continue;
        }
        trace!("zip-extracting {:?}", entry_path);
        if let Some(parent) = target_path.parent() {
            create_dir_all(parent).await?;
        }
        let mut content = Vec::new();
        entry.read_to_end(&mut content)?;
        fs::write(&target_path, content).await
            .with_context(|| format!("writing {}", target_path.display()))?;
        files += 1;
    }

    debug!("extracted {} files from {}", files, zip_path.display());
    Ok(())
}


#[tokio::test]
async fn test_extract_nested() {
    use crate::test_util::zip_bytes;

    let tmp = tempfile::tempdir().unwrap();
    let zip_path = tmp.path().join("1.16.items.zip");
    std::fs::write(&zip_path, zip_bytes(&[
        ("empty/", b""),
        ("diamond.png", b"diamond"),
        ("tools/iron_pickaxe.png", b"pickaxe"),
    ])).unwrap();

    let items = tmp.path().join("items");
    extract_zip(&zip_path, &items).await.unwrap();

    assert!(items.join("empty").is_dir());
    assert_eq!(std::fs::read(items.join("diamond.png")).unwrap(), b"diamond");
    assert_eq!(std::fs::read(items.join("tools/iron_pickaxe.png")).unwrap(), b"pickaxe");
}

#[tokio::test]
async fn test_extract_corrupt() {
    let tmp = tempfile::tempdir().unwrap();
    let zip_path = tmp.path().join("ctm.zip");
    std::fs::write(&zip_path, b"not a zip").unwrap();

    assert!(extract_zip(&zip_path, tmp.path().join("ctm")).await.is_err());
}

#[tokio::test]
async fn test_extract_missing_zip() {
    let tmp = tempfile::tempdir().unwrap();
    assert!(extract_zip(tmp.path().join("ctm.zip"), tmp.path().join("ctm")).await.is_err());
}
