
use std::{
    io::{
        ErrorKind,
        Result,
    },
    path::{
        Path,
        PathBuf,
    },
    ffi::OsString,
    fs::Metadata,
};
use tokio::{
    fs::{
        File,
        metadata,
        rename,
        remove_file,
        create_dir_all,
    },
    io::AsyncWriteExt,
};


const TMP_SUFFIX: &'static str = ".part";


async fn metadata_opt<P: AsRef<Path>>(path: P) -> Result<Option<Metadata>> {
    match metadata(path).await {
        Ok(meta) => Ok(Some(meta)),
        Err(e) =>
            if e.kind() == ErrorKind::NotFound { Ok(None) }
            else { Err(e) }
    }
}

pub async fn exists<P: AsRef<Path>>(path: P) -> Result<bool> {
    Ok(metadata_opt(path).await?.is_some())
}

pub async fn dir_exists<P: AsRef<Path>>(path: P) -> Result<bool> {
    Ok(metadata_opt(path).await?.map_or(false, |meta| meta.is_dir()))
}

pub async fn file_exists<P: AsRef<Path>>(path: P) -> Result<bool> {
    Ok(metadata_opt(path).await?.map_or(false, |meta| meta.is_file()))
}

/// Path of the tmp file `atomic_write` stages `path` in: a sibling with a
/// `.part` suffix.
fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name()
        .map(|name| name.to_owned())
        .unwrap_or_else(|| OsString::from("download"));
    name.push(TMP_SUFFIX);
    path.with_file_name(name)
}

async fn write_and_rename(tmp_path: &Path, path: &Path, content: &[u8]) -> Result<()> {
    // truncates any leftover from an interrupted run
    let mut tmp_file = File::create(tmp_path).await?;
    tmp_file.write_all(content).await?;
    tmp_file.flush().await?;
    drop(tmp_file);
    rename(tmp_path, path).await
}

/// Create parent dirs then atomically write/overwrite file with content,
/// via a tmp file in the same directory. The tmp file is removed if any step
/// fails.
pub async fn atomic_write<P>(path: P, content: &[u8]) -> Result<()>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        create_dir_all(parent).await?;
    }
    let tmp_path = tmp_path(path);
    let result = write_and_rename(&tmp_path, path, content).await;
    if result.is_err() {
        if let Err(e) = remove_file(&tmp_path).await {
            if e.kind() != ErrorKind::NotFound {
                warn!(%e, path=%tmp_path.display(), "error removing tmp file");
            }
        }
    }
    result
}


#[tokio::test]
async fn test_exists_kinds() {
    let tmp = tempfile::tempdir().unwrap();
    let file = tmp.path().join("a.zip");
    std::fs::write(&file, b"zip").unwrap();

    assert!(exists(&file).await.unwrap());
    assert!(file_exists(&file).await.unwrap());
    assert!(!dir_exists(&file).await.unwrap());

    assert!(exists(tmp.path()).await.unwrap());
    assert!(dir_exists(tmp.path()).await.unwrap());
    assert!(!file_exists(tmp.path()).await.unwrap());

    let absent = tmp.path().join("absent");
    assert!(!exists(&absent).await.unwrap());
    assert!(!dir_exists(&absent).await.unwrap());
    assert!(!file_exists(&absent).await.unwrap());
}

#[tokio::test]
async fn test_atomic_write_overwrites() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("fonts").join("minecraft.otf");

    atomic_write(&path, b"first").await.unwrap();
    atomic_write(&path, b"second").await.unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), b"second");

    let names = std::fs::read_dir(path.parent().unwrap()).unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect::<Vec<_>>();
    assert_eq!(names, vec![OsString::from("minecraft.otf")]);
}

#[tokio::test]
async fn test_atomic_write_reuses_stale_tmp() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("ctm.zip");
    std::fs::write(tmp.path().join("ctm.zip.part"), b"stale and much longer").unwrap();

    atomic_write(&path, b"fresh").await.unwrap();
    atomic_write(&path, b"fresher").await.unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), b"fresher");

    let names = std::fs::read_dir(tmp.path()).unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect::<Vec<_>>();
    assert_eq!(names, vec![OsString::from("ctm.zip")]);
}

#[tokio::test]
async fn test_atomic_write_failure_removes_tmp() {
    let tmp = tempfile::tempdir().unwrap();
    // renaming a file over a non-empty directory fails
    let path = tmp.path().join("fonts");
    std::fs::create_dir_all(path.join("minecraft.otf")).unwrap();

    assert!(atomic_write(&path, b"font").await.is_err());
    assert!(!tmp.path().join("fonts.part").exists());
    assert!(path.join("minecraft.otf").is_dir());
}
