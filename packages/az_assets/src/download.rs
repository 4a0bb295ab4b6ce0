
use crate::{
    http_util::Fetch,
    fs_util::atomic_write,
};
use std::path::Path;
use anyhow::{
    Context,
    Result,
};


/// Download `url` fully into memory then write it over `dest`.
pub async fn download_url_to<F, P>(http: &mut F, url: &str, dest: P) -> Result<()>
where
    F: Fetch,
    P: AsRef<Path>,
{
    let dest = dest.as_ref();
    info!("downloading {}", url);
    let content = http.fetch(url).await?;
    atomic_write(dest, content.as_ref()).await
        .with_context(|| format!("writing {}", dest.display()))?;
    info!(bytes = content.len(), "finished downloading {}", url);
    Ok(())
}


#[tokio::test]
async fn test_download_overwrites() {
    use crate::test_util::FakeHttp;

    let tmp = tempfile::tempdir().unwrap();
    let dest = tmp.path().join("fonts/minecraft.otf");
    std::fs::create_dir_all(dest.parent().unwrap()).unwrap();
    std::fs::write(&dest, b"old font").unwrap();

    let mut http = FakeHttp::default().with("https://a/font.otf", "new font");
    download_url_to(&mut http, "https://a/font.otf", &dest).await.unwrap();

    assert_eq!(std::fs::read(&dest).unwrap(), b"new font");
    assert_eq!(http.requests, vec!["https://a/font.otf".to_owned()]);
}

#[tokio::test]
async fn test_download_failure_leaves_dest_alone() {
    use crate::test_util::FakeHttp;

    let tmp = tempfile::tempdir().unwrap();
    let dest = tmp.path().join("ctm.zip");

    let mut http = FakeHttp::default();
    assert!(download_url_to(&mut http, "https://a/missing.zip", &dest).await.is_err());
    assert!(!dest.exists());
}

#[tokio::test]
async fn test_download_http_error_status() {
    use crate::test_util::serve_responses;
    use reqwest::Client;

    let tmp = tempfile::tempdir().unwrap();
    let dest = tmp.path().join("ctm.zip");
    let base = serve_responses(vec![(404, &b"not found"[..])]).await;

    let mut client = Client::new();
    assert!(download_url_to(&mut client, &format!("{}/ctm.zip", base), &dest).await.is_err());
    assert!(!dest.exists());
    assert!(!tmp.path().join("ctm.zip.part").exists());
}
