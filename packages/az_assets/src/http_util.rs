
use reqwest::{
    Client,
    IntoUrl,
};
use bytes::Bytes;
use anyhow::{
    Result,
    ensure,
};


/// Something that can GET a URL and hand back the whole body.
#[allow(async_fn_in_trait)]
pub trait Fetch {
    async fn fetch(&mut self, url: &str) -> Result<Bytes>;
}

impl Fetch for Client {
    async fn fetch(&mut self, url: &str) -> Result<Bytes> {
        get_success(self, url).await
    }
}

/// Perform an HTTP GET request, ensure the returned status code is OK, and
/// download all bytes in memory.
pub async fn get_success<U>(client: &mut Client, url: U) -> Result<Bytes>
where
    U: IntoUrl,
{
    let url = url.into_url()?;
    let response = client.get(url.clone()).send().await?;
    ensure!(
        response.status().is_success(),
        "http status code {:?} getting {:?}",
        response.status(),
        url.as_str(),
    );
    Ok(response.bytes().await?)
}


#[tokio::test]
async fn test_client_fetch_status() {
    use crate::test_util::serve_responses;

    let base = serve_responses(vec![
        (404, &b"nope"[..]),
        (200, &b"\x00font bytes\xff"[..]),
    ]).await;
    let mut client = Client::new();

    let e = client.fetch(&format!("{}/missing.otf", base)).await.unwrap_err();
    assert!(e.to_string().contains("404"), "{}", e);

    let body = client.fetch(&format!("{}/Minecraft.otf", base)).await.unwrap();
    assert_eq!(body.as_ref(), b"\x00font bytes\xff");
}
