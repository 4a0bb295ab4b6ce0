//! Fixed remote locations of every asset set.

use url::Url;
use anyhow::{
    Result,
    anyhow,
};


/// Version of the nerothe item sprite pack to fetch.
pub const ITEMS_VERSION: &'static str = "1.16";

const NEROTHE_URL_BASE: &'static str = "https://nerothe.com/img/";

pub const CTM_URL: &'static str =
    "https://github.com/DarwinBaker/AATool/releases/download/v1.7.5.0-release/ctm_aatool_1.7.5.0.zip";

pub const FONT_URL: &'static str =
    "https://github.com/IdreesInc/Minecraft-Font/releases/download/v1.0/Minecraft.otf";
pub const BOLD_FONT_URL: &'static str =
    "https://github.com/IdreesInc/Minecraft-Font/releases/download/v1.0/Minecraft-Bold.otf";


/// URL of the item sprite zip for the given pack version.
pub fn items_url(version: &str) -> Result<Url> {
    let mut url = Url::parse(NEROTHE_URL_BASE)?;
    {
        let mut url_path = url.path_segments_mut()
            .map_err(|()| anyhow!("cannot-be-a-base url {}", NEROTHE_URL_BASE))?;
        url_path.pop_if_empty();
        url_path.push(version);
        url_path.push("items.zip");
    }
    Ok(url)
}


#[test]
fn test_items_url() {
    assert_eq!(
        items_url(ITEMS_VERSION).unwrap().as_str(),
        "https://nerothe.com/img/1.16/items.zip",
    );
}
