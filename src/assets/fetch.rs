use std::{fs::File, io::BufReader, path::Path, time::Duration};

use anyhow::Context as _;

use crate::{
    error::BannercraftResult,
    model::Template,
};

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetch raw bytes from an `http(s)://` URL or a filesystem path.
pub fn fetch_bytes(source: &str) -> BannercraftResult<Vec<u8>> {
    if is_url(source) {
        let client = reqwest::blocking::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .context("build http client")?;
        let response = client
            .get(source)
            .send()
            .with_context(|| format!("GET {source}"))?
            .error_for_status()
            .with_context(|| format!("GET {source}"))?;
        let bytes = response
            .bytes()
            .with_context(|| format!("read body of {source}"))?;
        Ok(bytes.to_vec())
    } else {
        let bytes =
            std::fs::read(source).with_context(|| format!("read file '{source}'"))?;
        Ok(bytes)
    }
}

/// One-time load of the template descriptor from a URL or path.
pub fn load_template(source: &str) -> BannercraftResult<Template> {
    let template: Template = if is_url(source) {
        let bytes = fetch_bytes(source)?;
        serde_json::from_slice(&bytes).context("parse template JSON")?
    } else {
        let f = File::open(Path::new(source))
            .with_context(|| format!("open template '{source}'"))?;
        serde_json::from_reader(BufReader::new(f)).context("parse template JSON")?
    };
    template.validate()?;
    Ok(template)
}

fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}
