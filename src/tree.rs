use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crts_shared::{ControlTransport, Proxy};

pub const STATUS_URL: &str = "http://chromium-status.appspot.com/current?format=json";

/// Tree status document, only the overall state is used.
#[derive(Debug, Deserialize)]
pub struct TreeStatus {
    pub general_state: String,
}

/// Where the status document comes from.
#[derive(Debug, Eq, PartialEq)]
pub enum Source {
    File(PathBuf),
    Stdin,
    Url { url: String, timeout: Duration },
}

impl Source {
    pub fn new(path: Option<PathBuf>, url: String, timeout: Duration) -> Self {
        match path {
            Some(path) if path.as_os_str() == "-" => Source::Stdin,
            Some(path) => Source::File(path),
            None => Source::Url { url, timeout },
        }
    }

    pub fn fetch(&self) -> anyhow::Result<TreeStatus> {
        match self {
            Source::File(path) => parse_status(File::open(path)?),
            Source::Stdin => parse_status(io::stdin()),
            Source::Url { url, timeout } => {
                log::debug!("Fetching {}", url);
                let client = reqwest::blocking::Client::builder()
                    .timeout(*timeout)
                    .build()?;
                let response = client.get(url.as_str()).send()?.error_for_status()?;
                parse_status(response)
            }
        }
    }
}

/// Codes for a tree state: open lights green, closed lights red,
/// anything else flashes green.
pub fn codes_for(state: &str) -> &'static [u8] {
    match state {
        "open" => b"05",
        "closed" => b"14",
        _ => b"25",
    }
}

pub fn parse_status<R: Read>(reader: R) -> anyhow::Result<TreeStatus> {
    Ok(serde_json::from_reader(reader)?)
}

pub fn command_tree<T: ControlTransport>(
    proxy: &mut Proxy<T>,
    source: &Source,
) -> anyhow::Result<()> {
    let status = source.fetch()?;

    log::info!("Tree is {}", status.general_state);
    proxy.write_all(codes_for(&status.general_state));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crts_shared::protocol::decode_digit;

    #[test]
    fn states_map_to_codes() {
        assert_eq!(codes_for("open"), b"05");
        assert_eq!(codes_for("closed"), b"14");
        assert_eq!(codes_for("throttled"), b"25");
    }

    #[test]
    fn open_lights_green_only() {
        let sets: Vec<_> = codes_for("open").iter().map(|&b| decode_digit(b)).collect();
        assert_eq!(sets, vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn parses_document() {
        let doc = r#"{"general_state": "closed", "message": "Tree is closed"}"#;
        let status = parse_status(doc.as_bytes()).unwrap();
        assert_eq!(status.general_state, "closed");
    }

    #[test]
    fn rejects_missing_state() {
        assert!(parse_status(&b"{}"[..]).is_err());
    }

    #[test]
    fn source_selection() {
        let timeout = Duration::from_secs(5);
        assert_eq!(
            Source::new(None, STATUS_URL.to_string(), timeout),
            Source::Url {
                url: STATUS_URL.to_string(),
                timeout
            }
        );
        assert_eq!(
            Source::new(Some(PathBuf::from("-")), STATUS_URL.to_string(), timeout),
            Source::Stdin
        );
        assert_eq!(
            Source::new(Some(PathBuf::from("tree.json")), STATUS_URL.to_string(), timeout),
            Source::File(PathBuf::from("tree.json"))
        );
    }

    #[test]
    fn missing_file_is_an_error() {
        let source = Source::File(PathBuf::from("/nonexistent/tree.json"));
        assert!(source.fetch().is_err());
    }
}
