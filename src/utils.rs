use std::{
    io,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    time::Duration,
};

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use sha2::{Digest, Sha256};
use tokio::time::sleep;

use crate::{errors::CatalogError, types::PlaylistRef, warning};

const MAX_RETRIES: u32 = 3;
const MAX_RETRY_AFTER_SECS: u64 = 120;

pub fn generate_code_verifier() -> String {
    random_string(128)
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Opaque value echoed back by the provider on the callback.
pub fn generate_state() -> String {
    random_string(32)
}

fn random_string(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Splits a loopback redirect URI into the address to bind and the path to serve.
///
/// `localhost` binds the IPv4 loopback address.
pub fn parse_redirect_uri(redirect_uri: &str) -> io::Result<(SocketAddr, String)> {
    let invalid = |msg: String| io::Error::new(io::ErrorKind::InvalidInput, msg);

    let url = Url::parse(redirect_uri)
        .map_err(|e| invalid(format!("invalid redirect uri {}: {}", redirect_uri, e)))?;
    let host = url
        .host_str()
        .ok_or_else(|| invalid(format!("redirect uri {} has no host", redirect_uri)))?;
    let ip = if host.eq_ignore_ascii_case("localhost") {
        IpAddr::V4(Ipv4Addr::LOCALHOST)
    } else {
        host.trim_start_matches('[')
            .trim_end_matches(']')
            .parse::<IpAddr>()
            .map_err(|_| invalid(format!("redirect uri host {} is not a loopback address", host)))?
    };
    let port = url
        .port_or_known_default()
        .ok_or_else(|| invalid(format!("redirect uri {} has no port", redirect_uri)))?;

    Ok((SocketAddr::new(ip, port), url.path().to_string()))
}

/// Overall progress in percent across a batch of playlists.
///
/// `playlist_index` is zero based, `current` is the one-based track index
/// within the playlist.
pub fn global_progress(
    playlist_index: usize,
    total_playlists: usize,
    current: usize,
    total_tracks: usize,
) -> f64 {
    if total_playlists == 0 {
        return 0.0;
    }
    let local = if total_tracks == 0 {
        0.0
    } else {
        current as f64 / total_tracks as f64 * 100.0
    };
    (playlist_index as f64 * 100.0 + local) / total_playlists as f64
}

/// Picks playlists by 1-based index or exact name, keeping listing order.
pub fn select_playlists(
    playlists: &[PlaylistRef],
    selectors: &[String],
) -> Result<Vec<PlaylistRef>, String> {
    let mut picked = vec![false; playlists.len()];

    for selector in selectors {
        let by_index = selector
            .parse::<usize>()
            .ok()
            .filter(|i| *i >= 1 && *i <= playlists.len())
            .map(|i| i - 1);

        let position = by_index.or_else(|| playlists.iter().position(|p| p.name == *selector));

        match position {
            Some(i) => picked[i] = true,
            None => return Err(format!("No playlist matches '{}'", selector)),
        }
    }

    Ok(playlists
        .iter()
        .zip(picked)
        .filter(|(_, keep)| *keep)
        .map(|(p, _)| p.clone())
        .collect())
}

/// Sends a request, retrying on `502 Bad Gateway` and `429 Too Many Requests`.
///
/// A `Retry-After` above two minutes is not waited for; the 429 response is
/// handed back to the caller instead.
pub async fn send_with_retry(request: RequestBuilder) -> Result<Response, reqwest::Error> {
    let mut attempts = 0;

    loop {
        let Some(attempt) = request.try_clone() else {
            return request.send().await;
        };
        let response = attempt.send().await?;

        if attempts >= MAX_RETRIES {
            return Ok(response);
        }

        match response.status() {
            StatusCode::BAD_GATEWAY => {
                sleep(Duration::from_secs(10)).await;
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(1);
                if retry_after > MAX_RETRY_AFTER_SECS {
                    warning!(
                        "Retry after has reached an abnormal high of {} seconds. Try again later.",
                        retry_after
                    );
                    return Ok(response);
                }
                sleep(Duration::from_secs(retry_after)).await;
            }
            _ => return Ok(response),
        }

        attempts += 1;
    }
}

/// Turns a non-success response into a [`CatalogError`].
pub async fn check_status(response: Response) -> Result<Response, CatalogError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(CatalogError::Unauthorized);
    }

    let body = response.text().await.unwrap_or_default();
    Err(CatalogError::Status {
        status: status.as_u16(),
        body,
    })
}
