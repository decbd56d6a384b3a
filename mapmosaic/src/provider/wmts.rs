//! WMTS KVP tile provider.
//!
//! Builds OGC WMTS `GetTile` requests in key-value-pair encoding:
//!
//! `{endpoint}?SERVICE=WMTS&REQUEST=GetTile&VERSION=1.0.0&LAYER={layer}&STYLE={style}&TILEMATRIXSET={set}&TILEMATRIX={zoom}&TILEROW={row}&TILECOL={col}&FORMAT={format}`
//!
//! The endpoint may contain an `{api_key}` placeholder, substituted with the
//! configured key, for services that carry the key in the URL path.
//!
//! The defaults target the IGN Geoportail topographic layer (`PM` tile
//! matrix set, EPSG:3857).

use tracing::debug;

use super::http::HttpClient;
use super::types::{Provider, ProviderError};
use crate::coord::TileIndex;

/// Placeholder replaced with the API key inside the endpoint.
pub const API_KEY_PLACEHOLDER: &str = "{api_key}";

pub const DEFAULT_MAP_NAME: &str = "IGN";
pub const DEFAULT_ENDPOINT: &str = "https://wxs.ign.fr/{api_key}/geoportail/wmts";
pub const DEFAULT_LAYER: &str = "GEOGRAPHICALGRIDSYSTEMS.MAPS";
pub const DEFAULT_STYLE: &str = "normal";
pub const DEFAULT_TILE_MATRIX_SET: &str = "PM";
pub const DEFAULT_FORMAT: &str = "image/jpeg";
pub const DEFAULT_REFERER: &str = "Firefox";

/// Request parameters of one WMTS layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WmtsConfig {
    /// Short name used in file names
    pub map_name: String,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub layer: String,
    pub style: String,
    pub tile_matrix_set: String,
    pub format: String,
}

impl Default for WmtsConfig {
    fn default() -> Self {
        Self {
            map_name: DEFAULT_MAP_NAME.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            layer: DEFAULT_LAYER.to_string(),
            style: DEFAULT_STYLE.to_string(),
            tile_matrix_set: DEFAULT_TILE_MATRIX_SET.to_string(),
            format: DEFAULT_FORMAT.to_string(),
        }
    }
}

impl WmtsConfig {
    /// Endpoint with the API key substituted.
    ///
    /// Fails when the endpoint expects a key and none is configured.
    pub fn resolved_endpoint(&self) -> Result<String, ProviderError> {
        if !self.endpoint.contains(API_KEY_PLACEHOLDER) {
            return Ok(self.endpoint.clone());
        }
        match self.api_key.as_deref() {
            Some(key) if !key.is_empty() => Ok(self.endpoint.replace(API_KEY_PLACEHOLDER, key)),
            _ => Err(ProviderError::InvalidConfig(format!(
                "endpoint {} requires an API key",
                self.endpoint
            ))),
        }
    }
}

/// Tile provider speaking WMTS KVP at one zoom level.
pub struct WmtsProvider<C: HttpClient> {
    http_client: C,
    config: WmtsConfig,
    endpoint: String,
    zoom: u8,
}

impl<C: HttpClient> WmtsProvider<C> {
    /// Creates a provider for `zoom`.
    ///
    /// # Arguments
    ///
    /// * `http_client` - Transport used for every request
    /// * `config` - Layer and endpoint parameters
    /// * `zoom` - The tile matrix served; other zoom levels are refused
    pub fn new(http_client: C, config: WmtsConfig, zoom: u8) -> Result<Self, ProviderError> {
        let endpoint = config.resolved_endpoint()?;
        Ok(Self {
            http_client,
            config,
            endpoint,
            zoom,
        })
    }

    pub fn config(&self) -> &WmtsConfig {
        &self.config
    }

    pub fn http_client(&self) -> &C {
        &self.http_client
    }

    /// Builds the GetTile URL of one tile.
    pub fn tile_url(&self, index: TileIndex, zoom: u8) -> String {
        let separator = if self.endpoint.contains('?') { '&' } else { '?' };
        format!(
            "{}{}SERVICE=WMTS&REQUEST=GetTile&VERSION=1.0.0&LAYER={}&STYLE={}&TILEMATRIXSET={}&TILEMATRIX={}&TILEROW={}&TILECOL={}&FORMAT={}",
            self.endpoint,
            separator,
            self.config.layer,
            self.config.style,
            self.config.tile_matrix_set,
            zoom,
            index.row,
            index.col,
            self.config.format
        )
    }
}

impl<C: HttpClient> Provider for WmtsProvider<C> {
    fn fetch_tile(&self, index: TileIndex, zoom: u8) -> Result<Vec<u8>, ProviderError> {
        if zoom != self.zoom {
            return Err(ProviderError::UnsupportedZoom {
                requested: zoom,
                supported: self.zoom,
            });
        }

        let url = self.tile_url(index, zoom);
        debug!(col = index.col, row = index.row, zoom, "Requesting tile");

        let body = self.http_client.get(&url)?;
        if body.is_empty() {
            return Err(ProviderError::InvalidResponse(format!(
                "empty body for tile {}",
                index
            )));
        }
        Ok(body)
    }

    fn name(&self) -> &str {
        &self.config.map_name
    }

    fn zoom(&self) -> u8 {
        self.zoom
    }
}
