//! Tile provider abstraction
//!
//! A [`Provider`] turns a tile index into encoded image bytes. The concrete
//! [`WmtsProvider`] speaks OGC WMTS over an [`HttpClient`], which is
//! [`ReqwestClient`] in production and a mock in tests.

mod http;
mod types;
mod wmts;

pub use http::{HttpClient, ReqwestClient, DEFAULT_TIMEOUT_SECS};
pub use types::{Provider, ProviderError};
pub use wmts::{
    WmtsConfig, WmtsProvider, API_KEY_PLACEHOLDER, DEFAULT_ENDPOINT, DEFAULT_FORMAT,
    DEFAULT_LAYER, DEFAULT_MAP_NAME, DEFAULT_REFERER, DEFAULT_STYLE, DEFAULT_TILE_MATRIX_SET,
};

#[cfg(test)]
pub use http::tests::MockHttpClient;
