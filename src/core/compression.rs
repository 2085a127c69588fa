// Decompression of archived log files

use crate::core::error::{LabnoteError, Result};
use flate2::read::GzDecoder;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionType {
    None,
    Gzip,
    Lz4,
    Zstd,
}

impl CompressionType {
    /// Pick the codec from the file extension.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("gz") => CompressionType::Gzip,
            Some("lz4") => CompressionType::Lz4,
            Some("zst") => CompressionType::Zstd,
            _ => CompressionType::None,
        }
    }
}

pub fn decompress(data: Vec<u8>, compression: CompressionType) -> Result<Vec<u8>> {
    match compression {
        CompressionType::None => Ok(data),

        CompressionType::Gzip => {
            let mut decoder = GzDecoder::new(data.as_slice());
            let mut decompressed = Vec::new();
            decoder
                .read_to_end(&mut decompressed)
                .map_err(|e| LabnoteError::DecompressionFailed(format!("Gzip: {}", e)))?;
            Ok(decompressed)
        }

        #[cfg(feature = "lz4")]
        CompressionType::Lz4 => {
            let mut decoder = lz4::Decoder::new(data.as_slice())
                .map_err(|e| LabnoteError::DecompressionFailed(format!("LZ4: {}", e)))?;
            let mut decompressed = Vec::new();
            decoder
                .read_to_end(&mut decompressed)
                .map_err(|e| LabnoteError::DecompressionFailed(format!("LZ4: {}", e)))?;
            Ok(decompressed)
        }

        #[cfg(not(feature = "lz4"))]
        CompressionType::Lz4 => Err(LabnoteError::DecompressionFailed(
            "LZ4 support not compiled in".to_string(),
        )),

        #[cfg(feature = "zstd")]
        CompressionType::Zstd => zstd::decode_all(data.as_slice())
            .map_err(|e| LabnoteError::DecompressionFailed(format!("Zstd: {}", e))),

        #[cfg(not(feature = "zstd"))]
        CompressionType::Zstd => Err(LabnoteError::DecompressionFailed(
            "Zstd support not compiled in".to_string(),
        )),
    }
}
