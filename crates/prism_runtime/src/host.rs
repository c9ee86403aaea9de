//! Host object model the Runtime blocks operate on.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::fetch::data_uri;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetType {
    ImageBitmap,
    ImageVector,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataFormat {
    Png,
    Svg,
}

impl DataFormat {
    /// File extension used in `md5ext` names
    pub fn extension(&self) -> &'static str {
        match self {
            DataFormat::Png => "png",
            DataFormat::Svg => "svg",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            DataFormat::Png => "image/png",
            DataFormat::Svg => "image/svg+xml",
        }
    }

    /// The (asset type, data format) pair for an image MIME type, if costumes accept it
    pub fn for_image_mime(mime: &str) -> Option<(AssetType, DataFormat)> {
        match mime {
            "image/png" => Some((AssetType::ImageBitmap, DataFormat::Png)),
            "image/svg+xml" => Some((AssetType::ImageVector, DataFormat::Svg)),
            _ => None,
        }
    }
}

/// A stored binary resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub asset_id: String,
    pub asset_type: AssetType,
    pub data_format: DataFormat,
    pub data: Arc<[u8]>,
}

impl Asset {
    pub fn encode_data_uri(&self) -> String {
        data_uri(self.data_format.mime(), &self.data)
    }

    /// `<assetId>.<ext>`
    pub fn md5ext(&self) -> String {
        format!("{}.{}", self.asset_id, self.data_format.extension())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Costume {
    pub name: String,
    pub md5ext: String,
    pub asset: Asset,
}

impl Costume {
    pub fn new(name: &str, asset: Asset) -> Self {
        Self {
            name: name.to_string(),
            md5ext: asset.md5ext(),
            asset,
        }
    }
}

/// A sprite or the stage; the entity a block runs against
pub trait Target: Send + Sync {
    fn id(&self) -> String;

    /// `false` for clones
    fn is_original(&self) -> bool;

    fn costume_count(&self) -> usize;

    /// Costume at a 0-based index
    fn costume(&self, index: usize) -> Option<Costume>;

    fn add_costume(&self, costume: Costume);

    /// Removes the costume at a 0-based index. The target owns the edge cases:
    /// refusing to remove the only costume, ignoring out-of-range indices and
    /// keeping the current costume valid.
    fn delete_costume(&self, index: usize);
}

/// Typed asset storage
pub trait AssetStore: Send + Sync {
    fn create_asset(&self, asset_type: AssetType, data_format: DataFormat, data: Vec<u8>) -> Asset;
}

/// Process-wide runtime configuration
pub trait StageSettings: Send + Sync {
    fn set_stage_size(&self, width: f64, height: f64);
    fn stage_width(&self) -> f64;
    fn stage_height(&self) -> f64;
    fn set_framerate(&self, framerate: f64);
    fn framerate(&self) -> f64;
    fn turbo_mode(&self) -> bool;
    fn clone_count(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_mime_pairs() {
        assert_eq!(
            DataFormat::for_image_mime("image/png"),
            Some((AssetType::ImageBitmap, DataFormat::Png))
        );
        assert_eq!(
            DataFormat::for_image_mime("image/svg+xml"),
            Some((AssetType::ImageVector, DataFormat::Svg))
        );
        assert_eq!(DataFormat::for_image_mime("image/jpeg"), None);
    }

    #[test]
    fn test_asset_encodings() {
        let asset = Asset {
            asset_id: "abc123".into(),
            asset_type: AssetType::ImageVector,
            data_format: DataFormat::Svg,
            data: Arc::from(&b"<svg/>"[..]),
        };

        assert_eq!(asset.md5ext(), "abc123.svg");
        assert_eq!(asset.encode_data_uri(), "data:image/svg+xml;base64,PHN2Zy8+");
        assert_eq!(Costume::new("flag", asset).md5ext, "abc123.svg");
    }
}
