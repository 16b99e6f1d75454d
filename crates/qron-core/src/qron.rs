//! QRON records.
//!
//! A QRON is one generated, stylized QR-code artifact tied to a destination
//! URL. The image URL and prompt are immutable after creation; only the scan
//! counter and organizational references change afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{FolderId, QronId, UserId};

/// A generated QRON artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Qron {
    /// Opaque unique token, time-ordered.
    pub id: QronId,

    /// Owning account.
    pub user_id: UserId,

    /// Generation mode id (catalog key).
    pub mode: String,

    /// Preset id used for styling, when one was chosen.
    pub preset: Option<String>,

    /// Where a scan ultimately lands.
    pub destination_url: String,

    /// The content actually encoded in the QR bitmap (the tracking link).
    pub qr_content: String,

    /// The enhanced prompt sent to the style-transfer service.
    pub prompt: String,

    /// URL of the stylized image.
    pub image_url: String,

    /// Number of redirect-tracking hits.
    pub scan_count: u64,

    /// Folder this QRON is filed under, if any.
    pub folder_id: Option<FolderId>,

    /// When the QRON was created.
    pub created_at: DateTime<Utc>,
}

impl Qron {
    /// Create a new QRON record.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: QronId,
        user_id: UserId,
        mode: impl Into<String>,
        preset: Option<String>,
        destination_url: impl Into<String>,
        qr_content: impl Into<String>,
        prompt: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            id,
            user_id,
            mode: mode.into(),
            preset,
            destination_url: destination_url.into(),
            qr_content: qr_content.into(),
            prompt: prompt.into(),
            image_url: image_url.into(),
            scan_count: 0,
            folder_id: None,
            created_at: Utc::now(),
        }
    }
}
