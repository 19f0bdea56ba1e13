/// File naming for exported frames.
///
/// Names are derived from a caller-assigned ordinal, so every export in a
/// batch has a distinct path before any writing starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputNaming {
    /// `<prefix><ordinal>.<extension>`, ordinals from 0 (e.g. `frame_0.jpg`).
    Ordinal { prefix: String, extension: String },
    /// `ranked_<ordinal + 1>_<source name>`; sources without a name fall back
    /// to `frame_<index>.jpg` for the tail.
    RankedOriginal,
}

impl OutputNaming {
    /// The `frame_<i>.jpg` scheme used for video exports.
    pub fn frame_jpg() -> Self {
        Self::Ordinal {
            prefix: "frame_".into(),
            extension: "jpg".into(),
        }
    }

    pub fn file_name(&self, ordinal: usize, frame_index: usize, source_name: Option<&str>) -> String {
        match self {
            Self::Ordinal { prefix, extension } => format!("{prefix}{ordinal}.{extension}"),
            Self::RankedOriginal => match source_name {
                Some(name) => format!("ranked_{}_{name}", ordinal + 1),
                None => format!("ranked_{}_frame_{frame_index}.jpg", ordinal + 1),
            },
        }
    }
}
