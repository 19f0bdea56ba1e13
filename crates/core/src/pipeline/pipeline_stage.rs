use std::fmt;

/// Progress of a single pipeline run.
///
/// `Idle -> Decoding -> Scoring -> Ranking -> Exporting -> Done`, with a
/// shortcut `Decoding -> Done` when the source yields no frames. Stages are
/// never re-entered; a finished run is not resumable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    Decoding,
    Scoring,
    Ranking,
    Exporting,
    Done,
}

impl PipelineStage {
    pub fn can_advance_to(self, next: PipelineStage) -> bool {
        use PipelineStage::*;
        matches!(
            (self, next),
            (Idle, Decoding)
                | (Decoding, Scoring)
                | (Decoding, Done)
                | (Scoring, Ranking)
                | (Ranking, Exporting)
                | (Exporting, Done)
        )
    }

    pub fn is_terminal(self) -> bool {
        self == PipelineStage::Done
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Idle => "idle",
            PipelineStage::Decoding => "decoding",
            PipelineStage::Scoring => "scoring",
            PipelineStage::Ranking => "ranking",
            PipelineStage::Exporting => "exporting",
            PipelineStage::Done => "done",
        };
        f.write_str(name)
    }
}
