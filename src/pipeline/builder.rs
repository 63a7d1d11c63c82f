use std::path::Path;

use crate::config::AlignerConfig;
use crate::error::AlignmentError;
use crate::pipeline::defaults::{
    DiceBigramScorer, PunctuationBoundaryOptimizer, SequentialWordRealigner,
};
use crate::pipeline::runtime::{TextAligner, TextAlignerParts};
use crate::pipeline::traits::{BoundaryOptimizer, SimilarityScorer, WordRealigner};

pub struct TextAlignerBuilder {
    config: AlignerConfig,
    scorer: Option<Box<dyn SimilarityScorer>>,
    boundary_optimizer: Option<Box<dyn BoundaryOptimizer>>,
    word_realigner: Option<Box<dyn WordRealigner>>,
}

impl Default for TextAlignerBuilder {
    fn default() -> Self {
        Self::new(AlignerConfig::default())
    }
}

impl TextAlignerBuilder {
    pub fn new(config: AlignerConfig) -> Self {
        Self {
            config,
            scorer: None,
            boundary_optimizer: None,
            word_realigner: None,
        }
    }

    /// Starts from a JSON config file; missing fields keep their defaults.
    pub fn from_config_file(path: &Path) -> Result<Self, AlignmentError> {
        Ok(Self::new(AlignerConfig::load(path)?))
    }

    pub fn with_scorer(mut self, scorer: Box<dyn SimilarityScorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    pub fn with_boundary_optimizer(mut self, boundary_optimizer: Box<dyn BoundaryOptimizer>) -> Self {
        self.boundary_optimizer = Some(boundary_optimizer);
        self
    }

    pub fn with_word_realigner(mut self, word_realigner: Box<dyn WordRealigner>) -> Self {
        self.word_realigner = Some(word_realigner);
        self
    }

    pub fn build(self) -> Result<TextAligner, AlignmentError> {
        self.config.validate()?;
        Ok(TextAligner::from_parts(TextAlignerParts {
            config: self.config,
            scorer: self.scorer.unwrap_or_else(|| Box::new(DiceBigramScorer)),
            boundary_optimizer: self
                .boundary_optimizer
                .unwrap_or_else(|| Box::new(PunctuationBoundaryOptimizer)),
            word_realigner: self
                .word_realigner
                .unwrap_or_else(|| Box::new(SequentialWordRealigner)),
        }))
    }
}
