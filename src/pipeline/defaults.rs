use crate::alignment::boundary::optimize_boundary;
use crate::alignment::punctuation::PunctuationSet;
use crate::alignment::similarity::dice_coefficient;
use crate::alignment::words::realign_words;
use crate::config::AlignerConfig;
use crate::pipeline::traits::{BoundaryOptimizer, SimilarityScorer, WordRealigner};
use crate::types::{Utterance, WordAlignment};

pub struct DiceBigramScorer;

impl SimilarityScorer for DiceBigramScorer {
    fn similarity(&self, a: &str, b: &str) -> f32 {
        dice_coefficient(a, b)
    }
}

pub struct PunctuationBoundaryOptimizer;

impl BoundaryOptimizer for PunctuationBoundaryOptimizer {
    fn optimize(&self, window: &str, punctuation: &PunctuationSet) -> usize {
        optimize_boundary(window, punctuation)
    }
}

pub struct SequentialWordRealigner;

impl WordRealigner for SequentialWordRealigner {
    fn realign(
        &self,
        utterance: &Utterance,
        matched_text: &str,
        scorer: &dyn SimilarityScorer,
        config: &AlignerConfig,
    ) -> WordAlignment {
        realign_words(utterance, matched_text, scorer, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Token;

    #[test]
    fn dice_bigram_scorer_similarity() {
        let scorer = DiceBigramScorer;
        assert_eq!(scorer.similarity("hello", "hello"), 1.0);
        assert_eq!(scorer.similarity("night", "nacht"), dice_coefficient("night", "nacht"));
        assert_eq!(scorer.similarity("a", "b"), 0.0);
    }

    #[test]
    fn punctuation_boundary_optimizer_optimize() {
        let optimizer = PunctuationBoundaryOptimizer;
        let punctuation = PunctuationSet::default();
        let window = "The cat sat on the mat. The do";
        assert_eq!(
            optimizer.optimize(window, &punctuation),
            optimize_boundary(window, &punctuation)
        );
    }

    #[test]
    fn sequential_word_realigner_realign() {
        let realigner = SequentialWordRealigner;
        let utterance = Utterance::new("u1", "any one", 0, 400).with_tokens(vec![
            Token::new("any", 0, 200),
            Token::new("one", 200, 400),
        ]);
        let config = AlignerConfig::default();
        let result = realigner.realign(&utterance, "anyone", &DiceBigramScorer, &config);
        let expected = realign_words(&utterance, "anyone", &DiceBigramScorer, &config);
        assert_eq!(result, expected);
        assert_eq!(result.words.len(), 1);
    }
}
