use crate::config::{Thresholds, WordTimingPolicy};
use crate::pipeline::traits::SimilarityScorer;
use crate::types::{MappingKind, WordAlignmentMap, WordMapping};

/// Greedy two-pointer alignment of recognized words (`sources`) onto the words of the
/// matched text (`targets`). Never backtracks.
///
/// At each step the first rule that fires wins: 1:1 match, split of one source over
/// several targets, merge of several sources into one target, deletion of the source,
/// insertion of the target, and finally a forced 1:1 pair.
pub fn build_word_map(
    sources: &[String],
    targets: &[String],
    scorer: &dyn SimilarityScorer,
    thresholds: &Thresholds,
    policy: &WordTimingPolicy,
) -> WordAlignmentMap {
    let mut entries = Vec::with_capacity(sources.len().max(targets.len()));
    let mut i = 0usize;
    let mut j = 0usize;
    let group = policy.max_group_size.max(2);

    while i < sources.len() && j < targets.len() {
        let direct = scorer.similarity(&sources[i], &targets[j]);
        if direct > thresholds.word_match {
            entries.push(mapping(MappingKind::Match, vec![i], vec![j], direct));
            i += 1;
            j += 1;
            continue;
        }

        if let Some((k, score)) = best_group(&sources[i], &targets[j..], group, scorer)
            .filter(|&(_, score)| score > thresholds.word_split_merge)
        {
            tracing::debug!(source = %sources[i], parts = k, score, "words: split");
            entries.push(mapping(MappingKind::Split, vec![i], (j..j + k).collect(), score));
            i += 1;
            j += k;
            continue;
        }

        if let Some((k, score)) = best_group(&targets[j], &sources[i..], group, scorer)
            .filter(|&(_, score)| score > thresholds.word_split_merge)
        {
            tracing::debug!(target = %targets[j], parts = k, score, "words: merge");
            entries.push(mapping(MappingKind::Merge, (i..i + k).collect(), vec![j], score));
            i += k;
            j += 1;
            continue;
        }

        if sources
            .get(i + 1)
            .is_some_and(|next| scorer.similarity(next, &targets[j]) > thresholds.word_split_merge)
        {
            tracing::debug!(source = %sources[i], "words: deletion");
            entries.push(mapping(MappingKind::Deletion, vec![i], Vec::new(), 0.0));
            i += 1;
            continue;
        }

        if targets
            .get(j + 1)
            .is_some_and(|next| scorer.similarity(&sources[i], next) > thresholds.word_split_merge)
        {
            tracing::debug!(target = %targets[j], "words: insertion");
            entries.push(mapping(MappingKind::Insertion, Vec::new(), vec![j], 0.0));
            j += 1;
            continue;
        }

        let score = direct.max(thresholds.word_score_floor);
        entries.push(mapping(MappingKind::Match, vec![i], vec![j], score));
        i += 1;
        j += 1;
    }

    entries.extend(
        (i..sources.len()).map(|s| mapping(MappingKind::Deletion, vec![s], Vec::new(), 0.0)),
    );
    entries.extend(
        (j..targets.len()).map(|t| mapping(MappingKind::Insertion, Vec::new(), vec![t], 0.0)),
    );

    WordAlignmentMap {
        source_words: sources.to_vec(),
        target_words: targets.to_vec(),
        entries,
    }
}

fn mapping(kind: MappingKind, sources: Vec<usize>, targets: Vec<usize>, score: f32) -> WordMapping {
    WordMapping {
        kind,
        sources,
        targets,
        score,
    }
}

/// Best run of 2..=`max` consecutive `parts` whose concatenation resembles `whole`.
/// Ties keep the shorter run.
fn best_group(
    whole: &str,
    parts: &[String],
    max: usize,
    scorer: &dyn SimilarityScorer,
) -> Option<(usize, f32)> {
    let mut joined = String::new();
    let mut best: Option<(usize, f32)> = None;
    for (n, part) in parts.iter().take(max).enumerate() {
        joined.push_str(part);
        if n == 0 {
            continue;
        }
        let score = scorer.similarity(whole, &joined);
        if best.map_or(true, |(_, b)| score > b) {
            best = Some((n + 1, score));
        }
    }
    best
}
