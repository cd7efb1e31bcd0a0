use crate::error::RetrievalError;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};

const TERM_PATTERN: &str = r"\b\w\w+\b";

#[derive(Debug, Clone)]
pub struct Tokenizer {
    pattern: Regex,
}

impl Tokenizer {
    pub fn new() -> Result<Self, RetrievalError> {
        Ok(Self {
            pattern: Regex::new(TERM_PATTERN)?,
        })
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        self.pattern
            .find_iter(&lowered)
            .map(|term| term.as_str().to_string())
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct TfidfModel {
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f32>,
    tokenizer: Tokenizer,
}

impl TfidfModel {
    pub fn fit_transform<S: AsRef<str>>(
        chunks: &[S],
    ) -> Result<(Vec<Vec<f32>>, TfidfModel), RetrievalError> {
        if chunks.is_empty() {
            return Err(RetrievalError::InvalidInput(
                "cannot fit a vector space over zero chunks".to_string(),
            ));
        }

        let tokenizer = Tokenizer::new()?;
        let term_counts: Vec<HashMap<String, u32>> = chunks
            .iter()
            .map(|chunk| count_terms(&tokenizer.tokenize(chunk.as_ref())))
            .collect();

        let mut document_frequency = BTreeMap::<&str, u32>::new();
        for counts in &term_counts {
            for term in counts.keys() {
                *document_frequency.entry(term.as_str()).or_insert(0) += 1;
            }
        }

        if document_frequency.is_empty() {
            return Err(RetrievalError::InvalidInput(
                "chunks contain no indexable terms".to_string(),
            ));
        }

        let chunk_count = chunks.len() as f32;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(document_frequency.len());
        for (position, (term, frequency)) in document_frequency.iter().enumerate() {
            vocabulary.insert((*term).to_string(), position);
            idf.push(((1.0 + chunk_count) / (1.0 + *frequency as f32)).ln() + 1.0);
        }

        let model = TfidfModel {
            vocabulary,
            idf,
            tokenizer,
        };
        let vectors = term_counts
            .iter()
            .map(|counts| model.weigh(counts))
            .collect();

        Ok((vectors, model))
    }

    // unknown terms are dropped, never added to the vocabulary
    pub fn transform(&self, text: &str) -> Vec<f32> {
        let counts = count_terms(&self.tokenizer.tokenize(text));
        self.weigh(&counts)
    }

    pub fn dimensions(&self) -> usize {
        self.idf.len()
    }

    pub fn vocabulary(&self) -> &BTreeMap<String, usize> {
        &self.vocabulary
    }

    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    pub fn idf(&self, term: &str) -> Option<f32> {
        self.term_index(term).map(|index| self.idf[index])
    }

    fn weigh(&self, counts: &HashMap<String, u32>) -> Vec<f32> {
        let mut vector = vec![0f32; self.dimensions()];
        for (term, count) in counts {
            if let Some(&index) = self.vocabulary.get(term) {
                vector[index] = *count as f32 * self.idf[index];
            }
        }

        let magnitude = vector.iter().map(|value| value * value).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut vector {
                *value /= magnitude;
            }
        }

        vector
    }
}

fn count_terms(terms: &[String]) -> HashMap<String, u32> {
    let mut counts = HashMap::new();
    for term in terms {
        *counts.entry(term.clone()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<&'static str> {
        vec![
            "The pump delivers hydraulic pressure.",
            "Check the pump seals weekly.",
            "Valve maintenance requires a torque wrench.",
        ]
    }

    #[test]
    fn tokenizer_lowercases_and_drops_single_characters() {
        let tokenizer = Tokenizer::new().expect("pattern compiles");
        assert_eq!(
            tokenizer.tokenize("A Pump, a VALVE; x-ray 42"),
            vec!["pump", "valve", "ray", "42"]
        );
    }

    #[test]
    fn rows_share_the_vocabulary_dimension() {
        let (vectors, model) = TfidfModel::fit_transform(&corpus()).expect("fit succeeds");
        assert_eq!(vectors.len(), 3);
        assert!(vectors.iter().all(|row| row.len() == model.dimensions()));
        assert_eq!(model.dimensions(), model.vocabulary().len());
        assert_eq!(model.term_index("pump"), model.vocabulary().get("pump").copied());
    }

    #[test]
    fn vocabulary_is_ordered_lexicographically() {
        let (_, model) = TfidfModel::fit_transform(&["zeta alpha", "mid"]).expect("fit succeeds");
        assert_eq!(model.term_index("alpha"), Some(0));
        assert_eq!(model.term_index("mid"), Some(1));
        assert_eq!(model.term_index("zeta"), Some(2));
    }

    #[test]
    fn common_terms_weigh_less_than_rare_terms() {
        let (_, model) = TfidfModel::fit_transform(&corpus()).expect("fit succeeds");
        let common = model.idf("the").expect("'the' is in the vocabulary");
        let rare = model.idf("valve").expect("'valve' is in the vocabulary");
        assert!(rare > common);
        // smoothed idf of a term present in every chunk is exactly one
        let (_, shared) = TfidfModel::fit_transform(&["pump one", "pump two"]).expect("fit");
        assert!((shared.idf("pump").expect("present") - 1.0).abs() < 1e-6);
    }

    #[test]
    fn rows_are_unit_length() {
        let (vectors, _) = TfidfModel::fit_transform(&corpus()).expect("fit succeeds");
        for row in vectors {
            let norm = row.iter().map(|value| value * value).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn transform_ignores_unknown_terms() {
        let (_, model) = TfidfModel::fit_transform(&corpus()).expect("fit succeeds");
        let unknown = model.transform("completely unrelated vocabulary");
        assert_eq!(unknown.len(), model.dimensions());
        assert!(unknown.iter().all(|value| *value == 0.0));

        let mixed = model.transform("pump zeppelin");
        let known = model.transform("pump");
        assert_eq!(mixed, known);
        assert_eq!(model.term_index("zeppelin"), None);
    }

    #[test]
    fn transform_matches_fitted_rows() {
        let chunks = corpus();
        let (vectors, model) = TfidfModel::fit_transform(&chunks).expect("fit succeeds");
        for (chunk, row) in chunks.iter().zip(vectors.iter()) {
            assert_eq!(&model.transform(chunk), row);
        }
    }

    #[test]
    fn empty_collections_are_rejected() {
        let empty: [&str; 0] = [];
        assert!(matches!(
            TfidfModel::fit_transform(&empty),
            Err(RetrievalError::InvalidInput(_))
        ));
        assert!(matches!(
            TfidfModel::fit_transform(&["", "   "]),
            Err(RetrievalError::InvalidInput(_))
        ));
        assert!(matches!(
            TfidfModel::fit_transform(&["a b c", "!"]),
            Err(RetrievalError::InvalidInput(_))
        ));
    }

    #[test]
    fn fitting_is_deterministic() {
        let (first_vectors, first_model) = TfidfModel::fit_transform(&corpus()).expect("fit");
        let (second_vectors, second_model) = TfidfModel::fit_transform(&corpus()).expect("fit");
        assert_eq!(first_vectors, second_vectors);
        assert_eq!(first_model.vocabulary(), second_model.vocabulary());
    }
}
